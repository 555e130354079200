//! System state entity - Key-value markers for one-off maintenance tasks.
//! Used to record when the public catalog was seeded so restarts don't
//! insert the configured materials twice.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System state database model - stores key-value markers
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Marker key (e.g., `"catalog_seeded"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Marker value stored as string
    pub value: String,
    /// When this marker was last written
    pub updated_at: DateTime,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
