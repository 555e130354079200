//! Material entity - A catalog material.
//!
//! `owner_id = None` marks a public catalog entry managed by administrators;
//! otherwise the material belongs to the supplier with that user id.
//! Materials carry two optional fallback prices used when no offer is in stock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Material database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "materials")]
pub struct Model {
    /// Unique identifier for the material
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Material name (e.g., "Cemento Portland 50kg")
    pub name: String,
    /// Unit of measure (e.g., "bolsa", "m3")
    pub unit: String,
    /// Reference price per unit
    pub base_price: Option<f64>,
    /// Manually set price per unit, last-resort fallback
    pub custom_price: Option<f64>,
    /// Supplier user id, `None` for the public catalog
    pub owner_id: Option<i64>,
    /// Soft delete flag - hidden from the catalog and skipped by cost estimates
    pub is_deleted: bool,
    /// When the material was created
    pub created_at: DateTimeUtc,
    /// When the material was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Material and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One material has many offers
    #[sea_orm(has_many = "super::offer::Entity")]
    Offers,
    /// Supplier that owns the material
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
}

impl Related<super::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
