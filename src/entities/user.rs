//! User entity - Every person that can authenticate against the API.
//!
//! Users are never hard-deleted; deactivation clears `is_active` so that
//! projects, offers and payments keep pointing at a valid row.

use super::enums::Role;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Login email, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// Access role
    pub role: Role,
    /// Deactivated users cannot authenticate
    pub is_active: bool,
    /// When the user was created
    pub created_at: DateTimeUtc,
}

/// `User` is referenced by many tables but navigated from the other side
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
