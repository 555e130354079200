//! Item entity - A unit of construction work (e.g. "m2 de muro de ladrillo").
//!
//! An item's cost per unit is the sum of its materials (see `item_material`)
//! plus `labor_rate`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Unit the item is measured in (e.g., "m2")
    pub unit: String,
    /// Labor cost per unit of item
    pub labor_rate: f64,
    /// Soft delete flag - existing budget lines keep their snapshot
    pub is_deleted: bool,
    /// When the item was created
    pub created_at: DateTimeUtc,
    /// When the item was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One item is composed of many material links
    #[sea_orm(has_many = "super::item_material::Entity")]
    ItemMaterials,
    /// One item appears on many budget lines
    #[sea_orm(has_many = "super::budget_line::Entity")]
    BudgetLines,
}

impl Related<super::item_material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemMaterials.def()
    }
}

impl Related<super::budget_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
