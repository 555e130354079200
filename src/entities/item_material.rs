//! Item-material link - How much of a material one unit of an item consumes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item-material database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "item_materials")]
pub struct Model {
    /// Unique identifier for the link
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item being composed
    pub item_id: i64,
    /// Material consumed
    pub material_id: i64,
    /// Material units consumed per item unit
    pub quantity_per_unit: f64,
}

/// Defines relationships between the link and its two ends
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The owning item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id",
        on_delete = "Cascade"
    )]
    Item,
    /// The consumed material
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id",
        on_delete = "Cascade"
    )]
    Material,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
