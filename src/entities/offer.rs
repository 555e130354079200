//! Offer entity - A supplier's priced listing for a catalog material (oferta).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Offer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    /// Unique identifier for the offer
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Material being offered
    pub material_id: i64,
    /// Supplier user id
    pub supplier_id: i64,
    /// Price per material unit
    pub price: f64,
    /// Only in-stock offers take part in cost estimates
    pub in_stock: bool,
    /// When the offer was created
    pub created_at: DateTimeUtc,
    /// When the offer was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Offer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each offer belongs to one material
    #[sea_orm(
        belongs_to = "super::material::Entity",
        from = "Column::MaterialId",
        to = "super::material::Column::Id",
        on_delete = "Cascade"
    )]
    Material,
    /// Each offer belongs to one supplier
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SupplierId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Supplier,
}

impl Related<super::material::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
