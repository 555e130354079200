//! Budget line entity - An item attached to a project's budget (presupuesto item).
//!
//! The cost columns are a snapshot taken when the line was added or its
//! quantity changed; the detail view recomputes them from current prices.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget line database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_lines")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project the line belongs to
    pub project_id: i64,
    /// Item being budgeted
    pub item_id: i64,
    /// Number of item units
    pub quantity: f64,
    /// Materials cost at snapshot time
    pub materials_cost: f64,
    /// Labor cost at snapshot time
    pub labor_cost: f64,
    /// `materials_cost + labor_cost`
    pub total: f64,
    /// When the line was added
    pub created_at: DateTimeUtc,
    /// When the snapshot was last refreshed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between BudgetLine and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    /// Each line references one item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
