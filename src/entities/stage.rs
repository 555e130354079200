//! Stage entity - A construction stage (etapa) used for progress tracking
//! and stage-scoped payments.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stage database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stages")]
pub struct Model {
    /// Unique identifier for the stage
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project the stage belongs to
    pub project_id: i64,
    /// Stage name (e.g., "Cimientos")
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Display order within the project
    pub position: i32,
    /// Completion in percent, 0 to 100
    pub progress: f64,
    /// Amount expected to be paid for this stage
    pub budget_amount: Option<f64>,
    /// Planned start
    pub start_date: Option<Date>,
    /// Planned end
    pub end_date: Option<Date>,
    /// When the stage was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Stage and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each stage belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    /// One stage scopes many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
