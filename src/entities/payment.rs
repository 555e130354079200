//! Payment entity - Money paid towards a project, optionally scoped to a stage.

use super::enums::PaymentStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project being paid
    pub project_id: i64,
    /// Stage the payment is scoped to, if any
    pub stage_id: Option<i64>,
    /// Amount paid, always positive
    pub amount: f64,
    /// Review status
    pub status: PaymentStatus,
    /// Payment method (e.g., "transferencia")
    pub method: Option<String>,
    /// External reference such as a bank transfer id
    pub reference: Option<String>,
    /// User who recorded the payment
    pub recorded_by: i64,
    /// When the payment was recorded
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
    /// Optional stage scope
    #[sea_orm(
        belongs_to = "super::stage::Entity",
        from = "Column::StageId",
        to = "super::stage::Column::Id",
        on_delete = "SetNull"
    )]
    Stage,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
