//! Project entity - A construction project (obra).
//!
//! A project has an optional client and constructor, a lifecycle status and an
//! optional agreed total. When `total_budget` is unset the payment reconciler
//! falls back to the sum of the project's budget lines.

use super::enums::ProjectStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Project database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    /// Unique identifier for the project
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Project name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Site address
    pub address: Option<String>,
    /// User id of the client who owns the project
    pub client_id: Option<i64>,
    /// User id of the constructor assigned to the project
    pub constructor_id: Option<i64>,
    /// Lifecycle status
    pub status: ProjectStatus,
    /// Agreed contract total; overrides the computed budget total for payments
    pub total_budget: Option<f64>,
    /// When the project was created
    pub created_at: DateTimeUtc,
    /// When the project was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Project and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The client who owns the project
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ClientId",
        to = "super::user::Column::Id"
    )]
    Client,
    /// The constructor assigned to the project
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ConstructorId",
        to = "super::user::Column::Id"
    )]
    Constructor,
    /// One project has many budget lines
    #[sea_orm(has_many = "super::budget_line::Entity")]
    BudgetLines,
    /// One project has many stages
    #[sea_orm(has_many = "super::stage::Entity")]
    Stages,
    /// One project has many payments
    #[sea_orm(has_many = "super::payment::Entity")]
    Payments,
}

impl Related<super::budget_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetLines.def()
    }
}

impl Related<super::stage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stages.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
