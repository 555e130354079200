//! Listing entity - A real-estate listing built from a finished project.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Listing database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listings")]
pub struct Model {
    /// Unique identifier for the listing
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Source project, at most one listing per project
    #[sea_orm(unique)]
    pub project_id: i64,
    /// Listing headline
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// Asking price
    pub price: f64,
    /// Location shown to buyers
    pub location: Option<String>,
    /// Project budget total when the listing was created
    pub construction_cost: f64,
    /// Unpublished listings are hidden from the public endpoints
    pub is_published: bool,
    /// When the listing was created
    pub created_at: DateTimeUtc,
    /// When the listing was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Listing and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each listing comes from one project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_delete = "Cascade"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
