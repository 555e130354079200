//! Construction stages (etapas) and project progress.

use crate::{
    entities::{Project, Stage, stage},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use serde::Deserialize;

/// Fields accepted when creating a stage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewStage {
    /// Stage name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Amount expected to be paid for this stage
    #[serde(default)]
    pub budget_amount: Option<f64>,
    /// Planned start
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Planned end
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Fields accepted when updating a stage; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StageChanges {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New completion percentage
    #[serde(default)]
    pub progress: Option<f64>,
    /// New expected amount
    #[serde(default)]
    pub budget_amount: Option<f64>,
    /// New planned start
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// New planned end
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// New display position
    #[serde(default)]
    pub position: Option<i32>,
}

fn validate_progress(progress: f64) -> Result<f64> {
    if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
        return Err(Error::validation(format!(
            "progress must be between 0 and 100, got {progress}"
        )));
    }
    Ok(progress)
}

fn validate_budget_amount(amount: Option<f64>) -> Result<()> {
    match amount {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            Err(Error::InvalidAmount { amount })
        }
        _ => Ok(()),
    }
}

fn validate_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(Error::validation(format!(
            "stage ends ({end}) before it starts ({start})"
        ))),
        _ => Ok(()),
    }
}

/// Lists a project's stages in display order.
pub async fn list_stages(db: &DatabaseConnection, project_id: i64) -> Result<Vec<stage::Model>> {
    Stage::find()
        .filter(stage::Column::ProjectId.eq(project_id))
        .order_by_asc(stage::Column::Position)
        .order_by_asc(stage::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fetches a stage by id.
pub async fn get_stage(db: &DatabaseConnection, stage_id: i64) -> Result<stage::Model> {
    Stage::find_by_id(stage_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("stage", stage_id))
}

/// Appends a stage at the end of a project's stage list with 0% progress.
pub async fn create_stage(
    db: &DatabaseConnection,
    project_id: i64,
    input: NewStage,
) -> Result<stage::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Stage name cannot be empty"));
    }
    validate_budget_amount(input.budget_amount)?;
    validate_dates(input.start_date, input.end_date)?;

    Project::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("project", project_id))?;

    let last_position: Option<i32> = Stage::find()
        .select_only()
        .column_as(stage::Column::Position.max(), "max_position")
        .filter(stage::Column::ProjectId.eq(project_id))
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();

    let stage = stage::ActiveModel {
        project_id: Set(project_id),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        position: Set(last_position.map_or(1, |p| p + 1)),
        progress: Set(0.0),
        budget_amount: Set(input.budget_amount),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    stage.insert(db).await.map_err(Into::into)
}

/// Applies [`StageChanges`] to a stage.
pub async fn update_stage(
    db: &DatabaseConnection,
    stage_id: i64,
    changes: StageChanges,
) -> Result<stage::Model> {
    let current = get_stage(db, stage_id).await?;
    validate_dates(
        changes.start_date.or(current.start_date),
        changes.end_date.or(current.end_date),
    )?;

    let mut stage: stage::ActiveModel = current.into();

    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Stage name cannot be empty"));
        }
        stage.name = Set(name.trim().to_string());
    }
    if let Some(description) = changes.description {
        stage.description = Set(Some(description));
    }
    if let Some(progress) = changes.progress {
        stage.progress = Set(validate_progress(progress)?);
    }
    if changes.budget_amount.is_some() {
        validate_budget_amount(changes.budget_amount)?;
        stage.budget_amount = Set(changes.budget_amount);
    }
    if changes.start_date.is_some() {
        stage.start_date = Set(changes.start_date);
    }
    if changes.end_date.is_some() {
        stage.end_date = Set(changes.end_date);
    }
    if let Some(position) = changes.position {
        stage.position = Set(position);
    }

    let stage = stage.update(db).await?;
    tracing::debug!(stage_id, progress = stage.progress, "updated stage");
    Ok(stage)
}

/// Deletes a stage. Payments scoped to it stay on the project, unscoped.
pub async fn delete_stage(db: &DatabaseConnection, stage_id: i64) -> Result<()> {
    let result = Stage::delete_by_id(stage_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("stage", stage_id));
    }
    Ok(())
}

/// Mean progress of a project's stages, 0 when it has none.
#[must_use]
pub fn average_progress(stages: &[stage::Model]) -> f64 {
    if stages.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)] // stage counts are tiny
    let count = stages.len() as f64;
    stages.iter().map(|s| s.progress).sum::<f64>() / count
}

/// Project progress computed from its stages.
pub async fn project_progress(db: &DatabaseConnection, project_id: i64) -> Result<f64> {
    Ok(average_progress(&list_stages(db, project_id).await?))
}
