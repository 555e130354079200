//! Project endpoints.

use crate::{
    api::{AppState, error::ApiResult, extract::{ApiJson, ApiPath}},
    core::{access::Actor, project as project_core, stage as stage_core},
    entities::{ProjectStatus, Role, project},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ProjectView {
    #[serde(flatten)]
    project: project::Model,
    /// Mean stage progress
    progress: f64,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: ProjectStatus,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/:id",
            get(get_project).patch(update_project).delete(delete_project),
        )
        .route("/api/projects/:id/status", put(set_status))
}

/// Loads a project the actor participates in.
pub(super) async fn visible_project(
    db: &DatabaseConnection,
    actor: &Actor,
    project_id: i64,
) -> ApiResult<project::Model> {
    let project = project_core::get_project(db, project_id).await?;
    actor.ensure_can_view_project(&project)?;
    Ok(project)
}

/// Loads a project the actor may manage (admin or assigned constructor).
pub(super) async fn managed_project(
    db: &DatabaseConnection,
    actor: &Actor,
    project_id: i64,
) -> ApiResult<project::Model> {
    let project = project_core::get_project(db, project_id).await?;
    actor.ensure_can_manage_project(&project)?;
    Ok(project)
}

async fn list_projects(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<project::Model>>> {
    Ok(Json(project_core::list_projects_for(&state.db, &actor).await?))
}

async fn create_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(mut input): ApiJson<project_core::NewProject>,
) -> ApiResult<(StatusCode, Json<project::Model>)> {
    actor.require_role(&[Role::Admin, Role::Cliente])?;
    // Clients always own what they create
    if actor.role == Role::Cliente {
        input.client_id = Some(actor.user_id);
    }
    let project = project_core::create_project(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn get_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<ProjectView>> {
    let project = visible_project(&state.db, &actor, project_id).await?;
    let progress = stage_core::project_progress(&state.db, project_id).await?;
    Ok(Json(ProjectView { project, progress }))
}

async fn update_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(changes): ApiJson<project_core::ProjectChanges>,
) -> ApiResult<Json<project::Model>> {
    let project = project_core::get_project(&state.db, project_id).await?;
    actor.ensure_can_edit_project(&project, &changes)?;
    Ok(Json(
        project_core::update_project(&state.db, project_id, changes).await?,
    ))
}

async fn set_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<project::Model>> {
    managed_project(&state.db, &actor, project_id).await?;
    Ok(Json(
        project_core::set_project_status(&state.db, project_id, req.status).await?,
    ))
}

async fn delete_project(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    actor.require_admin()?;
    project_core::delete_project(&state.db, project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
