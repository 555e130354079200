//! Construction stage endpoints.

use crate::{
    api::{
        AppState,
        error::ApiResult,
        extract::{ApiJson, ApiPath},
        projects::{managed_project, visible_project},
    },
    core::{access::Actor, stage as stage_core},
    entities::stage,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/projects/:id/stages",
            get(list_stages).post(create_stage),
        )
        .route("/api/stages/:id", patch(update_stage).delete(delete_stage))
}

async fn list_stages(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<stage::Model>>> {
    visible_project(&state.db, &actor, project_id).await?;
    Ok(Json(stage_core::list_stages(&state.db, project_id).await?))
}

async fn create_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(input): ApiJson<stage_core::NewStage>,
) -> ApiResult<(StatusCode, Json<stage::Model>)> {
    managed_project(&state.db, &actor, project_id).await?;
    let stage = stage_core::create_stage(&state.db, project_id, input).await?;
    Ok((StatusCode::CREATED, Json(stage)))
}

async fn update_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(stage_id): ApiPath<i64>,
    ApiJson(changes): ApiJson<stage_core::StageChanges>,
) -> ApiResult<Json<stage::Model>> {
    let stage = stage_core::get_stage(&state.db, stage_id).await?;
    managed_project(&state.db, &actor, stage.project_id).await?;
    Ok(Json(
        stage_core::update_stage(&state.db, stage_id, changes).await?,
    ))
}

async fn delete_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(stage_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let stage = stage_core::get_stage(&state.db, stage_id).await?;
    managed_project(&state.db, &actor, stage.project_id).await?;
    stage_core::delete_stage(&state.db, stage_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
