//! Project budget endpoints.

use crate::{
    api::{
        AppState,
        error::ApiResult,
        extract::{ApiJson, ApiPath},
        projects::{managed_project, visible_project},
    },
    core::{access::Actor, budget},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct AddLineRequest {
    item_id: i64,
    quantity: f64,
}

#[derive(Debug, Deserialize)]
struct QuantityRequest {
    quantity: f64,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/projects/:id/budget", get(get_budget).post(add_line))
        .route("/api/projects/:id/refresh-budget", post(refresh_budget))
        .route(
            "/api/projects/:id/budget/:line_id",
            get(get_line).patch(update_line).delete(remove_line),
        )
}

async fn get_budget(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<budget::ProjectBudget>> {
    visible_project(&state.db, &actor, project_id).await?;
    Ok(Json(budget::get_project_budget(&state.db, project_id).await?))
}

async fn add_line(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(req): ApiJson<AddLineRequest>,
) -> ApiResult<(StatusCode, Json<budget::BudgetLineView>)> {
    managed_project(&state.db, &actor, project_id).await?;
    let line = budget::add_budget_line(&state.db, project_id, req.item_id, req.quantity).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

async fn refresh_budget(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<Json<budget::ProjectBudget>> {
    managed_project(&state.db, &actor, project_id).await?;
    Ok(Json(
        budget::refresh_project_budget(&state.db, project_id).await?,
    ))
}

async fn get_line(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath((project_id, line_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Json<budget::BudgetLineDetail>> {
    visible_project(&state.db, &actor, project_id).await?;
    Ok(Json(
        budget::get_budget_line_detail(&state.db, project_id, line_id).await?,
    ))
}

async fn update_line(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath((project_id, line_id)): ApiPath<(i64, i64)>,
    ApiJson(req): ApiJson<QuantityRequest>,
) -> ApiResult<Json<budget::BudgetLineView>> {
    managed_project(&state.db, &actor, project_id).await?;
    Ok(Json(
        budget::update_budget_line_quantity(&state.db, project_id, line_id, req.quantity).await?,
    ))
}

async fn remove_line(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath((project_id, line_id)): ApiPath<(i64, i64)>,
) -> ApiResult<StatusCode> {
    managed_project(&state.db, &actor, project_id).await?;
    budget::remove_budget_line(&state.db, project_id, line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
