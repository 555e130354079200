//! Work item endpoints, including the cost estimate.

use crate::{
    api::{AppState, error::ApiResult, extract::{ApiJson, ApiPath, ApiQuery}},
    core::{access::Actor, cost, item as item_core},
    entities::item,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ComponentRequest {
    material_id: i64,
    quantity_per_unit: f64,
}

#[derive(Debug, Deserialize)]
struct CompositionRequest {
    materials: Vec<ComponentRequest>,
}

#[derive(Debug, Deserialize)]
struct EstimateQuery {
    quantity: Option<f64>,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route(
            "/api/items/:id",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/api/items/:id/materials", put(set_materials))
        .route("/api/items/:id/cost-estimate", get(cost_estimate))
}

async fn list_items(State(state): State<AppState>) -> ApiResult<Json<Vec<item::Model>>> {
    Ok(Json(item_core::list_items(&state.db).await?))
}

async fn get_item(
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<i64>,
) -> ApiResult<Json<item_core::ItemDetail>> {
    Ok(Json(item_core::get_item_detail(&state.db, item_id).await?))
}

async fn create_item(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(input): ApiJson<item_core::NewItem>,
) -> ApiResult<(StatusCode, Json<item::Model>)> {
    actor.ensure_can_manage_items()?;
    let item = item_core::create_item(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(item_id): ApiPath<i64>,
    ApiJson(changes): ApiJson<item_core::ItemChanges>,
) -> ApiResult<Json<item::Model>> {
    actor.ensure_can_manage_items()?;
    Ok(Json(item_core::update_item(&state.db, item_id, changes).await?))
}

async fn delete_item(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(item_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    actor.ensure_can_manage_items()?;
    item_core::delete_item(&state.db, item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_materials(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(item_id): ApiPath<i64>,
    ApiJson(req): ApiJson<CompositionRequest>,
) -> ApiResult<Json<item_core::ItemDetail>> {
    actor.ensure_can_manage_items()?;
    let components = req
        .materials
        .into_iter()
        .map(|c| (c.material_id, c.quantity_per_unit))
        .collect();
    item_core::set_item_materials(&state.db, item_id, components).await?;
    Ok(Json(item_core::get_item_detail(&state.db, item_id).await?))
}

/// `GET /api/items/:id/cost-estimate?quantity=` (quantity defaults to 1)
async fn cost_estimate(
    State(state): State<AppState>,
    ApiPath(item_id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<EstimateQuery>,
) -> ApiResult<Json<cost::CostBreakdown>> {
    let quantity = query.quantity.unwrap_or(1.0);
    Ok(Json(
        cost::estimate_item_cost(&state.db, item_id, quantity).await?,
    ))
}
