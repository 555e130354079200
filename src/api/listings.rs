//! Real-estate listing endpoints. Reads are public.

use crate::{
    api::{AppState, error::ApiResult, extract::{ApiJson, ApiPath}, projects::managed_project},
    core::{access::Actor, listing as listing_core},
    entities::listing,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

pub(super) fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/listings", get(list_listings))
        .route("/api/listings/:id", get(get_listing))
}

pub(super) fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/projects/:id/listing",
        post(create_listing)
            .patch(update_listing)
            .delete(delete_listing),
    )
}

async fn list_listings(State(state): State<AppState>) -> ApiResult<Json<Vec<listing::Model>>> {
    Ok(Json(listing_core::list_published_listings(&state.db).await?))
}

async fn get_listing(
    State(state): State<AppState>,
    ApiPath(listing_id): ApiPath<i64>,
) -> ApiResult<Json<listing::Model>> {
    Ok(Json(
        listing_core::get_published_listing(&state.db, listing_id).await?,
    ))
}

async fn create_listing(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(input): ApiJson<listing_core::NewListing>,
) -> ApiResult<(StatusCode, Json<listing::Model>)> {
    managed_project(&state.db, &actor, project_id).await?;
    let listing = listing_core::create_listing_from_project(&state.db, project_id, input).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

async fn update_listing(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
    ApiJson(changes): ApiJson<listing_core::ListingChanges>,
) -> ApiResult<Json<listing::Model>> {
    managed_project(&state.db, &actor, project_id).await?;
    let listing = listing_core::get_project_listing(&state.db, project_id).await?;
    Ok(Json(
        listing_core::update_listing(&state.db, listing.id, changes).await?,
    ))
}

async fn delete_listing(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(project_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    managed_project(&state.db, &actor, project_id).await?;
    let listing = listing_core::get_project_listing(&state.db, project_id).await?;
    listing_core::delete_listing(&state.db, listing.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
