//! Material catalog and supplier offer endpoints.

use crate::{
    api::{AppState, error::ApiResult, extract::{ApiJson, ApiPath}},
    core::{access::Actor, material as material_core, offer as offer_core},
    entities::{Role, material, offer},
    errors::Error,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct NewOfferRequest {
    price: f64,
    #[serde(default = "default_in_stock")]
    in_stock: bool,
}

#[derive(Debug, Default, Deserialize)]
struct OfferChangesRequest {
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    in_stock: Option<bool>,
}

const fn default_in_stock() -> bool {
    true
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/materials", get(list_materials).post(create_material))
        .route(
            "/api/materials/:id",
            get(get_material)
                .patch(update_material)
                .delete(delete_material),
        )
        .route(
            "/api/materials/:id/offers",
            get(list_offers).post(create_offer),
        )
        .route("/api/offers/:id", patch(update_offer).delete(delete_offer))
}

/// Supplier-owned materials are hidden from everyone but their owner and admins.
async fn visible_material(
    db: &DatabaseConnection,
    actor: &Actor,
    material_id: i64,
) -> ApiResult<material::Model> {
    let material = material_core::get_material(db, material_id).await?;
    match material.owner_id {
        Some(owner) if owner != actor.user_id && !actor.is_admin() => {
            Err(Error::not_found("material", material_id).into())
        }
        _ => Ok(material),
    }
}

async fn owned_offer(
    db: &DatabaseConnection,
    actor: &Actor,
    offer_id: i64,
) -> ApiResult<offer::Model> {
    let offer = offer_core::get_offer(db, offer_id).await?;
    if !actor.is_admin() && offer.supplier_id != actor.user_id {
        return Err(Error::forbidden("offer belongs to another supplier").into());
    }
    Ok(offer)
}

async fn list_materials(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<material::Model>>> {
    Ok(Json(
        material_core::list_visible_materials(&state.db, &actor).await?,
    ))
}

async fn get_material(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(material_id): ApiPath<i64>,
) -> ApiResult<Json<material::Model>> {
    Ok(Json(visible_material(&state.db, &actor, material_id).await?))
}

async fn create_material(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(input): ApiJson<material_core::NewMaterial>,
) -> ApiResult<(StatusCode, Json<material::Model>)> {
    // Admins add to the public catalog, suppliers to their own
    let owner_id = match actor.role {
        Role::Admin => None,
        role if role.is_supplier() => Some(actor.user_id),
        _ => return Err(Error::forbidden("only admins and suppliers can add materials").into()),
    };
    let material = material_core::create_material(&state.db, input, owner_id).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

async fn update_material(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(material_id): ApiPath<i64>,
    ApiJson(changes): ApiJson<material_core::MaterialChanges>,
) -> ApiResult<Json<material::Model>> {
    let material = visible_material(&state.db, &actor, material_id).await?;
    actor.ensure_can_manage_material(&material)?;
    Ok(Json(
        material_core::update_material(&state.db, material_id, changes).await?,
    ))
}

async fn delete_material(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(material_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    let material = visible_material(&state.db, &actor, material_id).await?;
    actor.ensure_can_manage_material(&material)?;
    material_core::delete_material(&state.db, material_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_offers(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(material_id): ApiPath<i64>,
) -> ApiResult<Json<Vec<offer::Model>>> {
    visible_material(&state.db, &actor, material_id).await?;
    Ok(Json(
        offer_core::list_offers_for_material(&state.db, material_id).await?,
    ))
}

async fn create_offer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(material_id): ApiPath<i64>,
    ApiJson(req): ApiJson<NewOfferRequest>,
) -> ApiResult<(StatusCode, Json<offer::Model>)> {
    actor.ensure_can_publish_offers()?;
    visible_material(&state.db, &actor, material_id).await?;
    let offer =
        offer_core::create_offer(&state.db, actor.user_id, material_id, req.price, req.in_stock)
            .await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

async fn update_offer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(offer_id): ApiPath<i64>,
    ApiJson(req): ApiJson<OfferChangesRequest>,
) -> ApiResult<Json<offer::Model>> {
    owned_offer(&state.db, &actor, offer_id).await?;
    Ok(Json(
        offer_core::update_offer(&state.db, offer_id, req.price, req.in_stock).await?,
    ))
}

async fn delete_offer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(offer_id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    owned_offer(&state.db, &actor, offer_id).await?;
    offer_core::delete_offer(&state.db, offer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
