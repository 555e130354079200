//! User administration endpoints.

use crate::{
    api::{AppState, error::ApiResult, extract::{ApiJson, ApiPath}},
    core::{access::Actor, user as user_core},
    entities::{Role, user},
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, put},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    name: String,
    email: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct RoleRequest {
    role: Role,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", delete(deactivate_user))
        .route("/api/users/:id/role", put(set_role))
}

async fn me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<user::Model>> {
    Ok(Json(user_core::get_active_user(&state.db, actor.user_id).await?))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Json<Vec<user::Model>>> {
    actor.require_admin()?;
    Ok(Json(user_core::list_users(&state.db).await?))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<user::Model>)> {
    actor.require_admin()?;
    let user = user_core::create_user(&state.db, req.name, req.email, req.role).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn set_role(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(user_id): ApiPath<i64>,
    ApiJson(req): ApiJson<RoleRequest>,
) -> ApiResult<Json<user::Model>> {
    actor.require_admin()?;
    Ok(Json(
        user_core::set_user_role(&state.db, user_id, req.role).await?,
    ))
}

async fn deactivate_user(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<Json<user::Model>> {
    actor.require_admin()?;
    Ok(Json(user_core::deactivate_user(&state.db, user_id).await?))
}
