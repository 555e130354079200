//! HTTP interface - router, shared state and request handlers.
//!
//! Handlers are thin: they authenticate the caller, run the role checks from
//! [`crate::core::access`] and delegate to the core operations.

/// Bearer token validation and the auth middleware
pub mod auth;
/// Error to HTTP response mapping
pub mod error;
/// Extractors with JSON rejections
pub mod extract;

mod budget;
mod items;
mod listings;
mod materials;
mod payments;
mod projects;
mod stages;
mod users;

use crate::config::ServerConfig;
use auth::TokenKeys;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Token verification keys
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    /// Creates the state from a connection and the token secret.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_secret: &str) -> Self {
        Self {
            db,
            tokens: Arc::new(TokenKeys::new(jwt_secret)),
        }
    }
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if server.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|_| tracing::warn!("Ignoring invalid CORS origin: {origin}"))
                .ok()
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "unavailable"
    };
    Json(json!({ "status": "ok", "database": database }))
}

/// Builds the application router.
pub fn router(state: AppState, server: &ServerConfig) -> Router {
    let protected = Router::new()
        .merge(users::routes())
        .merge(projects::routes())
        .merge(materials::routes())
        .merge(items::routes())
        .merge(budget::routes())
        .merge(stages::routes())
        .merge(payments::routes())
        .merge(listings::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .merge(listings::public_routes())
        .merge(protected)
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
