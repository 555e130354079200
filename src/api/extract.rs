//! Request extractors whose rejections use the JSON error envelope.
//!
//! axum answers a bad body, query string or path segment with its own
//! plain-text response (422 for body shape errors). These wrappers turn every
//! such rejection into a 400 [`ApiError`].

use crate::api::error::ApiError;
use axum::{
    Json, async_trait,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;

/// JSON request body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

/// Query string parameters.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

/// Path parameters.
#[derive(Debug)]
pub struct ApiPath<T>(pub T);

fn map_json_rejection(err: &JsonRejection) -> ApiError {
    let message = match err {
        JsonRejection::MissingJsonContentType(_) => {
            "Content-Type must be application/json".to_string()
        }
        JsonRejection::BytesRejection(_) => "Failed to read request body".to_string(),
        other => format!("Invalid JSON payload: {}", other.body_text()),
    };
    ApiError::bad_request(message)
}

fn map_query_rejection(err: &QueryRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid query parameters: {}", err.body_text()))
}

fn map_path_rejection(err: &PathRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid path parameters: {}", err.body_text()))
}

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| map_json_rejection(&e))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| map_query_rejection(&e))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| map_path_rejection(&e))?;
        Ok(Self(value))
    }
}
