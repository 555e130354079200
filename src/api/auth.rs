//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs signed with `JWT_SECRET`. They are issued by the
//! login service; this crate only validates them and turns the subject into
//! an [`Actor`].

use crate::{
    api::{AppState, error::ApiError},
    core::{access::Actor, user},
    entities::Role,
    errors::{Error, Result},
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Role when the token was issued
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Signing and verification keys derived from the shared secret.
pub struct TokenKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

fn unauthorized(message: &str) -> Error {
    Error::Unauthorized {
        message: message.to_string(),
    }
}

impl TokenKeys {
    /// Builds both keys from `secret`.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token for `user_id` valid for `ttl`.
    pub fn issue(&self, user_id: i64, role: Role, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            Error::Server {
                message: format!("failed to sign token: {e}"),
            }
        })
    }

    /// Verifies the signature and expiry of `token`.
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected token: {e}");
                unauthorized("invalid_token")
            })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller from the request headers.
///
/// The role comes from the stored user rather than the token, so a role change
/// or deactivation takes effect before the token expires.
async fn authenticate(keys: &TokenKeys, db: &DatabaseConnection, headers: &HeaderMap) -> Result<Actor> {
    let token = bearer_token(headers).ok_or_else(|| unauthorized("missing_bearer_token"))?;
    let claims = keys.validate(token)?;
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| unauthorized("invalid_subject"))?;

    let user = user::get_active_user(db, user_id)
        .await
        .map_err(|e| match e {
            Error::NotFound { .. } => unauthorized("inactive_user"),
            other => other,
        })?;

    Ok(Actor::new(user.id, user.role))
}

/// Rejects requests without a valid token and stores the [`Actor`] in the
/// request extensions for the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.tokens, &state.db, request.headers()).await {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_issue_and_validate() {
        let keys = TokenKeys::new("test-secret");
        let token = keys.issue(42, Role::Constructor, Duration::hours(1)).unwrap();

        let claims = keys.validate(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, Role::Constructor);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_rejects_foreign_and_expired_tokens() {
        let keys = TokenKeys::new("test-secret");
        let other = TokenKeys::new("another-secret");

        let token = other.issue(1, Role::Admin, Duration::hours(1)).unwrap();
        assert!(matches!(
            keys.validate(&token).unwrap_err(),
            Error::Unauthorized { .. }
        ));

        // Past the default 60s leeway
        let expired = keys.issue(1, Role::Admin, Duration::minutes(-5)).unwrap();
        assert!(matches!(
            keys.validate(&expired).unwrap_err(),
            Error::Unauthorized { .. }
        ));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
