use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth;
use crate::config::Config;
use crate::error::AppError;

/// Extractor that validates the JWT and provides the authenticated user ID.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(AuthUser(user_id): AuthUser) -> impl IntoResponse {
///     // user_id is the authenticated user's ID
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub i32);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_parts(parts)?;
        Ok(AuthUser(user_id))
    }
}

/// Like [`AuthUser`], but anonymous requests are allowed.
///
/// Yields `Some(user_id)` for a valid bearer token and `None` when the
/// Authorization header is missing or invalid. Used by endpoints whose
/// response varies with the viewer (e.g. `liked` on a post).
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<i32>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuthUser(user_id_from_parts(parts).ok()))
    }
}

fn user_id_from_parts(parts: &mut Parts) -> Result<i32, AppError> {
    // Extract Authorization header
    let auth_header = parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    // Expect "Bearer <token>"
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid Authorization header format".to_string())
    })?;

    // Get JWT secret from Arc<Config> in extensions (cheap Arc clone per request)
    let config = parts
        .extensions
        .get::<Arc<Config>>()
        .ok_or_else(|| AppError::Internal("Config not found in request".to_string()))?;

    let claims = auth::validate_token(token, &config.jwt_secret)?;

    claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))
}
