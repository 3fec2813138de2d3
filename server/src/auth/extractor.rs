//! Bearer-token extractor for auth-gated handlers.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::state::AppState;
use crate::utils::error::AppError;

/// Subject of a verified `Authorization: Bearer <token>` header.
///
/// Place it before any body extractor so an invalid token is rejected before
/// the body is read or the store is consulted:
///
/// ```ignore
/// async fn delete_event(user: AuthUser, State(state): State<AppState>) -> Response { .. }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                tracing::debug!("Missing Authorization header");
                AppError::session_expired()
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            tracing::debug!("Authorization header is not a bearer token");
            AppError::session_expired()
        })?;

        let claims = verify_token(token.trim(), &state.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AppError::session_expired()
        })?;

        let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| {
            tracing::debug!(subject = %claims.user_id, "Token subject is not a user id");
            AppError::session_expired()
        })?;

        Ok(AuthUser { user_id })
    }
}
