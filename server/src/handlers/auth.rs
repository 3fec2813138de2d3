use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::state::AppState;
use crate::utils::error::AppResult;
use crate::utils::extract::ApiJson;
use crate::utils::response::{created, ok};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterRequest>,
) -> AppResult<Response> {
    let session = state
        .account_service()
        .register(&input.name, &input.email, &input.password)
        .await?;
    Ok(created(session))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let session = state
        .account_service()
        .login(&input.email, &input.password)
        .await?;
    Ok(ok(session))
}

/// GET /api/auth/me
pub async fn me(user: AuthUser, State(state): State<AppState>) -> AppResult<Response> {
    let profile = state.account_service().profile(user.user_id).await?;
    Ok(ok(profile))
}
