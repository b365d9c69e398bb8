use axum::extract::State;

use crate::database::models::UserDetails;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::services::auth_service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services::AuthService;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterRequest>,
) -> ApiResult<AuthResponse> {
    let response = AuthService::new(&state).register(input).await?;
    Ok(ApiResponse::created(response))
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, JsonBody(input): JsonBody<LoginRequest>) -> ApiResult<AuthResponse> {
    let response = AuthService::new(&state).login(input).await?;
    Ok(ApiResponse::success(response))
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<UserDetails> {
    let details = AuthService::new(&state).current_user(user.id).await?;
    Ok(ApiResponse::success(details))
}
