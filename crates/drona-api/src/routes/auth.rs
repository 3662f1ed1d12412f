use axum::extract::State;
use axum::Json;

use crate::schemas::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, StatusResponse,
};
use crate::{ApiError, AppState, CurrentUser};

/// Issue a token pair and rotate the active session; any previously active
/// session is marked for forced logout.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let grant = state
        .flows
        .login(&request.phone_number, &request.password)
        .await?;
    Ok(Json(LoginResponse {
        access_token: grant.access_token,
        refresh_token: grant.refresh_token,
        token_type: "bearer",
        session_id: grant.session_id,
    }))
}

/// Exchange a refresh token for a fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let grant = state.flows.refresh(&request.refresh_token).await?;
    Ok(Json(RefreshResponse {
        access_token: grant.access_token,
        token_type: "bearer",
        session_id: grant.session_id,
    }))
}

/// Invalidate the caller's session and clear its push token.
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(authed): CurrentUser,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .flows
        .logout(authed.user.id, authed.session_id)
        .await?;
    Ok(Json(StatusResponse { status: "ok" }))
}
