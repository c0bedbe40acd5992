//! Account and session endpoints

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::post,
};
use quizauth_auth::{AuthError, LoginOutcome, extract_bearer_token};
use tracing::debug;

use super::types::{
    ApiJson, LoginRequest, RegisterRequest, RegisterResponse, ValidateRequest, ValidateResponse,
};
use crate::error::ApiError;
use crate::state::AppState;

async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user_id = state
        .auth
        .register(&request.email, request.username.as_deref(), &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id })))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginOutcome>, ApiError> {
    let outcome = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(outcome))
}

/// Revoke the token this request was authorized with
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;
    let token = extract_bearer_token(header)?;

    state.auth.logout(token).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn validate(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let identity = state.auth.validate_raw_token(&request.token).await?;
    debug!("Token in request body belongs to user {}", identity.user_id);

    Ok(Json(ValidateResponse {
        valid: true,
        identity,
    }))
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/validate", post(validate))
}
