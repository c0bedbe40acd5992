//! User profile endpoints

use axum::{Json, Router, extract::State, routing::get};
use quizauth_auth::{RequireIdentity, UserProfile, UserUpdate};

use super::types::{ApiJson, ApiPath};
use crate::error::ApiError;
use crate::state::AppState;

async fn get_me(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.auth.get_user_by_id(identity.user_id).await?))
}

async fn update_me(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.auth.update_user(&identity, update).await?))
}

async fn get_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.auth.get_user_by_id(id).await?))
}

async fn get_user_by_username(
    State(state): State<AppState>,
    ApiPath(username): ApiPath<String>,
) -> Result<Json<UserProfile>, ApiError> {
    Ok(Json(state.auth.get_user_by_username(&username).await?))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users/me", get(get_me).patch(update_me))
        .route("/api/v1/users/{id}", get(get_user))
        .route("/api/v1/users/by-username/{username}", get(get_user_by_username))
}
