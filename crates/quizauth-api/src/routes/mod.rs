//! API routes

mod auth;
mod health;
mod types;
mod users;

use axum::{Router, middleware::from_fn_with_state};
use quizauth_auth::authorize_request;

use crate::state::AppState;

/// Create the main router
///
/// Everything under `/api` passes through the authorization interceptor;
/// health checks do not.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .route_layer(from_fn_with_state(
            state.interceptor.clone(),
            authorize_request,
        ));

    Router::new()
        .merge(health::routes())
        .merge(api)
        .with_state(state)
}
