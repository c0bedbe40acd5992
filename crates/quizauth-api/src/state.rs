//! Application state

use quizauth_auth::{AuthInterceptor, AuthService};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub interceptor: Arc<AuthInterceptor>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, interceptor: Arc<AuthInterceptor>) -> Self {
        Self { auth, interceptor }
    }
}
