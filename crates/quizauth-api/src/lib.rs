//! Quizauth REST API
//!
//! Axum routes exposing the authentication service over HTTP.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
