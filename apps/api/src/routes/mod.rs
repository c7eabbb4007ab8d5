pub mod documents;
pub mod forms;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/documents", post(documents::handle_upload))
        .route("/api/v1/forms/resolve", post(forms::handle_resolve))
        .with_state(state)
}
