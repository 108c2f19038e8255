//! Route table for the session viewer.

use axum::routing::get;
use axum::Router;

use super::handlers;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/facts", get(handlers::facts))
        .with_state(state)
}
