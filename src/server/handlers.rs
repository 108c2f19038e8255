//! Handlers projecting the session snapshot into HTML.

use axum::extract::State;
use axum::response::Html;

use crate::view::panels;

use super::AppState;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(panels::session_page(&state.session, &state.facts))
}

pub async fn facts(State(state): State<AppState>) -> Html<String> {
    Html(panels::fact_page(&state.facts))
}
