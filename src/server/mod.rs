//! Read-only local viewer for the persisted session.
//!
//! Serves the session page on a loopback port so a browser can show the
//! transcript, summary, and fact-check log. The viewer takes a snapshot at
//! startup, performs no remote calls, and never writes session state.

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::session::{FactCheckRecord, Session, SessionMirror, SessionStore};

/// Shared state for the viewer.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub facts: Arc<Vec<FactCheckRecord>>,
}

impl AppState {
    /// Snapshot the persisted session.
    pub fn new(settings: &Settings) -> Self {
        let mut store = SessionStore::new(SessionMirror::new(settings));
        store.hydrate();
        Self {
            session: Arc::new(store.session().clone()),
            facts: Arc::new(store.fact_history().to_vec()),
        }
    }
}

/// Start the viewer.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting session viewer at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
