//! The session store: one mutable record, written through to the mirror.
//!
//! All session mutation happens through the operations here; components get
//! the store injected rather than reaching for shared globals. Every
//! mutating operation performs exactly one mirror write. Mirror writes are
//! best-effort: a failed write is logged and the in-memory session stays
//! authoritative for the rest of the process.

use tracing::{info, warn};

use super::mirror::{PersistedState, SessionMirror};
use super::model::{ChatMessage, FactCheckRecord, Session};

/// A partial update applied after an action succeeds.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub summary: Option<String>,
    pub pdf_name: Option<String>,
    pub current_document_id: Option<String>,
    pub append_chat: Vec<ChatMessage>,
}

pub struct SessionStore {
    session: Session,
    fact_history: Vec<FactCheckRecord>,
    mirror: SessionMirror,
}

impl SessionStore {
    pub fn new(mirror: SessionMirror) -> Self {
        Self {
            session: Session::default(),
            fact_history: Vec::new(),
            mirror,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The accumulated fact-check log. Mirror-only data: kept alongside the
    /// session so writes can re-serialize the whole mirror, but not a field
    /// of [`Session`] itself.
    pub fn fact_history(&self) -> &[FactCheckRecord] {
        &self.fact_history
    }

    /// Rehydrate from the mirror. Called once at startup; a missing or
    /// unreadable mirror leaves the store unauthenticated.
    pub fn hydrate(&mut self) {
        if let Some((token, state)) = self.mirror.load() {
            self.session = Session {
                token: Some(token),
                user_id: state.user_id,
                username: state.username,
                summary: state.summary,
                pdf_name: state.pdf_name,
                current_document_id: state.current_document_id,
                chat_history: state.chat_history,
            };
            self.fact_history = state.fact_history;
            info!(
                username = self.session.username.as_deref().unwrap_or("unknown"),
                "Restored persisted session"
            );
        }
    }

    /// Replace the whole record after a successful login. The fact-check
    /// log restarts with the new identity.
    pub fn set_authenticated(&mut self, session: Session) {
        debug_assert!(session.token.is_some(), "authenticated session without token");
        self.session = session;
        self.fact_history = Vec::new();
        self.write_through();
    }

    /// Apply a partial update and write through.
    pub fn mutate(&mut self, update: SessionUpdate) {
        if let Some(summary) = update.summary {
            self.session.summary = Some(summary);
        }
        if let Some(pdf_name) = update.pdf_name {
            self.session.pdf_name = Some(pdf_name);
        }
        if let Some(id) = update.current_document_id {
            self.session.current_document_id = Some(id);
        }
        self.session.chat_history.extend(update.append_chat);
        self.write_through();
    }

    /// Append fact-check records to the mirror's log.
    pub fn append_fact_checks(&mut self, records: Vec<FactCheckRecord>) {
        if records.is_empty() {
            return;
        }
        self.fact_history.extend(records);
        self.write_through();
    }

    /// Reset to the unauthenticated default and drop the mirror.
    pub fn clear(&mut self) {
        self.session = Session::default();
        self.fact_history = Vec::new();
        if let Err(e) = self.mirror.remove() {
            warn!("Failed to remove session mirror: {}", e);
        }
    }

    fn write_through(&self) {
        let Some(token) = self.session.token.as_deref() else {
            return;
        };
        let state = PersistedState {
            user_id: self.session.user_id,
            username: self.session.username.clone(),
            summary: self.session.summary.clone(),
            pdf_name: self.session.pdf_name.clone(),
            current_document_id: self.session.current_document_id.clone(),
            chat_history: self.session.chat_history.clone(),
            fact_history: self.fact_history.clone(),
        };
        if let Err(e) = self.mirror.save(token, &state) {
            warn!("Failed to write session mirror: {}", e);
        }
    }
}
