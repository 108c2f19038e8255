//! Event wiring: one user gesture maps to one gateway exchange plus its
//! session and view follow-up.
//!
//! The session store and gateway client are injected at construction; all
//! mutation flows through the store's operations. Each network-reaching
//! action draws a monotonic id, and a response may only commit its effects
//! while its id is still the latest issued for that action kind, so a slow
//! earlier response can never overwrite a later action's result.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::models::{DocumentEntry, FactHistoryEntry, Precedent};
use crate::api::{ApiClient, ApiError};
use crate::config::Settings;
use crate::session::{
    ChatMessage, FactCheckRecord, Session, SessionMirror, SessionStore, SessionUpdate,
};
use crate::validate::{self, ValidationError};
use crate::view::panels;

/// One kind per gesture that reaches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Login,
    Signup,
    Upload,
    Chat,
    FindPrecedents,
    LoadPrecedents,
    LoadDocuments,
    FactHistory,
}

/// Issues monotonic ids per action kind.
#[derive(Debug, Default)]
pub struct ActionTracker {
    issued: Mutex<HashMap<ActionKind, u64>>,
}

/// The id an in-flight action holds while awaiting its response.
#[derive(Debug)]
pub struct Ticket {
    kind: ActionKind,
    id: u64,
}

impl ActionTracker {
    pub fn begin(&self, kind: ActionKind) -> Ticket {
        let mut issued = self.issued.lock().expect("action tracker lock");
        let id = issued.entry(kind).and_modify(|id| *id += 1).or_insert(1);
        Ticket { kind, id: *id }
    }

    /// Whether the ticket still identifies the latest request of its kind.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let issued = self.issued.lock().expect("action tracker lock");
        issued.get(&ticket.kind).copied() == Some(ticket.id)
    }
}

/// Failure of a single action. Terminal for that action only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The session is not in a state this action needs.
    #[error("{0}")]
    State(String),
    /// A newer request of the same kind was issued while this one was in
    /// flight; its response was discarded.
    #[error("Superseded by a newer request.")]
    Superseded,
}

impl AppError {
    pub fn is_session_expired(&self) -> bool {
        matches!(self, AppError::Api(ApiError::SessionExpired))
    }
}

/// The application controller.
pub struct App {
    store: SessionStore,
    client: ApiClient,
    tracker: ActionTracker,
}

impl App {
    pub fn new(settings: &Settings) -> Self {
        Self {
            store: SessionStore::new(SessionMirror::new(settings)),
            client: ApiClient::new(settings),
            tracker: ActionTracker::default(),
        }
    }

    /// Restore the persisted session. Call once at startup.
    pub fn hydrate(&mut self) {
        self.store.hydrate();
    }

    pub fn session(&self) -> &Session {
        self.store.session()
    }

    /// The locally accumulated fact-check log.
    pub fn fact_log(&self) -> &[FactCheckRecord] {
        self.store.fact_history()
    }

    fn token(&self) -> Result<String, AppError> {
        self.store
            .session()
            .token
            .clone()
            .ok_or(AppError::Api(ApiError::MissingToken))
    }

    /// Drop to the unauthenticated state after a 401. Idempotent: returns
    /// whether a transition actually happened.
    pub fn expire_session(&mut self) -> bool {
        if self.store.session().is_authenticated() {
            warn!("Session expired; clearing persisted state");
            self.store.clear();
            true
        } else {
            false
        }
    }

    fn fail<T>(&mut self, err: ApiError) -> Result<T, AppError> {
        if matches!(err, ApiError::SessionExpired) {
            self.expire_session();
        }
        Err(AppError::Api(err))
    }

    /// Authenticate and replace the whole session with the server's view.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AppError> {
        validate::login(username)?;
        let ticket = self.tracker.begin(ActionKind::Login);

        let result = self.client.login(username, password).await;
        let resp = match result {
            Ok(resp) => resp,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }

        info!("Logged in as {}", resp.username.as_deref().unwrap_or(username));
        self.store.set_authenticated(Session {
            token: Some(resp.access_token),
            user_id: resp.user_id,
            username: resp.username.or_else(|| Some(username.to_string())),
            summary: resp.summary,
            pdf_name: resp.pdf_name,
            current_document_id: resp.current_document_id,
            chat_history: resp.chat_history,
        });
        Ok(())
    }

    /// Create an account. No session change; returns the server's message.
    pub async fn signup(&mut self, username: &str, password: &str) -> Result<String, AppError> {
        validate::signup(username, password)?;
        let ticket = self.tracker.begin(ActionKind::Signup);

        let result = self.client.signup(username, password).await;
        let resp = match result {
            Ok(resp) => resp,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }
        Ok(resp
            .message
            .unwrap_or_else(|| "Signup successful. Please login.".to_string()))
    }

    /// Upload a PDF for summarization, then refresh the document list.
    pub async fn upload(&mut self, path: &Path) -> Result<(), AppError> {
        let pdf = validate::pdf_file(path)?;
        let token = self.token()?;
        let ticket = self.tracker.begin(ActionKind::Upload);

        let result = self.client.upload(&token, pdf).await;
        let resp = match result {
            Ok(resp) => resp,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }

        self.store.mutate(SessionUpdate {
            summary: resp.summary,
            pdf_name: resp.pdf_name,
            current_document_id: resp.document_id,
            ..Default::default()
        });

        // The refreshed list also defaults the targeted document; a failure
        // here does not undo the upload.
        if let Err(err) = self.documents().await {
            warn!("Could not refresh document list: {}", err);
        }
        Ok(())
    }

    /// Send a chat turn about the targeted document. Returns the assistant
    /// message appended to the transcript.
    pub async fn chat(&mut self, query: &str) -> Result<ChatMessage, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::State("Query is required.".to_string()));
        }
        let token = self.token()?;
        let document_id = self.store.session().current_document_id.clone();
        let ticket = self.tracker.begin(ActionKind::Chat);

        let result = self.client.chat(&token, query, document_id.as_deref()).await;
        let resp = match result {
            Ok(resp) => resp,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }

        // Complete fact-check records go to the mirror log, never inline.
        let now = Utc::now();
        let records: Vec<FactCheckRecord> = resp
            .fact_checks()
            .into_iter()
            .map(|fc| FactCheckRecord {
                statement: fc.statement,
                supported: fc.supported,
                confidence: fc.confidence,
                evidence: fc.evidence,
                timestamp: now,
            })
            .collect();
        self.store.append_fact_checks(records);

        let answer = ChatMessage::assistant(resp.answer, resp.source);
        self.store.mutate(SessionUpdate {
            append_chat: vec![ChatMessage::user(query), answer.clone()],
            ..Default::default()
        });
        Ok(answer)
    }

    /// Search precedents for the targeted document. Returns a markdown
    /// rendering of whatever shape the service produced.
    pub async fn find_precedents(&mut self) -> Result<String, AppError> {
        if self.store.session().summary.is_none() {
            return Err(AppError::State(
                "Please upload a document first.".to_string(),
            ));
        }
        let token = self.token()?;
        let document_id = self.store.session().current_document_id.clone();
        let ticket = self.tracker.begin(ActionKind::FindPrecedents);

        let result = self
            .client
            .find_precedents(&token, document_id.as_deref())
            .await;
        let resp = match result {
            Ok(resp) => resp,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }
        Ok(panels::format_found_precedents(&resp.precedents))
    }

    /// Previously saved precedents.
    pub async fn saved_precedents(&mut self) -> Result<Vec<Precedent>, AppError> {
        let token = self.token()?;
        let ticket = self.tracker.begin(ActionKind::LoadPrecedents);

        let result = self.client.saved_precedents(&token).await;
        let list = match result {
            Ok(list) => list,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }
        Ok(list)
    }

    /// The user's uploaded documents. When nothing is targeted yet, the
    /// first listed document becomes the target.
    pub async fn documents(&mut self) -> Result<Vec<DocumentEntry>, AppError> {
        let token = self.token()?;
        let ticket = self.tracker.begin(ActionKind::LoadDocuments);

        let result = self.client.documents(&token).await;
        let docs = match result {
            Ok(docs) => docs,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }

        if self.store.session().current_document_id.is_none() {
            if let Some(first) = docs.first() {
                self.store.mutate(SessionUpdate {
                    current_document_id: Some(first.id.clone()),
                    ..Default::default()
                });
            }
        }
        Ok(docs)
    }

    /// Target a document for chat and precedent search. The service remains
    /// the source of truth for ownership.
    pub fn select_document(&mut self, document_id: &str) -> Result<(), AppError> {
        self.token()?;
        self.store.mutate(SessionUpdate {
            current_document_id: Some(document_id.to_string()),
            ..Default::default()
        });
        Ok(())
    }

    /// The server-side fact-check history.
    pub async fn fact_history(&mut self) -> Result<Vec<FactHistoryEntry>, AppError> {
        let token = self.token()?;
        let ticket = self.tracker.begin(ActionKind::FactHistory);

        let result = self.client.fact_history(&token).await;
        let history = match result {
            Ok(history) => history,
            Err(err) => return self.fail(err),
        };
        if !self.tracker.is_current(&ticket) {
            return Err(AppError::Superseded);
        }
        Ok(history)
    }

    /// Reset to the unauthenticated default and remove the mirror.
    pub fn logout(&mut self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_in(dir: &tempfile::TempDir) -> Settings {
        let mut settings = Settings::with_data_dir(dir.path().to_path_buf());
        // a port nothing listens on, so any network attempt fails fast
        settings.endpoint = url::Url::parse("http://127.0.0.1:9").unwrap();
        settings.request_timeout = 1;
        settings
    }

    fn authenticated_app(dir: &tempfile::TempDir) -> App {
        let mut app = App::new(&settings_in(dir));
        app.store.set_authenticated(Session {
            token: Some("t1".to_string()),
            username: Some("user@example.com".to_string()),
            summary: Some("a summary".to_string()),
            ..Default::default()
        });
        app
    }

    #[test]
    fn test_tracker_discards_superseded_tickets() {
        let tracker = ActionTracker::default();
        let first = tracker.begin(ActionKind::Chat);
        assert!(tracker.is_current(&first));

        let second = tracker.begin(ActionKind::Chat);
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));

        // other kinds are sequenced independently
        let upload = tracker.begin(ActionKind::Upload);
        assert!(tracker.is_current(&upload));
        assert!(tracker.is_current(&second));
    }

    #[test]
    fn test_session_expires_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = authenticated_app(&dir);

        assert!(app.expire_session());
        assert!(!app.session().is_authenticated());
        assert!(!app.expire_session());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_email_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(&settings_in(&dir));
        let err = app.login("not-an-email", "Secret1!").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::InvalidEmail)));
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = authenticated_app(&dir);

        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"plain text").unwrap();
        let err = app.upload(&path).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::NotPdf)));
    }

    #[tokio::test]
    async fn test_chat_requires_token() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(&settings_in(&dir));
        let err = app.chat("question").await.unwrap_err();
        assert!(matches!(err, AppError::Api(ApiError::MissingToken)));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = authenticated_app(&dir);
        let err = app.chat("   ").await.unwrap_err();
        assert!(matches!(err, AppError::State(_)));
    }

    #[tokio::test]
    async fn test_find_precedents_needs_a_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(&settings_in(&dir));
        app.store.set_authenticated(Session {
            token: Some("t1".to_string()),
            ..Default::default()
        });

        let err = app.find_precedents().await.unwrap_err();
        match err {
            AppError::State(msg) => assert_eq!(msg, "Please upload a document first."),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_select_document_requires_auth() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(&settings_in(&dir));
        assert!(app.select_document("doc-9").is_err());

        let mut app = authenticated_app(&dir);
        app.select_document("doc-9").unwrap();
        assert_eq!(app.session().current_document_id.as_deref(), Some("doc-9"));
    }
}
