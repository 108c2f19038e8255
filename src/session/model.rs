//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single turn of the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Attribution line for assistant answers ("Source: …").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            source: None,
        }
    }

    pub fn assistant(content: impl Into<String>, source: Option<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            source,
        }
    }
}

/// The authenticated user's view of their data.
///
/// `token` absent means unauthenticated, and every other field is at its
/// default; the only path that drops the token is a wholesale reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// Opaque bearer credential. Present iff authenticated.
    pub token: Option<String>,
    pub user_id: Option<i64>,
    pub username: Option<String>,
    /// Last-known document summary (markdown).
    pub summary: Option<String>,
    /// Display name of the last uploaded document.
    pub pdf_name: Option<String>,
    /// Document currently targeted by precedent and chat requests. The
    /// service is the source of truth for ownership.
    pub current_document_id: Option<String>,
    /// Append-only during a session; replaced wholesale on login/logout.
    pub chat_history: Vec<ChatMessage>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// A fact-check assessment attached to a chat answer.
///
/// Accumulated in the persisted mirror, never shown inline in the
/// transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckRecord {
    pub statement: String,
    pub supported: bool,
    /// 0.0 ..= 1.0
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    pub timestamp: DateTime<Utc>,
}
