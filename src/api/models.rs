//! Wire types for the analysis service's JSON API.
//!
//! The service is permissive about shapes: ids may arrive as numbers or
//! strings, precedent lists may arrive as structured records, free text, or
//! arbitrary JSON, and fact-check lists may contain non-record entries.
//! Deserialization here absorbs that so callers see one shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::session::ChatMessage;

/// Login/signup request body.
#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// POST /login success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub pdf_name: Option<String>,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub current_document_id: Option<String>,
}

/// POST /signup success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /upload success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub pdf_name: Option<String>,
}

/// A legal case record. Display-only; never mutated client-side.
#[derive(Debug, Clone, Deserialize)]
pub struct Precedent {
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub court: Option<String>,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub year: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub created_at: Option<String>,
}

/// POST /find-precedents returns structured cases, formatted text, or
/// whatever else the upstream agent produced.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PrecedentsPayload {
    Listed(Vec<Precedent>),
    Text(String),
    Other(Value),
}

impl Default for PrecedentsPayload {
    fn default() -> Self {
        PrecedentsPayload::Text(String::new())
    }
}

/// POST /find-precedents success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct FindPrecedentsResponse {
    #[serde(default)]
    pub precedents: PrecedentsPayload,
}

/// GET /get-precedents: a bare array or wrapped under `precedents`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SavedPrecedents {
    Bare(Vec<Precedent>),
    Wrapped {
        #[serde(default)]
        precedents: Vec<Precedent>,
    },
}

impl SavedPrecedents {
    pub fn into_vec(self) -> Vec<Precedent> {
        match self {
            SavedPrecedents::Bare(list) => list,
            SavedPrecedents::Wrapped { precedents } => precedents,
        }
    }
}

/// One entry of GET /get-documents.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentEntry {
    #[serde(deserialize_with = "loose_string")]
    pub id: String,
    #[serde(default)]
    pub pdf_name: Option<String>,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub created_at: Option<String>,
}

/// GET /get-documents success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsResponse {
    #[serde(default)]
    pub documents: Vec<DocumentEntry>,
}

/// A complete fact-check assessment from a chat answer.
#[derive(Debug, Clone, Deserialize)]
pub struct FactCheck {
    pub statement: String,
    pub supported: bool,
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Option<String>,
}

/// POST /chat success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub fact_check: Vec<Value>,
}

impl ChatResponse {
    /// The complete fact-check records in this answer. The service pads the
    /// list with error markers (`{"error": …}`) when checking was skipped;
    /// those are dropped.
    pub fn fact_checks(&self) -> Vec<FactCheck> {
        self.fact_check
            .iter()
            .filter_map(|v| match serde_json::from_value::<FactCheck>(v.clone()) {
                Ok(check) => Some(check),
                Err(_) => {
                    debug!("Skipping incomplete fact-check entry: {}", v);
                    None
                }
            })
            .collect()
    }
}

/// One entry of GET /fact-history.
#[derive(Debug, Clone, Deserialize)]
pub struct FactHistoryEntry {
    pub statement: String,
    #[serde(default)]
    pub supported: bool,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default, deserialize_with = "opt_loose_string")]
    pub timestamp: Option<String>,
}

/// GET /fact-history success payload.
#[derive(Debug, Clone, Deserialize)]
pub struct FactHistoryResponse {
    #[serde(default)]
    pub history: Vec<FactHistoryEntry>,
}

/// Error envelope carried by non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub detail: Option<String>,
}

fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn opt_loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_tolerates_missing_fields() {
        let resp: LoginResponse = serde_json::from_str(
            r#"{"access_token":"t1","username":"user@example.com","chat_history":[]}"#,
        )
        .unwrap();
        assert_eq!(resp.access_token, "t1");
        assert!(resp.summary.is_none());
        assert!(resp.chat_history.is_empty());
    }

    #[test]
    fn test_login_response_numeric_document_id() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"access_token":"t","current_document_id":42}"#).unwrap();
        assert_eq!(resp.current_document_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_precedent_title_alias_and_loose_year() {
        let p: Precedent =
            serde_json::from_str(r#"{"title":"Roe v. Wade","court":"SCOTUS","year":1973}"#).unwrap();
        assert_eq!(p.name.as_deref(), Some("Roe v. Wade"));
        assert_eq!(p.year.as_deref(), Some("1973"));
    }

    #[test]
    fn test_precedents_payload_variants() {
        let listed: FindPrecedentsResponse =
            serde_json::from_str(r#"{"precedents":[{"name":"A v. B","year":"2001"}]}"#).unwrap();
        assert!(matches!(listed.precedents, PrecedentsPayload::Listed(ref l) if l.len() == 1));

        let text: FindPrecedentsResponse =
            serde_json::from_str(r#"{"precedents":"**1. A v. B**"}"#).unwrap();
        assert!(matches!(text.precedents, PrecedentsPayload::Text(ref s) if s.starts_with("**1.")));

        let object: FindPrecedentsResponse =
            serde_json::from_str(r#"{"precedents":{"note":"unusual"}}"#).unwrap();
        assert!(matches!(object.precedents, PrecedentsPayload::Other(_)));
    }

    #[test]
    fn test_saved_precedents_both_shapes() {
        let bare: SavedPrecedents = serde_json::from_str(r#"[{"name":"A"}]"#).unwrap();
        assert_eq!(bare.into_vec().len(), 1);

        let wrapped: SavedPrecedents =
            serde_json::from_str(r#"{"precedents":[{"name":"A"},{"name":"B"}]}"#).unwrap();
        assert_eq!(wrapped.into_vec().len(), 2);
    }

    #[test]
    fn test_chat_response_drops_incomplete_fact_checks() {
        let resp: ChatResponse = serde_json::from_str(
            r#"{
                "answer": "**Yes.**",
                "source": "Doc A",
                "fact_check": [
                    {"statement":"X holds","supported":true,"confidence":0.8,"evidence":"p3"},
                    {"error":"No valid evidence for fact check."}
                ]
            }"#,
        )
        .unwrap();
        let checks = resp.fact_checks();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].statement, "X holds");
        assert!(checks[0].supported);
    }

    #[test]
    fn test_document_entry_numeric_id() {
        let doc: DocumentEntry =
            serde_json::from_str(r#"{"id":7,"pdf_name":"brief.pdf","created_at":"2026-01-01"}"#)
                .unwrap();
        assert_eq!(doc.id, "7");
    }
}
