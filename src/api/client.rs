//! HTTP client for the analysis service.
//!
//! Every exchange follows one template: build (bearer header for
//! authenticated calls), send, decode the JSON envelope, map non-2xx to a
//! user-facing message. A 401 on an authenticated call is reported as
//! session expiry; the caller owns the forced logout.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Settings;
use crate::validate::PdfFile;

use super::error::ApiError;
use super::models::{
    ChatResponse, Credentials, DocumentEntry, DocumentsResponse, ErrorEnvelope, FactHistoryEntry,
    FactHistoryResponse, FindPrecedentsResponse, LoginResponse, Precedent, SavedPrecedents,
    SignupResponse, UploadResponse,
};

pub struct ApiClient {
    client: Client,
    base: String,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout))
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");
        let base = settings.endpoint.as_str().trim_end_matches('/').to_string();

        Self { client, base }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    /// POST /login with credentials. A 401 here carries the server's own
    /// message (wrong password), not session expiry.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        debug!("Logging in as {}", username);
        let resp = self
            .client
            .post(self.url("login"))
            .json(&Credentials { username, password })
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode(status, &body, false, "Login failed")
    }

    /// POST /signup with credentials.
    pub async fn signup(&self, username: &str, password: &str) -> Result<SignupResponse, ApiError> {
        debug!("Signing up {}", username);
        let resp = self
            .client
            .post(self.url("signup"))
            .json(&Credentials { username, password })
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode(status, &body, false, "Signup failed")
    }

    /// POST /upload with a validated PDF as a multipart form.
    pub async fn upload(&self, token: &str, file: PdfFile) -> Result<UploadResponse, ApiError> {
        debug!("Uploading {}", file.name);
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let resp = self
            .client
            .post(self.url("upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode(status, &body, true, "File upload failed")
    }

    /// POST /find-precedents for the targeted document.
    pub async fn find_precedents(
        &self,
        token: &str,
        document_id: Option<&str>,
    ) -> Result<FindPrecedentsResponse, ApiError> {
        debug!("Finding precedents for {:?}", document_id);
        let resp = self
            .client
            .post(self.url("find-precedents"))
            .bearer_auth(token)
            .json(&json!({ "document_id": document_id }))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode(status, &body, true, "Failed to find precedents")
    }

    /// GET /get-precedents: previously saved cases.
    pub async fn saved_precedents(&self, token: &str) -> Result<Vec<Precedent>, ApiError> {
        let resp = self
            .client
            .get(self.url("get-precedents"))
            .bearer_auth(token)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        let saved: SavedPrecedents = decode(status, &body, true, "Failed to load precedents")?;
        Ok(saved.into_vec())
    }

    /// GET /get-documents: the user's uploaded documents.
    pub async fn documents(&self, token: &str) -> Result<Vec<DocumentEntry>, ApiError> {
        let resp = self
            .client
            .get(self.url("get-documents"))
            .bearer_auth(token)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        let listing: DocumentsResponse = decode(status, &body, true, "Could not load documents")?;
        Ok(listing.documents)
    }

    /// POST /chat with the query and targeted document.
    pub async fn chat(
        &self,
        token: &str,
        query: &str,
        document_id: Option<&str>,
    ) -> Result<ChatResponse, ApiError> {
        debug!("Sending chat query ({} chars)", query.len());
        let resp = self
            .client
            .post(self.url("chat"))
            .bearer_auth(token)
            .json(&json!({ "query": query, "document_id": document_id }))
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode(status, &body, true, "Chat request failed")
    }

    /// GET /fact-history: the server-side fact-check log.
    pub async fn fact_history(&self, token: &str) -> Result<Vec<FactHistoryEntry>, ApiError> {
        let resp = self
            .client
            .get(self.url("fact-history"))
            .bearer_auth(token)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        let history: FactHistoryResponse = decode(status, &body, true, "Failed to load history")?;
        Ok(history.history)
    }
}

/// Decode one response envelope.
///
/// Order matters: 401 on an authenticated call wins over everything, then
/// the body must be JSON at all, then non-2xx surfaces `detail` verbatim
/// (or the action's fallback message), and only then is the payload shaped.
fn decode<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
    authed: bool,
    fallback: &str,
) -> Result<T, ApiError> {
    if authed && status == StatusCode::UNAUTHORIZED {
        return Err(ApiError::SessionExpired);
    }

    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::UnexpectedResponse)?;

    if !status.is_success() {
        let detail = serde_json::from_value::<ErrorEnvelope>(value)
            .ok()
            .and_then(|e| e.detail);
        return Err(ApiError::Server {
            status: status.as_u16(),
            message: detail.unwrap_or_else(|| fallback.to_string()),
        });
    }

    serde_json::from_value(value).map_err(|e| {
        debug!("Response did not match the expected payload: {}", e);
        ApiError::UnexpectedResponse
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success() {
        let resp: SignupResponse = decode(
            StatusCode::CREATED,
            br#"{"message":"User created. Please login."}"#,
            false,
            "Signup failed",
        )
        .unwrap();
        assert_eq!(resp.message.as_deref(), Some("User created. Please login."));
    }

    #[test]
    fn test_decode_401_authed_is_session_expiry() {
        let err = decode::<ChatResponse>(
            StatusCode::UNAUTHORIZED,
            br#"{"detail":"Token has expired"}"#,
            true,
            "Chat request failed",
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
    }

    #[test]
    fn test_decode_401_unauthed_surfaces_detail() {
        let err = decode::<LoginResponse>(
            StatusCode::UNAUTHORIZED,
            br#"{"detail":"Incorrect username or password"}"#,
            false,
            "Login failed",
        )
        .unwrap_err();
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect username or password");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_failure_without_detail_uses_fallback() {
        let err = decode::<ChatResponse>(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"oops":true}"#,
            true,
            "Chat request failed",
        )
        .unwrap_err();
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Chat request failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_body() {
        let err = decode::<ChatResponse>(
            StatusCode::BAD_GATEWAY,
            b"<html>502 Bad Gateway</html>",
            true,
            "Chat request failed",
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse));
    }

    #[test]
    fn test_decode_success_with_wrong_shape() {
        let err = decode::<LoginResponse>(StatusCode::OK, br#"{"unrelated":1}"#, false, "Login failed")
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedResponse));
    }
}
