//! Errors surfaced by gateway exchanges.

use thiserror::Error;

/// A failed exchange. Every variant is terminal for the triggering action
/// only; nothing is retried automatically.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An authenticated call was attempted without a stored token. Raised
    /// locally, before any network traffic.
    #[error("Missing authentication token. Please log in.")]
    MissingToken,

    /// The service answered 401 on an authenticated call.
    #[error("Session expired or invalid token.")]
    SessionExpired,

    /// Non-2xx with a message: the server's `detail` verbatim when present,
    /// otherwise an action-specific fallback.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The body was not the JSON envelope we expect.
    #[error("Unexpected response from server (not JSON).")]
    UnexpectedResponse,

    /// Transport-level failure (unreachable host, timeout, TLS).
    #[error("Could not reach the service: {0}")]
    Network(#[from] reqwest::Error),
}
