//! Client-side validation gates.
//!
//! These run before any network traffic. A failure here is surfaced inline
//! and the action is never sent to the service.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// A local validation failure.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please use a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least 8 chars and include upper, lower, number, symbol.")]
    WeakPassword,
    #[error("Only PDF files are allowed.")]
    NotPdf,
    #[error("Could not read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Usernames are email addresses.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// At least 8 characters with lowercase, uppercase, digit, and symbol classes.
pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= 8
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// Gate for login: username must look like an email.
pub fn login(username: &str) -> Result<(), ValidationError> {
    if !is_valid_email(username) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Gate for signup: email-shaped username and a strong password.
pub fn signup(username: &str, password: &str) -> Result<(), ValidationError> {
    if !is_valid_email(username) {
        return Err(ValidationError::InvalidEmail);
    }
    if !is_strong_password(password) {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

/// A validated PDF ready for upload.
#[derive(Debug, Clone)]
pub struct PdfFile {
    /// Display name sent as the multipart filename.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Gate for upload: the file must carry a `.pdf` name and PDF magic bytes.
pub fn pdf_file(path: &Path) -> Result<PdfFile, ValidationError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    if !name.to_ascii_lowercase().ends_with(".pdf") {
        return Err(ValidationError::NotPdf);
    }

    let bytes = fs::read(path).map_err(|source| ValidationError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    match infer::get(&bytes) {
        Some(kind) if kind.mime_type() == "application/pdf" => Ok(PdfFile { name, bytes }),
        _ => Err(ValidationError::NotPdf),
    }
}
