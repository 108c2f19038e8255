//! Casebook: a client for a remote legal document-analysis service.
//!
//! The service owns every substantive computation (summarization, precedent
//! search, chat answering, fact-checking). This crate owns the client side:
//! session state and its persisted mirror, request orchestration against the
//! service's JSON API, and rendering of responses as sanitized HTML or styled
//! terminal output.

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod markdown;
pub mod server;
pub mod session;
pub mod validate;
pub mod view;
