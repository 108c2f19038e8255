//! Projections of session and response data into something visible.
//!
//! `panels` builds HTML fragments for the local viewer and export; `term`
//! maps the same data to styled terminal output. Neither carries business
//! rules, so both render the same way under test as in front of a user.

pub mod panels;
pub mod term;
