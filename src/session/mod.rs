//! Client session state and its persisted mirror.

pub mod mirror;
pub mod model;
pub mod store;

pub use mirror::{PersistedState, SessionMirror};
pub use model::{ChatMessage, ChatRole, FactCheckRecord, Session};
pub use store::{SessionStore, SessionUpdate};
