//! Session lifecycle
//!
//! Persisted session restore, expiry warnings, degraded-mode expiry, refresh
//! and logout, plus ownership of the conversation and mood history buffers.

mod manager;
mod store;
mod types;
mod watchdog;

pub use manager::SessionManager;
pub use store::{MemorySessionStore, SessionStore, SledSessionStore, SESSION_KEY};
pub use types::{SessionEvent, SessionRecord, SessionState};
pub use watchdog::spawn_watchdog;
