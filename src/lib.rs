//! Coachkit - rule-based coaching engine
//!
//! This library answers nutrition questions from a built-in knowledge base,
//! optionally upgraded by a remote generation service, and runs short mood
//! interventions with local content plus best-effort remote jokes and images.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `intent`: Nutrition intent and mood classification
//! - `knowledge`: Built-in facts and the retrieval engine
//! - `engine`: Conversation, context building, synthesis and the `CoachEngine`
//! - `providers`: Remote generation and content provider abstractions
//! - `intervention`: Mood intervention state machine and content bundles
//! - `session`: Session lifecycle, persistence and expiry watchdog
//! - `storage`: SQLite journal of saved interventions
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Terminal host
//!
//! # Example
//!
//! ```
//! use coachkit::engine::{CoachEngine, Conversation};
//! use coachkit::profile::{Goal, UserProfile};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = CoachEngine::local();
//!     let mut conversation = Conversation::default();
//!     let profile = UserProfile::new("u1", Goal::MuscleGain);
//!
//!     let reply = engine
//!         .ask(&mut conversation, &profile, &[], "How much protein do I need?", None)
//!         .await;
//!     assert!(reply.is_local());
//!     assert_eq!(conversation.len(), 2);
//! }
//! ```

pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod intent;
pub mod intervention;
pub mod knowledge;
pub mod logging;
pub mod profile;
pub mod providers;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CoachEngine, SynthesizedResponse};
pub use error::{CoachError, Result};
pub use intent::{Intent, Mood};
pub use profile::UserProfile;

#[cfg(test)]
pub mod test_utils;
