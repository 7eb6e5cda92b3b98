//! Query pipeline
//!
//! Classification, context assembly, retrieval and synthesis for the
//! nutrition chat, plus the bounded conversation they share.

pub mod coach;
pub mod context;
pub mod conversation;
pub mod metrics;
pub mod synthesizer;
pub mod templates;

pub use coach::CoachEngine;
pub use context::{CoachContext, ContextBuilder};
pub use conversation::{Conversation, ConversationTurn, Role};
pub use synthesizer::{ResponseSource, ResponseSynthesizer, SynthesizedResponse};
