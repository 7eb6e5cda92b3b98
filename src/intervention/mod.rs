//! Mood interventions
//!
//! After a low mood report the [`InterventionMachine`] offers jokes, images,
//! music, games, activities and mindfulness prompts. Local content is always
//! present; remote content from [`crate::providers::ContentProvider`]s is
//! fetched concurrently and merged best-effort.

mod bundle;
mod catalog;
mod machine;
mod music;
mod remote;

pub use bundle::{Category, InterventionBundle, InterventionItem, ItemOrigin};
pub use machine::{
    CloseOutcome, InterventionHistoryRecord, InterventionMachine, InterventionState, Reaction,
    SavedIntervention, TriggerOutcome,
};
pub use music::{MusicPlayer, PlayTicket, Playback};
pub use remote::{fetch_remote_content, remote_content_stream, RemoteBatch};
