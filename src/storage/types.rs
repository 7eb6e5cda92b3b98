use crate::intent::Mood;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary row for a saved intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Mood entry identifier (ULID)
    pub id: String,
    /// When the mood was reported
    pub reported_at: DateTime<Utc>,
    /// When the user saved the intervention
    pub saved_at: DateTime<Utc>,
    /// Rating on a 1-5 scale
    pub rating: u8,
    /// Mood the bundle was built for
    pub mood: Mood,
    /// Free-text note from the report
    pub note: String,
    /// Number of items shown
    pub shown_count: usize,
    /// Number of items marked as helpful
    pub helped_count: usize,
}
