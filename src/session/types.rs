//! Session record and lifecycle types

use crate::engine::conversation::ConversationTurn;
use crate::intervention::SavedIntervention;
use crate::profile::UserProfile;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// No session; waiting for a profile
    Uninitialized,
    /// Live session
    Active,
    /// Live session close to expiry
    Warning,
    /// Past expiry; the host keeps working in degraded mode
    Expired,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Active => "active",
            Self::Warning => "warning",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// Notification emitted on lifecycle transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new session was created
    Created,
    /// A persisted session was restored
    Restored,
    /// Expiry is near
    Warning {
        /// Time left before expiry
        remaining: Duration,
    },
    /// The session expired; the host should switch to offline mode
    Expired,
    /// The expiry was extended
    Refreshed,
    /// The session and its buffers were cleared
    LoggedOut,
}

/// Persisted session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Opaque session token
    pub token: String,
    /// Profile snapshot
    pub profile: UserProfile,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the session expires
    pub expires_at: DateTime<Utc>,
    /// Retained conversation turns, oldest first
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
    /// Saved interventions, oldest first
    #[serde(default)]
    pub mood_history: Vec<SavedIntervention>,
}

/// `now + ttl`, saturating at the latest representable instant
pub fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl SessionRecord {
    /// Creates a record for `profile` expiring `ttl` after `now`
    pub fn new(profile: UserProfile, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token: uuid::Uuid::new_v4().to_string(),
            profile,
            created_at: now,
            expires_at: expiry_after(now, ttl),
            conversation: Vec::new(),
            mood_history: Vec::new(),
        }
    }

    /// Whether the record is well-formed and not yet expired
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty()
            && !self.profile.id.is_empty()
            && self.expires_at > self.created_at
            && self.expires_at > now
    }

    /// Time left before expiry, zero once expired
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}
