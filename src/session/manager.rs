//! Session lifecycle manager
//!
//! Owns the session record, the conversation and the saved mood history.
//! `Uninitialized -> Active -> Warning -> Expired`, with restore from the
//! persisted store as an entry path into `Active`. Expiry never clears data:
//! the profile and buffers stay readable and the host switches to offline
//! mode until `refresh`.

use super::store::SessionStore;
use super::types::{expiry_after, SessionEvent, SessionRecord, SessionState};
use crate::clock::{Clock, SharedClock};
use crate::config::{Config, SessionConfig, MAX_SESSION_TTL_HOURS};
use crate::engine::conversation::{Conversation, ConversationTurn};
use crate::error::{CoachError, Result};
use crate::intervention::SavedIntervention;
use crate::profile::UserProfile;

use chrono::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Owns one user's session and its bounded buffers
///
/// # Examples
///
/// ```
/// use coachkit::clock::system_clock;
/// use coachkit::config::Config;
/// use coachkit::profile::{Goal, UserProfile};
/// use coachkit::session::{MemorySessionStore, SessionManager, SessionState};
///
/// let mut manager = SessionManager::from_config(
///     &Config::default(),
///     Box::new(MemorySessionStore::new()),
///     system_clock(),
/// );
/// assert_eq!(manager.init(), SessionState::Uninitialized);
/// manager.create(UserProfile::new("u1", Goal::WeightLoss));
/// assert_eq!(manager.state(), SessionState::Active);
/// ```
pub struct SessionManager {
    config: SessionConfig,
    store: Box<dyn SessionStore>,
    clock: SharedClock,
    state: SessionState,
    record: Option<SessionRecord>,
    conversation: Conversation,
    events: Option<UnboundedSender<SessionEvent>>,
}

impl SessionManager {
    /// Creates a manager
    ///
    /// `conversation` is an empty conversation carrying the window and
    /// retention limits to use for restored and new sessions.
    pub fn new(
        config: SessionConfig,
        conversation: Conversation,
        store: Box<dyn SessionStore>,
        clock: SharedClock,
    ) -> Self {
        Self {
            config,
            store,
            clock,
            state: SessionState::Uninitialized,
            record: None,
            conversation,
            events: None,
        }
    }

    /// Creates a manager with limits taken from `config`
    pub fn from_config(config: &Config, store: Box<dyn SessionStore>, clock: SharedClock) -> Self {
        let conversation = Conversation::new(
            config.engine.conversation_window,
            config.engine.max_conversation_turns,
        );
        Self::new(config.session.clone(), conversation, store, clock)
    }

    /// Returns a receiver for lifecycle notifications
    ///
    /// Replaces any earlier subscriber.
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// Restores a persisted session if one is valid
    ///
    /// A malformed or expired record is discarded and the manager stays
    /// `Uninitialized`. Store failures are logged, never returned.
    pub fn init(&mut self) -> SessionState {
        let blob = match self.store.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::debug!("No persisted session");
                return self.state;
            }
            Err(e) => {
                tracing::warn!("Failed to read persisted session: {:#}", e);
                return self.state;
            }
        };

        let now = self.clock.now();
        match serde_json::from_slice::<SessionRecord>(&blob) {
            Ok(record) if record.is_valid_at(now) => {
                self.conversation = Conversation::from_turns(
                    record.conversation.clone(),
                    self.conversation.window_size(),
                    self.conversation.max_turns(),
                );
                let mut record = record;
                truncate_front(&mut record.mood_history, self.config.max_mood_history);
                self.record = Some(record);
                self.state = SessionState::Active;
                tracing::info!("Session restored");
                self.emit(SessionEvent::Restored);
                self.tick();
            }
            Ok(_) => {
                tracing::warn!("Persisted session expired or incomplete, discarding");
                self.discard_persisted();
            }
            Err(e) => {
                tracing::warn!("Malformed persisted session, discarding: {}", e);
                self.discard_persisted();
            }
        }
        self.state
    }

    /// Starts a new session for `profile`, replacing any current one
    ///
    /// Returns the new session token.
    pub fn create(&mut self, profile: UserProfile) -> String {
        let record = SessionRecord::new(profile, self.clock.now(), self.ttl());
        let token = record.token.clone();
        tracing::info!("Session created for profile {}", record.profile.id);
        self.record = Some(record);
        self.conversation.clear();
        self.state = SessionState::Active;
        self.save_logged();
        self.emit(SessionEvent::Created);
        token
    }

    /// Extends expiry by the full TTL; safe in any state
    ///
    /// Returns false when there is no session to refresh.
    pub fn refresh(&mut self) -> bool {
        let now = self.clock.now();
        let ttl = self.ttl();
        let Some(record) = self.record.as_mut() else {
            return false;
        };
        record.expires_at = expiry_after(now, ttl);
        self.state = SessionState::Active;
        tracing::info!("Session refreshed until {}", record.expires_at);
        self.save_logged();
        self.emit(SessionEvent::Refreshed);
        true
    }

    /// Slides expiry forward on user activity while the session is live
    ///
    /// An expired session needs an explicit `refresh`.
    pub fn touch(&mut self) {
        if matches!(self.state, SessionState::Active | SessionState::Warning) {
            let now = self.clock.now();
            let ttl = self.ttl();
            if let Some(record) = self.record.as_mut() {
                record.expires_at = expiry_after(now, ttl);
                self.state = SessionState::Active;
            }
        }
    }

    /// Clears the persisted session and every buffer
    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear persisted session: {:#}", e);
        }
        self.record = None;
        self.conversation.clear();
        self.state = SessionState::Uninitialized;
        tracing::info!("Logged out");
        self.emit(SessionEvent::LoggedOut);
    }

    /// Evaluates the warning and expiry thresholds
    ///
    /// Returns the event emitted by this call, if any. Each threshold fires
    /// once per expiry period.
    pub fn tick(&mut self) -> Option<SessionEvent> {
        let now = self.clock.now();
        let remaining = self.record.as_ref()?.remaining(now);

        let state = self.state;
        let event = match state {
            SessionState::Active | SessionState::Warning if remaining <= Duration::zero() => {
                self.state = SessionState::Expired;
                tracing::warn!("Session expired, continuing offline");
                SessionEvent::Expired
            }
            SessionState::Active if remaining <= self.warning() => {
                self.state = SessionState::Warning;
                tracing::info!("Session expires in {} minutes", remaining.num_minutes());
                SessionEvent::Warning { remaining }
            }
            _ => return None,
        };
        self.emit(event.clone());
        Some(event)
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the host should work offline
    pub fn is_expired(&self) -> bool {
        self.state == SessionState::Expired
    }

    /// Current record
    pub fn record(&self) -> Option<&SessionRecord> {
        self.record.as_ref()
    }

    /// Profile of the current session, readable even after expiry
    pub fn profile(&self) -> Option<&UserProfile> {
        self.record.as_ref().map(|r| &r.profile)
    }

    /// Replaces the profile and persists
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Session` when there is no session
    pub fn update_profile(&mut self, profile: UserProfile) -> Result<()> {
        let record = self
            .record
            .as_mut()
            .ok_or_else(|| CoachError::Session("No active session".to_string()))?;
        record.profile = profile;
        self.persist()
    }

    /// The conversation
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Mutable conversation, for the engine to append to
    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Turns passed into context for the next query
    pub fn conversation_window(&self) -> &[ConversationTurn] {
        self.conversation.window()
    }

    /// Saved interventions, oldest first
    pub fn mood_history(&self) -> &[SavedIntervention] {
        self.record
            .as_ref()
            .map(|r| r.mood_history.as_slice())
            .unwrap_or(&[])
    }

    /// Appends a saved intervention, keeping the newest `max_mood_history`
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Session` when there is no session, or the
    /// persist error
    pub fn record_mood(&mut self, saved: SavedIntervention) -> Result<()> {
        let limit = self.config.max_mood_history;
        let record = self
            .record
            .as_mut()
            .ok_or_else(|| CoachError::Session("No active session".to_string()))?;
        record.mood_history.push(saved);
        truncate_front(&mut record.mood_history, limit);
        self.persist()
    }

    /// Writes the record and conversation to the store
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the store write fails
    pub fn persist(&mut self) -> Result<()> {
        let Some(record) = self.record.as_mut() else {
            return Ok(());
        };
        record.conversation = self.conversation.turns().to_vec();
        let blob = serde_json::to_vec(record)?;
        self.store.save(&blob)
    }

    fn save_logged(&mut self) {
        if let Err(e) = self.persist() {
            tracing::warn!("Failed to persist session: {:#}", e);
        }
    }

    fn discard_persisted(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear persisted session: {:#}", e);
        }
        self.record = None;
        self.state = SessionState::Uninitialized;
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                tracing::debug!("Session event receiver dropped");
            }
        }
    }

    fn ttl(&self) -> Duration {
        Duration::hours(self.config.ttl_hours.min(MAX_SESSION_TTL_HOURS) as i64)
    }

    fn warning(&self) -> Duration {
        Duration::minutes(self.config.warning_minutes.min(MAX_SESSION_TTL_HOURS * 60) as i64)
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state)
            .field("record", &self.record.as_ref().map(|r| &r.token))
            .field("turns", &self.conversation.len())
            .finish()
    }
}

fn truncate_front<T>(items: &mut Vec<T>, limit: usize) {
    if items.len() > limit {
        let excess = items.len() - limit;
        items.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::intervention::{Category, InterventionItem};
    use crate::profile::{Goal, MoodEntry};
    use crate::session::MemorySessionStore;
    use std::sync::Arc;

    fn config() -> SessionConfig {
        SessionConfig {
            ttl_hours: 24,
            warning_minutes: 60,
            max_mood_history: 2,
        }
    }

    fn manager_with(store: MemorySessionStore) -> (SessionManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let manager = SessionManager::new(
            config(),
            Conversation::new(6, 100),
            Box::new(store),
            clock.clone(),
        );
        (manager, clock)
    }

    fn saved(rating: u8) -> SavedIntervention {
        SavedIntervention {
            entry: MoodEntry::new(chrono::Utc::now(), rating, None, ""),
            mood: crate::intent::Mood::Sad,
            shown: vec![InterventionItem::local(Category::Jokes, "j")],
            records: Vec::new(),
            saved_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_oversized_lifetime_is_clamped() {
        let clock = Arc::new(ManualClock::starting_now());
        let mut manager = SessionManager::new(
            SessionConfig {
                ttl_hours: 10_000_000_000,
                warning_minutes: u64::MAX,
                max_mood_history: 2,
            },
            Conversation::new(6, 100),
            Box::new(MemorySessionStore::new()),
            clock.clone(),
        );
        manager.create(UserProfile::new("u", Goal::Maintenance));
        let expires_at = manager.record().unwrap().expires_at;
        assert_eq!(
            expires_at,
            clock.now() + Duration::hours(MAX_SESSION_TTL_HOURS as i64)
        );
        assert!(manager.refresh());
        manager.touch();
        assert_eq!(manager.state(), SessionState::Active);
    }

    #[test]
    fn test_init_without_blob() {
        let (mut manager, _) = manager_with(MemorySessionStore::new());
        assert_eq!(manager.init(), SessionState::Uninitialized);
        assert!(manager.profile().is_none());
    }

    #[test]
    fn test_malformed_blob_is_discarded() {
        let (mut manager, _) = manager_with(MemorySessionStore::with_blob("{not json"));
        let mut events = manager.subscribe();
        assert_eq!(manager.init(), SessionState::Uninitialized);
        assert!(events.try_recv().is_err());
        assert_eq!(manager.store.load().unwrap(), None);
    }

    #[test]
    fn test_create_emits_and_persists() {
        let (mut manager, _) = manager_with(MemorySessionStore::new());
        let mut events = manager.subscribe();
        manager.create(UserProfile::new("u", Goal::MuscleGain));
        assert_eq!(events.try_recv().unwrap(), SessionEvent::Created);
        assert!(manager.store.load().unwrap().is_some());
    }

    #[test]
    fn test_warning_then_expired_keeps_profile() {
        let (mut manager, clock) = manager_with(MemorySessionStore::new());
        manager.create(UserProfile::new("u", Goal::MuscleGain));
        manager
            .conversation_mut()
            .add_user_turn("hello", clock.now());

        clock.advance(Duration::hours(22));
        assert_eq!(manager.tick(), None);

        clock.advance(Duration::hours(1));
        assert_eq!(
            manager.tick(),
            Some(SessionEvent::Warning {
                remaining: Duration::hours(1)
            })
        );
        assert_eq!(manager.state(), SessionState::Warning);
        assert_eq!(manager.tick(), None);

        clock.advance(Duration::hours(2));
        assert_eq!(manager.tick(), Some(SessionEvent::Expired));
        assert_eq!(manager.state(), SessionState::Expired);
        assert!(manager.is_expired());
        assert_eq!(manager.profile().unwrap().id, "u");
        assert_eq!(manager.conversation().len(), 1);
        assert_eq!(manager.tick(), None);
    }

    #[test]
    fn test_refresh_after_expiry_reactivates() {
        let (mut manager, clock) = manager_with(MemorySessionStore::new());
        manager.create(UserProfile::new("u", Goal::Maintenance));
        clock.advance(Duration::hours(25));
        manager.tick();
        assert!(manager.refresh());
        assert_eq!(manager.state(), SessionState::Active);
        assert_eq!(
            manager.record().unwrap().expires_at,
            clock.now() + Duration::hours(24)
        );
    }

    #[test]
    fn test_refresh_without_session() {
        let (mut manager, _) = manager_with(MemorySessionStore::new());
        assert!(!manager.refresh());
        assert_eq!(manager.state(), SessionState::Uninitialized);
    }

    #[test]
    fn test_touch_does_not_revive_expired() {
        let (mut manager, clock) = manager_with(MemorySessionStore::new());
        manager.create(UserProfile::new("u", Goal::Maintenance));
        clock.advance(Duration::hours(25));
        manager.tick();
        manager.touch();
        assert_eq!(manager.state(), SessionState::Expired);
    }

    #[test]
    fn test_logout_clears_everything() {
        let (mut manager, clock) = manager_with(MemorySessionStore::new());
        manager.create(UserProfile::new("u", Goal::Maintenance));
        manager.conversation_mut().add_user_turn("x", clock.now());
        manager.record_mood(saved(1)).unwrap();
        manager.logout();
        assert_eq!(manager.state(), SessionState::Uninitialized);
        assert!(manager.conversation().is_empty());
        assert!(manager.mood_history().is_empty());
        assert_eq!(manager.store.load().unwrap(), None);
    }

    #[test]
    fn test_mood_history_is_bounded() {
        let (mut manager, _) = manager_with(MemorySessionStore::new());
        manager.create(UserProfile::new("u", Goal::Maintenance));
        for rating in 1..=3 {
            manager.record_mood(saved(rating)).unwrap();
        }
        let ratings: Vec<u8> = manager.mood_history().iter().map(|s| s.entry.rating).collect();
        assert_eq!(ratings, vec![2, 3]);
    }

    #[test]
    fn test_record_mood_without_session_errors() {
        let (mut manager, _) = manager_with(MemorySessionStore::new());
        let err = manager.record_mood(saved(1)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoachError>(),
            Some(CoachError::Session(_))
        ));
    }
}
