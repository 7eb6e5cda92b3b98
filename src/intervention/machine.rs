//! Intervention state machine
//!
//! `Idle -> Triggered -> Offering -> (Cycling)* -> Closed`. A low mood report
//! opens the machine with a local bundle; user actions advance per-category
//! indices and record interactions; dismissal, save or an idle timeout
//! closes it. Saving hands back the entry and everything shown, then resets
//! the machine to `Idle`.

use super::bundle::{Category, InterventionBundle, InterventionItem};
use super::music::{MusicPlayer, PlayTicket};
use super::remote::RemoteBatch;
use crate::clock::{Clock, SharedClock};
use crate::config::InterventionConfig;
use crate::engine::metrics;
use crate::intent::Mood;
use crate::knowledge::RetrievalEngine;
use crate::profile::{MoodEntry, UserProfile};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Machine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterventionState {
    /// Waiting for a low mood report
    Idle,
    /// A low report arrived; the bundle is being prepared
    Triggered,
    /// Content is on offer
    Offering,
    /// The user is moving through content
    Cycling,
    /// Dismissed or timed out
    Closed,
}

impl InterventionState {
    /// Whether content is on offer
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Triggered | Self::Offering | Self::Cycling)
    }
}

impl fmt::Display for InterventionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Triggered => "triggered",
            Self::Offering => "offering",
            Self::Cycling => "cycling",
            Self::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// How the user felt about an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// It helped
    Helped,
    /// No change
    Neutral,
    /// It did not help
    NotHelpful,
}

impl Reaction {
    /// Parses a reaction label
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "helped" | "helpful" => Some(Self::Helped),
            "neutral" | "meh" => Some(Self::Neutral),
            "not_helpful" | "unhelpful" => Some(Self::NotHelpful),
            _ => None,
        }
    }

    /// Snake-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Helped => "helped",
            Self::Neutral => "neutral",
            Self::NotHelpful => "not_helpful",
        }
    }
}

/// How an intervention ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The user dismissed it
    Dismiss,
    /// The user saved the entry and what was shown
    Save,
    /// No interaction within the open ceiling
    Timeout,
}

/// One item shown to the user, with their reaction if they gave one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionHistoryRecord {
    /// Record identifier (ULID)
    pub id: String,
    /// Mood entry the intervention answered
    pub mood_entry_id: String,
    /// Item shown
    pub item: InterventionItem,
    /// Reaction, when the record marks a completed interaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<Reaction>,
    /// When it happened
    pub timestamp: DateTime<Utc>,
}

/// Result of saving an intervention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedIntervention {
    /// The mood report that opened the intervention
    pub entry: MoodEntry,
    /// Mood the bundle was built for
    pub mood: Mood,
    /// Items shown, in order
    pub shown: Vec<InterventionItem>,
    /// Interaction records, in order
    pub records: Vec<InterventionHistoryRecord>,
    /// When the user saved
    pub saved_at: DateTime<Utc>,
}

/// Result of reporting a mood
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The mood was not low enough to intervene
    NotLow,
    /// An intervention is already open
    AlreadyOpen,
    /// A new intervention opened with this trigger id
    Opened(String),
}

/// State machine for one user's mood interventions
///
/// # Examples
///
/// ```
/// use coachkit::clock::system_clock;
/// use coachkit::config::InterventionConfig;
/// use coachkit::intent::Mood;
/// use coachkit::intervention::{Category, InterventionMachine, InterventionState, TriggerOutcome};
/// use coachkit::knowledge::RetrievalEngine;
/// use coachkit::profile::{MoodEntry, UserProfile};
///
/// let mut machine = InterventionMachine::new(InterventionConfig::default(), system_clock());
/// let entry = MoodEntry::new(chrono::Utc::now(), 1, Some(Mood::Anxious), "");
/// let outcome = machine.trigger(entry, Mood::Anxious, &RetrievalEngine::default(), &UserProfile::default());
/// assert!(matches!(outcome, TriggerOutcome::Opened(_)));
/// assert_eq!(machine.state(), InterventionState::Offering);
/// assert!(machine.advance(Category::Jokes).is_some());
/// assert_eq!(machine.state(), InterventionState::Cycling);
/// ```
#[derive(Debug)]
pub struct InterventionMachine {
    config: InterventionConfig,
    clock: SharedClock,
    state: InterventionState,
    trigger_id: Option<String>,
    entry: Option<MoodEntry>,
    bundle: Option<InterventionBundle>,
    indices: HashMap<Category, usize>,
    hidden: HashSet<Category>,
    shown: Vec<InterventionItem>,
    records: Vec<InterventionHistoryRecord>,
    music: MusicPlayer,
    last_activity: Option<DateTime<Utc>>,
}

impl InterventionMachine {
    /// Creates an idle machine
    pub fn new(config: InterventionConfig, clock: SharedClock) -> Self {
        Self {
            config,
            clock,
            state: InterventionState::Idle,
            trigger_id: None,
            entry: None,
            bundle: None,
            indices: HashMap::new(),
            hidden: HashSet::new(),
            shown: Vec::new(),
            records: Vec::new(),
            music: MusicPlayer::new(),
            last_activity: None,
        }
    }

    /// Whether a report with this rating and mood opens an intervention
    pub fn is_low(&self, rating: u8, mood: Mood) -> bool {
        rating <= self.config.low_mood_threshold || mood.is_low()
    }

    /// Handles a new mood report
    ///
    /// A low report moves `Idle` (or `Closed`) through `Triggered` to
    /// `Offering` with a local bundle. Remote content is requested separately
    /// with the returned trigger id.
    pub fn trigger(
        &mut self,
        entry: MoodEntry,
        mood: Mood,
        retrieval: &RetrievalEngine,
        profile: &UserProfile,
    ) -> TriggerOutcome {
        if self.state.is_open() {
            return TriggerOutcome::AlreadyOpen;
        }
        if !self.is_low(entry.rating, mood) {
            tracing::debug!(rating = entry.rating, mood = %mood, "Mood not low, no intervention");
            return TriggerOutcome::NotLow;
        }

        self.reset();
        let trigger_id = ulid::Ulid::new().to_string();
        self.state = InterventionState::Triggered;
        self.trigger_id = Some(trigger_id.clone());
        tracing::info!(mood = %mood, rating = entry.rating, "Intervention triggered");
        metrics::record_intervention(mood);

        let bundle = InterventionBundle::local(mood, retrieval, profile);
        for category in Category::ALL {
            if let Some(first) = bundle.items(category).first() {
                self.shown.push(first.clone());
            }
        }
        self.bundle = Some(bundle);
        self.entry = Some(entry);
        self.last_activity = Some(self.clock.now());
        self.state = InterventionState::Offering;

        TriggerOutcome::Opened(trigger_id)
    }

    /// Merges remote items fetched for the current trigger
    ///
    /// Batches for an earlier trigger, or arriving after close, are ignored.
    /// Returns the number of items added.
    pub fn merge_remote(&mut self, batch: RemoteBatch) -> usize {
        if !self.state.is_open() || self.trigger_id.as_deref() != Some(batch.trigger_id.as_str()) {
            tracing::debug!("Ignoring stale remote content");
            return 0;
        }
        match self.bundle.as_mut() {
            Some(bundle) => {
                let added = bundle.merge(batch.items);
                tracing::debug!("Merged {} remote items", added);
                added
            }
            None => 0,
        }
    }

    /// Item currently offered in `category`
    pub fn current(&self, category: Category) -> Option<&InterventionItem> {
        if !self.state.is_open() || self.hidden.contains(&category) {
            return None;
        }
        let items = self.bundle.as_ref()?.items(category);
        let index = self.indices.get(&category).copied().unwrap_or(0);
        items.get(index % items.len().max(1))
    }

    /// Moves to the next item in `category`, wrapping around
    ///
    /// Returns `None` when the machine is not open, the category is hidden or
    /// it has no items.
    pub fn advance(&mut self, category: Category) -> Option<&InterventionItem> {
        if !self.state.is_open() || self.hidden.contains(&category) {
            return None;
        }
        let len = self.bundle.as_ref()?.items(category).len();
        if len == 0 {
            return None;
        }

        let index = self.indices.entry(category).or_insert(0);
        *index = (*index + 1) % len;
        let index = *index;
        self.state = InterventionState::Cycling;

        let item = self.bundle.as_ref()?.items(category).get(index)?.clone();
        self.record(item.clone(), None);
        self.shown.push(item);
        self.shown.last()
    }

    /// Hides `category` for the rest of this intervention
    pub fn stop(&mut self, category: Category) {
        if self.hidden.insert(category) {
            tracing::debug!(category = %category, "Category hidden");
        }
        if category == Category::Music {
            self.music.stop();
        }
        self.touch();
    }

    /// Whether `category` was hidden
    pub fn is_hidden(&self, category: Category) -> bool {
        self.hidden.contains(&category)
    }

    /// Records the user's reaction to the current item of `category`
    ///
    /// Returns false when there is no current item.
    pub fn react(&mut self, category: Category, reaction: Reaction) -> bool {
        match self.current(category).cloned() {
            Some(item) => {
                self.record(item, Some(reaction));
                true
            }
            None => false,
        }
    }

    /// Starts the current music item, stopping anything in flight
    pub fn play_music(&mut self) -> Option<PlayTicket> {
        let track = self.current(Category::Music)?.text.clone();
        self.touch();
        Some(self.music.play(track))
    }

    /// Stops music; always safe
    pub fn stop_music(&mut self) {
        self.music.stop();
    }

    /// The music side channel
    pub fn music(&self) -> &MusicPlayer {
        &self.music
    }

    /// Mutable access to the music side channel, for confirming starts
    pub fn music_mut(&mut self) -> &mut MusicPlayer {
        &mut self.music
    }

    /// Closes the machine when it has been idle past the open ceiling
    ///
    /// Returns true if this call closed it.
    pub fn tick(&mut self) -> bool {
        if !self.state.is_open() {
            return false;
        }
        let Some(last) = self.last_activity else {
            return false;
        };
        let ceiling = chrono::Duration::seconds(self.config.max_open_seconds as i64);
        if self.clock.now() - last >= ceiling {
            tracing::info!("Intervention timed out");
            self.close(CloseOutcome::Timeout);
            return true;
        }
        false
    }

    /// Closes the intervention
    ///
    /// Always stops music. Saving an open intervention returns what was shown
    /// and resets to `Idle`; every other call leaves the machine `Closed`.
    /// Safe to call repeatedly in any state.
    pub fn close(&mut self, outcome: CloseOutcome) -> Option<SavedIntervention> {
        self.music.stop();

        if outcome == CloseOutcome::Save && self.state.is_open() {
            let saved = self.entry.take().map(|entry| SavedIntervention {
                entry,
                mood: self
                    .bundle
                    .as_ref()
                    .map(InterventionBundle::mood)
                    .unwrap_or(Mood::Neutral),
                shown: std::mem::take(&mut self.shown),
                records: std::mem::take(&mut self.records),
                saved_at: self.clock.now(),
            });
            self.reset();
            self.state = InterventionState::Idle;
            tracing::info!("Intervention saved");
            return saved;
        }

        if self.state != InterventionState::Closed {
            tracing::info!("Intervention closed: {:?}", outcome);
        }
        self.reset();
        self.state = InterventionState::Closed;
        None
    }

    /// Current state
    pub fn state(&self) -> InterventionState {
        self.state
    }

    /// Trigger id of the open intervention
    pub fn trigger_id(&self) -> Option<&str> {
        self.trigger_id.as_deref()
    }

    /// Bundle of the open intervention
    pub fn bundle(&self) -> Option<&InterventionBundle> {
        self.bundle.as_ref()
    }

    /// Interaction records so far
    pub fn records(&self) -> &[InterventionHistoryRecord] {
        &self.records
    }

    /// Items shown so far
    pub fn shown(&self) -> &[InterventionItem] {
        &self.shown
    }

    fn record(&mut self, item: InterventionItem, reaction: Option<Reaction>) {
        let Some(entry_id) = self.entry.as_ref().map(|e| e.id.clone()) else {
            return;
        };
        let now = self.clock.now();
        self.records.push(InterventionHistoryRecord {
            id: ulid::Ulid::new().to_string(),
            mood_entry_id: entry_id,
            item,
            reaction,
            timestamp: now,
        });
        self.last_activity = Some(now);
    }

    fn touch(&mut self) {
        if self.state.is_open() {
            self.last_activity = Some(self.clock.now());
        }
    }

    fn reset(&mut self) {
        self.trigger_id = None;
        self.entry = None;
        self.bundle = None;
        self.indices.clear();
        self.hidden.clear();
        self.shown.clear();
        self.records.clear();
        self.last_activity = None;
    }
}
