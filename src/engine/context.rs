//! Context assembly
//!
//! A [`CoachContext`] is the single record every downstream stage reads:
//! the raw query, its intent, a profile snapshot, a bounded history suffix,
//! the bounded conversation window and at most one typed external event.

use crate::engine::conversation::{Conversation, ConversationTurn};
use crate::intent::Intent;
use crate::profile::{ExternalEvent, HistoryEntry, UserProfile, WorkoutKind};

/// Default number of history entries carried into context
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Everything the retrieval and synthesis stages need for one query
#[derive(Debug, Clone, PartialEq)]
pub struct CoachContext {
    /// Raw user text
    pub query: String,
    /// Classified intent
    pub intent: Intent,
    /// Profile snapshot
    pub profile: UserProfile,
    /// Most recent history entries, oldest first
    pub recent_history: Vec<HistoryEntry>,
    /// Most recent conversation turns, oldest first
    pub conversation_window: Vec<ConversationTurn>,
    /// External event that accompanied the query
    pub event: Option<ExternalEvent>,
}

impl CoachContext {
    /// Minimal context with no history, conversation or event
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::engine::context::CoachContext;
    /// use coachkit::intent::Intent;
    /// use coachkit::profile::UserProfile;
    ///
    /// let ctx = CoachContext::for_query("hi", Intent::General, UserProfile::default());
    /// assert!(ctx.recent_history.is_empty());
    /// assert!(ctx.workout_kind().is_none());
    /// ```
    pub fn for_query(query: impl Into<String>, intent: Intent, profile: UserProfile) -> Self {
        Self {
            query: query.into(),
            intent,
            profile,
            recent_history: Vec::new(),
            conversation_window: Vec::new(),
            event: None,
        }
    }

    /// Attaches an external event
    pub fn with_event(mut self, event: ExternalEvent) -> Self {
        self.event = Some(event);
        self
    }

    /// Workout kind of an attached workout event
    pub fn workout_kind(&self) -> Option<WorkoutKind> {
        match &self.event {
            Some(ExternalEvent::WorkoutCompleted { activity, .. }) => Some(*activity),
            None => None,
        }
    }

    /// Goal phrase used when personalising text
    pub fn goal_phrase(&self) -> &'static str {
        self.profile.goal.phrase()
    }

    /// Activity phrase used when personalising text
    pub fn activity_phrase(&self) -> &'static str {
        self.profile.activity_level.phrase()
    }

    /// Average calories over nutrition entries in the recent history
    pub fn average_calories(&self) -> Option<f64> {
        let calories: Vec<f64> = self
            .recent_history
            .iter()
            .filter_map(HistoryEntry::calories)
            .collect();
        if calories.is_empty() {
            None
        } else {
            Some(calories.iter().sum::<f64>() / calories.len() as f64)
        }
    }
}

/// Builds [`CoachContext`] records with bounded history
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    history_limit: usize,
}

impl ContextBuilder {
    /// Creates a builder keeping the last `history_limit` history entries
    pub fn new(history_limit: usize) -> Self {
        Self { history_limit }
    }

    /// Number of history entries carried into context
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Assembles the context for one query
    ///
    /// The conversation window is taken before the current query is
    /// appended, so it holds prior turns only.
    pub fn build(
        &self,
        query: &str,
        intent: Intent,
        profile: &UserProfile,
        history: &[HistoryEntry],
        conversation: &Conversation,
        event: Option<&ExternalEvent>,
    ) -> CoachContext {
        let start = history.len().saturating_sub(self.history_limit);
        let context = CoachContext {
            query: query.to_string(),
            intent,
            profile: profile.clone(),
            recent_history: history[start..].to_vec(),
            conversation_window: conversation.window().to_vec(),
            event: event.cloned(),
        };
        tracing::debug!(
            intent = %intent,
            history = context.recent_history.len(),
            turns = context.conversation_window.len(),
            "Built context"
        );
        context
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
