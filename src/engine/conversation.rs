//! Conversation history with a bounded context window
//!
//! Turns are appended strictly in submission order. Only the most recent
//! `window` turns are handed to the context builder; older turns are dropped
//! from context, never summarised. The stored history itself is capped at
//! `max_turns` so a long-lived session cannot grow without bound.

use crate::intent::Intent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of turns passed into context
pub const DEFAULT_WINDOW: usize = 6;

/// Default cap on stored turns
pub const DEFAULT_MAX_TURNS: usize = 100;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person using the coach
    User,
    /// The coach
    System,
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who said it
    pub role: Role,
    /// Message text
    pub text: String,
    /// When it was said
    pub timestamp: DateTime<Utc>,
    /// Intent the response was produced for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Confidence reported by a remote generator, when it gives one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    /// Topic keys of the facts the response drew on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl ConversationTurn {
    /// Creates a user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use coachkit::engine::conversation::{ConversationTurn, Role};
    ///
    /// let turn = ConversationTurn::user("Hi", Utc::now());
    /// assert_eq!(turn.role, Role::User);
    /// ```
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp,
            intent: None,
            confidence: None,
            sources: Vec::new(),
        }
    }

    /// Creates a coach turn
    pub fn system(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
            timestamp,
            intent: None,
            confidence: None,
            sources: Vec::new(),
        }
    }

    /// Attaches the intent the turn answered
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    /// Attaches the fact topics the turn drew on
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }
}

/// Append-only conversation with a sliding context window
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use coachkit::engine::Conversation;
///
/// let mut conversation = Conversation::new(2, 10);
/// for text in ["one", "two", "three"] {
///     conversation.add_user_turn(text, Utc::now());
/// }
/// let window: Vec<&str> = conversation.window().iter().map(|t| t.text.as_str()).collect();
/// assert_eq!(window, vec!["two", "three"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    window: usize,
    max_turns: usize,
}

impl Conversation {
    /// Creates an empty conversation
    ///
    /// # Arguments
    ///
    /// * `window` - Number of most recent turns passed into context
    /// * `max_turns` - Number of turns retained in history (at least `window`)
    pub fn new(window: usize, max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            window,
            max_turns: max_turns.max(window),
        }
    }

    /// Rebuilds a conversation from persisted turns, keeping the newest
    /// `max_turns`
    pub fn from_turns(turns: Vec<ConversationTurn>, window: usize, max_turns: usize) -> Self {
        let mut conversation = Self::new(window, max_turns);
        conversation.turns = turns;
        conversation.prune();
        conversation
    }

    /// Appends a user turn
    pub fn add_user_turn(&mut self, text: impl Into<String>, timestamp: DateTime<Utc>) {
        self.push(ConversationTurn::user(text, timestamp));
    }

    /// Appends a coach turn
    pub fn add_system_turn(&mut self, text: impl Into<String>, timestamp: DateTime<Utc>) {
        self.push(ConversationTurn::system(text, timestamp));
    }

    /// Appends a prepared turn
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
        self.prune();
    }

    /// The most recent `window` turns, oldest first
    pub fn window(&self) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(self.window);
        &self.turns[start..]
    }

    /// All retained turns, oldest first
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The most recent turn
    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Context window size
    pub fn window_size(&self) -> usize {
        self.window
    }

    /// Cap on retained turns
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Number of retained turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns are retained
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drops every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    fn prune(&mut self) {
        if self.turns.len() > self.max_turns {
            let excess = self.turns.len() - self.max_turns;
            self.turns.drain(..excess);
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_TURNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(turns: &[ConversationTurn]) -> Vec<String> {
        turns.iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn test_window_keeps_latest_six_of_eight() {
        let mut conversation = Conversation::default();
        for i in 0..8 {
            if i % 2 == 0 {
                conversation.add_user_turn(format!("turn {}", i), Utc::now());
            } else {
                conversation.add_system_turn(format!("turn {}", i), Utc::now());
            }
        }
        assert_eq!(conversation.len(), 8);
        assert_eq!(
            texts(conversation.window()),
            (2..8).map(|i| format!("turn {}", i)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_window_shorter_than_limit() {
        let mut conversation = Conversation::default();
        conversation.add_user_turn("only", Utc::now());
        assert_eq!(texts(conversation.window()), vec!["only"]);
    }

    #[test]
    fn test_history_capped_at_max_turns() {
        let mut conversation = Conversation::new(2, 3);
        for i in 0..5 {
            conversation.add_user_turn(i.to_string(), Utc::now());
        }
        assert_eq!(texts(conversation.turns()), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_max_turns_never_below_window() {
        let mut conversation = Conversation::new(4, 1);
        for i in 0..4 {
            conversation.add_user_turn(i.to_string(), Utc::now());
        }
        assert_eq!(conversation.window().len(), 4);
    }

    #[test]
    fn test_from_turns_truncates_oldest() {
        let turns: Vec<_> = (0..10)
            .map(|i| ConversationTurn::user(i.to_string(), Utc::now()))
            .collect();
        let conversation = Conversation::from_turns(turns, 6, 8);
        assert_eq!(conversation.len(), 8);
        assert_eq!(conversation.turns()[0].text, "2");
    }

    #[test]
    fn test_turn_metadata_serialization_skips_empty() {
        let turn = ConversationTurn::system("hi", Utc::now());
        let json = serde_json::to_value(&turn).unwrap();
        assert!(json.get("intent").is_none());
        assert!(json.get("sources").is_none());
        assert_eq!(json["role"], "system");
    }

    #[test]
    fn test_clear() {
        let mut conversation = Conversation::default();
        conversation.add_user_turn("x", Utc::now());
        conversation.clear();
        assert!(conversation.is_empty());
        assert!(conversation.last().is_none());
    }
}
