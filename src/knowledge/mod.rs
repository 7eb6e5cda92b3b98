//! Curated knowledge base
//!
//! Static, structured facts grouped by topic. Facts are load-time constants;
//! nothing in the crate mutates them. Some facts are specialised to a goal,
//! a dietary restriction, a workout kind or a mood, and are only eligible when
//! the caller's context matches.

mod facts;
pub mod retrieval;

pub use retrieval::{MoodTopic, RetrievalEngine, DEFAULT_MAX_FACTS};

use crate::intent::Mood;
use crate::profile::{Goal, WorkoutKind};
use serde::Serialize;

/// Condition under which a specialised fact is eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Specialization {
    /// Only for users with this goal
    Goal(Goal),
    /// Only for users with this dietary restriction
    Diet(&'static str),
    /// Only after this kind of workout
    Workout(WorkoutKind),
    /// Only for this reported mood
    Mood(Mood),
}

/// One curated piece of domain text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeFact {
    /// Topic key, also matched literally against query text
    pub topic: &'static str,
    /// Plain-text content
    pub content: &'static str,
    /// Optional eligibility condition
    pub specialization: Option<Specialization>,
}

impl KnowledgeFact {
    /// Creates an unspecialised fact
    pub const fn new(topic: &'static str, content: &'static str) -> Self {
        Self {
            topic,
            content,
            specialization: None,
        }
    }

    /// Creates a specialised fact
    pub const fn special(
        topic: &'static str,
        specialization: Specialization,
        content: &'static str,
    ) -> Self {
        Self {
            topic,
            content,
            specialization: Some(specialization),
        }
    }

    /// Topic key with underscores turned into spaces, as it appears in text
    pub fn topic_phrase(&self) -> String {
        self.topic.replace('_', " ")
    }
}

/// Facts grouped by topic, in curated order
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    facts: Vec<KnowledgeFact>,
}

impl KnowledgeBase {
    /// Knowledge base with the built-in nutrition and mood facts
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::knowledge::KnowledgeBase;
    ///
    /// let kb = KnowledgeBase::builtin();
    /// assert!(kb.by_topic("protein").count() > 0);
    /// ```
    pub fn builtin() -> Self {
        Self::from_facts(facts::NUTRITION_FACTS.iter().chain(facts::MOOD_FACTS).copied())
    }

    /// Knowledge base over an arbitrary fact list
    pub fn from_facts(facts: impl IntoIterator<Item = KnowledgeFact>) -> Self {
        Self {
            facts: facts.into_iter().collect(),
        }
    }

    /// All facts in curated order
    pub fn facts(&self) -> &[KnowledgeFact] {
        &self.facts
    }

    /// Facts filed under `topic`, specialised or not
    pub fn by_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a KnowledgeFact> + 'a {
        self.facts.iter().filter(move |fact| fact.topic == topic)
    }

    /// Distinct topic keys in first-seen order
    pub fn topics(&self) -> Vec<&'static str> {
        let mut topics: Vec<&'static str> = Vec::new();
        for fact in &self.facts {
            if !topics.contains(&fact.topic) {
                topics.push(fact.topic);
            }
        }
        topics
    }

    /// Number of facts
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Whether the knowledge base is empty
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_every_mood_topic() {
        let kb = KnowledgeBase::builtin();
        for mood in [
            Mood::Sad,
            Mood::Anxious,
            Mood::Angry,
            Mood::Stressed,
            Mood::Happy,
            Mood::Neutral,
        ] {
            for topic in ["activity", "mindfulness", "music"] {
                assert!(
                    kb.by_topic(topic)
                        .any(|f| f.specialization == Some(Specialization::Mood(mood))),
                    "missing {} fact for {}",
                    topic,
                    mood
                );
            }
        }
    }

    #[test]
    fn test_builtin_has_goal_facts_for_every_goal() {
        let kb = KnowledgeBase::builtin();
        for goal in [
            Goal::WeightLoss,
            Goal::WeightGain,
            Goal::Maintenance,
            Goal::MuscleGain,
        ] {
            let key = goal.to_string();
            assert!(kb.by_topic(&key).count() > 0, "no facts for {}", key);
        }
    }

    #[test]
    fn test_builtin_fact_texts_are_unique() {
        let kb = KnowledgeBase::builtin();
        let mut seen = std::collections::HashSet::new();
        for fact in kb.facts() {
            assert!(seen.insert(fact.content), "duplicate fact: {}", fact.content);
        }
    }

    #[test]
    fn test_topics_are_distinct_and_ordered() {
        let kb = KnowledgeBase::from_facts([
            KnowledgeFact::new("b", "one"),
            KnowledgeFact::new("a", "two"),
            KnowledgeFact::new("b", "three"),
        ]);
        assert_eq!(kb.topics(), vec!["b", "a"]);
    }

    #[test]
    fn test_topic_phrase() {
        assert_eq!(KnowledgeFact::new("sri_lankan", "x").topic_phrase(), "sri lankan");
    }
}
