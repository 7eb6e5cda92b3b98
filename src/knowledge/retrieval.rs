//! Deterministic fact selection
//!
//! Retrieval is an ordered union of fact sets followed by exact-text
//! deduplication and truncation. There is no scoring: the first `max_facts`
//! facts in insertion order win.

use super::{KnowledgeBase, KnowledgeFact, Specialization};
use crate::engine::context::CoachContext;
use crate::intent::{Intent, Mood};
use crate::profile::UserProfile;
use std::collections::HashSet;

/// Default cap on facts returned by a single retrieval
pub const DEFAULT_MAX_FACTS: usize = 8;

/// Mood-domain fact groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoodTopic {
    /// Short empathetic talking points
    TalkingPoint,
    /// Things to do right now
    Activity,
    /// Breathing and grounding prompts
    Mindfulness,
    /// Music suggestions matched to the mood
    Music,
}

impl MoodTopic {
    /// Topic key in the knowledge base
    pub fn key(&self) -> &'static str {
        match self {
            Self::TalkingPoint => "talking_point",
            Self::Activity => "activity",
            Self::Mindfulness => "mindfulness",
            Self::Music => "music",
        }
    }
}

/// Topics that make up the base fact set of each intent
fn base_topics(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::ProteinInquiry => &["protein"],
        Intent::CarbInquiry => &["carbohydrates", "fiber"],
        Intent::FatInquiry => &["fats"],
        Intent::Hydration => &["hydration"],
        Intent::WorkoutNutrition => &["workout", "hydration"],
        Intent::WeightLoss => &["weight_loss", "calories"],
        Intent::WeightGain => &["weight_gain", "calories"],
        Intent::MuscleGain => &["muscle_gain", "protein"],
        Intent::MealPlanning => &["meal_planning", "balance"],
        Intent::SriLankanFood => &["sri_lankan"],
        Intent::General => &[],
    }
}

/// Selects bounded, deduplicated fact lists from a knowledge base
///
/// # Examples
///
/// ```
/// use coachkit::engine::context::CoachContext;
/// use coachkit::intent::Intent;
/// use coachkit::knowledge::RetrievalEngine;
/// use coachkit::profile::{Goal, UserProfile};
///
/// let engine = RetrievalEngine::default();
/// let profile = UserProfile::new("u1", Goal::MuscleGain);
/// let context = CoachContext::for_query("protein?", Intent::ProteinInquiry, profile);
/// let facts = engine.retrieve(Intent::ProteinInquiry, &context);
/// assert!(facts.len() <= 8);
/// assert!(facts.iter().all(|f| f.topic == "protein"));
/// ```
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    kb: KnowledgeBase,
    max_facts: usize,
}

impl RetrievalEngine {
    /// Creates a retrieval engine over `kb` returning at most `max_facts`
    pub fn new(kb: KnowledgeBase, max_facts: usize) -> Self {
        Self {
            kb,
            max_facts: max_facts.max(1),
        }
    }

    /// The underlying knowledge base
    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Maximum number of facts returned per call
    pub fn max_facts(&self) -> usize {
        self.max_facts
    }

    /// Retrieves facts for a nutrition intent
    ///
    /// Specific intents union their base topics with the goal, diet and
    /// workout specialisations that match the context. The general intent
    /// unions the goal's facts, the universal balance facts and every topic
    /// whose keyword appears literally in the query. Facts naming one of the
    /// user's allergens are dropped before deduplication and truncation.
    pub fn retrieve(&self, intent: Intent, context: &CoachContext) -> Vec<KnowledgeFact> {
        let mut selected: Vec<KnowledgeFact> = Vec::new();

        if intent.is_general() {
            let goal_topic = context.profile.goal.to_string();
            self.extend_topic(&mut selected, &goal_topic, context);
            self.extend_topic(&mut selected, "balance", context);

            let query = context.query.to_lowercase();
            for topic in self.kb.topics() {
                if query.contains(&topic.replace('_', " ")) {
                    self.extend_topic(&mut selected, topic, context);
                }
            }
        } else {
            for topic in base_topics(intent) {
                self.extend_topic(&mut selected, topic, context);
            }
        }

        if let Some(kind) = context.workout_kind() {
            selected.extend(
                self.kb
                    .facts()
                    .iter()
                    .filter(|f| f.specialization == Some(Specialization::Workout(kind)))
                    .copied(),
            );
        }

        let facts = self.finalize(selected, &context.profile.allergies);
        tracing::debug!(intent = %intent, facts = facts.len(), "Retrieved facts");
        facts
    }

    /// Retrieves mood-domain facts of one group for `mood`
    ///
    /// Falls back to the neutral group when the mood has no facts of that
    /// kind, so callers always get local content.
    pub fn retrieve_mood(
        &self,
        mood: Mood,
        topic: MoodTopic,
        profile: &UserProfile,
    ) -> Vec<KnowledgeFact> {
        let for_mood = |m: Mood| -> Vec<KnowledgeFact> {
            self.kb
                .by_topic(topic.key())
                .filter(|f| f.specialization == Some(Specialization::Mood(m)))
                .copied()
                .collect()
        };

        let mut facts = for_mood(mood);
        if facts.is_empty() && mood != Mood::Neutral {
            facts = for_mood(Mood::Neutral);
        }
        self.finalize(facts, &profile.allergies)
    }

    /// Pushes the unspecialised facts of `topic`, then its eligible
    /// specialised facts
    fn extend_topic(&self, selected: &mut Vec<KnowledgeFact>, topic: &str, context: &CoachContext) {
        selected.extend(
            self.kb
                .by_topic(topic)
                .filter(|f| f.specialization.is_none())
                .copied(),
        );
        selected.extend(
            self.kb
                .by_topic(topic)
                .filter(|f| match f.specialization {
                    Some(target) => is_eligible(target, context),
                    None => false,
                })
                .copied(),
        );
    }

    fn finalize(&self, facts: Vec<KnowledgeFact>, allergies: &[String]) -> Vec<KnowledgeFact> {
        let mut seen = HashSet::new();
        facts
            .into_iter()
            .filter(|f| !allergies.iter().any(|a| mentions_allergen(f.content, a)))
            .filter(|f| seen.insert(f.content))
            .take(self.max_facts)
            .collect()
    }
}

impl Default for RetrievalEngine {
    fn default() -> Self {
        Self::new(KnowledgeBase::builtin(), DEFAULT_MAX_FACTS)
    }
}

fn is_eligible(target: Specialization, context: &CoachContext) -> bool {
    match target {
        Specialization::Goal(goal) => context.profile.goal == goal,
        Specialization::Diet(diet) => context.profile.has_restriction(diet),
        Specialization::Workout(kind) => context.workout_kind() == Some(kind),
        Specialization::Mood(_) => false,
    }
}

/// Whether `content` names `allergen`, matching whole words and simple plurals
pub(crate) fn mentions_allergen(content: &str, allergen: &str) -> bool {
    let allergen = allergen.trim().to_lowercase();
    if allergen.is_empty() {
        return false;
    }
    let content = content.to_lowercase();
    if allergen.contains(' ') {
        return content.contains(&allergen);
    }
    let stem = allergen.strip_suffix('s').unwrap_or(&allergen);
    content
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == allergen || word == stem || word.strip_suffix('s') == Some(stem))
}
