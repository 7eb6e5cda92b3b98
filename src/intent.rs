//! Intent classification with ordered pattern rules
//!
//! Maps free text onto a closed set of labels. Each classifier holds an
//! ordered table of `(pattern, label)` rules; the first rule whose pattern
//! matches wins and an unmatched input yields the default label. Classification
//! is pure: no randomness, no network, no error path.
//!
//! The rule table sits behind the `classify` contract so it can be swapped for
//! a model without touching retrieval or synthesis.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nutrition chat intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Questions about protein intake and sources
    ProteinInquiry,
    /// Questions about carbohydrates, sugar and fibre
    CarbInquiry,
    /// Questions about dietary fat
    FatInquiry,
    /// Fluids and hydration
    Hydration,
    /// Eating around training sessions
    WorkoutNutrition,
    /// Losing weight
    WeightLoss,
    /// Gaining weight
    WeightGain,
    /// Building muscle
    MuscleGain,
    /// Planning meals and snacks
    MealPlanning,
    /// Traditional Sri Lankan dishes
    SriLankanFood,
    /// Anything else
    General,
}

impl Intent {
    /// All intents in rule order, `General` last
    pub const ALL: [Intent; 11] = [
        Intent::SriLankanFood,
        Intent::ProteinInquiry,
        Intent::CarbInquiry,
        Intent::FatInquiry,
        Intent::Hydration,
        Intent::WorkoutNutrition,
        Intent::WeightLoss,
        Intent::WeightGain,
        Intent::MuscleGain,
        Intent::MealPlanning,
        Intent::General,
    ];

    /// Snake-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProteinInquiry => "protein_inquiry",
            Self::CarbInquiry => "carb_inquiry",
            Self::FatInquiry => "fat_inquiry",
            Self::Hydration => "hydration",
            Self::WorkoutNutrition => "workout_nutrition",
            Self::WeightLoss => "weight_loss",
            Self::WeightGain => "weight_gain",
            Self::MuscleGain => "muscle_gain",
            Self::MealPlanning => "meal_planning",
            Self::SriLankanFood => "sri_lankan_food",
            Self::General => "general",
        }
    }

    /// Whether this is the default label
    pub fn is_general(&self) -> bool {
        matches!(self, Self::General)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mood labels for the intervention flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Low, down, tearful
    Sad,
    /// Worried, nervous, panicky
    Anxious,
    /// Irritated, frustrated
    Angry,
    /// Overwhelmed, under pressure
    Stressed,
    /// Content, upbeat
    Happy,
    /// No strong feeling
    Neutral,
}

impl Mood {
    /// Snake-case label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sad => "sad",
            Self::Anxious => "anxious",
            Self::Angry => "angry",
            Self::Stressed => "stressed",
            Self::Happy => "happy",
            Self::Neutral => "neutral",
        }
    }

    /// Parse a feeling tag selected in the mood form
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::intent::Mood;
    ///
    /// assert_eq!(Mood::parse_str("Anxious"), Some(Mood::Anxious));
    /// assert_eq!(Mood::parse_str("sleepy"), None);
    /// ```
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sad" => Some(Self::Sad),
            "anxious" => Some(Self::Anxious),
            "angry" => Some(Self::Angry),
            "stressed" => Some(Self::Stressed),
            "happy" => Some(Self::Happy),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }

    /// Feelings that trigger an intervention regardless of rating
    pub fn is_low(&self) -> bool {
        matches!(self, Self::Sad | Self::Anxious | Self::Angry | Self::Stressed)
    }

    /// Mood implied by a 1-5 rating when no feeling or note is available
    pub fn from_rating(rating: u8) -> Self {
        match rating {
            0..=2 => Self::Sad,
            3 => Self::Neutral,
            _ => Self::Happy,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rule table mapping patterns to labels
#[derive(Debug, Clone)]
pub struct RuleTable<L> {
    rules: Vec<(Regex, L)>,
    default: L,
}

impl<L: Copy> RuleTable<L> {
    /// Compiles `(pattern, label)` pairs in order
    ///
    /// Patterns are matched case-insensitively. Patterns that fail to compile
    /// are skipped with a warning so a bad rule never takes the classifier down.
    pub fn new(rules: &[(&str, L)], default: L) -> Self {
        let rules = rules
            .iter()
            .filter_map(|(pattern, label)| {
                match Regex::new(&format!("(?i){}", pattern)) {
                    Ok(regex) => Some((regex, *label)),
                    Err(e) => {
                        tracing::warn!("Skipping invalid intent rule {}: {}", pattern, e);
                        None
                    }
                }
            })
            .collect();
        Self { rules, default }
    }

    /// Returns the label of the first matching rule, or the default
    pub fn classify(&self, text: &str) -> L {
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(text))
            .map(|(_, label)| *label)
            .unwrap_or(self.default)
    }

    /// Number of compiled rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

const INTENT_RULES: &[(&str, Intent)] = &[
    (
        r"sri\s*lanka|rice and curry|kottu|hoppers|\bappa\b|dhal curry|parippu|pol sambol|kiribath|gotu kola",
        Intent::SriLankanFood,
    ),
    (r"protein|\bwhey\b|amino acids?", Intent::ProteinInquiry),
    (r"\bcarbs?\b|carbohydrate|\bsugars?\b|starch|fib(er|re)", Intent::CarbInquiry),
    (r"\bfats?\b|omega|cholesterol|saturated", Intent::FatInquiry),
    (r"\bwater\b|hydrat|dehydrat|\bfluids?\b|electrolyte", Intent::Hydration),
    (
        r"workout|pre-?workout|post-?workout|exercise|training|\bgym\b|\brun(ning)?\b",
        Intent::WorkoutNutrition,
    ),
    (
        r"lose weight|losing weight|weight loss|fat loss|slim down|calorie deficit|\bcut(ting)?\b",
        Intent::WeightLoss,
    ),
    (
        r"gain weight|gaining weight|weight gain|\bbulk(ing)?\b|put on weight",
        Intent::WeightGain,
    ),
    (r"muscle|build mass|strength|hypertrophy", Intent::MuscleGain),
    (
        r"meal plan|what (should|can) i eat|breakfast|lunch|dinner|snack|recipe|menu",
        Intent::MealPlanning,
    ),
];

const MOOD_RULES: &[(&str, Mood)] = &[
    (r"anxi|nervous|worr(y|ied)|panic|on edge|uneasy", Mood::Anxious),
    (
        r"stress|overwhelm|pressure|burn(ed|t)? ?out|deadline|too much",
        Mood::Stressed,
    ),
    (r"angry|\bmad\b|furious|irritat|annoy|frustrat|rage", Mood::Angry),
    (
        r"\bsad\b|\bdown\b|depress|lonely|unhappy|\bcry|miserable|\bblue\b|hopeless",
        Mood::Sad,
    ),
    (
        r"happy|\bgreat\b|\bgood\b|joy|excited|grateful|wonderful|calm",
        Mood::Happy,
    ),
];

/// Classifies nutrition chat messages
///
/// # Examples
///
/// ```
/// use coachkit::intent::{Intent, IntentClassifier};
///
/// let classifier = IntentClassifier::new();
/// assert_eq!(
///     classifier.classify("How much protein do I need for muscle gain?"),
///     Intent::ProteinInquiry
/// );
/// assert_eq!(classifier.classify(""), Intent::General);
/// ```
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    table: RuleTable<Intent>,
}

impl IntentClassifier {
    /// Creates a classifier with the built-in rule table
    pub fn new() -> Self {
        Self {
            table: RuleTable::new(INTENT_RULES, Intent::General),
        }
    }

    /// Classifies `text`, falling back to [`Intent::General`]
    pub fn classify(&self, text: &str) -> Intent {
        let intent = self.table.classify(text);
        tracing::debug!(intent = %intent, "Classified query");
        intent
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies mood notes and resolves the mood of a report
#[derive(Debug, Clone)]
pub struct MoodClassifier {
    table: RuleTable<Mood>,
}

impl MoodClassifier {
    /// Creates a classifier with the built-in rule table
    pub fn new() -> Self {
        Self {
            table: RuleTable::new(MOOD_RULES, Mood::Neutral),
        }
    }

    /// Classifies free text, falling back to [`Mood::Neutral`]
    pub fn classify(&self, text: &str) -> Mood {
        self.table.classify(text)
    }

    /// Resolves the mood of a report
    ///
    /// A pre-selected feeling bypasses text classification. Otherwise the note
    /// is classified, and an empty or unmatched note falls back to the rating.
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::intent::{Mood, MoodClassifier};
    ///
    /// let classifier = MoodClassifier::new();
    /// assert_eq!(classifier.resolve(Some(Mood::Angry), "feeling great", 5), Mood::Angry);
    /// assert_eq!(classifier.resolve(None, "so much pressure at work", 3), Mood::Stressed);
    /// assert_eq!(classifier.resolve(None, "", 1), Mood::Sad);
    /// ```
    pub fn resolve(&self, feeling: Option<Mood>, note: &str, rating: u8) -> Mood {
        if let Some(feeling) = feeling {
            return feeling;
        }
        match self.classify(note) {
            Mood::Neutral => Mood::from_rating(rating),
            mood => mood,
        }
    }
}

impl Default for MoodClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_rules_compile() {
        assert_eq!(IntentClassifier::new().table.len(), INTENT_RULES.len());
        assert_eq!(MoodClassifier::new().table.len(), MOOD_RULES.len());
    }

    #[test]
    fn test_protein_question_beats_muscle_rule() {
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("How much protein do I need for muscle gain?"),
            Intent::ProteinInquiry
        );
    }

    #[test]
    fn test_sri_lankan_rule_wins_over_later_rules() {
        let classifier = IntentClassifier::new();
        assert_eq!(
            classifier.classify("Is kottu okay for dinner when I want protein?"),
            Intent::SriLankanFood
        );
    }

    #[test]
    fn test_classify_examples() {
        let classifier = IntentClassifier::new();
        let cases = [
            ("Are carbs bad at night?", Intent::CarbInquiry),
            ("which fats are healthy", Intent::FatInquiry),
            ("How much water should I drink", Intent::Hydration),
            ("what to eat after my workout", Intent::WorkoutNutrition),
            ("I want to lose weight", Intent::WeightLoss),
            ("how do I gain weight", Intent::WeightGain),
            ("help me build muscle", Intent::MuscleGain),
            ("give me a meal plan", Intent::MealPlanning),
            ("hello there", Intent::General),
        ];
        for (text, expected) in cases {
            assert_eq!(classifier.classify(text), expected, "text: {}", text);
        }
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("PROTEIN"), Intent::ProteinInquiry);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = IntentClassifier::new();
        let inputs = ["", "protein", "random words", "rice and curry", "🥗 salad?"];
        for input in inputs {
            let first = classifier.classify(input);
            for _ in 0..10 {
                assert_eq!(classifier.classify(input), first);
            }
            assert_eq!(IntentClassifier::new().classify(input), first);
        }
    }

    #[test]
    fn test_word_boundaries_avoid_false_matches() {
        let classifier = IntentClassifier::new();
        // "fatigue" must not look like a fat question
        assert_eq!(classifier.classify("constant fatigue"), Intent::General);
    }

    #[test]
    fn test_mood_rules_order() {
        let classifier = MoodClassifier::new();
        assert_eq!(classifier.classify("anxious and stressed"), Mood::Anxious);
        assert_eq!(classifier.classify("deadline pressure"), Mood::Stressed);
        assert_eq!(classifier.classify("so frustrated"), Mood::Angry);
        assert_eq!(classifier.classify("feeling down"), Mood::Sad);
        assert_eq!(classifier.classify("pretty good today"), Mood::Happy);
        assert_eq!(classifier.classify("meh"), Mood::Neutral);
    }

    #[test]
    fn test_mood_resolve_neutral_note_uses_rating() {
        let classifier = MoodClassifier::new();
        assert_eq!(classifier.resolve(None, "meh", 5), Mood::Happy);
        assert_eq!(classifier.resolve(None, "meh", 3), Mood::Neutral);
    }

    #[test]
    fn test_mood_is_low() {
        assert!(Mood::Anxious.is_low());
        assert!(Mood::Stressed.is_low());
        assert!(!Mood::Happy.is_low());
        assert!(!Mood::Neutral.is_low());
    }

    #[test]
    fn test_rule_table_skips_invalid_pattern() {
        let table = RuleTable::new(&[("(unclosed", 1u8), ("ok", 2u8)], 0u8);
        assert_eq!(table.len(), 1);
        assert_eq!(table.classify("ok"), 2);
        assert_eq!(table.classify("nothing"), 0);
    }
}
