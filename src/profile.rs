//! User profile, history entries and external events
//!
//! These are the caller-supplied snapshots the engine reads. The hosting
//! screen owns and persists them; the engine never mutates a profile and only
//! ever reads a bounded suffix of the history.

use crate::intent::Mood;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain goal chosen at onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    /// Reduce body weight
    WeightLoss,
    /// Increase body weight
    WeightGain,
    /// Keep current weight
    #[default]
    Maintenance,
    /// Build lean mass
    MuscleGain,
}

impl Goal {
    /// Phrase used when personalising responses
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::profile::Goal;
    ///
    /// assert_eq!(Goal::MuscleGain.phrase(), "building muscle");
    /// ```
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::WeightLoss => "losing weight",
            Self::WeightGain => "gaining weight",
            Self::Maintenance => "maintaining your weight",
            Self::MuscleGain => "building muscle",
        }
    }

    /// Parse a goal from its snake_case or spaced name
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "weight_loss" | "lose_weight" => Some(Self::WeightLoss),
            "weight_gain" | "gain_weight" => Some(Self::WeightGain),
            "maintenance" | "maintain" => Some(Self::Maintenance),
            "muscle_gain" | "build_muscle" => Some(Self::MuscleGain),
            _ => None,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeightLoss => write!(f, "weight_loss"),
            Self::WeightGain => write!(f, "weight_gain"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::MuscleGain => write!(f, "muscle_gain"),
        }
    }
}

/// Self-reported activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// Exercise one to three days a week
    Light,
    /// Exercise three to five days a week
    #[default]
    Moderate,
    /// Hard exercise most days
    Active,
    /// Physical job or twice-daily training
    VeryActive,
}

impl ActivityLevel {
    /// Phrase used when personalising responses
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::Sedentary => "mostly sedentary",
            Self::Light => "lightly active",
            Self::Moderate => "moderately active",
            Self::Active => "very active",
            Self::VeryActive => "training hard most days",
        }
    }

    /// Parse an activity level from its snake_case or spaced name
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "sedentary" => Some(Self::Sedentary),
            "light" | "lightly_active" => Some(Self::Light),
            "moderate" | "moderately_active" => Some(Self::Moderate),
            "active" => Some(Self::Active),
            "very_active" => Some(Self::VeryActive),
            _ => None,
        }
    }
}

/// Stored user profile
///
/// Created at onboarding and mutated only by explicit profile edits. The
/// engine treats it as read-mostly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    /// Identity key
    pub id: String,
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Nutrition goal
    #[serde(default)]
    pub goal: Goal,
    /// Activity level
    #[serde(default)]
    pub activity_level: ActivityLevel,
    /// Self-reported stress level on a 1-5 scale
    #[serde(default)]
    pub stress_level: Option<u8>,
    /// Body weight in kilograms, when known
    #[serde(default)]
    pub weight_kg: Option<f64>,
    /// Dietary restrictions such as "vegetarian" or "halal"
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    /// Food allergies such as "peanuts"
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Areas of concern such as "sleep" or "energy"
    #[serde(default)]
    pub concerns: Vec<String>,
    /// Mood goals such as "feel calmer"
    #[serde(default)]
    pub mood_goals: Vec<String>,
}

impl UserProfile {
    /// Creates a profile with the given identity and goal
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::profile::{Goal, UserProfile};
    ///
    /// let profile = UserProfile::new("user-1", Goal::MuscleGain);
    /// assert_eq!(profile.goal, Goal::MuscleGain);
    /// assert!(profile.allergies.is_empty());
    /// ```
    pub fn new(id: impl Into<String>, goal: Goal) -> Self {
        Self {
            id: id.into(),
            goal,
            ..Self::default()
        }
    }

    /// Returns true when any dietary restriction matches `restriction`
    pub fn has_restriction(&self, restriction: &str) -> bool {
        self.dietary_restrictions
            .iter()
            .any(|r| r.eq_ignore_ascii_case(restriction))
    }

    /// Returns true when the user follows a vegetarian or vegan diet
    pub fn is_plant_based(&self) -> bool {
        self.has_restriction("vegetarian") || self.has_restriction("vegan")
    }
}

/// One logged meal or daily total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NutritionLog {
    /// Energy in kilocalories
    pub calories: f64,
    /// Protein in grams
    #[serde(default)]
    pub protein_g: f64,
    /// Carbohydrate in grams
    #[serde(default)]
    pub carbs_g: f64,
    /// Fat in grams
    #[serde(default)]
    pub fat_g: f64,
    /// Meal label such as "breakfast"
    #[serde(default)]
    pub meal: Option<String>,
}

/// Domain-specific payload of a history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryPayload {
    /// Nutrition log
    Nutrition(NutritionLog),
    /// Mood log with a 1-5 rating
    Mood {
        /// Rating on a 1-5 scale
        rating: u8,
        /// Reported feeling, if one was selected
        feeling: Option<Mood>,
    },
}

/// Append-only history entry owned by the hosting screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the entry was logged
    pub timestamp: DateTime<Utc>,
    /// Nutrition or mood payload
    pub payload: HistoryPayload,
    /// Free-text note
    #[serde(default)]
    pub note: String,
}

impl HistoryEntry {
    /// Creates a nutrition history entry
    pub fn nutrition(timestamp: DateTime<Utc>, log: NutritionLog) -> Self {
        Self {
            timestamp,
            payload: HistoryPayload::Nutrition(log),
            note: String::new(),
        }
    }

    /// Logged calories for nutrition entries
    pub fn calories(&self) -> Option<f64> {
        match &self.payload {
            HistoryPayload::Nutrition(log) => Some(log.calories),
            HistoryPayload::Mood { .. } => None,
        }
    }
}

/// A freshly logged mood report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodEntry {
    /// Unique entry identifier (ULID)
    pub id: String,
    /// When the mood was reported
    pub timestamp: DateTime<Utc>,
    /// Rating on a 1-5 scale
    pub rating: u8,
    /// Pre-selected feeling, bypassing text classification
    #[serde(default)]
    pub feeling: Option<Mood>,
    /// Free-text note
    #[serde(default)]
    pub note: String,
}

impl MoodEntry {
    /// Creates a mood entry with a fresh ULID, clamping the rating to 1-5
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use coachkit::intent::Mood;
    /// use coachkit::profile::MoodEntry;
    ///
    /// let entry = MoodEntry::new(Utc::now(), 9, Some(Mood::Happy), "");
    /// assert_eq!(entry.rating, 5);
    /// ```
    pub fn new(
        timestamp: DateTime<Utc>,
        rating: u8,
        feeling: Option<Mood>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp,
            rating: rating.clamp(1, 5),
            feeling,
            note: note.into(),
        }
    }

    /// Converts the entry into a generic history entry
    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry {
            timestamp: self.timestamp,
            payload: HistoryPayload::Mood {
                rating: self.rating,
                feeling: self.feeling,
            },
            note: self.note.clone(),
        }
    }
}

/// Kind of workout reported by an external tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    /// Running, cycling, swimming and similar
    Cardio,
    /// Resistance training
    Strength,
    /// Intervals and circuits
    Hiit,
    /// Yoga, stretching, pilates
    Flexibility,
}

impl WorkoutKind {
    /// Parse a workout kind from a free-form label
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cardio" | "running" | "run" | "cycling" | "swimming" => Some(Self::Cardio),
            "strength" | "weights" | "lifting" | "resistance" => Some(Self::Strength),
            "hiit" | "intervals" | "circuit" => Some(Self::Hiit),
            "flexibility" | "yoga" | "stretching" | "pilates" => Some(Self::Flexibility),
            _ => None,
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cardio => write!(f, "cardio"),
            Self::Strength => write!(f, "strength"),
            Self::Hiit => write!(f, "hiit"),
            Self::Flexibility => write!(f, "flexibility"),
        }
    }
}

/// Events published by other screens and consumed by the context builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExternalEvent {
    /// A workout was completed in the activity tracker
    WorkoutCompleted {
        /// Workout category
        activity: WorkoutKind,
        /// Duration in minutes
        duration_minutes: u32,
        /// Estimated energy expenditure
        calories_burned: Option<f64>,
    },
}
