//! Intervention content bundles
//!
//! A bundle holds one ordered list per category. Local items are filled
//! synchronously when the bundle is created; remote items are appended later
//! as they arrive and never displace local ones.

use super::catalog;
use crate::intent::Mood;
use crate::knowledge::{MoodTopic, RetrievalEngine};
use crate::profile::UserProfile;
use crate::providers::{ContentKind, RemoteContent};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of content offered during an intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Short jokes
    Jokes,
    /// Uplifting images
    Images,
    /// Music tracks
    Music,
    /// Small distraction games
    Games,
    /// Things to do right now
    Activities,
    /// Breathing and grounding prompts
    Mindfulness,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 6] = [
        Category::Jokes,
        Category::Images,
        Category::Music,
        Category::Games,
        Category::Activities,
        Category::Mindfulness,
    ];

    /// Lowercase plural label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jokes => "jokes",
            Self::Images => "images",
            Self::Music => "music",
            Self::Games => "games",
            Self::Activities => "activities",
            Self::Mindfulness => "mindfulness",
        }
    }

    /// Parses a singular or plural label
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::intervention::Category;
    ///
    /// assert_eq!(Category::parse_str("joke"), Some(Category::Jokes));
    /// assert_eq!(Category::parse_str("Images"), Some(Category::Images));
    /// assert_eq!(Category::parse_str("dance"), None);
    /// ```
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "joke" | "jokes" => Some(Self::Jokes),
            "image" | "images" | "picture" | "pictures" => Some(Self::Images),
            "music" | "song" | "songs" | "track" => Some(Self::Music),
            "game" | "games" => Some(Self::Games),
            "activity" | "activities" => Some(Self::Activities),
            "mindfulness" | "breathing" => Some(Self::Mindfulness),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOrigin {
    /// Built in, always available
    Local,
    /// Fetched best-effort from a content provider
    Remote,
}

/// One piece of content offered to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterventionItem {
    /// Category the item belongs to
    pub category: Category,
    /// Display text
    pub text: String,
    /// Link for images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Local or remote
    pub origin: ItemOrigin,
}

impl InterventionItem {
    /// Creates a local item
    pub fn local(category: Category, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
            url: None,
            origin: ItemOrigin::Local,
        }
    }

    /// Converts fetched content into an item
    pub fn from_remote(content: RemoteContent) -> Self {
        let category = match content.kind {
            ContentKind::Joke => Category::Jokes,
            ContentKind::Image => Category::Images,
        };
        let text = content
            .text
            .unwrap_or_else(|| "Here's something to brighten your day".to_string());
        Self {
            category,
            text,
            url: content.url,
            origin: ItemOrigin::Remote,
        }
    }

    /// Whether the item is built in
    pub fn is_local(&self) -> bool {
        self.origin == ItemOrigin::Local
    }
}

/// Content offered for one low-mood trigger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InterventionBundle {
    mood: Mood,
    talking_point: Option<String>,
    jokes: Vec<InterventionItem>,
    images: Vec<InterventionItem>,
    music: Vec<InterventionItem>,
    games: Vec<InterventionItem>,
    activities: Vec<InterventionItem>,
    mindfulness: Vec<InterventionItem>,
}

impl InterventionBundle {
    /// Builds the local part of a bundle for `mood`
    ///
    /// Jokes and games come from the built-in catalog; activities,
    /// mindfulness prompts, music and the talking point come from the
    /// mood facts in the knowledge base.
    pub fn local(mood: Mood, retrieval: &RetrievalEngine, profile: &UserProfile) -> Self {
        let from_kb = |topic: MoodTopic, category: Category| -> Vec<InterventionItem> {
            retrieval
                .retrieve_mood(mood, topic, profile)
                .into_iter()
                .map(|fact| InterventionItem::local(category, fact.content))
                .collect()
        };

        Self {
            mood,
            talking_point: retrieval
                .retrieve_mood(mood, MoodTopic::TalkingPoint, profile)
                .first()
                .map(|fact| fact.content.to_string()),
            jokes: catalog::JOKES
                .iter()
                .map(|joke| InterventionItem::local(Category::Jokes, *joke))
                .collect(),
            images: Vec::new(),
            music: from_kb(MoodTopic::Music, Category::Music),
            games: catalog::GAMES
                .iter()
                .map(|game| InterventionItem::local(Category::Games, *game))
                .collect(),
            activities: from_kb(MoodTopic::Activity, Category::Activities),
            mindfulness: from_kb(MoodTopic::Mindfulness, Category::Mindfulness),
        }
    }

    /// Mood the bundle was built for
    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Empathetic opening line for the mood
    pub fn talking_point(&self) -> Option<&str> {
        self.talking_point.as_deref()
    }

    /// Items of one category in offer order
    pub fn items(&self, category: Category) -> &[InterventionItem] {
        match category {
            Category::Jokes => &self.jokes,
            Category::Images => &self.images,
            Category::Music => &self.music,
            Category::Games => &self.games,
            Category::Activities => &self.activities,
            Category::Mindfulness => &self.mindfulness,
        }
    }

    fn items_mut(&mut self, category: Category) -> &mut Vec<InterventionItem> {
        match category {
            Category::Jokes => &mut self.jokes,
            Category::Images => &mut self.images,
            Category::Music => &mut self.music,
            Category::Games => &mut self.games,
            Category::Activities => &mut self.activities,
            Category::Mindfulness => &mut self.mindfulness,
        }
    }

    /// Appends items, skipping any whose text and url are already present
    ///
    /// Returns the number of items added.
    pub fn merge(&mut self, items: impl IntoIterator<Item = InterventionItem>) -> usize {
        let mut added = 0;
        for item in items {
            let list = self.items_mut(item.category);
            if list
                .iter()
                .any(|existing| existing.text == item.text && existing.url == item.url)
            {
                continue;
            }
            list.push(item);
            added += 1;
        }
        added
    }

    /// Whether at least one built-in item is present
    pub fn has_local_fallback(&self) -> bool {
        Category::ALL
            .iter()
            .any(|c| self.items(*c).iter().any(InterventionItem::is_local))
    }

    /// Total number of items
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.items(*c).len()).sum()
    }

    /// Whether the bundle holds no items
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
