//! Collaborator traits and wire types for remote providers
//!
//! Two narrow contracts are consumed by the engine: a generation service that
//! turns a query plus context into text, and optional content providers that
//! return a single joke or image. Both are best-effort; the engine applies its
//! own timeouts and treats every failure as "no result".

use crate::engine::context::CoachContext;
use crate::engine::conversation::ConversationTurn;
use crate::error::Result;
use crate::intent::Intent;
use crate::profile::{HistoryEntry, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payload sent to the remote generation service
///
/// Serialized in camelCase to match the service contract
/// `{query, intent, profile, recentHistory, conversationWindow}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Raw user text
    pub query: String,
    /// Classified intent
    pub intent: Intent,
    /// Profile snapshot
    pub profile: UserProfile,
    /// Bounded history suffix
    pub recent_history: Vec<HistoryEntry>,
    /// Bounded conversation window
    pub conversation_window: Vec<ConversationTurn>,
}

impl GenerationRequest {
    /// Builds the request payload from an assembled context
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::engine::context::CoachContext;
    /// use coachkit::intent::Intent;
    /// use coachkit::profile::UserProfile;
    /// use coachkit::providers::GenerationRequest;
    ///
    /// let ctx = CoachContext::for_query("hi", Intent::General, UserProfile::default());
    /// let request = GenerationRequest::from_context(&ctx);
    /// let json = serde_json::to_value(&request).unwrap();
    /// assert!(json.get("recentHistory").is_some());
    /// ```
    pub fn from_context(context: &CoachContext) -> Self {
        Self {
            query: context.query.clone(),
            intent: context.intent,
            profile: context.profile.clone(),
            recent_history: context.recent_history.clone(),
            conversation_window: context.conversation_window.clone(),
        }
    }
}

/// Body returned by the remote generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated reply
    pub text: String,
    /// Confidence, if the service reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Remote text generation collaborator
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use coachkit::error::Result;
/// use coachkit::providers::{GenerationProvider, GenerationRequest, GenerationResponse};
///
/// struct Echo;
///
/// #[async_trait]
/// impl GenerationProvider for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
///         Ok(GenerationResponse { text: request.query.clone(), confidence: None })
///     }
/// }
/// ```
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Generates a reply for `request`
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or an
    /// undecodable body. Callers treat every error as a rejection.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;
}

/// Kind of item a content provider returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A short joke
    Joke,
    /// An image link
    Image,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joke => write!(f, "joke"),
            Self::Image => write!(f, "image"),
        }
    }
}

/// One item fetched from a content provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteContent {
    /// Item kind
    pub kind: ContentKind,
    /// Text body (jokes)
    #[serde(default)]
    pub text: Option<String>,
    /// Link (images)
    #[serde(default)]
    pub url: Option<String>,
}

/// Optional remote source of jokes or images
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Kind of item this provider returns
    fn kind(&self) -> ContentKind;

    /// Fetches one item
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or when the body carries neither
    /// a text nor a url field.
    async fn fetch(&self) -> Result<RemoteContent>;
}
