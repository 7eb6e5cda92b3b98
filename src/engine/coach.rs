//! The coaching engine
//!
//! [`CoachEngine`] runs the query pipeline: classify, build context, retrieve,
//! synthesize, then append both turns to the conversation. Every stage has a
//! defined fallback, so [`CoachEngine::ask`] always returns a response.

use crate::clock::{system_clock, Clock, SharedClock};
use crate::config::Config;
use crate::engine::context::{CoachContext, ContextBuilder};
use crate::engine::conversation::{Conversation, ConversationTurn};
use crate::engine::synthesizer::{ResponseSynthesizer, SynthesizedResponse};
use crate::error::Result;
use crate::intent::{Intent, IntentClassifier, Mood, MoodClassifier};
use crate::knowledge::{KnowledgeBase, KnowledgeFact, RetrievalEngine};
use crate::profile::{ExternalEvent, HistoryEntry, UserProfile};
use crate::providers::{self, GenerationProvider};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Rule-based coaching engine with a remote-first, local-fallback synthesizer
///
/// # Examples
///
/// ```
/// use coachkit::engine::{CoachEngine, Conversation};
/// use coachkit::intent::Intent;
/// use coachkit::profile::{Goal, UserProfile};
///
/// # tokio_test::block_on(async {
/// let engine = CoachEngine::local();
/// let mut conversation = Conversation::default();
/// let profile = UserProfile::new("u1", Goal::MuscleGain);
/// let response = engine
///     .ask(
///         &mut conversation,
///         &profile,
///         &[],
///         "How much protein do I need for muscle gain?",
///         None,
///     )
///     .await;
/// assert_eq!(response.intent, Intent::ProteinInquiry);
/// assert_eq!(conversation.len(), 2);
/// # });
/// ```
#[derive(Debug)]
pub struct CoachEngine {
    intents: IntentClassifier,
    moods: MoodClassifier,
    retrieval: RetrievalEngine,
    contexts: ContextBuilder,
    synthesizer: ResponseSynthesizer,
    clock: SharedClock,
    offline: AtomicBool,
}

impl CoachEngine {
    /// Creates an engine from its parts
    pub fn new(
        retrieval: RetrievalEngine,
        contexts: ContextBuilder,
        synthesizer: ResponseSynthesizer,
        clock: SharedClock,
    ) -> Self {
        Self {
            intents: IntentClassifier::new(),
            moods: MoodClassifier::new(),
            retrieval,
            contexts,
            synthesizer,
            clock,
            offline: AtomicBool::new(false),
        }
    }

    /// Local-only engine with built-in knowledge and default limits
    pub fn local() -> Self {
        Self::new(
            RetrievalEngine::default(),
            ContextBuilder::default(),
            ResponseSynthesizer::local_only(),
            system_clock(),
        )
    }

    /// Creates an engine from configuration with an explicit provider
    pub fn with_provider(
        config: &Config,
        provider: Option<Arc<dyn GenerationProvider>>,
        clock: SharedClock,
    ) -> Self {
        let retrieval = RetrievalEngine::new(KnowledgeBase::builtin(), config.engine.max_facts);
        let contexts = ContextBuilder::new(config.engine.history_limit);
        let synthesizer = ResponseSynthesizer::new(
            provider,
            Duration::from_millis(config.generation.timeout_ms),
            config.generation.min_response_chars,
        );
        Self::new(retrieval, contexts, synthesizer, clock)
    }

    /// Creates an engine from configuration, building the HTTP provider
    ///
    /// # Errors
    ///
    /// Returns error if the configured generation endpoint is invalid
    pub fn from_config(config: &Config, clock: SharedClock) -> Result<Self> {
        let provider = providers::create_generation_provider(&config.generation)?;
        Ok(Self::with_provider(config, provider, clock))
    }

    /// Classifies a query
    pub fn classify(&self, text: &str) -> Intent {
        self.intents.classify(text)
    }

    /// Resolves the mood of a report
    pub fn classify_mood(&self, feeling: Option<Mood>, note: &str, rating: u8) -> Mood {
        self.moods.resolve(feeling, note, rating)
    }

    /// Builds the context for a query
    pub fn build_context(
        &self,
        query: &str,
        intent: Intent,
        profile: &UserProfile,
        history: &[HistoryEntry],
        conversation: &Conversation,
        event: Option<&ExternalEvent>,
    ) -> CoachContext {
        self.contexts
            .build(query, intent, profile, history, conversation, event)
    }

    /// Retrieves the facts for an intent and context
    pub fn retrieve(&self, intent: Intent, context: &CoachContext) -> Vec<KnowledgeFact> {
        self.retrieval.retrieve(intent, context)
    }

    /// Synthesizes a response, honouring the offline flag
    pub async fn synthesize(
        &self,
        facts: &[KnowledgeFact],
        context: &CoachContext,
    ) -> SynthesizedResponse {
        self.synthesizer
            .synthesize(facts, context, self.is_offline())
            .await
    }

    /// Answers one query and appends both turns to `conversation`
    ///
    /// Taking the conversation mutably means a new query cannot start until
    /// the previous one has resolved, which keeps turns in submission order.
    pub async fn ask(
        &self,
        conversation: &mut Conversation,
        profile: &UserProfile,
        history: &[HistoryEntry],
        query: &str,
        event: Option<&ExternalEvent>,
    ) -> SynthesizedResponse {
        let asked_at = self.clock.now();
        let intent = self.classify(query);
        let context = self.build_context(query, intent, profile, history, conversation, event);
        let facts = self.retrieve(intent, &context);
        let response = self.synthesize(&facts, &context).await;

        conversation.push(ConversationTurn::user(query, asked_at));
        let mut reply = ConversationTurn::system(response.text.clone(), self.clock.now())
            .with_intent(response.intent)
            .with_sources(response.sources.clone());
        reply.confidence = response.confidence;
        conversation.push(reply);

        response
    }

    /// Marks the engine offline; the remote path is skipped while set
    pub fn set_offline(&self, offline: bool) {
        let was = self.offline.swap(offline, Ordering::SeqCst);
        if was != offline {
            if offline {
                tracing::warn!("Working offline, using local suggestions");
            } else {
                tracing::info!("Back online");
            }
        }
    }

    /// Whether the engine is offline
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Whether a remote generation provider is configured
    pub fn has_remote(&self) -> bool {
        self.synthesizer.has_remote()
    }

    /// The retrieval engine, shared with the intervention flow
    pub fn retrieval(&self) -> &RetrievalEngine {
        &self.retrieval
    }

    /// The clock the engine timestamps turns with
    pub fn clock(&self) -> SharedClock {
        Arc::clone(&self.clock)
    }
}
