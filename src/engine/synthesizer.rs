//! Two-path response synthesis
//!
//! The remote path sends the assembled context to a generation service. Its
//! reply is accepted only if it arrives within the timeout and is at least
//! `min_response_chars` long; anything else is discarded and the local path
//! composes a response from templates. Synthesis itself never fails.

use crate::engine::context::CoachContext;
use crate::engine::metrics::{self, RejectReason};
use crate::engine::templates;
use crate::intent::Intent;
use crate::knowledge::KnowledgeFact;
use crate::providers::{GenerationProvider, GenerationRequest, GenerationResponse};

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default remote timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Default minimum acceptable remote reply length, in characters
pub const DEFAULT_MIN_RESPONSE_CHARS: usize = 50;

/// Which path produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    /// Accepted reply from the generation service
    Remote,
    /// Composed from local templates
    Local,
}

impl ResponseSource {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

/// Final response handed to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedResponse {
    /// Response text
    pub text: String,
    /// Intent the response answers
    pub intent: Intent,
    /// Path that produced the text
    pub source: ResponseSource,
    /// Distinct topic keys of the facts used, in retrieval order
    pub sources: Vec<String>,
    /// Confidence reported by the generation service, if any
    pub confidence: Option<f32>,
}

impl SynthesizedResponse {
    /// Whether the response came from the local fallback
    pub fn is_local(&self) -> bool {
        self.source == ResponseSource::Local
    }
}

/// Produces responses, preferring the remote path when one is configured
#[derive(Clone)]
pub struct ResponseSynthesizer {
    provider: Option<Arc<dyn GenerationProvider>>,
    timeout: Duration,
    min_response_chars: usize,
}

impl ResponseSynthesizer {
    /// Creates a synthesizer
    ///
    /// # Arguments
    ///
    /// * `provider` - Remote generation service, or `None` for local only
    /// * `timeout` - Upper bound on the remote call
    /// * `min_response_chars` - Shortest remote reply that is accepted
    pub fn new(
        provider: Option<Arc<dyn GenerationProvider>>,
        timeout: Duration,
        min_response_chars: usize,
    ) -> Self {
        Self {
            provider,
            timeout,
            min_response_chars,
        }
    }

    /// Synthesizer that always uses local templates
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::engine::ResponseSynthesizer;
    ///
    /// let synthesizer = ResponseSynthesizer::local_only();
    /// assert!(!synthesizer.has_remote());
    /// ```
    pub fn local_only() -> Self {
        Self::new(None, DEFAULT_TIMEOUT, DEFAULT_MIN_RESPONSE_CHARS)
    }

    /// Whether a remote provider is configured
    pub fn has_remote(&self) -> bool {
        self.provider.is_some()
    }

    /// Produces a response for `context` from the retrieved `facts`
    ///
    /// With `offline` set the remote path is skipped entirely.
    pub async fn synthesize(
        &self,
        facts: &[KnowledgeFact],
        context: &CoachContext,
        offline: bool,
    ) -> SynthesizedResponse {
        let started = Instant::now();
        let remote = if offline {
            None
        } else {
            self.try_remote(context).await
        };

        let response = match remote {
            Some(reply) => SynthesizedResponse {
                text: reply.text.trim().to_string(),
                intent: context.intent,
                source: ResponseSource::Remote,
                sources: topic_keys(facts),
                confidence: reply.confidence,
            },
            None => self.synthesize_local(facts, context),
        };

        metrics::record_synthesis(response.source, started.elapsed());
        tracing::debug!(
            intent = %response.intent,
            source = response.source.as_str(),
            chars = response.text.len(),
            "Synthesized response"
        );
        response
    }

    /// Composes the local response
    pub fn synthesize_local(
        &self,
        facts: &[KnowledgeFact],
        context: &CoachContext,
    ) -> SynthesizedResponse {
        SynthesizedResponse {
            text: templates::compose_local(context, facts),
            intent: context.intent,
            source: ResponseSource::Local,
            sources: topic_keys(facts),
            confidence: None,
        }
    }

    async fn try_remote(&self, context: &CoachContext) -> Option<GenerationResponse> {
        let provider = self.provider.as_ref()?;
        let request = GenerationRequest::from_context(context);

        let reply = match tokio::time::timeout(self.timeout, provider.generate(&request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!("Remote generation failed, using local suggestions: {:#}", e);
                metrics::record_rejection(RejectReason::Error);
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    "Remote generation timed out after {:?}, using local suggestions",
                    self.timeout
                );
                metrics::record_rejection(RejectReason::Timeout);
                return None;
            }
        };

        let length = reply.text.trim().chars().count();
        if length < self.min_response_chars {
            tracing::warn!(
                "Remote reply too short ({} < {} chars), using local suggestions",
                length,
                self.min_response_chars
            );
            metrics::record_rejection(RejectReason::TooShort);
            return None;
        }

        Some(reply)
    }
}

impl std::fmt::Debug for ResponseSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseSynthesizer")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("timeout", &self.timeout)
            .field("min_response_chars", &self.min_response_chars)
            .finish()
    }
}

fn topic_keys(facts: &[KnowledgeFact]) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for fact in facts {
        if !keys.iter().any(|k| k == fact.topic) {
            keys.push(fact.topic.to_string());
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoachError, Result};
    use crate::profile::{Goal, UserProfile};
    use async_trait::async_trait;

    enum Behaviour {
        Reply(&'static str),
        Fail,
        Hang,
    }

    struct FakeProvider(Behaviour);

    #[async_trait]
    impl GenerationProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResponse> {
            match self.0 {
                Behaviour::Reply(text) => Ok(GenerationResponse {
                    text: text.to_string(),
                    confidence: Some(0.9),
                }),
                Behaviour::Fail => Err(CoachError::Provider("boom".to_string()).into()),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(CoachError::Provider("unreachable".to_string()).into())
                }
            }
        }
    }

    fn synthesizer(behaviour: Behaviour) -> ResponseSynthesizer {
        ResponseSynthesizer::new(
            Some(Arc::new(FakeProvider(behaviour))),
            Duration::from_millis(50),
            50,
        )
    }

    fn context() -> CoachContext {
        CoachContext::for_query(
            "How much protein do I need?",
            Intent::ProteinInquiry,
            UserProfile::new("u", Goal::MuscleGain),
        )
    }

    const LONG_REPLY: &str =
        "Aim for roughly 1.6 to 2.2 grams of protein per kilogram of body weight each day.";

    #[tokio::test]
    async fn test_remote_reply_accepted() {
        let response = synthesizer(Behaviour::Reply(LONG_REPLY))
            .synthesize(&[], &context(), false)
            .await;
        assert_eq!(response.source, ResponseSource::Remote);
        assert_eq!(response.text, LONG_REPLY);
        assert_eq!(response.confidence, Some(0.9));
    }

    #[tokio::test]
    async fn test_short_reply_falls_back() {
        let response = synthesizer(Behaviour::Reply("Eat more protein ok."))
            .synthesize(&[], &context(), false)
            .await;
        assert!(response.is_local());
        assert!(response.text.contains("Protein target"));
        assert!(response.confidence.is_none());
    }

    #[tokio::test]
    async fn test_error_falls_back() {
        let response = synthesizer(Behaviour::Fail)
            .synthesize(&[], &context(), false)
            .await;
        assert!(response.is_local());
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let response = synthesizer(Behaviour::Hang)
            .synthesize(&[], &context(), false)
            .await;
        assert!(response.is_local());
    }

    #[tokio::test]
    async fn test_offline_skips_remote() {
        let response = synthesizer(Behaviour::Reply(LONG_REPLY))
            .synthesize(&[], &context(), true)
            .await;
        assert!(response.is_local());
    }

    #[test]
    fn test_topic_keys_distinct_in_order() {
        let facts = [
            KnowledgeFact::new("protein", "a"),
            KnowledgeFact::new("hydration", "b"),
            KnowledgeFact::new("protein", "c"),
        ];
        assert_eq!(topic_keys(&facts), vec!["protein", "hydration"]);
    }
}
