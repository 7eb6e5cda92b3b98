//! HTTP generation provider
//!
//! Posts a [`GenerationRequest`] as JSON to a configured endpoint and decodes
//! a `{text}` body. The engine wraps every call in its own timeout and
//! quality gate; this provider only reports transport and decoding failures.

use crate::error::{CoachError, Result};
use crate::providers::{GenerationProvider, GenerationRequest, GenerationResponse};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Remote generation service reached over HTTP
///
/// # Examples
///
/// ```
/// use coachkit::providers::HttpGenerationProvider;
/// use std::time::Duration;
///
/// let provider = HttpGenerationProvider::new("http://localhost:9000/generate", Duration::from_secs(5));
/// assert!(provider.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HttpGenerationProvider {
    client: Client,
    endpoint: String,
}

impl HttpGenerationProvider {
    /// Creates a provider posting to `endpoint`
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Full URL of the generation service
    /// * `timeout` - Transport-level timeout for each request
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is not a valid URL or the HTTP client
    /// cannot be built
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint).map_err(|e| {
            CoachError::Provider(format!("Invalid generation endpoint {}: {}", endpoint, e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coachkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoachError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Initialized generation provider: endpoint={}", endpoint);

        Ok(Self { client, endpoint })
    }

    /// Endpoint this provider posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationProvider for HttpGenerationProvider {
    fn name(&self) -> &str {
        "http"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        tracing::debug!(
            "Sending generation request: intent={}, history={}, turns={}",
            request.intent,
            request.recent_history.len(),
            request.conversation_window.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| CoachError::Provider(format!("Generation request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CoachError::Provider(format!(
                "Generation service returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: GenerationResponse = response.json().await.map_err(|e| {
            CoachError::Provider(format!("Failed to parse generation response: {}", e))
        })?;

        tracing::debug!("Generation response: {} chars", body.text.chars().count());
        Ok(body)
    }
}
