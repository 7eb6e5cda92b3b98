//! Remote collaborators
//!
//! Generation and content providers sit behind async traits so the engine can
//! run against HTTP services, test doubles, or nothing at all.

pub mod base;
pub mod content;
pub mod http;

pub use base::{
    ContentKind, ContentProvider, GenerationProvider, GenerationRequest, GenerationResponse,
    RemoteContent,
};
pub use content::HttpContentProvider;
pub use http::HttpGenerationProvider;

use crate::config::{ContentConfig, GenerationConfig};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Creates the generation provider described by `config`
///
/// Returns `Ok(None)` when no endpoint is configured; the engine then always
/// answers from local templates.
///
/// # Errors
///
/// Returns error if the endpoint is invalid
///
/// # Examples
///
/// ```
/// use coachkit::config::GenerationConfig;
/// use coachkit::providers::create_generation_provider;
///
/// let provider = create_generation_provider(&GenerationConfig::default()).unwrap();
/// assert!(provider.is_none());
/// ```
pub fn create_generation_provider(
    config: &GenerationConfig,
) -> Result<Option<Arc<dyn GenerationProvider>>> {
    match &config.endpoint {
        Some(endpoint) => {
            let provider = HttpGenerationProvider::new(
                endpoint.clone(),
                Duration::from_millis(config.timeout_ms),
            )?;
            Ok(Some(Arc::new(provider)))
        }
        None => Ok(None),
    }
}

/// Creates every content provider configured in `config`
///
/// # Errors
///
/// Returns error if a configured URL is invalid
pub fn create_content_providers(config: &ContentConfig) -> Result<Vec<Arc<dyn ContentProvider>>> {
    let timeout = Duration::from_millis(config.timeout_ms);
    let mut providers: Vec<Arc<dyn ContentProvider>> = Vec::new();
    if let Some(url) = &config.joke_url {
        providers.push(Arc::new(HttpContentProvider::new(
            ContentKind::Joke,
            url.clone(),
            timeout,
        )?));
    }
    if let Some(url) = &config.image_url {
        providers.push(Arc::new(HttpContentProvider::new(
            ContentKind::Image,
            url.clone(),
            timeout,
        )?));
    }
    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_generation_provider_with_endpoint() {
        let config = GenerationConfig {
            endpoint: Some("http://localhost:9000/generate".to_string()),
            ..GenerationConfig::default()
        };
        let provider = create_generation_provider(&config).unwrap();
        assert_eq!(provider.map(|p| p.name().to_string()), Some("http".to_string()));
    }

    #[test]
    fn test_create_generation_provider_invalid_endpoint() {
        let config = GenerationConfig {
            endpoint: Some("nope".to_string()),
            ..GenerationConfig::default()
        };
        assert!(create_generation_provider(&config).is_err());
    }

    #[test]
    fn test_create_content_providers() {
        let config = ContentConfig {
            joke_url: Some("https://jokes.example/random".to_string()),
            image_url: Some("https://images.example/random".to_string()),
            ..ContentConfig::default()
        };
        let providers = create_content_providers(&config).unwrap();
        let kinds: Vec<ContentKind> = providers.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![ContentKind::Joke, ContentKind::Image]);
    }

    #[test]
    fn test_create_content_providers_empty() {
        assert!(create_content_providers(&ContentConfig::default())
            .unwrap()
            .is_empty());
    }
}
