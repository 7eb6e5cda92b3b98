//! HTTP content providers for jokes and images
//!
//! Each provider issues a single GET and reads a `text` or `url` field from
//! the JSON body. A few common aliases (`joke`, `message`) are accepted so
//! public joke and image APIs can be pointed at directly.

use crate::error::{CoachError, Result};
use crate::providers::{ContentKind, ContentProvider, RemoteContent};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ContentBody {
    #[serde(default, alias = "joke")]
    text: Option<String>,
    #[serde(default, alias = "message")]
    url: Option<String>,
}

/// Joke or image source reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpContentProvider {
    client: Client,
    url: String,
    kind: ContentKind,
}

impl HttpContentProvider {
    /// Creates a provider fetching `kind` items from `url`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client cannot be built
    pub fn new(kind: ContentKind, url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        url::Url::parse(&url)
            .map_err(|e| CoachError::Content(format!("Invalid {} url {}: {}", kind, url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coachkit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoachError::Content(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url, kind })
    }
}

#[async_trait]
impl ContentProvider for HttpContentProvider {
    fn name(&self) -> &str {
        &self.url
    }

    fn kind(&self) -> ContentKind {
        self.kind
    }

    async fn fetch(&self) -> Result<RemoteContent> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CoachError::Content(format!("{} request failed: {}", self.kind, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                CoachError::Content(format!("{} source returned {}", self.kind, status)).into(),
            );
        }

        let body: ContentBody = response.json().await.map_err(|e| {
            CoachError::Content(format!("Failed to parse {} response: {}", self.kind, e))
        })?;

        let text = body.text.filter(|t| !t.trim().is_empty());
        let url = body.url.filter(|u| !u.trim().is_empty());
        let usable = match self.kind {
            ContentKind::Joke => text.is_some(),
            ContentKind::Image => url.is_some(),
        };
        if !usable {
            return Err(CoachError::Content(format!(
                "{} response carried no usable field",
                self.kind
            ))
            .into());
        }

        Ok(RemoteContent {
            kind: self.kind,
            text,
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_accepts_aliases() {
        let body: ContentBody =
            serde_json::from_str(r#"{"joke":"a pun","status":200}"#).unwrap();
        assert_eq!(body.text.as_deref(), Some("a pun"));

        let body: ContentBody =
            serde_json::from_str(r#"{"message":"https://img/1.jpg"}"#).unwrap();
        assert_eq!(body.url.as_deref(), Some("https://img/1.jpg"));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = HttpContentProvider::new(ContentKind::Joke, "::", Duration::from_secs(1));
        assert!(result.is_err());
    }
}
