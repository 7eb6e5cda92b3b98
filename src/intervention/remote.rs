//! Best-effort remote content
//!
//! Every provider is polled concurrently and individually timeboxed. Failed
//! or slow providers simply contribute nothing. Results carry the trigger id
//! they were requested for so a machine can ignore batches that arrive after
//! it closed or moved on to a newer trigger.

use super::bundle::InterventionItem;
use crate::engine::metrics::{self, FetchOutcome};
use crate::providers::ContentProvider;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Remote items fetched for one trigger
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteBatch {
    /// Trigger the items were requested for
    pub trigger_id: String,
    /// Items received
    pub items: Vec<InterventionItem>,
}

/// Streams one single-item batch per provider, in arrival order
///
/// Providers that fail or exceed `per_source_timeout` yield nothing.
pub fn remote_content_stream(
    trigger_id: String,
    providers: Vec<Arc<dyn ContentProvider>>,
    per_source_timeout: Duration,
) -> impl Stream<Item = RemoteBatch> + Send + 'static {
    providers
        .into_iter()
        .map(move |provider| {
            let trigger_id = trigger_id.clone();
            async move {
                match tokio::time::timeout(per_source_timeout, provider.fetch()).await {
                    Ok(Ok(content)) => {
                        metrics::record_content_fetch(FetchOutcome::Ok);
                        Some(RemoteBatch {
                            trigger_id,
                            items: vec![InterventionItem::from_remote(content)],
                        })
                    }
                    Ok(Err(e)) => {
                        tracing::debug!("Content provider {} failed: {:#}", provider.name(), e);
                        metrics::record_content_fetch(FetchOutcome::Error);
                        None
                    }
                    Err(_) => {
                        tracing::debug!("Content provider {} timed out", provider.name());
                        metrics::record_content_fetch(FetchOutcome::Timeout);
                        None
                    }
                }
            }
        })
        .collect::<FuturesUnordered<_>>()
        .filter_map(|batch| async move { batch })
}

/// Fetches from every provider and collects the results into one batch
///
/// # Examples
///
/// ```
/// use coachkit::intervention::fetch_remote_content;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let batch = fetch_remote_content("t1".to_string(), Vec::new(), Duration::from_millis(10)).await;
/// assert_eq!(batch.trigger_id, "t1");
/// assert!(batch.items.is_empty());
/// # });
/// ```
pub async fn fetch_remote_content(
    trigger_id: String,
    providers: Vec<Arc<dyn ContentProvider>>,
    per_source_timeout: Duration,
) -> RemoteBatch {
    let items = remote_content_stream(trigger_id.clone(), providers, per_source_timeout)
        .flat_map(|batch| futures::stream::iter(batch.items))
        .collect::<Vec<_>>()
        .await;
    RemoteBatch { trigger_id, items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoachError, Result};
    use crate::intervention::Category;
    use crate::providers::{ContentKind, RemoteContent};
    use async_trait::async_trait;

    enum Behaviour {
        Joke(&'static str),
        Slow(u64, &'static str),
        Fail,
        Hang,
    }

    struct FakeSource(Behaviour);

    #[async_trait]
    impl ContentProvider for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        fn kind(&self) -> ContentKind {
            ContentKind::Joke
        }

        async fn fetch(&self) -> Result<RemoteContent> {
            match self.0 {
                Behaviour::Joke(text) => Ok(RemoteContent {
                    kind: ContentKind::Joke,
                    text: Some(text.to_string()),
                    url: None,
                }),
                Behaviour::Slow(millis, text) => {
                    tokio::time::sleep(Duration::from_millis(millis)).await;
                    Ok(RemoteContent {
                        kind: ContentKind::Joke,
                        text: Some(text.to_string()),
                        url: None,
                    })
                }
                Behaviour::Fail => Err(CoachError::Content("down".to_string()).into()),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Err(CoachError::Content("unreachable".to_string()).into())
                }
            }
        }
    }

    #[tokio::test]
    async fn test_failed_and_slow_sources_are_omitted() {
        let providers: Vec<Arc<dyn ContentProvider>> = vec![
            Arc::new(FakeSource(Behaviour::Fail)),
            Arc::new(FakeSource(Behaviour::Hang)),
            Arc::new(FakeSource(Behaviour::Joke("remote pun"))),
        ];
        let batch = fetch_remote_content("t".to_string(), providers, Duration::from_millis(50)).await;
        assert_eq!(batch.items.len(), 1);
        assert_eq!(batch.items[0].text, "remote pun");
        assert_eq!(batch.items[0].category, Category::Jokes);
        assert!(!batch.items[0].is_local());
    }

    #[tokio::test]
    async fn test_stream_yields_per_provider() {
        let providers: Vec<Arc<dyn ContentProvider>> = vec![
            Arc::new(FakeSource(Behaviour::Joke("one"))),
            Arc::new(FakeSource(Behaviour::Joke("two"))),
        ];
        let batches: Vec<RemoteBatch> =
            remote_content_stream("t".to_string(), providers, Duration::from_millis(50))
                .collect()
                .await;
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.trigger_id == "t" && b.items.len() == 1));
    }

    #[tokio::test]
    async fn test_fast_source_merges_before_slow_one_resolves() {
        use crate::clock::system_clock;
        use crate::config::InterventionConfig;
        use crate::intent::Mood;
        use crate::intervention::{InterventionMachine, TriggerOutcome};
        use crate::knowledge::RetrievalEngine;
        use crate::profile::{Goal, MoodEntry, UserProfile};

        let mut machine = InterventionMachine::new(InterventionConfig::default(), system_clock());
        let entry = MoodEntry::new(chrono::Utc::now(), 1, Some(Mood::Sad), "");
        let TriggerOutcome::Opened(trigger_id) = machine.trigger(
            entry,
            Mood::Sad,
            &RetrievalEngine::default(),
            &UserProfile::new("u", Goal::Maintenance),
        ) else {
            panic!("intervention did not open");
        };
        let local_jokes = machine.bundle().unwrap().items(Category::Jokes).len();

        let providers: Vec<Arc<dyn ContentProvider>> = vec![
            Arc::new(FakeSource(Behaviour::Slow(1500, "slow"))),
            Arc::new(FakeSource(Behaviour::Slow(10, "fast"))),
        ];
        let started = std::time::Instant::now();
        let mut stream =
            Box::pin(remote_content_stream(trigger_id, providers, Duration::from_secs(2)));

        let first = stream.next().await.expect("fast batch");
        assert!(started.elapsed() < Duration::from_millis(1000));
        assert_eq!(first.items[0].text, "fast");
        assert_eq!(machine.merge_remote(first), 1);
        let jokes = machine.bundle().unwrap().items(Category::Jokes);
        assert_eq!(jokes.len(), local_jokes + 1);
        assert_eq!(jokes.last().unwrap().text, "fast");

        let second = stream.next().await.expect("slow batch");
        assert_eq!(second.items[0].text, "slow");
        assert!(stream.next().await.is_none());
    }
}
