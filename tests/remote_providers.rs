//! Remote generation and content providers against a wiremock server
//!
//! Covers the quality gate on generated replies (length, status, timeout),
//! the JSON request shape the generation service receives, and the
//! best-effort joke and image sources merged into an open intervention.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use coachkit::clock::system_clock;
use coachkit::config::{ContentConfig, InterventionConfig};
use coachkit::engine::{CoachEngine, Conversation, ResponseSource};
use coachkit::intent::{Intent, Mood};
use coachkit::intervention::{
    fetch_remote_content, Category, InterventionMachine, ItemOrigin, TriggerOutcome,
};
use coachkit::profile::{Goal, MoodEntry};
use coachkit::providers::{
    create_content_providers, ContentKind, ContentProvider, HttpContentProvider,
};

mod common;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Matches generation requests whose conversation window has `len` turns
struct WindowLen(usize);

impl Match for WindowLen {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<serde_json::Value>(&request.body)
            .ok()
            .and_then(|body| {
                body.get("conversationWindow")
                    .and_then(|w| w.as_array())
                    .map(|w| w.len())
            })
            == Some(self.0)
    }
}

async fn engine_for(server: &MockServer) -> CoachEngine {
    let config = common::config_with_endpoint(&format!("{}/generate", server.uri()));
    CoachEngine::from_config(&config, system_clock()).expect("engine")
}

const LONG_REPLY: &str =
    "Aim for a palm-sized portion of lean protein at each meal and spread it across the day.";

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_remote_reply_is_used_when_long_enough() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "text": LONG_REPLY, "confidence": 0.5 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let mut conversation = Conversation::default();
    let response = engine
        .ask(
            &mut conversation,
            &common::profile(Goal::MuscleGain),
            &[],
            "How much protein do I need?",
            None,
        )
        .await;

    assert_eq!(response.source, ResponseSource::Remote);
    assert_eq!(response.text, LONG_REPLY);
    assert_eq!(response.intent, Intent::ProteinInquiry);
    assert_eq!(response.confidence, Some(0.5));
    assert_eq!(conversation.len(), 2);
}

/// A 20-character reply is below the 50-character minimum and is replaced by
/// the local composition.
#[tokio::test]
async fn test_short_remote_reply_falls_back_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "Eat more protein ok." })),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let mut conversation = Conversation::default();
    let response = engine
        .ask(
            &mut conversation,
            &common::profile(Goal::MuscleGain),
            &[],
            "How much protein do I need?",
            None,
        )
        .await;

    assert!(response.is_local());
    assert_ne!(response.text, "Eat more protein ok.");
    assert!(response.text.contains("Protein target"));
    assert_eq!(response.confidence, None);
}

#[tokio::test]
async fn test_server_error_falls_back_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let mut conversation = Conversation::default();
    let response = engine
        .ask(
            &mut conversation,
            &common::profile(Goal::Maintenance),
            &[],
            "how much water should I drink",
            None,
        )
        .await;

    assert!(response.is_local());
    assert_eq!(response.intent, Intent::Hydration);
}

#[tokio::test]
async fn test_slow_service_times_out_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "text": LONG_REPLY }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = common::config_with_endpoint(&format!("{}/generate", server.uri()));
    config.generation.timeout_ms = 200;
    let engine = CoachEngine::from_config(&config, system_clock()).unwrap();

    let started = std::time::Instant::now();
    let mut conversation = Conversation::default();
    let response = engine
        .ask(
            &mut conversation,
            &common::profile(Goal::Maintenance),
            &[],
            "protein please",
            None,
        )
        .await;

    assert!(response.is_local());
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_offline_engine_never_calls_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": LONG_REPLY })))
        .expect(0)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    engine.set_offline(true);
    let mut conversation = Conversation::default();
    let response = engine
        .ask(
            &mut conversation,
            &common::profile(Goal::Maintenance),
            &[],
            "protein please",
            None,
        )
        .await;

    assert!(response.is_local());
}

/// After eight turns the service sees only the latest six, in camelCase JSON.
#[tokio::test]
async fn test_request_carries_bounded_window() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(WindowLen(6))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": LONG_REPLY })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let mut conversation = Conversation::default();
    let start = chrono::Utc::now();
    for i in 0..8 {
        conversation.add_user_turn(format!("turn {}", i), start + chrono::Duration::seconds(i));
    }

    let response = engine
        .ask(
            &mut conversation,
            &common::profile(Goal::WeightLoss),
            &[],
            "any tips on fats?",
            None,
        )
        .await;

    assert_eq!(response.source, ResponseSource::Remote);

    let requests = server.received_requests().await.unwrap_or_default();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["query"], "any tips on fats?");
    assert!(body.get("recentHistory").is_some());
    assert_eq!(body["conversationWindow"][5]["text"], "turn 7");
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_content_providers_fetch_joke_and_image() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joke"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "joke": "A remote pun" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "message": "https://images.example/dog.jpg", "status": "success" }),
        ))
        .mount(&server)
        .await;

    let config = ContentConfig {
        joke_url: Some(format!("{}/joke", server.uri())),
        image_url: Some(format!("{}/image", server.uri())),
        ..ContentConfig::default()
    };
    let providers = create_content_providers(&config).unwrap();
    assert_eq!(providers.len(), 2);

    let joke = providers[0].fetch().await.unwrap();
    assert_eq!(joke.kind, ContentKind::Joke);
    assert_eq!(joke.text.as_deref(), Some("A remote pun"));

    let image = providers[1].fetch().await.unwrap();
    assert_eq!(image.kind, ContentKind::Image);
    assert_eq!(image.url.as_deref(), Some("https://images.example/dog.jpg"));
}

#[tokio::test]
async fn test_image_without_url_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "no link" })))
        .mount(&server)
        .await;

    let provider = HttpContentProvider::new(
        ContentKind::Image,
        format!("{}/image", server.uri()),
        Duration::from_secs(1),
    )
    .unwrap();
    assert!(provider.fetch().await.is_err());
}

/// One good source and one failing source: the good item is merged after
/// the local content, the failure is absorbed.
#[tokio::test]
async fn test_remote_content_merges_into_open_intervention() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/joke"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "text": "A remote pun" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = CoachEngine::local();
    let mut machine = InterventionMachine::new(InterventionConfig::default(), engine.clock());
    let entry = MoodEntry::new(chrono::Utc::now(), 2, Some(Mood::Sad), "rough day");
    let TriggerOutcome::Opened(trigger_id) = machine.trigger(
        entry,
        Mood::Sad,
        engine.retrieval(),
        &common::profile(Goal::Maintenance),
    ) else {
        panic!("intervention did not open");
    };
    let local_jokes = machine.bundle().unwrap().items(Category::Jokes).len();

    let sources: Vec<Arc<dyn ContentProvider>> = vec![
        Arc::new(
            HttpContentProvider::new(
                ContentKind::Joke,
                format!("{}/joke", server.uri()),
                Duration::from_secs(1),
            )
            .unwrap(),
        ),
        Arc::new(
            HttpContentProvider::new(
                ContentKind::Image,
                format!("{}/image", server.uri()),
                Duration::from_secs(1),
            )
            .unwrap(),
        ),
    ];
    let batch = fetch_remote_content(trigger_id, sources, Duration::from_secs(2)).await;
    assert_eq!(batch.items.len(), 1);
    assert_eq!(machine.merge_remote(batch), 1);

    let jokes = machine.bundle().unwrap().items(Category::Jokes);
    assert_eq!(jokes.len(), local_jokes + 1);
    assert_eq!(jokes[0].origin, ItemOrigin::Local);
    let last = jokes.last().unwrap();
    assert_eq!(last.origin, ItemOrigin::Remote);
    assert_eq!(last.text, "A remote pun");
    assert!(machine.bundle().unwrap().items(Category::Images).is_empty());
}
