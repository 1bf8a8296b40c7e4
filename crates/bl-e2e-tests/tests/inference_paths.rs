//! E2E tests for the classifier backends behind the intent stage.

mod helpers;

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bl_classifier::{ClassifierGateway, OllamaClassifier, OllamaConfig};
use bl_protocol::CHECK;
use bl_router::{IntentOutcome, RouteOutcome};

use helpers::{ALICE, TestHarness, sample_intents};

fn ollama_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "phi3:mini",
        "message": { "role": "assistant", "content": content },
        "done": true
    })
}

fn ollama_for(h: &TestHarness, server: &MockServer) -> Arc<dyn ClassifierGateway> {
    let classifier = OllamaClassifier::new(
        OllamaConfig {
            host: server.uri(),
            model: "phi3:mini".into(),
            timeout_secs: 2,
            enabled: true,
        },
        h.model.intents(),
    )
    .unwrap();
    Arc::new(classifier)
}

/// Ollama picks the label; the router gates it and runs the handler.
#[tokio::test]
async fn e2e_ollama_classifier_drives_intents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ollama_reply(
            r#"{"label": "headpat", "confidence": 0.96}"#,
        )))
        .mount(&server)
        .await;

    let h = TestHarness::new();
    h.bot
        .router()
        .intents()
        .set_classifier(ollama_for(&h, &server));

    let (_, outcome) = h.say("*pats baselard*").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Intent(IntentOutcome::Handled { ref label, .. })) if label == "headpat"
    ));
    assert!(h.classifier.calls().is_empty());
}

/// An unreachable Ollama is an ordinary classifier failure.
#[tokio::test]
async fn e2e_ollama_down_is_classifier_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let h = TestHarness::new();
    h.bot
        .router()
        .intents()
        .set_classifier(ollama_for(&h, &server));

    let (_, outcome) = h.say("hello").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Intent(IntentOutcome::ClassifierFailed))
    ));
    assert!(h.transport.calls().is_empty());
}

/// Confirmed utterances persist to disk and take effect after `/intent reload`.
#[tokio::test]
async fn e2e_added_utterance_applies_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("intents.json");
    std::fs::write(
        &file,
        serde_json::json!({ "intents": sample_intents() }).to_string(),
    )
    .unwrap();

    let h = TestHarness::with_model_file(&file);

    // Not known yet: no overlap with any utterance.
    let (_, outcome) = h.say("yahallo").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Intent(IntentOutcome::BelowThreshold { .. }))
    ));

    h.say("/intent add greeting yahallo").await;
    let prompt_id = h.last_sent_id();
    h.react(prompt_id, ALICE, CHECK).await;

    let saved = std::fs::read_to_string(&file).unwrap();
    assert!(saved.contains("yahallo"));

    // Still the old snapshot until reload.
    let (_, outcome) = h.say("yahallo").await;
    assert!(!matches!(
        outcome,
        Some(RouteOutcome::Intent(IntentOutcome::Handled { .. }))
    ));

    h.say("/intent reload").await;
    assert_eq!(
        h.transport.last_sent().unwrap().content.as_deref(),
        Some("Reloaded my NLP model with 4 intents")
    );

    let (_, outcome) = h.say("yahallo").await;
    assert!(matches!(
        outcome,
        Some(RouteOutcome::Intent(IntentOutcome::Handled { ref label, .. })) if label == "greeting"
    ));
}
