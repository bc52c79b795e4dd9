//! Integration tests for the session + Gemini backend
//!
//! These drive a real `ChatSession<GeminiBackend>` against a wiremock server,
//! covering the full path from submit to the appended reply or notice.

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use companion_core::{
    ChatSession, FailureNotice, GeminiBackend, MessageRole, SessionConfig, SessionUpdate,
    NO_RESPONSE_PLACEHOLDER,
};

const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

// =============================================================================
// Helpers
// =============================================================================

fn gemini_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            { "content": { "parts": [ { "text": text } ], "role": "model" } }
        ]
    })
}

async fn mount(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(query_param("key", "integration-key"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn session_for(
    endpoint: String,
) -> (ChatSession<GeminiBackend>, mpsc::Receiver<SessionUpdate>) {
    let (tx, rx) = mpsc::channel(100);
    let backend = GeminiBackend::new(endpoint, "integration-key");
    (ChatSession::new(backend, SessionConfig::silent(), tx), rx)
}

/// Submit one prompt, wait for it to settle and return the last message text
async fn exchange(server: &MockServer, prompt: &str) -> String {
    let (mut session, _rx) = session_for(format!("{}{MODEL_PATH}", server.uri()));
    assert!(session.submit(prompt).await);
    assert!(session.settle().await);
    assert!(!session.is_loading());
    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.messages()[0].text, prompt);
    session.messages()[1].text.clone()
}

// =============================================================================
// Success Paths
// =============================================================================

#[tokio::test]
async fn test_reply_flows_into_conversation() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(gemini_reply("Hello"))).await;

    assert_eq!(exchange(&server, "hi").await, "Hello");
}

#[tokio::test]
async fn test_missing_reply_field_shows_placeholder() {
    let server = MockServer::start().await;
    mount(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "promptFeedback": {} })),
    )
    .await;

    assert_eq!(exchange(&server, "hi").await, NO_RESPONSE_PLACEHOLDER);
}

#[tokio::test]
async fn test_updates_for_full_exchange() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(gemini_reply("Sure."))).await;

    let (mut session, mut rx) = session_for(format!("{}{MODEL_PATH}", server.uri()));
    session.submit("Can you help?").await;
    session.settle().await;

    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }

    let user = &session.messages()[0];
    let reply = &session.messages()[1];
    assert_eq!(user.role, MessageRole::User);
    assert_eq!(reply.role, MessageRole::Assistant);

    assert_eq!(
        updates,
        vec![
            SessionUpdate::MessageAppended(user.clone()),
            SessionUpdate::ScrollToLatest { id: user.id.clone() },
            SessionUpdate::Loading { active: true },
            SessionUpdate::MessageAppended(reply.clone()),
            SessionUpdate::ScrollToLatest { id: reply.id.clone() },
            SessionUpdate::Loading { active: false },
        ]
    );
}

#[tokio::test]
async fn test_sequential_exchanges() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_json(gemini_reply("ok"))).await;

    let (mut session, _rx) = session_for(format!("{}{MODEL_PATH}", server.uri()));
    for prompt in ["one", "two", "three"] {
        assert!(session.submit(prompt).await);
        session.settle().await;
    }

    let texts: Vec<_> = session.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "ok", "two", "ok", "three", "ok"]);
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_status_codes_map_to_notices() {
    for (status, notice) in [
        (401, FailureNotice::Authentication),
        (404, FailureNotice::EndpointNotFound),
        (400, FailureNotice::InvalidRequest),
        (500, FailureNotice::Connectivity),
        (503, FailureNotice::Connectivity),
    ] {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(status).set_body_string("error")).await;

        assert_eq!(
            exchange(&server, "hi").await,
            notice.text(),
            "status {status} should map to {notice:?}"
        );
    }
}

#[tokio::test]
async fn test_invalid_json_maps_to_connectivity() {
    let server = MockServer::start().await;
    mount(&server, ResponseTemplate::new(200).set_body_string("not json")).await;

    assert_eq!(exchange(&server, "hi").await, FailureNotice::Connectivity.text());
}

#[tokio::test]
async fn test_unreachable_server_maps_to_connectivity() {
    // Nothing listens on port 9 (discard) on a test machine
    let (mut session, _rx) = session_for("http://127.0.0.1:9/generate".to_string());
    session.submit("hello?").await;
    session.settle().await;

    assert_eq!(
        session.conversation().last().unwrap().text,
        FailureNotice::Connectivity.text()
    );
    assert!(!session.is_loading());
}

#[tokio::test]
async fn test_unreachable_server_with_digit_heavy_key_maps_to_connectivity() {
    let (tx, _rx) = mpsc::channel(100);
    let backend = GeminiBackend::new("http://127.0.0.1:4001/generate", "k404");
    let mut session = ChatSession::new(backend, SessionConfig::silent(), tx);

    session.submit("hello?").await;
    session.settle().await;

    assert_eq!(
        session.conversation().last().unwrap().text,
        FailureNotice::Connectivity.text()
    );
}
