//! Integration tests for the chat turn pipeline
//!
//! Runs full turns against a mocked Gemini HTTP endpoint to verify the
//! wire format, persistence ordering, titling, and failure behavior.

use gemchat::config::GeminiConfig;
use gemchat::provider::GeminiProvider;
use gemchat::store::{ChatStore, Role, DEFAULT_SESSION_TITLE};
use gemchat::turn::run_turn;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn new_store() -> (ChatStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store =
        ChatStore::new_with_path(temp_dir.path().join("chat.db")).expect("Failed to create store");
    (store, temp_dir)
}

fn provider_for(server_uri: &str) -> GeminiProvider {
    let config = GeminiConfig {
        model: "gemini-2.0-flash".to_string(),
        api_base: server_uri.to_string(),
    };
    GeminiProvider::new(config, Some("test-key".to_string())).expect("provider")
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{"text": text}]
            }
        }]
    }))
}

#[tokio::test]
async fn test_first_turn_replies_and_titles_session() {
    let server = MockServer::start().await;
    let endpoint = "/v1beta/models/gemini-2.0-flash:generateContent";

    // Title request is distinguishable by its prompt template; mount it first.
    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(body_string_contains("Summarize this into 2 words"))
        .respond_with(text_response("\"Rust Ownership\""))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(text_response("Ownership moves values between bindings."))
        .expect(1)
        .mount(&server)
        .await;

    let (store, _dir) = new_store();
    store.create_session("s1", DEFAULT_SESSION_TITLE);

    let provider = provider_for(&server.uri());
    let outcome = run_turn(&store, &provider, "s1", "Explain ownership").await;

    assert_eq!(
        outcome.assistant.content,
        "Ownership moves values between bindings."
    );
    assert_eq!(outcome.new_title.as_deref(), Some("Rust Ownership"));

    let history = store.session_history("s1");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "Explain ownership");
    assert_eq!(history[1].role, Role::Assistant);

    assert_eq!(store.all_sessions()[0].title, "Rust Ownership");
}

#[tokio::test]
async fn test_second_turn_sends_full_transcript_without_title_call() {
    let server = MockServer::start().await;
    let endpoint = "/v1beta/models/gemini-2.0-flash:generateContent";

    // The transcript must carry the earlier turns with the model role on
    // the wire, plus the new prompt. Exactly one request total.
    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(body_string_contains("earlier question"))
        .and(body_string_contains("earlier answer"))
        .and(body_string_contains("\"model\""))
        .and(body_string_contains("follow-up"))
        .respond_with(text_response("A follow-up answer."))
        .expect(1)
        .mount(&server)
        .await;

    let (store, _dir) = new_store();
    store.create_session("s1", "Existing Title");
    store.add_message("s1", Role::User, "earlier question");
    store.add_message("s1", Role::Assistant, "earlier answer");

    let provider = provider_for(&server.uri());
    let outcome = run_turn(&store, &provider, "s1", "follow-up").await;

    assert_eq!(outcome.assistant.content, "A follow-up answer.");
    assert!(outcome.new_title.is_none());
    assert_eq!(store.all_sessions()[0].title, "Existing Title");
    assert_eq!(store.session_history("s1").len(), 4);
}

#[tokio::test]
async fn test_api_auth_failure_is_persisted_as_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "API key not valid"}
        })))
        .mount(&server)
        .await;

    let (store, _dir) = new_store();
    store.create_session("s1", "T");
    store.add_message("s1", Role::User, "earlier");
    store.add_message("s1", Role::Assistant, "reply");

    let provider = provider_for(&server.uri());
    let outcome = run_turn(&store, &provider, "s1", "Hello?").await;

    assert!(outcome.assistant.content.starts_with("Error:"));
    assert!(outcome.assistant.content.contains("API key not valid"));

    let history = store.session_history("s1");
    assert_eq!(history.len(), 4);
    assert!(history[3].content.starts_with("Error:"));
}

#[tokio::test]
async fn test_network_failure_keeps_session_usable() {
    // Nothing listens here; the request fails at connect time.
    let provider = provider_for("http://127.0.0.1:1");

    let (store, _dir) = new_store();
    store.create_session("s1", "T");
    store.add_message("s1", Role::User, "earlier");
    store.add_message("s1", Role::Assistant, "reply");

    let outcome = run_turn(&store, &provider, "s1", "Are you there?").await;
    assert!(outcome.assistant.content.starts_with("Error:"));

    // A later turn against a working endpoint still lands in the same session.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("Back online."))
        .mount(&server)
        .await;

    let provider = provider_for(&server.uri());
    let outcome = run_turn(&store, &provider, "s1", "And now?").await;
    assert_eq!(outcome.assistant.content, "Back online.");
    assert_eq!(store.session_history("s1").len(), 6);
}

#[tokio::test]
async fn test_duplicate_prompt_not_doubled_on_wire() {
    let server = MockServer::start().await;

    // The stored history already ends with "Hi"; the request body must
    // contain it exactly once.
    Mock::given(method("POST"))
        .respond_with(text_response("Hello again."))
        .expect(1)
        .mount(&server)
        .await;

    let (store, _dir) = new_store();
    store.create_session("s1", "T");
    store.add_message("s1", Role::User, "Hi");

    let provider = provider_for(&server.uri());
    run_turn(&store, &provider, "s1", "Hi").await;

    let requests = server.received_requests().await.expect("requests");
    let sent = requests
        .iter()
        .find(|r| {
            String::from_utf8_lossy(&r.body).contains("\"contents\"")
        })
        .expect("generate request");
    let body = String::from_utf8_lossy(&sent.body);
    assert_eq!(body.matches("\"Hi\"").count(), 1);

    // The exchange is still persisted as a fresh pair.
    assert_eq!(store.session_history("s1").len(), 3);
}
