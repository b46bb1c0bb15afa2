//! End-to-end tests for `POST /api/generate` against a mock upstream.

mod common;

use common::{TestApp, TEST_API_KEY};
use imagegen_service::config::{AiConfig, DEFAULT_MODEL};
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn image_reply(url: &str) -> Value {
    json!({
        "id": "gen-1",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": "Here is your image.",
                "images": [{"type": "image_url", "image_url": {"url": url}}]
            }
        }]
    })
}

#[tokio::test]
async fn generate_forwards_composed_payload() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "model": DEFAULT_MODEL,
            "messages": [{"role": "user", "content": "cat\n\nStyle: anime\n\nQuality: 4k"}],
            "modalities": ["image", "text"],
            "image_config": {"aspect_ratio": "16:9"}
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(image_reply("https://cdn.example.com/cat.png")),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let app = TestApp::spawn(&format!("{}/v1", upstream.uri())).await;
    let response = app
        .post_multipart(&[("prompt", "cat"), ("style", "anime"), ("quality", "4k")])
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({"imageUrl": "https://cdn.example.com/cat.png"}));
}

#[tokio::test]
async fn generate_uses_configured_endpoint_verbatim() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_reply("abc123")))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = TestApp::spawn(&format!("{}/api/v1/chat/completions", upstream.uri())).await;
    let response = app.post_form(&[("prompt", "cat"), ("aspect", "1:1")]).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["imageUrl"], "data:image/png;base64,abc123");

    let requests = upstream.received_requests().await.expect("Recording enabled");
    let sent: Value = serde_json::from_slice(&requests[0].body).expect("JSON payload");
    assert_eq!(sent["image_config"]["aspect_ratio"], "1:1");
    assert_eq!(sent["messages"][0]["content"], "cat");
}

#[tokio::test]
async fn generate_with_empty_form_sends_placeholder() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_reply("abc123")))
        .expect(1)
        .mount(&upstream)
        .await;

    let app = TestApp::spawn(&format!("{}/", upstream.uri())).await;
    let response = app.post_form(&[]).await;

    assert_eq!(response.status().as_u16(), 200);
    let requests = upstream.received_requests().await.expect("Recording enabled");
    let sent: Value = serde_json::from_slice(&requests[0].body).expect("JSON payload");
    assert_eq!(sent["messages"][0]["content"], "Generate an image.");
}

#[tokio::test]
async fn generate_passes_upstream_status_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202).set_body_json(image_reply("http://img/x.png")))
        .mount(&upstream)
        .await;

    let app = TestApp::spawn(&upstream.uri()).await;
    let response = app.post_form(&[("prompt", "cat")]).await;

    assert_eq!(response.status().as_u16(), 202);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["imageUrl"], "http://img/x.png");
}

#[tokio::test]
async fn generate_without_configuration_makes_no_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_reply("abc123")))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = TestApp::spawn_with(AiConfig {
        base_url: Some(upstream.uri()),
        api_key: None,
        model: DEFAULT_MODEL.to_string(),
    })
    .await;
    let response = app.post_form(&[("prompt", "cat")]).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "AI_BASE_URL or AI_API_KEY not configured");

    let app = TestApp::spawn_with(AiConfig {
        base_url: None,
        api_key: Some(SecretString::new(TEST_API_KEY.to_string())),
        model: DEFAULT_MODEL.to_string(),
    })
    .await;
    let response = app.post_form(&[("prompt", "cat")]).await;
    assert_eq!(response.status().as_u16(), 500);
}

#[tokio::test]
async fn generate_reports_non_json_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(503).set_body_raw("<h1>Service Unavailable</h1>", "text/html"),
        )
        .mount(&upstream)
        .await;

    let app = TestApp::spawn(&upstream.uri()).await;
    let response = app.post_form(&[("prompt", "cat")]).await;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Upstream returned non-JSON");
    assert_eq!(body["raw"], "<h1>Service Unavailable</h1>");
}

#[tokio::test]
async fn generate_reports_missing_image() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&upstream)
        .await;

    let app = TestApp::spawn(&upstream.uri()).await;
    let response = app.post_form(&[("prompt", "cat")]).await;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "No image returned from AI backend");
    assert_eq!(body["raw"], json!({"choices": []}));
}

#[tokio::test]
async fn generate_reports_unreachable_upstream() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Local addr").port();
    drop(listener);

    let app = TestApp::spawn(&format!("http://127.0.0.1:{}/v1", port)).await;
    let response = app.post_form(&[("prompt", "cat")]).await;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({"error": "Upstream request failed"}));
}

#[tokio::test]
async fn generate_reports_unparseable_json_as_transport_failure() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
        .mount(&upstream)
        .await;

    let app = TestApp::spawn(&upstream.uri()).await;
    let response = app.post_form(&[("prompt", "cat")]).await;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Upstream request failed");
}
