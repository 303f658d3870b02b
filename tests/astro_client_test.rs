use astrologic::constants::BACKEND_FALLBACK;
use astrologic::{AstroClient, ChatMessage, OracleError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test_log::test(tokio::test)]
async fn test_leading_welcome_message_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/astro/"))
        .and(body_json(json!({
            "currentMessage": "And my moon sign?",
            "history": [
                { "role": "user", "parts": [{ "text": "I was born in August" }] },
                { "role": "model", "parts": [{ "text": "A Leo sun!" }] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Your moon is in Pisces." })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AstroClient::new(server.uri());
    let history = vec![
        ChatMessage::bot("Welcome, seeker."),
        ChatMessage::user("I was born in August"),
        ChatMessage::bot("A Leo sun!"),
    ];

    let reply = client.get_astrology_response("And my moon sign?", &history).await;
    assert_eq!(reply, "Your moon is in Pisces.");
}

#[tokio::test]
async fn test_user_first_history_is_sent_whole() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/astro/"))
        .and(body_json(json!({
            "currentMessage": "Thanks",
            "history": [
                { "role": "user", "parts": [{ "text": "Hi" }] },
                { "role": "model", "parts": [{ "text": "Hello, Scorpio." }] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "Anytime." })))
        .expect(1)
        .mount(&server)
        .await;

    let client = AstroClient::new(server.uri());
    let history = vec![ChatMessage::user("Hi"), ChatMessage::bot("Hello, Scorpio.")];

    assert_eq!(client.get_astrology_response("Thanks", &history).await, "Anytime.");
}

#[tokio::test]
async fn test_error_status_returns_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/astro/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = AstroClient::new(server.uri());
    let reply = client.get_astrology_response("Hello", &[]).await;
    assert_eq!(reply, BACKEND_FALLBACK);
}

#[tokio::test]
async fn test_client_error_status_returns_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/astro/"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let client = AstroClient::new(server.uri());
    assert_eq!(client.get_astrology_response("Hello", &[]).await, BACKEND_FALLBACK);
}

#[tokio::test]
async fn test_unreachable_backend_returns_fallback() {
    // Nothing listens on port 1.
    let uri = "http://127.0.0.1:1".to_string();

    let client = AstroClient::new(uri);
    assert_eq!(client.get_astrology_response("Hello", &[]).await, BACKEND_FALLBACK);
}

#[tokio::test]
async fn test_malformed_body_returns_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/astro/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "wrong field" })))
        .mount(&server)
        .await;

    let client = AstroClient::new(server.uri());
    assert_eq!(client.get_astrology_response("Hello", &[]).await, BACKEND_FALLBACK);
}

#[tokio::test]
async fn test_send_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/astro/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("asleep"))
        .mount(&server)
        .await;

    let client = AstroClient::new(server.uri());
    let err = client.send("Hello", vec![]).await.unwrap_err();
    match err {
        OracleError::Status { status, body } => {
            assert_eq!(status.as_u16(), 503);
            assert_eq!(body, "asleep");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
