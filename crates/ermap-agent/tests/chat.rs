//! Integration tests for `ChatClient` using wiremock HTTP mocks.

use ermap_agent::{AgentError, ChatClient, ChatMessage, ChatOptions};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ChatClient {
    ChatClient::new(&format!("{base_url}/v1/"), "test-key", "qwen-test", 30)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn complete_returns_message_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen-test",
            "stream": false,
            "enable_thinking": false,
            "max_tokens": 4000,
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "你好"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "距离约5公里"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = test_client(&server.uri())
        .complete(
            &[ChatMessage::system("sys"), ChatMessage::user("你好")],
            &ChatOptions::tool_routing(),
        )
        .await
        .expect("should return content");

    assert_eq!(reply, "距离约5公里");
}

#[tokio::test]
async fn streaming_reply_is_accumulated() {
    let server = MockServer::start().await;

    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"先分析距离\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"## 一、\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"人员车辆分配\"}}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "stream": true,
            "enable_thinking": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let reply = test_client(&server.uri())
        .complete(&[ChatMessage::user("制定方案")], &ChatOptions::planning())
        .await
        .expect("should accumulate stream");

    assert_eq!(reply, "## 一、人员车辆分配");
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete(&[ChatMessage::user("hi")], &ChatOptions::tool_routing())
        .await
        .unwrap_err();

    assert!(
        matches!(err, AgentError::Status { status: 429, ref body, .. } if body == "rate limited"),
        "{err:?}"
    );
}

#[tokio::test]
async fn empty_content_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete(&[ChatMessage::user("hi")], &ChatOptions::tool_routing())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::EmptyCompletion));
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .complete(&[ChatMessage::user("hi")], &ChatOptions::tool_routing())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Deserialize { .. }), "{err:?}");
}
