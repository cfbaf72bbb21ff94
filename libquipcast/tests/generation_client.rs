//! Chat-completion client tests against a local mock server

use libquipcast::config::{GenerationConfig, HttpConfig};
use libquipcast::error::{GenerationError, QuipcastError, RequestError};
use libquipcast::generation::prompt::{BASE_REQUEST, HISTORY_HEADER, SYSTEM_PROMPT};
use libquipcast::generation::{Backend, ChatCompletionClient, Generator};
use libquipcast::types::HistoryItem;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

fn client_for(server: &MockServer) -> ChatCompletionClient {
    let config = GenerationConfig {
        api_key: "test-key".to_string().into(),
        backend: String::new(),
        endpoint: Some(format!("{}{}", server.uri(), COMPLETIONS_PATH)),
        max_tokens: 100,
    };
    ChatCompletionClient::new(config, &HttpConfig::default()).unwrap()
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

async fn mount_completion(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn sent_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "exactly one backend call per generation");
    serde_json::from_slice(&requests[0].body).unwrap()
}

#[tokio::test]
async fn test_request_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello devs")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client.generate(Backend::OpenAi, &[]).await.unwrap();
    assert_eq!(text.as_str(), "hello devs");

    let body = sent_body(&server).await;
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["max_tokens"], 100);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], SYSTEM_PROMPT);
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], BASE_REQUEST);
}

#[tokio::test]
async fn test_history_is_embedded_in_user_message() {
    let server = MockServer::start().await;
    mount_completion(&server, completion("new one")).await;

    let history = vec![
        HistoryItem {
            id: "2".to_string(),
            text: "old joke A".to_string(),
        },
        HistoryItem {
            id: "1".to_string(),
            text: "old joke B".to_string(),
        },
    ];
    client_for(&server)
        .generate(Backend::Groq, &history)
        .await
        .unwrap();

    let body = sent_body(&server).await;
    let user = body["messages"][1]["content"].as_str().unwrap();
    assert!(user.contains(HISTORY_HEADER));
    assert!(user.contains("1. old joke A\n2. old joke B\n"));
    assert_eq!(body["model"], "llama-3.3-70b-versatile");
}

#[tokio::test]
async fn test_first_choice_is_normalized() {
    let server = MockServer::start().await;
    mount_completion(
        &server,
        json!({
            "choices": [
                {"message": {"role": "assistant", "content": " \"fresh bit\" "}},
                {"message": {"role": "assistant", "content": "second choice"}}
            ]
        }),
    )
    .await;

    let text = client_for(&server).generate(Backend::Groq, &[]).await.unwrap();
    assert_eq!(text.as_str(), "fresh bit");
}

#[tokio::test]
async fn test_zero_choices_is_generation_error() {
    let server = MockServer::start().await;
    mount_completion(&server, json!({"choices": []})).await;

    let err = client_for(&server)
        .generate(Backend::Groq, &[])
        .await
        .unwrap_err();

    match err {
        QuipcastError::Generation(GenerationError::NoChoices { backend }) => {
            assert_eq!(backend, "groq");
        }
        other => panic!("Expected no-choices error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_blank_content_is_generation_error() {
    let server = MockServer::start().await;
    mount_completion(&server, completion("  \"\"  ")).await;

    let err = client_for(&server)
        .generate(Backend::Groq, &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QuipcastError::Generation(GenerationError::EmptyText)
    ));
}

#[tokio::test]
async fn test_null_content_is_generation_error() {
    let server = MockServer::start().await;
    mount_completion(
        &server,
        json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
    )
    .await;

    let err = client_for(&server)
        .generate(Backend::Groq, &[])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QuipcastError::Generation(GenerationError::EmptyText)
    ));
}

#[tokio::test]
async fn test_non_200_is_generation_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"error":{"message":"Invalid API Key"}}"#),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate(Backend::Groq, &[])
        .await
        .unwrap_err();

    match err {
        QuipcastError::Generation(GenerationError::Request(RequestError::Status {
            status,
            body,
            ..
        })) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API Key"));
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_endpoint_resolution() {
    let server = MockServer::start().await;
    let overridden = client_for(&server);
    assert_eq!(
        overridden.endpoint_for(Backend::OpenAi),
        format!("{}{}", server.uri(), COMPLETIONS_PATH)
    );

    let config = GenerationConfig {
        api_key: "k".to_string().into(),
        backend: "openai".to_string(),
        endpoint: None,
        max_tokens: 100,
    };
    let direct = ChatCompletionClient::new(config, &HttpConfig::default()).unwrap();
    assert_eq!(direct.endpoint_for(Backend::OpenAi), Backend::OpenAi.endpoint());
    assert_eq!(direct.endpoint_for(Backend::Groq), Backend::Groq.endpoint());
}
