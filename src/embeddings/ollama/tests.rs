use super::*;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

fn config_for(server: &MockServer, batch_size: u32) -> OllamaConfig {
    let url = Url::parse(&server.uri()).expect("mock uri should parse");
    OllamaConfig {
        protocol: "http".to_string(),
        host: url.host_str().unwrap_or("127.0.0.1").to_string(),
        port: url.port().unwrap_or(80),
        model: "test-model".to_string(),
        batch_size,
    }
}

#[test]
fn client_configuration() {
    let config = OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        model: "test-model".to_string(),
        batch_size: 128,
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model(), "test-model");
    assert_eq!(client.batch_size, 128);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
}

#[test]
fn client_builder_methods() {
    let client = OllamaClient::new(&OllamaConfig::default())
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60))
        .with_retry_attempts(5);

    assert_eq!(client.http.retry_attempts(), 5);
}

#[test]
fn empty_input_makes_no_request() {
    let client = OllamaClient::new(&OllamaConfig::default()).expect("Failed to create client");
    let embeddings = client.embed(&[]).expect("empty input should succeed");
    assert!(embeddings.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn embeds_in_batches() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(serde_json::json!({"input": ["a", "b"]})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"embeddings": [[1.0, 0.0], [0.0, 1.0]]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(serde_json::json!({"input": ["c"]})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"embeddings": [[0.5, 0.5]]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server, 2)).expect("Failed to create client");
    let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let embeddings = tokio::task::spawn_blocking(move || client.embed(&texts))
        .await
        .expect("task should join")
        .expect("embedding should succeed");

    assert_eq!(
        embeddings,
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn count_mismatch_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"embeddings": [[1.0]]})),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server, 16)).expect("Failed to create client");
    let texts = vec!["a".to_string(), "b".to_string()];
    let result = tokio::task::spawn_blocking(move || client.embed(&texts))
        .await
        .expect("task should join");
    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn health_check_requires_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "models": [{"name": "test-model", "size": 1024}]
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(&config_for(&server, 16)).expect("Failed to create client");
    let other = OllamaClient::new(&OllamaConfig {
        model: "missing-model".to_string(),
        ..config_for(&server, 16)
    })
    .expect("Failed to create client");

    let (ok, missing) = tokio::task::spawn_blocking(move || (client.health_check(), other.health_check()))
        .await
        .expect("task should join");
    assert!(ok.is_ok());
    assert!(missing.is_err());
}
