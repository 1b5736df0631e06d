use super::*;

#[test]
fn backoff_doubles_per_attempt() {
    let base = Duration::from_millis(100);
    assert_eq!(backoff_delay(base, 1), Duration::from_millis(100));
    assert_eq!(backoff_delay(base, 2), Duration::from_millis(200));
    assert_eq!(backoff_delay(base, 3), Duration::from_millis(400));
}

#[test]
fn builder_methods() {
    let client = HttpClient::default()
        .with_timeout(Duration::from_secs(5))
        .with_retry_attempts(5)
        .with_retry_delay(Duration::from_millis(1));
    assert_eq!(client.retry_attempts(), 5);
    assert_eq!(client.retry_delay, Duration::from_millis(1));

    let client = HttpClient::default().with_retry_attempts(0);
    assert_eq!(client.retry_attempts(), 1);
}

#[test]
fn redact_masks_secret_params() {
    let url = Url::parse("https://serpapi.com/search.json?engine=google_maps&api_key=secret&q=cafe")
        .expect("url should parse");
    let redacted = redact(&url);
    assert!(!redacted.contains("secret"));
    assert!(redacted.contains("engine=google_maps"));
    assert!(redacted.contains("q=cafe"));

    let url = Url::parse("https://maps.googleapis.com/maps/api/geocode/json?address=x&key=abc")
        .expect("url should parse");
    assert!(!redact(&url).contains("abc"));
}

#[test]
fn redact_leaves_plain_urls_alone() {
    let url = Url::parse("http://localhost:11434/api/embed").expect("url should parse");
    assert_eq!(redact(&url), "http://localhost:11434/api/embed");
}

mod integration_tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    fn fast_client() -> HttpClient {
        HttpClient::default()
            .with_retry_attempts(3)
            .with_retry_delay(Duration::from_millis(1))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/flaky", server.uri())).expect("url should parse");
        let body = tokio::task::spawn_blocking(move || fast_client().get_text(&url))
            .await
            .expect("task should join")
            .expect("third attempt should succeed");
        assert_eq!(body, "ok");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/missing", server.uri())).expect("url should parse");
        let result = tokio::task::spawn_blocking(move || fast_client().get_text(&url))
            .await
            .expect("task should join");
        assert!(result.is_err());
    }
}
