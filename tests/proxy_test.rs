//! Router tests against a mock upstream provider.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use hyperspace::{OracleConfig, RetryConfig};
use oracle_proxy::{create_router, ProxyConfig, ProxyState, RateLimitConfig};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE: &str = "/v1beta/models/gemini-3-flash-preview:generateContent";

fn router(upstream: &MockServer, burst: u32) -> Router {
    let config = ProxyConfig {
        upstream: OracleConfig {
            base_url: upstream.uri(),
            api_key: Some("server-key".into()),
            retry: RetryConfig {
                max_retries: 2,
                initial_backoff_ms: 1,
                max_backoff_ms: 5,
            },
            ..Default::default()
        },
        rate_limit: RateLimitConfig {
            burst,
            per_second: 0.001,
            max_clients: 100,
        },
        ..Default::default()
    };
    create_router(Arc::new(ProxyState::new(&config).unwrap()))
}

fn generate_request(client: &str) -> Request<Body> {
    let body = json!({
        "contents": [{ "role": "user", "parts": [{ "text": "gm" }] }],
        "systemInstruction": { "parts": [{ "text": "be brief" }] }
    });
    Request::builder()
        .method("POST")
        .uri(GENERATE)
        .header("content-type", "application/json")
        .header("x-client-id", client)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn from_peer(mut request: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    request
        .extensions_mut()
        .insert(ConnectInfo(SocketAddr::from((ip, 40_000))));
    request
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn upstream_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
}

#[tokio::test]
async fn test_health() {
    let upstream = MockServer::start().await;
    let response = router(&upstream, 1)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_forwards_with_server_key() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .and(query_param("key", "server-key"))
        .respond_with(upstream_reply("gm, traveler"))
        .expect(1)
        .mount(&upstream)
        .await;

    let response = router(&upstream, 5)
        .oneshot(generate_request("neo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["candidates"][0]["content"]["parts"][0]["text"],
        "gm, traveler"
    );
}

#[tokio::test]
async fn test_retries_then_succeeds() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(upstream_reply("third time lucky"))
        .mount(&upstream)
        .await;

    let response = router(&upstream, 5)
        .oneshot(generate_request("neo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&upstream)
        .await;

    let response = router(&upstream, 5)
        .oneshot(generate_request("neo"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "upstream_error");
    assert_eq!(body["upstreamStatus"], 500);
}

#[tokio::test]
async fn test_rate_limit_per_peer() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(upstream_reply("ok"))
        .mount(&upstream)
        .await;

    let app = router(&upstream, 2);
    let neo = [10, 0, 0, 1];
    for _ in 0..2 {
        let r = app
            .clone()
            .oneshot(from_peer(generate_request("neo"), neo))
            .await
            .unwrap();
        assert_eq!(r.status(), StatusCode::OK);
    }
    let r = app
        .clone()
        .oneshot(from_peer(generate_request("neo"), neo))
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(r).await["error"], "rate_limited");

    // other peers have their own bucket
    let r = app
        .clone()
        .oneshot(from_peer(generate_request("trinity"), [10, 0, 0, 2]))
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);

    // health is never throttled
    let r = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(r.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_client_ids_hit_the_limit() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .respond_with(upstream_reply("ok"))
        .mount(&upstream)
        .await;

    let app = router(&upstream, 3);
    let peer = [192, 168, 1, 9];
    let mut statuses = Vec::new();
    for i in 0..6 {
        let r = app
            .clone()
            .oneshot(from_peer(generate_request(&format!("client-{i}")), peer))
            .await
            .unwrap();
        statuses.push(r.status());
    }
    assert_eq!(&statuses[..3], &[StatusCode::OK; 3]);
    assert!(statuses[3..]
        .iter()
        .all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_unknown_method_is_not_found() {
    let upstream = MockServer::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/v1beta/models/gemini-3-flash-preview:countTokens")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"contents":[{"parts":[{"text":"x"}]}]}"#))
        .unwrap();
    let response = router(&upstream, 5).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_key_is_a_config_error() {
    let config = ProxyConfig::default();
    assert!(ProxyState::new(&config).is_err());
}

#[tokio::test]
async fn test_hyperspace_client_through_proxy() {
    use hyperspace::{Oracle, OracleClient};

    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE))
        .and(query_param("key", "server-key"))
        .respond_with(upstream_reply("proxied"))
        .mount(&upstream)
        .await;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(&upstream, 5);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    // the client holds no key
    let client = OracleClient::new(&OracleConfig {
        base_url: format!("http://{addr}"),
        api_key: None,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(client.generate("sys", "hello").await.unwrap(), "proxied");
}
