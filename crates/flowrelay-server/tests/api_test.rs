//! Integration test: start the proxy against a recording fake upstream and
//! verify the relay and error-envelope contract for every route.

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use flowrelay_core::UpstreamConfig;
use flowrelay_server::state::AppState;

// ─── Fake upstream ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    path: String,
    query: Option<String>,
    api_key: Option<String>,
    body: Bytes,
}

#[derive(Clone)]
struct FakeUpstream {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeUpstream {
    fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(upstream): State<FakeUpstream>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    upstream.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(|q| q.to_string()),
        api_key: headers
            .get("x-n8n-api-key")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string()),
        body,
    });
    (
        upstream.status,
        [("content-type", "application/json")],
        upstream.body,
    )
}

/// Start a fake upstream answering every request with `status` and `body`.
async fn spawn_upstream(status: StatusCode, body: &'static str) -> (String, FakeUpstream) {
    let upstream = FakeUpstream {
        status,
        body,
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = axum::Router::new()
        .fallback(record)
        .layer(DefaultBodyLimit::disable())
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), upstream)
}

// ─── Proxy under test ────────────────────────────────────────────────────────

fn proxy_state(upstream_url: &str) -> AppState {
    flowrelay_server::create_app_state(UpstreamConfig::new(upstream_url, "test-key")).unwrap()
}

async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_proxy(upstream_url: &str) -> String {
    serve(flowrelay_server::build_router(proxy_state(upstream_url))).await
}

/// (local method, local path, local body, upstream method, upstream path)
const PROXIED_ROUTES: &[(&str, &str, Option<&str>, &str, &str)] = &[
    ("GET", "/workflows", None, "GET", "/api/v1/workflows"),
    ("GET", "/workflows/42", None, "GET", "/api/v1/workflows/42"),
    (
        "POST",
        "/workflows",
        Some(r#"{"name":"flow","nodes":[],"connections":{}}"#),
        "POST",
        "/api/v1/workflows",
    ),
    (
        "PUT",
        "/workflows/42",
        Some(r#"{"name":"renamed","nodes":[],"connections":{}}"#),
        "PUT",
        "/api/v1/workflows/42",
    ),
    ("PATCH", "/workflows/42", Some(r#"{"active":true}"#), "PATCH", "/api/v1/workflows/42"),
    ("DELETE", "/workflows/42", None, "DELETE", "/api/v1/workflows/42"),
    (
        "POST",
        "/workflows/42/execute",
        Some(r#"{"foo":1}"#),
        "POST",
        "/api/v1/workflows/42/execute",
    ),
    ("GET", "/executions/e-7", None, "GET", "/api/v1/executions/e-7"),
    ("GET", "/executions", None, "GET", "/api/v1/executions"),
];

/// (local method, local path, upstream path) for ids carrying reserved
/// characters; each id must reach upstream as exactly one path segment.
const ENCODED_ID_ROUTES: &[(&str, &str, &str)] = &[
    ("GET", "/workflows/x%3Factive%3Dtrue", "/api/v1/workflows/x%3Factive=true"),
    (
        "GET",
        "/workflows/..%2F..%2Fexecutions",
        "/api/v1/workflows/..%2F..%2Fexecutions",
    ),
    ("DELETE", "/workflows/a%2Fb", "/api/v1/workflows/a%2Fb"),
    ("POST", "/workflows/a%2Fb/execute", "/api/v1/workflows/a%2Fb/execute"),
    ("GET", "/executions/a%2Fb", "/api/v1/executions/a%2Fb"),
    ("GET", "/executions/50%25", "/api/v1/executions/50%25"),
];

/// (local method, local path, local body) whose ids are not valid UTF-8.
const INVALID_ID_ROUTES: &[(&str, &str, Option<&str>)] = &[
    ("GET", "/workflows/%FF", None),
    ("PUT", "/workflows/%FF", Some(r#"{"name":"x"}"#)),
    ("PATCH", "/workflows/%FF", Some(r#"{"active":true}"#)),
    ("DELETE", "/workflows/%FF", None),
    ("POST", "/workflows/%FF/execute", Some(r#"{"foo":1}"#)),
    ("GET", "/executions/%FF", None),
];

async fn call(
    client: &reqwest::Client,
    base_url: &str,
    method: &str,
    path: &str,
    body: Option<&str>,
) -> reqwest::Response {
    let method = reqwest::Method::from_bytes(method.as_bytes()).unwrap();
    let mut request = client.request(method, format!("{}{}", base_url, path));
    if let Some(body) = body {
        request = request
            .header("content-type", "application/json")
            .body(body.to_string());
    }
    request.send().await.unwrap()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_every_route_relays_upstream_body_verbatim() {
    let upstream_body = r#"{"data":[{"id":"42","name":"flow","active":true}],"nextCursor":null}"#;
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, upstream_body).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    for (method, path, body, up_method, up_path) in PROXIED_ROUTES {
        let resp = call(&client, &base_url, method, path, *body).await;
        assert_eq!(resp.status(), 200, "{} {}", method, path);
        assert_eq!(resp.text().await.unwrap(), upstream_body, "{} {}", method, path);

        let last = upstream.recorded().last().cloned().unwrap();
        assert_eq!(last.method, *up_method);
        assert_eq!(last.path, *up_path);
        assert_eq!(last.api_key.as_deref(), Some("test-key"));
    }

    assert_eq!(upstream.recorded().len(), PROXIED_ROUTES.len());
}

#[tokio::test]
async fn test_every_route_wraps_upstream_failure() {
    let (upstream_url, _upstream) =
        spawn_upstream(StatusCode::NOT_FOUND, r#"{"message":"Not Found"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    for (method, path, body, _, _) in PROXIED_ROUTES {
        let resp = call(&client, &base_url, method, path, *body).await;
        assert_eq!(resp.status(), 500, "{} {}", method, path);

        let envelope: serde_json::Value = resp.json().await.unwrap();
        assert!(!envelope["error"].as_str().unwrap().is_empty());
        assert_eq!(envelope["details"], serde_json::json!({"message": "Not Found"}));
    }
}

#[tokio::test]
async fn test_upstream_5xx_uses_same_envelope() {
    let (upstream_url, _upstream) =
        spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, "maintenance").await;
    let base_url = spawn_proxy(&upstream_url).await;

    let resp = reqwest::get(format!("{}/workflows", base_url)).await.unwrap();
    assert_eq!(resp.status(), 500);
    let envelope: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        envelope["error"],
        "Upstream request failed with status code 503"
    );
    assert_eq!(envelope["details"], "maintenance");
}

#[tokio::test]
async fn test_unreachable_upstream_yields_500_without_details() {
    // Nothing listens on port 1.
    let base_url = spawn_proxy("http://127.0.0.1:1").await;
    let client = reqwest::Client::new();

    for (method, path, body, _, _) in PROXIED_ROUTES {
        let resp = call(&client, &base_url, method, path, *body).await;
        assert_eq!(resp.status(), 500, "{} {}", method, path);

        let envelope: serde_json::Value = resp.json().await.unwrap();
        assert!(!envelope["error"].as_str().unwrap().is_empty());
        assert!(envelope.get("details").is_none());
    }
}

#[tokio::test]
async fn test_list_executions_filter_forwarding() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"data":[]}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;

    let resp = reqwest::get(format!("{}/executions", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(upstream.recorded()[0].query, None);

    let resp = reqwest::get(format!("{}/executions?workflowId=abc", base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(upstream.recorded()[1].query.as_deref(), Some("workflowId=abc"));

    let resp = reqwest::get(format!("{}/executions?workflowId=abc&status=error&limit=5", base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        upstream.recorded()[2].query.as_deref(),
        Some("workflowId=abc&status=error&limit=5")
    );
}

#[tokio::test]
async fn test_invalid_execution_limit_is_bad_request() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"data":[]}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;

    let resp = reqwest::get(format!("{}/executions?limit=many", base_url))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let envelope: serde_json::Value = resp.json().await.unwrap();
    assert!(!envelope["error"].as_str().unwrap().is_empty());
    assert!(upstream.recorded().is_empty());
}

#[tokio::test]
async fn test_execute_forwards_input_exactly() {
    let (upstream_url, upstream) =
        spawn_upstream(StatusCode::OK, r#"{"executionId":"e-1"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    let resp = call(&client, &base_url, "POST", "/workflows/123/execute", Some(r#"{"foo":1}"#)).await;
    assert_eq!(resp.status(), 200);

    let recorded = upstream.recorded();
    assert_eq!(recorded[0].path, "/api/v1/workflows/123/execute");
    assert_eq!(&recorded[0].body[..], br#"{"foo":1}"#);

    // Without a body nothing is forwarded either.
    let resp = call(&client, &base_url, "POST", "/workflows/123/execute", None).await;
    assert_eq!(resp.status(), 200);
    assert!(upstream.recorded()[1].body.is_empty());
}

#[tokio::test]
async fn test_toggle_requires_boolean_active() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"id":"1"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    let resp = call(&client, &base_url, "PATCH", "/workflows/1", Some(r#"{"active":"yes"}"#)).await;
    assert_eq!(resp.status(), 400);
    let envelope: serde_json::Value = resp.json().await.unwrap();
    assert!(envelope["error"].as_str().unwrap().starts_with("Bad request"));

    let resp = call(&client, &base_url, "PATCH", "/workflows/1", None).await;
    assert_eq!(resp.status(), 400);

    assert!(upstream.recorded().is_empty());

    let resp = call(&client, &base_url, "PATCH", "/workflows/1", Some(r#"{"active":false}"#)).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(&upstream.recorded()[0].body[..], br#"{"active":false}"#);
}

#[tokio::test]
async fn test_malformed_json_body_is_bad_request() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"id":"1"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    let resp = call(&client, &base_url, "POST", "/workflows", Some("{oops")).await;
    assert_eq!(resp.status(), 400);
    assert!(upstream.recorded().is_empty());
}

#[tokio::test]
async fn test_create_without_body_forwards_empty_object() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"id":"1"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    let resp = call(&client, &base_url, "POST", "/workflows", None).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(&upstream.recorded()[0].body[..], b"{}");
}

#[tokio::test]
async fn test_health_and_info_ignore_upstream_state() {
    let base_url = spawn_proxy("http://127.0.0.1:1").await;

    let resp = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    let resp = reqwest::get(format!("{}/", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["endpoints"]["listWorkflows"].is_string());
    assert!(body["endpoints"]["executeWorkflow"].is_string());
}

#[tokio::test]
async fn test_panicking_handler_yields_error_envelope() {
    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    let routes = flowrelay_server::api::api_router().route("/boom", axum::routing::get(boom));
    let app = flowrelay_server::with_middleware(routes, proxy_state("http://127.0.0.1:1"));
    let base_url = serve(app).await;

    let resp = reqwest::get(format!("{}/boom", base_url)).await.unwrap();
    assert_eq!(resp.status(), 500);
    let envelope: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        envelope["error"],
        "Internal error: unexpected failure while handling request"
    );

    // The server keeps serving after the panic.
    let resp = reqwest::get(format!("{}/health", base_url)).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_ids_reach_upstream_as_single_segments() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"id":"x"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    for (i, (method, path, up_path)) in ENCODED_ID_ROUTES.iter().enumerate() {
        let resp = call(&client, &base_url, method, path, None).await;
        assert_eq!(resp.status(), 200, "{} {}", method, path);

        let recorded = &upstream.recorded()[i];
        assert_eq!(recorded.path, *up_path, "{} {}", method, path);
        assert_eq!(recorded.query, None, "{} {}", method, path);
    }
}

#[tokio::test]
async fn test_invalid_utf8_id_gets_error_envelope() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"id":"x"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();

    for (method, path, body) in INVALID_ID_ROUTES {
        let resp = call(&client, &base_url, method, path, *body).await;
        assert_eq!(resp.status(), 400, "{} {}", method, path);
        assert_eq!(
            resp.headers()["content-type"],
            "application/json",
            "{} {}",
            method,
            path
        );

        let envelope: serde_json::Value = resp.json().await.unwrap();
        assert!(envelope["error"].as_str().unwrap().starts_with("Bad request"));
    }

    assert!(upstream.recorded().is_empty());
}

#[tokio::test]
async fn test_oversized_body_gets_error_envelope() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"id":"1"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;
    let client = reqwest::Client::new();
    let oversized = vec![b' '; flowrelay_server::BODY_LIMIT + 1];

    for path in ["/workflows", "/workflows/1/execute"] {
        let resp = client
            .post(format!("{}{}", base_url, path))
            .header("content-type", "application/json")
            .body(oversized.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 413, "POST {}", path);

        let envelope: serde_json::Value = resp.json().await.unwrap();
        assert!(envelope["error"]
            .as_str()
            .unwrap()
            .starts_with("Payload too large"));
    }

    assert!(upstream.recorded().is_empty());
}

#[tokio::test]
async fn test_large_workflow_definition_is_accepted() {
    let (upstream_url, upstream) = spawn_upstream(StatusCode::OK, r#"{"id":"1"}"#).await;
    let base_url = spawn_proxy(&upstream_url).await;

    // Above axum's 2 MiB default, below the proxy's own limit.
    let definition = serde_json::json!({
        "name": "big",
        "nodes": [],
        "pinData": "x".repeat(3 * 1024 * 1024),
    });
    let resp = reqwest::Client::new()
        .post(format!("{}/workflows", base_url))
        .json(&definition)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(upstream.recorded().len(), 1);
}
