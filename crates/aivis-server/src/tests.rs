use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aivis_core::{FetchError, FetchedResource, PageFetcher};
use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

use crate::checkout::{PaymentLinkCheckout, SandboxCheckout};
use crate::{AppState, app};

const PAGE: &str = r#"
    <html><head>
        <title>Example</title>
        <meta name="description" content="An example">
        <link rel="canonical" href="https://example.com/">
        <script type="application/ld+json">{"@type": "WebSite"}</script>
        <meta name="robots" content="noindex">
    </head><body><img src="a.png"></body></html>
"#;

/// Serves canned pages by path and counts requests.
#[derive(Default)]
struct StubFetcher {
    pages: HashMap<String, (u16, String)>,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn page(mut self, path: &str, status: u16, body: &str) -> Self {
        self.pages
            .insert(path.to_string(), (status, body.to_string()));
        self
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (status, body) = self
            .pages
            .get(url.path())
            .cloned()
            .ok_or_else(|| FetchError::Request("connection refused".to_string()))?;
        let mut headers = HashMap::new();
        if url.path() == "/" {
            headers.insert("x-robots-tag".to_string(), "noindex".to_string());
        }
        Ok(FetchedResource {
            final_url: url.to_string(),
            status,
            headers,
            body,
        })
    }
}

/// Fetcher whose every request crashes.
struct CrashingFetcher;

#[async_trait]
impl PageFetcher for CrashingFetcher {
    async fn fetch(&self, _url: &Url) -> Result<FetchedResource, FetchError> {
        panic!("html parser crashed");
    }
}

fn state_with(fetcher: Arc<StubFetcher>) -> AppState {
    AppState::new(fetcher, Arc::new(SandboxCheckout), Duration::from_secs(2))
}

fn scenario_fetcher() -> Arc<StubFetcher> {
    Arc::new(StubFetcher::default().page("/", 404, PAGE))
}

async fn send(state: AppState, request: Request<Body>) -> Response {
    app(state).oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn text_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let response = send(state_with(scenario_fetcher()), get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn index_serves_the_ui() {
    let response = send(state_with(scenario_fetcher()), get("/")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = text_body(response).await;
    assert!(html.contains("AI Visibility Checker"));
    assert!(html.contains(env!("CARGO_PKG_VERSION")));
    assert!(!html.contains("${version}"));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let response = send(state_with(scenario_fetcher()), get("/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quick_check_returns_subset_with_full_score() {
    let fetcher = scenario_fetcher();
    let response = send(
        state_with(fetcher.clone()),
        post_json("/api/check", json!({ "url": "example.com", "mode": "quick" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["url"], "https://example.com/");
    assert_eq!(body["mode"], "quick");
    assert_eq!(body["score"], 32);
    assert_eq!(body["interpretation"], "Low");
    assert_eq!(body["total_checks"], 15);

    let keys: Vec<&str> = body["checks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|check| check["key"].as_str().unwrap())
        .collect();
    assert_eq!(
        keys,
        vec!["robots_txt", "sitemap_xml", "canonical", "title", "meta_description"]
    );
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn full_check_via_get_shares_the_score() {
    let response = send(
        state_with(scenario_fetcher()),
        get("/api/check?url=https%3A%2F%2Fexample.com%2F&mode=pro"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["mode"], "full");
    assert_eq!(body["score"], 32);
    assert_eq!(body["checks"].as_array().unwrap().len(), 15);
    assert_eq!(body["checks"][14]["key"], "http_status");
}

#[tokio::test]
async fn mode_defaults_to_quick() {
    let response = send(
        state_with(scenario_fetcher()),
        post_json("/api/check", json!({ "url": "example.com" })),
    )
    .await;
    let body = json_body(response).await;
    assert_eq!(body["mode"], "quick");
    assert_eq!(body["checks"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn malformed_url_is_rejected_without_fetching() {
    let fetcher = scenario_fetcher();
    let response = send(
        state_with(fetcher.clone()),
        post_json("/api/check", json!({ "url": "not a url", "mode": "quick" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "invalid url");
    assert!(body["detail"].as_str().unwrap().contains("not a url"));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_url_and_unknown_mode_have_distinct_errors() {
    let fetcher = scenario_fetcher();

    let response = send(
        state_with(fetcher.clone()),
        post_json("/api/check", json!({ "mode": "quick" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "missing url");

    let response = send(
        state_with(fetcher.clone()),
        post_json("/api/check", json!({ "url": "example.com", "mode": "gold" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid mode");

    let response = send(
        state_with(fetcher.clone()),
        post_json("/api/check", json!({ "url": "ftp://example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid url");

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/check")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(state_with(scenario_fetcher()), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "invalid request body");
}

#[tokio::test]
async fn unreachable_site_still_gets_a_report() {
    let fetcher = Arc::new(StubFetcher::default());
    let response = send(
        state_with(fetcher),
        post_json("/api/check", json!({ "url": "example.com", "mode": "full" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let checks = body["checks"].as_array().unwrap();
    assert_eq!(checks.len(), 15);
    assert!(checks.iter().all(|check| check["passed"] == false));
    assert_eq!(body["score"], 0);
}

#[tokio::test]
async fn sandbox_pay_redirects_to_success() {
    let response = send(
        state_with(scenario_fetcher()),
        post_json(
            "/api/pay",
            json!({ "mode": "full", "url": "example.com", "email": "owner@example.com" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let session_url = body["session_url"].as_str().unwrap();
    assert!(session_url.starts_with("/success?mode=full"));
}

#[tokio::test]
async fn payment_link_pay_prefills_details() {
    let checkout = PaymentLinkCheckout::new(Url::parse("https://buy.example.com/link").unwrap());
    let state = AppState::new(scenario_fetcher(), Arc::new(checkout), Duration::from_secs(2));
    let response = send(
        state,
        post_json(
            "/api/pay",
            json!({ "mode": "quick", "url": "example.com", "email": "owner@example.com" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let session_url = Url::parse(body["session_url"].as_str().unwrap()).unwrap();
    assert_eq!(session_url.host_str(), Some("buy.example.com"));
    let pairs: HashMap<String, String> = session_url.query_pairs().into_owned().collect();
    assert_eq!(pairs["mode"], "quick");
    assert_eq!(pairs["url"], "https://example.com/");
    assert_eq!(pairs["prefilled_email"], "owner@example.com");
}

#[tokio::test]
async fn full_pay_requires_a_plausible_email() {
    for payload in [
        json!({ "mode": "full", "url": "example.com" }),
        json!({ "mode": "full", "url": "example.com", "email": "nobody" }),
    ] {
        let response = send(state_with(scenario_fetcher()), post_json("/api/pay", payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "invalid email");
    }

    let response = send(
        state_with(scenario_fetcher()),
        post_json("/api/pay", json!({ "mode": "quick", "url": "example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn pay_validates_url() {
    let response = send(
        state_with(scenario_fetcher()),
        post_json("/api/pay", json!({ "mode": "quick", "url": "" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "missing url");
}

#[tokio::test]
async fn session_stub() {
    let response = send(
        state_with(scenario_fetcher()),
        post_json("/api/session", json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "ok": true, "session": null })
    );
}

#[tokio::test]
async fn success_page_names_the_product() {
    let response = send(state_with(scenario_fetcher()), get("/success?mode=full")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = text_body(response).await;
    assert!(html.contains("Payment successful"));
    assert!(html.contains("Business Pro Audit"));

    let response = send(state_with(scenario_fetcher()), get("/success")).await;
    assert!(text_body(response).await.contains("Quick Check"));
}

#[tokio::test]
async fn crash_during_analysis_is_a_generic_500() {
    let state = AppState::new(
        Arc::new(CrashingFetcher),
        Arc::new(SandboxCheckout),
        Duration::from_secs(2),
    );
    let response = send(
        state,
        post_json("/api/check", json!({ "url": "example.com", "mode": "quick" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await, json!({ "error": "analysis failed" }));
}

#[test]
fn rust_log_overrides_the_default_level() {
    use tracing_subscriber::filter::LevelFilter;

    assert_eq!(
        crate::log_filter(Some("aivis_server=debug"), "info").max_level_hint(),
        Some(LevelFilter::DEBUG)
    );
    assert_eq!(
        crate::log_filter(None, "info").max_level_hint(),
        Some(LevelFilter::INFO)
    );
    assert_eq!(
        crate::log_filter(Some("  "), "info").max_level_hint(),
        Some(LevelFilter::INFO)
    );
}
