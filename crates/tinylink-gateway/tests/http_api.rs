use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tinylink_core::ShortCode;
use tinylink_gateway::{App, AppState};
use tinylink_generator::{Generator, GeneratorSettings};
use tinylink_shortener::ShortenerService;
use tinylink_storage::{InMemoryRepository, SqliteRepository};
use tower::ServiceExt;

const BASE_URL: &str = "https://tiny.example";

fn in_memory_app() -> Router {
    let service =
        ShortenerService::new(InMemoryRepository::new(), GeneratorSettings::default()).unwrap();
    App::router(AppState::new(Arc::new(service), BASE_URL))
}

async fn sqlite_app() -> Router {
    let repository = SqliteRepository::in_memory().await.unwrap();
    let service = ShortenerService::new(repository, GeneratorSettings::default()).unwrap();
    App::router(AppState::new(Arc::new(service), BASE_URL))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn create(app: &Router, url: &str) -> Value {
    let (status, _, body) = send(app, post_json("/v1/links", json!({ "url": url }))).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn health_reports_ok() {
    let app = in_memory_app();

    let (status, _, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn create_returns_code_and_short_url() {
    let app = in_memory_app();

    let body = create(&app, "https://example.com/a").await;

    let code = body["short_code"].as_str().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(body["short_url"], format!("{BASE_URL}/{code}"));
    assert_eq!(body["original_url"], "https://example.com/a");
}

#[tokio::test]
async fn create_is_idempotent() {
    let app = in_memory_app();

    let first = create(&app, "https://example.com/a").await;
    let second = create(&app, "https://example.com/a").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn redirect_uses_temporary_redirect() {
    let app = sqlite_app().await;
    let body = create(&app, "https://example.com/a").await;
    let code = body["short_code"].as_str().unwrap();

    let (status, headers, _) = send(&app, get(&format!("/{code}"))).await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION], "https://example.com/a");
}

#[tokio::test]
async fn redirect_unknown_code_is_404() {
    let app = sqlite_app().await;

    let (status, _, body) = send(&app, get("/zzzzzz")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn lookup_returns_link_metadata() {
    let app = sqlite_app().await;
    let created = create(&app, "https://example.com/a").await;
    let code = created["short_code"].as_str().unwrap();

    let (status, _, body) = send(&app, get(&format!("/v1/links/{code}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["short_code"], code);
    assert_eq!(body["original_url"], "https://example.com/a");
    assert!(body["created_at"]
        .as_str()
        .unwrap()
        .parse::<jiff::Timestamp>()
        .is_ok());
}

#[tokio::test]
async fn lookup_unknown_code_is_404() {
    let app = in_memory_app();

    let (status, _, body) = send(&app, get("/v1/links/abc123")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn empty_url_is_rejected() {
    let app = in_memory_app();

    let (status, _, body) = send(&app, post_json("/v1/links", json!({ "url": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_url");
}

#[tokio::test]
async fn malformed_body_is_rejected_as_json() {
    let app = in_memory_app();

    let (status, _, body) = send(&app, post_json("/v1/links", json!({ "link": "x" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn unicode_urls_redirect() {
    let app = in_memory_app();
    let url = "https://example.com/ünïcode";
    let created = create(&app, url).await;
    let code = created["short_code"].as_str().unwrap();

    let (status, headers, _) = send(&app, get(&format!("/{code}"))).await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION].as_bytes(), url.as_bytes());
}

/// Offers the reserved `health` code before a usable one.
#[derive(Debug, Default)]
struct RouteShadowingGenerator {
    draws: AtomicUsize,
}

impl Generator for RouteShadowingGenerator {
    fn generate(&self) -> ShortCode {
        match self.draws.fetch_add(1, Ordering::SeqCst) {
            0 => ShortCode::new_unchecked("health"),
            n => ShortCode::new_unchecked(format!("abc{n:03}")),
        }
    }
}

#[tokio::test]
async fn issued_codes_never_shadow_health_route() {
    let service = ShortenerService::with_generator(
        InMemoryRepository::new(),
        RouteShadowingGenerator::default(),
        3,
    )
    .unwrap();
    let app = App::router(AppState::new(Arc::new(service), BASE_URL));

    let created = create(&app, "https://x.example").await;
    let code = created["short_code"].as_str().unwrap();
    assert_eq!(code, "abc001");

    let (status, headers, _) = send(&app, get(&format!("/{code}"))).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(headers[header::LOCATION], "https://x.example");

    let (status, _, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}
