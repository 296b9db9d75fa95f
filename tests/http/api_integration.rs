//! Integration tests for the file service REST API

use crate::common::{create_test_services, TestRepo};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use kmgr::http::{build_router, with_service_layers};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt as TowerServiceExt;

/// Router over a small repository, plus the temp dirs keeping it alive
fn create_test_app() -> (Router, TestRepo, TempDir) {
    let repo = TestRepo::with_files(&[
        ("hello.txt", "hello"),
        ("src/lib.rs", "pub fn one() {}\npub fn two() {}\n// TODO: three\n"),
    ]);
    let state = TempDir::new().unwrap();
    let services = create_test_services(repo.path(), state.path());
    (build_router(services), repo, state)
}

async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["roots"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_descriptor_endpoint() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "kmgr-files");
    assert_eq!(body["limits"]["default_encoding"], "utf8");
    let endpoints = body["endpoints"].as_array().unwrap();
    let has = |route: &str| {
        endpoints
            .iter()
            .any(|e| e.as_str().unwrap().starts_with(route))
    };
    assert!(has("GET /chunk"));
    assert!(has("GET /search"));
}

#[tokio::test]
async fn test_robots_disallows_everything() {
    let (app, _repo, _state) = create_test_app();

    let response = app
        .oneshot(Request::get("/robots.txt").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Disallow: /"));
}

#[tokio::test]
async fn test_chunk_small_file() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/chunk?path=hello.txt&offset=0&length=100").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bytes"], 5);
    assert_eq!(body["eof"], true);
    assert_eq!(body["next_offset"], 5);
    assert_eq!(body["data"], "hello");
}

#[tokio::test]
async fn test_chunk_base64_encoding() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/chunk?path=hello.txt&encoding=base64").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["encoding"], "base64");
    assert_eq!(body["data"], "aGVsbG8=");
}

#[tokio::test]
async fn test_chunk_escape_is_forbidden() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/chunk?path=../../../etc/passwd").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_missing_path_is_bad_request() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/chunk").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("path"));
}

#[tokio::test]
async fn test_unparsable_number_is_bad_request() {
    let (app, _repo, _state) = create_test_app();

    let (status, _) = get(app, "/chunk?path=hello.txt&offset=abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let (app, _repo, _state) = create_test_app();

    let (status, _) = get(app, "/stat?path=absent.txt").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_directory_is_bad_request() {
    let (app, _repo, _state) = create_test_app();

    let (status, _) = get(app, "/lines?path=src").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_lines_window() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/lines?path=src/lib.rs&start=2&end=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["start"], 2);
    assert_eq!(body["end"], 3);
    assert_eq!(body["lines"][0], "pub fn two() {}");
    assert_eq!(body["next_start"], 4);
    assert_eq!(body["eof"], true);
}

#[tokio::test]
async fn test_search_regex() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/search?path=src/lib.rs&q=fn%20t%5Cw%2B&regex=1").await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["line"], 2);
    assert_eq!(results[0]["col"], 5);
    assert_eq!(results[0]["match"], "fn two");
}

#[tokio::test]
async fn test_search_case_insensitive_flag() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/search?path=src/lib.rs&q=todo&i=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["icase"], true);
    assert_eq!(body["results"][0]["line"], 3);
}

#[tokio::test]
async fn test_stat_hash() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app.clone(), "/stat?path=hello.txt&hash=SHA256").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["size"], 5);
    assert_eq!(
        body["sha256"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );

    let (status, _) = get(app, "/stat?path=hello.txt&hash=md5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _repo, _state) = create_test_app();

    let (status, body) = get(app, "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_write_methods_are_rejected() {
    let (app, _repo, _state) = create_test_app();

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let (status, body) = send(app.clone(), method, "/chunk?path=hello.txt").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(body["error"]["message"].is_string());
    }
}

#[tokio::test]
async fn test_options_is_no_content() {
    let (app, _repo, _state) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/chunk")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cors_headers_present() {
    let (app, _repo, _state) = create_test_app();

    let response = app
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

async fn exploding_handler() -> StatusCode {
    panic!("index file truncated")
}

#[tokio::test]
async fn test_handler_panic_becomes_internal_error() {
    let app = with_service_layers(
        Router::new().route("/boom", axum::routing::get(exploding_handler)),
    );

    let (status, body) = get(app, "/boom").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Internal error"));
    assert!(message.contains("index file truncated"));
}
