// tests/pages_api.rs
// Generated page CRUD through the HTTP API

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_create_page_then_read_back() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/pages",
            json!({"title": "Foo Bar", "content": "Welcome to the page."}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"success": true, "slug": "foo-bar", "route": "/foo-bar"}));

    let (status, body) = app.get("/api/pages/foo-bar").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Foo Bar");
    assert_eq!(body["content"], "Welcome to the page.");

    assert!(app.dir.path().join("pages/foo-bar/page.tsx").exists());
}

#[tokio::test]
async fn test_page_lifecycle() {
    let app = TestApp::new();
    app.post("/api/pages", json!({"title": "Release Notes", "content": "v1"}))
        .await;

    let (status, list) = app.get("/api/pages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["route"], "/release-notes");
    assert_eq!(list[0]["name"], "Release-notes");

    let (status, _) = app
        .send(
            "PUT",
            "/api/pages/release-notes",
            Some(json!({"title": "Release Notes", "content": "v2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/api/pages/release-notes").await;
    assert_eq!(body["content"], "v2");

    let (status, body) = app.send("DELETE", "/api/pages/release-notes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = app.get("/api/pages/release-notes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_page_update_and_delete_are_not_found() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            "PUT",
            "/api/pages/nowhere",
            Some(json!({"title": "Nowhere", "content": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("DELETE", "/api/pages/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_title_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/pages", json!({"title": "   ", "content": "x"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_dot_title_and_slug_cannot_touch_pages_root() {
    let app = TestApp::new();
    app.post("/api/pages", json!({"title": "About", "content": "us"}))
        .await;

    let (status, _) = app
        .post("/api/pages", json!({"title": ".", "content": "x"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!app.dir.path().join("pages/page.tsx").exists());

    let (status, _) = app.send("DELETE", "/api/pages/%2E", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .send(
            "PUT",
            "/api/pages/%2E",
            Some(json!({"title": "Dot", "content": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.dir.path().join("pages/about/page.tsx").exists());
    let (_, body) = app.get("/api/pages/about").await;
    assert_eq!(body["title"], "About");
}
