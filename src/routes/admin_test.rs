use serde_json::json;
use tempfile::TempDir;

use crate::routes::test_client::TestClient;
use crate::state::test_helpers::{self, ADMIN_ACTION_PASSWORD, ADMIN_PASSWORD};
use axum::http::StatusCode;

async fn seeded_client(dir: &TempDir, count: usize) -> TestClient {
    let mut client = TestClient::new(test_helpers::test_app_state(dir.path()));
    for i in 0..count {
        let (status, _) = client
            .post("/api/posts", json!({ "category": "Facilities", "problem": format!("post {i}") }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    client
}

#[tokio::test]
async fn edits_are_refused_before_unlock() {
    let dir = TempDir::new().unwrap();
    let mut client = seeded_client(&dir, 1).await;

    let (status, body) = client
        .post("/api/admin/edits", json!({ "edits": [{ "id": 0, "delete": true }] }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "E_ADMIN_LOCKED");
}

#[tokio::test]
async fn login_as_admin_does_not_unlock_edits() {
    let dir = TempDir::new().unwrap();
    let mut client = seeded_client(&dir, 1).await;
    client
        .post("/api/auth/login", json!({ "username": "admin", "password": ADMIN_PASSWORD }))
        .await;

    let (status, _) = client
        .post("/api/admin/edits", json!({ "edits": [{ "id": 0, "status": "Solved" }] }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_admin_action_password_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let mut client = seeded_client(&dir, 0).await;

    let (status, body) = client.post("/api/admin/unlock", json!({ "password": "guess" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "E_INVALID_ADMIN_PASSWORD");
}

#[tokio::test]
async fn unlocked_save_updates_status_and_deletes() {
    let dir = TempDir::new().unwrap();
    let mut client = seeded_client(&dir, 6).await;

    let (status, _) = client
        .post("/api/admin/unlock", json!({ "password": ADMIN_ACTION_PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = client
        .post(
            "/api/admin/edits",
            json!({ "edits": [
                { "id": 2, "status": "Solved", "delete": false },
                { "id": 5, "delete": true }
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let posts = body["posts"].as_array().unwrap();
    assert_eq!(posts.len(), 5);
    assert!(posts.iter().all(|p| p["id"] != 5));
    let two = posts.iter().find(|p| p["id"] == 2).unwrap();
    assert_eq!(two["status"], "Solved");
    assert_eq!(two["problem"], "post 2");
    assert_eq!(two["upvotes"], 0);
    assert!(posts.iter().filter(|p| p["id"] != 2).all(|p| p["status"] == "New"));
}

#[tokio::test]
async fn edit_cannot_touch_upvotes() {
    let dir = TempDir::new().unwrap();
    let mut client = seeded_client(&dir, 1).await;
    client
        .post("/api/admin/unlock", json!({ "password": ADMIN_ACTION_PASSWORD }))
        .await;

    let (status, _) = client
        .post("/api/admin/edits", json!({ "edits": [{ "id": 0, "status": "New", "upvotes": 50 }] }))
        .await;
    assert!(status.is_client_error());

    let (_, list) = client.get("/api/posts").await;
    assert_eq!(list[0]["upvotes"], 0);
}

#[tokio::test]
async fn edit_with_unknown_status_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut client = seeded_client(&dir, 1).await;
    client
        .post("/api/admin/unlock", json!({ "password": ADMIN_ACTION_PASSWORD }))
        .await;

    let (status, _) = client
        .post("/api/admin/edits", json!({ "edits": [{ "id": 0, "status": "Archived" }] }))
        .await;
    assert!(status.is_client_error());

    let (_, list) = client.get("/api/posts").await;
    assert_eq!(list[0]["status"], "New");
}

#[tokio::test]
async fn edit_of_missing_post_is_not_found() {
    let dir = TempDir::new().unwrap();
    let mut client = seeded_client(&dir, 1).await;
    client
        .post("/api/admin/unlock", json!({ "password": ADMIN_ACTION_PASSWORD }))
        .await;

    let (status, body) = client
        .post("/api/admin/edits", json!({ "edits": [{ "id": 9, "delete": true }] }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "E_POST_NOT_FOUND");
}
