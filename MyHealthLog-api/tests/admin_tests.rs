mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_admin_routes_reject_regular_users() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    for uri in ["/api/admin/stats", "/api/admin/users"] {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["message"], "访问被拒绝：需要管理员权限。");
    }
}

#[tokio::test]
async fn test_admin_sees_stats_and_users() {
    let app = TestApp::new();
    let (_, admin) = app.login_as_admin("root").await;
    let (_, alice) = app.login_as("alice").await;

    let (status, _) = app.post("/api/medications", &alice, json!({ "name": "Vitamin D" })).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, stats) = app.get("/api/admin/stats", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["users"], 2);
    assert_eq!(stats["admins"], 1);
    assert_eq!(stats["medications"], 1);

    let (status, users) = app.get("/api/admin/users", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_admin_flag_can_be_granted_but_not_self_revoked() {
    let app = TestApp::new();
    let (root, admin) = app.login_as_admin("root").await;
    let (alice, alice_token) = app.login_as("alice").await;

    let (status, body) = app
        .put(&format!("/api/admin/users/{}/admin", alice.id), &admin, json!({ "is_admin": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "管理员状态已更新。");

    // The flag is read per request, so the existing token now passes
    let (status, _) = app.get("/api/admin/stats", &alice_token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .put(&format!("/api/admin/users/{}/admin", root.id), &admin, json!({ "is_admin": false }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "不能取消自己的管理员权限。");

    let (status, _) = app
        .put("/api/admin/users/99999/admin", &admin, json!({ "is_admin": true }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put(&format!("/api/admin/users/{}/admin", alice.id), &admin, json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_deletes_other_users_only() {
    let app = TestApp::new();
    let (root, admin) = app.login_as_admin("root").await;
    let (alice, _) = app.login_as("alice").await;

    let (status, body) = app.delete(&format!("/api/admin/users/{}", root.id), &admin).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "不能删除自己的账户。");

    let uri = format!("/api/admin/users/{}", alice.id);
    let (status, _) = app.delete(&uri, &admin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.delete(&uri, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, users) = app.get("/api/admin/users", &admin).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}
