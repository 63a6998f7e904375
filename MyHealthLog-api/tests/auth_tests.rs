mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use my_health_log_domain::testing::TEST_PASSWORD;
use serde_json::json;

#[tokio::test]
async fn test_register_then_login_and_read_profile() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "alice", "email": "alice@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "注册成功！");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    // Email works as the login name too
    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice@example.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, profile) = app.get("/api/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["email"], "alice@example.com");
    assert_eq!(profile["has_password"], true);
    assert_eq!(profile["is_admin"], false);
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_short_password_and_duplicates() {
    let app = TestApp::new();
    app.login_as("bob").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "carol", "email": "carol@example.com", "password": "123" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "密码至少需要 6 个字符。");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({ "username": "bob", "email": "new@example.com", "password": "123456" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .send(Method::POST, "/api/auth/register", None, Some(json!({ "username": "dave" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "所有字段均为必填项。");
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.login_as("erin").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "erin", "password": "not-the-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "用户名或密码错误。");
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::POST, "/api/auth/login", None, Some(json!(["not", "an", "object"])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "请求体格式无效");
}

#[tokio::test]
async fn test_missing_and_invalid_tokens() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/auth/me", "definitely.not.a-jwt").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_profile_update_and_conflict() {
    let app = TestApp::new();
    let (_, token) = app.login_as("frank").await;
    app.login_as("grace").await;

    let (status, body) = app
        .put("/api/auth/me", &token, json!({ "username": "frankie", "email": "frankie@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "frankie");

    let (status, _) = app
        .put("/api/auth/me", &token, json!({ "username": "grace", "email": "frankie@example.com" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_change_password_requires_the_old_one() {
    let app = TestApp::new();
    let (_, token) = app.login_as("heidi").await;

    let (status, _) = app
        .put("/api/auth/me/password", &token, json!({ "newPassword": "brand-new" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            "/api/auth/me/password",
            &token,
            json!({ "oldPassword": "wrong-one", "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .put(
            "/api/auth/me/password",
            &token,
            json!({ "oldPassword": TEST_PASSWORD, "newPassword": "brand-new" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "密码更新成功！");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "heidi", "password": "brand-new" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_settings_accept_booleans_only() {
    let app = TestApp::new();
    let (_, token) = app.login_as("ivan").await;

    let (status, _) = app
        .put("/api/auth/me/settings", &token, json!({ "show_womens_health": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, profile) = app.get("/api/auth/me", &token).await;
    assert_eq!(profile["show_womens_health"], true);

    let (status, _) = app
        .put("/api/auth/me/settings", &token, json!({ "show_womens_health": "maybe" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_disabled_provider_redirects_back_to_login() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/api/auth/github", None, None).await;
    assert_eq!(status, StatusCode::FOUND);

    let (status, _) = app
        .send(Method::GET, "/api/auth/google/callback?code=abc&state=xyz", None, None)
        .await;
    assert_eq!(status, StatusCode::FOUND);

    let (status, body) = app.send(Method::GET, "/api/auth/myspace", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "不支持的登录方式");
}
