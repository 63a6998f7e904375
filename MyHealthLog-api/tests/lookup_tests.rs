mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

const UNCONFIGURED: &str = "后端未配置 ShowAPI 凭据";

#[tokio::test]
async fn test_lookup_routes_report_missing_credentials() {
    let app = TestApp::new();
    let (_, token) = app.login_as("alice").await;

    let gets = [
        "/api/medication-lookup/lookup/6901234567892",
        "/api/medication-lookup/categories",
        "/api/health-info/disease/categories",
        "/api/health-info/disease/detail/42",
        "/api/health-info/knowledge/categories",
        "/api/health-info/knowledge/detail/7",
    ];
    for uri in gets {
        let (status, body) = app.get(uri, &token).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body, json!({ "message": UNCONFIGURED }), "{}", uri);
    }

    let posts = [
        ("/api/medication-lookup/encyclopedia", json!({ "searchKey": "布洛芬" })),
        ("/api/health-info/disease/list", json!({ "key": "感冒", "page": 1 })),
        ("/api/health-info/knowledge/search", json!({ "key": "睡眠" })),
    ];
    for (uri, body) in posts {
        let (status, body) = app.post(uri, &token, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(body["message"], UNCONFIGURED, "{}", uri);
    }
}

#[tokio::test]
async fn test_lookup_routes_require_login() {
    let app = TestApp::new();

    let (status, _) = app
        .send(Method::GET, "/api/medication-lookup/categories", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/api/health-info/knowledge/categories", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
