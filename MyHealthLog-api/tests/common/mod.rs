// Shared harness for the API integration tests: a router over in-memory
// storage plus helpers to send JSON and read JSON back.
#![allow(dead_code)]

use std::sync::Once;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use my_health_log_api::create_app;
use my_health_log_data::models::user::User;
use my_health_log_domain::testing::TestContext;
use serde_json::Value;
use tower::ServiceExt;

// Ensure tracing is initialized only once
static INIT: Once = Once::new();

fn initialize() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("warn")
            .with_test_writer()
            .try_init();
    });
}

pub struct TestApp {
    pub ctx: TestContext,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        initialize();
        let ctx = TestContext::new();
        let router = create_app(ctx.services.clone());
        Self { ctx, router }
    }

    /// A password user and a bearer token for them
    pub async fn login_as(&self, username: &str) -> (User, String) {
        let user = self.ctx.user(username).await;
        let token = self.ctx.token(user.id);
        (user, token)
    }

    pub async fn login_as_admin(&self, username: &str) -> (User, String) {
        let user = self.ctx.admin(username).await;
        let token = self.ctx.token(user.id);
        (user, token)
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = get_body_bytes(response).await;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}

// Helper function to get body bytes from a response
async fn get_body_bytes(response: axum::response::Response) -> Vec<u8> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    bytes.to_vec()
}

/// Monetary fields serialize as JSON numbers
pub fn amount(value: &Value) -> f64 {
    value.as_f64().unwrap_or_else(|| panic!("not a number: {}", value))
}
