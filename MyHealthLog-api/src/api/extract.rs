//! Extractors that deserialize and validate in one step, rejecting with [`ApiError`]

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::api::error::ApiError;

/// JSON body that passed its `validator` rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string that passed its `validator` rules
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

/// Path segments parsed into `T`; a segment of the wrong type is a JSON 400
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(ValidatedPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::StatusCode,
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Note {
        #[validate(required(message = "内容不能为空"))]
        text: Option<String>,
    }

    async fn echo(ValidatedJson(note): ValidatedJson<Note>) -> impl IntoResponse {
        note.text.unwrap_or_default()
    }

    async fn month(ValidatedPath((year, month)): ValidatedPath<(i32, u32)>) -> String {
        format!("{}-{:02}", year, month)
    }

    async fn read(response: axum::response::Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn send(body: &'static str) -> (StatusCode, String) {
        let app = Router::new().route("/", post(echo));
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        read(app.oneshot(request).await.unwrap()).await
    }

    async fn visit(uri: &str) -> (StatusCode, String) {
        let app = Router::new().route("/:year/:month", get(month));
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        read(app.oneshot(request).await.unwrap()).await
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        assert_eq!(send(r#"{"text":"hi"}"#).await, (StatusCode::OK, "hi".to_string()));
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request_with_message() {
        let (status, body) = send("{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("内容不能为空"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, body) = send("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("请求体格式无效"));
    }

    #[tokio::test]
    async fn test_typed_path_segments_reach_handler() {
        assert_eq!(visit("/2024/5").await, (StatusCode::OK, "2024-05".to_string()));
    }

    #[tokio::test]
    async fn test_bad_path_segment_is_json_bad_request() {
        let (status, body) = visit("/2024/x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["message"], "路径参数无效");
    }
}
