use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use my_health_log_domain::ServiceError;
use thiserror::Error;
use tracing::{debug, error};
use validator::ValidationErrors;

use crate::entities::common::ErrorResponse;

/// Message shown in place of any internal failure
pub const INTERNAL_ERROR_MESSAGE: &str = "服务器内部错误";

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Malformed request that never reached a service
    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(e) => match e {
                ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
                ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
                ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                ServiceError::Upstream(_) | ServiceError::Configuration(_) | ServiceError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Service(ServiceError::Repository(e)) => {
                error!("Repository failure: {}", e);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            ApiError::Service(e @ (ServiceError::Upstream(_) | ServiceError::Configuration(_))) => {
                error!("Request failed: {}", e);
                e.to_string()
            }
            other => {
                debug!("Request rejected with {}: {}", status, other);
                other.to_string()
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!("Rejected JSON body: {}", rejection.body_text());
        ApiError::bad_request("请求体格式无效")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        debug!("Rejected query string: {}", rejection.body_text());
        ApiError::bad_request("查询参数无效")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!("Rejected path parameters: {}", rejection.body_text());
        ApiError::bad_request("路径参数无效")
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        let message = fields
            .iter()
            .flat_map(|(_, errors)| errors.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "请求参数无效".to_string());
        ApiError::BadRequest(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use my_health_log_data::repository::RepositoryError;
    use validator::Validate;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::validation("bad"), StatusCode::BAD_REQUEST),
            (ServiceError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ServiceError::not_found("gone"), StatusCode::NOT_FOUND),
            (ServiceError::conflict("taken"), StatusCode::CONFLICT),
            (ServiceError::Upstream("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            let message = error.to_string();
            let response = ApiError::from(error).into_response();
            assert_eq!(response.status(), status);
            assert_eq!(body_of(response).await["message"], message);
        }
    }

    #[tokio::test]
    async fn test_repository_details_are_hidden() {
        let error = ServiceError::Repository(RepositoryError::InvalidData("unknown stool_type column".into()));
        let response = ApiError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["message"], INTERNAL_ERROR_MESSAGE);
    }

    #[derive(Validate)]
    struct Form {
        #[validate(required(message = "名称不能为空"))]
        name: Option<String>,
    }

    #[test]
    fn test_validation_message_is_surfaced() {
        let errors = Form { name: None }.validate().unwrap_err();
        match ApiError::from(errors) {
            ApiError::BadRequest(message) => assert_eq!(message, "名称不能为空"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
