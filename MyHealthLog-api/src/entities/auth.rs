use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::flag;

/// Registration request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(required(message = "所有字段均为必填项。"))]
    pub username: Option<String>,

    #[validate(required(message = "所有字段均为必填项。"))]
    pub email: Option<String>,

    /// At least 6 characters
    #[validate(required(message = "所有字段均为必填项。"))]
    pub password: Option<String>,
}

/// Login request payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// Username or email address
    #[validate(required(message = "用户名和密码不能为空。"))]
    pub username: Option<String>,

    #[validate(required(message = "用户名和密码不能为空。"))]
    pub password: Option<String>,
}

/// Session token issued by registration and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(required(message = "用户名和邮箱不能为空。"))]
    pub username: Option<String>,

    #[validate(required(message = "用户名和邮箱不能为空。"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Omitted when an OAuth-only account sets its first password
    pub old_password: Option<String>,

    #[validate(required(message = "新密码至少需要 6 个字符。"))]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SettingsRequest {
    #[serde(default, deserialize_with = "flag::deserialize")]
    #[validate(required(message = "无效的设置值。"))]
    pub show_womens_health: Option<bool>,
}

/// Parameters the provider appends to the callback URL
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_change_uses_camel_case() {
        let request: ChangePasswordRequest =
            serde_json::from_str(r#"{"oldPassword":"old-secret","newPassword":"new-secret"}"#).unwrap();
        assert_eq!(request.old_password.as_deref(), Some("old-secret"));
        assert!(request.validate().is_ok());

        let request: ChangePasswordRequest = serde_json::from_str(r#"{"oldPassword":"old-secret"}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_settings_require_a_flag() {
        let request: SettingsRequest = serde_json::from_str("{}").unwrap();
        assert!(request.validate().is_err());

        let request: SettingsRequest = serde_json::from_str(r#"{"show_womens_health":1}"#).unwrap();
        assert_eq!(request.show_womens_health, Some(true));
        assert!(serde_json::from_str::<SettingsRequest>(r#"{"show_womens_health":"maybe"}"#).is_err());
    }

    #[test]
    fn test_register_requires_every_field() {
        let request: RegisterRequest = serde_json::from_str(r#"{"username":"alice","password":"secret1"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
