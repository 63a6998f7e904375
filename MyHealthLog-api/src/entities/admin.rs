use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::flag;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminFlagRequest {
    #[serde(default, deserialize_with = "flag::deserialize")]
    #[validate(required(message = "无效的管理员状态"))]
    pub is_admin: Option<bool>,
}
