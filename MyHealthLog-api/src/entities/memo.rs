use my_health_log_data::models::memo::MemoPriority;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::common::flag;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MemoRequest {
    #[validate(required(message = "任务内容不能为空。"))]
    pub task_name: Option<String>,

    /// `high`, `medium` (default) or `low`
    pub priority: Option<MemoPriority>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MemoStatusRequest {
    #[serde(default, deserialize_with = "flag::deserialize")]
    #[validate(required(message = "无效的完成状态"))]
    pub is_completed: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_optional_but_checked() {
        let request: MemoRequest = serde_json::from_str(r#"{"task_name":"买牛奶"}"#).unwrap();
        assert_eq!(request.priority, None);
        let request: MemoRequest = serde_json::from_str(r#"{"task_name":"交房租","priority":"high"}"#).unwrap();
        assert_eq!(request.priority, Some(MemoPriority::High));
        assert!(serde_json::from_str::<MemoRequest>(r#"{"task_name":"x","priority":"urgent"}"#).is_err());
    }

    #[test]
    fn test_status_accepts_numeric_flags() {
        let request: MemoStatusRequest = serde_json::from_str(r#"{"is_completed":0}"#).unwrap();
        assert_eq!(request.is_completed, Some(false));
    }
}
