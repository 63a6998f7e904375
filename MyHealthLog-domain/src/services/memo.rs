use std::sync::Arc;

use my_health_log_data::models::memo::{Memo, MemoPriority, NewMemo};
use my_health_log_data::repository::MemoRepository;

use crate::error::{found, ServiceError};
use crate::services::non_blank;

#[derive(Clone)]
pub struct MemoService {
    repository: Arc<dyn MemoRepository>,
}

impl MemoService {
    pub fn new(repository: Arc<dyn MemoRepository>) -> Self {
        Self { repository }
    }

    /// Open memos first, then by priority, newest first within a priority
    pub async fn list(&self, user_id: i64) -> Result<Vec<Memo>, ServiceError> {
        Ok(self.repository.list(user_id).await?)
    }

    pub async fn create(&self, user_id: i64, task_name: &str, priority: Option<MemoPriority>) -> Result<Memo, ServiceError> {
        let Some(task_name) = non_blank(task_name) else {
            return Err(ServiceError::validation("任务内容不能为空。"));
        };
        let memo = NewMemo {
            task_name: task_name.to_string(),
            priority: priority.unwrap_or_default(),
        };
        Ok(self.repository.create(user_id, memo).await?)
    }

    pub async fn set_completed(&self, user_id: i64, id: i64, completed: bool) -> Result<(), ServiceError> {
        found(
            self.repository.set_completed(user_id, id, completed).await?,
            "任务未找到或无权限修改。",
        )
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete(user_id, id).await?, "任务未找到或无权限删除。")
    }

    /// Completed memos matching `term`; a blank term matches nothing
    pub async fn search_completed(&self, user_id: i64, term: &str) -> Result<Vec<Memo>, ServiceError> {
        match non_blank(term) {
            Some(term) => Ok(self.repository.search_completed(user_id, term).await?),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use my_health_log_data::repository::InMemoryStorage;

    #[tokio::test]
    async fn test_default_priority_and_search() {
        let memos = MemoService::new(Arc::new(InMemoryStorage::new()));
        let memo = memos.create(1, "Renew passport", None).await.unwrap();
        assert_eq!(memo.priority, MemoPriority::Medium.as_str());
        assert!(matches!(memos.create(1, "  ", None).await, Err(ServiceError::Validation(_))));

        assert!(memos.search_completed(1, "passport").await.unwrap().is_empty());
        memos.set_completed(1, memo.id, true).await.unwrap();
        assert_eq!(memos.search_completed(1, "passport").await.unwrap().len(), 1);
        assert!(memos.search_completed(1, "").await.unwrap().is_empty());

        assert!(matches!(memos.set_completed(2, memo.id, false).await, Err(ServiceError::NotFound(_))));
        memos.delete(1, memo.id).await.unwrap();
        assert!(matches!(memos.delete(1, memo.id).await, Err(ServiceError::NotFound(_))));
    }
}
