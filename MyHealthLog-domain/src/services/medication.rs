use std::sync::Arc;

use chrono::{Duration, Utc};
use my_health_log_data::models::medication::{DoseOutcome, Medication, MedicationInput, MedicationLog};
use my_health_log_data::repository::MedicationRepository;
use tracing::{debug, error, instrument};

use crate::error::{found, ServiceError};
use crate::services::{non_blank, trimmed};

/// Dose logs older than this are purged when the list is read
pub const LOG_RETENTION_DAYS: i64 = 7;

/// Medications, dose logging and stock keeping
#[derive(Clone)]
pub struct MedicationService {
    repository: Arc<dyn MedicationRepository>,
}

impl MedicationService {
    pub fn new(repository: Arc<dyn MedicationRepository>) -> Self {
        Self { repository }
    }

    fn validate(input: MedicationInput) -> Result<MedicationInput, ServiceError> {
        let Some(name) = non_blank(&input.name).map(String::from) else {
            return Err(ServiceError::validation("药品名称不能为空。"));
        };
        if input.stock.is_some_and(|stock| stock < 0) {
            return Err(ServiceError::validation("库存不能为负数。"));
        }
        Ok(MedicationInput {
            name,
            dosage: trimmed(input.dosage),
            frequency: trimmed(input.frequency),
            stock: input.stock,
            medication_times: trimmed(input.medication_times),
        })
    }

    /// List medications, newest first.
    ///
    /// Also starts a background purge of the caller's old dose logs. A purge
    /// failure is logged and never affects the listing.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: i64) -> Result<Vec<Medication>, ServiceError> {
        let repository = self.repository.clone();
        tokio::spawn(async move {
            let cutoff = Utc::now() - Duration::days(LOG_RETENTION_DAYS);
            match repository.purge_logs_before(user_id, cutoff).await {
                Ok(0) => {}
                Ok(removed) => debug!("Purged {} old medication logs for user {}", removed, user_id),
                Err(e) => error!("Failed to purge medication logs for user {}: {}", user_id, e),
            }
        });

        Ok(self.repository.list(user_id).await?)
    }

    pub async fn create(&self, user_id: i64, input: MedicationInput) -> Result<Medication, ServiceError> {
        let input = Self::validate(input)?;
        Ok(self.repository.create(user_id, input).await?)
    }

    pub async fn update(&self, user_id: i64, id: i64, input: MedicationInput) -> Result<(), ServiceError> {
        let input = Self::validate(input)?;
        found(self.repository.update(user_id, id, input).await?, "药品未找到或无权限修改。")
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete(user_id, id).await?, "药品未找到或无权限删除。")
    }

    /// Record a dose, drawing `amount` (default 1) from tracked stock
    #[instrument(skip(self))]
    pub async fn take(&self, user_id: i64, id: i64, amount: Option<i32>) -> Result<MedicationLog, ServiceError> {
        let amount = amount.unwrap_or(1);
        if amount < 1 {
            return Err(ServiceError::validation("服用剂量必须为正整数。"));
        }

        match self.repository.record_dose(user_id, id, amount).await? {
            DoseOutcome::Recorded(log) => Ok(log),
            DoseOutcome::MedicationNotFound => Err(ServiceError::not_found("药品未找到。")),
            DoseOutcome::InsufficientStock { available } => Err(ServiceError::conflict(format!(
                "库存不足，当前剩余 {}。",
                available
            ))),
        }
    }

    pub async fn logs(&self, user_id: i64, medication_id: i64) -> Result<Vec<MedicationLog>, ServiceError> {
        Ok(self.repository.logs(user_id, medication_id).await?)
    }

    pub async fn delete_log(&self, user_id: i64, log_id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete_log(user_id, log_id).await?, "记录未找到或无权限删除")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use my_health_log_data::repository::InMemoryStorage;

    fn input(name: &str, stock: Option<i32>) -> MedicationInput {
        MedicationInput {
            name: name.to_string(),
            dosage: Some(" 1 tablet ".to_string()),
            frequency: Some("".to_string()),
            stock,
            medication_times: None,
        }
    }

    fn service() -> MedicationService {
        MedicationService::new(Arc::new(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_create_trims_and_requires_name() {
        let meds = service();
        assert!(matches!(meds.create(1, input("   ", None)).await, Err(ServiceError::Validation(_))));
        assert!(matches!(meds.create(1, input("Aspirin", Some(-1))).await, Err(ServiceError::Validation(_))));

        let med = meds.create(1, input(" Aspirin ", Some(2))).await.unwrap();
        assert_eq!(med.name, "Aspirin");
        assert_eq!(med.dosage.as_deref(), Some("1 tablet"));
        assert_eq!(med.frequency, None);
        assert_eq!(meds.list(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_take_maps_outcomes() {
        let meds = service();
        let med = meds.create(1, input("Aspirin", Some(1))).await.unwrap();

        meds.take(1, med.id, None).await.unwrap();
        assert!(matches!(meds.take(1, med.id, None).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(meds.take(2, med.id, None).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(meds.take(1, med.id, Some(0)).await, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_is_not_found_on_repeat() {
        let meds = service();
        let med = meds.create(1, input("Aspirin", None)).await.unwrap();
        let log = meds.take(1, med.id, Some(3)).await.unwrap();

        assert!(matches!(meds.delete_log(2, log.id).await, Err(ServiceError::NotFound(_))));
        meds.delete_log(1, log.id).await.unwrap();
        assert!(matches!(meds.delete_log(1, log.id).await, Err(ServiceError::NotFound(_))));

        meds.delete(1, med.id).await.unwrap();
        assert!(matches!(meds.delete(1, med.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(meds.update(1, med.id, input("X", None)).await, Err(ServiceError::NotFound(_))));
    }
}
