use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::InMemoryStorage;
use crate::models::medication::{DoseOutcome, Medication, MedicationInput, MedicationLog};
use crate::repository::errors::RepositoryError;
use crate::repository::medication::MedicationRepository;

#[async_trait]
impl MedicationRepository for InMemoryStorage {
    async fn list(&self, user_id: i64) -> Result<Vec<Medication>, RepositoryError> {
        let tables = self.lock()?;
        let mut medications: Vec<Medication> =
            tables.medications.iter().filter(|m| m.user_id == user_id).cloned().collect();
        medications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(medications)
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Medication>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .medications
            .iter()
            .find(|m| m.id == id && m.user_id == user_id)
            .cloned())
    }

    async fn create(&self, user_id: i64, input: MedicationInput) -> Result<Medication, RepositoryError> {
        let mut tables = self.lock()?;
        let medication = Medication {
            id: tables.next_id(),
            user_id,
            name: input.name,
            dosage: input.dosage,
            frequency: input.frequency,
            stock: input.stock,
            medication_times: input.medication_times,
            created_at: Utc::now(),
        };
        tables.medications.push(medication.clone());
        Ok(medication)
    }

    async fn update(&self, user_id: i64, id: i64, input: MedicationInput) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables
            .medications
            .iter_mut()
            .find(|m| m.id == id && m.user_id == user_id)
        {
            Some(medication) => {
                medication.name = input.name;
                medication.dosage = input.dosage;
                medication.frequency = input.frequency;
                medication.stock = input.stock;
                medication.medication_times = input.medication_times;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.medications.len();
        tables.medications.retain(|m| !(m.id == id && m.user_id == user_id));
        if tables.medications.len() == before {
            return Ok(false);
        }
        tables.medication_logs.retain(|l| l.medication_id != id);
        Ok(true)
    }

    async fn record_dose(&self, user_id: i64, id: i64, amount: i32) -> Result<DoseOutcome, RepositoryError> {
        let mut tables = self.lock()?;
        let Some(medication) = tables
            .medications
            .iter_mut()
            .find(|m| m.id == id && m.user_id == user_id)
        else {
            return Ok(DoseOutcome::MedicationNotFound);
        };

        if let Some(available) = medication.stock {
            if available < amount {
                return Ok(DoseOutcome::InsufficientStock { available });
            }
            medication.stock = Some(available - amount);
        }

        let log = MedicationLog {
            id: tables.next_id(),
            user_id,
            medication_id: id,
            taken_at: Utc::now(),
        };
        tables.medication_logs.push(log.clone());
        Ok(DoseOutcome::Recorded(log))
    }

    async fn logs(&self, user_id: i64, medication_id: i64) -> Result<Vec<MedicationLog>, RepositoryError> {
        let tables = self.lock()?;
        let mut logs: Vec<MedicationLog> = tables
            .medication_logs
            .iter()
            .filter(|l| l.medication_id == medication_id && l.user_id == user_id)
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.taken_at.cmp(&a.taken_at).then(b.id.cmp(&a.id)));
        Ok(logs)
    }

    async fn delete_log(&self, user_id: i64, log_id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.medication_logs.len();
        tables.medication_logs.retain(|l| !(l.id == log_id && l.user_id == user_id));
        Ok(tables.medication_logs.len() < before)
    }

    async fn purge_logs_before(&self, user_id: i64, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.medication_logs.len();
        tables
            .medication_logs
            .retain(|l| !(l.user_id == user_id && l.taken_at < cutoff));
        Ok((before - tables.medication_logs.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(stock: Option<i32>) -> MedicationInput {
        MedicationInput {
            name: "Ibuprofen".to_string(),
            dosage: Some("200mg".to_string()),
            frequency: None,
            stock,
            medication_times: None,
        }
    }

    #[tokio::test]
    async fn test_dose_decrements_tracked_stock() {
        let storage = InMemoryStorage::new();
        let med = storage.create(1, input(Some(3))).await.unwrap();

        assert!(matches!(storage.record_dose(1, med.id, 2).await.unwrap(), DoseOutcome::Recorded(_)));
        assert_eq!(storage.find(1, med.id).await.unwrap().unwrap().stock, Some(1));

        let outcome = storage.record_dose(1, med.id, 2).await.unwrap();
        assert!(matches!(outcome, DoseOutcome::InsufficientStock { available: 1 }));
        assert_eq!(storage.logs(1, med.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_untracked_stock_never_blocks() {
        let storage = InMemoryStorage::new();
        let med = storage.create(1, input(None)).await.unwrap();
        for _ in 0..3 {
            assert!(matches!(storage.record_dose(1, med.id, 5).await.unwrap(), DoseOutcome::Recorded(_)));
        }
        assert_eq!(storage.find(1, med.id).await.unwrap().unwrap().stock, None);
    }

    #[tokio::test]
    async fn test_other_users_medication_is_not_found() {
        let storage = InMemoryStorage::new();
        let med = storage.create(1, input(Some(10))).await.unwrap();
        assert!(matches!(
            storage.record_dose(2, med.id, 1).await.unwrap(),
            DoseOutcome::MedicationNotFound
        ));
        assert!(!storage.delete(2, med.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_only_touches_old_logs() {
        let storage = InMemoryStorage::new();
        let med = storage.create(1, input(None)).await.unwrap();
        storage.record_dose(1, med.id, 1).await.unwrap();

        let removed = storage
            .purge_logs_before(1, Utc::now() - chrono::Duration::days(7))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = storage
            .purge_logs_before(1, Utc::now() + chrono::Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
    }
}
