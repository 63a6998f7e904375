use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;
use tracing::debug;

use super::errors::RepositoryError;
use crate::models::medication::{DoseOutcome, Medication, MedicationInput, MedicationLog};

const MEDICATION_COLUMNS: &str =
    "id, user_id, name, dosage, frequency, stock, medication_times, created_at";

/// Repository trait for medication plans and their dose logs
#[async_trait]
pub trait MedicationRepository: Send + Sync {
    /// All medications of a user, newest first
    async fn list(&self, user_id: i64) -> Result<Vec<Medication>, RepositoryError>;

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Medication>, RepositoryError>;

    async fn create(&self, user_id: i64, input: MedicationInput) -> Result<Medication, RepositoryError>;

    /// Replace every editable field. Returns false when no row matched.
    async fn update(&self, user_id: i64, id: i64, input: MedicationInput) -> Result<bool, RepositoryError>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;

    /// Decrement tracked stock by `amount` and insert a log, atomically
    async fn record_dose(&self, user_id: i64, id: i64, amount: i32) -> Result<DoseOutcome, RepositoryError>;

    /// Logs of one medication, newest first
    async fn logs(&self, user_id: i64, medication_id: i64) -> Result<Vec<MedicationLog>, RepositoryError>;

    async fn delete_log(&self, user_id: i64, log_id: i64) -> Result<bool, RepositoryError>;

    /// Remove the user's logs taken before `cutoff`; returns the number removed
    async fn purge_logs_before(&self, user_id: i64, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError>;
}

/// MySQL implementation of [`MedicationRepository`]
#[derive(Debug, Clone)]
pub struct MySqlMedicationRepository {
    pool: MySqlPool,
}

impl MySqlMedicationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MedicationRepository for MySqlMedicationRepository {
    async fn list(&self, user_id: i64) -> Result<Vec<Medication>, RepositoryError> {
        let query = format!(
            "SELECT {MEDICATION_COLUMNS} FROM medications WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        );
        let medications = sqlx::query_as::<_, Medication>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(medications)
    }

    async fn find(&self, user_id: i64, id: i64) -> Result<Option<Medication>, RepositoryError> {
        let query = format!("SELECT {MEDICATION_COLUMNS} FROM medications WHERE id = ? AND user_id = ?");
        let medication = sqlx::query_as::<_, Medication>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(medication)
    }

    async fn create(&self, user_id: i64, input: MedicationInput) -> Result<Medication, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO medications (user_id, name, dosage, frequency, stock, medication_times) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.dosage)
        .bind(&input.frequency)
        .bind(input.stock)
        .bind(&input.medication_times)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id() as i64;
        self.find(user_id, id)
            .await?
            .ok_or(RepositoryError::Database(sqlx::Error::RowNotFound))
    }

    async fn update(&self, user_id: i64, id: i64, input: MedicationInput) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE medications SET name = ?, dosage = ?, frequency = ?, stock = ?, medication_times = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&input.name)
        .bind(&input.dosage)
        .bind(&input.frequency)
        .bind(input.stock)
        .bind(&input.medication_times)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM medications WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_dose(&self, user_id: i64, id: i64, amount: i32) -> Result<DoseOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Outer None: no such medication. Inner None: stock is not tracked.
        let stock: Option<Option<i32>> =
            sqlx::query_scalar("SELECT stock FROM medications WHERE id = ? AND user_id = ? FOR UPDATE")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        let stock = match stock {
            None => return Ok(DoseOutcome::MedicationNotFound),
            Some(stock) => stock,
        };

        if let Some(available) = stock {
            if available < amount {
                return Ok(DoseOutcome::InsufficientStock { available });
            }
            sqlx::query("UPDATE medications SET stock = stock - ? WHERE id = ?")
                .bind(amount)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("INSERT INTO medication_logs (user_id, medication_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let log = sqlx::query_as::<_, MedicationLog>(
            "SELECT id, user_id, medication_id, taken_at FROM medication_logs WHERE id = ?",
        )
        .bind(result.last_insert_id() as i64)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Recorded dose of medication {} for user {}", id, user_id);
        Ok(DoseOutcome::Recorded(log))
    }

    async fn logs(&self, user_id: i64, medication_id: i64) -> Result<Vec<MedicationLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, MedicationLog>(
            "SELECT id, user_id, medication_id, taken_at FROM medication_logs \
             WHERE medication_id = ? AND user_id = ? ORDER BY taken_at DESC, id DESC",
        )
        .bind(medication_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn delete_log(&self, user_id: i64, log_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM medication_logs WHERE id = ? AND user_id = ?")
            .bind(log_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_logs_before(&self, user_id: i64, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM medication_logs WHERE user_id = ? AND taken_at < ?")
            .bind(user_id)
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
