use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder};

use super::errors::RepositoryError;
use crate::models::period::{MenstrualRecord, MenstrualRecordPatch, NewMenstrualRecord};

const RECORD_COLUMNS: &str = "id, user_id, start_date, end_date, pain_level, flow_volume, notes, color, state";

/// Repository trait for menstrual period records
#[async_trait]
pub trait PeriodRepository: Send + Sync {
    /// Records newest start first
    async fn list(&self, user_id: i64) -> Result<Vec<MenstrualRecord>, RepositoryError>;

    async fn create(&self, user_id: i64, record: NewMenstrualRecord) -> Result<MenstrualRecord, RepositoryError>;

    /// Apply the fields present in `patch`. Returns false when no row matched.
    async fn update(&self, user_id: i64, id: i64, patch: MenstrualRecordPatch) -> Result<bool, RepositoryError>;

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;
}

/// MySQL implementation of [`PeriodRepository`]
#[derive(Debug, Clone)]
pub struct MySqlPeriodRepository {
    pool: MySqlPool,
}

impl MySqlPeriodRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PeriodRepository for MySqlPeriodRepository {
    async fn list(&self, user_id: i64) -> Result<Vec<MenstrualRecord>, RepositoryError> {
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM menstrual_records WHERE user_id = ? ORDER BY start_date DESC, id DESC"
        );
        let records = sqlx::query_as::<_, MenstrualRecord>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn create(&self, user_id: i64, record: NewMenstrualRecord) -> Result<MenstrualRecord, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO menstrual_records (user_id, start_date, end_date, pain_level, flow_volume, notes, color, state) \
             VALUES (?, ?, NULL, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(record.start_date)
        .bind(&record.pain_level)
        .bind(&record.flow_volume)
        .bind(&record.notes)
        .bind(&record.color)
        .bind(&record.state)
        .execute(&self.pool)
        .await?;

        let query = format!("SELECT {RECORD_COLUMNS} FROM menstrual_records WHERE id = ?");
        let saved = sqlx::query_as::<_, MenstrualRecord>(&query)
            .bind(result.last_insert_id() as i64)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn update(&self, user_id: i64, id: i64, patch: MenstrualRecordPatch) -> Result<bool, RepositoryError> {
        if patch.is_empty() {
            return Ok(false);
        }

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new("UPDATE menstrual_records SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(end_date) = patch.end_date {
                fields.push("end_date = ");
                fields.push_bind_unseparated(end_date);
            }
            for (column, value) in [
                ("pain_level", patch.pain_level),
                ("flow_volume", patch.flow_volume),
                ("notes", patch.notes),
                ("color", patch.color),
                ("state", patch.state),
            ] {
                if let Some(value) = value {
                    fields.push(format!("{} = ", column));
                    fields.push_bind_unseparated(value);
                }
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" AND user_id = ");
        builder.push_bind(user_id);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM menstrual_records WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
