// In-memory repository implementations
//
// One shared set of tables stands behind every repository trait, so a test
// can register a user through one service and read their rows through
// another. Ids come from a single counter shared by all tables.
mod finance;
mod logs;
mod medication;
mod user;

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::errors::RepositoryError;
use super::health::HealthRepository;
use crate::models::daily::{DailyItem, DailyLog};
use crate::models::exercise::ExerciseLog;
use crate::models::medication::{Medication, MedicationLog};
use crate::models::memo::Memo;
use crate::models::period::MenstrualRecord;
use crate::models::sex::SexLog;
use crate::models::stool::StoolLog;
use crate::models::user::User;
use crate::models::weight::WeightLog;
use crate::models::Money;

/// Account row without its derived balance
#[derive(Debug, Clone)]
pub(crate) struct StoredAccount {
    pub id: i64,
    pub user_id: i64,
    pub account_name: String,
    pub initial_balance: Money,
}

/// Transaction row without the joined account name
#[derive(Debug, Clone)]
pub(crate) struct StoredTransaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub transaction_type: String,
    pub amount: Money,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredLoan {
    pub id: i64,
    pub user_id: i64,
    pub loan_type: String,
    pub person_name: String,
    pub amount: Money,
    pub notes: Option<String>,
    pub loan_date: NaiveDate,
    pub status: String,
    pub repayment_date: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredRepayment {
    pub id: i64,
    pub user_id: i64,
    pub loan_id: i64,
    pub account_id: i64,
    pub amount: Money,
    pub repayment_date: NaiveDate,
    pub transaction_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct StoredSexLog {
    pub user_id: i64,
    pub log: SexLog,
}

/// Every table of the schema
#[derive(Debug, Default)]
pub(crate) struct Tables {
    next_id: i64,
    pub users: Vec<User>,
    pub medications: Vec<Medication>,
    pub medication_logs: Vec<MedicationLog>,
    pub daily_items: Vec<DailyItem>,
    pub daily_logs: Vec<DailyLog>,
    pub exercise_logs: Vec<ExerciseLog>,
    pub accounts: Vec<StoredAccount>,
    pub transactions: Vec<StoredTransaction>,
    pub loans: Vec<StoredLoan>,
    pub repayments: Vec<StoredRepayment>,
    pub memos: Vec<Memo>,
    pub menstrual_records: Vec<MenstrualRecord>,
    pub sex_logs: Vec<StoredSexLog>,
    pub stool_logs: Vec<StoolLog>,
    pub weight_logs: Vec<WeightLog>,
}

impl Tables {
    /// Next auto-increment id
    pub fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Remove a user and every row they own
    pub fn cascade_user(&mut self, user_id: i64) -> bool {
        let before = self.users.len();
        self.users.retain(|u| u.id != user_id);
        if self.users.len() == before {
            return false;
        }
        self.medications.retain(|r| r.user_id != user_id);
        self.medication_logs.retain(|r| r.user_id != user_id);
        self.daily_items.retain(|r| r.user_id != user_id);
        self.daily_logs.retain(|r| r.user_id != user_id);
        self.exercise_logs.retain(|r| r.user_id != user_id);
        self.accounts.retain(|r| r.user_id != user_id);
        self.transactions.retain(|r| r.user_id != user_id);
        self.loans.retain(|r| r.user_id != user_id);
        self.repayments.retain(|r| r.user_id != user_id);
        self.memos.retain(|r| r.user_id != user_id);
        self.menstrual_records.retain(|r| r.user_id != user_id);
        self.sex_logs.retain(|r| r.user_id != user_id);
        self.stool_logs.retain(|r| r.user_id != user_id);
        self.weight_logs.retain(|r| r.user_id != user_id);
        true
    }
}

/// In-memory storage implementing every repository trait
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        Ok(self.tables.lock()?)
    }
}

#[async_trait]
impl HealthRepository for InMemoryStorage {
    async fn ping(&self) -> Result<String, RepositoryError> {
        drop(self.lock()?);
        Ok("in-memory".to_string())
    }
}

/// Case-insensitive substring match, the way `LIKE '%term%'` behaves under a `_ci` collation
pub(crate) fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping_reports_store() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.ping().await.unwrap(), "in-memory");
        // The guard taken by ping is released before it returns
        assert!(storage.tables.try_lock().is_ok());
    }

    #[test]
    fn test_ids_are_shared_across_tables() {
        let storage = InMemoryStorage::new();
        let mut tables = storage.lock().unwrap();
        assert_eq!(tables.next_id(), 1);
        assert_eq!(tables.next_id(), 2);
    }
}
