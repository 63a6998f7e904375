// Repository module structure
//
// Every area has a trait describing its queries, a MySQL implementation and,
// for tests, an in-memory implementation. All queries are scoped by the
// owning user's id.
pub mod errors;
mod daily;
mod exercise;
mod finance;
mod health;
mod medication;
mod memo;
mod period;
mod sex;
mod stool;
mod user;
mod weight;

#[cfg(any(test, feature = "mock"))]
mod in_memory;

use std::sync::Arc;

use sqlx::MySqlPool;

// Re-export commonly used types
pub use daily::{DailyRepository, MySqlDailyRepository};
pub use errors::RepositoryError;
pub use exercise::{ExerciseRepository, MySqlExerciseRepository};
pub use finance::{FinanceRepository, MySqlFinanceRepository};
pub use health::{HealthRepository, MySqlHealthRepository};
pub use medication::{MedicationRepository, MySqlMedicationRepository};
pub use memo::{MemoRepository, MySqlMemoRepository};
pub use period::{MySqlPeriodRepository, PeriodRepository};
pub use sex::{MySqlSexRepository, SexRepository};
pub use stool::{MySqlStoolRepository, StoolRepository};
pub use user::{MySqlUserRepository, UserRepository};
pub use weight::{MySqlWeightRepository, WeightRepository};

#[cfg(any(test, feature = "mock"))]
pub use in_memory::InMemoryStorage;

/// One handle per repository, shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub medications: Arc<dyn MedicationRepository>,
    pub daily: Arc<dyn DailyRepository>,
    pub exercise: Arc<dyn ExerciseRepository>,
    pub finance: Arc<dyn FinanceRepository>,
    pub memos: Arc<dyn MemoRepository>,
    pub periods: Arc<dyn PeriodRepository>,
    pub sex: Arc<dyn SexRepository>,
    pub stool: Arc<dyn StoolRepository>,
    pub weight: Arc<dyn WeightRepository>,
    pub health: Arc<dyn HealthRepository>,
}

impl Repositories {
    /// MySQL-backed repositories sharing one pool
    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            users: Arc::new(MySqlUserRepository::new(pool.clone())),
            medications: Arc::new(MySqlMedicationRepository::new(pool.clone())),
            daily: Arc::new(MySqlDailyRepository::new(pool.clone())),
            exercise: Arc::new(MySqlExerciseRepository::new(pool.clone())),
            finance: Arc::new(MySqlFinanceRepository::new(pool.clone())),
            memos: Arc::new(MySqlMemoRepository::new(pool.clone())),
            periods: Arc::new(MySqlPeriodRepository::new(pool.clone())),
            sex: Arc::new(MySqlSexRepository::new(pool.clone())),
            stool: Arc::new(MySqlStoolRepository::new(pool.clone())),
            weight: Arc::new(MySqlWeightRepository::new(pool.clone())),
            health: Arc::new(MySqlHealthRepository::new(pool)),
        }
    }

    /// Repositories over one shared in-memory store
    #[cfg(any(test, feature = "mock"))]
    pub fn in_memory() -> Self {
        Self::from_storage(InMemoryStorage::new())
    }

    /// Repositories over a caller-supplied store, so tests can seed or inspect it
    #[cfg(any(test, feature = "mock"))]
    pub fn from_storage(storage: InMemoryStorage) -> Self {
        Self {
            users: Arc::new(storage.clone()),
            medications: Arc::new(storage.clone()),
            daily: Arc::new(storage.clone()),
            exercise: Arc::new(storage.clone()),
            finance: Arc::new(storage.clone()),
            memos: Arc::new(storage.clone()),
            periods: Arc::new(storage.clone()),
            sex: Arc::new(storage.clone()),
            stool: Arc::new(storage.clone()),
            weight: Arc::new(storage.clone()),
            health: Arc::new(storage),
        }
    }
}
