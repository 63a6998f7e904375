// Domain services
// Each service wraps one repository and enforces the business rules of its area.

pub mod admin;
pub mod auth;
pub mod cycle;
pub mod daily;
pub mod exercise;
pub mod finance;
pub mod medication;
pub mod memo;
pub mod period;
pub mod sex;
pub mod showapi;
pub mod stool;
pub mod weight;

use std::sync::Arc;

use chrono::NaiveDate;
use my_health_log_data::repository::{Repositories, UserRepository};

pub use admin::AdminService;
pub use auth::AuthService;
pub use daily::DailyService;
pub use exercise::ExerciseService;
pub use finance::FinanceService;
pub use medication::MedicationService;
pub use memo::MemoService;
pub use period::PeriodService;
pub use sex::SexService;
pub use showapi::ShowApiClient;
pub use stool::StoolService;
pub use weight::WeightService;

use crate::auth::oauth::OAuthProviders;
use crate::auth::token::TokenService;
use crate::config::AppConfig;
use crate::error::ServiceError;
use crate::health::HealthService;

/// Trimmed text, or `None` when blank
pub(crate) fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// Trim optional free text, folding blanks to `None`
pub(crate) fn trimmed(value: Option<String>) -> Option<String> {
    value.as_deref().and_then(non_blank).map(String::from)
}

/// Both ends of an inclusive date range, or a validation error carrying `message`
pub(crate) fn date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    message: &str,
) -> Result<(NaiveDate, NaiveDate), ServiceError> {
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok((start, end)),
        (Some(_), Some(_)) => Err(ServiceError::validation("开始日期不能晚于结束日期")),
        _ => Err(ServiceError::validation(message)),
    }
}

/// Every service the API needs, built once at startup
#[derive(Clone)]
pub struct Services {
    pub tokens: Arc<TokenService>,
    /// Used directly by the admin guard
    pub users: Arc<dyn UserRepository>,
    pub auth: AuthService,
    pub admin: AdminService,
    pub medications: MedicationService,
    pub showapi: ShowApiClient,
    pub stool: StoolService,
    pub daily: DailyService,
    pub exercise: ExerciseService,
    pub finance: FinanceService,
    pub memos: MemoService,
    pub periods: PeriodService,
    pub weight: WeightService,
    pub sex: SexService,
    pub health: HealthService,
}

impl Services {
    pub fn new(repositories: Repositories, config: &AppConfig) -> Self {
        let tokens = Arc::new(TokenService::new(config.jwt.clone()));
        let oauth = Arc::new(OAuthProviders::new(&config.providers));

        Self {
            auth: AuthService::new(
                repositories.users.clone(),
                tokens.clone(),
                oauth,
                config.frontend_url.clone(),
            ),
            admin: AdminService::new(repositories.users.clone()),
            medications: MedicationService::new(repositories.medications),
            showapi: ShowApiClient::new(config.showapi.clone()),
            stool: StoolService::new(repositories.stool),
            daily: DailyService::new(repositories.daily),
            exercise: ExerciseService::new(repositories.exercise),
            finance: FinanceService::new(repositories.finance),
            memos: MemoService::new(repositories.memos),
            periods: PeriodService::new(repositories.periods),
            weight: WeightService::new(repositories.weight, repositories.users.clone()),
            sex: SexService::new(repositories.sex),
            health: HealthService::new(repositories.health),
            users: repositories.users,
            tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_text_helpers() {
        assert_eq!(non_blank("  tea "), Some("tea"));
        assert_eq!(non_blank(" \t"), None);
        assert_eq!(trimmed(Some(" note ".to_string())), Some("note".to_string()));
        assert_eq!(trimmed(Some("   ".to_string())), None);
        assert_eq!(trimmed(None), None);
    }

    #[test]
    fn test_date_range_requires_ordered_ends() {
        assert_eq!(date_range(Some(d(1)), Some(d(1)), "x").unwrap(), (d(1), d(1)));
        assert!(matches!(date_range(Some(d(1)), None, "x"), Err(ServiceError::Validation(m)) if m == "x"));
        assert!(matches!(date_range(Some(d(2)), Some(d(1)), "x"), Err(ServiceError::Validation(_))));
    }
}
