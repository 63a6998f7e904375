use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the JWT bearer scheme referenced by `security(("bearer" = []))`
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::me,
        crate::api::handlers::auth::update_me,
        crate::api::handlers::auth::change_password,
        crate::api::handlers::auth::update_settings,
        crate::api::handlers::auth::oauth_start,
        crate::api::handlers::auth::oauth_callback,

        // Medication endpoints
        crate::api::handlers::medications::list_medications,
        crate::api::handlers::medications::create_medication,
        crate::api::handlers::medications::update_medication,
        crate::api::handlers::medications::delete_medication,
        crate::api::handlers::medications::take_medication,
        crate::api::handlers::medications::medication_logs,
        crate::api::handlers::medications::delete_medication_log,

        // Lookup endpoints
        crate::api::handlers::lookup::lookup_barcode,
        crate::api::handlers::lookup::drug_categories,
        crate::api::handlers::lookup::drug_encyclopedia,
        crate::api::handlers::lookup::disease_categories,
        crate::api::handlers::lookup::disease_list,
        crate::api::handlers::lookup::disease_detail,
        crate::api::handlers::lookup::knowledge_categories,
        crate::api::handlers::lookup::knowledge_search,
        crate::api::handlers::lookup::knowledge_detail,

        // Stool endpoints
        crate::api::handlers::stool::list_stool_logs,
        crate::api::handlers::stool::stool_dates,
        crate::api::handlers::stool::stool_summary,
        crate::api::handlers::stool::create_stool_log,
        crate::api::handlers::stool::update_stool_log,
        crate::api::handlers::stool::delete_stool_log,

        // Daily check-in endpoints
        crate::api::handlers::daily::list_items,
        crate::api::handlers::daily::create_item,
        crate::api::handlers::daily::delete_item,
        crate::api::handlers::daily::complete_item,
        crate::api::handlers::daily::logs_for_date,
        crate::api::handlers::daily::save_log,
        crate::api::handlers::daily::search_logs,

        // Exercise endpoints
        crate::api::handlers::exercise::create_exercise_log,
        crate::api::handlers::exercise::search_exercise_logs,
        crate::api::handlers::exercise::exercise_for_date,
        crate::api::handlers::exercise::exercise_month_summary,
        crate::api::handlers::exercise::delete_exercise_log,

        // Finance endpoints
        crate::api::handlers::finance::list_accounts,
        crate::api::handlers::finance::create_account,
        crate::api::handlers::finance::list_transactions,
        crate::api::handlers::finance::create_transaction,
        crate::api::handlers::finance::delete_transaction,
        crate::api::handlers::finance::list_loans,
        crate::api::handlers::finance::create_loan,
        crate::api::handlers::finance::set_loan_status,
        crate::api::handlers::finance::repay_loan,
        crate::api::handlers::finance::list_repayments,
        crate::api::handlers::finance::delete_loan,
        crate::api::handlers::finance::delete_repayment,
        crate::api::handlers::finance::finance_report,

        // Memo endpoints
        crate::api::handlers::memos::list_memos,
        crate::api::handlers::memos::create_memo,
        crate::api::handlers::memos::set_memo_status,
        crate::api::handlers::memos::delete_memo,
        crate::api::handlers::memos::search_memos,

        // Period endpoints
        crate::api::handlers::periods::predict_cycle,
        crate::api::handlers::periods::list_periods,
        crate::api::handlers::periods::create_period,
        crate::api::handlers::periods::update_period,
        crate::api::handlers::periods::delete_period,

        // Weight endpoints
        crate::api::handlers::weight::weight_overview,
        crate::api::handlers::weight::weight_history,
        crate::api::handlers::weight::record_weight,
        crate::api::handlers::weight::set_height,
        crate::api::handlers::weight::delete_weight,

        // Sex log endpoints
        crate::api::handlers::sex::list_sex_logs,
        crate::api::handlers::sex::save_sex_log,
        crate::api::handlers::sex::delete_sex_log,

        // Admin endpoints
        crate::api::handlers::admin::usage_stats,
        crate::api::handlers::admin::list_users,
        crate::api::handlers::admin::set_admin,
        crate::api::handlers::admin::delete_user
    ),
    components(
        schemas(
            // Envelopes
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::common::CreatedResponse,

            // Request bodies
            crate::entities::auth::RegisterRequest,
            crate::entities::auth::LoginRequest,
            crate::entities::auth::TokenResponse,
            crate::entities::auth::UpdateProfileRequest,
            crate::entities::auth::ChangePasswordRequest,
            crate::entities::auth::SettingsRequest,
            crate::entities::medication::MedicationRequest,
            crate::entities::medication::TakeRequest,
            crate::entities::lookup::EncyclopediaRequest,
            crate::entities::lookup::DiseaseListRequest,
            crate::entities::lookup::KnowledgeSearchRequest,
            crate::entities::stool::StoolRequest,
            crate::entities::daily::ItemRequest,
            crate::entities::daily::LogRequest,
            crate::entities::exercise::ExerciseRequest,
            crate::entities::finance::AccountRequest,
            crate::entities::finance::TransactionRequest,
            crate::entities::finance::LoanRequest,
            crate::entities::finance::LoanStatusRequest,
            crate::entities::finance::RepayRequest,
            crate::entities::memo::MemoRequest,
            crate::entities::memo::MemoStatusRequest,
            crate::entities::period::PeriodRequest,
            crate::entities::period::PeriodPatchRequest,
            crate::entities::weight::WeightRequest,
            crate::entities::weight::HeightRequest,
            crate::entities::sex::SexRequest,
            crate::entities::admin::AdminFlagRequest,

            // Stored rows
            my_health_log_data::models::user::User,
            my_health_log_data::models::user::UsageStats,
            my_health_log_data::models::user::OAuthProvider,
            my_health_log_data::models::medication::Medication,
            my_health_log_data::models::medication::MedicationLog,
            my_health_log_data::models::stool::StoolLog,
            my_health_log_data::models::daily::DailyItem,
            my_health_log_data::models::daily::DailyItemType,
            my_health_log_data::models::daily::DailyLog,
            my_health_log_data::models::exercise::ExerciseLog,
            my_health_log_data::models::finance::Account,
            my_health_log_data::models::finance::Transaction,
            my_health_log_data::models::finance::TransactionType,
            my_health_log_data::models::finance::Loan,
            my_health_log_data::models::finance::LoanType,
            my_health_log_data::models::finance::LoanStatus,
            my_health_log_data::models::finance::LoanRepayment,
            my_health_log_data::models::finance::CategoryTotal,
            my_health_log_data::models::finance::FinanceReport,
            my_health_log_data::models::memo::Memo,
            my_health_log_data::models::memo::MemoPriority,
            my_health_log_data::models::period::MenstrualRecord,
            my_health_log_data::models::weight::WeightLog,
            my_health_log_data::models::sex::SexLog,

            // Computed results
            my_health_log_domain::services::auth::UserProfile,
            my_health_log_domain::services::cycle::CyclePrediction,
            my_health_log_domain::services::cycle::FertileWindow,
            my_health_log_domain::services::showapi::BarcodeProduct,
            my_health_log_domain::services::weight::WeightOverview,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentHealthStatus
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "auth", description = "Registration, login, profile and OAuth sign-in"),
        (name = "medications", description = "Medications, stock and intake logs"),
        (name = "lookup", description = "Barcode and drug encyclopedia lookup"),
        (name = "health-info", description = "Disease and health knowledge lookup"),
        (name = "stool", description = "Stool logs"),
        (name = "daily", description = "Daily check-in items and logs"),
        (name = "exercise", description = "Exercise logs"),
        (name = "finance", description = "Accounts, transactions, loans and repayments"),
        (name = "memos", description = "To-do memos"),
        (name = "periods", description = "Menstrual records and cycle prediction"),
        (name = "weight", description = "Weight and height"),
        (name = "sex", description = "Intimacy logs"),
        (name = "admin", description = "User administration")
    ),
    info(
        title = "MyHealthLog API",
        version = "0.1.0",
        description = "Personal health, habit and household finance tracking",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
