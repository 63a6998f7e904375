use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use my_health_log_domain::auth::{auth_middleware, authorize::require_admin};
use my_health_log_domain::Services;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::debug;

use crate::api::handlers::{
    admin, auth, daily, exercise, finance, health, lookup, medications, memos, periods, sex, stool, weight, AppState,
};
use crate::openapi::configure_swagger_routes;

/// Create the application router over a fully built set of services
pub fn create_app(services: Services) -> Router {
    debug!("Creating application router");

    let authenticated = middleware::from_fn_with_state(services.tokens.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/:provider", get(auth::oauth_start))
        .route("/:provider/callback", get(auth::oauth_callback))
        .merge(
            Router::new()
                .route("/me", get(auth::me).put(auth::update_me))
                .route("/me/password", put(auth::change_password))
                .route("/me/settings", put(auth::update_settings))
                .route_layer(authenticated.clone()),
        );

    // Static segments before parameters
    let medication_routes = Router::new()
        .route("/", get(medications::list_medications).post(medications::create_medication))
        .route("/logs/:log_id", delete(medications::delete_medication_log))
        .route(
            "/:id",
            put(medications::update_medication).delete(medications::delete_medication),
        )
        .route("/:id/take", post(medications::take_medication))
        .route("/:id/logs", get(medications::medication_logs));

    let medication_lookup_routes = Router::new()
        .route("/lookup/:barcode", get(lookup::lookup_barcode))
        .route("/categories", get(lookup::drug_categories))
        .route("/encyclopedia", post(lookup::drug_encyclopedia));

    let health_info_routes = Router::new()
        .route("/disease/categories", get(lookup::disease_categories))
        .route("/disease/list", post(lookup::disease_list))
        .route("/disease/detail/:id", get(lookup::disease_detail))
        .route("/knowledge/categories", get(lookup::knowledge_categories))
        .route("/knowledge/search", post(lookup::knowledge_search))
        .route("/knowledge/detail/:id", get(lookup::knowledge_detail));

    let stool_routes = Router::new()
        .route("/", get(stool::list_stool_logs).post(stool::create_stool_log))
        .route("/dates", get(stool::stool_dates))
        .route("/summary", get(stool::stool_summary))
        .route("/:id", put(stool::update_stool_log).delete(stool::delete_stool_log));

    let daily_routes = Router::new()
        .route("/items", get(daily::list_items).post(daily::create_item))
        .route("/items/:id", delete(daily::delete_item))
        .route("/items/:id/complete", put(daily::complete_item))
        .route("/logs", post(daily::save_log))
        .route("/logs/:date", get(daily::logs_for_date))
        .route("/history/search", get(daily::search_logs));

    // GET takes a date and DELETE an id in the same segment
    let exercise_routes = Router::new()
        .route("/", post(exercise::create_exercise_log))
        .route("/search", get(exercise::search_exercise_logs))
        .route("/summary/:year/:month", get(exercise::exercise_month_summary))
        .route(
            "/:date",
            get(exercise::exercise_for_date).delete(exercise::delete_exercise_log),
        );

    let finance_routes = Router::new()
        .route("/accounts", get(finance::list_accounts).post(finance::create_account))
        .route(
            "/transactions",
            get(finance::list_transactions).post(finance::create_transaction),
        )
        .route("/transactions/:id", delete(finance::delete_transaction))
        .route("/loans", get(finance::list_loans).post(finance::create_loan))
        .route("/loans/:id", delete(finance::delete_loan))
        .route("/loans/:id/status", put(finance::set_loan_status))
        .route("/loans/:id/repay", post(finance::repay_loan))
        .route("/loans/:id/repayments", get(finance::list_repayments))
        .route("/repayments/:id", delete(finance::delete_repayment))
        .route("/report", get(finance::finance_report));

    let memo_routes = Router::new()
        .route("/", get(memos::list_memos).post(memos::create_memo))
        .route("/history/search", get(memos::search_memos))
        .route("/:id", delete(memos::delete_memo))
        .route("/:id/status", put(memos::set_memo_status));

    let period_routes = Router::new()
        .route("/", get(periods::list_periods).post(periods::create_period))
        .route("/predict", get(periods::predict_cycle))
        .route("/:id", put(periods::update_period).delete(periods::delete_period));

    let weight_routes = Router::new()
        .route("/", get(weight::weight_overview).post(weight::record_weight))
        .route("/history", get(weight::weight_history))
        .route("/height", put(weight::set_height))
        .route("/:id", delete(weight::delete_weight));

    let sex_routes = Router::new()
        .route("/", get(sex::list_sex_logs).post(sex::save_sex_log))
        .route("/:date", delete(sex::delete_sex_log));

    let protected_routes: Router<AppState> = Router::new()
        .nest("/medications", medication_routes)
        .nest("/medication-lookup", medication_lookup_routes)
        .nest("/health-info", health_info_routes)
        .nest("/stool", stool_routes)
        .nest("/daily-logs", daily_routes)
        .nest("/exercise", exercise_routes)
        .nest("/finance", finance_routes)
        .nest("/memos", memo_routes)
        .nest("/periods", period_routes)
        .nest("/weight", weight_routes)
        .nest("/sex", sex_routes)
        .route_layer(authenticated.clone());

    debug!("Protected routes configured");

    // Authentication must happen before authorization
    let admin_routes = Router::new()
        .route("/stats", get(admin::usage_stats))
        .route("/users", get(admin::list_users))
        .route("/users/:id", delete(admin::delete_user))
        .route("/users/:id/admin", put(admin::set_admin))
        .route_layer(middleware::from_fn_with_state(services.users.clone(), require_admin))
        .route_layer(authenticated);

    debug!("Admin routes configured");

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .merge(protected_routes);

    let app = Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .with_state(services)
        .merge(configure_swagger_routes());

    debug!("Routes merged");

    configure_layers(app)
}

/// CORS, security headers and request tracing for the whole application
fn configure_layers(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("camera=(), microphone=(), geolocation=()"),
        ));

    app.layer(cors).layer(security_headers).layer(TraceLayer::new_for_http())
}
