use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use my_health_log_data::models::finance::{Account, FinanceReport, Loan, LoanRepayment, Transaction};
use my_health_log_domain::auth::AuthUser;
use tracing::instrument;

use super::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::entities::common::{CreatedResponse, DateRangeQuery, MessageResponse};
use crate::entities::finance::{
    AccountRequest, LoanRequest, LoanStatusRequest, RepayRequest, TransactionListQuery, TransactionRequest,
};

/// Accounts with their derived balances
#[utoipa::path(
    get,
    path = "/api/finance/accounts",
    responses((status = 200, description = "Accounts", body = [Account])),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(state.finance.accounts(user.user_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/finance/accounts",
    request_body = AccountRequest,
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 400, description = "Missing name", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn create_account(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<AccountRequest>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let account = state.finance.create_account(user.user_id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Ledger entries, newest first. Unfiltered listings return the 10 most
/// recent unless `limit=all`.
#[utoipa::path(
    get,
    path = "/api/finance/transactions",
    params(TransactionListQuery),
    responses((status = 200, description = "Transactions", body = [Transaction])),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(query): ValidatedQuery<TransactionListQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.finance.transactions(user.user_id, query.into()).await?))
}

#[utoipa::path(
    post,
    path = "/api/finance/transactions",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = Transaction),
        (status = 400, description = "Missing account, type or amount", body = ErrorResponse),
        (status = 404, description = "No such account", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn create_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let transaction = state.finance.create_transaction(user.user_id, request.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

#[utoipa::path(
    delete,
    path = "/api/finance/transactions/{id}",
    params(("id" = i64, Path, description = "Transaction id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such transaction", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<StatusCode> {
    state.finance.delete_transaction(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Loans with repayment progress, unpaid first
#[utoipa::path(
    get,
    path = "/api/finance/loans",
    responses((status = 200, description = "Loans", body = [Loan])),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn list_loans(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Json<Vec<Loan>>> {
    Ok(Json(state.finance.loans(user.user_id).await?))
}

/// Record a loan together with the money leaving or entering an account
#[utoipa::path(
    post,
    path = "/api/finance/loans",
    request_body = LoanRequest,
    responses(
        (status = 201, description = "Loan recorded", body = Loan),
        (status = 400, description = "Missing person, amount or account", body = ErrorResponse),
        (status = 404, description = "No such account", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn create_loan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(request): ValidatedJson<LoanRequest>,
) -> ApiResult<(StatusCode, Json<Loan>)> {
    let loan = state.finance.create_loan(user.user_id, request.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

#[utoipa::path(
    put,
    path = "/api/finance/loans/{id}/status",
    params(("id" = i64, Path, description = "Loan id")),
    request_body = LoanStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = MessageResponse),
        (status = 404, description = "No such loan", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn set_loan_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<LoanStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let status = request.status.ok_or_else(|| ApiError::bad_request("无效的状态值"))?;
    state.finance.set_loan_status(user.user_id, id, status).await?;
    Ok(Json(MessageResponse::new("借贷状态已更新")))
}

/// Repay part or all of a loan
#[utoipa::path(
    post,
    path = "/api/finance/loans/{id}/repay",
    params(("id" = i64, Path, description = "Loan id")),
    request_body = RepayRequest,
    responses(
        (status = 201, description = "Repayment recorded", body = CreatedResponse),
        (status = 400, description = "Missing fields or more than the remaining amount", body = ErrorResponse),
        (status = 404, description = "No such loan or account", body = ErrorResponse),
        (status = 409, description = "Loan already paid", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn repay_loan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
    ValidatedJson(request): ValidatedJson<RepayRequest>,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let repayment = state.finance.repay(user.user_id, id, request.into_new()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: repayment.id,
            message: "还款成功".to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/finance/loans/{id}/repayments",
    params(("id" = i64, Path, description = "Loan id")),
    responses((status = 200, description = "Repayments, newest first", body = [LoanRepayment])),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn list_repayments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<Json<Vec<LoanRepayment>>> {
    Ok(Json(state.finance.repayments(user.user_id, id).await?))
}

/// Delete a loan and its repayments
#[utoipa::path(
    delete,
    path = "/api/finance/loans/{id}",
    params(("id" = i64, Path, description = "Loan id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such loan", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn delete_loan(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<StatusCode> {
    state.finance.delete_loan(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Undo a repayment; the loan reopens if it is no longer fully repaid
#[utoipa::path(
    delete,
    path = "/api/finance/repayments/{id}",
    params(("id" = i64, Path, description = "Repayment id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "No such repayment", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn delete_repayment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedPath(id): ValidatedPath<i64>,
) -> ApiResult<StatusCode> {
    state.finance.delete_repayment(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Income and expense totals for a date range
#[utoipa::path(
    get,
    path = "/api/finance/report",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Totals per type and category", body = FinanceReport),
        (status = 400, description = "Range missing or reversed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "finance"
)]
#[instrument(skip(state))]
pub async fn finance_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(range): ValidatedQuery<DateRangeQuery>,
) -> ApiResult<Json<FinanceReport>> {
    Ok(Json(state.finance.report(user.user_id, range.start_date, range.end_date).await?))
}
