use chrono::{Local, NaiveDate};
use my_health_log_data::models::finance::{
    LoanStatus, LoanType, NewAccount, NewLoan, NewRepayment, NewTransaction, TransactionType,
};
use my_health_log_data::models::Money;
use my_health_log_domain::services::finance::TransactionQuery;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::common::{optional_date, optional_i64, optional_text, required};
use crate::api::error::ApiResult;

/// Dates left blank default to today in the server's zone
fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AccountRequest {
    #[validate(required(message = "账户名称不能为空"))]
    pub account_name: Option<String>,

    /// Opening balance, zero when omitted
    #[schema(value_type = Option<f64>)]
    pub initial_balance: Option<Money>,
}

impl From<AccountRequest> for NewAccount {
    fn from(request: AccountRequest) -> Self {
        NewAccount {
            account_name: request.account_name.unwrap_or_default(),
            initial_balance: request.initial_balance.unwrap_or(Money::ZERO),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[param(value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[param(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,

    pub category: Option<String>,

    /// `all`, or the number of recent rows to return (default 10)
    pub limit: Option<String>,
}

impl From<TransactionListQuery> for TransactionQuery {
    fn from(query: TransactionListQuery) -> Self {
        TransactionQuery {
            start_date: query.start_date,
            end_date: query.end_date,
            category: query.category,
            limit: query.limit,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransactionRequest {
    #[serde(default, deserialize_with = "optional_i64::deserialize")]
    #[validate(required(message = "账户、类型和金额为必填项"))]
    pub account_id: Option<i64>,

    #[validate(required(message = "账户、类型和金额为必填项"))]
    pub transaction_type: Option<TransactionType>,

    #[validate(required(message = "账户、类型和金额为必填项"))]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Money>,

    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub category: Option<String>,

    pub notes: Option<String>,

    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub transaction_date: Option<NaiveDate>,
}

impl TransactionRequest {
    pub fn into_new(self) -> ApiResult<NewTransaction> {
        const MISSING: &str = "账户、类型和金额为必填项";
        Ok(NewTransaction {
            account_id: required(self.account_id, MISSING)?,
            transaction_type: required(self.transaction_type, MISSING)?,
            amount: required(self.amount, MISSING)?,
            category: self.category,
            notes: self.notes,
            transaction_date: self.transaction_date.unwrap_or_else(today),
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoanRequest {
    #[validate(required(message = "借贷类型不能为空"))]
    pub loan_type: Option<LoanType>,

    #[validate(required(message = "对方姓名、金额和关联账户为必填项"))]
    pub person_name: Option<String>,

    #[validate(required(message = "对方姓名、金额和关联账户为必填项"))]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Money>,

    pub notes: Option<String>,

    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub loan_date: Option<NaiveDate>,

    /// Account the money leaves or enters
    #[serde(default, deserialize_with = "optional_i64::deserialize")]
    #[validate(required(message = "对方姓名、金额和关联账户为必填项"))]
    pub account_id: Option<i64>,
}

impl LoanRequest {
    pub fn into_new(self) -> ApiResult<NewLoan> {
        const MISSING: &str = "对方姓名、金额和关联账户为必填项";
        Ok(NewLoan {
            loan_type: required(self.loan_type, "借贷类型不能为空")?,
            person_name: self.person_name.unwrap_or_default(),
            amount: required(self.amount, MISSING)?,
            notes: self.notes,
            loan_date: self.loan_date.unwrap_or_else(today),
            account_id: required(self.account_id, MISSING)?,
        })
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoanStatusRequest {
    #[validate(required(message = "无效的状态值"))]
    pub status: Option<LoanStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RepayRequest {
    #[validate(required(message = "还款金额和账户为必填项"))]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Money>,

    #[serde(default, deserialize_with = "optional_i64::deserialize")]
    #[validate(required(message = "还款金额和账户为必填项"))]
    pub account_id: Option<i64>,

    #[serde(default, deserialize_with = "optional_date::deserialize")]
    #[schema(value_type = Option<String>, format = Date)]
    pub repayment_date: Option<NaiveDate>,
}

impl RepayRequest {
    pub fn into_new(self) -> ApiResult<NewRepayment> {
        const MISSING: &str = "还款金额和账户为必填项";
        Ok(NewRepayment {
            amount: required(self.amount, MISSING)?,
            account_id: required(self.account_id, MISSING)?,
            repayment_date: self.repayment_date.unwrap_or_else(today),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_amount_is_parsed_to_cents() {
        let request: TransactionRequest = serde_json::from_str(
            r#"{"account_id":"3","transaction_type":"expense","amount":"12.34","transaction_date":"2024-05-01"}"#,
        )
        .unwrap();
        let transaction = request.into_new().unwrap();
        assert_eq!(transaction.account_id, 3);
        assert_eq!(transaction.amount.cents(), 1234);
        assert_eq!(transaction.transaction_type, TransactionType::Expense);
    }

    #[test]
    fn test_loan_without_account_is_rejected() {
        let request: LoanRequest =
            serde_json::from_str(r#"{"loan_type":"lend","person_name":"小王","amount":100}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_loan_status_is_a_parse_error() {
        assert!(serde_json::from_str::<LoanStatusRequest>(r#"{"status":"forgiven"}"#).is_err());
        let request: LoanStatusRequest = serde_json::from_str(r#"{"status":"paid"}"#).unwrap();
        assert_eq!(request.status, Some(LoanStatus::Paid));
    }
}
