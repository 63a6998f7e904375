//! Accounts, ledger transactions, loans and repayments
//!
//! Loan bookkeeping lives in the repository's transactions; this service
//! validates inputs and turns the repository outcomes into errors.

use std::sync::Arc;

use chrono::NaiveDate;
use my_health_log_data::models::finance::{
    Account, FinanceReport, Loan, LoanOutcome, LoanRepayment, LoanStatus, NewAccount, NewLoan, NewRepayment,
    NewTransaction, RepaymentOutcome, Transaction, TransactionFilter, TransactionType,
};
use my_health_log_data::models::Money;
use my_health_log_data::repository::FinanceRepository;
use tracing::instrument;

use crate::error::{found, ServiceError};
use crate::services::{date_range, non_blank, trimmed};

/// Transactions returned by an unfiltered listing
pub const RECENT_TRANSACTIONS: i64 = 10;

/// Query parameters of the transaction listing
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    /// `all` lifts the default cap; a positive number replaces it
    pub limit: Option<String>,
}

impl TransactionQuery {
    /// Storage filter: the date range needs both ends, and a search is never capped
    pub fn into_filter(self) -> TransactionFilter {
        let range = self.start_date.zip(self.end_date);
        let category = trimmed(self.category);
        let searching = range.is_some() || category.is_some();

        let limit = match self.limit.as_deref().map(str::trim) {
            _ if searching => None,
            Some("all") => None,
            Some(n) => Some(n.parse::<i64>().ok().filter(|n| *n > 0).unwrap_or(RECENT_TRANSACTIONS)),
            None => Some(RECENT_TRANSACTIONS),
        };

        TransactionFilter {
            start_date: range.map(|(start, _)| start),
            end_date: range.map(|(_, end)| end),
            category,
            limit,
        }
    }
}

#[derive(Clone)]
pub struct FinanceService {
    repository: Arc<dyn FinanceRepository>,
}

impl FinanceService {
    pub fn new(repository: Arc<dyn FinanceRepository>) -> Self {
        Self { repository }
    }

    pub async fn accounts(&self, user_id: i64) -> Result<Vec<Account>, ServiceError> {
        Ok(self.repository.list_accounts(user_id).await?)
    }

    pub async fn create_account(&self, user_id: i64, account: NewAccount) -> Result<Account, ServiceError> {
        let Some(account_name) = non_blank(&account.account_name).map(String::from) else {
            return Err(ServiceError::validation("账户名称不能为空"));
        };
        let account = NewAccount {
            account_name,
            initial_balance: account.initial_balance,
        };
        Ok(self.repository.create_account(user_id, account).await?)
    }

    pub async fn transactions(&self, user_id: i64, query: TransactionQuery) -> Result<Vec<Transaction>, ServiceError> {
        Ok(self.repository.list_transactions(user_id, query.into_filter()).await?)
    }

    pub async fn create_transaction(
        &self,
        user_id: i64,
        transaction: NewTransaction,
    ) -> Result<Transaction, ServiceError> {
        if !transaction.amount.is_positive() {
            return Err(ServiceError::validation("金额必须大于 0"));
        }
        let transaction = NewTransaction {
            category: trimmed(transaction.category),
            notes: trimmed(transaction.notes),
            ..transaction
        };
        self.repository
            .create_transaction(user_id, transaction)
            .await?
            .ok_or_else(|| ServiceError::not_found("账户未找到"))
    }

    pub async fn delete_transaction(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete_transaction(user_id, id).await?, "交易记录未找到")
    }

    pub async fn loans(&self, user_id: i64) -> Result<Vec<Loan>, ServiceError> {
        Ok(self.repository.list_loans(user_id).await?)
    }

    /// Record a loan and its opening transaction on the chosen account
    #[instrument(skip(self))]
    pub async fn create_loan(&self, user_id: i64, loan: NewLoan) -> Result<Loan, ServiceError> {
        let Some(person_name) = non_blank(&loan.person_name).map(String::from) else {
            return Err(ServiceError::validation("对方姓名、金额和关联账户为必填项"));
        };
        if !loan.amount.is_positive() {
            return Err(ServiceError::validation("借贷金额必须大于 0"));
        }
        let loan = NewLoan {
            person_name,
            notes: trimmed(loan.notes),
            ..loan
        };

        match self.repository.create_loan(user_id, loan).await? {
            LoanOutcome::Created(loan) => Ok(loan),
            LoanOutcome::AccountNotFound => Err(ServiceError::not_found("账户未找到")),
        }
    }

    pub async fn set_loan_status(&self, user_id: i64, id: i64, status: LoanStatus) -> Result<(), ServiceError> {
        found(self.repository.set_loan_status(user_id, id, status).await?, "借贷记录未找到")
    }

    /// Record a repayment; the loan is marked paid once fully repaid
    #[instrument(skip(self))]
    pub async fn repay(
        &self,
        user_id: i64,
        loan_id: i64,
        repayment: NewRepayment,
    ) -> Result<LoanRepayment, ServiceError> {
        if !repayment.amount.is_positive() {
            return Err(ServiceError::validation("还款金额必须大于 0"));
        }

        match self.repository.repay_loan(user_id, loan_id, repayment).await? {
            RepaymentOutcome::Recorded(repayment) => Ok(repayment),
            RepaymentOutcome::LoanNotFound => Err(ServiceError::not_found("借贷记录未找到")),
            RepaymentOutcome::AccountNotFound => Err(ServiceError::not_found("账户未找到")),
            RepaymentOutcome::AlreadyPaid => Err(ServiceError::conflict("该借贷已还清，无法重复还款")),
            RepaymentOutcome::ExceedsRemaining { remaining } => Err(ServiceError::validation(format!(
                "还款金额超过剩余未还金额 {}",
                remaining
            ))),
        }
    }

    pub async fn repayments(&self, user_id: i64, loan_id: i64) -> Result<Vec<LoanRepayment>, ServiceError> {
        Ok(self.repository.repayments(user_id, loan_id).await?)
    }

    pub async fn delete_loan(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete_loan(user_id, id).await?, "借贷记录未找到")
    }

    /// Remove a repayment and its ledger entry, reopening the loan if needed
    pub async fn delete_repayment(&self, user_id: i64, id: i64) -> Result<(), ServiceError> {
        found(self.repository.delete_repayment(user_id, id).await?, "还款记录未找到")
    }

    /// Income and expense totals for an inclusive date range
    pub async fn report(
        &self,
        user_id: i64,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<FinanceReport, ServiceError> {
        let (start_date, end_date) = date_range(start, end, "开始日期和结束日期是必填项")?;
        let categories = self.repository.category_totals(user_id, start_date, end_date).await?;

        let total_of = |kind: TransactionType| -> Money {
            categories
                .iter()
                .filter(|c| c.transaction_type == kind.as_str())
                .map(|c| c.total)
                .sum()
        };
        let total_income = total_of(TransactionType::Income);
        let total_expense = total_of(TransactionType::Expense);

        Ok(FinanceReport {
            start_date,
            end_date,
            total_income,
            total_expense,
            net: total_income - total_expense,
            categories,
        })
    }
}
