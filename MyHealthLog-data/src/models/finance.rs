use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::Money;

/// Category written on transactions generated when a loan is opened
pub const LOAN_CATEGORY: &str = "借贷相关";

/// Category written on transactions generated by a repayment
pub const REPAYMENT_CATEGORY: &str = "借贷还款";

/// An account together with its derived balance
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub account_name: String,
    #[schema(value_type = f64)]
    pub initial_balance: Money,
    /// `initial_balance` plus income minus expense
    #[schema(value_type = f64)]
    pub current_balance: Money,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_name: String,
    pub initial_balance: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Signed effect of `amount` on an account balance
    pub fn signed(&self, amount: Money) -> Money {
        match self {
            TransactionType::Income => amount,
            TransactionType::Expense => -amount,
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// Ledger entry joined with its account name
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub account_id: i64,
    pub transaction_type: String,
    #[schema(value_type = f64)]
    pub amount: Money,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: NaiveDate,
    pub account_name: String,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: i64,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub transaction_date: NaiveDate,
}

/// Filters for the transaction list. `limit` of `None` returns every match.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    /// Money lent to someone else
    Lend,
    /// Money borrowed from someone else
    Borrow,
}

impl LoanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanType::Lend => "lend",
            LoanType::Borrow => "borrow",
        }
    }

    /// Ledger direction of the money leaving or entering when the loan opens
    pub fn opening_transaction(&self) -> TransactionType {
        match self {
            LoanType::Lend => TransactionType::Expense,
            LoanType::Borrow => TransactionType::Income,
        }
    }

    /// Ledger direction of a repayment
    pub fn repayment_transaction(&self) -> TransactionType {
        match self {
            LoanType::Lend => TransactionType::Income,
            LoanType::Borrow => TransactionType::Expense,
        }
    }

    pub fn opening_note(&self, person: &str) -> String {
        match self {
            LoanType::Lend => format!("借出给 {}", person),
            LoanType::Borrow => format!("从 {} 借入", person),
        }
    }

    pub fn repayment_note(&self, person: &str) -> String {
        match self {
            LoanType::Lend => format!("收到 {} 的还款", person),
            LoanType::Borrow => format!("向 {} 还款", person),
        }
    }
}

impl std::str::FromStr for LoanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lend" => Ok(LoanType::Lend),
            "borrow" => Ok(LoanType::Borrow),
            other => Err(format!("Unknown loan type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Unpaid,
    Paid,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Unpaid => "unpaid",
            LoanStatus::Paid => "paid",
        }
    }
}

/// A loan with its repayment progress
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub loan_type: String,
    pub person_name: String,
    #[schema(value_type = f64)]
    pub amount: Money,
    pub notes: Option<String>,
    pub loan_date: NaiveDate,
    pub status: String,
    pub repayment_date: Option<DateTime<Utc>>,
    #[schema(value_type = f64)]
    pub total_repaid: Money,
    #[schema(value_type = f64)]
    pub remaining_amount: Money,
}

#[derive(Debug, Clone)]
pub struct NewLoan {
    pub loan_type: LoanType,
    pub person_name: String,
    pub amount: Money,
    pub notes: Option<String>,
    pub loan_date: NaiveDate,
    /// Account the principal is paid from or into
    pub account_id: i64,
}

/// A repayment joined with its account name
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanRepayment {
    pub id: i64,
    pub user_id: i64,
    pub loan_id: i64,
    pub account_id: i64,
    #[schema(value_type = f64)]
    pub amount: Money,
    pub repayment_date: NaiveDate,
    pub transaction_id: Option<i64>,
    pub account_name: String,
}

#[derive(Debug, Clone)]
pub struct NewRepayment {
    pub amount: Money,
    pub account_id: i64,
    pub repayment_date: NaiveDate,
}

/// Result of opening a loan
#[derive(Debug, Clone)]
pub enum LoanOutcome {
    Created(Loan),
    AccountNotFound,
}

/// Result of recording a repayment
#[derive(Debug, Clone)]
pub enum RepaymentOutcome {
    Recorded(LoanRepayment),
    LoanNotFound,
    AccountNotFound,
    AlreadyPaid,
    ExceedsRemaining { remaining: Money },
}

/// Per-category total inside a report
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CategoryTotal {
    pub category: String,
    pub transaction_type: String,
    #[schema(value_type = f64)]
    pub total: Money,
}

/// Income and expense totals over a date range
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinanceReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = f64)]
    pub total_income: Money,
    #[schema(value_type = f64)]
    pub total_expense: Money,
    #[schema(value_type = f64)]
    pub net: Money,
    pub categories: Vec<CategoryTotal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_directions() {
        assert_eq!(LoanType::Lend.opening_transaction(), TransactionType::Expense);
        assert_eq!(LoanType::Lend.repayment_transaction(), TransactionType::Income);
        assert_eq!(LoanType::Borrow.opening_transaction(), TransactionType::Income);
        assert_eq!(LoanType::Borrow.repayment_transaction(), TransactionType::Expense);
    }

    #[test]
    fn test_loan_notes_name_the_counterparty() {
        assert_eq!(LoanType::Lend.opening_note("张三"), "借出给 张三");
        assert_eq!(LoanType::Borrow.repayment_note("李四"), "向 李四 还款");
    }

    #[test]
    fn test_signed_amount() {
        let amount = Money::from_cents(500);
        assert_eq!(TransactionType::Income.signed(amount).cents(), 500);
        assert_eq!(TransactionType::Expense.signed(amount).cents(), -500);
    }
}
