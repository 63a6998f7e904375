use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction as SqlTransaction};
use tracing::debug;

use super::errors::RepositoryError;
use crate::models::finance::{
    Account, CategoryTotal, Loan, LoanOutcome, LoanRepayment, LoanStatus, LoanType, NewAccount, NewLoan,
    NewRepayment, NewTransaction, RepaymentOutcome, Transaction, TransactionFilter,
    LOAN_CATEGORY, REPAYMENT_CATEGORY,
};
use crate::models::Money;

const ACCOUNT_SELECT: &str = "\
    SELECT a.id, a.user_id, a.account_name, a.initial_balance, \
        CAST(a.initial_balance + COALESCE(SUM(CASE \
            WHEN t.transaction_type = 'income' THEN t.amount \
            WHEN t.transaction_type = 'expense' THEN -t.amount \
            ELSE 0 END), 0) AS SIGNED) AS current_balance \
    FROM accounts a LEFT JOIN transactions t ON t.account_id = a.id";

const ACCOUNT_GROUP: &str = " GROUP BY a.id, a.user_id, a.account_name, a.initial_balance";

const TRANSACTION_SELECT: &str = "\
    SELECT t.id, t.user_id, t.account_id, t.transaction_type, t.amount, t.category, t.notes, \
        t.transaction_date, a.account_name \
    FROM transactions t JOIN accounts a ON t.account_id = a.id";

const LOAN_SELECT: &str = "\
    SELECT l.id, l.user_id, l.loan_type, l.person_name, l.amount, l.notes, l.loan_date, l.status, \
        l.repayment_date, \
        CAST(COALESCE(r.total_repaid, 0) AS SIGNED) AS total_repaid, \
        CAST(l.amount - COALESCE(r.total_repaid, 0) AS SIGNED) AS remaining_amount \
    FROM loans l \
    LEFT JOIN (SELECT loan_id, SUM(amount) AS total_repaid FROM loan_repayments GROUP BY loan_id) r \
        ON r.loan_id = l.id";

const REPAYMENT_SELECT: &str = "\
    SELECT r.id, r.user_id, r.loan_id, r.account_id, r.amount, r.repayment_date, r.transaction_id, \
        a.account_name \
    FROM loan_repayments r JOIN accounts a ON r.account_id = a.id";

/// Repository trait for accounts, the transaction ledger and loans
#[async_trait]
pub trait FinanceRepository: Send + Sync {
    /// Accounts with their derived balances
    async fn list_accounts(&self, user_id: i64) -> Result<Vec<Account>, RepositoryError>;

    async fn create_account(&self, user_id: i64, account: NewAccount) -> Result<Account, RepositoryError>;

    /// Ledger entries, newest first
    async fn list_transactions(
        &self,
        user_id: i64,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, RepositoryError>;

    /// Insert a ledger entry. Returns `None` when the account is not the user's.
    async fn create_transaction(
        &self,
        user_id: i64,
        transaction: NewTransaction,
    ) -> Result<Option<Transaction>, RepositoryError>;

    async fn delete_transaction(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;

    /// Loans with repayment totals, unpaid first then newest loan date
    async fn list_loans(&self, user_id: i64) -> Result<Vec<Loan>, RepositoryError>;

    /// Insert a loan together with the ledger entry that moves its principal
    async fn create_loan(&self, user_id: i64, loan: NewLoan) -> Result<LoanOutcome, RepositoryError>;

    async fn set_loan_status(&self, user_id: i64, id: i64, status: LoanStatus) -> Result<bool, RepositoryError>;

    /// Record a repayment, its ledger entry, and settle the loan when fully repaid
    async fn repay_loan(
        &self,
        user_id: i64,
        loan_id: i64,
        repayment: NewRepayment,
    ) -> Result<RepaymentOutcome, RepositoryError>;

    /// Repayments of one loan, newest first
    async fn repayments(&self, user_id: i64, loan_id: i64) -> Result<Vec<LoanRepayment>, RepositoryError>;

    /// Delete a loan and its repayments
    async fn delete_loan(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;

    /// Delete a repayment and its ledger entry, reopening the loan if needed
    async fn delete_repayment(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError>;

    /// Totals per category and direction inside an inclusive date range
    async fn category_totals(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, RepositoryError>;
}

/// MySQL implementation of [`FinanceRepository`]
#[derive(Debug, Clone)]
pub struct MySqlFinanceRepository {
    pool: MySqlPool,
}

impl MySqlFinanceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn account_owned(
        tx: &mut SqlTransaction<'_, MySql>,
        user_id: i64,
        account_id: i64,
    ) -> Result<bool, RepositoryError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM accounts WHERE id = ? AND user_id = ?")
            .bind(account_id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(found.is_some())
    }

    async fn insert_transaction(
        tx: &mut SqlTransaction<'_, MySql>,
        user_id: i64,
        transaction: &NewTransaction,
    ) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO transactions \
             (user_id, account_id, transaction_type, amount, category, notes, transaction_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(transaction.account_id)
        .bind(transaction.transaction_type.as_str())
        .bind(transaction.amount)
        .bind(&transaction.category)
        .bind(&transaction.notes)
        .bind(transaction.transaction_date)
        .execute(&mut **tx)
        .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn total_repaid(tx: &mut SqlTransaction<'_, MySql>, loan_id: i64) -> Result<Money, RepositoryError> {
        let total: Money = sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(amount), 0) AS SIGNED) FROM loan_repayments WHERE loan_id = ?",
        )
        .bind(loan_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(total)
    }

    async fn find_loan(&self, user_id: i64, id: i64) -> Result<Option<Loan>, RepositoryError> {
        let query = format!("{LOAN_SELECT} WHERE l.id = ? AND l.user_id = ?");
        let loan = sqlx::query_as::<_, Loan>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }
}

#[async_trait]
impl FinanceRepository for MySqlFinanceRepository {
    async fn list_accounts(&self, user_id: i64) -> Result<Vec<Account>, RepositoryError> {
        let query = format!("{ACCOUNT_SELECT} WHERE a.user_id = ?{ACCOUNT_GROUP} ORDER BY a.id ASC");
        let accounts = sqlx::query_as::<_, Account>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    async fn create_account(&self, user_id: i64, account: NewAccount) -> Result<Account, RepositoryError> {
        let result = sqlx::query("INSERT INTO accounts (user_id, account_name, initial_balance) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&account.account_name)
            .bind(account.initial_balance)
            .execute(&self.pool)
            .await?;

        let query = format!("{ACCOUNT_SELECT} WHERE a.id = ?{ACCOUNT_GROUP}");
        let saved = sqlx::query_as::<_, Account>(&query)
            .bind(result.last_insert_id() as i64)
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn list_transactions(
        &self,
        user_id: i64,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(TRANSACTION_SELECT);
        builder.push(" WHERE t.user_id = ");
        builder.push_bind(user_id);

        if let Some(start) = filter.start_date {
            builder.push(" AND t.transaction_date >= ");
            builder.push_bind(start);
        }
        if let Some(end) = filter.end_date {
            builder.push(" AND t.transaction_date <= ");
            builder.push_bind(end);
        }
        if let Some(category) = filter.category {
            builder.push(" AND t.category LIKE ");
            builder.push_bind(format!("%{}%", category));
        }

        builder.push(" ORDER BY t.transaction_date DESC, t.id DESC");

        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let transactions = builder
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;
        Ok(transactions)
    }

    async fn create_transaction(
        &self,
        user_id: i64,
        transaction: NewTransaction,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if !Self::account_owned(&mut tx, user_id, transaction.account_id).await? {
            return Ok(None);
        }
        let id = Self::insert_transaction(&mut tx, user_id, &transaction).await?;

        let query = format!("{TRANSACTION_SELECT} WHERE t.id = ?");
        let saved = sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(saved))
    }

    async fn delete_transaction(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_loans(&self, user_id: i64) -> Result<Vec<Loan>, RepositoryError> {
        let query = format!(
            "{LOAN_SELECT} WHERE l.user_id = ? \
             ORDER BY FIELD(l.status, 'unpaid', 'paid') ASC, l.loan_date DESC, l.id DESC"
        );
        let loans = sqlx::query_as::<_, Loan>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(loans)
    }

    async fn create_loan(&self, user_id: i64, loan: NewLoan) -> Result<LoanOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if !Self::account_owned(&mut tx, user_id, loan.account_id).await? {
            return Ok(LoanOutcome::AccountNotFound);
        }

        let result = sqlx::query(
            "INSERT INTO loans (user_id, loan_type, person_name, amount, notes, loan_date, status) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(loan.loan_type.as_str())
        .bind(&loan.person_name)
        .bind(loan.amount)
        .bind(&loan.notes)
        .bind(loan.loan_date)
        .bind(LoanStatus::Unpaid.as_str())
        .execute(&mut *tx)
        .await?;
        let loan_id = result.last_insert_id() as i64;

        let ledger = NewTransaction {
            account_id: loan.account_id,
            transaction_type: loan.loan_type.opening_transaction(),
            amount: loan.amount,
            category: Some(LOAN_CATEGORY.to_string()),
            notes: Some(loan.loan_type.opening_note(&loan.person_name)),
            transaction_date: loan.loan_date,
        };
        Self::insert_transaction(&mut tx, user_id, &ledger).await?;

        tx.commit().await?;
        debug!("Created loan {} for user {}", loan_id, user_id);

        match self.find_loan(user_id, loan_id).await? {
            Some(saved) => Ok(LoanOutcome::Created(saved)),
            None => Err(RepositoryError::Database(sqlx::Error::RowNotFound)),
        }
    }

    async fn set_loan_status(&self, user_id: i64, id: i64, status: LoanStatus) -> Result<bool, RepositoryError> {
        let query = match status {
            LoanStatus::Paid => "UPDATE loans SET status = ?, repayment_date = CURRENT_TIMESTAMP WHERE id = ? AND user_id = ?",
            LoanStatus::Unpaid => "UPDATE loans SET status = ?, repayment_date = NULL WHERE id = ? AND user_id = ?",
        };
        let result = sqlx::query(query)
            .bind(status.as_str())
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn repay_loan(
        &self,
        user_id: i64,
        loan_id: i64,
        repayment: NewRepayment,
    ) -> Result<RepaymentOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let loan: Option<(String, String, Money, String)> = sqlx::query_as(
            "SELECT loan_type, person_name, amount, status FROM loans WHERE id = ? AND user_id = ? FOR UPDATE",
        )
        .bind(loan_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((loan_type, person_name, principal, status)) = loan else {
            return Ok(RepaymentOutcome::LoanNotFound);
        };
        if status == LoanStatus::Paid.as_str() {
            return Ok(RepaymentOutcome::AlreadyPaid);
        }
        let loan_type: LoanType = loan_type.parse().map_err(RepositoryError::InvalidData)?;

        if !Self::account_owned(&mut tx, user_id, repayment.account_id).await? {
            return Ok(RepaymentOutcome::AccountNotFound);
        }

        let repaid = Self::total_repaid(&mut tx, loan_id).await?;
        let remaining = principal - repaid;
        if repayment.amount > remaining {
            return Ok(RepaymentOutcome::ExceedsRemaining { remaining });
        }

        let ledger = NewTransaction {
            account_id: repayment.account_id,
            transaction_type: loan_type.repayment_transaction(),
            amount: repayment.amount,
            category: Some(REPAYMENT_CATEGORY.to_string()),
            notes: Some(loan_type.repayment_note(&person_name)),
            transaction_date: repayment.repayment_date,
        };
        let transaction_id = Self::insert_transaction(&mut tx, user_id, &ledger).await?;

        let result = sqlx::query(
            "INSERT INTO loan_repayments (user_id, loan_id, account_id, amount, repayment_date, transaction_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(loan_id)
        .bind(repayment.account_id)
        .bind(repayment.amount)
        .bind(repayment.repayment_date)
        .bind(transaction_id)
        .execute(&mut *tx)
        .await?;
        let repayment_id = result.last_insert_id() as i64;

        if repaid + repayment.amount >= principal {
            sqlx::query("UPDATE loans SET status = ?, repayment_date = CURRENT_TIMESTAMP WHERE id = ?")
                .bind(LoanStatus::Paid.as_str())
                .bind(loan_id)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!("{REPAYMENT_SELECT} WHERE r.id = ?");
        let saved = sqlx::query_as::<_, LoanRepayment>(&query)
            .bind(repayment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RepaymentOutcome::Recorded(saved))
    }

    async fn repayments(&self, user_id: i64, loan_id: i64) -> Result<Vec<LoanRepayment>, RepositoryError> {
        let query = format!(
            "{REPAYMENT_SELECT} WHERE r.loan_id = ? AND r.user_id = ? ORDER BY r.repayment_date DESC, r.id DESC"
        );
        let repayments = sqlx::query_as::<_, LoanRepayment>(&query)
            .bind(loan_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(repayments)
    }

    async fn delete_loan(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM loan_repayments WHERE loan_id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM loans WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn delete_repayment(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, Option<i64>)> = sqlx::query_as(
            "SELECT loan_id, transaction_id FROM loan_repayments WHERE id = ? AND user_id = ? FOR UPDATE",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((loan_id, transaction_id)) = row else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM loan_repayments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if let Some(transaction_id) = transaction_id {
            sqlx::query("DELETE FROM transactions WHERE id = ? AND user_id = ?")
                .bind(transaction_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let principal: Money = sqlx::query_scalar("SELECT amount FROM loans WHERE id = ? FOR UPDATE")
            .bind(loan_id)
            .fetch_one(&mut *tx)
            .await?;
        let repaid = Self::total_repaid(&mut tx, loan_id).await?;
        if repaid < principal {
            sqlx::query("UPDATE loans SET status = ?, repayment_date = NULL WHERE id = ?")
                .bind(LoanStatus::Unpaid.as_str())
                .bind(loan_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    async fn category_totals(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, RepositoryError> {
        let totals = sqlx::query_as::<_, CategoryTotal>(
            "SELECT COALESCE(category, '') AS category, transaction_type, \
                CAST(COALESCE(SUM(amount), 0) AS SIGNED) AS total \
             FROM transactions \
             WHERE user_id = ? AND transaction_date BETWEEN ? AND ? \
             GROUP BY COALESCE(category, ''), transaction_type \
             ORDER BY total DESC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }
}

