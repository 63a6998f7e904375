use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use super::{contains, InMemoryStorage, StoredAccount, StoredLoan, StoredRepayment, StoredTransaction, Tables};
use crate::models::finance::{
    Account, CategoryTotal, Loan, LoanOutcome, LoanRepayment, LoanStatus, LoanType, NewAccount, NewLoan,
    NewRepayment, NewTransaction, RepaymentOutcome, Transaction, TransactionFilter, TransactionType,
    LOAN_CATEGORY, REPAYMENT_CATEGORY,
};
use crate::models::Money;
use crate::repository::errors::RepositoryError;
use crate::repository::finance::FinanceRepository;

impl Tables {
    fn account_view(&self, account: &StoredAccount) -> Account {
        let movement: Money = self
            .transactions
            .iter()
            .filter(|t| t.account_id == account.id)
            .map(|t| match t.transaction_type.parse::<TransactionType>() {
                Ok(kind) => kind.signed(t.amount),
                Err(_) => Money::ZERO,
            })
            .sum();
        Account {
            id: account.id,
            user_id: account.user_id,
            account_name: account.account_name.clone(),
            initial_balance: account.initial_balance,
            current_balance: account.initial_balance + movement,
        }
    }

    fn transaction_view(&self, transaction: &StoredTransaction) -> Transaction {
        let account_name = self
            .accounts
            .iter()
            .find(|a| a.id == transaction.account_id)
            .map(|a| a.account_name.clone())
            .unwrap_or_default();
        Transaction {
            id: transaction.id,
            user_id: transaction.user_id,
            account_id: transaction.account_id,
            transaction_type: transaction.transaction_type.clone(),
            amount: transaction.amount,
            category: transaction.category.clone(),
            notes: transaction.notes.clone(),
            transaction_date: transaction.transaction_date,
            account_name,
        }
    }

    fn total_repaid(&self, loan_id: i64) -> Money {
        self.repayments
            .iter()
            .filter(|r| r.loan_id == loan_id)
            .map(|r| r.amount)
            .sum()
    }

    fn loan_view(&self, loan: &StoredLoan) -> Loan {
        let total_repaid = self.total_repaid(loan.id);
        Loan {
            id: loan.id,
            user_id: loan.user_id,
            loan_type: loan.loan_type.clone(),
            person_name: loan.person_name.clone(),
            amount: loan.amount,
            notes: loan.notes.clone(),
            loan_date: loan.loan_date,
            status: loan.status.clone(),
            repayment_date: loan.repayment_date,
            total_repaid,
            remaining_amount: loan.amount - total_repaid,
        }
    }

    fn repayment_view(&self, repayment: &StoredRepayment) -> LoanRepayment {
        let account_name = self
            .accounts
            .iter()
            .find(|a| a.id == repayment.account_id)
            .map(|a| a.account_name.clone())
            .unwrap_or_default();
        LoanRepayment {
            id: repayment.id,
            user_id: repayment.user_id,
            loan_id: repayment.loan_id,
            account_id: repayment.account_id,
            amount: repayment.amount,
            repayment_date: repayment.repayment_date,
            transaction_id: repayment.transaction_id,
            account_name,
        }
    }

    fn owns_account(&self, user_id: i64, account_id: i64) -> bool {
        self.accounts.iter().any(|a| a.id == account_id && a.user_id == user_id)
    }

    fn insert_transaction(&mut self, user_id: i64, transaction: NewTransaction) -> i64 {
        let id = self.next_id();
        self.transactions.push(StoredTransaction {
            id,
            user_id,
            account_id: transaction.account_id,
            transaction_type: transaction.transaction_type.as_str().to_string(),
            amount: transaction.amount,
            category: transaction.category,
            notes: transaction.notes,
            transaction_date: transaction.transaction_date,
        });
        id
    }
}

#[async_trait]
impl FinanceRepository for InMemoryStorage {
    async fn list_accounts(&self, user_id: i64) -> Result<Vec<Account>, RepositoryError> {
        let tables = self.lock()?;
        Ok(tables
            .accounts
            .iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| tables.account_view(a))
            .collect())
    }

    async fn create_account(&self, user_id: i64, account: NewAccount) -> Result<Account, RepositoryError> {
        let mut tables = self.lock()?;
        let stored = StoredAccount {
            id: tables.next_id(),
            user_id,
            account_name: account.account_name,
            initial_balance: account.initial_balance,
        };
        let view = tables.account_view(&stored);
        tables.accounts.push(stored);
        Ok(view)
    }

    async fn list_transactions(
        &self,
        user_id: i64,
        filter: TransactionFilter,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let tables = self.lock()?;
        let mut rows: Vec<&StoredTransaction> = tables
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.start_date.map_or(true, |d| t.transaction_date >= d))
            .filter(|t| filter.end_date.map_or(true, |d| t.transaction_date <= d))
            .filter(|t| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |c| contains(t.category.as_deref(), c))
            })
            .collect();
        rows.sort_by(|a, b| b.transaction_date.cmp(&a.transaction_date).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            rows.truncate(limit.max(0) as usize);
        }
        Ok(rows.into_iter().map(|t| tables.transaction_view(t)).collect())
    }

    async fn create_transaction(
        &self,
        user_id: i64,
        transaction: NewTransaction,
    ) -> Result<Option<Transaction>, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.owns_account(user_id, transaction.account_id) {
            return Ok(None);
        }
        let id = tables.insert_transaction(user_id, transaction);
        let view = tables
            .transactions
            .iter()
            .find(|t| t.id == id)
            .map(|t| tables.transaction_view(t));
        Ok(view)
    }

    async fn delete_transaction(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.transactions.len();
        tables.transactions.retain(|t| !(t.id == id && t.user_id == user_id));
        if tables.transactions.len() == before {
            return Ok(false);
        }
        for repayment in tables.repayments.iter_mut().filter(|r| r.transaction_id == Some(id)) {
            repayment.transaction_id = None;
        }
        Ok(true)
    }

    async fn list_loans(&self, user_id: i64) -> Result<Vec<Loan>, RepositoryError> {
        let tables = self.lock()?;
        let mut loans: Vec<Loan> = tables
            .loans
            .iter()
            .filter(|l| l.user_id == user_id)
            .map(|l| tables.loan_view(l))
            .collect();
        let unpaid_first = |status: &str| status != LoanStatus::Unpaid.as_str();
        loans.sort_by(|a, b| {
            unpaid_first(&a.status)
                .cmp(&unpaid_first(&b.status))
                .then(b.loan_date.cmp(&a.loan_date))
                .then(b.id.cmp(&a.id))
        });
        Ok(loans)
    }

    async fn create_loan(&self, user_id: i64, loan: NewLoan) -> Result<LoanOutcome, RepositoryError> {
        let mut tables = self.lock()?;
        if !tables.owns_account(user_id, loan.account_id) {
            return Ok(LoanOutcome::AccountNotFound);
        }

        let stored = StoredLoan {
            id: tables.next_id(),
            user_id,
            loan_type: loan.loan_type.as_str().to_string(),
            person_name: loan.person_name.clone(),
            amount: loan.amount,
            notes: loan.notes,
            loan_date: loan.loan_date,
            status: LoanStatus::Unpaid.as_str().to_string(),
            repayment_date: None,
        };
        tables.insert_transaction(
            user_id,
            NewTransaction {
                account_id: loan.account_id,
                transaction_type: loan.loan_type.opening_transaction(),
                amount: loan.amount,
                category: Some(LOAN_CATEGORY.to_string()),
                notes: Some(loan.loan_type.opening_note(&loan.person_name)),
                transaction_date: loan.loan_date,
            },
        );
        let view = tables.loan_view(&stored);
        tables.loans.push(stored);
        Ok(LoanOutcome::Created(view))
    }

    async fn set_loan_status(&self, user_id: i64, id: i64, status: LoanStatus) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        match tables.loans.iter_mut().find(|l| l.id == id && l.user_id == user_id) {
            Some(loan) => {
                loan.status = status.as_str().to_string();
                loan.repayment_date = match status {
                    LoanStatus::Paid => Some(Utc::now()),
                    LoanStatus::Unpaid => None,
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn repay_loan(
        &self,
        user_id: i64,
        loan_id: i64,
        repayment: NewRepayment,
    ) -> Result<RepaymentOutcome, RepositoryError> {
        let mut tables = self.lock()?;

        let Some(loan) = tables.loans.iter().find(|l| l.id == loan_id && l.user_id == user_id).cloned() else {
            return Ok(RepaymentOutcome::LoanNotFound);
        };
        if loan.status == LoanStatus::Paid.as_str() {
            return Ok(RepaymentOutcome::AlreadyPaid);
        }
        let loan_type: LoanType = loan.loan_type.parse().map_err(RepositoryError::InvalidData)?;
        if !tables.owns_account(user_id, repayment.account_id) {
            return Ok(RepaymentOutcome::AccountNotFound);
        }

        let repaid = tables.total_repaid(loan_id);
        let remaining = loan.amount - repaid;
        if repayment.amount > remaining {
            return Ok(RepaymentOutcome::ExceedsRemaining { remaining });
        }

        let transaction_id = tables.insert_transaction(
            user_id,
            NewTransaction {
                account_id: repayment.account_id,
                transaction_type: loan_type.repayment_transaction(),
                amount: repayment.amount,
                category: Some(REPAYMENT_CATEGORY.to_string()),
                notes: Some(loan_type.repayment_note(&loan.person_name)),
                transaction_date: repayment.repayment_date,
            },
        );
        let stored = StoredRepayment {
            id: tables.next_id(),
            user_id,
            loan_id,
            account_id: repayment.account_id,
            amount: repayment.amount,
            repayment_date: repayment.repayment_date,
            transaction_id: Some(transaction_id),
        };
        let view = tables.repayment_view(&stored);
        tables.repayments.push(stored);

        if repaid + repayment.amount >= loan.amount {
            if let Some(loan) = tables.loans.iter_mut().find(|l| l.id == loan_id) {
                loan.status = LoanStatus::Paid.as_str().to_string();
                loan.repayment_date = Some(Utc::now());
            }
        }
        Ok(RepaymentOutcome::Recorded(view))
    }

    async fn repayments(&self, user_id: i64, loan_id: i64) -> Result<Vec<LoanRepayment>, RepositoryError> {
        let tables = self.lock()?;
        let mut repayments: Vec<LoanRepayment> = tables
            .repayments
            .iter()
            .filter(|r| r.loan_id == loan_id && r.user_id == user_id)
            .map(|r| tables.repayment_view(r))
            .collect();
        repayments.sort_by(|a, b| b.repayment_date.cmp(&a.repayment_date).then(b.id.cmp(&a.id)));
        Ok(repayments)
    }

    async fn delete_loan(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let before = tables.loans.len();
        tables.loans.retain(|l| !(l.id == id && l.user_id == user_id));
        if tables.loans.len() == before {
            return Ok(false);
        }
        tables.repayments.retain(|r| r.loan_id != id);
        Ok(true)
    }

    async fn delete_repayment(&self, user_id: i64, id: i64) -> Result<bool, RepositoryError> {
        let mut tables = self.lock()?;
        let Some(position) = tables.repayments.iter().position(|r| r.id == id && r.user_id == user_id) else {
            return Ok(false);
        };
        let removed = tables.repayments.remove(position);
        if let Some(transaction_id) = removed.transaction_id {
            tables
                .transactions
                .retain(|t| !(t.id == transaction_id && t.user_id == user_id));
        }

        let repaid = tables.total_repaid(removed.loan_id);
        if let Some(loan) = tables.loans.iter_mut().find(|l| l.id == removed.loan_id) {
            if repaid < loan.amount {
                loan.status = LoanStatus::Unpaid.as_str().to_string();
                loan.repayment_date = None;
            }
        }
        Ok(true)
    }

    async fn category_totals(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, RepositoryError> {
        let tables = self.lock()?;
        let mut totals: Vec<CategoryTotal> = Vec::new();
        for t in tables
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id && t.transaction_date >= start && t.transaction_date <= end)
        {
            let category = t.category.clone().unwrap_or_default();
            match totals
                .iter_mut()
                .find(|c| c.category == category && c.transaction_type == t.transaction_type)
            {
                Some(existing) => existing.total += t.amount,
                None => totals.push(CategoryTotal {
                    category,
                    transaction_type: t.transaction_type.clone(),
                    total: t.amount,
                }),
            }
        }
        totals.sort_by(|a, b| b.total.cmp(&a.total));
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    async fn account(storage: &InMemoryStorage, cents: i64) -> Account {
        storage
            .create_account(
                1,
                NewAccount {
                    account_name: "Wallet".to_string(),
                    initial_balance: Money::from_cents(cents),
                },
            )
            .await
            .unwrap()
    }

    async fn lend(storage: &InMemoryStorage, account_id: i64, cents: i64) -> Loan {
        let outcome = storage
            .create_loan(
                1,
                NewLoan {
                    loan_type: LoanType::Lend,
                    person_name: "张三".to_string(),
                    amount: Money::from_cents(cents),
                    notes: None,
                    loan_date: date("2024-04-01"),
                    account_id,
                },
            )
            .await
            .unwrap();
        match outcome {
            LoanOutcome::Created(loan) => loan,
            LoanOutcome::AccountNotFound => panic!("account should exist"),
        }
    }

    fn repayment(account_id: i64, cents: i64) -> NewRepayment {
        NewRepayment {
            amount: Money::from_cents(cents),
            account_id,
            repayment_date: date("2024-04-10"),
        }
    }

    #[tokio::test]
    async fn test_lending_moves_money_out_of_account() {
        let storage = InMemoryStorage::new();
        let wallet = account(&storage, 100_000).await;
        lend(&storage, wallet.id, 30_000).await;

        let accounts = storage.list_accounts(1).await.unwrap();
        assert_eq!(accounts[0].current_balance.cents(), 70_000);

        let ledger = storage.list_transactions(1, TransactionFilter::default()).await.unwrap();
        assert_eq!(ledger[0].category.as_deref(), Some(LOAN_CATEGORY));
        assert_eq!(ledger[0].notes.as_deref(), Some("借出给 张三"));
        assert_eq!(ledger[0].account_name, "Wallet");
    }

    #[tokio::test]
    async fn test_repayments_settle_and_reopen_loan() {
        let storage = InMemoryStorage::new();
        let wallet = account(&storage, 0).await;
        let loan = lend(&storage, wallet.id, 10_000).await;

        let first = storage.repay_loan(1, loan.id, repayment(wallet.id, 4_000)).await.unwrap();
        assert!(matches!(first, RepaymentOutcome::Recorded(_)));

        let over = storage.repay_loan(1, loan.id, repayment(wallet.id, 7_000)).await.unwrap();
        assert!(matches!(over, RepaymentOutcome::ExceedsRemaining { remaining } if remaining.cents() == 6_000));

        let RepaymentOutcome::Recorded(last) = storage.repay_loan(1, loan.id, repayment(wallet.id, 6_000)).await.unwrap()
        else {
            panic!("expected repayment to be recorded");
        };
        let loans = storage.list_loans(1).await.unwrap();
        assert_eq!(loans[0].status, "paid");
        assert_eq!(loans[0].remaining_amount, Money::ZERO);

        let again = storage.repay_loan(1, loan.id, repayment(wallet.id, 1)).await.unwrap();
        assert!(matches!(again, RepaymentOutcome::AlreadyPaid));

        assert!(storage.delete_repayment(1, last.id).await.unwrap());
        let loans = storage.list_loans(1).await.unwrap();
        assert_eq!(loans[0].status, "unpaid");
        assert_eq!(loans[0].total_repaid.cents(), 4_000);
        // -10000 lent, +4000 repaid, the deleted repayment's entry is gone
        assert_eq!(storage.list_accounts(1).await.unwrap()[0].current_balance.cents(), -6_000);
    }

    #[tokio::test]
    async fn test_transaction_limit_and_category_search() {
        let storage = InMemoryStorage::new();
        let wallet = account(&storage, 0).await;
        for i in 0..12 {
            storage
                .create_transaction(
                    1,
                    NewTransaction {
                        account_id: wallet.id,
                        transaction_type: TransactionType::Expense,
                        amount: Money::from_cents(100),
                        category: Some(if i % 2 == 0 { "餐饮" } else { "交通" }.to_string()),
                        notes: None,
                        transaction_date: date("2024-06-01"),
                    },
                )
                .await
                .unwrap();
        }

        let limited = TransactionFilter { limit: Some(10), ..Default::default() };
        assert_eq!(storage.list_transactions(1, limited).await.unwrap().len(), 10);

        let search = TransactionFilter { category: Some("餐".to_string()), ..Default::default() };
        assert_eq!(storage.list_transactions(1, search).await.unwrap().len(), 6);

        let totals = storage.category_totals(1, date("2024-06-01"), date("2024-06-30")).await.unwrap();
        assert_eq!(totals.len(), 2);
        assert!(totals.iter().all(|t| t.total.cents() == 600));
    }

    #[tokio::test]
    async fn test_foreign_account_rejected() {
        let storage = InMemoryStorage::new();
        let wallet = account(&storage, 0).await;
        let outcome = storage
            .create_transaction(
                2,
                NewTransaction {
                    account_id: wallet.id,
                    transaction_type: TransactionType::Income,
                    amount: Money::from_cents(1),
                    category: None,
                    notes: None,
                    transaction_date: date("2024-06-01"),
                },
            )
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
