use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::ledger::models::{
    Expense, ExpenseHead, Income, RecordExpenseRequest, RecordIncomeRequest,
};

/// Non-fee money movements
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn create_expense_head(&self, name: &str) -> Result<ExpenseHead>;

    async fn find_expense_head(&self, id: i64) -> Result<Option<ExpenseHead>>;

    async fn create_expense(&self, expense: &RecordExpenseRequest) -> Result<Expense>;

    async fn create_income(&self, income: &RecordIncomeRequest) -> Result<Income>;

    /// Expenses dated within `start..=end`, ordered by date then id
    async fn expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>>;

    /// Incomes dated within `start..=end`, ordered by date then id
    async fn incomes_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Income>>;
}

/// MySQL implementation of [`LedgerRepository`]
pub struct MySqlLedgerRepository {
    pool: MySqlPool,
}

impl MySqlLedgerRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerRepository for MySqlLedgerRepository {
    async fn create_expense_head(&self, name: &str) -> Result<ExpenseHead> {
        let result = sqlx::query("INSERT INTO expense_heads (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to create expense head", e))?;

        Ok(ExpenseHead {
            id: result.last_insert_id() as i64,
            name: name.to_string(),
        })
    }

    async fn find_expense_head(&self, id: i64) -> Result<Option<ExpenseHead>> {
        sqlx::query_as::<_, ExpenseHead>("SELECT id, name FROM expense_heads WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_db("Failed to fetch expense head", e))
    }

    async fn create_expense(&self, expense: &RecordExpenseRequest) -> Result<Expense> {
        let result = sqlx::query(
            r#"
            INSERT INTO expenses (expense_head_id, amount, expense_date, description)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(expense.expense_head_id)
        .bind(expense.amount)
        .bind(expense.expense_date)
        .bind(&expense.description)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to record expense", e))?;

        Ok(Expense {
            id: result.last_insert_id() as i64,
            expense_head_id: expense.expense_head_id,
            amount: expense.amount,
            expense_date: expense.expense_date,
            description: expense.description.clone(),
        })
    }

    async fn create_income(&self, income: &RecordIncomeRequest) -> Result<Income> {
        let result = sqlx::query(
            r#"
            INSERT INTO incomes (source, amount, income_date, description)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&income.source)
        .bind(income.amount)
        .bind(income.income_date)
        .bind(&income.description)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to record income", e))?;

        Ok(Income {
            id: result.last_insert_id() as i64,
            source: income.source.clone(),
            amount: income.amount,
            income_date: income.income_date,
            description: income.description.clone(),
        })
    }

    async fn expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>> {
        sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, expense_head_id, amount, expense_date, description
            FROM expenses
            WHERE expense_date BETWEEN ? AND ?
            ORDER BY expense_date ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to list expenses", e))
    }

    async fn incomes_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Income>> {
        sqlx::query_as::<_, Income>(
            r#"
            SELECT id, source, amount, income_date, description
            FROM incomes
            WHERE income_date BETWEEN ? AND ?
            ORDER BY income_date ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to list incomes", e))
    }
}
