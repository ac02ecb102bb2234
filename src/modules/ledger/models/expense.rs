use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Expense category: Salary, Maintenance, Electricity, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ExpenseHead {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: i64,
    pub expense_head_id: i64,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseHeadRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordExpenseRequest {
    pub expense_head_id: i64,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}
