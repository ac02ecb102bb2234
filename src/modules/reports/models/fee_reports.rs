use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::ledger::models::{Expense, Income};
use crate::modules::payments::models::FeePayment;

/// Fee payments received on one day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCollectionReport {
    pub date: NaiveDate,
    pub payments: Vec<FeePayment>,
    pub total_collection: Decimal,
}

impl DailyCollectionReport {
    pub fn new(date: NaiveDate, payments: Vec<FeePayment>) -> Self {
        let total_collection = payments.iter().map(|p| p.amount).sum();
        Self {
            date,
            payments,
            total_collection,
        }
    }
}

/// Expenses dated within an inclusive range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub expenses: Vec<Expense>,
    pub total_expense: Decimal,
}

impl ExpenseReport {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, expenses: Vec<Expense>) -> Self {
        let total_expense = expenses.iter().map(|e| e.amount).sum();
        Self {
            start_date,
            end_date,
            expenses,
            total_expense,
        }
    }
}

/// Other incomes dated within an inclusive range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub incomes: Vec<Income>,
    pub total_income: Decimal,
}

impl IncomeReport {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, incomes: Vec<Income>) -> Self {
        let total_income = incomes.iter().map(|i| i.amount).sum();
        Self {
            start_date,
            end_date,
            incomes,
            total_income,
        }
    }
}

/// An unpaid invoice with the student and fee head it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OutstandingLine {
    pub invoice_id: i64,
    pub student_id: i64,
    pub student_name: String,
    pub fee_head_id: i64,
    pub fee_head_name: String,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub due_date: Option<NaiveDate>,
}

impl OutstandingLine {
    pub fn balance(&self) -> Decimal {
        self.amount - self.paid_amount
    }
}

/// Every unpaid invoice and the total still owed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutstandingReport {
    pub invoices: Vec<OutstandingLine>,
    pub total_outstanding: Decimal,
}

impl OutstandingReport {
    pub fn new(invoices: Vec<OutstandingLine>) -> Self {
        let total_outstanding = invoices.iter().map(OutstandingLine::balance).sum();
        Self {
            invoices,
            total_outstanding,
        }
    }
}
