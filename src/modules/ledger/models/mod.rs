mod expense;
mod income;

pub use expense::{CreateExpenseHeadRequest, Expense, ExpenseHead, RecordExpenseRequest};
pub use income::{Income, RecordIncomeRequest};
