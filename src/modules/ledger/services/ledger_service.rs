use std::sync::Arc;

use tracing::info;

use crate::core::{money, AppError, Result};
use crate::modules::ledger::models::{
    Expense, ExpenseHead, Income, RecordExpenseRequest, RecordIncomeRequest,
};
use crate::modules::ledger::repositories::LedgerRepository;

/// Records expenses and other incomes
pub struct LedgerService {
    repo: Arc<dyn LedgerRepository>,
}

impl LedgerService {
    pub fn new(repo: Arc<dyn LedgerRepository>) -> Self {
        Self { repo }
    }

    pub async fn add_expense_head(&self, name: &str) -> Result<ExpenseHead> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Expense head name is required"));
        }
        self.repo.create_expense_head(name).await
    }

    /// Record a dated expense against an existing head
    pub async fn record_expense(&self, mut request: RecordExpenseRequest) -> Result<Expense> {
        money::validate_charge("Expense amount", request.amount)?;

        if self
            .repo
            .find_expense_head(request.expense_head_id)
            .await?
            .is_none()
        {
            return Err(AppError::not_found(format!(
                "Expense head {}",
                request.expense_head_id
            )));
        }

        request.description = request.description.trim().to_string();
        let expense = self.repo.create_expense(&request).await?;

        info!(
            expense_id = expense.id,
            expense_head_id = expense.expense_head_id,
            amount = %expense.amount,
            date = %expense.expense_date,
            "Expense recorded"
        );

        Ok(expense)
    }

    pub async fn record_income(&self, mut request: RecordIncomeRequest) -> Result<Income> {
        money::validate_charge("Income amount", request.amount)?;

        request.source = request.source.trim().to_string();
        if request.source.is_empty() {
            return Err(AppError::validation("Income source is required"));
        }
        request.description = request.description.trim().to_string();

        let income = self.repo.create_income(&request).await?;

        info!(
            income_id = income.id,
            source = %income.source,
            amount = %income.amount,
            "Income recorded"
        );

        Ok(income)
    }
}
