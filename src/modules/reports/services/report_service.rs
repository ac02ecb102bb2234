use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::ledger::repositories::LedgerRepository;
use crate::modules::reports::models::{
    DailyCollectionReport, ExpenseReport, IncomeReport, OutstandingReport,
};
use crate::modules::reports::repositories::ReportRepository;

/// Service for the accountant's read-only reports
pub struct ReportService {
    report_repo: Arc<dyn ReportRepository>,
    ledger_repo: Arc<dyn LedgerRepository>,
}

impl ReportService {
    pub fn new(report_repo: Arc<dyn ReportRepository>, ledger_repo: Arc<dyn LedgerRepository>) -> Self {
        Self {
            report_repo,
            ledger_repo,
        }
    }

    /// Payments recorded on `date` and their total
    pub async fn daily_collection(&self, date: NaiveDate) -> Result<DailyCollectionReport> {
        let payments = self.report_repo.payments_on(date).await?;
        let report = DailyCollectionReport::new(date, payments);

        info!(
            date = %date,
            payments = report.payments.len(),
            total = %report.total_collection,
            "Daily collection report generated"
        );

        Ok(report)
    }

    /// Expenses with `start_date <= date <= end_date`
    ///
    /// # Errors
    /// Returns `Validation` if `start_date > end_date`
    pub async fn expense_report(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<ExpenseReport> {
        self.validate_date_range(start_date, end_date)?;

        let expenses = self.ledger_repo.expenses_between(start_date, end_date).await?;
        Ok(ExpenseReport::new(start_date, end_date, expenses))
    }

    pub async fn income_report(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<IncomeReport> {
        self.validate_date_range(start_date, end_date)?;

        let incomes = self.ledger_repo.incomes_between(start_date, end_date).await?;
        Ok(IncomeReport::new(start_date, end_date, incomes))
    }

    /// Every unpaid invoice with its balance
    pub async fn outstanding_report(&self) -> Result<OutstandingReport> {
        let lines = self.report_repo.outstanding_lines().await?;
        let report = OutstandingReport::new(lines);

        info!(
            invoices = report.invoices.len(),
            total = %report.total_outstanding,
            "Outstanding fees report generated"
        );

        Ok(report)
    }

    pub fn validate_date_range(&self, start_date: NaiveDate, end_date: NaiveDate) -> Result<()> {
        if start_date > end_date {
            return Err(AppError::validation(format!(
                "start_date ({}) must be before or equal to end_date ({})",
                start_date, end_date
            )));
        }
        Ok(())
    }
}

