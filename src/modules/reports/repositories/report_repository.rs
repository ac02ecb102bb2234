use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::payments::models::FeePayment;
use crate::modules::payments::repositories::PAYMENT_COLUMNS;
use crate::modules::reports::models::OutstandingLine;

/// Read-only aggregation queries over committed fee data
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Payments dated `date`, in the order they were recorded
    async fn payments_on(&self, date: NaiveDate) -> Result<Vec<FeePayment>>;

    /// Unpaid invoices joined with student and fee head, oldest first
    async fn outstanding_lines(&self) -> Result<Vec<OutstandingLine>>;
}

/// MySQL implementation of [`ReportRepository`]
pub struct MySqlReportRepository {
    pool: MySqlPool,
}

impl MySqlReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for MySqlReportRepository {
    async fn payments_on(&self, date: NaiveDate) -> Result<Vec<FeePayment>> {
        sqlx::query_as::<_, FeePayment>(&format!(
            "SELECT {} FROM fee_payments WHERE payment_date = ? ORDER BY created_at ASC, id ASC",
            PAYMENT_COLUMNS
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to load daily collection", e))
    }

    async fn outstanding_lines(&self) -> Result<Vec<OutstandingLine>> {
        sqlx::query_as::<_, OutstandingLine>(
            r#"
            SELECT i.id AS invoice_id, i.student_id, s.name AS student_name,
                   i.fee_head_id, h.name AS fee_head_name,
                   i.amount, i.paid_amount, i.due_date
            FROM student_invoices i
            JOIN students s ON s.id = i.student_id
            JOIN fee_heads h ON h.id = i.fee_head_id
            WHERE i.is_paid = FALSE
            ORDER BY i.created_at ASC, i.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to load outstanding invoices", e))
    }
}
