use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::invoices::models::StudentInvoice;

/// Committed invoice reads that need no student lock
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Every invoice of a student ordered by `created_at`, then id
    async fn list_for_student(&self, student_id: i64) -> Result<Vec<StudentInvoice>>;

    /// `Σ (amount - paid_amount)` over the student's unpaid invoices
    async fn outstanding_for_student(&self, student_id: i64) -> Result<Decimal>;
}

pub(crate) const INVOICE_COLUMNS: &str = r#"
    id, student_id, fee_head_id, amount, paid_amount, is_paid,
    due_date, payment_date, created_at
"#;

/// MySQL implementation of [`InvoiceRepository`]
pub struct MySqlInvoiceRepository {
    pool: MySqlPool,
}

impl MySqlInvoiceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceRepository for MySqlInvoiceRepository {
    async fn list_for_student(&self, student_id: i64) -> Result<Vec<StudentInvoice>> {
        sqlx::query_as::<_, StudentInvoice>(&format!(
            "SELECT {} FROM student_invoices WHERE student_id = ? ORDER BY created_at ASC, id ASC",
            INVOICE_COLUMNS
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to list student invoices", e))
    }

    async fn outstanding_for_student(&self, student_id: i64) -> Result<Decimal> {
        let total: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount - paid_amount)
            FROM student_invoices
            WHERE student_id = ? AND is_paid = FALSE
            "#,
        )
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to sum outstanding balance", e))?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
