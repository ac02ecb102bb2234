use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::payments::models::{FeePayment, InvoiceAllocation, ReceiptLine};

/// Committed payment reads. Payments are written only through a student ledger.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<FeePayment>>;

    /// Allocations of a payment joined with the paid fee head, in allocation order
    async fn receipt_lines(&self, payment_id: i64) -> Result<Vec<ReceiptLine>>;

    /// Every allocation made against an invoice
    async fn allocations_for_invoice(&self, invoice_id: i64) -> Result<Vec<InvoiceAllocation>>;
}

pub(crate) const PAYMENT_COLUMNS: &str = r#"
    id, student_id, amount, payment_mode, payment_date, remark, created_at
"#;

/// MySQL implementation of [`PaymentRepository`]
pub struct MySqlPaymentRepository {
    pool: MySqlPool,
}

impl MySqlPaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for MySqlPaymentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<FeePayment>> {
        sqlx::query_as::<_, FeePayment>(&format!(
            "SELECT {} FROM fee_payments WHERE id = ?",
            PAYMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to fetch payment", e))
    }

    async fn receipt_lines(&self, payment_id: i64) -> Result<Vec<ReceiptLine>> {
        sqlx::query_as::<_, ReceiptLine>(
            r#"
            SELECT a.id AS allocation_id, a.invoice_id, i.fee_head_id,
                   h.name AS fee_head_name, a.amount
            FROM invoice_allocations a
            JOIN student_invoices i ON i.id = a.invoice_id
            JOIN fee_heads h ON h.id = i.fee_head_id
            WHERE a.payment_id = ?
            ORDER BY a.id ASC
            "#,
        )
        .bind(payment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to load receipt lines", e))
    }

    async fn allocations_for_invoice(&self, invoice_id: i64) -> Result<Vec<InvoiceAllocation>> {
        sqlx::query_as::<_, InvoiceAllocation>(
            r#"
            SELECT id, payment_id, invoice_id, amount
            FROM invoice_allocations
            WHERE invoice_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to load invoice allocations", e))
    }
}
