use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{MySql, MySqlPool, Transaction};
use tracing::debug;

use crate::core::traits::{LedgerStore, StudentLedger};
use crate::core::{AppError, Result};
use crate::modules::invoices::models::{NewStudentInvoice, StudentInvoice};
use crate::modules::invoices::repositories::INVOICE_COLUMNS;
use crate::modules::payments::models::{FeePayment, InvoiceAllocation, NewFeePayment};
use crate::modules::students::models::Student;
use crate::modules::students::repositories::STUDENT_COLUMNS;

/// Student-scoped transactions on MySQL
pub struct MySqlLedgerStore {
    pool: MySqlPool,
}

impl MySqlLedgerStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for MySqlLedgerStore {
    async fn open(&self, student_id: i64) -> Result<Box<dyn StudentLedger>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::from_db("Failed to begin transaction", e))?;

        // Row lock serializes generation and allocation for this student
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE id = ? FOR UPDATE",
            STUDENT_COLUMNS
        ))
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to lock student", e))?
        .ok_or_else(|| AppError::not_found(format!("Student {}", student_id)))?;

        debug!(student_id, "Locked student row");

        Ok(Box::new(MySqlLedger {
            tx: Some(tx),
            student,
        }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| AppError::from_db("Database ping failed", e))
    }
}

/// Open transaction holding `FOR UPDATE` on one student row. Dropping it
/// without [`StudentLedger::commit`] rolls back.
struct MySqlLedger {
    tx: Option<Transaction<'static, MySql>>,
    student: Student,
}

impl MySqlLedger {
    fn tx(&mut self) -> Result<&mut Transaction<'static, MySql>> {
        self.tx
            .as_mut()
            .ok_or_else(|| AppError::internal("Student ledger already committed"))
    }

    async fn select_invoices(&mut self, unpaid_only: bool) -> Result<Vec<StudentInvoice>> {
        let student_id = self.student.id;
        let filter = if unpaid_only { "AND is_paid = FALSE" } else { "" };
        let sql = format!(
            "SELECT {} FROM student_invoices WHERE student_id = ? {} ORDER BY created_at ASC, id ASC",
            INVOICE_COLUMNS, filter
        );

        let tx = self.tx()?;
        sqlx::query_as::<_, StudentInvoice>(&sql)
            .bind(student_id)
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| AppError::from_db("Failed to load student invoices", e))
    }
}

#[async_trait]
impl StudentLedger for MySqlLedger {
    fn student(&self) -> &Student {
        &self.student
    }

    async fn invoices(&mut self) -> Result<Vec<StudentInvoice>> {
        self.select_invoices(false).await
    }

    async fn unpaid_invoices(&mut self) -> Result<Vec<StudentInvoice>> {
        self.select_invoices(true).await
    }

    async fn insert_invoice(&mut self, invoice: NewStudentInvoice) -> Result<StudentInvoice> {
        let created_at = Utc::now().naive_utc();
        let tx = self.tx()?;

        let result = sqlx::query(
            r#"
            INSERT INTO student_invoices (
                student_id, fee_head_id, amount, paid_amount, is_paid,
                due_date, payment_date, created_at
            ) VALUES (?, ?, ?, 0, FALSE, ?, NULL, ?)
            "#,
        )
        .bind(invoice.student_id)
        .bind(invoice.fee_head_id)
        .bind(invoice.amount)
        .bind(invoice.due_date)
        .bind(created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_db("Failed to insert student invoice", e))?;

        Ok(StudentInvoice {
            id: result.last_insert_id() as i64,
            student_id: invoice.student_id,
            fee_head_id: invoice.fee_head_id,
            amount: invoice.amount,
            paid_amount: Decimal::ZERO,
            is_paid: false,
            due_date: Some(invoice.due_date),
            payment_date: None,
            created_at,
        })
    }

    async fn save_invoice_payment(&mut self, invoice: &StudentInvoice) -> Result<()> {
        let tx = self.tx()?;

        let result = sqlx::query(
            r#"
            UPDATE student_invoices
            SET paid_amount = ?, is_paid = ?, payment_date = ?
            WHERE id = ?
            "#,
        )
        .bind(invoice.paid_amount)
        .bind(invoice.is_paid)
        .bind(invoice.payment_date)
        .bind(invoice.id)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_db("Failed to update invoice payment", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Invoice {}", invoice.id)));
        }
        Ok(())
    }

    async fn insert_payment(&mut self, payment: NewFeePayment) -> Result<FeePayment> {
        let created_at = Utc::now().naive_utc();
        let tx = self.tx()?;

        let result = sqlx::query(
            r#"
            INSERT INTO fee_payments (
                student_id, amount, payment_mode, payment_date, remark, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.student_id)
        .bind(payment.amount)
        .bind(&payment.payment_mode)
        .bind(payment.payment_date)
        .bind(&payment.remark)
        .bind(created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_db("Failed to insert fee payment", e))?;

        Ok(FeePayment {
            id: result.last_insert_id() as i64,
            student_id: payment.student_id,
            amount: payment.amount,
            payment_mode: payment.payment_mode,
            payment_date: payment.payment_date,
            remark: payment.remark,
            created_at,
        })
    }

    async fn insert_allocation(
        &mut self,
        payment_id: i64,
        invoice_id: i64,
        amount: Decimal,
    ) -> Result<InvoiceAllocation> {
        let tx = self.tx()?;

        let result = sqlx::query(
            "INSERT INTO invoice_allocations (payment_id, invoice_id, amount) VALUES (?, ?, ?)",
        )
        .bind(payment_id)
        .bind(invoice_id)
        .bind(amount)
        .execute(&mut **tx)
        .await
        .map_err(|e| AppError::from_db("Failed to insert invoice allocation", e))?;

        Ok(InvoiceAllocation {
            id: result.last_insert_id() as i64,
            payment_id,
            invoice_id,
            amount,
        })
    }

    async fn save_advance_balance(&mut self, balance: Decimal) -> Result<()> {
        if balance < Decimal::ZERO {
            return Err(AppError::internal(format!(
                "Advance balance of student {} cannot go negative ({})",
                self.student.id, balance
            )));
        }

        let student_id = self.student.id;
        let tx = self.tx()?;
        sqlx::query("UPDATE students SET advance_balance = ? WHERE id = ?")
            .bind(balance)
            .bind(student_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::from_db("Failed to update advance balance", e))?;

        self.student.advance_balance = balance;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| AppError::internal("Student ledger already committed"))?;

        tx.commit()
            .await
            .map_err(|e| AppError::from_db("Failed to commit student ledger", e))?;

        debug!(student_id = self.student.id, "Committed student ledger");
        Ok(())
    }
}
