use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::AllocationConfig;
use crate::core::traits::LedgerStore;
use crate::core::{money, AppError, Result};
use crate::modules::invoices::models::StudentInvoice;
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::payments::models::{
    NewFeePayment, PaymentOutcome, PaymentReceipt, RecordPaymentRequest,
};
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::payments::services::AllocationCalculator;
use crate::modules::students::repositories::StudentRepository;

/// Records payments and answers balance queries
pub struct PaymentService {
    ledgers: Arc<dyn LedgerStore>,
    students: Arc<dyn StudentRepository>,
    invoices: Arc<dyn InvoiceRepository>,
    payments: Arc<dyn PaymentRepository>,
    config: AllocationConfig,
}

impl PaymentService {
    pub fn new(
        ledgers: Arc<dyn LedgerStore>,
        students: Arc<dyn StudentRepository>,
        invoices: Arc<dyn InvoiceRepository>,
        payments: Arc<dyn PaymentRepository>,
        config: AllocationConfig,
    ) -> Self {
        Self {
            ledgers,
            students,
            invoices,
            payments,
            config,
        }
    }

    /// Record a payment and allocate it across the student's unpaid invoices.
    ///
    /// # Business Rules
    /// - The amount must be positive with at most two decimal places
    /// - Invoices are settled oldest first (`created_at`, then id)
    /// - Whatever is left after every invoice is settled goes to the advance balance
    /// - The payment, its allocations, the invoice updates and the balance
    ///   change commit together or not at all
    /// - Lock contention is retried with exponential backoff before the
    ///   retryable `ConcurrencyConflict` is returned
    pub async fn record_payment(&self, request: RecordPaymentRequest) -> Result<PaymentOutcome> {
        money::validate_payment_amount(request.amount)?;

        let mut attempt: u32 = 0;
        loop {
            match self.try_record(&request, today()).await {
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let backoff = self.backoff(attempt);
                    attempt += 1;
                    warn!(
                        student_id = request.student_id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Payment allocation contended, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    warn!(student_id = request.student_id, error = %e, "Payment not recorded");
                    return Err(e);
                }
                Ok(outcome) => return Ok(outcome),
            }
        }
    }

    async fn try_record(
        &self,
        request: &RecordPaymentRequest,
        today: NaiveDate,
    ) -> Result<PaymentOutcome> {
        let mut ledger = self.ledgers.open(request.student_id).await?;
        let advance_balance = ledger.student().advance_balance;

        let payment = ledger
            .insert_payment(NewFeePayment {
                student_id: request.student_id,
                amount: request.amount,
                payment_mode: request.mode(),
                payment_date: today,
                remark: request.remark(),
            })
            .await?;

        let mut open = ledger.unpaid_invoices().await?;
        let plan = AllocationCalculator::allocate(payment.amount, &mut open, today)?;

        let mut allocations = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let invoice = open
                .iter()
                .find(|invoice| invoice.id == line.invoice_id)
                .ok_or_else(|| {
                    AppError::internal(format!("Allocated invoice {} vanished", line.invoice_id))
                })?;
            invoice.check_invariants()?;

            ledger.save_invoice_payment(invoice).await?;
            allocations.push(
                ledger
                    .insert_allocation(payment.id, invoice.id, line.amount)
                    .await?,
            );
        }

        if plan.surplus > Decimal::ZERO {
            let balance = advance_balance + plan.surplus;
            money::validate_amount(balance).map_err(|e| {
                AppError::invalid_amount(format!("advance balance would overflow: {}", e))
            })?;
            ledger.save_advance_balance(balance).await?;
        }

        ledger.commit().await?;

        info!(
            payment_id = payment.id,
            student_id = payment.student_id,
            amount = %payment.amount,
            allocations = allocations.len(),
            surplus = %plan.surplus,
            "Payment recorded"
        );

        Ok(PaymentOutcome {
            payment,
            allocations,
            surplus: plan.surplus,
        })
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.config.retry_backoff_ms.saturating_mul(factor))
    }

    /// Sum still owed across the student's unpaid invoices
    pub async fn outstanding_balance(&self, student_id: i64) -> Result<Decimal> {
        self.require_student(student_id).await?;
        self.invoices.outstanding_for_student(student_id).await
    }

    /// Invoices of a student, oldest first
    pub async fn list_student_invoices(&self, student_id: i64) -> Result<Vec<StudentInvoice>> {
        self.require_student(student_id).await?;
        self.invoices.list_for_student(student_id).await
    }

    /// A payment with the invoices it paid
    pub async fn get_receipt(&self, payment_id: i64) -> Result<PaymentReceipt> {
        let payment = self
            .payments
            .find_by_id(payment_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {}", payment_id)))?;

        let lines = self.payments.receipt_lines(payment_id).await?;

        Ok(PaymentReceipt { payment, lines })
    }

    async fn require_student(&self, student_id: i64) -> Result<()> {
        self.students
            .find_by_id(student_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Student {}", student_id)))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
