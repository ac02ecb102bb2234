// Fault-injecting ledger store
//
// Wraps any ledger store and fails a chosen write inside the student
// ledger, so tests can observe that nothing of the unit of work commits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use school_fees::core::traits::{LedgerStore, StudentLedger};
use school_fees::core::{AppError, Result};
use school_fees::modules::invoices::models::{NewStudentInvoice, StudentInvoice};
use school_fees::modules::payments::models::{FeePayment, InvoiceAllocation, NewFeePayment};
use school_fees::modules::students::models::Student;

/// Which write should fail
#[derive(Debug, Clone, Copy)]
pub enum FailPoint {
    /// The nth allocation insert (1-based) of every ledger
    Allocation(usize),
    /// Any invoice insert for this student
    InvoiceFor(i64),
    /// Advance balance update
    AdvanceBalance,
}

pub struct FailingLedgerStore {
    inner: Arc<dyn LedgerStore>,
    fail_at: FailPoint,
    /// Ledgers opened so far
    pub opened: Arc<AtomicUsize>,
}

impl FailingLedgerStore {
    pub fn new(inner: Arc<dyn LedgerStore>, fail_at: FailPoint) -> Self {
        Self {
            inner,
            fail_at,
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl LedgerStore for FailingLedgerStore {
    async fn open(&self, student_id: i64) -> Result<Box<dyn StudentLedger>> {
        let inner = self.inner.open(student_id).await?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FailingLedger {
            inner,
            fail_at: self.fail_at,
            allocations: 0,
        }))
    }

    async fn ping(&self) -> Result<()> {
        self.inner.ping().await
    }
}

struct FailingLedger {
    inner: Box<dyn StudentLedger>,
    fail_at: FailPoint,
    allocations: usize,
}

fn injected(what: &str) -> AppError {
    AppError::persistence(format!("injected failure: {}", what))
}

#[async_trait]
impl StudentLedger for FailingLedger {
    fn student(&self) -> &Student {
        self.inner.student()
    }

    async fn invoices(&mut self) -> Result<Vec<StudentInvoice>> {
        self.inner.invoices().await
    }

    async fn unpaid_invoices(&mut self) -> Result<Vec<StudentInvoice>> {
        self.inner.unpaid_invoices().await
    }

    async fn insert_invoice(&mut self, invoice: NewStudentInvoice) -> Result<StudentInvoice> {
        if let FailPoint::InvoiceFor(student_id) = self.fail_at {
            if student_id == invoice.student_id {
                return Err(injected("invoice insert"));
            }
        }
        self.inner.insert_invoice(invoice).await
    }

    async fn save_invoice_payment(&mut self, invoice: &StudentInvoice) -> Result<()> {
        self.inner.save_invoice_payment(invoice).await
    }

    async fn insert_payment(&mut self, payment: NewFeePayment) -> Result<FeePayment> {
        self.inner.insert_payment(payment).await
    }

    async fn insert_allocation(
        &mut self,
        payment_id: i64,
        invoice_id: i64,
        amount: Decimal,
    ) -> Result<InvoiceAllocation> {
        self.allocations += 1;
        if let FailPoint::Allocation(n) = self.fail_at {
            if n == self.allocations {
                return Err(injected("allocation insert"));
            }
        }
        self.inner.insert_allocation(payment_id, invoice_id, amount).await
    }

    async fn save_advance_balance(&mut self, balance: Decimal) -> Result<()> {
        if let FailPoint::AdvanceBalance = self.fail_at {
            return Err(injected("advance balance update"));
        }
        self.inner.save_advance_balance(balance).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.inner.commit().await
    }
}
