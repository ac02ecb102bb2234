use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::core::Result;
use crate::modules::invoices::models::{NewStudentInvoice, StudentInvoice};
use crate::modules::payments::models::{FeePayment, InvoiceAllocation, NewFeePayment};
use crate::modules::students::models::Student;

/// Opens student-scoped units of work.
///
/// Every write to a student's invoices, payments, allocations or advance
/// balance goes through a [`StudentLedger`], so generation and allocation
/// for the same student serialize while different students run in parallel.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Lock the student and start a unit of work.
    ///
    /// # Errors
    /// * `NotFound` - No such student
    /// * `ConcurrencyConflict` - The lock could not be taken in time
    async fn open(&self, student_id: i64) -> Result<Box<dyn StudentLedger>>;

    /// Check that the backing store answers, for readiness checks
    async fn ping(&self) -> Result<()>;
}

/// A locked, transactional view of one student's fee records.
///
/// Writes become visible to other readers only after [`commit`]. Dropping the
/// ledger without committing discards them and releases the lock.
///
/// [`commit`]: StudentLedger::commit
#[async_trait]
pub trait StudentLedger: Send {
    /// The student row as read under the lock
    fn student(&self) -> &Student;

    /// Every invoice of the student, oldest first
    async fn invoices(&mut self) -> Result<Vec<StudentInvoice>>;

    /// Invoices with `is_paid = false`, ordered by `created_at` then id
    async fn unpaid_invoices(&mut self) -> Result<Vec<StudentInvoice>>;

    async fn insert_invoice(&mut self, invoice: NewStudentInvoice) -> Result<StudentInvoice>;

    /// Persist `paid_amount`, `is_paid` and `payment_date` of an invoice
    async fn save_invoice_payment(&mut self, invoice: &StudentInvoice) -> Result<()>;

    async fn insert_payment(&mut self, payment: NewFeePayment) -> Result<FeePayment>;

    async fn insert_allocation(
        &mut self,
        payment_id: i64,
        invoice_id: i64,
        amount: Decimal,
    ) -> Result<InvoiceAllocation>;

    /// Overwrite the student's advance balance
    async fn save_advance_balance(&mut self, balance: Decimal) -> Result<()>;

    /// Make every staged write visible atomically. Calling it twice is an error.
    async fn commit(&mut self) -> Result<()>;
}
