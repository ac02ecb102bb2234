use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use crate::core::traits::{LedgerStore, StudentLedger};
use crate::core::{AppError, Result};
use crate::modules::catalog::models::{BusStop, Course, FeeHead, FeeStructure, FeeStructureLine};
use crate::modules::catalog::repositories::CatalogRepository;
use crate::modules::invoices::models::{NewStudentInvoice, StudentInvoice};
use crate::modules::invoices::repositories::InvoiceRepository;
use crate::modules::ledger::models::{
    Expense, ExpenseHead, Income, RecordExpenseRequest, RecordIncomeRequest,
};
use crate::modules::ledger::repositories::LedgerRepository;
use crate::modules::payments::models::{
    FeePayment, InvoiceAllocation, NewFeePayment, ReceiptLine,
};
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::reports::models::OutstandingLine;
use crate::modules::reports::repositories::ReportRepository;
use crate::modules::students::models::{NewStudent, Student};
use crate::modules::students::repositories::StudentRepository;

#[derive(Default)]
struct Tables {
    courses: BTreeMap<i64, Course>,
    fee_heads: BTreeMap<i64, FeeHead>,
    fee_structures: BTreeMap<i64, FeeStructure>,
    bus_stops: BTreeMap<i64, BusStop>,
    students: BTreeMap<i64, Student>,
    invoices: BTreeMap<i64, StudentInvoice>,
    payments: BTreeMap<i64, FeePayment>,
    allocations: BTreeMap<i64, InvoiceAllocation>,
    expense_heads: BTreeMap<i64, ExpenseHead>,
    expenses: BTreeMap<i64, Expense>,
    incomes: BTreeMap<i64, Income>,
}

/// Auto-increment counter; like MySQL, ids consumed by a rolled back
/// unit of work are not reused
#[derive(Default)]
struct Sequence(AtomicI64);

impl Sequence {
    fn next(&self) -> i64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[derive(Default)]
struct Sequences {
    courses: Sequence,
    fee_heads: Sequence,
    fee_structures: Sequence,
    bus_stops: Sequence,
    students: Sequence,
    invoices: Sequence,
    payments: Sequence,
    allocations: Sequence,
    expense_heads: Sequence,
    expenses: Sequence,
    incomes: Sequence,
}

struct Inner {
    tables: RwLock<Tables>,
    ids: Sequences,
    student_locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
    lock_timeout: Duration,
}

/// Process-local store implementing every repository trait.
///
/// Committed rows live behind one `RwLock`; a student's fee records are
/// written only through a [`StudentLedger`] holding that student's async
/// mutex, which gives the same isolation as `SELECT ... FOR UPDATE`.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl InMemoryStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                tables: RwLock::new(Tables::default()),
                ids: Sequences::default(),
                student_locks: Mutex::new(HashMap::new()),
                lock_timeout,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.inner
            .tables
            .read()
            .map_err(|_| AppError::internal("In-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .tables
            .write()
            .map_err(|_| AppError::internal("In-memory store lock poisoned"))
    }

    fn student_lock(&self, student_id: i64) -> Result<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self
            .inner
            .student_locks
            .lock()
            .map_err(|_| AppError::internal("Student lock table poisoned"))?;
        Ok(locks
            .entry(student_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone())
    }

    fn student_invoices(tables: &Tables, student_id: i64) -> Vec<StudentInvoice> {
        let mut invoices: Vec<StudentInvoice> = tables
            .invoices
            .values()
            .filter(|invoice| invoice.student_id == student_id)
            .cloned()
            .collect();
        invoices.sort_by_key(StudentInvoice::fifo_key);
        invoices
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn open(&self, student_id: i64) -> Result<Box<dyn StudentLedger>> {
        let exists = self.read()?.students.contains_key(&student_id);
        if !exists {
            return Err(AppError::not_found(format!("Student {}", student_id)));
        }

        let lock = self.student_lock(student_id)?;
        let guard = tokio::time::timeout(self.inner.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                AppError::conflict(format!(
                    "Timed out waiting for the lock on student {}",
                    student_id
                ))
            })?;

        // Re-read under the lock; the row may have changed while waiting
        let (student, invoices) = {
            let tables = self.read()?;
            let student = tables
                .students
                .get(&student_id)
                .cloned()
                .ok_or_else(|| AppError::not_found(format!("Student {}", student_id)))?;
            (student, Self::student_invoices(&tables, student_id))
        };

        debug!(student_id, "Opened in-memory student ledger");

        Ok(Box::new(MemoryLedger {
            store: self.clone(),
            _guard: guard,
            student,
            invoices,
            new_invoices: Vec::new(),
            touched_invoices: Vec::new(),
            payments: Vec::new(),
            allocations: Vec::new(),
            advance_balance: None,
            committed: false,
        }))
    }

    async fn ping(&self) -> Result<()> {
        self.read().map(|_| ())
    }
}

/// Staged unit of work over one student's records
struct MemoryLedger {
    store: InMemoryStore,
    _guard: OwnedMutexGuard<()>,
    student: Student,
    /// Working copy of the student's invoices, staged writes applied
    invoices: Vec<StudentInvoice>,
    new_invoices: Vec<i64>,
    touched_invoices: Vec<i64>,
    payments: Vec<FeePayment>,
    allocations: Vec<InvoiceAllocation>,
    advance_balance: Option<Decimal>,
    committed: bool,
}

impl MemoryLedger {
    fn ensure_open(&self) -> Result<()> {
        if self.committed {
            return Err(AppError::internal("Student ledger already committed"));
        }
        Ok(())
    }
}

#[async_trait]
impl StudentLedger for MemoryLedger {
    fn student(&self) -> &Student {
        &self.student
    }

    async fn invoices(&mut self) -> Result<Vec<StudentInvoice>> {
        Ok(self.invoices.clone())
    }

    async fn unpaid_invoices(&mut self) -> Result<Vec<StudentInvoice>> {
        Ok(self
            .invoices
            .iter()
            .filter(|invoice| !invoice.is_paid)
            .cloned()
            .collect())
    }

    async fn insert_invoice(&mut self, invoice: NewStudentInvoice) -> Result<StudentInvoice> {
        self.ensure_open()?;

        if self
            .invoices
            .iter()
            .any(|existing| existing.fee_head_id == invoice.fee_head_id)
        {
            return Err(AppError::persistence(format!(
                "Student {} already has an invoice for fee head {}",
                invoice.student_id, invoice.fee_head_id
            )));
        }

        let created = StudentInvoice {
            id: self.store.inner.ids.invoices.next(),
            student_id: invoice.student_id,
            fee_head_id: invoice.fee_head_id,
            amount: invoice.amount,
            paid_amount: Decimal::ZERO,
            is_paid: false,
            due_date: Some(invoice.due_date),
            payment_date: None,
            created_at: Utc::now().naive_utc(),
        };

        self.new_invoices.push(created.id);
        self.invoices.push(created.clone());
        self.invoices.sort_by_key(StudentInvoice::fifo_key);
        Ok(created)
    }

    async fn save_invoice_payment(&mut self, invoice: &StudentInvoice) -> Result<()> {
        self.ensure_open()?;

        let slot = self
            .invoices
            .iter_mut()
            .find(|existing| existing.id == invoice.id)
            .ok_or_else(|| AppError::not_found(format!("Invoice {}", invoice.id)))?;

        slot.paid_amount = invoice.paid_amount;
        slot.is_paid = invoice.is_paid;
        slot.payment_date = invoice.payment_date;

        if !self.touched_invoices.contains(&invoice.id) {
            self.touched_invoices.push(invoice.id);
        }
        Ok(())
    }

    async fn insert_payment(&mut self, payment: NewFeePayment) -> Result<FeePayment> {
        self.ensure_open()?;

        let created = FeePayment {
            id: self.store.inner.ids.payments.next(),
            student_id: payment.student_id,
            amount: payment.amount,
            payment_mode: payment.payment_mode,
            payment_date: payment.payment_date,
            remark: payment.remark,
            created_at: Utc::now().naive_utc(),
        };
        self.payments.push(created.clone());
        Ok(created)
    }

    async fn insert_allocation(
        &mut self,
        payment_id: i64,
        invoice_id: i64,
        amount: Decimal,
    ) -> Result<InvoiceAllocation> {
        self.ensure_open()?;

        let allocation = InvoiceAllocation {
            id: self.store.inner.ids.allocations.next(),
            payment_id,
            invoice_id,
            amount,
        };
        self.allocations.push(allocation.clone());
        Ok(allocation)
    }

    async fn save_advance_balance(&mut self, balance: Decimal) -> Result<()> {
        self.ensure_open()?;

        if balance < Decimal::ZERO {
            return Err(AppError::internal(format!(
                "Advance balance of student {} cannot go negative ({})",
                self.student.id, balance
            )));
        }
        self.advance_balance = Some(balance);
        self.student.advance_balance = balance;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;

        let mut tables = self.store.write()?;
        for invoice in &self.invoices {
            if self.new_invoices.contains(&invoice.id) || self.touched_invoices.contains(&invoice.id) {
                tables.invoices.insert(invoice.id, invoice.clone());
            }
        }
        for payment in self.payments.drain(..) {
            tables.payments.insert(payment.id, payment);
        }
        for allocation in self.allocations.drain(..) {
            tables.allocations.insert(allocation.id, allocation);
        }
        if let Some(balance) = self.advance_balance {
            if let Some(student) = tables.students.get_mut(&self.student.id) {
                student.advance_balance = balance;
            }
        }
        drop(tables);

        self.committed = true;
        debug!(student_id = self.student.id, "Committed in-memory student ledger");
        Ok(())
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn create_course(&self, name: &str) -> Result<Course> {
        let course = Course {
            id: self.inner.ids.courses.next(),
            name: name.to_string(),
        };
        self.write()?.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>> {
        Ok(self.read()?.courses.get(&id).cloned())
    }

    async fn create_fee_head(&self, name: &str, description: &str) -> Result<FeeHead> {
        let fee_head = FeeHead {
            id: self.inner.ids.fee_heads.next(),
            name: name.to_string(),
            description: description.to_string(),
        };
        self.write()?.fee_heads.insert(fee_head.id, fee_head.clone());
        Ok(fee_head)
    }

    async fn find_fee_head(&self, id: i64) -> Result<Option<FeeHead>> {
        Ok(self.read()?.fee_heads.get(&id).cloned())
    }

    async fn list_fee_heads(&self) -> Result<Vec<FeeHead>> {
        Ok(self.read()?.fee_heads.values().cloned().collect())
    }

    async fn create_fee_structure(
        &self,
        course_id: i64,
        fee_head_id: i64,
        amount: Decimal,
        installments: i32,
    ) -> Result<FeeStructure> {
        let mut tables = self.write()?;
        if tables
            .fee_structures
            .values()
            .any(|s| s.course_id == course_id && s.fee_head_id == fee_head_id)
        {
            return Err(AppError::DuplicateStructure {
                course_id,
                fee_head_id,
            });
        }

        let structure = FeeStructure {
            id: self.inner.ids.fee_structures.next(),
            course_id,
            fee_head_id,
            amount,
            installments,
        };
        tables.fee_structures.insert(structure.id, structure.clone());
        Ok(structure)
    }

    async fn update_fee_structure(
        &self,
        id: i64,
        amount: Decimal,
        installments: i32,
    ) -> Result<FeeStructure> {
        let mut tables = self.write()?;
        let structure = tables
            .fee_structures
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Fee structure {}", id)))?;
        structure.amount = amount;
        structure.installments = installments;
        Ok(structure.clone())
    }

    async fn find_fee_structure(&self, id: i64) -> Result<Option<FeeStructure>> {
        Ok(self.read()?.fee_structures.get(&id).cloned())
    }

    async fn list_structures_for_course(&self, course_id: i64) -> Result<Vec<FeeStructureLine>> {
        let tables = self.read()?;
        Ok(tables
            .fee_structures
            .values()
            .filter(|s| s.course_id == course_id)
            .filter_map(|s| {
                tables.fee_heads.get(&s.fee_head_id).map(|head| FeeStructureLine {
                    structure: s.clone(),
                    fee_head: head.clone(),
                })
            })
            .collect())
    }

    async fn create_bus_stop(&self, name: &str, route: &str, monthly_fee: Decimal) -> Result<BusStop> {
        let bus_stop = BusStop {
            id: self.inner.ids.bus_stops.next(),
            name: name.to_string(),
            route: route.to_string(),
            monthly_fee,
        };
        self.write()?.bus_stops.insert(bus_stop.id, bus_stop.clone());
        Ok(bus_stop)
    }

    async fn find_bus_stop(&self, id: i64) -> Result<Option<BusStop>> {
        Ok(self.read()?.bus_stops.get(&id).cloned())
    }
}

#[async_trait]
impl StudentRepository for InMemoryStore {
    async fn create(&self, student: NewStudent) -> Result<Student> {
        let created = Student {
            id: self.inner.ids.students.next(),
            course_id: student.course_id,
            name: student.name,
            uses_hostel: student.uses_hostel,
            uses_transport: student.uses_transport,
            bus_stop_id: student.bus_stop_id,
            advance_balance: Decimal::ZERO,
            created_at: Utc::now().naive_utc(),
        };
        self.write()?.students.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>> {
        Ok(self.read()?.students.get(&id).cloned())
    }

    async fn list_ids_by_course(&self, course_id: i64) -> Result<Vec<i64>> {
        Ok(self
            .read()?
            .students
            .values()
            .filter(|s| s.course_id == course_id)
            .map(|s| s.id)
            .collect())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
    async fn list_for_student(&self, student_id: i64) -> Result<Vec<StudentInvoice>> {
        Ok(Self::student_invoices(&*self.read()?, student_id))
    }

    async fn outstanding_for_student(&self, student_id: i64) -> Result<Decimal> {
        Ok(self
            .read()?
            .invoices
            .values()
            .filter(|i| i.student_id == student_id && !i.is_paid)
            .map(|i| i.amount - i.paid_amount)
            .sum())
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<FeePayment>> {
        Ok(self.read()?.payments.get(&id).cloned())
    }

    async fn receipt_lines(&self, payment_id: i64) -> Result<Vec<ReceiptLine>> {
        let tables = self.read()?;
        tables
            .allocations
            .values()
            .filter(|a| a.payment_id == payment_id)
            .map(|a| -> Result<ReceiptLine> {
                let invoice = tables
                    .invoices
                    .get(&a.invoice_id)
                    .ok_or_else(|| AppError::internal(format!("Invoice {} missing", a.invoice_id)))?;
                let fee_head_name = tables
                    .fee_heads
                    .get(&invoice.fee_head_id)
                    .map(|h| h.name.clone())
                    .unwrap_or_default();
                Ok(ReceiptLine {
                    allocation_id: a.id,
                    invoice_id: a.invoice_id,
                    fee_head_id: invoice.fee_head_id,
                    fee_head_name,
                    amount: a.amount,
                })
            })
            .collect()
    }

    async fn allocations_for_invoice(&self, invoice_id: i64) -> Result<Vec<InvoiceAllocation>> {
        Ok(self
            .read()?
            .allocations
            .values()
            .filter(|a| a.invoice_id == invoice_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn create_expense_head(&self, name: &str) -> Result<ExpenseHead> {
        let head = ExpenseHead {
            id: self.inner.ids.expense_heads.next(),
            name: name.to_string(),
        };
        self.write()?.expense_heads.insert(head.id, head.clone());
        Ok(head)
    }

    async fn find_expense_head(&self, id: i64) -> Result<Option<ExpenseHead>> {
        Ok(self.read()?.expense_heads.get(&id).cloned())
    }

    async fn create_expense(&self, expense: &RecordExpenseRequest) -> Result<Expense> {
        let created = Expense {
            id: self.inner.ids.expenses.next(),
            expense_head_id: expense.expense_head_id,
            amount: expense.amount,
            expense_date: expense.expense_date,
            description: expense.description.clone(),
        };
        self.write()?.expenses.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_income(&self, income: &RecordIncomeRequest) -> Result<Income> {
        let created = Income {
            id: self.inner.ids.incomes.next(),
            source: income.source.clone(),
            amount: income.amount,
            income_date: income.income_date,
            description: income.description.clone(),
        };
        self.write()?.incomes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Expense>> {
        let mut expenses: Vec<Expense> = self
            .read()?
            .expenses
            .values()
            .filter(|e| e.expense_date >= start && e.expense_date <= end)
            .cloned()
            .collect();
        expenses.sort_by_key(|e| (e.expense_date, e.id));
        Ok(expenses)
    }

    async fn incomes_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Income>> {
        let mut incomes: Vec<Income> = self
            .read()?
            .incomes
            .values()
            .filter(|i| i.income_date >= start && i.income_date <= end)
            .cloned()
            .collect();
        incomes.sort_by_key(|i| (i.income_date, i.id));
        Ok(incomes)
    }
}

#[async_trait]
impl ReportRepository for InMemoryStore {
    async fn payments_on(&self, date: NaiveDate) -> Result<Vec<FeePayment>> {
        let mut payments: Vec<FeePayment> = self
            .read()?
            .payments
            .values()
            .filter(|p| p.payment_date == date)
            .cloned()
            .collect();
        payments.sort_by_key(|p| (p.created_at, p.id));
        Ok(payments)
    }

    async fn outstanding_lines(&self) -> Result<Vec<OutstandingLine>> {
        let tables = self.read()?;
        let mut unpaid: Vec<&StudentInvoice> =
            tables.invoices.values().filter(|i| !i.is_paid).collect();
        unpaid.sort_by_key(|i| i.fifo_key());

        Ok(unpaid
            .into_iter()
            .map(|invoice| OutstandingLine {
                invoice_id: invoice.id,
                student_id: invoice.student_id,
                student_name: tables
                    .students
                    .get(&invoice.student_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default(),
                fee_head_id: invoice.fee_head_id,
                fee_head_name: tables
                    .fee_heads
                    .get(&invoice.fee_head_id)
                    .map(|h| h.name.clone())
                    .unwrap_or_default(),
                amount: invoice.amount,
                paid_amount: invoice.paid_amount,
                due_date: invoice.due_date,
            })
            .collect())
    }
}
