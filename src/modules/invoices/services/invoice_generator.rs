use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use futures_util::stream::{self, StreamExt};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::config::GenerationConfig;
use crate::core::traits::{LedgerStore, StudentLedger};
use crate::core::{money, AppError, Result};
use crate::modules::catalog::models::{BusStop, FeeStructureLine};
use crate::modules::catalog::repositories::CatalogRepository;
use crate::modules::invoices::models::{GenerationSummary, NewStudentInvoice, SkipReason};
use crate::modules::invoices::services::FeeKind;
use crate::modules::students::models::Student;
use crate::modules::students::repositories::StudentRepository;

/// What generation decided for one fee structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvoiceDecision {
    /// Raise an invoice for this amount
    Charge(Decimal),
    Skip(SkipReason),
}

/// Creates invoices from a course's fee structures
pub struct InvoiceGenerator {
    catalog: Arc<dyn CatalogRepository>,
    students: Arc<dyn StudentRepository>,
    ledgers: Arc<dyn LedgerStore>,
    config: GenerationConfig,
}

impl InvoiceGenerator {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        students: Arc<dyn StudentRepository>,
        ledgers: Arc<dyn LedgerStore>,
        config: GenerationConfig,
    ) -> Self {
        Self {
            catalog,
            students,
            ledgers,
            config,
        }
    }

    /// Apply the hostel and transport inclusion rules to one structure.
    ///
    /// # Business Rules
    /// - Hostel heads are skipped for students not using the hostel
    /// - Transport/bus heads are skipped for students not using transport
    /// - A transport user's bus stop fee replaces the structure amount when positive
    pub fn decide(
        student: &Student,
        bus_stop: Option<&BusStop>,
        line: &FeeStructureLine,
    ) -> InvoiceDecision {
        match FeeKind::classify(&line.fee_head.name) {
            FeeKind::Hostel if !student.uses_hostel => {
                InvoiceDecision::Skip(SkipReason::HostelNotUsed)
            }
            FeeKind::Transport if !student.uses_transport => {
                InvoiceDecision::Skip(SkipReason::TransportNotUsed)
            }
            FeeKind::Transport => InvoiceDecision::Charge(
                bus_stop
                    .and_then(BusStop::fee_override)
                    .unwrap_or(line.structure.amount),
            ),
            FeeKind::Hostel | FeeKind::Generic => InvoiceDecision::Charge(line.structure.amount),
        }
    }

    /// Generate the missing invoices of one student.
    ///
    /// Existing (student, fee head) invoices are skipped and never updated,
    /// so re-running is safe. Invalid amounts and duplicated structures are
    /// recorded in the summary and the remaining fee heads still proceed.
    ///
    /// # Errors
    /// * `NotFound` - Unknown student
    /// * `ConcurrencyConflict` - The student is locked by another operation
    /// * `Persistence` - A write failed; nothing was created for the student
    pub async fn for_student(&self, student_id: i64) -> Result<GenerationSummary> {
        let student = self
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {}", student_id)))?;

        let structures = self.catalog.list_structures_for_course(student.course_id).await?;
        let bus_stop = match student.bus_stop_id {
            Some(id) => self.catalog.find_bus_stop(id).await?,
            None => None,
        };

        let mut ledger = self.ledgers.open(student_id).await?;
        let summary = self
            .generate_locked(ledger.as_mut(), bus_stop.as_ref(), &structures)
            .await?;
        ledger.commit().await?;

        info!(
            student_id = student_id,
            created = summary.created,
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Generated student invoices"
        );

        Ok(summary)
    }

    /// Generate invoices for every student of a course.
    ///
    /// Students run concurrently, each in its own unit of work. A student
    /// whose generation fails is recorded as a failure and the others
    /// still complete.
    pub async fn for_course(&self, course_id: i64) -> Result<GenerationSummary> {
        if self.catalog.find_course(course_id).await?.is_none() {
            return Err(AppError::not_found(format!("Course {}", course_id)));
        }

        let student_ids = self.students.list_ids_by_course(course_id).await?;
        info!(
            course_id = course_id,
            students = student_ids.len(),
            concurrency = self.config.concurrency,
            "Generating invoices for course"
        );

        let results: Vec<(i64, Result<GenerationSummary>)> = stream::iter(student_ids)
            .map(|student_id| async move { (student_id, self.for_student(student_id).await) })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut total = GenerationSummary::default();
        for (student_id, result) in results {
            match result {
                Ok(summary) => total.merge(summary),
                Err(e) => {
                    error!(student_id = student_id, error = %e, "Invoice generation failed for student");
                    total.record_failure(student_id, None, e.to_string());
                }
            }
        }

        // Completion order is arbitrary under concurrency
        total.invoice_ids.sort_unstable();
        total.failures.sort_by_key(|f| (f.student_id, f.fee_head_id));

        info!(
            course_id = course_id,
            created = total.created,
            skipped = total.skipped(),
            failed = total.failed(),
            "Course invoice generation finished"
        );

        Ok(total)
    }

    async fn generate_locked(
        &self,
        ledger: &mut dyn StudentLedger,
        bus_stop: Option<&BusStop>,
        structures: &[FeeStructureLine],
    ) -> Result<GenerationSummary> {
        let student = ledger.student().clone();
        let mut invoiced: HashSet<i64> = ledger
            .invoices()
            .await?
            .into_iter()
            .map(|invoice| invoice.fee_head_id)
            .collect();

        let due_date = self.due_date(today());
        let mut summary = GenerationSummary {
            students_processed: 1,
            ..Default::default()
        };
        let mut seen_heads = HashSet::new();

        for line in structures {
            let fee_head_id = line.fee_head.id;

            if !seen_heads.insert(fee_head_id) {
                let duplicate = AppError::DuplicateStructure {
                    course_id: student.course_id,
                    fee_head_id,
                };
                warn!(student_id = student.id, fee_head_id, "Duplicated fee structure skipped");
                summary.record_failure(student.id, Some(fee_head_id), duplicate.to_string());
                continue;
            }

            if invoiced.contains(&fee_head_id) {
                summary.record_skip(SkipReason::AlreadyInvoiced);
                continue;
            }

            let amount = match Self::decide(&student, bus_stop, line) {
                InvoiceDecision::Skip(reason) => {
                    debug!(student_id = student.id, fee_head_id, ?reason, "Fee head not applicable");
                    summary.record_skip(reason);
                    continue;
                }
                InvoiceDecision::Charge(amount) => amount,
            };

            if let Err(e) = money::validate_charge(&line.fee_head.name, amount) {
                warn!(student_id = student.id, fee_head_id, error = %e, "Invalid invoice amount");
                summary.record_failure(student.id, Some(fee_head_id), e.to_string());
                continue;
            }

            let invoice = ledger
                .insert_invoice(NewStudentInvoice {
                    student_id: student.id,
                    fee_head_id,
                    amount,
                    due_date,
                })
                .await?;

            invoiced.insert(fee_head_id);
            summary.created += 1;
            summary.invoice_ids.push(invoice.id);
        }

        Ok(summary)
    }

    fn due_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.config.invoice_due_days)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
