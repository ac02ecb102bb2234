use serde::{Deserialize, Serialize};

/// Why a fee head produced no invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The student already has an invoice for this fee head
    AlreadyInvoiced,
    /// Hostel head for a day scholar
    HostelNotUsed,
    /// Transport head for a student not using transport
    TransportNotUsed,
}

/// A fee head (or whole student) that could not be invoiced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub student_id: i64,
    /// `None` when the failure aborted the whole student
    pub fee_head_id: Option<i64>,
    pub reason: String,
}

/// Tally returned by invoice generation so callers can observe partial
/// failures instead of losing them in a log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Students whose fee heads were examined
    pub students_processed: usize,
    pub created: usize,
    pub skipped_existing: usize,
    pub skipped_not_applicable: usize,
    /// Ids of the invoices created by this run
    pub invoice_ids: Vec<i64>,
    pub failures: Vec<GenerationFailure>,
}

impl GenerationSummary {
    pub fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::AlreadyInvoiced => self.skipped_existing += 1,
            SkipReason::HostelNotUsed | SkipReason::TransportNotUsed => {
                self.skipped_not_applicable += 1
            }
        }
    }

    pub fn record_failure(
        &mut self,
        student_id: i64,
        fee_head_id: Option<i64>,
        reason: impl Into<String>,
    ) {
        self.failures.push(GenerationFailure {
            student_id,
            fee_head_id,
            reason: reason.into(),
        });
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn skipped(&self) -> usize {
        self.skipped_existing + self.skipped_not_applicable
    }

    /// Fold another student's tally into a course-wide one
    pub fn merge(&mut self, other: GenerationSummary) {
        self.students_processed += other.students_processed;
        self.created += other.created;
        self.skipped_existing += other.skipped_existing;
        self.skipped_not_applicable += other.skipped_not_applicable;
        self.invoice_ids.extend(other.invoice_ids);
        self.failures.extend(other.failures);
    }
}
