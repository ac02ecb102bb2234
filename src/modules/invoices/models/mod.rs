mod generation;
mod student_invoice;

pub use generation::{GenerationFailure, GenerationSummary, SkipReason};
pub use student_invoice::{InvoiceState, NewStudentInvoice, StudentInvoice};
