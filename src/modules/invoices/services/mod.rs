mod fee_classifier;
mod invoice_generator;

pub use fee_classifier::FeeKind;
pub use invoice_generator::{InvoiceDecision, InvoiceGenerator};
