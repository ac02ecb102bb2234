// Student invoices and their generation from fee structures

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{GenerationSummary, InvoiceState, StudentInvoice};
pub use repositories::InvoiceRepository;
pub use services::{FeeKind, InvoiceGenerator};
