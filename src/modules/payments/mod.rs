// Fee payments and their allocation to invoices

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{FeePayment, InvoiceAllocation, PaymentOutcome};
pub use repositories::PaymentRepository;
pub use services::{AllocationCalculator, PaymentService};
