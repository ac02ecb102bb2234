//! School fee invoicing and payment allocation
//!
//! Generates student invoices from per-course fee structures and applies
//! payments to them oldest first, crediting any surplus to the student's
//! advance balance.

pub mod app;
pub mod config;
pub mod core;
pub mod modules;
pub mod storage;

// Re-export commonly used types
pub use app::AppServices;
pub use modules::invoices;
pub use modules::payments;
pub use storage::{InMemoryStore, Repositories};
