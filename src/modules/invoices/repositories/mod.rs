mod invoice_repository;

pub(crate) use invoice_repository::INVOICE_COLUMNS;
pub use invoice_repository::{InvoiceRepository, MySqlInvoiceRepository};
