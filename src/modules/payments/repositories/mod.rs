mod payment_repository;

pub(crate) use payment_repository::PAYMENT_COLUMNS;
pub use payment_repository::{MySqlPaymentRepository, PaymentRepository};
