//! Storage backends behind the repository traits

mod memory;
mod mysql;

use std::sync::Arc;

use sqlx::MySqlPool;

use crate::core::traits::LedgerStore;
use crate::modules::catalog::repositories::{CatalogRepository, MySqlCatalogRepository};
use crate::modules::invoices::repositories::{InvoiceRepository, MySqlInvoiceRepository};
use crate::modules::ledger::repositories::{LedgerRepository, MySqlLedgerRepository};
use crate::modules::payments::repositories::{MySqlPaymentRepository, PaymentRepository};
use crate::modules::reports::repositories::{MySqlReportRepository, ReportRepository};
use crate::modules::students::repositories::{MySqlStudentRepository, StudentRepository};

pub use memory::InMemoryStore;
pub use mysql::MySqlLedgerStore;

/// Every repository the services need, as injectable trait objects
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub students: Arc<dyn StudentRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub ledger: Arc<dyn LedgerRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub ledgers: Arc<dyn LedgerStore>,
}

impl Repositories {
    pub fn mysql(pool: MySqlPool) -> Self {
        Self {
            catalog: Arc::new(MySqlCatalogRepository::new(pool.clone())),
            students: Arc::new(MySqlStudentRepository::new(pool.clone())),
            invoices: Arc::new(MySqlInvoiceRepository::new(pool.clone())),
            payments: Arc::new(MySqlPaymentRepository::new(pool.clone())),
            ledger: Arc::new(MySqlLedgerRepository::new(pool.clone())),
            reports: Arc::new(MySqlReportRepository::new(pool.clone())),
            ledgers: Arc::new(MySqlLedgerStore::new(pool)),
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            catalog: Arc::new(store.clone()),
            students: Arc::new(store.clone()),
            invoices: Arc::new(store.clone()),
            payments: Arc::new(store.clone()),
            ledger: Arc::new(store.clone()),
            reports: Arc::new(store.clone()),
            ledgers: Arc::new(store),
        }
    }
}
