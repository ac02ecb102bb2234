use std::sync::Arc;

use actix_web::web;

use crate::config::{AllocationConfig, GenerationConfig};
use crate::core::traits::LedgerStore;
use crate::modules::catalog::CatalogService;
use crate::modules::invoices::InvoiceGenerator;
use crate::modules::ledger::LedgerService;
use crate::modules::payments::PaymentService;
use crate::modules::reports::ReportService;
use crate::modules::students::StudentService;
use crate::modules::{catalog, health, invoices, ledger, payments, reports, students};
use crate::storage::Repositories;

/// Services shared by every HTTP worker
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<CatalogService>,
    pub students: Arc<StudentService>,
    pub generator: Arc<InvoiceGenerator>,
    pub payments: Arc<PaymentService>,
    pub ledger: Arc<LedgerService>,
    pub reports: Arc<ReportService>,
    pub store: Arc<dyn LedgerStore>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        allocation: AllocationConfig,
        generation: GenerationConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(repos.catalog.clone())),
            students: Arc::new(StudentService::new(
                repos.students.clone(),
                repos.catalog.clone(),
            )),
            generator: Arc::new(InvoiceGenerator::new(
                repos.catalog.clone(),
                repos.students.clone(),
                repos.ledgers.clone(),
                generation,
            )),
            payments: Arc::new(PaymentService::new(
                repos.ledgers.clone(),
                repos.students.clone(),
                repos.invoices.clone(),
                repos.payments.clone(),
                allocation,
            )),
            ledger: Arc::new(LedgerService::new(repos.ledger.clone())),
            reports: Arc::new(ReportService::new(repos.reports.clone(), repos.ledger)),
            store: repos.ledgers,
        }
    }

    /// Register shared state and every route
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.students.clone()))
            .app_data(web::Data::new(self.generator.clone()))
            .app_data(web::Data::new(self.payments.clone()))
            .app_data(web::Data::new(self.ledger.clone()))
            .app_data(web::Data::new(self.reports.clone()))
            .app_data(web::Data::new(self.store.clone()))
            .configure(health::controllers::configure)
            .configure(catalog::controllers::configure)
            .configure(students::controllers::configure)
            .configure(invoices::controllers::configure)
            .configure(payments::controllers::configure)
            .configure(ledger::controllers::configure)
            .configure(reports::controllers::configure);
    }
}
