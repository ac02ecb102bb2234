pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::{DailyCollectionReport, ExpenseReport, IncomeReport, OutstandingReport};
pub use repositories::ReportRepository;
pub use services::ReportService;
