// Expenses and non-fee incomes

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use repositories::LedgerRepository;
pub use services::LedgerService;
