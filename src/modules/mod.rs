pub mod catalog;
pub mod health;
pub mod invoices;
pub mod ledger;
pub mod payments;
pub mod reports;
pub mod students;
