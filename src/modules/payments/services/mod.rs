mod allocation_calculator;
mod payment_service;

pub use allocation_calculator::{AllocationCalculator, AllocationLine, AllocationPlan};
pub use payment_service::PaymentService;
