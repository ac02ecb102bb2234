use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::core::{money, AppError, Result};
use crate::modules::invoices::models::StudentInvoice;

/// One step of an allocation walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationLine {
    pub invoice_id: i64,
    pub amount: Decimal,
    /// Whether this step settled the invoice
    pub settled: bool,
}

/// How a payment splits across invoices
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllocationPlan {
    /// Lines in the order they were applied
    pub lines: Vec<AllocationLine>,
    /// Amount left after every open invoice was settled
    pub surplus: Decimal,
}

impl AllocationPlan {
    pub fn allocated(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

/// Oldest-first payment allocation, free of any storage concern
pub struct AllocationCalculator;

impl AllocationCalculator {
    /// Apply `amount` to `invoices` oldest first.
    ///
    /// The slice is sorted by `(created_at, id)` and mutated in place; only a
    /// prefix of it is touched. Already paid invoices are skipped.
    ///
    /// # Arguments
    /// * `amount` - Payment amount (positive, at most 2 decimal places)
    /// * `invoices` - The student's open invoices
    /// * `today` - Date stamped on invoices this payment settles
    ///
    /// # Returns
    /// The plan, where `plan.allocated() + plan.surplus == amount`
    pub fn allocate(
        amount: Decimal,
        invoices: &mut [StudentInvoice],
        today: NaiveDate,
    ) -> Result<AllocationPlan> {
        money::validate_payment_amount(amount)?;

        invoices.sort_by_key(StudentInvoice::fifo_key);

        let mut remaining = amount;
        let mut lines = Vec::new();

        for invoice in invoices.iter_mut() {
            if remaining <= Decimal::ZERO {
                break;
            }
            if invoice.is_paid {
                continue;
            }

            let due = invoice.balance();
            if due <= Decimal::ZERO {
                continue;
            }

            let take = remaining.min(due);
            invoice.apply_payment(take, today)?;
            remaining -= take;

            debug!(
                invoice_id = invoice.id,
                take = %take,
                remaining = %remaining,
                settled = invoice.is_paid,
                "Allocated payment to invoice"
            );

            lines.push(AllocationLine {
                invoice_id: invoice.id,
                amount: take,
                settled: invoice.is_paid,
            });
        }

        let plan = AllocationPlan {
            lines,
            surplus: remaining,
        };

        // Conservation: every unit of the payment is either allocated or surplus
        if plan.allocated() + plan.surplus != amount || plan.surplus < Decimal::ZERO {
            return Err(AppError::internal(format!(
                "Allocation of {} does not balance: allocated {}, surplus {}",
                amount,
                plan.allocated(),
                plan.surplus
            )));
        }

        Ok(plan)
    }
}
