use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{AppError, Result};

/// A fee demand raised against one student for one fee head.
///
/// Invariants: `0 <= paid_amount <= amount` and
/// `is_paid <=> paid_amount >= amount`. Only payment allocation changes
/// `paid_amount`, `is_paid` and `payment_date`, and never downwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StudentInvoice {
    pub id: i64,
    pub student_id: i64,
    pub fee_head_id: i64,
    /// Amount demanded
    pub amount: Decimal,
    /// Cumulative amount allocated from payments
    pub paid_amount: Decimal,
    pub is_paid: bool,
    pub due_date: Option<NaiveDate>,
    /// Date of the allocation that settled the invoice
    pub payment_date: Option<NaiveDate>,
    /// Oldest-first allocation key (ties broken by id)
    pub created_at: NaiveDateTime,
}

/// Lifecycle of an invoice, derived from its paid amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceState {
    /// Nothing allocated yet
    Unpaid,
    /// Some but not all of the demand allocated
    PartiallyPaid,
    /// Fully settled (terminal)
    Paid,
}

impl InvoiceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for InvoiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fields needed to raise a new demand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudentInvoice {
    pub student_id: i64,
    pub fee_head_id: i64,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

impl StudentInvoice {
    /// Amount still owed
    pub fn balance(&self) -> Decimal {
        (self.amount - self.paid_amount).max(Decimal::ZERO)
    }

    pub fn state(&self) -> InvoiceState {
        if self.is_paid {
            InvoiceState::Paid
        } else if self.paid_amount > Decimal::ZERO {
            InvoiceState::PartiallyPaid
        } else {
            InvoiceState::Unpaid
        }
    }

    /// Apply part of a payment.
    ///
    /// # Arguments
    /// * `take` - Amount to allocate; must be positive and not exceed the balance
    /// * `on` - Allocation date, recorded as `payment_date` when this settles the invoice
    pub fn apply_payment(&mut self, take: Decimal, on: NaiveDate) -> Result<()> {
        if self.is_paid {
            return Err(AppError::validation(format!(
                "Invoice {} is already paid",
                self.id
            )));
        }

        if take <= Decimal::ZERO {
            return Err(AppError::invalid_amount(format!(
                "Allocation to invoice {} must be positive, got {}",
                self.id, take
            )));
        }

        let due = self.balance();
        if take > due {
            return Err(AppError::validation(format!(
                "Allocation {} exceeds balance {} of invoice {}",
                take, due, self.id
            )));
        }

        self.paid_amount += take;
        if self.paid_amount >= self.amount {
            self.is_paid = true;
            self.payment_date = Some(on);
        }

        Ok(())
    }

    /// Check the paid-amount invariants on a loaded or mutated row
    pub fn check_invariants(&self) -> Result<()> {
        if self.paid_amount < Decimal::ZERO || self.paid_amount > self.amount {
            return Err(AppError::internal(format!(
                "Invoice {} has paid_amount {} outside 0..={}",
                self.id, self.paid_amount, self.amount
            )));
        }

        if self.is_paid != (self.paid_amount >= self.amount) {
            return Err(AppError::internal(format!(
                "Invoice {} is_paid flag disagrees with paid_amount {} of {}",
                self.id, self.paid_amount, self.amount
            )));
        }

        Ok(())
    }

    /// Ordering key used by allocation
    pub fn fifo_key(&self) -> (NaiveDateTime, i64) {
        (self.created_at, self.id)
    }
}
