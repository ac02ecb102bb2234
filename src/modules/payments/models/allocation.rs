use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::FeePayment;

/// The portion of a payment applied to one invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct InvoiceAllocation {
    pub id: i64,
    pub payment_id: i64,
    pub invoice_id: i64,
    pub amount: Decimal,
}

/// Result of recording one payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub payment: FeePayment,
    /// Allocations in the order the invoices were settled (oldest first)
    pub allocations: Vec<InvoiceAllocation>,
    /// Amount credited to the student's advance balance
    pub surplus: Decimal,
}

impl PaymentOutcome {
    pub fn allocated_total(&self) -> Decimal {
        self.allocations.iter().map(|a| a.amount).sum()
    }
}

/// One receipt line: an allocation and the fee head it paid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReceiptLine {
    pub allocation_id: i64,
    pub invoice_id: i64,
    pub fee_head_id: i64,
    pub fee_head_name: String,
    pub amount: Decimal,
}

/// A payment with its allocations, for receipt rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub payment: FeePayment,
    pub lines: Vec<ReceiptLine>,
}

impl PaymentReceipt {
    pub fn allocated_total(&self) -> Decimal {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Part of the payment that went to the advance balance
    pub fn unallocated(&self) -> Decimal {
        self.payment.amount - self.allocated_total()
    }
}
