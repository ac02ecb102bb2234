mod allocation;
mod fee_payment;

pub use allocation::{InvoiceAllocation, PaymentOutcome, PaymentReceipt, ReceiptLine};
pub use fee_payment::{
    normalize_mode, FeePayment, NewFeePayment, RecordPaymentRequest, DEFAULT_PAYMENT_MODE,
};
