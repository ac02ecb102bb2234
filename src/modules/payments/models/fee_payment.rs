use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Mode recorded when the cashier leaves it blank
pub const DEFAULT_PAYMENT_MODE: &str = "Cash";

/// Money received from a student. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FeePayment {
    pub id: i64,
    pub student_id: i64,
    pub amount: Decimal,
    pub payment_mode: String,
    pub payment_date: NaiveDate,
    pub remark: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Fields needed to insert a payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeePayment {
    pub student_id: i64,
    pub amount: Decimal,
    pub payment_mode: String,
    pub payment_date: NaiveDate,
    pub remark: Option<String>,
}

/// Request body for recording a payment
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPaymentRequest {
    pub student_id: i64,
    pub amount: Decimal,
    #[serde(default)]
    pub payment_mode: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

impl RecordPaymentRequest {
    /// Payment mode with blanks replaced by [`DEFAULT_PAYMENT_MODE`]
    pub fn mode(&self) -> String {
        normalize_mode(self.payment_mode.as_deref())
    }

    /// Remark with surrounding whitespace removed; blank becomes `None`
    pub fn remark(&self) -> Option<String> {
        self.remark
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

pub fn normalize_mode(mode: Option<&str>) -> String {
    match mode.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => DEFAULT_PAYMENT_MODE.to_string(),
    }
}
