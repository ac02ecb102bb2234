use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Money received from anything other than fees (donations, rent, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Income {
    pub id: i64,
    pub source: String,
    pub amount: Decimal,
    pub income_date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordIncomeRequest {
    pub source: String,
    pub amount: Decimal,
    pub income_date: NaiveDate,
    #[serde(default)]
    pub description: String,
}
