use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A transport pickup point; a positive `monthly_fee` replaces the course's
/// generic transport charge for students boarding here
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BusStop {
    pub id: i64,
    pub name: String,
    pub route: String,
    pub monthly_fee: Decimal,
}

impl BusStop {
    /// Stop-specific price, if this stop carries one
    pub fn fee_override(&self) -> Option<Decimal> {
        (self.monthly_fee > Decimal::ZERO).then_some(self.monthly_fee)
    }
}

/// Request body for creating a bus stop
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBusStopRequest {
    pub name: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub monthly_fee: Decimal,
}
