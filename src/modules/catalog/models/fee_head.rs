use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named category of charge: Tuition, Admission, Hostel, Bus, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FeeHead {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Request body for creating a fee head
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeeHeadRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}
