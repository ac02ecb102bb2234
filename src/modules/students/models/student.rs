use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A student as seen by the fee engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub uses_hostel: bool,
    pub uses_transport: bool,
    pub bus_stop_id: Option<i64>,
    /// Unapplied payment surplus. Never negative; written only by payment
    /// allocation while the student is locked.
    pub advance_balance: Decimal,
    pub created_at: NaiveDateTime,
}

/// Request body for enrolling a student
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    pub course_id: i64,
    pub name: String,
    #[serde(default)]
    pub uses_hostel: bool,
    #[serde(default)]
    pub uses_transport: bool,
    #[serde(default)]
    pub bus_stop_id: Option<i64>,
}

/// Fields a repository needs to insert a student
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub course_id: i64,
    pub name: String,
    pub uses_hostel: bool,
    pub uses_transport: bool,
    pub bus_stop_id: Option<i64>,
}

impl From<CreateStudentRequest> for NewStudent {
    fn from(request: CreateStudentRequest) -> Self {
        Self {
            course_id: request.course_id,
            name: request.name.trim().to_string(),
            uses_hostel: request.uses_hostel,
            uses_transport: request.uses_transport,
            bus_stop_id: request.bus_stop_id,
        }
    }
}
