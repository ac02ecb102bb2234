use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A course (class/programme) students enrol in; fee structures hang off it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub name: String,
}

/// Request body for creating a course
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub name: String,
}
