use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::students::models::{NewStudent, Student};

/// Student persistence outside the per-student ledger transaction
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn create(&self, student: NewStudent) -> Result<Student>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>>;

    /// Ids of every student enrolled in a course, ascending
    async fn list_ids_by_course(&self, course_id: i64) -> Result<Vec<i64>>;
}

/// MySQL implementation of [`StudentRepository`]
pub struct MySqlStudentRepository {
    pool: MySqlPool,
}

impl MySqlStudentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

pub(crate) const STUDENT_COLUMNS: &str = r#"
    id, course_id, name, uses_hostel, uses_transport, bus_stop_id,
    advance_balance, created_at
"#;

#[async_trait]
impl StudentRepository for MySqlStudentRepository {
    async fn create(&self, student: NewStudent) -> Result<Student> {
        let created_at = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            INSERT INTO students (
                course_id, name, uses_hostel, uses_transport, bus_stop_id,
                advance_balance, created_at
            ) VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(student.course_id)
        .bind(&student.name)
        .bind(student.uses_hostel)
        .bind(student.uses_transport)
        .bind(student.bus_stop_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to create student", e))?;

        Ok(Student {
            id: result.last_insert_id() as i64,
            course_id: student.course_id,
            name: student.name,
            uses_hostel: student.uses_hostel,
            uses_transport: student.uses_transport,
            bus_stop_id: student.bus_stop_id,
            advance_balance: Decimal::ZERO,
            created_at,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>> {
        sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM students WHERE id = ?",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to fetch student", e))
    }

    async fn list_ids_by_course(&self, course_id: i64) -> Result<Vec<i64>> {
        sqlx::query_scalar::<_, i64>(
            "SELECT id FROM students WHERE course_id = ? ORDER BY id ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to list course students", e))
    }
}
