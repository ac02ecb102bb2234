use std::sync::Arc;

use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::catalog::repositories::CatalogRepository;
use crate::modules::students::models::{CreateStudentRequest, NewStudent, Student};
use crate::modules::students::repositories::StudentRepository;

/// Enrolment of students into courses
pub struct StudentService {
    student_repo: Arc<dyn StudentRepository>,
    catalog_repo: Arc<dyn CatalogRepository>,
}

impl StudentService {
    pub fn new(
        student_repo: Arc<dyn StudentRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            student_repo,
            catalog_repo,
        }
    }

    /// Enrol a student with a zero advance balance.
    ///
    /// Invoices are not generated here; callers run invoice generation
    /// for the new student explicitly.
    ///
    /// # Errors
    /// * `Validation` - blank name
    /// * `NotFound` - unknown course or bus stop
    pub async fn create(&self, request: CreateStudentRequest) -> Result<Student> {
        let student = NewStudent::from(request);
        if student.name.is_empty() {
            return Err(AppError::validation("Student name cannot be empty"));
        }

        if self.catalog_repo.find_course(student.course_id).await?.is_none() {
            return Err(AppError::not_found(format!("Course {}", student.course_id)));
        }

        if let Some(bus_stop_id) = student.bus_stop_id {
            if self.catalog_repo.find_bus_stop(bus_stop_id).await?.is_none() {
                return Err(AppError::not_found(format!("Bus stop {}", bus_stop_id)));
            }
        }

        let student = self.student_repo.create(student).await?;

        info!(
            student_id = student.id,
            course_id = student.course_id,
            uses_hostel = student.uses_hostel,
            uses_transport = student.uses_transport,
            "Student enrolled"
        );

        Ok(student)
    }

    pub async fn get(&self, id: i64) -> Result<Student> {
        self.student_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Student {}", id)))
    }
}
