use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::warn;

use crate::core::error::AppError;
use crate::modules::invoices::models::GenerationSummary;
use crate::modules::invoices::services::InvoiceGenerator;
use crate::modules::students::models::{CreateStudentRequest, Student};
use crate::modules::students::services::StudentService;

/// A newly enrolled student and the invoices raised for them
#[derive(Debug, Serialize)]
pub struct EnrolmentResponse {
    pub student: Student,
    /// `None` when generation failed; the student stays enrolled and
    /// generation can be re-run
    pub generation: Option<GenerationSummary>,
    pub generation_error: Option<String>,
}

/// POST /students
/// Enrols the student, then runs invoice generation for them
pub async fn create_student(
    students: web::Data<Arc<StudentService>>,
    generator: web::Data<Arc<InvoiceGenerator>>,
    request: web::Json<CreateStudentRequest>,
) -> Result<HttpResponse, AppError> {
    let student = students.create(request.into_inner()).await?;

    let response = match generator.for_student(student.id).await {
        Ok(summary) => EnrolmentResponse {
            student,
            generation: Some(summary),
            generation_error: None,
        },
        Err(e) => {
            warn!(student_id = student.id, error = %e, "Invoice generation after enrolment failed");
            EnrolmentResponse {
                student,
                generation: None,
                generation_error: Some(e.to_string()),
            }
        }
    };

    Ok(HttpResponse::Created().json(response))
}

/// GET /students/{id}
pub async fn get_student(
    students: web::Data<Arc<StudentService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let student = students.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(student))
}

/// Configure student routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/students").route(web::post().to(create_student)))
        .service(web::resource("/students/{id}").route(web::get().to(get_student)));
}
