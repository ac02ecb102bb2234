use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::core::error::AppError;
use crate::core::money;
use crate::modules::invoices::models::{InvoiceState, StudentInvoice};
use crate::modules::invoices::services::InvoiceGenerator;

/// Invoice as returned by the API, amounts as decimal strings
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: i64,
    pub student_id: i64,
    pub fee_head_id: i64,
    pub amount: String,
    pub paid_amount: String,
    pub balance: String,
    pub state: InvoiceState,
    pub due_date: Option<String>,
    pub payment_date: Option<String>,
    pub created_at: String,
}

impl From<StudentInvoice> for InvoiceResponse {
    fn from(invoice: StudentInvoice) -> Self {
        Self {
            id: invoice.id,
            student_id: invoice.student_id,
            fee_head_id: invoice.fee_head_id,
            amount: money::format_amount(invoice.amount),
            paid_amount: money::format_amount(invoice.paid_amount),
            balance: money::format_amount(invoice.balance()),
            state: invoice.state(),
            due_date: invoice.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            payment_date: invoice.payment_date.map(|d| d.format("%Y-%m-%d").to_string()),
            created_at: invoice.created_at.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        }
    }
}

/// POST /students/{id}/invoices/generate
pub async fn generate_for_student(
    generator: web::Data<Arc<InvoiceGenerator>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let summary = generator.for_student(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// POST /courses/{id}/invoices/generate
/// Per-student failures are reported in the summary, not as an error status
pub async fn generate_for_course(
    generator: web::Data<Arc<InvoiceGenerator>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let summary = generator.for_course(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Configure invoice generation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/students/{id}/invoices/generate")
            .route(web::post().to(generate_for_student)),
    )
    .service(
        web::resource("/courses/{id}/invoices/generate")
            .route(web::post().to(generate_for_course)),
    );
}
