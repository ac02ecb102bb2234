use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::core::error::AppError;
use crate::core::money;
use crate::modules::invoices::controllers::InvoiceResponse;
use crate::modules::payments::models::RecordPaymentRequest;
use crate::modules::payments::services::PaymentService;

#[derive(Debug, Serialize)]
pub struct OutstandingResponse {
    pub student_id: i64,
    pub outstanding: String,
}

/// POST /payments
/// Returns 201 with the payment, its allocations and the surplus
pub async fn record_payment(
    service: web::Data<Arc<PaymentService>>,
    request: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let outcome = service.record_payment(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(outcome))
}

/// GET /payments/{id}
pub async fn get_receipt(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let receipt = service.get_receipt(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

/// GET /students/{id}/invoices
pub async fn list_student_invoices(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let invoices: Vec<InvoiceResponse> = service
        .list_student_invoices(path.into_inner())
        .await?
        .into_iter()
        .map(InvoiceResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(invoices))
}

/// GET /students/{id}/outstanding
pub async fn outstanding_balance(
    service: web::Data<Arc<PaymentService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let student_id = path.into_inner();
    let outstanding = service.outstanding_balance(student_id).await?;
    Ok(HttpResponse::Ok().json(OutstandingResponse {
        student_id,
        outstanding: money::format_amount(outstanding),
    }))
}

/// Configure payment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::post().to(record_payment))
            .route("/{id}", web::get().to(get_receipt)),
    )
    .service(
        web::resource("/students/{id}/invoices").route(web::get().to(list_student_invoices)),
    )
    .service(
        web::resource("/students/{id}/outstanding").route(web::get().to(outstanding_balance)),
    );
}
