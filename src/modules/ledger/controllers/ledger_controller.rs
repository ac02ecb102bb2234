use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::ledger::models::{
    CreateExpenseHeadRequest, RecordExpenseRequest, RecordIncomeRequest,
};
use crate::modules::ledger::services::LedgerService;

/// POST /expense-heads
pub async fn create_expense_head(
    service: web::Data<Arc<LedgerService>>,
    request: web::Json<CreateExpenseHeadRequest>,
) -> Result<HttpResponse, AppError> {
    let head = service.add_expense_head(&request.name).await?;
    Ok(HttpResponse::Created().json(head))
}

/// POST /expenses
pub async fn record_expense(
    service: web::Data<Arc<LedgerService>>,
    request: web::Json<RecordExpenseRequest>,
) -> Result<HttpResponse, AppError> {
    let expense = service.record_expense(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(expense))
}

/// POST /incomes
pub async fn record_income(
    service: web::Data<Arc<LedgerService>>,
    request: web::Json<RecordIncomeRequest>,
) -> Result<HttpResponse, AppError> {
    let income = service.record_income(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(income))
}

/// Configure expense and income routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/expense-heads").route(web::post().to(create_expense_head)))
        .service(web::resource("/expenses").route(web::post().to(record_expense)))
        .service(web::resource("/incomes").route(web::post().to(record_income)));
}
