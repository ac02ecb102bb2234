use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::core::error::AppError;
use crate::modules::catalog::models::{
    CreateBusStopRequest, CreateCourseRequest, CreateFeeHeadRequest, CreateFeeStructureRequest,
    UpdateFeeStructureRequest,
};
use crate::modules::catalog::services::CatalogService;

/// POST /courses
pub async fn create_course(
    service: web::Data<Arc<CatalogService>>,
    request: web::Json<CreateCourseRequest>,
) -> Result<HttpResponse, AppError> {
    let course = service.create_course(&request.name).await?;
    Ok(HttpResponse::Created().json(course))
}

/// POST /fee-heads
pub async fn create_fee_head(
    service: web::Data<Arc<CatalogService>>,
    request: web::Json<CreateFeeHeadRequest>,
) -> Result<HttpResponse, AppError> {
    let fee_head = service.create_fee_head(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(fee_head))
}

/// GET /fee-heads
pub async fn list_fee_heads(
    service: web::Data<Arc<CatalogService>>,
) -> Result<HttpResponse, AppError> {
    let fee_heads = service.list_fee_heads().await?;
    Ok(HttpResponse::Ok().json(fee_heads))
}

/// POST /fee-structures
/// A second structure for the same course and fee head answers 409
pub async fn create_fee_structure(
    service: web::Data<Arc<CatalogService>>,
    request: web::Json<CreateFeeStructureRequest>,
) -> Result<HttpResponse, AppError> {
    let structure = service.create_fee_structure(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(structure))
}

/// PUT /fee-structures/{id}
pub async fn update_fee_structure(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<i64>,
    request: web::Json<UpdateFeeStructureRequest>,
) -> Result<HttpResponse, AppError> {
    let structure = service
        .update_fee_structure(path.into_inner(), request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(structure))
}

/// GET /courses/{id}/fee-structures
pub async fn list_fee_structures(
    service: web::Data<Arc<CatalogService>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let lines = service.list_fee_structures(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(lines))
}

/// POST /bus-stops
pub async fn create_bus_stop(
    service: web::Data<Arc<CatalogService>>,
    request: web::Json<CreateBusStopRequest>,
) -> Result<HttpResponse, AppError> {
    let bus_stop = service.create_bus_stop(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(bus_stop))
}

/// Configure catalog routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/courses").route(web::post().to(create_course)))
        .service(
            web::resource("/courses/{id}/fee-structures")
                .route(web::get().to(list_fee_structures)),
        )
        .service(
            web::resource("/fee-heads")
                .route(web::post().to(create_fee_head))
                .route(web::get().to(list_fee_heads)),
        )
        .service(web::resource("/fee-structures").route(web::post().to(create_fee_structure)))
        .service(
            web::resource("/fee-structures/{id}").route(web::put().to(update_fee_structure)),
        )
        .service(web::resource("/bus-stops").route(web::post().to(create_bus_stop)));
}
