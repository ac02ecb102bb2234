use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{money, AppError, Result};
use crate::modules::catalog::models::{
    validate_terms, BusStop, Course, CreateBusStopRequest, CreateFeeHeadRequest,
    CreateFeeStructureRequest, FeeHead, FeeStructure, FeeStructureLine,
    UpdateFeeStructureRequest,
};
use crate::modules::catalog::repositories::CatalogRepository;

/// Staff-facing maintenance of courses, fee heads, fee structures and bus stops
pub struct CatalogService {
    catalog_repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(catalog_repo: Arc<dyn CatalogRepository>) -> Self {
        Self { catalog_repo }
    }

    pub async fn create_course(&self, name: &str) -> Result<Course> {
        let name = required("Course name", name)?;
        let course = self.catalog_repo.create_course(name).await?;
        info!(course_id = course.id, name = course.name.as_str(), "Course created");
        Ok(course)
    }

    pub async fn create_fee_head(&self, request: CreateFeeHeadRequest) -> Result<FeeHead> {
        let name = required("Fee head name", &request.name)?;
        let fee_head = self
            .catalog_repo
            .create_fee_head(name, request.description.trim())
            .await?;
        info!(fee_head_id = fee_head.id, name = fee_head.name.as_str(), "Fee head created");
        Ok(fee_head)
    }

    pub async fn list_fee_heads(&self) -> Result<Vec<FeeHead>> {
        self.catalog_repo.list_fee_heads().await
    }

    /// Assign a fee head to a course.
    ///
    /// # Errors
    /// * `NotFound` - course or fee head does not exist
    /// * `Validation` - non-positive amount or installments below 1
    /// * `DuplicateStructure` - the course already charges this fee head
    pub async fn create_fee_structure(
        &self,
        request: CreateFeeStructureRequest,
    ) -> Result<FeeStructure> {
        validate_terms(request.amount, request.installments)?;

        self.catalog_repo
            .find_course(request.course_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {} not found", request.course_id)))?;
        self.catalog_repo
            .find_fee_head(request.fee_head_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Fee head {} not found", request.fee_head_id))
            })?;

        let existing = self
            .catalog_repo
            .list_structures_for_course(request.course_id)
            .await?;
        if existing
            .iter()
            .any(|line| line.structure.fee_head_id == request.fee_head_id)
        {
            warn!(
                course_id = request.course_id,
                fee_head_id = request.fee_head_id,
                "Rejected duplicate fee structure"
            );
            return Err(AppError::DuplicateStructure {
                course_id: request.course_id,
                fee_head_id: request.fee_head_id,
            });
        }

        let structure = self
            .catalog_repo
            .create_fee_structure(
                request.course_id,
                request.fee_head_id,
                request.amount,
                request.installments,
            )
            .await?;

        info!(
            structure_id = structure.id,
            course_id = structure.course_id,
            fee_head_id = structure.fee_head_id,
            amount = %structure.amount,
            "Fee structure created"
        );

        Ok(structure)
    }

    /// Change the amount or installment count. Invoices already raised
    /// keep their original amount.
    pub async fn update_fee_structure(
        &self,
        id: i64,
        request: UpdateFeeStructureRequest,
    ) -> Result<FeeStructure> {
        validate_terms(request.amount, request.installments)?;

        self.catalog_repo
            .find_fee_structure(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Fee structure {} not found", id)))?;

        let structure = self
            .catalog_repo
            .update_fee_structure(id, request.amount, request.installments)
            .await?;

        info!(structure_id = id, amount = %structure.amount, "Fee structure updated");
        Ok(structure)
    }

    pub async fn list_fee_structures(&self, course_id: i64) -> Result<Vec<FeeStructureLine>> {
        self.catalog_repo
            .find_course(course_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Course {} not found", course_id)))?;

        self.catalog_repo.list_structures_for_course(course_id).await
    }

    pub async fn create_bus_stop(&self, request: CreateBusStopRequest) -> Result<BusStop> {
        let name = required("Bus stop name", &request.name)?;
        money::validate_amount(request.monthly_fee)
            .map_err(|e| AppError::validation(format!("monthly_fee: {}", e)))?;

        self.catalog_repo
            .create_bus_stop(name, request.route.trim(), request.monthly_fee)
            .await
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} cannot be empty", field)));
    }
    Ok(trimmed)
}
