use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::{money, AppError, Result};
use crate::modules::catalog::models::FeeHead;

/// What a course charges for one fee head. Unique per (course, fee head).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FeeStructure {
    pub id: i64,
    pub course_id: i64,
    pub fee_head_id: i64,
    pub amount: Decimal,
    pub installments: i32,
}

/// A fee structure joined with its fee head, as consumed by invoice generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructureLine {
    pub structure: FeeStructure,
    pub fee_head: FeeHead,
}

/// Validated input for a new fee structure
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeeStructureRequest {
    pub course_id: i64,
    pub fee_head_id: i64,
    pub amount: Decimal,
    #[serde(default = "default_installments")]
    pub installments: i32,
}

/// Editable fields of an existing fee structure
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFeeStructureRequest {
    pub amount: Decimal,
    #[serde(default = "default_installments")]
    pub installments: i32,
}

fn default_installments() -> i32 {
    1
}

/// Shared checks for amount and installment count
pub fn validate_terms(amount: Decimal, installments: i32) -> Result<()> {
    money::validate_charge("fee structure amount", amount)?;

    if installments < 1 {
        return Err(AppError::validation(format!(
            "Installments must be at least 1, got {}",
            installments
        )));
    }

    Ok(())
}
