use rust_decimal::Decimal;

use crate::core::{AppError, Result};

/// Fractional digits carried by every monetary column
pub const MONEY_SCALE: u32 = 2;

/// Largest value a `DECIMAL(12, 2)` column holds: 9,999,999,999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, MONEY_SCALE);

/// Rounds a decimal value to the stored money scale
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}

/// Validates that an amount fits the money columns: at most two decimal
/// places, not negative and no larger than [`MAX_AMOUNT`].
pub fn validate_amount(amount: Decimal) -> std::result::Result<(), String> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(format!(
            "amounts must have at most {} decimal places, got {}",
            MONEY_SCALE, amount
        ));
    }

    if amount < Decimal::ZERO {
        return Err(format!("amount cannot be negative, got {}", amount));
    }

    if amount > MAX_AMOUNT {
        return Err(format!("amount cannot exceed {}, got {}", MAX_AMOUNT, amount));
    }

    Ok(())
}

/// Validates a tendered payment: strictly positive and storable
pub fn validate_payment_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::invalid_amount(format!(
            "payment amount must be greater than zero, got {}",
            amount
        )));
    }
    validate_amount(amount).map_err(AppError::InvalidAmount)
}

/// Validates a charge (fee structure, expense, income): strictly positive
/// and storable
pub fn validate_charge(field: &str, amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{} must be greater than zero, got {}",
            field, amount
        )));
    }
    validate_amount(amount).map_err(|e| AppError::validation(format!("{}: {}", field, e)))
}

/// Formats an amount for display with exactly two decimal places
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round(amount))
}
