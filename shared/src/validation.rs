//! Validation utilities for the Steelworks workshop platform

use rust_decimal::Decimal;

use crate::models::RunWeights;

// ============================================================================
// Weight and Price Validations
// ============================================================================

/// Validate that a weight is strictly positive
pub fn validate_positive_weight(weight_kg: Decimal) -> Result<(), &'static str> {
    if weight_kg <= Decimal::ZERO {
        return Err("Weight must be greater than zero");
    }
    Ok(())
}

/// Validate that a weight is zero or more (scrap may legitimately be zero)
pub fn validate_non_negative_weight(weight_kg: Decimal) -> Result<(), &'static str> {
    if weight_kg < Decimal::ZERO {
        return Err("Weight cannot be negative");
    }
    Ok(())
}

/// Validate a per-kg rate
pub fn validate_rate(rate_per_kg: Decimal) -> Result<(), &'static str> {
    if rate_per_kg < Decimal::ZERO {
        return Err("Rate cannot be negative");
    }
    Ok(())
}

/// Validate a piece count
pub fn validate_qty(qty: i64) -> Result<(), &'static str> {
    if qty < 0 {
        return Err("Quantity cannot be negative");
    }
    Ok(())
}

/// Validate steel thickness (workshop handles sheet up to 25mm)
pub fn validate_thickness(thickness_mm: Decimal) -> Result<(), &'static str> {
    if thickness_mm <= Decimal::ZERO || thickness_mm > Decimal::from(25) {
        return Err("Thickness must be between 0 and 25 mm");
    }
    Ok(())
}

// ============================================================================
// Production Validations
// ============================================================================

/// Validate a run's recorded weights
pub fn validate_run_weights(weights: &RunWeights) -> Result<(), &'static str> {
    validate_positive_weight(weights.input_weight_kg)?;
    validate_positive_weight(weights.output_weight_kg)?;
    validate_non_negative_weight(weights.scrap_weight_kg)?;
    if !weights.is_balanced() {
        return Err("Output and scrap weight cannot exceed input weight");
    }
    Ok(())
}

// ============================================================================
// Order Validations
// ============================================================================

/// Validate order targets; both may be absent
pub fn validate_order_targets(
    ordered_qty: Option<i64>,
    ordered_weight_kg: Option<Decimal>,
) -> Result<(), &'static str> {
    if ordered_qty.is_some_and(|q| q < 0) {
        return Err("Ordered quantity cannot be negative");
    }
    if ordered_weight_kg.is_some_and(|w| w < Decimal::ZERO) {
        return Err("Ordered weight cannot be negative");
    }
    Ok(())
}

/// Cancellation must carry a reason
pub fn validate_cancel_remarks(remarks: Option<&str>) -> Result<&str, &'static str> {
    match remarks.map(str::trim) {
        Some(r) if !r.is_empty() => Ok(r),
        _ => Err("Remarks are required to cancel an order"),
    }
}
