//! Request validation. Runs strictly before any calculation.
//!
//! Each validator returns the first problem it finds as an [`ApiError`].

use crate::calc::{UnitRegistry, UnitType};
use crate::error::ApiError;
use crate::models::{
    BmiRequest, CompoundInterestRequest, LoanPaymentRequest, MathRequest, UnitConversionRequest,
    VatRequest,
};

fn finite(name: &str, value: f64) -> Result<(), ApiError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ApiError::validation(
            format!("invalid {name}"),
            format!("{name} must be a valid number, got {value}"),
        ))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ApiError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ApiError::validation(
            format!("invalid {name}"),
            format!("{name} cannot be negative"),
        ));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<(), ApiError> {
    finite(name, value)?;
    if value <= 0.0 {
        return Err(ApiError::validation(
            format!("invalid {name}"),
            format!("{name} must be greater than zero"),
        ));
    }
    Ok(())
}

fn positive_count(name: &str, value: i64) -> Result<u32, ApiError> {
    match u32::try_from(value) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ApiError::validation(
            format!("invalid {name}"),
            format!("{name} must be a positive integer, got {value}"),
        )),
    }
}

pub fn validate_math(req: &MathRequest) -> Result<(), ApiError> {
    finite("a", req.a)?;
    finite("b", req.b)
}

/// Same as [`validate_math`], plus a zero divisor check (`-0.0` included).
pub fn validate_division(req: &MathRequest) -> Result<(), ApiError> {
    validate_math(req)?;
    if req.b == 0.0 {
        return Err(ApiError::division_by_zero());
    }
    Ok(())
}

pub fn validate_vat(req: &VatRequest) -> Result<(), ApiError> {
    non_negative("amount", req.amount)?;
    non_negative("rate", req.rate)
}

/// Returns the compounding frequency as an unsigned count.
pub fn validate_compound_interest(req: &CompoundInterestRequest) -> Result<u32, ApiError> {
    non_negative("principal", req.principal)?;
    non_negative("rate", req.rate)?;
    non_negative("time", req.time)?;
    positive_count("compound_frequency", req.compound_frequency)
}

/// Returns the number of payments per year as an unsigned count.
pub fn validate_loan_payment(req: &LoanPaymentRequest) -> Result<u32, ApiError> {
    non_negative("principal", req.principal)?;
    non_negative("annual_rate", req.annual_rate)?;
    positive("years", req.years)?;
    positive_count("payments_per_year", req.payments_per_year)
}

fn known_unit(
    registry: &UnitRegistry,
    field: &str,
    unit_type: UnitType,
    unit: &str,
) -> Result<(), ApiError> {
    if registry.is_valid_unit(unit_type, unit) {
        return Ok(());
    }
    Err(ApiError::validation(
        format!("invalid {field}"),
        format!(
            "unsupported {unit_type} unit '{unit}' (valid units: {})",
            registry.valid_units(unit_type).join(", ")
        ),
    ))
}

pub fn validate_bmi(req: &BmiRequest, registry: &UnitRegistry) -> Result<(), ApiError> {
    positive("weight", req.weight)?;
    positive("height", req.height)?;
    known_unit(registry, "weight_unit", UnitType::Weight, &req.weight_unit)?;
    known_unit(registry, "height_unit", UnitType::Height, &req.height_unit)
}

/// Returns the parsed unit type.
pub fn validate_unit_conversion(
    req: &UnitConversionRequest,
    registry: &UnitRegistry,
) -> Result<UnitType, ApiError> {
    finite("value", req.value)?;
    let unit_type = req
        .unit_type
        .parse::<UnitType>()
        .map_err(|e| ApiError::validation("invalid unit_type", e.to_string()))?;
    known_unit(registry, "from_unit", unit_type, &req.from_unit)?;
    known_unit(registry, "to_unit", unit_type, &req.to_unit)?;
    Ok(unit_type)
}
