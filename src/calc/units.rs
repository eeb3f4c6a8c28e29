//! Table-driven unit conversion.
//!
//! Weight, height, distance and volume are linear: every unit has a factor to
//! its type's base unit (kg, m, m, L). Temperature is affine and is converted
//! through Celsius instead.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    Weight,
    Height,
    Temperature,
    Distance,
    Volume,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::Weight,
        UnitType::Height,
        UnitType::Temperature,
        UnitType::Distance,
        UnitType::Volume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UnitType::Weight => "weight",
            UnitType::Height => "height",
            UnitType::Temperature => "temperature",
            UnitType::Distance => "distance",
            UnitType::Volume => "volume",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitType {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        UnitType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnitError::UnknownType(s.to_owned()))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum UnitError {
    #[error(
        "invalid unit type: {0} (valid types: weight, height, temperature, distance, volume)"
    )]
    UnknownType(String),
    #[error("invalid unit '{unit}' for type '{unit_type}' (valid units: {})", .valid.join(", "))]
    UnknownUnit {
        unit: String,
        unit_type: UnitType,
        valid: Vec<String>,
    },
}

/// Conversion factors keyed by unit type, then by lowercase unit symbol.
///
/// Built once at start-up and shared read-only.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    factors: HashMap<UnitType, HashMap<&'static str, f64>>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    pub fn new() -> Self {
        let table: [(UnitType, &[(&'static str, f64)]); 5] = [
            (
                UnitType::Weight,
                &[("kg", 1.0), ("g", 0.001), ("lb", 0.453_592_37), ("oz", 0.028_349_523_1)],
            ),
            (
                UnitType::Height,
                &[("m", 1.0), ("cm", 0.01), ("ft", 0.3048), ("in", 0.0254)],
            ),
            (
                UnitType::Distance,
                &[
                    ("m", 1.0),
                    ("km", 1000.0),
                    ("mi", 1609.344),
                    ("ft", 0.3048),
                    ("yd", 0.9144),
                ],
            ),
            (
                UnitType::Volume,
                &[("l", 1.0), ("ml", 0.001), ("gal", 3.785_41), ("fl_oz", 0.029_573_5)],
            ),
            // affine; factors are placeholders so the units validate
            (UnitType::Temperature, &[("c", 1.0), ("f", 1.0), ("k", 1.0)]),
        ];

        let factors = table
            .into_iter()
            .map(|(unit_type, units)| (unit_type, units.iter().copied().collect()))
            .collect();

        Self { factors }
    }

    fn factor(&self, unit_type: UnitType, unit: &str) -> Result<f64, UnitError> {
        let normalized = unit.trim().to_ascii_lowercase();
        self.factors
            .get(&unit_type)
            .and_then(|units| units.get(normalized.as_str()))
            .copied()
            .ok_or_else(|| UnitError::UnknownUnit {
                unit: unit.to_owned(),
                unit_type,
                valid: self.valid_units(unit_type),
            })
    }

    pub fn is_valid_unit(&self, unit_type: UnitType, unit: &str) -> bool {
        self.factor(unit_type, unit).is_ok()
    }

    /// Sorted symbols accepted for `unit_type`.
    pub fn valid_units(&self, unit_type: UnitType) -> Vec<String> {
        let mut units: Vec<String> = self
            .factors
            .get(&unit_type)
            .map(|units| units.keys().map(|u| (*u).to_owned()).collect())
            .unwrap_or_default();
        units.sort();
        units
    }

    pub fn to_base(&self, value: f64, unit_type: UnitType, unit: &str) -> Result<f64, UnitError> {
        Ok(value * self.factor(unit_type, unit)?)
    }

    pub fn from_base(&self, value: f64, unit_type: UnitType, unit: &str) -> Result<f64, UnitError> {
        Ok(value / self.factor(unit_type, unit)?)
    }

    /// Unrounded conversion between two units of the same type.
    pub fn convert(
        &self,
        value: f64,
        unit_type: UnitType,
        from: &str,
        to: &str,
    ) -> Result<f64, UnitError> {
        if unit_type == UnitType::Temperature {
            // validate both ends before touching the affine formulas
            self.factor(unit_type, from)?;
            self.factor(unit_type, to)?;
            return Ok(convert_temperature(value, from, to));
        }

        let base = self.to_base(value, unit_type, from)?;
        self.from_base(base, unit_type, to)
    }
}

fn to_celsius(value: f64, unit: &str) -> f64 {
    match unit {
        "F" => (value - 32.0) * 5.0 / 9.0,
        "K" => value - 273.15,
        _ => value,
    }
}

fn from_celsius(celsius: f64, unit: &str) -> f64 {
    match unit {
        "F" => celsius * 9.0 / 5.0 + 32.0,
        "K" => celsius + 273.15,
        _ => celsius,
    }
}

// Units must already be validated as one of C, F, K (any case).
fn convert_temperature(value: f64, from: &str, to: &str) -> f64 {
    let from = from.trim().to_ascii_uppercase();
    let to = to.trim().to_ascii_uppercase();
    if from == to {
        return value;
    }
    from_celsius(to_celsius(value, &from), &to)
}

/// Converts `value` and rounds the result to 6 decimal places.
pub fn convert_unit(
    registry: &UnitRegistry,
    value: f64,
    unit_type: UnitType,
    from: &str,
    to: &str,
) -> Result<f64, UnitError> {
    Ok(round_to(registry.convert(value, unit_type, from, to)?, 6))
}
