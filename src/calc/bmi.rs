use serde::Serialize;

use super::round_to;
use super::units::{UnitError, UnitRegistry, UnitType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    #[serde(rename = "underweight")]
    Underweight,
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "overweight")]
    Overweight,
    #[serde(rename = "obesity_class_1")]
    ObesityClass1,
    #[serde(rename = "obesity_class_2")]
    ObesityClass2,
    #[serde(rename = "obesity_class_3")]
    ObesityClass3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BmiResult {
    /// Rounded to 2 decimal places for display.
    pub bmi: f64,
    pub category: BmiCategory,
}

/// Lower bounds are inclusive: 25.0 is already overweight.
pub fn categorize(bmi: f64) -> BmiCategory {
    match bmi {
        b if b < 18.5 => BmiCategory::Underweight,
        b if b < 25.0 => BmiCategory::Normal,
        b if b < 30.0 => BmiCategory::Overweight,
        b if b < 35.0 => BmiCategory::ObesityClass1,
        b if b < 40.0 => BmiCategory::ObesityClass2,
        _ => BmiCategory::ObesityClass3,
    }
}

pub fn calculate_bmi(
    registry: &UnitRegistry,
    weight: f64,
    weight_unit: &str,
    height: f64,
    height_unit: &str,
) -> Result<BmiResult, UnitError> {
    let kg = registry.to_base(weight, UnitType::Weight, weight_unit)?;
    let m = registry.to_base(height, UnitType::Height, height_unit)?;
    let bmi = kg / (m * m);

    // categorize before rounding so 24.996 stays "normal"
    Ok(BmiResult {
        bmi: round_to(bmi, 2),
        category: categorize(bmi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_boundaries() {
        let cases = [
            (18.49, BmiCategory::Underweight),
            (18.5, BmiCategory::Normal),
            (24.9, BmiCategory::Normal),
            (25.0, BmiCategory::Overweight),
            (29.99, BmiCategory::Overweight),
            (30.0, BmiCategory::ObesityClass1),
            (35.0, BmiCategory::ObesityClass2),
            (40.0, BmiCategory::ObesityClass3),
            (55.0, BmiCategory::ObesityClass3),
        ];
        for (bmi, expected) in cases {
            assert_eq!(categorize(bmi), expected, "bmi {bmi}");
        }
    }

    #[test]
    fn metric_and_imperial_inputs() {
        let registry = UnitRegistry::new();
        let cases = [
            (70.0, "kg", 1.75, "m", 22.86, BmiCategory::Normal),
            (154.0, "lb", 5.74, "ft", 22.82, BmiCategory::Normal),
            (50.0, "kg", 175.0, "cm", 16.33, BmiCategory::Underweight),
            (85.0, "kg", 1.75, "m", 27.76, BmiCategory::Overweight),
        ];
        for (w, wu, h, hu, bmi, category) in cases {
            let result = calculate_bmi(&registry, w, wu, h, hu).unwrap();
            assert_eq!(result, BmiResult { bmi, category }, "{w}{wu} {h}{hu}");
        }
    }

    #[test]
    fn category_uses_unrounded_value() {
        let registry = UnitRegistry::new();
        // 24.996..., displayed as 25.0 but still normal
        let result = calculate_bmi(&registry, 24.996, "kg", 1.0, "m").unwrap();
        assert_eq!(result.bmi, 25.0);
        assert_eq!(result.category, BmiCategory::Normal);
    }

    #[test]
    fn unknown_unit_is_an_error() {
        let registry = UnitRegistry::new();
        assert!(calculate_bmi(&registry, 70.0, "stone", 1.75, "m").is_err());
        assert!(calculate_bmi(&registry, 70.0, "kg", 1.75, "km").is_err());
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&BmiCategory::ObesityClass2).unwrap();
        assert_eq!(json, "\"obesity_class_2\"");
    }
}
