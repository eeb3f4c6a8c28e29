use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calc::{BmiCategory, BmiResult, CompoundInterest, LoanPayment, Vat};
use crate::error::{ApiError, ErrorCode};

// Success envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    pub timestamp: String,
}

// Error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(err: &ApiError, request_id: &str, timestamp: String) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
            details: err.details.clone(),
            request_id: request_id.to_owned(),
            timestamp,
        }
    }
}

// --- math ---

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct MathRequest {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct MathResponse {
    pub result: f64,
}

// --- finance ---

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct VatRequest {
    pub amount: f64,
    // percentage, 23 means 23%
    pub rate: f64,
    // true: amount already includes VAT
    pub inclusive: bool,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct VatResponse {
    pub vat_amount: f64,
    pub net_amount: f64,
    pub gross_amount: f64,
}

impl From<Vat> for VatResponse {
    fn from(v: Vat) -> Self {
        Self {
            vat_amount: v.vat_amount,
            net_amount: v.net_amount,
            gross_amount: v.gross_amount,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct CompoundInterestRequest {
    pub principal: f64,
    pub rate: f64,
    // years
    pub time: f64,
    // compounding periods per year; signed so that 0 and negatives reach validation
    pub compound_frequency: i64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CompoundInterestResponse {
    pub final_amount: f64,
    pub interest_earned: f64,
}

impl From<CompoundInterest> for CompoundInterestResponse {
    fn from(ci: CompoundInterest) -> Self {
        Self {
            final_amount: ci.final_amount,
            interest_earned: ci.interest_earned,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct LoanPaymentRequest {
    pub principal: f64,
    pub annual_rate: f64,
    pub years: f64,
    pub payments_per_year: i64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct LoanPaymentResponse {
    pub payment_amount: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

impl From<LoanPayment> for LoanPaymentResponse {
    fn from(loan: LoanPayment) -> Self {
        Self {
            payment_amount: loan.payment_amount,
            total_payment: loan.total_payment,
            total_interest: loan.total_interest,
        }
    }
}

// --- utils ---

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BmiRequest {
    pub weight: f64,
    pub weight_unit: String,
    pub height: f64,
    pub height_unit: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BmiResponse {
    pub bmi: f64,
    pub category: BmiCategory,
}

impl From<BmiResult> for BmiResponse {
    fn from(r: BmiResult) -> Self {
        Self {
            bmi: r.bmi,
            category: r.category,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UnitConversionRequest {
    pub value: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub unit_type: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UnitConversionResponse {
    pub result: f64,
    pub from_unit: String,
    pub to_unit: String,
    pub unit_type: String,
}

// --- health ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: String,
    pub version: String,
    pub checks: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_omits_empty_details() {
        let err = ApiError::division_by_zero();
        let resp = ErrorResponse::new(&err, "abc", "2024-01-15T10:30:00Z".into());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["code"], "DIVISION_BY_ZERO");
        assert_eq!(json["request_id"], "abc");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn bmi_response_field_names() {
        let resp = BmiResponse {
            bmi: 22.86,
            category: BmiCategory::Normal,
        };
        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"bmi":22.86,"category":"normal"}"#
        );
    }

    #[test]
    fn fractional_frequency_is_rejected_by_decoding() {
        let body = r#"{"principal": 1000, "rate": 5, "time": 10, "compound_frequency": 1.5}"#;
        assert!(serde_json::from_str::<CompoundInterestRequest>(body).is_err());
    }

    #[test]
    fn missing_fields_decode_as_zero_values() {
        let req: MathRequest = serde_json::from_str(r#"{"a": 5}"#).unwrap();
        assert_eq!((req.a, req.b), (5.0, 0.0));

        let req: LoanPaymentRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.payments_per_year, 0);

        let req: UnitConversionRequest =
            serde_json::from_str(r#"{"value": 1, "from_unit": "kg", "to_unit": "lb"}"#).unwrap();
        assert_eq!(req.unit_type, "");
    }

    #[test]
    fn vat_inclusive_defaults_to_false() {
        let req: VatRequest = serde_json::from_str(r#"{"amount": 100, "rate": 23}"#).unwrap();
        assert!(!req.inclusive);
    }
}
