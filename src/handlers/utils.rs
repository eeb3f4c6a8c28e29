use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::response::Response;

use crate::calc;
use crate::error::ApiError;
use crate::models::{BmiRequest, BmiResponse, UnitConversionRequest, UnitConversionResponse};
use crate::response::{Reply, decode_body, ensure_finite};
use crate::state::AppState;
use crate::validation::{validate_bmi, validate_unit_conversion};

fn calculation_error(message: &str, err: calc::UnitError) -> ApiError {
    ApiError::validation(message, err.to_string())
}

pub async fn bmi_handler(
    State(state): State<Arc<AppState>>,
    reply: Reply,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = decode_body::<BmiRequest>(body).and_then(|req| {
        validate_bmi(&req, &state.units)?;
        let result = calc::calculate_bmi(
            &state.units,
            req.weight,
            &req.weight_unit,
            req.height,
            &req.height_unit,
        )
        .map_err(|e| calculation_error("calculation error", e))?;
        ensure_finite(&[("bmi", result.bmi)])?;
        Ok(BmiResponse::from(result))
    });
    reply.send(result)
}

pub async fn unit_conversion_handler(
    State(state): State<Arc<AppState>>,
    reply: Reply,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = decode_body::<UnitConversionRequest>(body).and_then(|req| {
        let unit_type = validate_unit_conversion(&req, &state.units)?;
        let value = calc::convert_unit(
            &state.units,
            req.value,
            unit_type,
            &req.from_unit,
            &req.to_unit,
        )
        .map_err(|e| calculation_error("conversion error", e))?;
        ensure_finite(&[("result", value)])?;
        Ok(UnitConversionResponse {
            result: value,
            from_unit: req.from_unit,
            to_unit: req.to_unit,
            unit_type: req.unit_type,
        })
    });
    reply.send(result)
}
