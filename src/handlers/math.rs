use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::response::Response;

use crate::calc;
use crate::error::ApiError;
use crate::models::{MathRequest, MathResponse};
use crate::response::{Reply, decode_body, ensure_finite};
use crate::validation::{validate_division, validate_math};

fn binary_op(
    body: Result<Bytes, BytesRejection>,
    validate: fn(&MathRequest) -> Result<(), ApiError>,
    op: fn(f64, f64) -> f64,
) -> Result<MathResponse, ApiError> {
    let req: MathRequest = decode_body(body)?;
    validate(&req)?;
    let result = op(req.a, req.b);
    ensure_finite(&[("result", result)])?;
    Ok(MathResponse { result })
}

pub async fn add_handler(reply: Reply, body: Result<Bytes, BytesRejection>) -> Response {
    reply.send(binary_op(body, validate_math, calc::math::add))
}

pub async fn subtract_handler(reply: Reply, body: Result<Bytes, BytesRejection>) -> Response {
    reply.send(binary_op(body, validate_math, calc::math::subtract))
}

pub async fn multiply_handler(reply: Reply, body: Result<Bytes, BytesRejection>) -> Response {
    reply.send(binary_op(body, validate_math, calc::math::multiply))
}

pub async fn divide_handler(reply: Reply, body: Result<Bytes, BytesRejection>) -> Response {
    reply.send(binary_op(body, validate_division, calc::math::divide))
}
