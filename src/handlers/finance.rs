use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::response::Response;

use crate::calc;
use crate::error::ApiError;
use crate::models::{
    CompoundInterestRequest, CompoundInterestResponse, LoanPaymentRequest, LoanPaymentResponse,
    VatRequest, VatResponse,
};
use crate::response::{Reply, decode_body, ensure_finite};
use crate::validation::{validate_compound_interest, validate_loan_payment, validate_vat};

pub async fn vat_handler(reply: Reply, body: Result<Bytes, BytesRejection>) -> Response {
    let result = decode_body::<VatRequest>(body).and_then(|req| {
        validate_vat(&req)?;
        let v = calc::vat(req.amount, req.rate, req.inclusive);
        ensure_finite(&[
            ("vat_amount", v.vat_amount),
            ("net_amount", v.net_amount),
            ("gross_amount", v.gross_amount),
        ])?;
        Ok(VatResponse::from(v))
    });
    reply.send(result)
}

pub async fn compound_interest_handler(
    reply: Reply,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = decode_body::<CompoundInterestRequest>(body).and_then(|req| {
        let frequency = validate_compound_interest(&req)?;
        let ci = calc::compound_interest(req.principal, req.rate, req.time, frequency);
        ensure_finite(&[
            ("final_amount", ci.final_amount),
            ("interest_earned", ci.interest_earned),
        ])?;
        Ok::<_, ApiError>(CompoundInterestResponse::from(ci))
    });
    reply.send(result)
}

pub async fn loan_payment_handler(reply: Reply, body: Result<Bytes, BytesRejection>) -> Response {
    let result = decode_body::<LoanPaymentRequest>(body).and_then(|req| {
        let payments_per_year = validate_loan_payment(&req)?;
        let loan = calc::loan_payment(req.principal, req.annual_rate, req.years, payments_per_year);
        ensure_finite(&[
            ("payment_amount", loan.payment_amount),
            ("total_payment", loan.total_payment),
            ("total_interest", loan.total_interest),
        ])?;
        Ok::<_, ApiError>(LoanPaymentResponse::from(loan))
    });
    reply.send(result)
}
