mod finance;
mod health;
mod math;
mod metrics;
mod utils;

use axum::http::Method;
use axum::response::Response;

use crate::error::ApiError;
use crate::response::Reply;

pub use finance::{compound_interest_handler, loan_payment_handler, vat_handler};
pub use health::{health_handler, ready_handler};
pub use math::{add_handler, divide_handler, multiply_handler, subtract_handler};
pub use metrics::metrics_handler;
pub use utils::{bmi_handler, unit_conversion_handler};

// structured 405 for any non-POST call to an API route
pub async fn method_not_allowed(method: Method, reply: Reply) -> Response {
    reply.err(ApiError::method_not_allowed(&method))
}
