pub fn add(a: f64, b: f64) -> f64 {
    a + b
}

pub fn subtract(a: f64, b: f64) -> f64 {
    a - b
}

pub fn multiply(a: f64, b: f64) -> f64 {
    a * b
}

// `b == 0` is rejected by `validation::validate_division` before we get here.
pub fn divide(a: f64, b: f64) -> f64 {
    a / b
}
