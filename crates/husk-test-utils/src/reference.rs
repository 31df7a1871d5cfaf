//! Reference float renderings in C `printf` shape.
//!
//! Rust's `{:.*}` and `{:.*e}` are exact and round half to even, which is
//! what glibc's `%f` and `%e` do. They differ only in layout: Rust writes
//! `1.5e-7` where C writes `1.5e-07`, and `inf`/`NaN` where C writes
//! `inf`/`nan`. These helpers produce the C layout for finite values.

/// `%.{precision}f` of a finite value.
pub fn c_fixed(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}

/// `%.{precision}e` of a finite value.
pub fn c_exp(value: f64, precision: usize) -> String {
    to_c_exponent(&format!("{value:.precision$e}"))
}

/// Rewrite a Rust exponent suffix (`e7`, `e-7`) as C's (`e+07`, `e-07`).
pub fn to_c_exponent(rust: &str) -> String {
    let Some(at) = rust.find('e') else {
        return rust.to_string();
    };
    let (mantissa, exponent) = rust.split_at(at);
    let exponent = &exponent[1..];
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}
