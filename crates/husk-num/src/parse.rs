//! Correctly rounded decimal → binary conversion (`strtod`, `strtof`).
//!
//! Conversion runs in three tiers:
//!
//! 1. Range filter: decimal magnitudes far outside the format become
//!    signed infinity or signed zero without any arithmetic.
//! 2. Fast path: when the digit string and `10^|e|` are both exact in the
//!    target format, a single IEEE multiply or divide is correctly rounded.
//! 3. Exact path: the value is written as `num / den` in big integers,
//!    scaled so the quotient has exactly `p` bits, and the remainder is
//!    compared against half the divisor to round to nearest, ties to even.

use crate::big::Big;
use crate::decimal::{scan, Decimal, Number};
use crate::float::RawFloat;

/// Parse a `strtod` literal at the start of `text`.
///
/// Returns the value and the number of bytes consumed. Text with no digits
/// gives `(0.0, 0)`. Parsing stops at the first byte that cannot extend
/// the literal, so a NUL terminator needs no special handling.
pub fn parse_f64(text: &[u8]) -> (f64, usize) {
    parse(text)
}

/// Single-precision counterpart of [`parse_f64`], rounded once directly to
/// binary32.
pub fn parse_f32(text: &[u8]) -> (f32, usize) {
    parse(text)
}

/// C-shaped `strtod`: the end position, if requested, is written to `end`.
pub fn strtod(text: &[u8], end: Option<&mut usize>) -> f64 {
    let (value, consumed) = parse_f64(text);
    if let Some(end) = end {
        *end = consumed;
    }
    value
}

/// C-shaped `strtof`: the end position, if requested, is written to `end`.
pub fn strtof(text: &[u8], end: Option<&mut usize>) -> f32 {
    let (value, consumed) = parse_f32(text);
    if let Some(end) = end {
        *end = consumed;
    }
    value
}

fn parse<F: RawFloat>(text: &[u8]) -> (F, usize) {
    let Some((number, consumed)) = scan(text) else {
        return (F::ZERO, 0);
    };
    let value = match number {
        Number::Finite(decimal) => convert(&decimal),
        Number::Infinite { negative } => F::infinity(negative),
        Number::NaN { negative } => F::nan(negative),
    };
    (value, consumed)
}

/// Nearest `F` to a scanned decimal.
pub(crate) fn convert<F: RawFloat>(decimal: &Decimal) -> F {
    let negative = decimal.negative;
    if decimal.digits.is_empty() {
        return F::from_parts(negative, 0);
    }
    let magnitude = decimal.digits.len() as i64 + decimal.exponent;
    if magnitude > F::MAX_MAGNITUDE {
        return F::infinity(negative);
    }
    if magnitude < F::MIN_MAGNITUDE {
        return F::from_parts(negative, 0);
    }
    // Bounded by the magnitude filter and the digit cap.
    let exponent = decimal.exponent as i32;
    if let Some(value) = fast_path::<F>(&decimal.digits, exponent) {
        return if negative { -value } else { value };
    }
    exact::<F>(negative, &decimal.digits, exponent)
}

fn fast_path<F: RawFloat>(digits: &[u8], exponent: i32) -> Option<F> {
    if digits.len() > 19 {
        return None;
    }
    let w = digits.iter().fold(0u64, |acc, &d| acc * 10 + d as u64);
    if exponent >= 0 {
        if let Some(v) = 10u64
            .checked_pow(exponent as u32)
            .and_then(|scale| w.checked_mul(scale))
        {
            return Some(F::from_u64(v));
        }
    }
    if w > F::EXACT_INT || exponent.abs() > F::EXACT_POW10 {
        return None;
    }
    let mantissa = F::from_u64(w);
    Some(if exponent >= 0 {
        mantissa * F::pow10(exponent)
    } else {
        mantissa / F::pow10(-exponent)
    })
}

fn exact<F: RawFloat>(negative: bool, digits: &[u8], exponent: i32) -> F {
    let p = F::MANTISSA_BITS as i64;
    let mut num = Big::from_decimal_digits(digits);
    let mut den = Big::from_u64(1);
    if exponent >= 0 {
        num.mul_pow10(exponent as u32);
    } else {
        den.mul_pow10(exponent.unsigned_abs());
    }

    // num / den / 2^k lands in [2^(p-1), 2^(p+1)); clamp into the
    // subnormal range, then correct by at most one bit.
    let mut k = (num.bit_len() as i64 - den.bit_len() as i64 - p).max(F::MIN_EXP);
    if k >= 0 {
        den.shl(k as usize);
    } else {
        num.shl(k.unsigned_abs() as usize);
    }
    let mut limit = den.clone();
    limit.shl(p as usize);
    if num >= limit {
        k += 1;
        den.shl(1);
    }
    if k > F::MAX_EXP {
        return F::infinity(negative);
    }

    let quotient = num.div_rem(&den);
    let mut q = quotient.to_u64().unwrap_or(u64::MAX);
    num.shl(1);
    match num.cmp(&den) {
        core::cmp::Ordering::Greater => q += 1,
        core::cmp::Ordering::Equal if q & 1 == 1 => q += 1,
        _ => {}
    }
    if q == 1 << p {
        q >>= 1;
        k += 1;
        if k > F::MAX_EXP {
            return F::infinity(negative);
        }
    }

    let hidden = 1u64 << (p - 1);
    let bits = if q < hidden {
        q
    } else {
        (((k - F::MIN_EXP + 1) as u64) << (p - 1)) | (q - hidden)
    };
    F::from_parts(negative, bits)
}
