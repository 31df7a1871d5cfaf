//! Exact binary → decimal digit generation for `%f`, `%e` and `%g`.
//!
//! A finite double is `m * 2^e` exactly. Every digit string here is
//! `round_half_even(|v| * 10^s)` for some scale `s`, computed as one big
//! integer quotient, so the output is the correctly rounded decimal that
//! a conforming C library prints, not an approximation.

use smallvec::SmallVec;

use crate::big::Big;

/// Digit buffer. 64 inline bytes hold every `%e` result up to precision
/// 63 and every `%f` result below `1e20` at moderate precision.
pub type DigitBuf = SmallVec<[u8; 64]>;

/// Fractional digits beyond this are always zero for a double: its exact
/// decimal expansion ends within 1074 places.
const MAX_EXACT_FRACTION: usize = 1100;

/// Significant digits beyond this are always zero: a double's exact
/// decimal expansion has at most 767 significant digits.
const MAX_EXACT_SIGNIFICANT: usize = 800;

/// `|v|` rounded to a fixed number of fractional digits.
///
/// Only the digits that can be nonzero are stored. A requested precision
/// past the point where the expansion ends is reported through
/// [`trailing_zeros`](Fixed::trailing_zeros), so the caller can stream the
/// padding instead of buffering it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fixed {
    digits: DigitBuf,
    exact: usize,
    precision: usize,
}

impl Fixed {
    /// Integer part; at least one digit.
    pub fn integer(&self) -> &[u8] {
        &self.digits[..self.digits.len() - self.exact]
    }

    /// Stored fractional digits.
    pub fn fraction(&self) -> &[u8] {
        &self.digits[self.digits.len() - self.exact..]
    }

    /// Zeros that follow [`fraction`](Fixed::fraction) to make up the
    /// requested precision.
    pub fn trailing_zeros(&self) -> usize {
        self.precision - self.exact
    }

    /// Requested number of fractional digits.
    pub fn precision(&self) -> usize {
        self.precision
    }
}

/// `|v|` rounded to `precision + 1` significant digits, `d.ddd * 10^exponent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scientific {
    /// ASCII digits; the decimal point follows the first.
    pub digits: DigitBuf,
    /// Zeros that follow `digits` to make up the requested precision.
    pub trailing_zeros: usize,
    /// Decimal exponent of the first digit.
    pub exponent: i32,
}

/// Split a finite double into `(mantissa, binary exponent)` with
/// `|v| = mantissa * 2^exponent`.
fn decompose(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);
    if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    }
}

/// `round_half_even(m * 2^e * 10^scale)`.
fn scaled_round(m: u64, e: i32, scale: i32) -> Big {
    let mut num = Big::from_u64(m);
    let mut den = Big::from_u64(1);
    if scale >= 0 {
        num.mul_pow5(scale as u32);
    } else {
        den.mul_pow5(scale.unsigned_abs());
    }
    let twos = e + scale;
    if twos >= 0 {
        num.shl(twos as usize);
    } else {
        den.shl(twos.unsigned_abs() as usize);
    }
    let mut quotient = num.div_rem(&den);
    num.shl(1);
    let round_up = match num.cmp(&den) {
        core::cmp::Ordering::Greater => true,
        core::cmp::Ordering::Equal => quotient.bit(0),
        core::cmp::Ordering::Less => false,
    };
    if round_up {
        quotient.add_small(1);
    }
    quotient
}

/// Digits for `%.{precision}f` of a finite `value` (sign ignored).
pub fn fixed(value: f64, precision: usize) -> Fixed {
    let (m, e) = decompose(value);
    let exact = precision.min(MAX_EXACT_FRACTION);
    let mut digits = scaled_round(m, e, exact as i32).to_decimal();
    if digits.len() < exact + 1 {
        let pad = exact + 1 - digits.len();
        digits.insert_many(0, core::iter::repeat(b'0').take(pad));
    }
    Fixed {
        digits,
        exact,
        precision,
    }
}

/// Digits for `%.{precision}e` of a finite `value` (sign ignored).
pub fn scientific(value: f64, precision: usize) -> Scientific {
    let (m, e) = decompose(value);
    let exact = precision.min(MAX_EXACT_SIGNIFICANT);
    if m == 0 {
        let mut digits = DigitBuf::new();
        digits.extend(core::iter::repeat(b'0').take(exact + 1));
        return Scientific {
            digits,
            trailing_zeros: precision - exact,
            exponent: 0,
        };
    }
    // |v| lies in [2^b, 2^(b+1)), so floor(log10 |v|) is within one of
    // b * log10(2); 78913 / 2^18 approximates log10(2) from below.
    let b = (64 - m.leading_zeros() as i64 - 1) + e as i64;
    let mut exponent = ((b * 78913) >> 18) as i32;
    let digits = loop {
        let digits = scaled_round(m, e, exact as i32 - exponent).to_decimal();
        if digits.len() > exact + 1 {
            exponent += 1;
        } else if digits.len() < exact + 1 {
            exponent -= 1;
        } else {
            break digits;
        }
    };
    Scientific {
        digits,
        trailing_zeros: precision - exact,
        exponent,
    }
}

/// Style chosen by `%g`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum General {
    /// Fixed notation; the precision is the number of fractional digits.
    Fixed(Fixed),
    /// Scientific notation.
    Scientific(Scientific),
}

/// Digits for `%.{precision}g` of a finite `value` (sign ignored).
///
/// Uses the C rule: with `P = max(precision, 1)` and `X` the exponent
/// after rounding to `P` significant digits, fixed notation with `P-1-X`
/// fractional digits if `P > X >= -4`, otherwise scientific with `P-1`.
/// Trailing-zero removal is left to the caller.
pub fn general(value: f64, precision: usize) -> General {
    let p = precision.max(1);
    let sci = scientific(value, p - 1);
    let x = sci.exponent as i64;
    if (p as i64) > x && x >= -4 {
        General::Fixed(fixed(value, (p as i64 - 1 - x) as usize))
    } else {
        General::Scientific(sci)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    fn fixed_str(v: f64, p: usize) -> String {
        let f = fixed(v, p);
        let mut s = String::from_utf8(f.integer().to_vec()).unwrap();
        if p > 0 {
            s.push('.');
            s.push_str(core::str::from_utf8(f.fraction()).unwrap());
            s.extend(core::iter::repeat('0').take(f.trailing_zeros()));
        }
        s
    }

    fn sci_str(v: f64, p: usize) -> (String, i32) {
        let s = scientific(v, p);
        let mut text = String::from_utf8(s.digits.to_vec()).unwrap();
        text.extend(core::iter::repeat('0').take(s.trailing_zeros));
        (text, s.exponent)
    }

    #[test]
    fn decompose_normal_and_subnormal() {
        assert_eq!(decompose(1.0), (1 << 52, -52));
        assert_eq!(decompose(f64::from_bits(1)), (1, -1074));
        assert_eq!(decompose(0.0), (0, -1074));
    }

    #[test]
    fn fixed_rounds_half_to_even() {
        assert_eq!(fixed_str(0.125, 2), "0.12");
        assert_eq!(fixed_str(0.375, 2), "0.38");
        assert_eq!(fixed_str(2.5, 0), "2");
        assert_eq!(fixed_str(3.5, 0), "4");
        // The stored value of 0.1 is slightly above one tenth.
        assert_eq!(fixed_str(0.1, 20), "0.10000000000000000555");
    }

    #[test]
    fn fixed_pads_small_values() {
        assert_eq!(fixed_str(0.0, 3), "0.000");
        assert_eq!(fixed_str(0.001, 2), "0.00");
        assert_eq!(fixed_str(0.005, 4), "0.0050");
    }

    #[test]
    fn fixed_large_values_are_exact() {
        assert_eq!(fixed_str(1e22, 1), "10000000000000000000000.0");
        assert_eq!(fixed_str(1e23, 0), "99999999999999991611392");
    }

    #[test]
    fn scientific_digits_and_exponent() {
        assert_eq!(sci_str(1234.5, 3), ("1234".into(), 3));
        assert_eq!(sci_str(1.0, 4), ("10000".into(), 0));
        assert_eq!(sci_str(0.000123, 1), ("12".into(), -4));
        assert_eq!(sci_str(0.0, 2), ("000".into(), 0));
    }

    #[test]
    fn scientific_carry_bumps_exponent() {
        assert_eq!(sci_str(9.99, 1), ("10".into(), 1));
        assert_eq!(sci_str(999.96, 3), ("1000".into(), 3));
    }

    #[test]
    fn scientific_extremes() {
        assert_eq!(sci_str(f64::MAX, 4), ("17977".into(), 308));
        assert_eq!(sci_str(f64::from_bits(1), 4), ("49407".into(), -324));
    }

    #[test]
    fn huge_precision_pads_with_zeros() {
        let f = fixed(0.5, 1500);
        assert_eq!(f.precision(), 1500);
        assert_eq!(f.fraction().len() + f.trailing_zeros(), 1500);
        assert_eq!(f.fraction()[0], b'5');
        assert!(f.fraction()[1..].iter().all(|&d| d == b'0'));
        assert_eq!(fixed_str(0.5, 1500).len(), 1502);
    }

    #[test]
    fn padding_past_the_expansion_is_not_stored() {
        let f = fixed(0.25, i32::MAX as usize);
        assert_eq!(f.integer(), b"0");
        assert_eq!(f.fraction().len(), MAX_EXACT_FRACTION);
        assert_eq!(f.trailing_zeros(), i32::MAX as usize - MAX_EXACT_FRACTION);

        let s = scientific(0.25, i32::MAX as usize);
        assert_eq!(s.digits.len(), MAX_EXACT_SIGNIFICANT + 1);
        assert_eq!(&s.digits[..2], b"25");
        assert_eq!(s.trailing_zeros, i32::MAX as usize - MAX_EXACT_SIGNIFICANT);
        assert_eq!(s.exponent, -1);

        let zero = scientific(0.0, i32::MAX as usize);
        assert_eq!(zero.digits.len(), MAX_EXACT_SIGNIFICANT + 1);
        assert_eq!(zero.trailing_zeros, i32::MAX as usize - MAX_EXACT_SIGNIFICANT);
    }

    #[test]
    fn general_switches_style() {
        assert!(matches!(general(123456.0, 6), General::Fixed(ref f) if f.fraction().is_empty()));
        assert!(matches!(general(1234567.0, 6), General::Scientific(ref s) if s.exponent == 6));
        assert!(matches!(general(0.0001, 6), General::Fixed(_)));
        assert!(matches!(general(0.00001, 6), General::Scientific(_)));
        assert!(matches!(general(0.0, 0), General::Fixed(_)));
    }
}
