//! IEEE-754 format parameters shared by the parser.

use core::ops::{Div, Mul, Neg};

/// A binary floating-point format the parser can produce.
///
/// `p` below is [`MANTISSA_BITS`](RawFloat::MANTISSA_BITS). A finite value
/// is `q * 2^k` with `q < 2^p` and `MIN_EXP <= k <= MAX_EXP`.
pub trait RawFloat: Copy + Neg<Output = Self> + Mul<Output = Self> + Div<Output = Self> {
    /// Significand precision including the hidden bit.
    const MANTISSA_BITS: u32;
    /// Scale exponent `k` of the subnormal range.
    const MIN_EXP: i64;
    /// Largest scale exponent `k` of a finite value.
    const MAX_EXP: i64;
    /// Decimal magnitudes (digit count + exponent) above this are infinite.
    const MAX_MAGNITUDE: i64;
    /// Decimal magnitudes below this round to zero.
    const MIN_MAGNITUDE: i64;
    /// Largest `|e|` for which `10^e` is exact in this format.
    const EXACT_POW10: i32;
    /// Largest integer below which every integer is exact in this format.
    const EXACT_INT: u64;

    /// Positive zero.
    const ZERO: Self;

    /// Build a value from its magnitude bits and a sign.
    fn from_parts(negative: bool, bits: u64) -> Self;

    /// Correctly rounded conversion from an integer.
    fn from_u64(v: u64) -> Self;

    /// `10^e` for `0 <= e <= EXACT_POW10`.
    fn pow10(e: i32) -> Self;

    /// Signed infinity.
    fn infinity(negative: bool) -> Self;

    /// Quiet NaN carrying the sign.
    fn nan(negative: bool) -> Self;
}

const POW10_F64: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

const POW10_F32: [f32; 11] = [1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10];

impl RawFloat for f64 {
    const MANTISSA_BITS: u32 = 53;
    const MIN_EXP: i64 = -1074;
    const MAX_EXP: i64 = 971;
    const MAX_MAGNITUDE: i64 = 310;
    const MIN_MAGNITUDE: i64 = -325;
    const EXACT_POW10: i32 = 22;
    const EXACT_INT: u64 = 1 << 53;
    const ZERO: Self = 0.0;

    fn from_parts(negative: bool, bits: u64) -> Self {
        f64::from_bits(bits | (negative as u64) << 63)
    }

    fn from_u64(v: u64) -> Self {
        v as f64
    }

    fn pow10(e: i32) -> Self {
        POW10_F64[e as usize]
    }

    fn infinity(negative: bool) -> Self {
        if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    }

    fn nan(negative: bool) -> Self {
        if negative {
            -f64::NAN
        } else {
            f64::NAN
        }
    }
}

impl RawFloat for f32 {
    const MANTISSA_BITS: u32 = 24;
    const MIN_EXP: i64 = -149;
    const MAX_EXP: i64 = 104;
    const MAX_MAGNITUDE: i64 = 40;
    const MIN_MAGNITUDE: i64 = -47;
    const EXACT_POW10: i32 = 10;
    const EXACT_INT: u64 = 1 << 24;
    const ZERO: Self = 0.0;

    fn from_parts(negative: bool, bits: u64) -> Self {
        f32::from_bits(bits as u32 | (negative as u32) << 31)
    }

    fn from_u64(v: u64) -> Self {
        v as f32
    }

    fn pow10(e: i32) -> Self {
        POW10_F32[e as usize]
    }

    fn infinity(negative: bool) -> Self {
        if negative {
            f32::NEG_INFINITY
        } else {
            f32::INFINITY
        }
    }

    fn nan(negative: bool) -> Self {
        if negative {
            -f32::NAN
        } else {
            f32::NAN
        }
    }
}
