//! Arbitrary-precision unsigned integers.
//!
//! Just enough arithmetic for exact decimal/binary scaling: multiply by
//! small factors and powers of five, shift, subtract, compare and a
//! quotient/remainder. Limbs are little-endian `u32`s with no zero limb
//! at the top, so equal values always have equal limb vectors.

use core::cmp::Ordering;

use smallvec::SmallVec;

/// `5^13`, the largest power of five that fits in a `u32`.
const POW5_13: u32 = 1_220_703_125;

const POW5: [u32; 13] = [
    1, 5, 25, 125, 625, 3125, 15625, 78125, 390625, 1953125, 9765625, 48828125, 244140625,
];

/// Inline limb capacity: 1024 bits covers every quotient, most of the
/// `%f`/`%e` numerators and short decimal inputs without spilling.
type Limbs = SmallVec<[u32; 32]>;

/// Unsigned big integer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Big {
    limbs: Limbs,
}

impl Big {
    /// Zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// The value of `v`.
    pub fn from_u64(v: u64) -> Self {
        let mut big = Self {
            limbs: Limbs::from_slice(&[v as u32, (v >> 32) as u32]),
        };
        big.normalize();
        big
    }

    /// Parse a sequence of decimal digit values (each `0..=9`, most
    /// significant first).
    pub fn from_decimal_digits(digits: &[u8]) -> Self {
        let mut big = Self::zero();
        for chunk in digits.chunks(9) {
            let mut value = 0u32;
            for &d in chunk {
                value = value * 10 + d as u32;
            }
            big.mul_small(10u32.pow(chunk.len() as u32));
            big.add_small(value);
        }
        big
    }

    /// `true` if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.limbs.is_empty()
    }

    fn is_one(&self) -> bool {
        self.limbs.len() == 1 && self.limbs[0] == 1
    }

    /// Number of significant bits; zero for zero.
    pub fn bit_len(&self) -> usize {
        match self.limbs.last() {
            None => 0,
            Some(&top) => (self.limbs.len() - 1) * 32 + (32 - top.leading_zeros() as usize),
        }
    }

    /// The value as a `u64`, if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        match self.limbs.as_slice() {
            [] => Some(0),
            [lo] => Some(*lo as u64),
            [lo, hi] => Some(((*hi as u64) << 32) | *lo as u64),
            _ => None,
        }
    }

    /// `true` if bit `i` is set.
    pub fn bit(&self, i: usize) -> bool {
        self.limbs
            .get(i / 32)
            .is_some_and(|limb| (limb >> (i % 32)) & 1 == 1)
    }

    fn set_bit(&mut self, i: usize) {
        let word = i / 32;
        if self.limbs.len() <= word {
            self.limbs.resize(word + 1, 0);
        }
        self.limbs[word] |= 1 << (i % 32);
    }

    fn normalize(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }

    /// `self *= m`.
    pub fn mul_small(&mut self, m: u32) {
        if m == 0 {
            self.limbs.clear();
            return;
        }
        let mut carry = 0u64;
        for limb in self.limbs.iter_mut() {
            let v = *limb as u64 * m as u64 + carry;
            *limb = v as u32;
            carry = v >> 32;
        }
        if carry != 0 {
            self.limbs.push(carry as u32);
        }
    }

    /// `self += a`.
    pub fn add_small(&mut self, a: u32) {
        let mut carry = a as u64;
        for limb in self.limbs.iter_mut() {
            if carry == 0 {
                break;
            }
            let v = *limb as u64 + carry;
            *limb = v as u32;
            carry = v >> 32;
        }
        if carry != 0 {
            self.limbs.push(carry as u32);
        }
    }

    /// `self *= 5^n`.
    pub fn mul_pow5(&mut self, mut n: u32) {
        while n >= 13 {
            self.mul_small(POW5_13);
            n -= 13;
        }
        self.mul_small(POW5[n as usize]);
    }

    /// `self *= 10^n`.
    pub fn mul_pow10(&mut self, n: u32) {
        self.mul_pow5(n);
        self.shl(n as usize);
    }

    /// `self <<= bits`.
    pub fn shl(&mut self, bits: usize) {
        if self.is_zero() {
            return;
        }
        let words = bits / 32;
        let rem = bits % 32;
        if rem != 0 {
            let mut carry = 0u32;
            for limb in self.limbs.iter_mut() {
                let v = (*limb << rem) | carry;
                carry = *limb >> (32 - rem);
                *limb = v;
            }
            if carry != 0 {
                self.limbs.push(carry);
            }
        }
        if words != 0 {
            self.limbs.insert_many(0, core::iter::repeat(0).take(words));
        }
    }

    fn shr1(&mut self) {
        let mut carry = 0u32;
        for limb in self.limbs.iter_mut().rev() {
            let v = (*limb >> 1) | carry;
            carry = *limb << 31;
            *limb = v;
        }
        self.normalize();
    }

    /// `self -= other`. Requires `self >= other`.
    pub fn sub_assign(&mut self, other: &Big) {
        debug_assert!(*self >= *other, "big subtraction underflow");
        let mut borrow = 0i64;
        for (i, limb) in self.limbs.iter_mut().enumerate() {
            let rhs = other.limbs.get(i).copied().unwrap_or(0) as i64;
            if i >= other.limbs.len() && borrow == 0 {
                break;
            }
            let mut v = *limb as i64 - rhs - borrow;
            borrow = 0;
            if v < 0 {
                v += 1 << 32;
                borrow = 1;
            }
            *limb = v as u32;
        }
        self.normalize();
    }

    /// Divide by `den`, leaving the remainder in `self` and returning the
    /// quotient.
    ///
    /// Restoring binary long division: cost is linear in the quotient's
    /// bit length, which is small for every caller in this crate.
    ///
    /// # Panics
    ///
    /// Panics if `den` is zero.
    pub fn div_rem(&mut self, den: &Big) -> Big {
        assert!(!den.is_zero(), "big division by zero");
        if *self < *den {
            return Big::zero();
        }
        if den.is_one() {
            return core::mem::take(self);
        }
        let shift = self.bit_len() - den.bit_len();
        let mut d = den.clone();
        d.shl(shift);
        let mut quotient = Big::zero();
        for i in (0..=shift).rev() {
            if *self >= d {
                self.sub_assign(&d);
                quotient.set_bit(i);
            }
            d.shr1();
        }
        quotient
    }

    /// Divide by a small divisor in place, returning the remainder.
    ///
    /// # Panics
    ///
    /// Panics if `d` is zero.
    pub fn div_rem_small(&mut self, d: u32) -> u32 {
        assert!(d != 0, "big division by zero");
        let mut rem = 0u64;
        for limb in self.limbs.iter_mut().rev() {
            let cur = (rem << 32) | *limb as u64;
            *limb = (cur / d as u64) as u32;
            rem = cur % d as u64;
        }
        self.normalize();
        rem as u32
    }

    /// ASCII decimal digits, most significant first. Zero is `"0"`.
    pub fn to_decimal(&self) -> SmallVec<[u8; 64]> {
        let mut out = SmallVec::new();
        if self.is_zero() {
            out.push(b'0');
            return out;
        }
        let mut chunks: SmallVec<[u32; 32]> = SmallVec::new();
        let mut rest = self.clone();
        while !rest.is_zero() {
            chunks.push(rest.div_rem_small(1_000_000_000));
        }
        let mut chunks = chunks.into_iter().rev();
        if let Some(top) = chunks.next() {
            push_decimal(&mut out, top, false);
        }
        for chunk in chunks {
            push_decimal(&mut out, chunk, true);
        }
        out
    }
}

/// Append the digits of `value`, zero-padded to nine when `pad` is set.
fn push_decimal(out: &mut SmallVec<[u8; 64]>, value: u32, pad: bool) {
    let mut buf = [b'0'; 9];
    let mut v = value;
    let mut start = 9;
    while v != 0 {
        start -= 1;
        buf[start] = b'0' + (v % 10) as u8;
        v /= 10;
    }
    let from = if pad { 0 } else { start.min(8) };
    out.extend_from_slice(&buf[from..]);
}

impl Ord for Big {
    fn cmp(&self, other: &Self) -> Ordering {
        self.limbs
            .len()
            .cmp(&other.limbs.len())
            .then_with(|| self.limbs.iter().rev().cmp(other.limbs.iter().rev()))
    }
}

impl PartialOrd for Big {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
