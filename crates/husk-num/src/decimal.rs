//! Scanning decimal literals into an exact digit string.

use smallvec::SmallVec;

/// Significant digits kept exactly. Anything past this only matters as
/// "zero or not", because a midpoint between adjacent doubles never has
/// more than 767 significant digits.
pub(crate) const MAX_DIGITS: usize = 800;

/// Exponents are clamped here while scanning; any value this large is
/// already far outside every format's range.
const EXPONENT_LIMIT: i64 = 1 << 40;

/// Decimal value `0.digits * 10^(digits.len() + exponent)`, i.e. the
/// integer formed by `digits` times `10^exponent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Decimal {
    pub negative: bool,
    /// Digit values `0..=9`, no leading or trailing zeros. Empty is zero.
    pub digits: SmallVec<[u8; 64]>,
    pub exponent: i64,
}

/// Result of scanning one numeric token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Number {
    Finite(Decimal),
    Infinite { negative: bool },
    NaN { negative: bool },
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

fn starts_with_ignore_case(text: &[u8], word: &[u8]) -> bool {
    text.len() >= word.len() && text[..word.len()].eq_ignore_ascii_case(word)
}

struct Accumulator {
    digits: SmallVec<[u8; 64]>,
    exponent: i64,
    truncated: bool,
}

impl Accumulator {
    fn integer_digit(&mut self, d: u8) {
        if self.digits.is_empty() && d == 0 {
            return;
        }
        if self.digits.len() < MAX_DIGITS {
            self.digits.push(d);
        } else {
            self.exponent += 1;
            self.truncated |= d != 0;
        }
    }

    fn fraction_digit(&mut self, d: u8) {
        if self.digits.is_empty() && d == 0 {
            self.exponent -= 1;
            return;
        }
        if self.digits.len() < MAX_DIGITS {
            self.digits.push(d);
            self.exponent -= 1;
        } else {
            self.truncated |= d != 0;
        }
    }
}

/// Scan a `strtod` token at the start of `text`.
///
/// Returns the number and the count of bytes consumed (including leading
/// whitespace), or `None` if no conversion can be performed.
pub(crate) fn scan(text: &[u8]) -> Option<(Number, usize)> {
    let mut pos = 0;
    while text.get(pos).copied().is_some_and(is_space) {
        pos += 1;
    }
    let mut negative = false;
    if let Some(&sign @ (b'+' | b'-')) = text.get(pos) {
        negative = sign == b'-';
        pos += 1;
    }

    let rest = &text[pos..];
    if starts_with_ignore_case(rest, b"inf") {
        let len = if starts_with_ignore_case(rest, b"infinity") {
            8
        } else {
            3
        };
        return Some((Number::Infinite { negative }, pos + len));
    }
    if starts_with_ignore_case(rest, b"nan") {
        return Some((Number::NaN { negative }, pos + 3 + nan_payload(&rest[3..])));
    }

    let mut acc = Accumulator {
        digits: SmallVec::new(),
        exponent: 0,
        truncated: false,
    };
    let mut seen_digit = false;
    while let Some(&b) = text.get(pos).filter(|b| b.is_ascii_digit()) {
        acc.integer_digit(b - b'0');
        seen_digit = true;
        pos += 1;
    }
    if text.get(pos) == Some(&b'.') {
        let mut cursor = pos + 1;
        while let Some(&b) = text.get(cursor).filter(|b| b.is_ascii_digit()) {
            acc.fraction_digit(b - b'0');
            seen_digit = true;
            cursor += 1;
        }
        if seen_digit {
            pos = cursor;
        }
    }
    if !seen_digit {
        return None;
    }

    if let Some(b'e' | b'E') = text.get(pos) {
        if let Some((value, len)) = scan_exponent(&text[pos + 1..]) {
            acc.exponent = acc.exponent.saturating_add(value);
            pos += 1 + len;
        }
    }

    let Accumulator {
        mut digits,
        mut exponent,
        truncated,
    } = acc;
    if truncated {
        // Sticky digit: strictly between the kept prefix and its successor.
        digits.push(1);
        exponent -= 1;
    } else {
        while digits.last() == Some(&0) {
            digits.pop();
            exponent += 1;
        }
    }
    let decimal = Decimal {
        negative,
        digits,
        exponent: exponent.clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT),
    };
    Some((Number::Finite(decimal), pos))
}

/// Signed exponent digits after the `e`. `None` if there are no digits,
/// in which case the `e` is not part of the number.
fn scan_exponent(text: &[u8]) -> Option<(i64, usize)> {
    let mut pos = 0;
    let mut negative = false;
    if let Some(&sign @ (b'+' | b'-')) = text.first() {
        negative = sign == b'-';
        pos += 1;
    }
    let start = pos;
    let mut value = 0i64;
    while let Some(&b) = text.get(pos).filter(|b| b.is_ascii_digit()) {
        value = (value * 10 + (b - b'0') as i64).min(EXPONENT_LIMIT);
        pos += 1;
    }
    if pos == start {
        return None;
    }
    Some((if negative { -value } else { value }, pos))
}

/// Length of an optional `(n-char-sequence)` after `nan`.
fn nan_payload(text: &[u8]) -> usize {
    if text.first() != Some(&b'(') {
        return 0;
    }
    let body = text[1..]
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count();
    if text.get(1 + body) == Some(&b')') {
        body + 2
    } else {
        0
    }
}
