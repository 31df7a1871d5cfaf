//! Rendering of individual directives.

use husk_num::digits::{self, General};
use smallvec::SmallVec;

use crate::arg::Args;
use crate::directive::{Conversion, Count, FormatFlags, FormatSpec, LengthMod};
use crate::error::FormatError;
use crate::sink::Sink;

type Body = SmallVec<[u8; 64]>;

const DEFAULT_FLOAT_PRECISION: usize = 6;

/// A directive with its `*` counts resolved.
struct Field {
    flags: FormatFlags,
    width: usize,
    precision: Option<usize>,
}

/// Text of one converted value, laid out as
/// `lead_zeros text trailing_zeros suffix`.
///
/// The zero runs are counts: a precision in the billions is streamed into
/// the sink rather than buffered.
#[derive(Clone, Copy, Default)]
struct Parts<'a> {
    lead_zeros: usize,
    text: &'a [u8],
    trailing_zeros: usize,
    suffix: &'a [u8],
}

impl<'a> Parts<'a> {
    fn text(text: &'a [u8]) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    fn len(&self) -> usize {
        self.lead_zeros
            .saturating_add(self.text.len())
            .saturating_add(self.trailing_zeros)
            .saturating_add(self.suffix.len())
    }

    fn write(&self, sink: &mut Sink<'_>) {
        sink.fill(b'0', self.lead_zeros);
        sink.extend(self.text);
        sink.fill(b'0', self.trailing_zeros);
        sink.extend(self.suffix);
    }
}

/// Owned form of [`Parts`] for numeric conversions.
#[derive(Default)]
struct Converted {
    lead_zeros: usize,
    body: Body,
    trailing_zeros: usize,
    exponent: Body,
}

impl Converted {
    fn parts(&self) -> Parts<'_> {
        Parts {
            lead_zeros: self.lead_zeros,
            text: &self.body,
            trailing_zeros: self.trailing_zeros,
            suffix: &self.exponent,
        }
    }
}

/// Render one directive, consuming its arguments.
pub(crate) fn directive(
    sink: &mut Sink<'_>,
    spec: &FormatSpec,
    args: &mut Args<'_, '_>,
) -> Result<(), FormatError> {
    let mut flags = spec.flags;
    let width = match spec.width {
        None => 0,
        Some(Count::Literal(n)) => n,
        Some(Count::FromArg) => {
            let n = args.count()?;
            flags.left |= n < 0;
            n.unsigned_abs() as usize
        }
    };
    let precision = match spec.precision {
        None => None,
        Some(Count::Literal(n)) => Some(n),
        Some(Count::FromArg) => usize::try_from(args.count()?).ok(),
    };
    let field = Field {
        flags,
        width,
        precision,
    };

    let conversion = spec.conversion;
    match conversion {
        Conversion::Percent => sink.push(b'%'),
        Conversion::Str => {
            let text = args.string()?.as_bytes();
            let text = text.split(|&b| b == 0).next().unwrap_or(text);
            let text = &text[..field.precision.map_or(text.len(), |p| p.min(text.len()))];
            emit(sink, &field, b"", Parts::text(text), false);
        }
        Conversion::Char => {
            let byte = args.integer(conversion.as_char())? as u8;
            emit(sink, &field, b"", Parts::text(&[byte]), false);
        }
        Conversion::Signed => {
            let value = sign_extend(args.integer('d')?, spec.length);
            let sign = sign_prefix(value < 0, flags);
            let body = integer_body(value.unsigned_abs(), 10, false, field.precision);
            emit(sink, &field, sign, body.parts(), field.precision.is_none());
        }
        Conversion::Unsigned | Conversion::Octal | Conversion::Hex { .. } => {
            let value = truncate(args.integer(conversion.as_char())?, spec.length);
            let (radix, upper) = match conversion {
                Conversion::Octal => (8, false),
                Conversion::Hex { upper } => (16, upper),
                _ => (10, false),
            };
            let mut body = integer_body(value, radix, upper, field.precision);
            let prefix: &[u8] = match conversion {
                Conversion::Hex { upper } if flags.alternate && value != 0 => {
                    if upper {
                        b"0X"
                    } else {
                        b"0x"
                    }
                }
                Conversion::Octal
                    if flags.alternate && body.lead_zeros == 0 && body.body.first() != Some(&b'0') =>
                {
                    body.lead_zeros = 1;
                    b""
                }
                _ => b"",
            };
            emit(sink, &field, prefix, body.parts(), field.precision.is_none());
        }
        Conversion::Fixed { upper } | Conversion::Exp { upper } | Conversion::General { upper } => {
            let value = args.float(conversion.as_char())?;
            let sign = sign_prefix(value.is_sign_negative(), flags);
            if !value.is_finite() {
                let body: &[u8] = match (value.is_nan(), upper) {
                    (true, false) => b"nan",
                    (true, true) => b"NAN",
                    (false, false) => b"inf",
                    (false, true) => b"INF",
                };
                emit(sink, &field, sign, Parts::text(body), false);
                return Ok(());
            }
            let precision = field.precision.unwrap_or(DEFAULT_FLOAT_PRECISION);
            let body = match conversion {
                Conversion::Fixed { .. } => fixed_body(value, precision, flags.alternate),
                Conversion::Exp { .. } => exp_body(value, precision, flags.alternate, upper),
                _ => general_body(value, precision, flags.alternate, upper),
            };
            emit(sink, &field, sign, body.parts(), true);
        }
    }
    Ok(())
}

/// Write `prefix` and `parts` justified within the field width. Zero
/// padding goes between the two and only applies when `zero_pad` allows.
fn emit(sink: &mut Sink<'_>, field: &Field, prefix: &[u8], parts: Parts<'_>, zero_pad: bool) {
    let padding = field
        .width
        .saturating_sub(parts.len().saturating_add(prefix.len()));
    if field.flags.left {
        sink.extend(prefix);
        parts.write(sink);
        sink.fill(b' ', padding);
    } else if field.flags.zero && zero_pad {
        sink.extend(prefix);
        sink.fill(b'0', padding);
        parts.write(sink);
    } else {
        sink.fill(b' ', padding);
        sink.extend(prefix);
        parts.write(sink);
    }
}

fn sign_prefix(negative: bool, flags: FormatFlags) -> &'static [u8] {
    if negative {
        b"-"
    } else if flags.plus {
        b"+"
    } else if flags.space {
        b" "
    } else {
        b""
    }
}

fn sign_extend(bits: u64, length: LengthMod) -> i64 {
    let shift = 64 - length.bits();
    ((bits << shift) as i64) >> shift
}

fn truncate(bits: u64, length: LengthMod) -> u64 {
    match length.bits() {
        64 => bits,
        n => bits & ((1 << n) - 1),
    }
}

/// Append the digits of `value` in `radix`; nothing for zero.
fn push_radix(out: &mut Body, mut value: u64, radix: u64, upper: bool) {
    let table: &[u8; 16] = if upper {
        b"0123456789ABCDEF"
    } else {
        b"0123456789abcdef"
    };
    let mut scratch = [0u8; 22];
    let mut at = scratch.len();
    while value != 0 {
        at -= 1;
        scratch[at] = table[(value % radix) as usize];
        value /= radix;
    }
    out.extend_from_slice(&scratch[at..]);
}

/// Digits of `value` in `radix`, zero-extended to the integer precision.
/// A zero value with precision zero has no digits.
fn integer_body(value: u64, radix: u64, upper: bool, precision: Option<usize>) -> Converted {
    let mut body = Body::new();
    push_radix(&mut body, value, radix, upper);
    let min = precision.unwrap_or(1);
    Converted {
        lead_zeros: min.saturating_sub(body.len()),
        body,
        ..Converted::default()
    }
}

fn fixed_body(value: f64, precision: usize, alternate: bool) -> Converted {
    let fixed = digits::fixed(value, precision);
    let mut body = Body::new();
    body.extend_from_slice(fixed.integer());
    if precision > 0 || alternate {
        body.push(b'.');
    }
    body.extend_from_slice(fixed.fraction());
    Converted {
        body,
        trailing_zeros: fixed.trailing_zeros(),
        ..Converted::default()
    }
}

fn mantissa_body(sci: &digits::Scientific, alternate: bool) -> Body {
    let mut body = Body::new();
    body.push(sci.digits[0]);
    if sci.digits.len() > 1 || sci.trailing_zeros > 0 || alternate {
        body.push(b'.');
    }
    body.extend_from_slice(&sci.digits[1..]);
    body
}

fn exponent_suffix(exponent: i32, upper: bool) -> Body {
    let mut out = Body::new();
    out.push(if upper { b'E' } else { b'e' });
    out.push(if exponent < 0 { b'-' } else { b'+' });
    let magnitude = exponent.unsigned_abs();
    if magnitude < 10 {
        out.push(b'0');
    }
    if magnitude == 0 {
        out.push(b'0');
    }
    push_radix(&mut out, magnitude as u64, 10, false);
    out
}

fn exp_body(value: f64, precision: usize, alternate: bool, upper: bool) -> Converted {
    let sci = digits::scientific(value, precision);
    Converted {
        body: mantissa_body(&sci, alternate),
        trailing_zeros: sci.trailing_zeros,
        exponent: exponent_suffix(sci.exponent, upper),
        ..Converted::default()
    }
}

/// Drop trailing fractional zeros, and the point if nothing follows it.
fn strip_fraction_zeros(body: &mut Body) {
    if !body.contains(&b'.') {
        return;
    }
    while body.last() == Some(&b'0') {
        body.pop();
    }
    if body.last() == Some(&b'.') {
        body.pop();
    }
}

/// `%g`. Without `#` the padding zeros are dropped along with any stored
/// trailing zeros.
fn general_body(value: f64, precision: usize, alternate: bool, upper: bool) -> Converted {
    let mut converted = match digits::general(value, precision) {
        General::Fixed(fixed) => {
            let mut body = Body::new();
            body.extend_from_slice(fixed.integer());
            if fixed.precision() > 0 || alternate {
                body.push(b'.');
            }
            body.extend_from_slice(fixed.fraction());
            Converted {
                body,
                trailing_zeros: fixed.trailing_zeros(),
                ..Converted::default()
            }
        }
        General::Scientific(sci) => Converted {
            body: mantissa_body(&sci, alternate),
            trailing_zeros: sci.trailing_zeros,
            exponent: exponent_suffix(sci.exponent, upper),
            ..Converted::default()
        },
    };
    if !alternate {
        converted.trailing_zeros = 0;
        strip_fraction_zeros(&mut converted.body);
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn text(converted: &Converted) -> Vec<u8> {
        let parts = converted.parts();
        let mut out = Vec::new();
        out.extend(core::iter::repeat(b'0').take(parts.lead_zeros));
        out.extend_from_slice(parts.text);
        out.extend(core::iter::repeat(b'0').take(parts.trailing_zeros));
        out.extend_from_slice(parts.suffix);
        out
    }

    #[test]
    fn length_modifiers_narrow_like_c() {
        assert_eq!(sign_extend(0xff, LengthMod::Char), -1);
        assert_eq!(sign_extend(0x1_0000_0005, LengthMod::None), 5);
        assert_eq!(sign_extend(u64::MAX, LengthMod::Long), -1);
        assert_eq!(truncate(0x1234, LengthMod::Char), 0x34);
        assert_eq!(truncate(u64::MAX, LengthMod::None), u32::MAX as u64);
        assert_eq!(truncate(u64::MAX, LengthMod::Size), u64::MAX);
    }

    #[test]
    fn integer_precision() {
        assert_eq!(text(&integer_body(0, 10, false, Some(0))), b"");
        assert_eq!(text(&integer_body(0, 10, false, None)), b"0");
        assert_eq!(text(&integer_body(42, 10, false, Some(5))), b"00042");
        assert_eq!(text(&integer_body(u64::MAX, 8, false, None)).len(), 22);
        assert_eq!(text(&integer_body(0xbeef, 16, true, None)), b"BEEF");
    }

    #[test]
    fn integer_precision_zeros_are_counted_not_stored() {
        let body = integer_body(7, 10, false, Some(i32::MAX as usize));
        assert_eq!(body.lead_zeros, i32::MAX as usize - 1);
        assert_eq!(body.body.as_slice(), b"7");
        assert_eq!(body.parts().len(), i32::MAX as usize);
    }

    #[test]
    fn float_padding_zeros_are_counted_not_stored() {
        let fixed = fixed_body(0.5, i32::MAX as usize, false);
        assert_eq!(fixed.parts().len(), i32::MAX as usize + 2);
        assert!(fixed.body.len() < 2048);

        let exp = exp_body(0.5, i32::MAX as usize, false, false);
        assert_eq!(exp.exponent.as_slice(), b"e-01");
        assert_eq!(exp.parts().len(), i32::MAX as usize + 2 + 4);
        assert!(exp.body.len() < 2048);

        let general = general_body(0.5, i32::MAX as usize, false, false);
        assert_eq!(text(&general), b"0.5");
    }

    #[test]
    fn general_strips_zeros() {
        assert_eq!(text(&general_body(100.0, 6, false, false)), b"100");
        assert_eq!(text(&general_body(0.5, 6, false, false)), b"0.5");
        assert_eq!(text(&general_body(0.5, 6, true, false)), b"0.500000");
        assert_eq!(text(&general_body(1e-5, 6, false, false)), b"1e-05");
        assert_eq!(text(&general_body(1.5e10, 3, false, true)), b"1.5E+10");
        assert_eq!(text(&general_body(1e10, 1, true, false)), b"1.e+10");
    }

    #[test]
    fn exponent_has_two_digits_minimum() {
        assert_eq!(text(&exp_body(1.0, 2, false, false)), b"1.00e+00");
        assert_eq!(text(&exp_body(1e-300, 0, false, false)), b"1e-300");
        assert_eq!(text(&exp_body(1e5, 0, true, true)), b"1.E+05");
    }
}
