//! Bounded `printf`-subset formatter.
//!
//! [`format`] interprets a C format string against an explicit slice of
//! tagged [`Arg`]s and writes into a caller-owned byte buffer. Output is
//! truncated to `capacity - 1` bytes and always NUL-terminated when the
//! buffer is non-empty; the return value is the length the output would
//! have had without truncation, as `snprintf` reports it.
//!
//! Supported directives are `%%`, `%s`, `%c`, `%d`/`%i`, `%u`, `%o`,
//! `%x`/`%X`, `%f`/`%F`, `%e`/`%E` and `%g`/`%G` with the usual flags,
//! literal or `*` width and precision, and the `hh` to `ll`, `j`, `z`, `t`
//! and `L` length modifiers. Float digits come from [`husk_num::digits`]
//! and are exact.
//!
//! ```
//! use husk_fmt::{format, Arg};
//!
//! let mut buf = [0u8; 16];
//! let len = format(&mut buf, "%06x|%.2f", &[Arg::Uint(0xbeef), Arg::Float(2.675)]).unwrap();
//! assert_eq!(&buf[..len], b"00beef|2.67");
//! ```

#![no_std]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod arg;
pub mod directive;
pub mod error;
mod render;
mod sink;

pub use arg::Arg;
pub use directive::{Conversion, Count, FormatFlags, FormatSegment, FormatSpec, LengthMod, Segments};
pub use error::FormatError;

use arg::Args;
use sink::Sink;

/// Format `args` according to `fmt` into `buf`.
///
/// Returns the intended length of the output, excluding the terminator.
/// On error the buffer holds the output produced before the failing
/// directive, terminated.
pub fn format(buf: &mut [u8], fmt: &str, args: &[Arg<'_>]) -> Result<usize, FormatError> {
    let mut sink = Sink::new(buf);
    let result = write_segments(&mut sink, fmt.as_bytes(), args);
    let len = sink.finish();
    result.map(|()| len)
}

fn write_segments(sink: &mut Sink<'_>, fmt: &[u8], args: &[Arg<'_>]) -> Result<(), FormatError> {
    let mut args = Args::new(args);
    for segment in Segments::new(fmt) {
        match segment? {
            FormatSegment::Literal(bytes) => sink.extend(bytes),
            FormatSegment::Directive(spec) => render::directive(sink, &spec, &mut args)?,
        }
    }
    Ok(())
}

/// C-shaped wrapper around [`format`]: the intended length, or `-1` if the
/// format fails or the length does not fit an `int`.
pub fn snprintf(buf: &mut [u8], fmt: &str, args: &[Arg<'_>]) -> i32 {
    format(buf, fmt, args)
        .ok()
        .and_then(|len| i32::try_from(len).ok())
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    fn fmt(fmt: &str, args: &[Arg<'_>]) -> String {
        let mut buf = [0u8; 256];
        let len = format(&mut buf, fmt, args).unwrap();
        String::from_utf8(buf[..len].to_vec()).unwrap()
    }

    #[test]
    fn integers() {
        assert_eq!(fmt("%d %i", &[Arg::Int(-42), Arg::Int(7)]), "-42 7");
        assert_eq!(fmt("%+d % d", &[Arg::Int(5), Arg::Int(5)]), "+5  5");
        assert_eq!(fmt("%5d|%-5d|%05d", &[Arg::Int(-3), Arg::Int(-3), Arg::Int(-3)]), "   -3|-3   |-0003");
        assert_eq!(fmt("%.3d|%08.3d", &[Arg::Int(7), Arg::Int(7)]), "007|     007");
        assert_eq!(fmt("%.0d|", &[Arg::Int(0)]), "|");
        assert_eq!(fmt("%u", &[Arg::Int(-1)]), "4294967295");
        assert_eq!(fmt("%lu", &[Arg::Int(-1)]), "18446744073709551615");
        assert_eq!(fmt("%hhd", &[Arg::Int(255)]), "-1");
        assert_eq!(fmt("%lld", &[Arg::Int(i64::MIN)]), "-9223372036854775808");
    }

    #[test]
    fn hex_and_octal() {
        assert_eq!(fmt("%x %X", &[Arg::Uint(255), Arg::Uint(255)]), "ff FF");
        assert_eq!(fmt("%#x %#x", &[Arg::Uint(255), Arg::Uint(0)]), "0xff 0");
        assert_eq!(fmt("%#010x", &[Arg::Uint(255)]), "0x000000ff");
        assert_eq!(fmt("%o %#o %#o", &[Arg::Uint(8), Arg::Uint(8), Arg::Uint(0)]), "10 010 0");
        assert_eq!(fmt("%#.0o", &[Arg::Uint(0)]), "0");
    }

    #[test]
    fn strings_and_chars() {
        assert_eq!(fmt("[%5s][%-5s]", &[Arg::Str("ab"), Arg::Str("ab")]), "[   ab][ab   ]");
        assert_eq!(fmt("%.2s", &[Arg::Str("hello")]), "he");
        assert_eq!(fmt("%s", &[Arg::Str("a\0b")]), "a");
        assert_eq!(fmt("%c%3c", &[Arg::Char(b'x'), Arg::Int(b'y' as i64)]), "x  y");
        assert_eq!(fmt("100%%", &[]), "100%");
    }

    #[test]
    fn star_counts() {
        assert_eq!(fmt("%*d", &[Arg::Int(4), Arg::Int(1)]), "   1");
        assert_eq!(fmt("%*d|", &[Arg::Int(-4), Arg::Int(1)]), "1   |");
        assert_eq!(fmt("%.*f", &[Arg::Int(-1), Arg::Float(0.5)]), "0.500000");
        assert_eq!(fmt("%.*s", &[Arg::Int(3), Arg::Str("abcdef")]), "abc");
    }

    #[test]
    fn floats() {
        assert_eq!(fmt("%f", &[Arg::Float(1.5)]), "1.500000");
        assert_eq!(fmt("%.0f %#.0f", &[Arg::Float(2.5), Arg::Float(2.5)]), "2 2.");
        assert_eq!(fmt("%e", &[Arg::Float(12345.678)]), "1.234568e+04");
        assert_eq!(fmt("%E", &[Arg::Float(-0.0)]), "-0.000000E+00");
        assert_eq!(fmt("%g %g", &[Arg::Float(0.0001), Arg::Float(123456789.0)]), "0.0001 1.23457e+08");
        assert_eq!(fmt("%+09.2f", &[Arg::Float(3.14159)]), "+00003.14");
        assert_eq!(fmt("%-8.1f|", &[Arg::Float(-2.25)]), "-2.2    |");
    }

    #[test]
    fn non_finite_floats() {
        assert_eq!(fmt("%f %F", &[Arg::Float(f64::INFINITY), Arg::Float(f64::NEG_INFINITY)]), "inf -INF");
        assert_eq!(fmt("%05f", &[Arg::Float(f64::INFINITY)]), "  inf");
        assert_eq!(fmt("%e %G", &[Arg::Float(f64::NAN), Arg::Float(-f64::NAN)]), "nan -NAN");
        assert_eq!(fmt("%+f", &[Arg::Float(f64::INFINITY)]), "+inf");
    }

    #[test]
    fn errors() {
        let mut buf = [0u8; 8];
        assert_eq!(
            format(&mut buf, "%d %d", &[Arg::Int(1)]),
            Err(FormatError::MissingArgument { index: 1 })
        );
        assert_eq!(&buf[..3], b"1 \0");
        assert_eq!(
            format(&mut buf, "%f", &[Arg::Int(1)]),
            Err(FormatError::TypeMismatch { index: 0, conversion: 'f' })
        );
        assert_eq!(
            format(&mut buf, "%y", &[]),
            Err(FormatError::UnknownConversion { conversion: 'y' })
        );
        assert_eq!(format(&mut buf, "50%", &[]), Err(FormatError::DanglingPercent));
        assert_eq!(snprintf(&mut buf, "%s", &[]), -1);
    }
}
