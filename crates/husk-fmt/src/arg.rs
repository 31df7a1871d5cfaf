//! Tagged arguments standing in for C varargs.

use crate::error::FormatError;

/// One formatter argument.
///
/// Integer tags carry the value after C's default promotions; the
/// directive's length modifier then narrows it the way `printf` would.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arg<'a> {
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A floating-point value; `f32` arguments widen exactly.
    Float(f64),
    /// A string; bytes after an embedded NUL are not printed.
    Str(&'a str),
    /// A single byte for `%c`.
    Char(u8),
}

impl Arg<'_> {
    /// Two's-complement bits of an integer-like argument.
    fn integer_bits(&self) -> Option<u64> {
        match *self {
            Self::Int(v) => Some(v as u64),
            Self::Uint(v) => Some(v),
            Self::Char(v) => Some(v as u64),
            Self::Float(_) | Self::Str(_) => None,
        }
    }
}

macro_rules! from_int {
    ($variant:ident, $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Arg<'_> {
                fn from(value: $source) -> Self {
                    Self::$variant(value as $target)
                }
            }
        )*
    };
}

from_int!(Int, i64: i8, i16, i32, i64, isize);
from_int!(Uint, u64: u16, u32, u64, usize);

impl From<f64> for Arg<'_> {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for Arg<'_> {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl From<u8> for Arg<'_> {
    fn from(value: u8) -> Self {
        Self::Char(value)
    }
}

/// Positional cursor over the argument slice.
pub(crate) struct Args<'s, 'a> {
    args: &'s [Arg<'a>],
    next: usize,
}

impl<'s, 'a> Args<'s, 'a> {
    pub(crate) fn new(args: &'s [Arg<'a>]) -> Self {
        Self { args, next: 0 }
    }

    fn take(&mut self) -> Result<(usize, Arg<'a>), FormatError> {
        let index = self.next;
        let arg = *self
            .args
            .get(index)
            .ok_or(FormatError::MissingArgument { index })?;
        self.next += 1;
        Ok((index, arg))
    }

    /// Integer bits for `%d`, `%u`, `%x`, `%o` and `%c`.
    pub(crate) fn integer(&mut self, conversion: char) -> Result<u64, FormatError> {
        let (index, arg) = self.take()?;
        arg.integer_bits()
            .ok_or(FormatError::TypeMismatch { index, conversion })
    }

    /// A `*` width or precision, read as a C `int`.
    pub(crate) fn count(&mut self) -> Result<i32, FormatError> {
        Ok(self.integer('*')? as i32)
    }

    pub(crate) fn float(&mut self, conversion: char) -> Result<f64, FormatError> {
        match self.take()? {
            (_, Arg::Float(v)) => Ok(v),
            (index, _) => Err(FormatError::TypeMismatch { index, conversion }),
        }
    }

    pub(crate) fn string(&mut self) -> Result<&'a str, FormatError> {
        match self.take()? {
            (_, Arg::Str(s)) => Ok(s),
            (index, _) => Err(FormatError::TypeMismatch {
                index,
                conversion: 's',
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_tags() {
        assert_eq!(Arg::from(-3i32), Arg::Int(-3));
        assert_eq!(Arg::from(7usize), Arg::Uint(7));
        assert_eq!(Arg::from(0.5f32), Arg::Float(0.5));
        assert_eq!(Arg::from("x"), Arg::Str("x"));
        assert_eq!(Arg::from(b'a'), Arg::Char(b'a'));
    }

    #[test]
    fn cursor_reports_index() {
        let args = [Arg::Int(1), Arg::Str("s")];
        let mut cursor = Args::new(&args);
        assert_eq!(cursor.integer('d'), Ok(1));
        assert_eq!(
            cursor.float('f'),
            Err(FormatError::TypeMismatch {
                index: 1,
                conversion: 'f'
            })
        );
        assert_eq!(cursor.string(), Err(FormatError::MissingArgument { index: 2 }));
    }

    #[test]
    fn star_count_truncates_to_int() {
        let args = [Arg::Int(-1), Arg::Uint(u64::MAX)];
        let mut cursor = Args::new(&args);
        assert_eq!(cursor.count(), Ok(-1));
        assert_eq!(cursor.count(), Ok(-1));
    }
}
