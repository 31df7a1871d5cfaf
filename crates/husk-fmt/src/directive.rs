//! Format-string parsing.
//!
//! A format string splits into literal runs and directives of the shape
//! `%[flags][width][.precision][length]conversion`.

use crate::error::FormatError;

/// Directive flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FormatFlags {
    /// `-`: left-justify within the width.
    pub left: bool,
    /// `0`: pad numbers with zeros after the sign and prefix.
    pub zero: bool,
    /// `#`: alternate form.
    pub alternate: bool,
    /// `+`: always print a sign on signed conversions.
    pub plus: bool,
    /// ` `: print a space where a `+` would go.
    pub space: bool,
}

/// A width or precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Count {
    /// Written in the format string.
    Literal(usize),
    /// `*`: taken from the next argument.
    FromArg,
}

/// Integer length modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LengthMod {
    /// No modifier: `int`.
    #[default]
    None,
    /// `hh`
    Char,
    /// `h`
    Short,
    /// `l`
    Long,
    /// `ll`
    LongLong,
    /// `j`
    Max,
    /// `z`
    Size,
    /// `t`
    PtrDiff,
    /// `L`; only meaningful for floats.
    LongDouble,
}

impl LengthMod {
    /// Width in bits of the C integer type this modifier selects.
    pub fn bits(self) -> u32 {
        match self {
            Self::Char => 8,
            Self::Short => 16,
            Self::None => 32,
            Self::Long
            | Self::LongLong
            | Self::Max
            | Self::Size
            | Self::PtrDiff
            | Self::LongDouble => 64,
        }
    }
}

/// What a directive prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    /// `%%`
    Percent,
    /// `%s`
    Str,
    /// `%c`
    Char,
    /// `%d`, `%i`
    Signed,
    /// `%u`
    Unsigned,
    /// `%o`
    Octal,
    /// `%x`, `%X`
    Hex {
        /// Upper-case digits.
        upper: bool,
    },
    /// `%f`, `%F`
    Fixed {
        /// Upper-case `INF`/`NAN`.
        upper: bool,
    },
    /// `%e`, `%E`
    Exp {
        /// Upper-case exponent marker and specials.
        upper: bool,
    },
    /// `%g`, `%G`
    General {
        /// Upper-case exponent marker and specials.
        upper: bool,
    },
}

impl Conversion {
    fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            b'%' => Self::Percent,
            b's' => Self::Str,
            b'c' => Self::Char,
            b'd' | b'i' => Self::Signed,
            b'u' => Self::Unsigned,
            b'o' => Self::Octal,
            b'x' => Self::Hex { upper: false },
            b'X' => Self::Hex { upper: true },
            b'f' => Self::Fixed { upper: false },
            b'F' => Self::Fixed { upper: true },
            b'e' => Self::Exp { upper: false },
            b'E' => Self::Exp { upper: true },
            b'g' => Self::General { upper: false },
            b'G' => Self::General { upper: true },
            _ => return None,
        })
    }

    /// The conversion character, for error reports.
    pub fn as_char(self) -> char {
        match self {
            Self::Percent => '%',
            Self::Str => 's',
            Self::Char => 'c',
            Self::Signed => 'd',
            Self::Unsigned => 'u',
            Self::Octal => 'o',
            Self::Hex { upper } => if upper { 'X' } else { 'x' },
            Self::Fixed { upper } => if upper { 'F' } else { 'f' },
            Self::Exp { upper } => if upper { 'E' } else { 'e' },
            Self::General { upper } => if upper { 'G' } else { 'g' },
        }
    }
}

/// One parsed directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatSpec {
    /// Flags in any order.
    pub flags: FormatFlags,
    /// Minimum field width.
    pub width: Option<Count>,
    /// Precision; `.` alone means zero.
    pub precision: Option<Count>,
    /// Integer length modifier.
    pub length: LengthMod,
    /// Conversion character.
    pub conversion: Conversion,
}

/// A piece of a format string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatSegment<'f> {
    /// Bytes copied through unchanged.
    Literal(&'f [u8]),
    /// A conversion directive.
    Directive(FormatSpec),
}

/// Iterator over the segments of a format string.
pub struct Segments<'f> {
    fmt: &'f [u8],
    pos: usize,
}

impl<'f> Segments<'f> {
    /// Segments of `fmt`.
    pub fn new(fmt: &'f [u8]) -> Self {
        Self { fmt, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.fmt.get(self.pos).copied()
    }

    fn number(&mut self) -> usize {
        let mut value = 0usize;
        while let Some(b @ b'0'..=b'9') = self.peek() {
            value = value.saturating_mul(10).saturating_add((b - b'0') as usize);
            self.pos += 1;
        }
        value
    }

    fn count(&mut self) -> Option<Count> {
        match self.peek()? {
            b'*' => {
                self.pos += 1;
                Some(Count::FromArg)
            }
            b'0'..=b'9' => Some(Count::Literal(self.number())),
            _ => None,
        }
    }

    fn length(&mut self) -> LengthMod {
        let (length, len) = match (self.peek(), self.fmt.get(self.pos + 1)) {
            (Some(b'h'), Some(b'h')) => (LengthMod::Char, 2),
            (Some(b'h'), _) => (LengthMod::Short, 1),
            (Some(b'l'), Some(b'l')) => (LengthMod::LongLong, 2),
            (Some(b'l'), _) => (LengthMod::Long, 1),
            (Some(b'j'), _) => (LengthMod::Max, 1),
            (Some(b'z'), _) => (LengthMod::Size, 1),
            (Some(b't'), _) => (LengthMod::PtrDiff, 1),
            (Some(b'L'), _) => (LengthMod::LongDouble, 1),
            _ => (LengthMod::None, 0),
        };
        self.pos += len;
        length
    }

    /// Parse the directive whose `%` has just been consumed.
    fn directive(&mut self) -> Result<FormatSpec, FormatError> {
        let mut flags = FormatFlags::default();
        while let Some(b) = self.peek() {
            match b {
                b'-' => flags.left = true,
                b'0' => flags.zero = true,
                b'#' => flags.alternate = true,
                b'+' => flags.plus = true,
                b' ' => flags.space = true,
                _ => break,
            }
            self.pos += 1;
        }
        let width = self.count();
        let precision = if self.peek() == Some(b'.') {
            self.pos += 1;
            Some(self.count().unwrap_or(Count::Literal(0)))
        } else {
            None
        };
        let length = self.length();
        let b = self.peek().ok_or(FormatError::DanglingPercent)?;
        self.pos += 1;
        let conversion = Conversion::from_byte(b).ok_or(FormatError::UnknownConversion {
            conversion: char::from(b),
        })?;
        Ok(FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
        })
    }
}

impl<'f> Iterator for Segments<'f> {
    type Item = Result<FormatSegment<'f>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.fmt.get(self.pos..).filter(|rest| !rest.is_empty())?;
        if rest[0] != b'%' {
            let len = rest.iter().position(|&b| b == b'%').unwrap_or(rest.len());
            self.pos += len;
            return Some(Ok(FormatSegment::Literal(&rest[..len])));
        }
        self.pos += 1;
        let directive = self.directive();
        if directive.is_err() {
            // Nothing after a malformed directive is meaningful.
            self.pos = self.fmt.len();
        }
        Some(directive.map(FormatSegment::Directive))
    }
}
