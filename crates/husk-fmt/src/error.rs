//! Formatter error types.

use core::fmt;

/// Errors from [`format`](crate::format).
///
/// Argument indices are zero-based positions in the argument slice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// A directive needed an argument past the end of the slice.
    MissingArgument {
        /// Index of the argument that was needed.
        index: usize,
    },
    /// An argument's tag does not fit the directive consuming it.
    TypeMismatch {
        /// Index of the offending argument.
        index: usize,
        /// Conversion character of the directive, or `*`.
        conversion: char,
    },
    /// The conversion character is not supported.
    UnknownConversion {
        /// The unsupported character.
        conversion: char,
    },
    /// The format string ends inside a directive.
    DanglingPercent,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument { index } => write!(f, "missing argument {index}"),
            Self::TypeMismatch { index, conversion } => {
                write!(f, "argument {index} does not match %{conversion}")
            }
            Self::UnknownConversion { conversion } => {
                write!(f, "unknown conversion %{conversion}")
            }
            Self::DanglingPercent => write!(f, "format string ends inside a directive"),
        }
    }
}

impl core::error::Error for FormatError {}
