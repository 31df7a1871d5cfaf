//! Correctly rounded conversion between decimal text and IEEE-754 binary.
//!
//! Both directions are exact:
//!
//! - [`strtod`] / [`strtof`] return the binary64 / binary32 value nearest
//!   the decimal literal, ties to even, for inputs of any length.
//! - [`digits::fixed`], [`digits::scientific`] and [`digits::general`]
//!   produce the correctly rounded decimal digits a conforming `printf`
//!   prints for `%f`, `%e` and `%g`.
//!
//! The exact paths share one piece of machinery, the [`Big`] unsigned
//! integer: a value is written as a quotient of big integers and the
//! remainder decides the last bit or digit.
//!
//! The crate is `no_std` and uses `alloc` only when a big integer or digit
//! buffer outgrows its inline storage.

#![no_std]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod big;
mod decimal;
pub mod digits;
pub mod float;
pub mod parse;

pub use big::Big;
pub use digits::{DigitBuf, Fixed, General, Scientific};
pub use float::RawFloat;
pub use parse::{parse_f32, parse_f64, strtod, strtof};
