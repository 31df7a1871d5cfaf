//! Husk: a host-independent runtime substrate for no_std parsers.
//!
//! This is the facade crate. It re-exports the sub-crates and adds
//! [`Runtime`], which owns one heap (and through it the injected
//! [`OsShim`](shim::OsShim)) and offers the C-shaped entry points a parser
//! ported from C expects: `malloc`, `realloc`, `free`, `snprintf`,
//! `strtod` and `strtof`.
//!
//! # Quick start
//!
//! ```rust
//! use husk::prelude::*;
//!
//! let mut rt = Runtime::system();
//! let p = rt.malloc(32).unwrap();
//! rt.get_mut(p).unwrap()[..5].copy_from_slice(b"3.25x");
//!
//! let mut end = 0;
//! let value = rt.strtod(rt.get(p).unwrap(), Some(&mut end));
//! assert_eq!((value, end), (3.25, 4));
//!
//! let mut line = [0u8; 32];
//! let len = rt.snprintf(&mut line, "value=%g", &[Arg::Float(value)]);
//! assert_eq!(&line[..len as usize], b"value=3.25");
//! rt.free(Some(p));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`shim`] | `husk-core` | `OsShim` trait, system shim, shim config |
//! | [`heap`] | `husk-heap` | Arena/block allocator, handles, stats |
//! | [`num`] | `husk-num` | `strtod`/`strtof`, exact digit generation |
//! | [`fmt`] | `husk-fmt` | Bounded `printf` subset |

#![no_std]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

/// The host boundary (`husk-core`).
pub use husk_core as shim;

/// The allocator (`husk-heap`).
///
/// [`heap::Heap`] is the full interface; [`Runtime`] wraps it with
/// null-returning C semantics.
pub use husk_heap as heap;

/// Decimal/binary float conversion (`husk-num`).
pub use husk_num as num;

/// The `printf` subset (`husk-fmt`).
pub use husk_fmt as fmt;

mod runtime;

pub use runtime::Runtime;

/// Common imports for typical husk usage.
///
/// ```rust
/// use husk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Runtime;

    pub use husk_core::OsShim;
    #[cfg(feature = "std")]
    pub use husk_core::SystemShim;

    pub use husk_heap::{HeapConfig, HeapError, HeapPtr};

    pub use husk_fmt::{Arg, FormatError};
}
