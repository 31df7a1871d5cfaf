//! Host boundary for the husk runtime substrate.
//!
//! This is the leaf crate of the workspace. It defines the [`OsShim`]
//! trait, the four primitive operations every other crate relies on, and
//! (with the default `std` feature) a [`SystemShim`] backed by the standard
//! library.
//!
//! The crate is `no_std`; disabling default features removes the system
//! shim and leaves only the trait and configuration types.

#![no_std]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod config;
pub mod shim;

pub use config::{ConfigError, SystemShimConfig};
pub use shim::OsShim;

#[cfg(feature = "std")]
pub use shim::SystemShim;
