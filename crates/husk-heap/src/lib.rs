//! Block allocator over OS-shim arenas.
//!
//! A [`Heap`] implements `malloc`/`realloc`/`free` semantics for a runtime
//! that has no host allocator. It asks its injected
//! [`OsShim`](husk_core::OsShim) for coarse regions (arenas), carves them
//! into blocks, and hands each arena back once every block in it is free.
//!
//! # Architecture
//!
//! ```text
//! Heap<S: OsShim>
//! ├── IndexMap<ArenaId, Arena>   (one shim region each, Fx-hashed)
//! ├── BlockTable                 (slot + generation records, free-list reuse)
//! │   └── Block { arena, offset, capacity, len, free, prev, next }
//! ├── BTreeSet<(capacity, slot)> (best-fit free set)
//! └── HeapStats                  (shim call counts, byte accounting)
//! ```
//!
//! Callers never see addresses. They hold [`HeapPtr`] handles and reach
//! their bytes through [`Heap::get`] and [`Heap::get_mut`]. A handle goes
//! stale the moment its block is freed, so use-after-free and double-free
//! are detected rather than silently corrupting a neighbour.

#![no_std]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

mod arena;
pub mod config;
pub mod error;
pub mod handle;
pub mod heap;
pub mod stats;
mod table;
mod verify;

pub use config::{HeapConfig, BLOCK_ALIGN};
pub use error::HeapError;
pub use handle::{ArenaId, HeapPtr};
pub use heap::{BlockInfo, Heap};
pub use stats::HeapStats;
