//! The C-shaped runtime surface.

use alloc::format;

use husk_core::OsShim;
use husk_fmt::{Arg, FormatError};
use husk_heap::{Heap, HeapConfig, HeapError, HeapPtr, HeapStats};

/// One heap plus the conversion and formatting entry points.
///
/// Allocation failures are reported as `None`, never as a panic. Invariant
/// violations (invalid pointers and malformed format strings under
/// consistency checks) print a diagnostic through the shim and exit.
pub struct Runtime<S: OsShim> {
    heap: Heap<S>,
}

#[cfg(feature = "std")]
impl Runtime<husk_core::SystemShim> {
    /// A runtime over the standard-library shim with default settings.
    pub fn system() -> Self {
        Self {
            heap: Heap::with_defaults(husk_core::SystemShim::default()),
        }
    }
}

impl<S: OsShim> Runtime<S> {
    /// Create a runtime owning `shim`.
    pub fn new(shim: S, config: HeapConfig) -> Result<Self, HeapError> {
        Ok(Self {
            heap: Heap::new(shim, config)?,
        })
    }

    /// Wrap an existing heap.
    pub fn from_heap(heap: Heap<S>) -> Self {
        Self { heap }
    }

    /// `malloc`: `None` when the shim cannot supply memory.
    pub fn malloc(&mut self, size: usize) -> Option<HeapPtr> {
        match self.heap.allocate(size) {
            Ok(ptr) => Some(ptr),
            Err(e) => {
                log::debug!("runtime: malloc({size}) failed: {e}");
                None
            }
        }
    }

    /// `realloc`.
    ///
    /// `realloc(None, n)` allocates; `realloc(p, 0)` frees `p` and returns
    /// `None`. On failure the result is `None` and `p` is still valid with
    /// its contents unchanged.
    pub fn realloc(&mut self, ptr: Option<HeapPtr>, size: usize) -> Option<HeapPtr> {
        match self.heap.resize(ptr, size) {
            Ok(ptr) => ptr,
            Err(e) => {
                log::debug!("runtime: realloc to {size} failed: {e}");
                None
            }
        }
    }

    /// `free`. `free(None)` does nothing.
    pub fn free(&mut self, ptr: Option<HeapPtr>) {
        self.heap.free(ptr);
    }

    /// The bytes of a live allocation.
    pub fn get(&self, ptr: HeapPtr) -> Option<&[u8]> {
        self.heap.get(ptr)
    }

    /// Mutable bytes of a live allocation.
    pub fn get_mut(&mut self, ptr: HeapPtr) -> Option<&mut [u8]> {
        self.heap.get_mut(ptr)
    }

    /// `snprintf` into `buf`.
    ///
    /// Returns the intended length. A format error is fatal under
    /// consistency checks and `-1` otherwise.
    pub fn snprintf(&mut self, buf: &mut [u8], fmt: &str, args: &[Arg<'_>]) -> i32 {
        match husk_fmt::format(buf, fmt, args) {
            Ok(len) => i32::try_from(len).unwrap_or(-1),
            Err(e) => self.format_failed(fmt, &e),
        }
    }

    fn format_failed(&mut self, fmt: &str, error: &FormatError) -> i32 {
        if self.heap.config().consistency_checks {
            self.fatal(&format!("bad format string {fmt:?}: {error}"));
        }
        log::warn!("runtime: format {fmt:?} failed: {error}");
        -1
    }

    /// `strtod`; see [`husk_num::strtod`].
    pub fn strtod(&self, text: &[u8], end: Option<&mut usize>) -> f64 {
        husk_num::strtod(text, end)
    }

    /// `strtof`; see [`husk_num::strtof`].
    pub fn strtof(&self, text: &[u8], end: Option<&mut usize>) -> f32 {
        husk_num::strtof(text, end)
    }

    /// Print `husk: fatal: {message}` through the shim and exit with status 1.
    pub fn fatal(&mut self, message: &str) -> ! {
        let line = format!("husk: fatal: {message}\n");
        let shim = self.heap.shim_mut();
        shim.print_error(&line);
        shim.exit(1)
    }

    /// The underlying heap.
    pub fn heap(&self) -> &Heap<S> {
        &self.heap
    }

    /// Mutable access to the underlying heap.
    pub fn heap_mut(&mut self) -> &mut Heap<S> {
        &mut self.heap
    }

    /// Heap accounting counters.
    pub fn stats(&self) -> &HeapStats {
        self.heap.stats()
    }

    /// Release every arena and return the shim.
    pub fn shutdown(self) -> S {
        self.heap.shutdown()
    }
}
