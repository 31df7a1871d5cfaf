//! The host boundary: the only operations the runtime asks of its environment.
//!
//! An [`OsShim`] hands out coarse byte regions, takes them back, prints
//! best-effort diagnostics and terminates the process. Everything else the
//! runtime does is private bookkeeping on top of these four calls.

#[cfg(feature = "std")]
use crate::config::{ConfigError, SystemShimConfig};

/// Environment services required by the heap and the runtime facade.
///
/// Implementations are injected at construction and owned by the consumer
/// (typically [`Heap`](https://docs.rs/husk-heap)). There is no global shim.
///
/// # Contract
///
/// - [`allocate`](OsShim::allocate) returns a region whose length is the
///   *granted* size, which is at least the requested size. Shims may round
///   up to their own granularity. Failure is `None`, never a panic.
/// - [`free`](OsShim::free) receives a region previously returned by
///   `allocate` on the same shim, carrying its granted size with it.
/// - [`print_error`](OsShim::print_error) is best-effort and may drop output.
/// - [`exit`](OsShim::exit) does not return.
pub trait OsShim {
    /// Owned byte region handed out by [`allocate`](OsShim::allocate).
    type Region: AsRef<[u8]> + AsMut<[u8]>;

    /// Acquire a region of at least `size` bytes.
    fn allocate(&mut self, size: usize) -> Option<Self::Region>;

    /// Release a region previously returned by [`allocate`](OsShim::allocate).
    ///
    /// Returns `false` if the environment reported a failure. The region is
    /// consumed either way.
    fn free(&mut self, region: Self::Region) -> bool;

    /// Emit a diagnostic message.
    fn print_error(&mut self, message: &str);

    /// Terminate the process with the given exit code.
    fn exit(&mut self, code: i32) -> !;
}

impl<S: OsShim + ?Sized> OsShim for &mut S {
    type Region = S::Region;

    fn allocate(&mut self, size: usize) -> Option<Self::Region> {
        (**self).allocate(size)
    }

    fn free(&mut self, region: Self::Region) -> bool {
        (**self).free(region)
    }

    fn print_error(&mut self, message: &str) {
        (**self).print_error(message)
    }

    fn exit(&mut self, code: i32) -> ! {
        (**self).exit(code)
    }
}

/// Shim backed by the standard library's global allocator and process APIs.
///
/// Regions are zero-filled boxed slices rounded up to
/// [`SystemShimConfig::min_region_size`]. Allocation failure is reported as
/// `None` instead of aborting.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct SystemShim {
    config: SystemShimConfig,
}

#[cfg(feature = "std")]
impl SystemShim {
    /// Create a shim with the given configuration, rejecting it if it does
    /// not [`validate`](SystemShimConfig::validate).
    pub fn new(config: SystemShimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The active configuration.
    pub fn config(&self) -> &SystemShimConfig {
        &self.config
    }
}

#[cfg(feature = "std")]
impl Default for SystemShim {
    fn default() -> Self {
        Self {
            config: SystemShimConfig::default(),
        }
    }
}

#[cfg(feature = "std")]
impl OsShim for SystemShim {
    type Region = std::boxed::Box<[u8]>;

    fn allocate(&mut self, size: usize) -> Option<Self::Region> {
        let granted = size.max(self.config.min_region_size);
        let mut data = std::vec::Vec::new();
        if data.try_reserve_exact(granted).is_err() {
            log::warn!("system shim: reserving {granted} bytes failed");
            return None;
        }
        data.resize(granted, 0u8);
        Some(data.into_boxed_slice())
    }

    fn free(&mut self, region: Self::Region) -> bool {
        drop(region);
        true
    }

    fn print_error(&mut self, message: &str) {
        use std::io::Write;
        let _ = std::io::stderr().write_all(message.as_bytes());
    }

    fn exit(&mut self, code: i32) -> ! {
        std::process::exit(code)
    }
}
