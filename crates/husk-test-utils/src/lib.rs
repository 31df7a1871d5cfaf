//! Test utilities and mock OS shims for husk development.
//!
//! - [`MockShim`]: in-memory shim with a configurable granularity, an
//!   optional byte budget for exhaustion tests, and call counters.
//! - [`CountingShim`]: wraps any shim and tallies allocate/free calls,
//!   checking that every freed region was granted with the same size.
//! - [`reference`]: C-style renderings of Rust's exact float formatting,
//!   used as the oracle for digit-generation tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod reference;

use std::collections::BTreeMap;

use husk_core::OsShim;

/// Granularity the reference C test harness used for its OS shim.
pub const HARNESS_REGION_SIZE: usize = 16 * 1024 * 1024;

/// In-memory shim backed by `Vec<u8>` regions.
///
/// [`exit`](OsShim::exit) panics with `"os exit({code})"`, so fatal paths
/// can be asserted with `#[should_panic(expected = "os exit(1)")]`.
#[derive(Debug)]
pub struct MockShim {
    min_region: usize,
    budget: Option<usize>,
    outstanding: usize,
    allocations: u64,
    frees: u64,
    refused: u64,
    errors: Vec<String>,
}

impl MockShim {
    /// Shim granting at least `min_region` bytes per region, without limit.
    pub fn new(min_region: usize) -> Self {
        Self {
            min_region,
            budget: None,
            outstanding: 0,
            allocations: 0,
            frees: 0,
            refused: 0,
            errors: Vec::new(),
        }
    }

    /// Shim with the reference harness granularity (16 MiB).
    pub fn harness() -> Self {
        Self::new(HARNESS_REGION_SIZE)
    }

    /// Refuse any allocation that would push outstanding bytes past `budget`.
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn set_budget(&mut self, budget: Option<usize>) {
        self.budget = budget;
    }

    /// Successful allocate calls.
    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    /// Free calls.
    pub fn frees(&self) -> u64 {
        self.frees
    }

    /// Allocate calls refused because of the budget.
    pub fn refused(&self) -> u64 {
        self.refused
    }

    /// Bytes currently granted and not yet freed.
    pub fn outstanding_bytes(&self) -> usize {
        self.outstanding
    }

    /// Messages passed to [`print_error`](OsShim::print_error).
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl Default for MockShim {
    fn default() -> Self {
        Self::new(4096)
    }
}

impl OsShim for MockShim {
    type Region = Vec<u8>;

    fn allocate(&mut self, size: usize) -> Option<Vec<u8>> {
        let granted = size.max(self.min_region);
        if let Some(budget) = self.budget {
            if self.outstanding + granted > budget {
                self.refused += 1;
                return None;
            }
        }
        self.outstanding += granted;
        self.allocations += 1;
        Some(vec![0; granted])
    }

    fn free(&mut self, region: Vec<u8>) -> bool {
        self.outstanding = self.outstanding.saturating_sub(region.len());
        self.frees += 1;
        true
    }

    fn print_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn exit(&mut self, code: i32) -> ! {
        panic!("os exit({code}): {}", self.errors.join(""))
    }
}

/// Wrapper that counts the calls made to an inner shim.
///
/// Granted sizes are tracked as a multiset; a region freed with a size
/// that was never granted is counted in [`mismatched_frees`](Self::mismatched_frees).
#[derive(Debug)]
pub struct CountingShim<S> {
    inner: S,
    allocations: u64,
    frees: u64,
    mismatched: u64,
    granted: BTreeMap<usize, u64>,
}

impl<S: OsShim> CountingShim<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            allocations: 0,
            frees: 0,
            mismatched: 0,
            granted: BTreeMap::new(),
        }
    }

    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    pub fn frees(&self) -> u64 {
        self.frees
    }

    pub fn mismatched_frees(&self) -> u64 {
        self.mismatched
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: OsShim> OsShim for CountingShim<S> {
    type Region = S::Region;

    fn allocate(&mut self, size: usize) -> Option<S::Region> {
        let region = self.inner.allocate(size)?;
        self.allocations += 1;
        *self.granted.entry(region.as_ref().len()).or_insert(0) += 1;
        Some(region)
    }

    fn free(&mut self, region: S::Region) -> bool {
        self.frees += 1;
        let len = region.as_ref().len();
        match self.granted.get_mut(&len) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.granted.remove(&len);
            }
            None => self.mismatched += 1,
        }
        self.inner.free(region)
    }

    fn print_error(&mut self, message: &str) {
        self.inner.print_error(message)
    }

    fn exit(&mut self, code: i32) -> ! {
        self.inner.exit(code)
    }
}
