//! Heap accounting counters.
//!
//! [`HeapStats`] is updated on every arena and block transition and is what
//! leak checks compare at the end of a run: after every allocation has been
//! freed, `os_allocations == os_frees` and `arenas_live == 0`.

/// Counters describing the heap's use of its shim and its arenas.
///
/// Byte counts are block capacities (rounded to the block alignment), not
/// caller-requested sizes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Cumulative number of regions obtained from the shim.
    pub os_allocations: u64,
    /// Cumulative number of regions returned to the shim.
    pub os_frees: u64,
    /// Arenas currently held.
    pub arenas_live: usize,
    /// Bytes currently held from the shim, as granted.
    pub bytes_reserved: usize,
    /// High-water mark of `bytes_reserved`.
    pub peak_bytes_reserved: usize,
    /// Capacity of all in-use blocks.
    pub bytes_in_use: usize,
    /// Number of in-use blocks.
    pub allocations_live: usize,
    /// Cumulative number of resizes satisfied without moving the payload.
    pub in_place_resizes: u64,
    /// Cumulative number of resizes that moved the payload to a new block.
    pub moved_resizes: u64,
}

impl HeapStats {
    pub(crate) fn arena_acquired(&mut self, granted: usize) {
        self.os_allocations += 1;
        self.arenas_live += 1;
        self.bytes_reserved += granted;
        self.peak_bytes_reserved = self.peak_bytes_reserved.max(self.bytes_reserved);
    }

    pub(crate) fn arena_released(&mut self, granted: usize) {
        self.os_frees += 1;
        self.arenas_live -= 1;
        self.bytes_reserved -= granted;
    }
}
