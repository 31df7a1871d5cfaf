//! The allocator: arenas from the shim, blocks carved from arenas.
//!
//! # Block lifecycle
//!
//! ```text
//! allocate:  best-fit free block ─ split tail ≥ min_split ─> in use
//! resize:    shrink in place │ absorb free next block │ move + copy
//! free:      in use ─> free ─ merge with free neighbours
//!            └─ block spans the whole arena ─> region back to the shim
//! ```
//!
//! Free blocks are kept in a `(capacity, index)` ordered set, so the best
//! fit is the first entry at or above the rounded request. Adjacent free
//! blocks are always merged, so no two free blocks are ever neighbours.

use alloc::collections::BTreeSet;
use alloc::format;

use husk_core::OsShim;
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::arena::Arena;
use crate::config::{HeapConfig, BLOCK_ALIGN};
use crate::error::HeapError;
use crate::handle::{ArenaId, HeapPtr};
use crate::stats::HeapStats;
use crate::table::{Block, BlockIndex, BlockTable};

/// Placement of a live allocation, for diagnostics and overlap checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Arena holding the block.
    pub arena: ArenaId,
    /// Payload offset within the arena.
    pub offset: usize,
    /// Payload capacity.
    pub capacity: usize,
    /// Requested size.
    pub len: usize,
}

/// A single-threaded heap over an injected [`OsShim`].
///
/// Every entry point takes `&mut self`; callers sharing a heap across
/// threads must serialise access themselves.
pub struct Heap<S: OsShim> {
    pub(crate) shim: S,
    pub(crate) config: HeapConfig,
    pub(crate) arenas: IndexMap<ArenaId, Arena<S::Region>, FxBuildHasher>,
    next_arena: u64,
    pub(crate) blocks: BlockTable,
    pub(crate) free_set: BTreeSet<(usize, BlockIndex)>,
    pub(crate) stats: HeapStats,
}

impl<S: OsShim> Heap<S> {
    /// Create an empty heap. No arena is requested until the first allocation.
    pub fn new(shim: S, config: HeapConfig) -> Result<Self, HeapError> {
        config.validate()?;
        Ok(Self {
            shim,
            config,
            arenas: IndexMap::with_hasher(FxBuildHasher),
            next_arena: 0,
            blocks: BlockTable::new(),
            free_set: BTreeSet::new(),
            stats: HeapStats::default(),
        })
    }

    /// Create a heap with [`HeapConfig::default`].
    pub fn with_defaults(shim: S) -> Self {
        Self {
            shim,
            config: HeapConfig::default(),
            arenas: IndexMap::with_hasher(FxBuildHasher),
            next_arena: 0,
            blocks: BlockTable::new(),
            free_set: BTreeSet::new(),
            stats: HeapStats::default(),
        }
    }

    /// Allocate `size` bytes.
    ///
    /// `allocate(0)` returns a distinct minimum-size block. On failure the
    /// heap is unchanged.
    pub fn allocate(&mut self, size: usize) -> Result<HeapPtr, HeapError> {
        let capacity = block_size(size).ok_or(HeapError::OutOfMemory { requested: size })?;
        let index = match self.find_fit(capacity) {
            Some(index) => index,
            None => self.acquire_arena(size, capacity)?,
        };
        self.carve(index, capacity, size);
        self.check();
        Ok(self.blocks.handle(index))
    }

    /// Resize an allocation.
    ///
    /// - `resize(None, n)` is `allocate(n)`.
    /// - `resize(Some(p), 0)` frees `p` and returns `Ok(None)`.
    /// - Otherwise the block shrinks or grows in place when it can, and
    ///   moves (copying `min(old, new)` bytes) when it cannot.
    ///
    /// If a move fails the original allocation is left exactly as it was.
    pub fn resize(
        &mut self,
        ptr: Option<HeapPtr>,
        size: usize,
    ) -> Result<Option<HeapPtr>, HeapError> {
        let Some(ptr) = ptr else {
            return self.allocate(size).map(Some);
        };
        if size == 0 {
            self.free(Some(ptr));
            return Ok(None);
        }
        let Some(index) = self.resolve(ptr, "resize") else {
            return Err(HeapError::InvalidPointer { ptr });
        };
        let capacity = block_size(size).ok_or(HeapError::OutOfMemory { requested: size })?;
        let current = self.blocks[index].capacity;

        if capacity <= current {
            self.blocks[index].len = size;
            if current - capacity >= self.config.min_split {
                if let Some(tail) = self.split(index, capacity) {
                    self.stats.bytes_in_use -= current - capacity;
                    self.coalesce(tail);
                }
            }
            self.stats.in_place_resizes += 1;
            log::trace!("heap: resize {ptr} in place to {size} bytes");
            self.check();
            return Ok(Some(ptr));
        }

        if let Some(next) = self.blocks[index].next {
            let neighbour = &self.blocks[next];
            if neighbour.free && current + neighbour.capacity >= capacity {
                self.absorb_next(index);
                let total = self.blocks[index].capacity;
                if total - capacity >= self.config.min_split {
                    if let Some(tail) = self.split(index, capacity) {
                        self.free_set.insert((self.blocks[tail].capacity, tail));
                    }
                }
                self.stats.bytes_in_use += self.blocks[index].capacity - current;
                self.blocks[index].len = size;
                self.stats.in_place_resizes += 1;
                log::trace!("heap: resize {ptr} grew in place to {size} bytes");
                self.check();
                return Ok(Some(ptr));
            }
        }

        let moved = self.allocate(size)?;
        let target = self.blocks.resolve(moved).ok_or(HeapError::Corrupted {
            arena: None,
            reason: "fresh allocation does not resolve",
        })?;
        let count = self.blocks[index].len.min(size);
        self.copy_payload(index, target, count);
        self.release_block(index);
        self.stats.moved_resizes += 1;
        log::trace!("heap: resize {ptr} moved to {moved} ({count} bytes copied)");
        self.check();
        Ok(Some(moved))
    }

    /// Free an allocation. `free(None)` does nothing.
    ///
    /// An invalid pointer is fatal under consistency checks and logged and
    /// ignored otherwise.
    pub fn free(&mut self, ptr: Option<HeapPtr>) {
        let Some(ptr) = ptr else {
            return;
        };
        let Some(index) = self.resolve(ptr, "free") else {
            return;
        };
        self.release_block(index);
        self.check();
    }

    /// The caller's bytes for a live allocation (length = requested size).
    pub fn get(&self, ptr: HeapPtr) -> Option<&[u8]> {
        let block = self.live_block(ptr)?;
        let arena = self.arenas.get(&block.arena)?;
        Some(arena.bytes(block.offset, block.len))
    }

    /// Mutable access to the caller's bytes for a live allocation.
    pub fn get_mut(&mut self, ptr: HeapPtr) -> Option<&mut [u8]> {
        let index = self.blocks.resolve(ptr)?;
        let block = &self.blocks[index];
        if block.free {
            return None;
        }
        let (arena, offset, len) = (block.arena, block.offset, block.len);
        Some(self.arenas.get_mut(&arena)?.bytes_mut(offset, len))
    }

    /// Where a live allocation sits, or `None` if `ptr` is not live.
    pub fn describe(&self, ptr: HeapPtr) -> Option<BlockInfo> {
        self.live_block(ptr).map(|block| BlockInfo {
            arena: block.arena,
            offset: block.offset,
            capacity: block.capacity,
            len: block.len,
        })
    }

    /// Current accounting counters.
    pub fn stats(&self) -> &HeapStats {
        &self.stats
    }

    /// The active configuration.
    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    /// Number of arenas currently held.
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    /// The injected shim.
    pub fn shim(&self) -> &S {
        &self.shim
    }

    /// Mutable access to the injected shim.
    pub fn shim_mut(&mut self) -> &mut S {
        &mut self.shim
    }

    /// Return every arena to the shim and hand the shim back.
    ///
    /// Outstanding pointers are forgotten; nothing can resolve them after
    /// the heap is gone.
    pub fn shutdown(mut self) -> S {
        let arenas = core::mem::take(&mut self.arenas);
        for (id, arena) in arenas {
            let granted = arena.granted();
            self.stats.arena_released(granted);
            if !self.shim.free(arena.region) {
                log::warn!("heap: shim refused to release arena {id}");
            }
        }
        self.shim
    }

    /// Print a diagnostic through the shim and exit with status 1.
    pub fn fatal(&mut self, error: &HeapError) -> ! {
        let message = format!("husk: fatal heap error: {error}\n");
        self.shim.print_error(&message);
        self.shim.exit(1)
    }

    fn check(&mut self) {
        if !self.config.consistency_checks {
            return;
        }
        if let Err(e) = self.verify() {
            self.fatal(&e);
        }
    }

    fn live_block(&self, ptr: HeapPtr) -> Option<&Block> {
        let block = &self.blocks[self.blocks.resolve(ptr)?];
        (!block.free).then_some(block)
    }

    /// Map a caller pointer to its in-use block, applying the invalid
    /// pointer policy on failure.
    fn resolve(&mut self, ptr: HeapPtr, op: &str) -> Option<BlockIndex> {
        if let Some(index) = self.blocks.resolve(ptr) {
            if !self.blocks[index].free {
                return Some(index);
            }
        }
        let error = HeapError::InvalidPointer { ptr };
        if self.config.consistency_checks {
            self.fatal(&error);
        }
        log::warn!("heap: {op} ignored {error}");
        None
    }

    fn find_fit(&self, capacity: usize) -> Option<BlockIndex> {
        self.free_set
            .range((capacity, 0)..)
            .next()
            .map(|&(_, index)| index)
    }

    /// Get a new arena able to hold `capacity` bytes and return its single
    /// free block.
    fn acquire_arena(&mut self, size: usize, capacity: usize) -> Result<BlockIndex, HeapError> {
        let oom = HeapError::OutOfMemory { requested: size };
        let request = capacity.max(self.config.min_arena_size);
        let Some(region) = self.shim.allocate(request) else {
            log::warn!("heap: shim refused a {request} byte arena");
            return Err(oom);
        };
        let granted = region.as_ref().len();
        let usable = Arena::<S::Region>::usable_len(granted);
        let id = ArenaId(self.next_arena);
        if usable < capacity {
            log::warn!("heap: shim granted {granted} bytes for a {request} byte request");
            self.discard_region(region);
            return Err(oom);
        }
        let block = Block {
            arena: id,
            offset: 0,
            capacity: usable,
            len: 0,
            free: true,
            prev: None,
            next: None,
        };
        let Some(first) = self.blocks.insert(block) else {
            log::warn!("heap: block table exhausted");
            self.discard_region(region);
            return Err(oom);
        };
        self.next_arena += 1;
        self.free_set.insert((usable, first));
        self.arenas.insert(
            id,
            Arena {
                region,
                usable,
                first,
            },
        );
        self.stats.arena_acquired(granted);
        log::trace!("heap: acquired arena {id} ({granted} bytes for {request} requested)");
        Ok(first)
    }

    /// Hand back a region that never became an arena.
    fn discard_region(&mut self, region: S::Region) {
        let granted = region.as_ref().len();
        self.stats.arena_acquired(granted);
        self.stats.arena_released(granted);
        if !self.shim.free(region) {
            log::warn!("heap: shim refused to release a discarded {granted} byte region");
        }
    }

    /// Turn free block `index` into an in-use block of `capacity` bytes.
    fn carve(&mut self, index: BlockIndex, capacity: usize, len: usize) {
        let available = self.blocks[index].capacity;
        self.free_set.remove(&(available, index));
        if available - capacity >= self.config.min_split {
            // The neighbour after a free block is in use, so the tail stays unmerged.
            if let Some(tail) = self.split(index, capacity) {
                self.free_set.insert((self.blocks[tail].capacity, tail));
            }
        }
        let block = &mut self.blocks[index];
        block.free = false;
        block.len = len;
        let capacity = block.capacity;
        self.blocks.bump(index);
        self.stats.bytes_in_use += capacity;
        self.stats.allocations_live += 1;
    }

    /// Cut block `index` down to `keep` bytes. The remainder becomes a new
    /// free block linked after it; the caller files it in the free set.
    ///
    /// If the block table is exhausted the block is left whole.
    fn split(&mut self, index: BlockIndex, keep: usize) -> Option<BlockIndex> {
        let block = &self.blocks[index];
        let tail = Block {
            arena: block.arena,
            offset: block.offset + keep,
            capacity: block.capacity - keep,
            len: 0,
            free: true,
            prev: Some(index),
            next: block.next,
        };
        let next = block.next;
        let tail_index = self.blocks.insert(tail)?;
        if let Some(next) = next {
            self.blocks[next].prev = Some(tail_index);
        }
        let block = &mut self.blocks[index];
        block.capacity = keep;
        block.next = Some(tail_index);
        Some(tail_index)
    }

    /// Merge the block after `index` into it. The absorbed record is
    /// dropped from the table and from the free set.
    fn absorb_next(&mut self, index: BlockIndex) {
        let Some(next) = self.blocks[index].next else {
            return;
        };
        let Some(absorbed) = self.blocks.remove(next) else {
            return;
        };
        if absorbed.free {
            self.free_set.remove(&(absorbed.capacity, next));
        }
        if let Some(after) = absorbed.next {
            self.blocks[after].prev = Some(index);
        }
        let block = &mut self.blocks[index];
        block.capacity += absorbed.capacity;
        block.next = absorbed.next;
    }

    /// Merge free block `index` (not yet in the free set) with free
    /// neighbours and file the result. Returns the surviving index.
    fn coalesce(&mut self, index: BlockIndex) -> BlockIndex {
        let mut index = index;
        if let Some(next) = self.blocks[index].next {
            if self.blocks[next].free {
                self.absorb_next(index);
            }
        }
        if let Some(prev) = self.blocks[index].prev {
            if self.blocks[prev].free {
                self.free_set.remove(&(self.blocks[prev].capacity, prev));
                self.absorb_next(prev);
                index = prev;
            }
        }
        self.free_set.insert((self.blocks[index].capacity, index));
        index
    }

    fn release_block(&mut self, index: BlockIndex) {
        let block = &mut self.blocks[index];
        block.free = true;
        block.len = 0;
        let capacity = block.capacity;
        self.blocks.bump(index);
        self.stats.bytes_in_use -= capacity;
        self.stats.allocations_live -= 1;
        let merged = self.coalesce(index);
        self.release_arena_if_empty(merged);
    }

    fn release_arena_if_empty(&mut self, index: BlockIndex) {
        let block = &self.blocks[index];
        if !block.free || block.prev.is_some() || block.next.is_some() {
            return;
        }
        let (id, capacity) = (block.arena, block.capacity);
        self.free_set.remove(&(capacity, index));
        self.blocks.remove(index);
        let Some(arena) = self.arenas.swap_remove(&id) else {
            return;
        };
        let granted = arena.granted();
        self.stats.arena_released(granted);
        if !self.shim.free(arena.region) {
            log::warn!("heap: shim refused to release arena {id}");
        }
        log::trace!("heap: released arena {id} ({granted} bytes)");
    }

    fn copy_payload(&mut self, from: BlockIndex, to: BlockIndex, count: usize) {
        let (src_arena, src_offset) = (self.blocks[from].arena, self.blocks[from].offset);
        let (dst_arena, dst_offset) = (self.blocks[to].arena, self.blocks[to].offset);
        if src_arena == dst_arena {
            if let Some(arena) = self.arenas.get_mut(&src_arena) {
                arena
                    .region
                    .as_mut()
                    .copy_within(src_offset..src_offset + count, dst_offset);
            }
            return;
        }
        let mut src = None;
        let mut dst = None;
        for (id, arena) in self.arenas.iter_mut() {
            if *id == src_arena {
                src = Some(arena);
            } else if *id == dst_arena {
                dst = Some(arena);
            }
        }
        if let (Some(src), Some(dst)) = (src, dst) {
            dst.bytes_mut(dst_offset, count)
                .copy_from_slice(src.bytes(src_offset, count));
        }
    }
}

/// Block capacity for a request: rounded up to [`BLOCK_ALIGN`], never zero.
fn block_size(size: usize) -> Option<usize> {
    let rounded = size.max(1).checked_add(BLOCK_ALIGN - 1)? & !(BLOCK_ALIGN - 1);
    (rounded <= isize::MAX as usize).then_some(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    /// Minimal in-crate shim: fixed granularity, optional budget, counters.
    struct TestShim {
        min_region: usize,
        budget: Option<usize>,
        grant_cap: Option<usize>,
        refuse_frees: bool,
        allocations: usize,
        frees: usize,
    }

    impl TestShim {
        fn new(min_region: usize) -> Self {
            Self {
                min_region,
                budget: None,
                grant_cap: None,
                refuse_frees: false,
                allocations: 0,
                frees: 0,
            }
        }
    }

    impl OsShim for TestShim {
        type Region = Vec<u8>;

        fn allocate(&mut self, size: usize) -> Option<Vec<u8>> {
            let mut granted = size.max(self.min_region);
            if let Some(cap) = self.grant_cap {
                granted = granted.min(cap);
            }
            if let Some(budget) = self.budget.as_mut() {
                if granted > *budget {
                    return None;
                }
                *budget -= granted;
            }
            self.allocations += 1;
            Some(vec![0; granted])
        }

        fn free(&mut self, region: Vec<u8>) -> bool {
            if let Some(budget) = self.budget.as_mut() {
                *budget += region.len();
            }
            self.frees += 1;
            !self.refuse_frees
        }

        fn print_error(&mut self, _message: &str) {}

        fn exit(&mut self, code: i32) -> ! {
            panic!("exit({code})")
        }
    }

    fn config() -> HeapConfig {
        HeapConfig {
            min_arena_size: 64,
            ..HeapConfig::checked()
        }
    }

    fn heap(min_region: usize) -> Heap<TestShim> {
        Heap::new(TestShim::new(min_region), config()).unwrap()
    }

    #[test]
    fn block_size_rounds_to_alignment() {
        assert_eq!(block_size(0), Some(16));
        assert_eq!(block_size(1), Some(16));
        assert_eq!(block_size(16), Some(16));
        assert_eq!(block_size(17), Some(32));
        assert_eq!(block_size(usize::MAX), None);
    }

    #[test]
    fn first_allocation_acquires_one_arena() {
        let mut heap = heap(4096);
        let p = heap.allocate(100).unwrap();
        assert_eq!(heap.arena_count(), 1);
        assert_eq!(heap.shim().allocations, 1);
        assert_eq!(heap.get(p).unwrap().len(), 100);
        assert_eq!(heap.describe(p).unwrap().capacity, 112);
    }

    #[test]
    fn small_allocations_share_an_arena() {
        let mut heap = heap(4096);
        let a = heap.allocate(10).unwrap();
        let b = heap.allocate(10).unwrap();
        assert_ne!(a, b);
        let (ia, ib) = (heap.describe(a).unwrap(), heap.describe(b).unwrap());
        assert_eq!(ia.arena, ib.arena);
        assert!(ia.offset + ia.capacity <= ib.offset || ib.offset + ib.capacity <= ia.offset);
        assert_eq!(heap.arena_count(), 1);
    }

    #[test]
    fn zero_size_allocations_are_distinct() {
        let mut heap = heap(4096);
        let a = heap.allocate(0).unwrap();
        let b = heap.allocate(0).unwrap();
        assert_ne!(a, b);
        assert_eq!(heap.get(a).unwrap().len(), 0);
    }

    #[test]
    fn large_request_gets_dedicated_arena() {
        let mut heap = heap(4096);
        let p = heap.allocate(10_000).unwrap();
        assert_eq!(heap.stats().bytes_reserved, 10_000);
        heap.free(Some(p));
        assert_eq!(heap.arena_count(), 0);
    }

    #[test]
    fn freeing_everything_releases_the_arena() {
        let mut heap = heap(4096);
        let ptrs: Vec<_> = (0..10).map(|i| heap.allocate(i * 30).unwrap()).collect();
        for p in ptrs {
            heap.free(Some(p));
        }
        assert_eq!(heap.arena_count(), 0);
        assert_eq!(heap.shim().allocations, heap.shim().frees);
        assert_eq!(heap.stats().os_allocations, heap.stats().os_frees);
        assert_eq!(heap.stats().bytes_in_use, 0);
    }

    #[test]
    fn freed_block_is_reused() {
        let mut heap = heap(4096);
        let keep = heap.allocate(32).unwrap();
        let a = heap.allocate(64).unwrap();
        let offset = heap.describe(a).unwrap().offset;
        heap.free(Some(a));
        let b = heap.allocate(64).unwrap();
        assert_eq!(heap.describe(b).unwrap().offset, offset);
        assert_eq!(heap.get(a), None);
        heap.free(Some(keep));
        heap.free(Some(b));
    }

    #[test]
    fn free_none_is_noop() {
        let mut heap = heap(4096);
        heap.free(None);
        assert_eq!(heap.stats(), &HeapStats::default());
    }

    #[test]
    fn resize_none_allocates() {
        let mut heap = heap(4096);
        let p = heap.resize(None, 40).unwrap().unwrap();
        assert_eq!(heap.get(p).unwrap().len(), 40);
    }

    #[test]
    fn resize_to_zero_frees() {
        let mut heap = heap(4096);
        let p = heap.allocate(40).unwrap();
        assert_eq!(heap.resize(Some(p), 0), Ok(None));
        assert_eq!(heap.arena_count(), 0);
    }

    #[test]
    fn shrink_stays_in_place_and_keeps_bytes() {
        let mut heap = heap(4096);
        let p = heap.allocate(512).unwrap();
        heap.get_mut(p).unwrap().fill(7);
        let q = heap.resize(Some(p), 16).unwrap().unwrap();
        assert_eq!(p, q);
        assert_eq!(heap.get(q).unwrap(), &[7u8; 16]);
        assert_eq!(heap.describe(q).unwrap().capacity, 16);
    }

    #[test]
    fn grow_absorbs_free_neighbour() {
        let mut heap = heap(4096);
        let p = heap.allocate(64).unwrap();
        heap.get_mut(p).unwrap().fill(3);
        let q = heap.resize(Some(p), 1024).unwrap().unwrap();
        assert_eq!(p, q);
        assert_eq!(&heap.get(q).unwrap()[..64], &[3u8; 64]);
        assert_eq!(heap.stats().in_place_resizes, 1);
    }

    #[test]
    fn grow_blocked_by_neighbour_moves() {
        let mut heap = heap(4096);
        let p = heap.allocate(64).unwrap();
        let wall = heap.allocate(64).unwrap();
        heap.get_mut(p).unwrap().copy_from_slice(&[9u8; 64]);
        let q = heap.resize(Some(p), 256).unwrap().unwrap();
        assert_ne!(p, q);
        assert_eq!(&heap.get(q).unwrap()[..64], &[9u8; 64]);
        assert_eq!(heap.get(p), None);
        assert_eq!(heap.stats().moved_resizes, 1);
        heap.free(Some(wall));
        heap.free(Some(q));
        assert_eq!(heap.arena_count(), 0);
    }

    #[test]
    fn move_across_arenas_copies_payload() {
        let mut heap = heap(256);
        let p = heap.allocate(200).unwrap();
        heap.get_mut(p).unwrap().fill(5);
        let q = heap.resize(Some(p), 1000).unwrap().unwrap();
        assert_ne!(heap.describe(q).unwrap().arena, ArenaId(0));
        assert_eq!(&heap.get(q).unwrap()[..200], &[5u8; 200]);
        // The original arena emptied and went back to the shim.
        assert_eq!(heap.arena_count(), 1);
    }

    #[test]
    fn failed_grow_preserves_original() {
        let mut shim = TestShim::new(256);
        shim.budget = Some(256);
        let mut heap = Heap::new(shim, config()).unwrap();
        let p = heap.allocate(200).unwrap();
        heap.get_mut(p).unwrap().fill(0xAB);
        assert_eq!(
            heap.resize(Some(p), 4096),
            Err(HeapError::OutOfMemory { requested: 4096 })
        );
        assert_eq!(heap.get(p).unwrap(), &[0xABu8; 200][..]);
        assert_eq!(heap.stats().allocations_live, 1);
    }

    #[test]
    fn shim_failure_has_no_side_effects() {
        let mut shim = TestShim::new(256);
        shim.budget = Some(0);
        let mut heap = Heap::new(shim, config()).unwrap();
        assert!(heap.allocate(8).is_err());
        assert_eq!(heap.stats(), &HeapStats::default());
    }

    #[test]
    fn short_grant_is_returned_even_if_shim_refuses() {
        let mut heap = heap(64);
        heap.shim.grant_cap = Some(64);
        heap.shim.refuse_frees = true;
        assert_eq!(
            heap.allocate(1000),
            Err(HeapError::OutOfMemory { requested: 1000 })
        );
        assert_eq!(heap.shim.allocations, 1);
        assert_eq!(heap.shim.frees, 1);
        assert_eq!(heap.arena_count(), 0);
        assert_eq!(heap.stats().os_allocations, heap.stats().os_frees);
        assert_eq!(heap.stats().bytes_reserved, 0);
    }

    #[test]
    fn stale_free_is_ignored_without_checks() {
        let mut heap = Heap::with_defaults(TestShim::new(4096));
        let keep = heap.allocate(8).unwrap();
        let p = heap.allocate(8).unwrap();
        heap.free(Some(p));
        heap.free(Some(p));
        assert_eq!(heap.stats().allocations_live, 1);
        assert!(heap.verify().is_ok());
        heap.free(Some(keep));
    }

    #[test]
    #[should_panic(expected = "exit(1)")]
    fn stale_free_is_fatal_with_checks() {
        let mut heap = heap(4096);
        let keep = heap.allocate(8).unwrap();
        let p = heap.allocate(8).unwrap();
        heap.free(Some(p));
        let _ = keep;
        heap.free(Some(p));
    }

    #[test]
    fn resize_of_stale_pointer_is_an_error() {
        let mut heap = Heap::with_defaults(TestShim::new(4096));
        let _keep = heap.allocate(8).unwrap();
        let p = heap.allocate(8).unwrap();
        heap.free(Some(p));
        assert_eq!(
            heap.resize(Some(p), 32),
            Err(HeapError::InvalidPointer { ptr: p })
        );
    }

    #[test]
    fn shutdown_returns_every_arena() {
        let mut heap = heap(256);
        let _a = heap.allocate(200).unwrap();
        let _b = heap.allocate(200).unwrap();
        let shim = heap.shutdown();
        assert_eq!(shim.allocations, 2);
        assert_eq!(shim.frees, 2);
    }
}
