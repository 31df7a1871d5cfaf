//! Structural verification of the heap.

use husk_core::OsShim;

use crate::config::BLOCK_ALIGN;
use crate::error::HeapError;
use crate::handle::ArenaId;
use crate::heap::Heap;

fn corrupted(arena: ArenaId, reason: &'static str) -> HeapError {
    HeapError::Corrupted {
        arena: Some(arena),
        reason,
    }
}

impl<S: OsShim> Heap<S> {
    /// Walk every arena and check the block structure.
    ///
    /// Checks, per arena: blocks tile `[0, usable)` in address order with
    /// consistent back-links, capacities are aligned, no two free blocks
    /// are adjacent, every free block is in the free set and an arena is
    /// never left holding a single free block. Globally: the free set,
    /// the block table and the byte counters agree with the walk.
    pub fn verify(&self) -> Result<(), HeapError> {
        let mut walked = 0usize;
        let mut free_blocks = 0usize;
        let mut in_use_bytes = 0usize;
        let mut in_use_blocks = 0usize;
        let mut reserved = 0usize;

        for (&id, arena) in &self.arenas {
            reserved += arena.granted();
            if arena.usable > arena.granted() {
                return Err(corrupted(id, "usable size exceeds granted size"));
            }
            let mut offset = 0;
            let mut prev = None;
            let mut prev_free = false;
            let mut cursor = Some(arena.first);
            while let Some(index) = cursor {
                walked += 1;
                if walked > self.blocks.live() {
                    return Err(corrupted(id, "block chain does not terminate"));
                }
                let Some(block) = self.blocks.get(index) else {
                    return Err(corrupted(id, "link to a vacant block slot"));
                };
                if block.arena != id {
                    return Err(corrupted(id, "block claims a different arena"));
                }
                if block.offset != offset {
                    return Err(corrupted(id, "blocks are not contiguous"));
                }
                if block.prev != prev {
                    return Err(corrupted(id, "broken back-link"));
                }
                if block.capacity == 0 || block.capacity % BLOCK_ALIGN != 0 {
                    return Err(corrupted(id, "unaligned block capacity"));
                }
                if block.free {
                    if prev_free {
                        return Err(corrupted(id, "adjacent free blocks"));
                    }
                    if !self.free_set.contains(&(block.capacity, index)) {
                        return Err(corrupted(id, "free block missing from the free set"));
                    }
                    free_blocks += 1;
                } else {
                    if block.len > block.capacity {
                        return Err(corrupted(id, "length exceeds capacity"));
                    }
                    in_use_bytes += block.capacity;
                    in_use_blocks += 1;
                }
                prev_free = block.free;
                offset += block.capacity;
                prev = Some(index);
                cursor = block.next;
            }
            if offset != arena.usable {
                return Err(corrupted(id, "blocks do not cover the arena"));
            }
            let first = &self.blocks[arena.first];
            if first.free && first.next.is_none() {
                return Err(corrupted(id, "empty arena was not released"));
            }
        }

        let global = |reason| HeapError::Corrupted {
            arena: None,
            reason,
        };
        if walked != self.blocks.live() {
            return Err(global("orphaned block records"));
        }
        if free_blocks != self.free_set.len() {
            return Err(global("free set holds stale entries"));
        }
        if in_use_bytes != self.stats.bytes_in_use || in_use_blocks != self.stats.allocations_live
        {
            return Err(global("allocation counters disagree with the blocks"));
        }
        if reserved != self.stats.bytes_reserved || self.arenas.len() != self.stats.arenas_live {
            return Err(global("arena counters disagree with the registry"));
        }
        if in_use_bytes > reserved {
            return Err(global("more bytes in use than reserved"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeapConfig;
    use alloc::vec;
    use alloc::vec::Vec;

    struct PlainShim;

    impl OsShim for PlainShim {
        type Region = Vec<u8>;

        fn allocate(&mut self, size: usize) -> Option<Vec<u8>> {
            Some(vec![0; size.max(1024)])
        }

        fn free(&mut self, _region: Vec<u8>) -> bool {
            true
        }

        fn print_error(&mut self, _message: &str) {}

        fn exit(&mut self, code: i32) -> ! {
            panic!("exit({code})")
        }
    }

    fn heap() -> Heap<PlainShim> {
        let config = HeapConfig {
            min_arena_size: 64,
            ..HeapConfig::default()
        };
        Heap::new(PlainShim, config).unwrap()
    }

    #[test]
    fn empty_heap_verifies() {
        assert_eq!(heap().verify(), Ok(()));
    }

    #[test]
    fn busy_heap_verifies() {
        let mut heap = heap();
        let ptrs: Vec<_> = (1..20).map(|i| heap.allocate(i * 17).unwrap()).collect();
        for p in ptrs.iter().step_by(2) {
            heap.free(Some(*p));
        }
        assert_eq!(heap.verify(), Ok(()));
    }

    #[test]
    fn detects_missing_free_set_entry() {
        let mut heap = heap();
        let _p = heap.allocate(32).unwrap();
        let entry = *heap.free_set.iter().next().unwrap();
        heap.free_set.remove(&entry);
        assert!(matches!(
            heap.verify(),
            Err(HeapError::Corrupted {
                reason: "free block missing from the free set",
                ..
            })
        ));
    }

    #[test]
    fn detects_counter_drift() {
        let mut heap = heap();
        let _p = heap.allocate(32).unwrap();
        heap.stats.bytes_in_use += 16;
        assert!(matches!(
            heap.verify(),
            Err(HeapError::Corrupted { arena: None, .. })
        ));
    }
}
