//! Block records and the slot+generation table that owns them.
//!
//! Blocks link to their physical neighbours by slot index. Those internal
//! links never go stale, because a slot is only recycled after its block
//! has been unlinked. Caller-visible [`HeapPtr`]s additionally carry the
//! slot generation, which is bumped every time a block changes between
//! free and in-use, so a freed pointer stops resolving immediately.

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::handle::{ArenaId, HeapPtr};

/// Slot index of a block record.
pub(crate) type BlockIndex = u32;

/// One contiguous byte range inside an arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Block {
    pub arena: ArenaId,
    /// Byte offset of the payload inside the arena region.
    pub offset: usize,
    /// Payload capacity; a non-zero multiple of [`BLOCK_ALIGN`](crate::BLOCK_ALIGN).
    pub capacity: usize,
    /// Size last requested by the caller. Zero for free blocks.
    pub len: usize,
    pub free: bool,
    pub prev: Option<BlockIndex>,
    pub next: Option<BlockIndex>,
}

struct Slot {
    generation: u32,
    block: Option<Block>,
}

/// Slot table of block records with free-list slot reuse.
pub(crate) struct BlockTable {
    slots: Vec<Slot>,
    free_list: Vec<BlockIndex>,
    live: usize,
}

impl BlockTable {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Store a block, returning its slot index.
    ///
    /// Returns `None` once the index space is exhausted.
    pub fn insert(&mut self, block: Block) -> Option<BlockIndex> {
        let index = if let Some(index) = self.free_list.pop() {
            self.slots[index as usize].block = Some(block);
            index
        } else {
            // u32::MAX stays unused so `index + 1` in the handle cannot wrap.
            let index = u32::try_from(self.slots.len())
                .ok()
                .filter(|&i| i < u32::MAX)?;
            self.slots.push(Slot {
                generation: 0,
                block: Some(block),
            });
            index
        };
        self.live += 1;
        Some(index)
    }

    pub fn get(&self, index: BlockIndex) -> Option<&Block> {
        self.slots.get(index as usize)?.block.as_ref()
    }

    /// Remove a block record and recycle its slot.
    ///
    /// A slot whose generation wraps to zero is retired instead of recycled,
    /// so handles from its first epoch can never resolve again.
    pub fn remove(&mut self, index: BlockIndex) -> Option<Block> {
        let slot = self.slots.get_mut(index as usize)?;
        let block = slot.block.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.free_list.push(index);
        }
        self.live -= 1;
        Some(block)
    }

    /// Invalidate every outstanding handle for `index`.
    pub fn bump(&mut self, index: BlockIndex) {
        if let Some(slot) = self.slots.get_mut(index as usize) {
            slot.generation = slot.generation.wrapping_add(1);
        }
    }

    /// Current handle for the block in `index`.
    pub fn handle(&self, index: BlockIndex) -> HeapPtr {
        let generation = self
            .slots
            .get(index as usize)
            .map_or(0, |slot| slot.generation);
        HeapPtr::new(index, generation)
    }

    /// Map a handle back to its slot if the generation is current and the
    /// slot is occupied.
    pub fn resolve(&self, ptr: HeapPtr) -> Option<BlockIndex> {
        let (index, generation) = ptr.parts();
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation || slot.block.is_none() {
            return None;
        }
        Some(index)
    }

    /// Number of occupied slots.
    pub fn live(&self) -> usize {
        self.live
    }
}

impl Index<BlockIndex> for BlockTable {
    type Output = Block;

    fn index(&self, index: BlockIndex) -> &Block {
        match self.get(index) {
            Some(block) => block,
            None => panic!("block link {index} points at a vacant slot"),
        }
    }
}

impl IndexMut<BlockIndex> for BlockTable {
    fn index_mut(&mut self, index: BlockIndex) -> &mut Block {
        match self
            .slots
            .get_mut(index as usize)
            .and_then(|slot| slot.block.as_mut())
        {
            Some(block) => block,
            None => panic!("block link {index} points at a vacant slot"),
        }
    }
}
