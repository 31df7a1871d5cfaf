//! Heap pointers and arena identifiers.
//!
//! A [`HeapPtr`] is what `allocate` hands back instead of a raw address. It
//! encodes a block slot and that slot's generation, so a pointer that has
//! been freed (or whose block was merged away) resolves to nothing instead
//! of aliasing whatever reuses the slot.

use core::fmt;
use core::num::NonZeroU64;

/// Handle encoding: upper 32 bits = slot index + 1, lower 32 bits = generation.
fn encode(slot: u32, generation: u32) -> NonZeroU64 {
    let bits = ((slot as u64 + 1) << 32) | generation as u64;
    // slot + 1 >= 1 puts a set bit in the upper half.
    NonZeroU64::new(bits).unwrap_or(NonZeroU64::MIN)
}

fn decode(bits: NonZeroU64) -> (u32, u32) {
    let bits = bits.get();
    let slot = ((bits >> 32) as u32).wrapping_sub(1);
    (slot, bits as u32)
}

/// Caller-visible address of one live allocation.
///
/// Never null: the absence of an allocation is `Option<HeapPtr>`, which has
/// the same size as `HeapPtr` itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub struct HeapPtr(NonZeroU64);

impl HeapPtr {
    pub(crate) fn new(slot: u32, generation: u32) -> Self {
        Self(encode(slot, generation))
    }

    pub(crate) fn parts(self) -> (u32, u32) {
        decode(self.0)
    }

    /// Raw handle bits, for storing a pointer in foreign memory.
    pub fn to_bits(self) -> u64 {
        self.0.get()
    }

    /// Rebuild a pointer from [`to_bits`](HeapPtr::to_bits) output.
    ///
    /// Zero is the null pointer.
    pub fn from_bits(bits: u64) -> Option<Self> {
        NonZeroU64::new(bits).map(Self)
    }
}

impl fmt::Debug for HeapPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.parts();
        write!(f, "HeapPtr(slot={slot}, gen={generation})")
    }
}

impl fmt::Display for HeapPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.to_bits())
    }
}

/// Identifies one arena obtained from the OS shim.
///
/// Ids are assigned sequentially and never reused within a heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(pub u64);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
