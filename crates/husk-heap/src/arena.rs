//! One region obtained from the OS shim.

use crate::config::BLOCK_ALIGN;
use crate::table::BlockIndex;

/// A shim region carved into a doubly linked chain of blocks.
///
/// The chain starting at `first` covers `[0, usable)` without gaps or
/// overlaps. Bytes past `usable` (at most `BLOCK_ALIGN - 1` of them) are
/// never handed out.
pub(crate) struct Arena<R> {
    pub region: R,
    pub usable: usize,
    pub first: BlockIndex,
}

impl<R: AsRef<[u8]> + AsMut<[u8]>> Arena<R> {
    /// Usable length for a region of `granted` bytes.
    pub fn usable_len(granted: usize) -> usize {
        granted & !(BLOCK_ALIGN - 1)
    }

    /// Size the shim actually granted.
    pub fn granted(&self) -> usize {
        self.region.as_ref().len()
    }

    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.region.as_ref()[offset..offset + len]
    }

    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.region.as_mut()[offset..offset + len]
    }
}
