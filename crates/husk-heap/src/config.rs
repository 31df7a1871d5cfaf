//! Heap configuration.

use husk_core::ConfigError;

/// Payload alignment and size granularity of every block.
pub const BLOCK_ALIGN: usize = 16;

/// Configuration for a [`Heap`](crate::Heap).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeapConfig {
    /// Smallest arena the heap asks the shim for. Requests larger than this
    /// get an arena sized to the request.
    pub min_arena_size: usize,
    /// A free tail is split off a block only if it is at least this large.
    /// Must be a non-zero multiple of [`BLOCK_ALIGN`].
    pub min_split: usize,
    /// Verify heap structure after every mutating call and treat an invalid
    /// pointer as fatal (print and exit) instead of logging and ignoring it.
    pub consistency_checks: bool,
}

impl HeapConfig {
    /// Default arena granularity: 64 KiB.
    pub const DEFAULT_MIN_ARENA_SIZE: usize = 64 * 1024;
    /// Default split threshold: 64 bytes.
    pub const DEFAULT_MIN_SPLIT: usize = 64;

    /// Config with consistency checks enabled, for tests and debugging.
    pub fn checked() -> Self {
        Self {
            consistency_checks: true,
            ..Self::default()
        }
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_arena_size == 0 || self.min_arena_size > isize::MAX as usize {
            return Err(ConfigError::InvalidRegionSize {
                value: self.min_arena_size,
            });
        }
        if self.min_split == 0 || self.min_split % BLOCK_ALIGN != 0 {
            return Err(ConfigError::InvalidSplitThreshold {
                value: self.min_split,
                align: BLOCK_ALIGN,
            });
        }
        Ok(())
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            min_arena_size: Self::DEFAULT_MIN_ARENA_SIZE,
            min_split: Self::DEFAULT_MIN_SPLIT,
            consistency_checks: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(HeapConfig::default().validate().is_ok());
        assert!(HeapConfig::checked().consistency_checks);
    }

    #[test]
    fn unaligned_split_rejected() {
        let config = HeapConfig {
            min_split: 24,
            ..HeapConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidSplitThreshold {
                value: 24,
                align: BLOCK_ALIGN
            })
        );
    }

    #[test]
    fn zero_arena_size_rejected() {
        let config = HeapConfig {
            min_arena_size: 0,
            ..HeapConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRegionSize { value: 0 })
        ));
    }
}
