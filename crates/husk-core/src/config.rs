//! Shim configuration and the shared configuration error type.

use core::error::Error;
use core::fmt;

/// Configuration for [`SystemShim`](crate::shim::SystemShim).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemShimConfig {
    /// Minimum number of bytes granted per region.
    ///
    /// Requests below this size are rounded up, so the heap sees fewer,
    /// larger arenas. Default: 64 KiB.
    pub min_region_size: usize,
}

impl SystemShimConfig {
    /// Default region granularity: 64 KiB.
    pub const DEFAULT_MIN_REGION_SIZE: usize = 64 * 1024;

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_region_size == 0 || self.min_region_size > isize::MAX as usize {
            return Err(ConfigError::InvalidRegionSize {
                value: self.min_region_size,
            });
        }
        Ok(())
    }
}

impl Default for SystemShimConfig {
    fn default() -> Self {
        Self {
            min_region_size: Self::DEFAULT_MIN_REGION_SIZE,
        }
    }
}

/// Errors detected while validating runtime configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Region or arena granularity is zero or larger than `isize::MAX`.
    InvalidRegionSize {
        /// The rejected value.
        value: usize,
    },
    /// Split threshold is not a non-zero multiple of the block alignment.
    InvalidSplitThreshold {
        /// The rejected value.
        value: usize,
        /// Required alignment.
        align: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegionSize { value } => {
                write!(f, "region size {value} must be non-zero and at most isize::MAX")
            }
            Self::InvalidSplitThreshold { value, align } => {
                write!(
                    f,
                    "split threshold {value} must be a non-zero multiple of {align}"
                )
            }
        }
    }
}

impl Error for ConfigError {}
