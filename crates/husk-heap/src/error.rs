//! Heap error types.

use core::error::Error;
use core::fmt;

use husk_core::ConfigError;

use crate::handle::{ArenaId, HeapPtr};

/// Errors that can occur during heap operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeapError {
    /// No free block fits and the shim refused a new arena (or the request
    /// overflowed the address space).
    OutOfMemory {
        /// Number of bytes requested by the caller.
        requested: usize,
    },
    /// A pointer that is not the current address of a live allocation.
    InvalidPointer {
        /// The rejected pointer.
        ptr: HeapPtr,
    },
    /// Structural verification found a broken invariant.
    Corrupted {
        /// Arena in which the problem was found, if it is arena-local.
        arena: Option<ArenaId>,
        /// What was wrong.
        reason: &'static str,
    },
    /// The heap configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: requested {requested} bytes")
            }
            Self::InvalidPointer { ptr } => {
                write!(f, "invalid pointer {ptr}")
            }
            Self::Corrupted {
                arena: Some(arena),
                reason,
            } => {
                write!(f, "heap corrupted in arena {arena}: {reason}")
            }
            Self::Corrupted {
                arena: None,
                reason,
            } => {
                write!(f, "heap corrupted: {reason}")
            }
            Self::Config(e) => write!(f, "invalid heap config: {e}"),
        }
    }
}

impl Error for HeapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for HeapError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
