//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// These only surface through the `try_*` entry points. The plain entry
/// points ([`Arena::alloc`](crate::Arena::alloc) and the allocator adapter)
/// treat both variants as fatal, since an arena has no retry or graceful
/// degradation path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The backend could not provide storage for a new region.
    BackendExhausted {
        /// Number of bytes requested from the backend.
        requested: usize,
    },
    /// Computing a region's backing-storage size in bytes overflowed.
    SizeOverflow {
        /// The region capacity, in machine words, whose byte size overflowed.
        words: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendExhausted { requested } => {
                write!(f, "backend exhausted: requested {requested} bytes")
            }
            Self::SizeOverflow { words } => {
                write!(f, "region size overflow: {words} words exceeds the address space")
            }
        }
    }
}

impl Error for ArenaError {}
