//! Arena configuration parameters.

use crate::backend::WORD_BYTES;

/// Configuration for an [`Arena`](crate::Arena).
///
/// Controls region sizing. Values are fixed at construction; there is no
/// runtime reconfiguration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Capacity of a freshly created region, in machine words.
    ///
    /// Default: 8192 words (64KB on a 64-bit target). Allocations larger
    /// than this get a region sized exactly to the request.
    pub region_capacity: usize,
}

impl ArenaConfig {
    /// Default region capacity: 8Ki machine words.
    pub const DEFAULT_REGION_CAPACITY: usize = 8 * 1024;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            region_capacity: Self::DEFAULT_REGION_CAPACITY,
        }
    }

    /// Create a config with a custom region capacity in machine words.
    ///
    /// # Panics
    ///
    /// Panics if `words` is zero.
    pub fn with_region_capacity(words: usize) -> Self {
        assert!(words > 0, "region capacity must be non-zero");
        Self {
            region_capacity: words,
        }
    }

    /// Capacity of a default-sized region in bytes.
    pub fn region_bytes(&self) -> usize {
        self.region_capacity * WORD_BYTES
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
