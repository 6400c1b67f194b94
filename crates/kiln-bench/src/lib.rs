//! Benchmark profiles for the kiln arena allocator.
//!
//! Provides the shared workloads the criterion benches run against:
//!
//! - [`frame_sizes`]: a mixed per-frame transient allocation profile
//! - [`frame_arena`]: an arena pre-grown to that profile's steady state

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kiln_arena::{Arena, ArenaConfig, Snapshot, WORD_BYTES};

/// Per-frame transient allocation profile: 64 mixed requests between one
/// word and half a region.
pub fn frame_sizes() -> Vec<usize> {
    (0..64)
        .map(|i| (i % 16 + 1) * 8 * WORD_BYTES)
        .collect()
}

/// Build an arena already grown to the steady state of [`frame_sizes`],
/// plus the snapshot benchmarked frames rewind to.
pub fn frame_arena() -> (Arena, Snapshot) {
    let mut arena = Arena::with_config(ArenaConfig::new());
    let frame = arena.snapshot();
    for bytes in frame_sizes() {
        arena.alloc(bytes);
    }
    arena.rewind(frame);
    (arena, frame)
}
