//! The arena: a chain of bump-allocated regions with snapshot/rewind.

use std::alloc::{handle_alloc_error, Layout};
use std::ptr::NonNull;

use smallvec::SmallVec;

use crate::backend::{Backend, HeapBackend, WORD_BYTES};
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::region::Region;
use crate::snapshot::{RegionMark, Snapshot};

/// Lifetime counters for one arena.
///
/// Cheap enough to keep unconditionally: two words of state, touched only
/// on region creation and on oversized requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Regions created since construction or the last [`Arena::release`].
    pub regions_created: u64,
    /// Allocations whose rounded size exceeded the configured region
    /// capacity. Each of these forces a region sized exactly to the
    /// request.
    pub oversized_allocations: u64,
}

/// A bump allocator over a chain of fixed-capacity regions.
///
/// Allocation advances a cursor through the current region, appending a new
/// region when the chain runs out of room. There is no per-object free:
/// scoped work brackets itself with [`Arena::snapshot`] and
/// [`Arena::rewind`] instead, reclaiming whole tails of the chain in O(1)
/// without touching the backend.
///
/// ```
/// use kiln_arena::Arena;
///
/// let mut arena = Arena::new();
/// let keep = arena.alloc(64);
///
/// let frame = arena.snapshot();
/// let scratch = arena.alloc(4096);
/// // ... transient work in `scratch` ...
/// arena.rewind(frame);
/// // `keep` is still valid; `scratch` storage will be reused.
/// # let _ = (keep, scratch);
/// ```
///
/// The arena exclusively owns its chain; dropping it releases every region
/// to the backend. It is single-owner by design: all mutators take
/// `&mut self`, there is no internal synchronization, and the raw region
/// pointers keep it `!Send` and `!Sync`. Wrap it in external mutual
/// exclusion if several threads must share one.
pub struct Arena<B: Backend = HeapBackend> {
    backend: B,
    config: ArenaConfig,
    /// The region chain, oldest first. Exclusively owned.
    regions: SmallVec<[Region; 4]>,
    /// Index of the region receiving allocations. Meaningful only while
    /// `regions` is non-empty; moves forward during allocation and backward
    /// only via rewind/reset.
    current: usize,
    /// Next region creation stamp. Monotonic for the arena's whole
    /// lifetime, including across [`Arena::release`], so stale snapshots
    /// can never revalidate against a recycled index.
    next_region_id: u64,
    stats: ArenaStats,
}

impl Arena<HeapBackend> {
    /// Heap-backed arena with the default region capacity.
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::new())
    }

    /// Heap-backed arena with a custom configuration.
    pub fn with_config(config: ArenaConfig) -> Self {
        Self::with_backend(HeapBackend, config)
    }
}

impl Default for Arena<HeapBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Arena<B> {
    /// Arena drawing region storage from `backend`.
    ///
    /// The backend is fixed for the arena's lifetime; there is no runtime
    /// switching.
    pub fn with_backend(backend: B, config: ArenaConfig) -> Self {
        Self {
            backend,
            config,
            regions: SmallVec::new(),
            current: 0,
            next_region_id: 0,
            stats: ArenaStats::default(),
        }
    }

    /// Allocate `bytes`, rounded up to whole machine words.
    ///
    /// The returned pointer is word-aligned (no stronger alignment is
    /// offered), stable until a rewind/reset/release covers it, and never
    /// moved or compacted. Contents are not zeroed.
    ///
    /// Exhaustion is fatal: the process is taken down through
    /// [`std::alloc::handle_alloc_error`]. Arenas are expected to be sized
    /// generously; use [`Arena::try_alloc`] where a sentinel is wanted
    /// instead.
    pub fn alloc(&mut self, bytes: usize) -> NonNull<u8> {
        match self.try_alloc(bytes) {
            Ok(ptr) => ptr,
            Err(err) => fatal(err),
        }
    }

    /// Fallible form of [`Arena::alloc`].
    pub fn try_alloc(&mut self, bytes: usize) -> Result<NonNull<u8>, ArenaError> {
        let words = bytes.div_ceil(WORD_BYTES);

        if self.regions.is_empty() {
            self.push_region(words)?;
        }

        // Skip leftover regions (kept alive by an earlier rewind) that lack
        // room. Bounded by the number of regions created since that rewind.
        while !self.regions[self.current].has_room(words)
            && self.current + 1 < self.regions.len()
        {
            self.current += 1;
        }

        if !self.regions[self.current].has_room(words) {
            self.push_region(words)?;
        }

        if words > self.config.region_capacity {
            self.stats.oversized_allocations += 1;
        }
        Ok(self.regions[self.current].carve(words))
    }

    /// Grow-by-copy reallocation.
    ///
    /// With `new_bytes <= old_bytes` this returns `old` unchanged and does
    /// not reclaim the slack. Otherwise a fresh block is allocated, the
    /// first `old_bytes` are copied over, and the old block is orphaned
    /// until a rewind/reset covers it. The old block is never extended in
    /// place, even when it is the most recent allocation.
    ///
    /// Exhaustion is fatal, as in [`Arena::alloc`].
    ///
    /// # Safety
    ///
    /// `old` must point to at least `old_bytes` readable bytes obtained
    /// from this arena and not yet discarded by a rewind, reset, or
    /// release.
    pub unsafe fn realloc(
        &mut self,
        old: NonNull<u8>,
        old_bytes: usize,
        new_bytes: usize,
    ) -> NonNull<u8> {
        // Safety: forwarded from the caller's contract.
        match unsafe { self.try_realloc(old, old_bytes, new_bytes) } {
            Ok(ptr) => ptr,
            Err(err) => fatal(err),
        }
    }

    /// Fallible form of [`Arena::realloc`].
    ///
    /// # Safety
    ///
    /// Same contract as [`Arena::realloc`].
    pub unsafe fn try_realloc(
        &mut self,
        old: NonNull<u8>,
        old_bytes: usize,
        new_bytes: usize,
    ) -> Result<NonNull<u8>, ArenaError> {
        if new_bytes <= old_bytes {
            return Ok(old);
        }
        let fresh = self.try_alloc(new_bytes)?;
        // Safety: the caller guarantees `old_bytes` readable bytes at
        // `old`; `fresh` is a distinct block of at least `new_bytes`.
        unsafe { std::ptr::copy_nonoverlapping(old.as_ptr(), fresh.as_ptr(), old_bytes) };
        Ok(fresh)
    }

    /// Capture the allocation cursor. O(1), allocation-free.
    pub fn snapshot(&self) -> Snapshot {
        match self.regions.get(self.current) {
            None => Snapshot {
                mark: None,
                count: 0,
            },
            Some(region) => Snapshot {
                mark: Some(RegionMark {
                    index: self.current,
                    id: region.id(),
                }),
                count: region.count(),
            },
        }
    }

    /// Discard everything allocated since `snapshot` was captured.
    ///
    /// The marked region's cursor is restored and every region after it in
    /// the chain is emptied for reuse; nothing is returned to the backend.
    /// Rewinding a snapshot captured on an empty arena is equivalent to
    /// [`Arena::reset`].
    ///
    /// # Panics
    ///
    /// Panics if the marked region has since been released by
    /// [`Arena::trim`] or [`Arena::release`]. Snapshots from a different
    /// arena are a contract violation and are not reliably detected.
    pub fn rewind(&mut self, snapshot: Snapshot) {
        let Some(mark) = snapshot.mark else {
            self.reset();
            return;
        };
        let live = self
            .regions
            .get(mark.index)
            .is_some_and(|region| region.id() == mark.id);
        assert!(live, "rewind to a snapshot whose region was released");

        self.regions[mark.index].rewind_to(snapshot.count);
        for region in &mut self.regions[mark.index + 1..] {
            region.reset();
        }
        self.current = mark.index;
    }

    /// Empty every region and move the cursor back to the start of the
    /// chain.
    ///
    /// Equivalent to rewinding to a snapshot captured before the first
    /// allocation. No memory is returned to the backend; the capacity is
    /// reused by subsequent allocations.
    pub fn reset(&mut self) {
        for region in &mut self.regions {
            region.reset();
        }
        self.current = 0;
    }

    /// Release every region strictly after the current one back to the
    /// backend.
    ///
    /// Intended after a rewind, once the discarded tail is known not to be
    /// needed again. Irreversible: snapshots marking a released region
    /// become stale, and [`Arena::rewind`] panics on them.
    pub fn trim(&mut self) {
        while self.regions.len() > self.current + 1 {
            if let Some(region) = self.regions.pop() {
                // Safety: paired with the create in `push_region`; popping
                // removes the region from the chain, so this is the only
                // release.
                unsafe { self.backend.destroy_region(region.base(), region.capacity()) };
            }
        }
    }

    /// Destroy every region, returning the arena to its freshly
    /// constructed state.
    ///
    /// All outstanding pointers and snapshots are invalidated. Dropping
    /// the arena performs the same release.
    pub fn release(&mut self) {
        while let Some(region) = self.regions.pop() {
            // Safety: paired with the create in `push_region`.
            unsafe { self.backend.destroy_region(region.base(), region.capacity()) };
        }
        self.current = 0;
        self.stats = ArenaStats::default();
    }

    /// Lifetime counters: regions created and oversized allocations.
    pub fn stats(&self) -> ArenaStats {
        self.stats
    }

    /// The configuration the arena was constructed with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Number of regions currently in the chain.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Words handed out across the whole chain.
    pub fn used_words(&self) -> usize {
        self.regions.iter().map(|r| r.count()).sum()
    }

    /// Words of backing storage across the whole chain.
    pub fn capacity_words(&self) -> usize {
        self.regions.iter().map(|r| r.capacity()).sum()
    }

    /// Bytes of backing storage across the whole chain.
    pub fn memory_bytes(&self) -> usize {
        self.capacity_words() * WORD_BYTES
    }

    /// Create a region sized `max(region_capacity, words)` after the end of
    /// the chain and make it current.
    fn push_region(&mut self, words: usize) -> Result<(), ArenaError> {
        let capacity = self.config.region_capacity.max(words);
        let bytes = capacity
            .checked_mul(WORD_BYTES)
            .ok_or(ArenaError::SizeOverflow { words: capacity })?;
        let ptr = self
            .backend
            .create_region(capacity)
            .ok_or(ArenaError::BackendExhausted { requested: bytes })?;

        self.regions
            .push(Region::new(self.next_region_id, ptr, capacity));
        self.next_region_id += 1;
        self.stats.regions_created += 1;
        self.current = self.regions.len() - 1;
        Ok(())
    }
}

impl<B: Backend> Drop for Arena<B> {
    fn drop(&mut self) {
        self.release();
    }
}

/// The non-returning leg of the fatal-by-default failure policy.
fn fatal(err: ArenaError) -> ! {
    match err {
        ArenaError::BackendExhausted { requested } => {
            let layout = Layout::from_size_align(requested, WORD_BYTES)
                .unwrap_or(Layout::new::<usize>());
            handle_alloc_error(layout)
        }
        ArenaError::SizeOverflow { .. } => panic!("{err}"),
    }
}
