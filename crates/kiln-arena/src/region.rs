//! A single backend-provided region and its bump cursor.

use std::ptr::NonNull;

/// One contiguous block of region storage plus its bump cursor.
///
/// Regions never own their storage in the `Drop` sense — the arena pairs
/// every region with a backend `destroy_region` call when it leaves the
/// chain. `count <= capacity` holds at all times.
pub(crate) struct Region {
    /// Creation stamp, unique within the owning arena for its whole
    /// lifetime. Snapshot staleness checks compare against it.
    id: u64,
    /// Base of the backing storage, `capacity` words long.
    ptr: NonNull<usize>,
    /// Words handed out so far.
    count: usize,
    /// Words of backing storage.
    capacity: usize,
}

impl Region {
    pub(crate) fn new(id: u64, ptr: NonNull<usize>, capacity: usize) -> Self {
        Self {
            id,
            ptr,
            count: 0,
            capacity,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn base(&self) -> NonNull<usize> {
        self.ptr
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn remaining(&self) -> usize {
        self.capacity - self.count
    }

    pub(crate) fn has_room(&self, words: usize) -> bool {
        words <= self.remaining()
    }

    /// Carve `words` at the cursor and advance it.
    ///
    /// Caller must have checked [`Region::has_room`] first.
    pub(crate) fn carve(&mut self, words: usize) -> NonNull<u8> {
        debug_assert!(self.has_room(words));
        // Safety: count + words <= capacity, so the offset stays inside the
        // backing storage (one-past-the-end at worst, for words == 0 at the
        // very end).
        let ptr = unsafe { self.ptr.as_ptr().add(self.count) };
        self.count += words;
        // Safety: derived from a NonNull base by an in-bounds offset.
        unsafe { NonNull::new_unchecked(ptr.cast::<u8>()) }
    }

    /// Move the cursor back to an earlier value, discarding later carves.
    pub(crate) fn rewind_to(&mut self, count: usize) {
        debug_assert!(count <= self.capacity);
        self.count = count;
    }

    /// Empty the region for reuse. The storage is untouched.
    pub(crate) fn reset(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, HeapBackend, WORD_BYTES};

    fn with_region(capacity: usize, f: impl FnOnce(&mut Region)) {
        let mut backend = HeapBackend;
        let ptr = backend.create_region(capacity).unwrap();
        let mut region = Region::new(0, ptr, capacity);
        f(&mut region);
        unsafe { backend.destroy_region(ptr, capacity) };
    }

    #[test]
    fn carve_advances_by_word_offsets() {
        with_region(8, |region| {
            let a = region.carve(3);
            let b = region.carve(2);
            assert_eq!(region.count(), 5);
            assert_eq!(region.remaining(), 3);
            let gap = b.as_ptr() as usize - a.as_ptr() as usize;
            assert_eq!(gap, 3 * WORD_BYTES);
        });
    }

    #[test]
    fn zero_word_carve_is_valid_at_full_capacity() {
        with_region(4, |region| {
            region.carve(4);
            assert!(!region.has_room(1));
            assert!(region.has_room(0));
            region.carve(0);
            assert_eq!(region.count(), 4);
        });
    }

    #[test]
    fn rewind_and_reset_restore_room() {
        with_region(8, |region| {
            region.carve(6);
            region.rewind_to(2);
            assert_eq!(region.remaining(), 6);
            region.reset();
            assert_eq!(region.count(), 0);
            assert!(region.has_room(8));
        });
    }
}
