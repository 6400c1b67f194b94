//! End-to-end lifecycle: a long-lived arena serving per-frame transient
//! allocations through snapshot/rewind, trimmed once the working set is
//! known, with containers drawing storage through the allocator adapter.

use std::cell::RefCell;
use std::ptr::NonNull;

use kiln_arena::{Arena, ArenaAllocator, ArenaConfig, RawAlloc, WORD_BYTES};

#[test]
fn per_frame_rewind_reaches_steady_state() {
    let mut arena = Arena::with_config(ArenaConfig::with_region_capacity(32));

    // Long-lived state allocated before any frame runs.
    let persistent = arena.alloc(8 * WORD_BYTES);
    unsafe { persistent.as_ptr().cast::<u64>().write(0xC0FFEE) };

    let frame_start = arena.snapshot();
    let mut first_frame_ptrs = Vec::new();

    for frame in 0..100 {
        arena.rewind(frame_start);

        let mut ptrs = Vec::new();
        for task in 0..12 {
            // Mixed transient sizes, several of them spilling past the
            // 32-word region.
            let bytes = (task % 5 + 1) * 6 * WORD_BYTES;
            ptrs.push(arena.alloc(bytes));
        }

        if frame == 0 {
            first_frame_ptrs = ptrs;
        } else {
            // Identical per-frame sequences land on identical addresses.
            assert_eq!(ptrs, first_frame_ptrs);
        }
    }

    // The chain stopped growing after the first frame.
    let created = arena.stats().regions_created;
    arena.rewind(frame_start);
    for task in 0..12 {
        let bytes = (task % 5 + 1) * 6 * WORD_BYTES;
        arena.alloc(bytes);
    }
    assert_eq!(arena.stats().regions_created, created);

    // Long-lived state was never disturbed by any rewind.
    assert_eq!(unsafe { persistent.as_ptr().cast::<u64>().read() }, 0xC0FFEE);
}

#[test]
fn trim_shrinks_a_spiky_arena_back_down() {
    let mut arena = Arena::with_config(ArenaConfig::with_region_capacity(32));
    arena.alloc(16 * WORD_BYTES);
    let steady = arena.snapshot();

    // One spiky frame blows the chain up.
    for _ in 0..8 {
        arena.alloc(40 * WORD_BYTES);
    }
    let spike_bytes = arena.memory_bytes();

    arena.rewind(steady);
    arena.trim();
    assert_eq!(arena.region_count(), 1);
    assert!(arena.memory_bytes() < spike_bytes);

    // The trimmed arena keeps working.
    arena.alloc(10 * WORD_BYTES);
    assert_eq!(arena.used_words(), 26);
}

#[test]
fn containers_share_an_arena_through_the_adapter() {
    let arena = RefCell::new(Arena::with_config(ArenaConfig::with_region_capacity(128)));
    let frame = arena.borrow().snapshot();
    let alloc = ArenaAllocator::new(&arena);

    // A minimal fixed-capacity container written against RawAlloc only.
    struct FlatBuf<A: RawAlloc> {
        ptr: NonNull<u32>,
        len: usize,
        alloc: A,
    }

    impl<A: RawAlloc> FlatBuf<A> {
        fn with_capacity(alloc: A, cap: usize) -> Self {
            Self {
                ptr: alloc.allocate::<u32>(cap),
                len: 0,
                alloc,
            }
        }

        fn push(&mut self, value: u32) {
            unsafe { self.ptr.as_ptr().add(self.len).write(value) };
            self.len += 1;
        }

        fn get(&self, i: usize) -> u32 {
            unsafe { self.ptr.as_ptr().add(i).read() }
        }
    }

    impl<A: RawAlloc> Drop for FlatBuf<A> {
        fn drop(&mut self) {
            unsafe { self.alloc.deallocate(self.ptr, self.len) };
        }
    }

    {
        let mut a = FlatBuf::with_capacity(alloc, 16);
        let mut b = FlatBuf::with_capacity(alloc, 16);
        for i in 0..16u32 {
            a.push(i);
            b.push(i * i);
        }
        assert_eq!(a.get(7), 7);
        assert_eq!(b.get(7), 49);
    }

    // Dropping the containers returned nothing; the owner reclaims in bulk.
    assert!(arena.borrow().used_words() >= 16);
    arena.borrow_mut().rewind(frame);
    assert_eq!(arena.borrow().used_words(), 0);
}

#[cfg(any(unix, windows))]
#[test]
fn virtual_backend_runs_the_same_lifecycle() {
    use kiln_arena::VirtualBackend;

    let config = ArenaConfig::with_region_capacity(ArenaConfig::DEFAULT_REGION_CAPACITY);
    let mut arena = Arena::with_backend(VirtualBackend, config);

    let p = arena.alloc(1024);
    unsafe { p.as_ptr().write(0x5A) };
    let snap = arena.snapshot();

    let q = arena.alloc(100 * 1024);
    assert_ne!(p, q);
    assert_eq!(arena.stats().oversized_allocations, 1);

    arena.rewind(snap);
    arena.trim();
    assert_eq!(unsafe { p.as_ptr().read() }, 0x5A);

    arena.release();
    assert_eq!(arena.region_count(), 0);
}
