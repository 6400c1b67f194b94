//! Pluggable memory sources for region storage.
//!
//! A backend's only job is to create and destroy fixed-capacity blocks of
//! machine words. The strategy is chosen when the arena is constructed and
//! never changes afterwards:
//!
//! - [`HeapBackend`] goes through the global allocator. Simple and fully
//!   portable; the right choice for small or short-lived arenas.
//! - [`VirtualBackend`] maps pages straight from the OS, bypassing the heap.
//!   Large, long-lived arenas avoid heap fragmentation and allocator
//!   bookkeeping this way.
//!
//! Backends are also the test seam: the arena tests inject counting and
//! always-failing fakes to observe create/destroy pairing and exhaustion.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Size of a machine word in bytes. All arena sizing is word-granular.
pub const WORD_BYTES: usize = std::mem::size_of::<usize>();

/// A source of region storage.
///
/// `create_region` and `destroy_region` are the entire contract; backends
/// hold no per-region state beyond what the returned pointer implies.
pub trait Backend {
    /// Reserve a block of `words` machine words, word-aligned.
    ///
    /// Returns `None` when the source is exhausted or the byte size would
    /// overflow. Contents of the block are unspecified.
    fn create_region(&mut self, words: usize) -> Option<NonNull<usize>>;

    /// Release a block previously returned by [`Backend::create_region`].
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `create_region(words)` on this
    /// backend with the same `words`, and must not have been destroyed
    /// already.
    unsafe fn destroy_region(&mut self, ptr: NonNull<usize>, words: usize);
}

/// Region storage drawn from the global allocator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeapBackend;

impl Backend for HeapBackend {
    fn create_region(&mut self, words: usize) -> Option<NonNull<usize>> {
        // Layout::array performs the overflow-checked multiplication.
        let layout = Layout::array::<usize>(words).ok()?;
        if layout.size() == 0 {
            return None;
        }
        // Safety: layout has non-zero size.
        let ptr = unsafe { alloc::alloc(layout) };
        NonNull::new(ptr.cast::<usize>())
    }

    unsafe fn destroy_region(&mut self, ptr: NonNull<usize>, words: usize) {
        // Same `words` as the create, so the layout computation cannot fail.
        if let Ok(layout) = Layout::array::<usize>(words) {
            // Safety: `ptr` came from `alloc` with this exact layout.
            unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) };
        }
    }
}

/// Region storage mapped directly from the OS.
///
/// Uses anonymous private `mmap`/`munmap` on unix and
/// `VirtualAlloc`/`VirtualFree` on windows. Mappings are page-aligned,
/// which more than satisfies the word-alignment contract.
#[cfg(any(unix, windows))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VirtualBackend;

#[cfg(any(unix, windows))]
impl Backend for VirtualBackend {
    fn create_region(&mut self, words: usize) -> Option<NonNull<usize>> {
        let bytes = words.checked_mul(WORD_BYTES)?;
        if bytes == 0 {
            return None;
        }
        platform::map(bytes)
    }

    unsafe fn destroy_region(&mut self, ptr: NonNull<usize>, words: usize) {
        // Cannot overflow: the paired create succeeded with the same `words`.
        let bytes = words * WORD_BYTES;
        // Safety: forwarded from the caller's contract.
        unsafe { platform::unmap(ptr, bytes) };
    }
}

#[cfg(unix)]
mod platform {
    use std::os::raw::{c_int, c_void};
    use std::ptr::NonNull;

    pub(super) fn map(bytes: usize) -> Option<NonNull<usize>> {
        const PROT: c_int = libc::PROT_READ | libc::PROT_WRITE;
        const FLAGS: c_int = libc::MAP_PRIVATE | libc::MAP_ANONYMOUS;

        // Safety: anonymous private mapping, no fd, kernel chooses the address.
        let addr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                bytes as libc::size_t,
                PROT,
                FLAGS,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return None;
        }
        NonNull::new(addr.cast::<usize>())
    }

    pub(super) unsafe fn unmap(ptr: NonNull<usize>, bytes: usize) {
        // Safety: `ptr` is a live mapping of exactly `bytes` bytes.
        let rc = unsafe { libc::munmap(ptr.as_ptr().cast::<c_void>(), bytes as libc::size_t) };
        debug_assert_eq!(rc, 0, "munmap failed");
    }
}

#[cfg(windows)]
mod platform {
    use std::os::raw::c_void;
    use std::ptr::NonNull;

    use windows::Win32::System::Memory;

    pub(super) fn map(bytes: usize) -> Option<NonNull<usize>> {
        let flags = Memory::MEM_RESERVE | Memory::MEM_COMMIT;

        // Safety: fresh reserve+commit, no address hint.
        let addr = unsafe { Memory::VirtualAlloc(None, bytes, flags, Memory::PAGE_READWRITE) };
        NonNull::new(addr.cast::<usize>())
    }

    pub(super) unsafe fn unmap(ptr: NonNull<usize>, _bytes: usize) {
        // MEM_RELEASE requires size 0 and frees the whole reservation.
        let released = unsafe {
            Memory::VirtualFree(ptr.as_ptr().cast::<c_void>(), 0, Memory::MEM_RELEASE)
        };
        debug_assert!(released.is_ok(), "VirtualFree failed");
    }
}
