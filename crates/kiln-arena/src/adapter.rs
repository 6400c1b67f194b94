//! Arena-backed implementation of the generic allocation capability.

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::arena::Arena;
use crate::backend::{Backend, HeapBackend, WORD_BYTES};

/// Allocation capability for generic containers: typed bulk allocate plus a
/// matching deallocate.
///
/// Containers written against this trait stay agnostic of where their
/// storage comes from. The arena-backed implementation makes `deallocate` a
/// no-op — memory comes back wholesale when the arena's owner rewinds,
/// resets, or releases it.
pub trait RawAlloc {
    /// Allocate storage for `n` values of `T`.
    ///
    /// The storage is uninitialised and word-aligned. Exhaustion of the
    /// underlying source is fatal, matching [`Arena::alloc`].
    fn allocate<T>(&self, n: usize) -> NonNull<T>;

    /// Release storage previously returned by [`RawAlloc::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` must have come from `allocate::<T>(n)` on an equal allocator
    /// and must not be used afterwards.
    unsafe fn deallocate<T>(&self, ptr: NonNull<T>, n: usize);
}

/// A `Copy` handle letting generic containers draw storage from a shared
/// [`Arena`].
///
/// Two handles compare equal iff they reference the same arena. The
/// `RefCell` seam keeps the arena single-owner while allowing any number of
/// containers to hold allocator handles; borrows last only for the duration
/// of each allocation call.
///
/// Types with alignment stricter than a machine word are not supported —
/// the arena offers word alignment only.
pub struct ArenaAllocator<'a, B: Backend = HeapBackend> {
    arena: &'a RefCell<Arena<B>>,
}

impl<'a, B: Backend> ArenaAllocator<'a, B> {
    /// Handle onto `arena`.
    pub fn new(arena: &'a RefCell<Arena<B>>) -> Self {
        Self { arena }
    }
}

impl<B: Backend> fmt::Debug for ArenaAllocator<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArenaAllocator({:p})", self.arena)
    }
}

impl<B: Backend> Clone for ArenaAllocator<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Backend> Copy for ArenaAllocator<'_, B> {}

impl<B: Backend> PartialEq for ArenaAllocator<'_, B> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena)
    }
}

impl<B: Backend> Eq for ArenaAllocator<'_, B> {}

impl<B: Backend> RawAlloc for ArenaAllocator<'_, B> {
    fn allocate<T>(&self, n: usize) -> NonNull<T> {
        debug_assert!(
            mem::align_of::<T>() <= WORD_BYTES,
            "arena storage is word-aligned only"
        );
        if mem::size_of::<T>() == 0 {
            return NonNull::dangling();
        }
        let Some(bytes) = mem::size_of::<T>().checked_mul(n) else {
            panic!("allocation of {n} values overflows usize");
        };
        self.arena.borrow_mut().alloc(bytes).cast::<T>()
    }

    unsafe fn deallocate<T>(&self, _ptr: NonNull<T>, _n: usize) {}
}
