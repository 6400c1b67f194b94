//! Region-chained bump allocation with snapshot/rewind scoped deallocation.
//!
//! An [`Arena`] carves allocations out of fixed-capacity regions by bumping
//! a cursor, growing a chain of regions on demand. Nothing is freed
//! per-object: scoped work captures a [`Snapshot`] and rewinds to it,
//! reclaiming everything allocated since in O(1) with no backend calls.
//!
//! # Architecture
//!
//! ```text
//! Arena<B: Backend>
//! ├── Region chain (SmallVec, oldest first, exclusively owned)
//! │   └── Region: word storage + bump cursor + creation stamp
//! ├── current: index of the region receiving allocations
//! └── ArenaStats: regions created, oversized allocations
//!
//! Backend (fixed at construction)
//! ├── HeapBackend: global allocator
//! └── VirtualBackend: OS pages (mmap / VirtualAlloc)
//!
//! ArenaAllocator<'_, B>: Copy handle implementing RawAlloc
//! └── lets generic containers draw storage from a shared arena
//! ```
//!
//! # Granularity and failure
//!
//! All sizes round up to machine words; pointers are word-aligned and
//! nothing stronger. Backend exhaustion is fatal on the plain entry points
//! and an [`ArenaError`] on the `try_*` ones; there is no retry path.
//!
//! # Ownership
//!
//! The arena is single-owner and unsynchronized; it is `!Send` and `!Sync`.
//! Snapshots are non-owning cursor captures: using one after [`Arena::trim`]
//! or [`Arena::release`] removed its region is detected and panics.
//!
//! This crate contains bounded `unsafe`: raw region storage, the OS
//! backends, and the pointer arithmetic of the bump path.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod adapter;
pub mod arena;
pub mod backend;
pub mod config;
pub mod error;
mod region;
pub mod snapshot;

// Public re-exports for the primary API surface.
pub use adapter::{ArenaAllocator, RawAlloc};
pub use arena::{Arena, ArenaStats};
pub use backend::{Backend, HeapBackend, WORD_BYTES};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use snapshot::Snapshot;

#[cfg(any(unix, windows))]
pub use backend::VirtualBackend;
