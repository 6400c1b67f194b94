//! Cursor captures for O(1) rewind.

/// A saved allocation cursor: which region was current at capture time and
/// how much of it was used.
///
/// Snapshots are `Copy`, allocation-free, and hold no ownership of the
/// arena or its regions. Capturing on an empty arena records a "no region"
/// mark; rewinding to such a snapshot is equivalent to
/// [`Arena::reset`](crate::Arena::reset).
///
/// A snapshot stays valid as long as its region stays in the chain. Once
/// [`Arena::trim`](crate::Arena::trim) or
/// [`Arena::release`](crate::Arena::release) removes that region, the
/// snapshot is stale and rewinding to it panics. Snapshots must only be
/// passed back to the arena that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// The region that was current at capture time, or `None` when the
    /// arena had no regions yet.
    pub(crate) mark: Option<RegionMark>,
    /// Words used in the marked region at capture time.
    pub(crate) count: usize,
}

/// Position of a region in the chain plus its creation stamp.
///
/// The stamp lets rewind distinguish "the same region, still in place"
/// from "a different region that now occupies this index" after a trim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RegionMark {
    pub(crate) index: usize,
    pub(crate) id: u64,
}
