//! Handle and allocation identifiers.

use std::fmt;

/// A handle referring to at most one allocation.
///
/// Handles are minted by [`BlobArena::handle`](crate::BlobArena::handle) and are
/// never reused, not even across a purge, so a stale handle can only ever
/// address nothing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct HandleId(u64);

impl HandleId {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        HandleId(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleId({})", self.0)
    }
}

/// Identifier of a live allocation.
///
/// Unique among live allocations; recycled LIFO once an allocation has no
/// handles left.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct AllocId(u64);

impl AllocId {
    #[inline]
    pub(crate) const fn new(raw: u64) -> Self {
        AllocId(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for AllocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AllocId({})", self.0)
    }
}
