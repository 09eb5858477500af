//! The raw handle-based blob table.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{AllocId, ArenaError, HandleId};

/// Quota-bounded, copy-on-write byte store.
///
/// # Index Spaces
///
/// - `allocations`: live allocation bytes by [`AllocId`]
/// - `holders`: reverse index, the live handles of each allocation
/// - `owners`: the allocation each handle currently refers to
///
/// Invariants: `used` is the sum of live allocation lengths and never exceeds
/// `quota`; every allocation in `allocations` has a non-empty holder set.
#[derive(Debug)]
pub struct BlobArena {
    allocations: FxHashMap<AllocId, Box<[u8]>>,
    holders: FxHashMap<AllocId, FxHashSet<HandleId>>,
    owners: FxHashMap<HandleId, AllocId>,
    /// Released ids, reused most-recent first.
    free_ids: Vec<AllocId>,
    next_id: u64,
    next_handle: u64,
    used: usize,
    quota: usize,
}

impl BlobArena {
    /// Create an empty arena that will hold at most `quota` live bytes.
    pub fn new(quota: usize) -> Self {
        BlobArena {
            allocations: FxHashMap::default(),
            holders: FxHashMap::default(),
            owners: FxHashMap::default(),
            free_ids: Vec::new(),
            next_id: 0,
            next_handle: 0,
            used: 0,
            quota,
        }
    }

    /// Mint a fresh handle that owns nothing.
    pub fn handle(&mut self) -> HandleId {
        let handle = HandleId::new(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Store a private copy of `bytes` under `handle`.
    ///
    /// The quota is checked against current usage before anything is touched,
    /// so a rejected write leaves the handle, its old bytes and `used` intact.
    /// On success the handle's previous allocation is released first (other
    /// aliases keep it alive) and the handle becomes the sole owner of new
    /// storage.
    pub fn set(&mut self, handle: HandleId, bytes: &[u8]) -> Result<(), ArenaError> {
        let len = bytes.len();
        if self.used.checked_add(len).map_or(true, |total| total > self.quota) {
            tracing::debug!(requested = len, used = self.used, quota = self.quota, "blob quota exceeded");
            return Err(ArenaError::QuotaExceeded {
                requested: len,
                used: self.used,
                quota: self.quota,
            });
        }

        self.free(handle);

        let id = self.free_ids.pop().unwrap_or_else(|| {
            let id = AllocId::new(self.next_id);
            self.next_id += 1;
            id
        });
        self.allocations.insert(id, Box::from(bytes));
        let mut holders = FxHashSet::default();
        holders.insert(handle);
        self.holders.insert(id, holders);
        self.owners.insert(handle, id);
        self.used += len;
        Ok(())
    }

    /// Bytes owned by `handle`, or `None` if it owns nothing.
    pub fn get(&self, handle: HandleId) -> Option<&[u8]> {
        let id = self.owners.get(&handle)?;
        self.allocations.get(id).map(AsRef::as_ref)
    }

    /// Mint a new handle aliasing `handle`'s allocation at no byte cost.
    ///
    /// If `handle` owns nothing, the new handle owns nothing either.
    pub fn duplicate(&mut self, handle: HandleId) -> HandleId {
        let alias = self.handle();
        if let Some(&id) = self.owners.get(&handle) {
            self.owners.insert(alias, id);
            if let Some(holders) = self.holders.get_mut(&id) {
                holders.insert(alias);
            }
        }
        alias
    }

    /// Detach `handle` from its allocation, releasing the allocation once no
    /// handle refers to it. Freeing a handle that owns nothing is a no-op.
    pub fn free(&mut self, handle: HandleId) {
        let Some(id) = self.owners.remove(&handle) else {
            return;
        };
        let now_empty = match self.holders.get_mut(&id) {
            Some(holders) => {
                holders.remove(&handle);
                holders.is_empty()
            }
            None => true,
        };
        if now_empty {
            self.holders.remove(&id);
            if let Some(bytes) = self.allocations.remove(&id) {
                self.used -= bytes.len();
            }
            self.free_ids.push(id);
        }
    }

    /// Drop every allocation and handle association.
    ///
    /// The handle counter keeps counting so handles minted before the purge
    /// can never alias ones minted after it.
    pub fn purge(&mut self) {
        self.allocations.clear();
        self.holders.clear();
        self.owners.clear();
        self.free_ids.clear();
        self.next_id = 0;
        self.used = 0;
    }

    /// Live bytes currently charged against the quota.
    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Number of live allocations.
    #[inline]
    pub fn live_allocations(&self) -> usize {
        self.allocations.len()
    }

    /// Allocation currently referenced by `handle`.
    #[inline]
    pub fn allocation_of(&self, handle: HandleId) -> Option<AllocId> {
        self.owners.get(&handle).copied()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
