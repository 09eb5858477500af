//! Shared arena ownership and the RAII blob handle.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::{ArenaError, BlobArena, HandleId};

/// Single-threaded shared owner of a [`BlobArena`].
///
/// A document root owns one of these; every [`Blob`] allocated from it keeps
/// a clone so handles can release their bytes on drop. A blob dropped while
/// the table is borrowed queues its handle, and the queue is drained on the
/// next access.
#[derive(Clone)]
pub struct SharedArena {
    table: Rc<RefCell<BlobArena>>,
    deferred: Rc<RefCell<Vec<HandleId>>>,
}

impl SharedArena {
    /// Create an arena bounded by `quota` live bytes.
    pub fn new(quota: usize) -> Self {
        SharedArena {
            table: Rc::new(RefCell::new(BlobArena::new(quota))),
            deferred: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Mutable access to the table, after releasing queued handles.
    fn table_mut(&self) -> RefMut<'_, BlobArena> {
        let mut table = self.table.borrow_mut();
        self.release_deferred(&mut table);
        table
    }

    fn release_deferred(&self, table: &mut BlobArena) {
        let Ok(mut deferred) = self.deferred.try_borrow_mut() else {
            return;
        };
        for handle in deferred.drain(..) {
            table.free(handle);
        }
    }

    /// Release queued handles if the table is free to borrow.
    fn settle(&self) {
        if let Ok(mut table) = self.table.try_borrow_mut() {
            self.release_deferred(&mut table);
        }
    }

    /// Copy `bytes` into a new allocation owned by a fresh blob.
    pub fn alloc(&self, bytes: &[u8]) -> Result<Blob, ArenaError> {
        let mut arena = self.table_mut();
        let handle = arena.handle();
        arena.set(handle, bytes)?;
        Ok(Blob {
            arena: self.clone(),
            handle,
        })
    }

    /// Copy `text` into a new allocation.
    #[inline]
    pub fn alloc_str(&self, text: &str) -> Result<Blob, ArenaError> {
        self.alloc(text.as_bytes())
    }

    pub fn used(&self) -> usize {
        self.settle();
        self.table.borrow().used()
    }

    #[inline]
    pub fn quota(&self) -> usize {
        self.table.borrow().quota()
    }

    pub fn live_allocations(&self) -> usize {
        self.settle();
        self.table.borrow().live_allocations()
    }

    /// Release everything. Blobs still alive afterwards read as empty.
    pub fn purge(&self) {
        self.table_mut().purge();
    }

    /// Run `f` with direct access to the underlying table.
    pub fn with<R>(&self, f: impl FnOnce(&mut BlobArena) -> R) -> R {
        f(&mut self.table_mut())
    }

    /// Whether two handles point at the same arena.
    #[inline]
    pub fn ptr_eq(&self, other: &SharedArena) -> bool {
        Rc::ptr_eq(&self.table, &other.table)
    }

    /// Free `handle` now, or queue it if the table is borrowed.
    fn release(&self, handle: HandleId) {
        if let Ok(mut table) = self.table.try_borrow_mut() {
            table.free(handle);
            return;
        }
        tracing::debug!(?handle, "arena busy, deferring blob release");
        if let Ok(mut deferred) = self.deferred.try_borrow_mut() {
            deferred.push(handle);
        }
    }
}

impl fmt::Debug for SharedArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table.try_borrow() {
            Ok(arena) => f
                .debug_struct("SharedArena")
                .field("used", &arena.used())
                .field("quota", &arena.quota())
                .finish(),
            Err(_) => f.write_str("SharedArena(<borrowed>)"),
        }
    }
}

/// Copy-on-write handle to arena bytes.
///
/// `Clone` aliases the allocation ([`BlobArena::duplicate`]), `Drop` releases
/// this handle ([`BlobArena::free`]), and [`Blob::set`] writes into fresh
/// storage so no alias ever observes the change.
pub struct Blob {
    arena: SharedArena,
    handle: HandleId,
}

impl Blob {
    /// Run `f` over the bytes, or `None` if the blob owns nothing (after a purge).
    ///
    /// `f` must not clone blobs of the same arena.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let arena = self.arena.table.borrow();
        arena.get(self.handle).map(f)
    }

    /// Owned copy of the bytes.
    pub fn to_vec(&self) -> Option<Vec<u8>> {
        self.with_bytes(<[u8]>::to_vec)
    }

    /// Bytes as text, replacing invalid UTF-8.
    pub fn text(&self) -> Option<String> {
        self.with_bytes(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// Replace this blob's bytes without affecting any alias.
    pub fn set(&mut self, bytes: &[u8]) -> Result<(), ArenaError> {
        self.arena.table_mut().set(self.handle, bytes)
    }

    #[inline]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    #[inline]
    pub fn arena(&self) -> &SharedArena {
        &self.arena
    }

    /// Whether both blobs alias one allocation.
    pub fn shares_storage(&self, other: &Blob) -> bool {
        if !self.arena.ptr_eq(&other.arena) {
            return false;
        }
        let arena = self.arena.table.borrow();
        match (arena.allocation_of(self.handle), arena.allocation_of(other.handle)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Clone for Blob {
    fn clone(&self) -> Self {
        let handle = self.arena.table_mut().duplicate(self.handle);
        Blob {
            arena: self.arena.clone(),
            handle,
        }
    }
}

impl Drop for Blob {
    fn drop(&mut self) {
        self.arena.release(self.handle);
    }
}

impl PartialEq for Blob {
    fn eq(&self, other: &Blob) -> bool {
        self.to_vec() == other.to_vec()
    }
}

impl Eq for Blob {}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => write!(f, "Blob({text:?})"),
            None => f.write_str("Blob(<empty>)"),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap/expect for clarity"
)]
mod tests;
