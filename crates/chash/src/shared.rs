//! A ring shared between threads.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::digest::{Crc32, Digest};
use crate::ring::Ring;

/// Cloneable handle to a [`Ring`] behind a readers-writer lock.
///
/// Lookups take the read lock and run concurrently. [`add_nodes`] takes the
/// write lock, so no lookup ever sees a ring mid re-sort.
///
/// [`add_nodes`]: SharedRing::add_nodes
#[derive(Debug)]
pub struct SharedRing<D = Crc32> {
    inner: Arc<RwLock<Ring<D>>>,
}

impl<D> Clone for SharedRing<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> From<Ring<D>> for SharedRing<D> {
    fn from(ring: Ring<D>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }
}

impl<D: Digest> SharedRing<D> {
    /// Wrap `ring` for sharing.
    pub fn new(ring: Ring<D>) -> Self {
        Self::from(ring)
    }

    /// Add a batch of nodes under the write lock.
    pub fn add_nodes<I>(&self, names: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.inner.write().add_nodes(names);
    }

    /// Return the node that owns `key`, or `None` if the ring is empty.
    pub fn get_node<K: AsRef<[u8]>>(&self, key: K) -> Option<String> {
        self.inner.read().get_node(key).map(str::to_string)
    }

    /// Hold the read lock for a batch of lookups.
    pub fn read(&self) -> RwLockReadGuard<'_, Ring<D>> {
        self.inner.read()
    }

    /// Total number of virtual nodes.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether no node has been added yet.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
