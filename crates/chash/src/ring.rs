//! Consistent hashing ring implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::digest::{Crc32, Digest};

/// Virtual nodes created per added node when no count is configured.
pub const DEFAULT_REPLICAS: usize = 50;

/// One position on the ring and the node that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VirtualNode {
    position: u32,
    owner: Arc<str>,
}

/// A key whose owner differs between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reassignment {
    /// The key that changed hands.
    pub key: String,
    /// Owner in the old ring, `None` if it was empty.
    pub from: Option<String>,
    /// Owner in the new ring, `None` if it is empty.
    pub to: Option<String>,
}

/// Consistent hashing ring over named nodes.
///
/// Each added node gets `replicas` virtual nodes on a `u32` ring, stored as a
/// vector sorted by position. Lookups binary-search for the first virtual
/// node at or after the key's position and wrap to the smallest one when the
/// key hashes past the end.
///
/// Nodes are never removed, and adds are not idempotent: adding the same name
/// twice adds a second set of virtual nodes for it, doubling its vnode count.
/// With a deterministic digest the copies land on the positions the name
/// already holds, so lookups are unchanged.
///
/// Two virtual nodes may hash to the same position. Both are kept; the sort
/// is stable, so the one inserted first sits first and answers lookups, and
/// the later one is shadowed.
#[derive(Debug, Clone)]
pub struct Ring<D = Crc32> {
    /// Virtual nodes, sorted ascending by position.
    vnodes: Vec<VirtualNode>,
    /// Virtual nodes per added node.
    replicas: usize,
    digest: D,
}

impl Ring<Crc32> {
    /// Create an empty CRC32 ring with [`DEFAULT_REPLICAS`] virtual nodes per node.
    pub fn new() -> Self {
        Self::with_digest(DEFAULT_REPLICAS, Crc32)
    }

    /// Create an empty CRC32 ring. A `replicas` of zero selects the default.
    pub fn with_replicas(replicas: usize) -> Self {
        Self::with_digest(replicas, Crc32)
    }
}

impl Default for Ring<Crc32> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest> Ring<D> {
    /// Create an empty ring with a custom digest.
    ///
    /// A `replicas` of zero selects [`DEFAULT_REPLICAS`].
    pub fn with_digest(replicas: usize, digest: D) -> Self {
        let replicas = if replicas == 0 {
            DEFAULT_REPLICAS
        } else {
            replicas
        };
        Self {
            vnodes: Vec::new(),
            replicas,
            digest,
        }
    }

    /// Virtual nodes created per added node.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// The digest used for placement and lookup.
    pub fn digest(&self) -> &D {
        &self.digest
    }

    /// Add a batch of nodes.
    ///
    /// Node `name` gets virtual nodes at `digest(i ++ name)` for every replica
    /// index `i`, written in decimal. The whole ring is re-sorted once per
    /// batch. An empty batch leaves the ring untouched.
    pub fn add_nodes<I>(&mut self, names: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let names = names.into_iter();
        self.vnodes
            .reserve(names.size_hint().0.saturating_mul(self.replicas));

        let mut added = 0usize;
        for name in names {
            let name = name.as_ref();
            let owner: Arc<str> = Arc::from(name);
            for i in 0..self.replicas {
                let position = self.digest.digest(replica_key(i, name).as_bytes());
                self.vnodes.push(VirtualNode {
                    position,
                    owner: Arc::clone(&owner),
                });
            }
            added += 1;
        }

        if added == 0 {
            return;
        }

        // Stable, so colliding positions stay in insertion order.
        self.vnodes.sort_by_key(|v| v.position);
        debug!(added, vnodes = self.vnodes.len(), "added nodes to ring");
    }

    /// Return the node that owns `key`, or `None` if the ring is empty.
    pub fn get_node<K: AsRef<[u8]>>(&self, key: K) -> Option<&str> {
        if self.vnodes.is_empty() {
            return None;
        }
        self.owner_at(self.digest.digest(key.as_ref()))
    }

    /// Return the owner of the first virtual node at or after `position`,
    /// wrapping to the start of the ring.
    pub fn owner_at(&self, position: u32) -> Option<&str> {
        let index = self.vnodes.partition_point(|v| v.position < position);
        self.vnodes
            .get(index)
            .or_else(|| self.vnodes.first())
            .map(|v| &*v.owner)
    }

    /// Count how many of `keys` each node owns.
    ///
    /// Nodes that own none of the keys are absent from the result.
    pub fn distribution<I>(&self, keys: I) -> BTreeMap<&str, usize>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut counts = BTreeMap::new();
        for key in keys {
            if let Some(owner) = self.get_node(key) {
                *counts.entry(owner).or_insert(0) += 1;
            }
        }
        counts
    }

    /// List the keys whose owner differs between `old` and `new`.
    pub fn diff<I>(old: &Ring<D>, new: &Ring<D>, keys: I) -> Vec<Reassignment>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut moves = Vec::new();
        for key in keys {
            let key = key.as_ref();
            let from = old.get_node(key);
            let to = new.get_node(key);
            if from != to {
                moves.push(Reassignment {
                    key: key.to_string(),
                    from: from.map(str::to_string),
                    to: to.map(str::to_string),
                });
            }
        }
        moves
    }
}

impl<D> Ring<D> {
    /// Total number of virtual nodes.
    pub fn len(&self) -> usize {
        self.vnodes.len()
    }

    /// Whether no node has been added yet.
    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// Number of distinct node names.
    pub fn node_count(&self) -> usize {
        self.nodes().len()
    }

    /// Distinct node names, sorted.
    pub fn nodes(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self.vnodes.iter().map(|v| &*v.owner).collect();
        names.into_iter().collect()
    }

    /// Virtual nodes as `(position, owner)` in ring order.
    pub fn vnodes(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.vnodes.iter().map(|v| (v.position, &*v.owner))
    }
}

/// Digest input for replica `index` of node `name`.
fn replica_key(index: usize, name: &str) -> String {
    format!("{index}{name}")
}
