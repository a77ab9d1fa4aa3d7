//! Consistent hashing ring for deterministic key placement.
//!
//! This crate maps arbitrary keys to named nodes so that adding nodes only
//! reassigns a small fraction of keys. Every node added to a [`Ring`] is
//! replicated into several virtual nodes, each placed on a 32-bit ring at
//! `digest(replica_index ++ node_name)`. A key is owned by the first virtual
//! node at or after `digest(key)`, wrapping around past the largest position.
//!
//! The digest is a pluggable [`Digest`]; the default is IEEE CRC32, so rings
//! built in different processes (or languages) from the same node names agree
//! on placement.
//!
//! ```
//! use chash::Ring;
//!
//! let mut ring = Ring::new();
//! ring.add_nodes(["host1", "host2", "host3"]);
//!
//! let owner = ring.get_node("user:42").expect("ring has nodes");
//! assert!(["host1", "host2", "host3"].contains(&owner));
//! ```
//!
//! [`Ring`] mutates through `&mut self` and queries through `&self`, so the
//! borrow checker enforces "many readers or one writer". [`SharedRing`] wraps a
//! ring in a lock for callers that share one across threads.

mod config;
mod digest;
mod error;
mod ring;
mod shared;

pub use config::RingOptions;
pub use digest::{Blake3, Crc32, Digest, DigestKind, FnDigest, digest_fn};
pub use error::ParseDigestError;
pub use ring::{DEFAULT_REPLICAS, Reassignment, Ring};
pub use shared::SharedRing;
