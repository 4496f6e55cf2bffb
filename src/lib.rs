//! bucket-chain-map: a hash table of separately chained buckets with
//! power-of-two growth, plus a reader-writer locked wrapper for sharing
//! it between threads.
//!
//! Internal Design:
//!
//! Summary
//! - Layers:
//!   - `hash`: folds a `BuildHasher` output to a 32-bit primitive hash,
//!     mixes its high half into the low half, and masks it to a bucket.
//!   - BucketTable<K, V, S>: the single-threaded engine. Owns the bucket
//!     array and an arena of chain nodes; implements put/get/remove and
//!     the rehash.
//!   - SyncBucketTable<K, V, S>: wraps BucketTable in one
//!     `parking_lot::RwLock`; see `sync_table` for the locking protocol.
//!
//! Storage
//! - Chain nodes live in a `slotmap::SlotMap`. A bucket is an optional
//!   arena key of its head, a node holds the key of its successor. No
//!   node is ever reachable from outside the table.
//! - Each node stores its mixed hash; rehashing never calls `K: Hash`.
//! - The bucket array length is always a power of two. It starts at 16
//!   (configurable via `TableConfig`) and doubles up to `MAX_BUCKETS`.
//!
//! Growth rule
//! - A new key is head-inserted into its chain. Before that, if the
//!   table holds at least `threshold` entries (buckets × load factor,
//!   0.75 by default) and the target bucket is already occupied, the
//!   bucket array is replaced by one twice as long and every node is
//!   re-chained. The new key is then linked into the rebuilt table.
//! - Inserts into empty buckets never trigger growth, so a table may
//!   run past its threshold.
//! - Re-chaining uses head insertion: nodes that share a chain before
//!   and after a rehash come out in reverse order. Chain order is not
//!   part of the contract.
//!
//! Notes and non-goals
//! - No iteration API, persistence, or ordering guarantees.
//! - Keys are immutable post-insert.
//! - `Display` output (`[{k=v, k=v}, {k=v}]`) is for diagnostics only.
//! - Growth is logged through the `log` facade; no logger is installed.

pub mod bucket_table;
#[cfg(test)]
mod bucket_table_proptest;
pub mod config;
pub mod error;
pub mod hash;
pub mod sync_table;

// Public surface
pub use bucket_table::BucketTable;
pub use config::{TableConfig, DEFAULT_BUCKETS, DEFAULT_LOAD_FACTOR, MAX_BUCKETS};
pub use error::TableError;
pub use sync_table::SyncBucketTable;
