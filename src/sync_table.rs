//! SyncBucketTable: a `BucketTable` shared between threads.
//!
//! One reader-writer lock guards the whole table. Lookups share the
//! lock. `put` and `remove` scan their chain under an upgradable read,
//! which admits concurrent readers but no other writer, and upgrade to
//! the exclusive lock only to mutate. Because no writer can run between
//! the scan and the upgrade, the scan result stays valid.

use crate::bucket_table::BucketTable;
use crate::config::TableConfig;
use crate::error::Result;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use std::collections::hash_map::RandomState;

pub struct SyncBucketTable<K, V, S = RandomState> {
    table: RwLock<BucketTable<K, V, S>>,
}

impl<K, V> SyncBucketTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::from_table(BucketTable::new())
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        BucketTable::with_config(config).map(Self::from_table)
    }
}

impl<K, V, S> Default for SyncBucketTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::from_table(BucketTable::default())
    }
}

impl<K, V, S> From<BucketTable<K, V, S>> for SyncBucketTable<K, V, S> {
    fn from(table: BucketTable<K, V, S>) -> Self {
        Self::from_table(table)
    }
}

impl<K, V, S> SyncBucketTable<K, V, S> {
    fn from_table(table: BucketTable<K, V, S>) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }

    pub fn into_inner(self) -> BucketTable<K, V, S> {
        self.table.into_inner()
    }
}

impl<K, V, S> SyncBucketTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_table(BucketTable::with_hasher(hasher))
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        BucketTable::with_config_and_hasher(config, hasher).map(Self::from_table)
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.table.read().bucket_count()
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.read().contains_key(q)
    }

    /// Runs `f` on the value mapped to `q` while holding the read lock.
    pub fn with_value<Q, R, F>(&self, q: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.table.read().get(q).map(f)
    }

    pub fn get_cloned<Q>(&self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.with_value(q, V::clone)
    }

    /// See [`BucketTable::put`].
    pub fn put(&self, key: K, value: V) -> Option<V> {
        let guard = self.table.upgradable_read();
        let probe = guard.probe(&key);
        let mut table = RwLockUpgradableReadGuard::upgrade(guard);
        match probe.found {
            Some(pos) => table.replace_value(pos, value),
            None => {
                table.insert_new(probe, key, value);
                None
            }
        }
    }

    /// Unlinks the entry for `q`. A miss never takes the write lock.
    pub fn remove<Q>(&self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let guard = self.table.upgradable_read();
        let probe = guard.probe(q);
        let pos = probe.found?;
        let mut table = RwLockUpgradableReadGuard::upgrade(guard);
        table.unlink(probe.index, pos)
    }

    pub fn clear(&self) {
        self.table.write().clear();
    }
}

impl<K, V, S> fmt::Debug for SyncBucketTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SyncBucketTable")
            .field(&*self.table.read())
            .finish()
    }
}

impl<K, V, S> fmt::Display for SyncBucketTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.table.read(), f)
    }
}
