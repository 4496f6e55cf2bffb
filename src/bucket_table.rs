//! BucketTable: single-threaded chained-bucket engine.
//!
//! Entries live in a slot-map arena; each bucket holds the arena key of
//! its chain head and every entry holds the key of its successor. Removal
//! and rehashing only rewrite keys, never move entries.

use crate::config::{
    threshold_for, TableConfig, DEFAULT_BUCKETS, DEFAULT_LOAD_FACTOR, MAX_BUCKETS,
};
use crate::error::Result;
use crate::hash::{fold, index_for, mix};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::mem;
use slotmap::{new_key_type, SlotMap};
use std::collections::hash_map::RandomState;

new_key_type! {
    /// Arena key of a chain node.
    pub(crate) struct EntryKey;
}

#[derive(Debug)]
struct Entry<K, V> {
    hash: u32,
    key: K,
    value: V,
    next: Option<EntryKey>,
}

/// Location of a matching entry: the node and its predecessor in the
/// chain (`None` when the node is the head).
#[derive(Debug, Clone, Copy)]
pub(crate) struct Position {
    prev: Option<EntryKey>,
    node: EntryKey,
}

/// Outcome of scanning a key's chain. Only valid until the table is next
/// mutated.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Probe {
    pub(crate) hash: u32,
    pub(crate) index: usize,
    pub(crate) found: Option<Position>,
}

pub struct BucketTable<K, V, S = RandomState> {
    hasher: S,
    buckets: Box<[Option<EntryKey>]>,
    entries: SlotMap<EntryKey, Entry<K, V>>,
    size: usize,
    threshold: usize,
    load_factor: f32,
}

fn empty_buckets(count: usize) -> Box<[Option<EntryKey>]> {
    vec![None; count].into_boxed_slice()
}

impl<K, V> BucketTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V, S> Default for BucketTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> BucketTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::from_parts(DEFAULT_BUCKETS, DEFAULT_LOAD_FACTOR, hasher)
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        let buckets = config.validate()?;
        Ok(Self::from_parts(buckets, config.load_factor(), hasher))
    }

    fn from_parts(buckets: usize, load_factor: f32, hasher: S) -> Self {
        let threshold = threshold_for(buckets, load_factor);
        log::trace!("new bucket table: {buckets} buckets, threshold {threshold}");
        Self {
            hasher,
            buckets: empty_buckets(buckets),
            entries: SlotMap::with_key(),
            size: 0,
            threshold,
            load_factor,
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        mix(fold(self.hasher.hash_one(q)))
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Alias of [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Length of the bucket array; always a power of two.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entry count at which an insert into an occupied bucket grows the table.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Walks the chain `q` hashes to, looking for an entry whose mixed
    /// hash and key both match.
    pub(crate) fn probe<Q>(&self, q: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let index = index_for(hash, self.buckets.len());
        let mut prev = None;
        let mut cursor = self.buckets[index];
        while let Some(node) = cursor {
            let e = &self.entries[node];
            if e.hash == hash && e.key.borrow() == q {
                return Probe {
                    hash,
                    index,
                    found: Some(Position { prev, node }),
                };
            }
            prev = Some(node);
            cursor = e.next;
        }
        Probe {
            hash,
            index,
            found: None,
        }
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.probe(q).found?;
        self.entries.get(pos.node).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let pos = self.probe(q).found?;
        self.entries.get_mut(pos.node).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.probe(q).found.is_some()
    }

    /// Maps `key` to `value`. An existing entry for `key` is updated in
    /// place and its previous value returned; otherwise a new entry is
    /// linked, growing the table first if it is at threshold and the
    /// target bucket is occupied.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let probe = self.probe(&key);
        match probe.found {
            Some(pos) => self.replace_value(pos, value),
            None => {
                self.insert_new(probe, key, value);
                None
            }
        }
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let probe = self.probe(q);
        let pos = probe.found?;
        self.unlink(probe.index, pos)
    }

    /// Drops every entry, keeping the current bucket count.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buckets.fill(None);
        self.size = 0;
    }

    pub(crate) fn replace_value(&mut self, pos: Position, value: V) -> Option<V> {
        self.entries
            .get_mut(pos.node)
            .map(|e| mem::replace(&mut e.value, value))
    }

    /// Allocates an entry for a key `probe` did not find and links it.
    pub(crate) fn insert_new(&mut self, probe: Probe, key: K, value: V) {
        debug_assert!(probe.found.is_none());
        let node = self.entries.insert(Entry {
            hash: probe.hash,
            key,
            value,
            next: None,
        });
        self.link_or_grow(node, probe.index);
    }

    pub(crate) fn unlink(&mut self, index: usize, pos: Position) -> Option<V> {
        let entry = self.entries.remove(pos.node)?;
        match pos.prev {
            None => self.buckets[index] = entry.next,
            Some(prev) => self.entries[prev].next = entry.next,
        }
        self.size -= 1;
        Some(entry.value)
    }

    // Growth is only considered when the new entry would collide: a table
    // past threshold keeps filling empty buckets without rehashing.
    fn link_or_grow(&mut self, node: EntryKey, mut index: usize) {
        if self.size >= self.threshold && self.buckets[index].is_some() && self.grow() {
            index = index_for(self.entries[node].hash, self.buckets.len());
        }
        self.link_head(node, index);
        self.size += 1;
    }

    fn link_head(&mut self, node: EntryKey, index: usize) {
        self.entries[node].next = self.buckets[index];
        self.buckets[index] = Some(node);
    }

    /// Replaces the bucket array with one twice as long and re-chains every
    /// linked entry by head insertion, so entries that stay together end up
    /// in reverse order. Returns `false` when already at `MAX_BUCKETS`.
    fn grow(&mut self) -> bool {
        let old_count = self.buckets.len();
        if old_count >= MAX_BUCKETS {
            log::warn!("bucket table at maximum of {MAX_BUCKETS} buckets; not growing");
            self.threshold = usize::MAX;
            return false;
        }
        let new_count = old_count * 2;
        let old = mem::replace(&mut self.buckets, empty_buckets(new_count));
        self.size = 0;
        for &head in old.iter() {
            let mut cursor = head;
            while let Some(node) = cursor {
                let entry = &mut self.entries[node];
                cursor = entry.next;
                let i = index_for(entry.hash, new_count);
                entry.next = self.buckets[i];
                self.buckets[i] = Some(node);
                self.size += 1;
            }
        }
        self.threshold = threshold_for(new_count, self.load_factor);
        log::debug!(
            "grew bucket table from {old_count} to {new_count} buckets, re-chained {} entries",
            self.size
        );
        true
    }

    #[cfg(test)]
    pub(crate) fn chain(&self, index: usize) -> Vec<&K> {
        let mut out = Vec::new();
        let mut cursor = self.buckets[index];
        while let Some(node) = cursor {
            out.push(&self.entries[node].key);
            cursor = self.entries[node].next;
        }
        out
    }

    /// Panics unless every entry sits on the chain its hash selects and
    /// `size` matches both the arena and the reachable node count.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let count = self.buckets.len();
        assert!(count.is_power_of_two());
        let mut reachable = 0;
        for (i, &head) in self.buckets.iter().enumerate() {
            let mut cursor = head;
            while let Some(node) = cursor {
                let e = &self.entries[node];
                assert_eq!(index_for(e.hash, count), i, "entry on the wrong chain");
                reachable += 1;
                cursor = e.next;
            }
        }
        assert_eq!(reachable, self.size);
        assert_eq!(self.entries.len(), self.size);
    }
}

impl<K, V, S> fmt::Debug for BucketTable<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketTable")
            .field("size", &self.size)
            .field("bucket_count", &self.buckets.len())
            .field("threshold", &self.threshold)
            .finish()
    }
}

/// Renders occupied buckets as `[{k=v, k=v}, {k=v}]`, chains in chain
/// order. Diagnostic output only.
impl<K, V, S> fmt::Display for BucketTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (n, &head) in self.buckets.iter().flatten().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            f.write_str("{")?;
            let mut cursor = Some(head);
            let mut first = true;
            while let Some(node) = cursor {
                let e = &self.entries[node];
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{}={}", e.key, e.value)?;
                first = false;
                cursor = e.next;
            }
            f.write_str("}")?;
        }
        f.write_str("]")
    }
}
