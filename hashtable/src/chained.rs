use std::fmt::Display;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::entry::Entry;
use crate::error::{HashTableError, Result};
use crate::linked_list::SinglyLinkedList;
use crate::strategy::{key_encoding, HashKind};

const DEFAULT_CAPACITY: usize = 1000;

/// Hash table resolving collisions by chaining.
///
/// The bucket array is fixed at construction; each bucket is a
/// [`SinglyLinkedList`] allocated on first insertion and kept (possibly
/// empty) until [`clear`](Self::clear). Chains grow without bound, so the
/// capacity is a bucket count rather than an entry limit.
pub struct ChainedHashTable<K, V> {
    buckets: Vec<Option<SinglyLinkedList<Entry<K, V>>>>,
    strategy: HashKind,
    capacity: NonZeroUsize,
    size: usize,
}

impl<K, V> Default for ChainedHashTable<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, HashKind::Division).expect("default capacity is non-zero")
    }
}

impl<K, V> ChainedHashTable<K, V> {
    pub fn new(capacity: usize, strategy: HashKind) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(HashTableError::InvalidCapacity)?;
        Ok(Self {
            buckets: (0..capacity.get()).map(|_| None).collect(),
            strategy,
            capacity,
            size: 0,
        })
    }

    /// Division strategy with the given bucket count.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(capacity, HashKind::Division)
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn strategy(&self) -> HashKind {
        self.strategy
    }

    /// Ratio of stored entries to bucket count. Exceeds 1.0 once chains hold
    /// more entries than there are buckets.
    pub fn fill_factor(&self) -> f64 {
        self.size as f64 / self.capacity.get() as f64
    }

    /// Length of the longest chain; unallocated buckets count as 0.
    pub fn max_chain_length(&self) -> usize {
        self.chain_lengths().max().unwrap_or(0)
    }

    /// Length of the shortest chain; unallocated buckets count as 0.
    pub fn min_chain_length(&self) -> usize {
        self.chain_lengths().min().unwrap_or(0)
    }

    /// Drops every bucket and resets the count.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = None;
        }
        self.size = 0;
    }

    fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets
            .iter()
            .map(|bucket| bucket.as_ref().map_or(0, SinglyLinkedList::len))
    }
}

impl<K, V> ChainedHashTable<K, V>
where
    K: Hash + Eq + Display,
{
    /// Stores a new entry. Rejects empty keys and keys already present.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        if key_encoding(&key).is_empty() {
            return Err(HashTableError::NullKey);
        }
        let idx = self.bucket_index(&key);
        let bucket = self.buckets[idx].get_or_insert_with(SinglyLinkedList::new);
        if bucket.iter().any(|entry| entry.key == key) {
            return Err(HashTableError::DuplicateKey);
        }
        bucket.append(Entry::new(key, value));
        self.size += 1;
        Ok(())
    }

    /// Replaces the value stored under an existing key. When the value
    /// actually changes, the old entry is unlinked and the new pair appended,
    /// so the in-bucket position of the key may move.
    pub fn set_value(&mut self, key: K, value: V) -> Result<()>
    where
        V: PartialEq,
    {
        if key_encoding(&key).is_empty() {
            return Err(HashTableError::NullKey);
        }
        let idx = self.bucket_index(&key);
        let bucket = match &mut self.buckets[idx] {
            Some(bucket) => bucket,
            None => return Err(HashTableError::KeyNotFound),
        };
        let unchanged = match bucket.iter().find(|entry| entry.key == key) {
            Some(entry) => entry.value == value,
            None => return Err(HashTableError::KeyNotFound),
        };
        if !unchanged {
            bucket.remove_where(|entry| entry.key == key);
            bucket.append(Entry::new(key, value));
        }
        Ok(())
    }

    /// Removes the entry stored under `key`. Absence is a normal `false`.
    /// The bucket itself stays allocated.
    pub fn remove(&mut self, key: &K) -> bool {
        let idx = self.bucket_index(key);
        let removed = match &mut self.buckets[idx] {
            Some(bucket) => bucket.remove_where(|entry| entry.key == *key).is_some(),
            None => false,
        };
        if removed {
            self.size -= 1;
        }
        removed
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get_value(key).is_some()
    }

    pub fn get_value(&self, key: &K) -> Option<&V> {
        let idx = self.bucket_index(key);
        self.buckets[idx]
            .as_ref()?
            .iter()
            .find(|entry| entry.key == *key)
            .map(|entry| &entry.value)
    }

    fn bucket_index(&self, key: &K) -> usize {
        self.strategy.index(key, self.capacity)
    }
}
