use std::fmt::Display;
use std::hash::Hash;
use std::num::NonZeroUsize;

use crate::entry::Entry;
use crate::error::{HashTableError, Result};
use crate::strategy::{key_encoding, HashKind};

const DEFAULT_CAPACITY: usize = 1000;

/// Probe-sequence families for the open-addressing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbingKind {
    Linear,
    Quadratic,
    Double,
}

impl ProbingKind {
    /// Catalog of every probing family, in selection order.
    pub const ALL: [ProbingKind; 3] = [
        ProbingKind::Linear,
        ProbingKind::Quadratic,
        ProbingKind::Double,
    ];

    /// Display label for reporting.
    pub fn name(self) -> &'static str {
        match self {
            ProbingKind::Linear => "linear",
            ProbingKind::Quadratic => "quadratic",
            ProbingKind::Double => "double",
        }
    }
}

/// One cell of the slot array.
///
/// A tombstone is left behind by removal and never reverts to `Empty`:
/// probe walks for other keys that once passed through the slot must still
/// run on to the next truly-empty cell.
enum Slot<K, V> {
    Empty,
    Occupied(Entry<K, V>),
    Tombstone,
}

impl<K, V> Slot<K, V> {
    fn is_occupied(&self) -> bool {
        matches!(self, Slot::Occupied(_))
    }
}

/// Hash table resolving collisions by open addressing.
///
/// All entries live in a single flat slot array sized at construction.
/// Linear and quadratic probing use one strategy; double hashing derives its
/// step from a second strategy (Multiplication unless another is supplied).
/// Capacity is a hard ceiling: there is no resizing, callers pre-size.
pub struct OpenAddressingHashTable<K, V> {
    slots: Vec<Slot<K, V>>,
    probing: ProbingKind,
    primary: HashKind,
    secondary: HashKind,
    capacity: NonZeroUsize,
    size: usize,
}

impl<K, V> Default for OpenAddressingHashTable<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, ProbingKind::Linear, HashKind::Division)
            .expect("default capacity is non-zero")
    }
}

impl<K, V> OpenAddressingHashTable<K, V> {
    /// Step strategy defaults to Multiplication.
    pub fn new(capacity: usize, probing: ProbingKind, primary: HashKind) -> Result<Self> {
        Self::with_strategies(capacity, probing, primary, HashKind::Multiplication)
    }

    pub fn with_strategies(
        capacity: usize,
        probing: ProbingKind,
        primary: HashKind,
        secondary: HashKind,
    ) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or(HashTableError::InvalidCapacity)?;
        Ok(Self {
            slots: std::iter::repeat_with(|| Slot::Empty)
                .take(capacity.get())
                .collect(),
            probing,
            primary,
            secondary,
            capacity,
            size: 0,
        })
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn probing(&self) -> ProbingKind {
        self.probing
    }

    /// Ratio of occupied slots to capacity.
    pub fn fill_factor(&self) -> f64 {
        self.size as f64 / self.capacity.get() as f64
    }

    /// Longest run of contiguous occupied slots in physical array order.
    /// Tombstoned and empty slots both break a run.
    pub fn max_cluster_length(&self) -> usize {
        let mut max = 0;
        let mut run = 0;
        for slot in &self.slots {
            if slot.is_occupied() {
                run += 1;
                max = max.max(run);
            } else {
                run = 0;
            }
        }
        max
    }

    /// Resets every slot to empty and the count to 0.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = Slot::Empty;
        }
        self.size = 0;
    }
}

impl<K, V> OpenAddressingHashTable<K, V>
where
    K: Hash + Eq + Display,
{
    /// Stores a new entry. Rejects empty keys, a table with no open slot,
    /// and keys already present, in that order.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        if key_encoding(&key).is_empty() {
            return Err(HashTableError::NullKey);
        }
        // Full linear scan, independent of probe reachability.
        if self.slots.iter().all(Slot::is_occupied) {
            return Err(HashTableError::TableFull);
        }
        if self
            .slots
            .iter()
            .any(|slot| matches!(slot, Slot::Occupied(entry) if entry.key == key))
        {
            return Err(HashTableError::DuplicateKey);
        }

        let (home, step) = self.probe_params(&key);
        let mut target = None;
        for attempt in 0..self.capacity.get() {
            let idx = self.probe_slot(home, step, attempt);
            match &self.slots[idx] {
                Slot::Occupied(entry) if entry.key != key => continue,
                _ => {
                    target = Some(idx);
                    break;
                }
            }
        }
        match target {
            Some(idx) => {
                // Overwrites any tombstone left in the slot.
                self.slots[idx] = Slot::Occupied(Entry::new(key, value));
                self.size += 1;
                Ok(())
            }
            // Open slots exist but none lies on this key's probe sequence
            // (quadratic and double sequences need not cover the table).
            None => Err(HashTableError::TableFull),
        }
    }

    pub fn get_value(&self, key: &K) -> Option<&V> {
        let idx = self.find_slot(key)?;
        match &self.slots[idx] {
            Slot::Occupied(entry) => Some(&entry.value),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find_slot(key).is_some()
    }

    /// Tombstones the slot holding `key`. Absence is a normal `false`.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.find_slot(key) {
            Some(idx) => {
                self.slots[idx] = Slot::Tombstone;
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Walks the probe sequence for `key`, through occupied non-matching and
    /// tombstoned slots, until a match or a truly-empty slot. The walk is
    /// bounded: every probe family revisits its slot set with a period of at
    /// most `capacity` attempts.
    fn find_slot(&self, key: &K) -> Option<usize> {
        let (home, step) = self.probe_params(key);
        for attempt in 0..self.capacity.get() {
            let idx = self.probe_slot(home, step, attempt);
            match &self.slots[idx] {
                Slot::Empty => return None,
                Slot::Occupied(entry) if entry.key == *key => return Some(idx),
                _ => {}
            }
        }
        None
    }

    fn probe_params(&self, key: &K) -> (usize, usize) {
        let home = self.primary.index(key, self.capacity);
        let step = match self.probing {
            // A zero step would never advance past the home slot.
            ProbingKind::Double => match self.secondary.index(key, self.capacity) {
                0 => 1,
                step => step,
            },
            _ => 0,
        };
        (home, step)
    }

    fn probe_slot(&self, home: usize, step: usize, attempt: usize) -> usize {
        let capacity = self.capacity.get();
        match self.probing {
            ProbingKind::Linear => (home + attempt) % capacity,
            ProbingKind::Quadratic => (home + attempt * attempt) % capacity,
            ProbingKind::Double => (home + attempt * step) % capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn linear(capacity: usize) -> OpenAddressingHashTable<String, u32> {
        OpenAddressingHashTable::new(capacity, ProbingKind::Linear, HashKind::Division).unwrap()
    }

    #[test]
    fn rejects_zero_capacity() {
        let table =
            OpenAddressingHashTable::<String, u32>::new(0, ProbingKind::Linear, HashKind::Division);
        assert_eq!(table.err(), Some(HashTableError::InvalidCapacity));
    }

    #[test]
    fn rejects_empty_key() {
        let mut table = linear(8);
        assert_eq!(table.add(String::new(), 1), Err(HashTableError::NullKey));
        assert!(table.is_empty());
    }

    #[test]
    fn add_then_get_round_trips() {
        let mut table = linear(97);
        for i in 0..20u32 {
            table.add(format!("key-{i}"), i).unwrap();
        }
        assert_eq!(table.len(), 20);
        for i in 0..20u32 {
            assert_eq!(table.get_value(&format!("key-{i}")), Some(&i));
            assert!(table.contains_key(&format!("key-{i}")));
        }
        assert_eq!(table.get_value(&"missing".to_string()), None);
    }

    #[test]
    fn duplicate_add_leaves_table_unchanged() {
        let mut table = linear(8);
        table.add("key".to_string(), 1).unwrap();
        assert_eq!(
            table.add("key".to_string(), 2),
            Err(HashTableError::DuplicateKey)
        );
        assert_eq!(table.get_value(&"key".to_string()), Some(&1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn filling_to_capacity_then_overflowing_reports_table_full() {
        let mut table = linear(4);
        for i in 0..4u32 {
            table.add(format!("k{i}"), i).unwrap();
        }
        assert_eq!(table.len(), 4);
        assert_eq!(table.fill_factor(), 1.0);
        assert_eq!(table.max_cluster_length(), 4);

        assert_eq!(
            table.add("overflow".to_string(), 9),
            Err(HashTableError::TableFull)
        );
        // The open-space check runs before the duplicate check.
        assert_eq!(
            table.add("k0".to_string(), 9),
            Err(HashTableError::TableFull)
        );
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn tombstone_keeps_later_cluster_members_reachable() {
        // Two slots: the second insertion lands in whichever slot the first
        // one left open, so the pair always forms one cluster.
        let mut table = linear(2);
        table.add("first".to_string(), 1).unwrap();
        table.add("second".to_string(), 2).unwrap();

        assert!(table.remove(&"first".to_string()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_value(&"first".to_string()), None);
        // The probe for the survivor must run through the tombstone.
        assert_eq!(table.get_value(&"second".to_string()), Some(&2));
    }

    #[test]
    fn insertion_reuses_tombstoned_slots() {
        let mut table = linear(2);
        table.add("first".to_string(), 1).unwrap();
        table.add("second".to_string(), 2).unwrap();
        assert!(table.remove(&"first".to_string()));

        table.add("third".to_string(), 3).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_value(&"second".to_string()), Some(&2));
        assert_eq!(table.get_value(&"third".to_string()), Some(&3));
    }

    #[test]
    fn lookup_for_absent_keys_terminates_below_capacity() {
        let mut table = linear(8);
        for i in 0..3u32 {
            table.add(format!("k{i}"), i).unwrap();
        }
        assert!(table.remove(&"k1".to_string()));

        assert_eq!(table.get_value(&"absent".to_string()), None);
        assert!(!table.contains_key(&"absent".to_string()));
        assert!(!table.remove(&"absent".to_string()));
    }

    #[test]
    fn lookup_terminates_even_with_no_empty_slot_left() {
        // Fill completely, then tombstone one slot: no slot is ever Empty
        // again, so the bounded walk is what stops an absent-key probe.
        let mut table = linear(4);
        for i in 0..4u32 {
            table.add(format!("k{i}"), i).unwrap();
        }
        assert!(table.remove(&"k2".to_string()));
        assert_eq!(table.get_value(&"absent".to_string()), None);
    }

    #[test]
    fn cluster_length_tracks_occupancy_runs() {
        let mut table = linear(1);
        assert_eq!(table.max_cluster_length(), 0);
        table.add("only".to_string(), 1).unwrap();
        assert_eq!(table.max_cluster_length(), 1);
        assert!(table.remove(&"only".to_string()));
        // A tombstone breaks the run just like an empty slot.
        assert_eq!(table.max_cluster_length(), 0);
    }

    #[test]
    fn removing_from_a_full_table_splits_the_cluster() {
        let mut table = linear(4);
        for i in 0..4u32 {
            table.add(format!("k{i}"), i).unwrap();
        }
        assert!(table.remove(&"k1".to_string()));
        let cluster = table.max_cluster_length();
        assert!((2..=3).contains(&cluster), "cluster was {cluster}");
    }

    #[test]
    fn clear_resets_slots_and_count() {
        let mut table = linear(8);
        table.add("a".to_string(), 1).unwrap();
        table.add("b".to_string(), 2).unwrap();
        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.get_value(&"a".to_string()), None);
        assert_eq!(table.max_cluster_length(), 0);

        table.add("a".to_string(), 3).unwrap();
        assert_eq!(table.get_value(&"a".to_string()), Some(&3));
    }

    #[test]
    fn quadratic_probing_supports_the_same_operations() {
        let mut table =
            OpenAddressingHashTable::new(11, ProbingKind::Quadratic, HashKind::Division).unwrap();
        for i in 0..5u32 {
            table.add(format!("k{i}"), i).unwrap();
        }
        assert!(table.remove(&"k3".to_string()));
        for i in [0u32, 1, 2, 4] {
            assert_eq!(table.get_value(&format!("k{i}")), Some(&i));
        }
        assert_eq!(table.get_value(&"k3".to_string()), None);
    }

    #[test]
    fn double_hashing_supports_the_same_operations() {
        let mut table = OpenAddressingHashTable::with_strategies(
            13,
            ProbingKind::Double,
            HashKind::Division,
            HashKind::Multiplication,
        )
        .unwrap();
        for i in 0..6u32 {
            table.add(format!("k{i}"), i).unwrap();
        }
        assert!(table.remove(&"k0".to_string()));
        table.add("k0".to_string(), 60).unwrap();
        assert_eq!(table.get_value(&"k0".to_string()), Some(&60));
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn double_hashing_never_uses_a_zero_step() {
        let table: OpenAddressingHashTable<u64, u32> = OpenAddressingHashTable::with_strategies(
            4,
            ProbingKind::Double,
            HashKind::Division,
            HashKind::Multiplication,
        )
        .unwrap();

        let zero_step_key = (0..1000u64)
            .find(|key| HashKind::Multiplication.index(key, table.capacity) == 0)
            .expect("some key maps to step 0 under a small capacity");
        let (_, step) = table.probe_params(&zero_step_key);
        assert_eq!(step, 1);

        for key in 0..1000u64 {
            let (_, step) = table.probe_params(&key);
            assert!(step >= 1);
        }
    }

    #[test]
    fn every_strategy_backs_a_working_table() {
        for kind in HashKind::ALL {
            let mut table =
                OpenAddressingHashTable::new(31, ProbingKind::Linear, kind).unwrap();
            for key in 0..10u64 {
                table.add(key, key + 100).unwrap();
            }
            assert_eq!(table.len(), 10, "{}", kind.name());
            for key in 0..10u64 {
                assert_eq!(table.get_value(&key), Some(&(key + 100)), "{}", kind.name());
            }
        }
    }

    #[test]
    fn probing_catalog_is_complete() {
        let names: Vec<_> = ProbingKind::ALL.iter().map(|kind| kind.name()).collect();
        assert_eq!(names, vec!["linear", "quadratic", "double"]);
    }

    fn check_against_std(expected: HashMap<String, String>) {
        let mut table =
            OpenAddressingHashTable::new(2048, ProbingKind::Linear, HashKind::Division).unwrap();
        for (k, v) in expected.iter() {
            table.add(k.clone(), v.clone()).unwrap();
        }

        assert_eq!(table.len(), expected.len());
        for (k, v) in expected.iter() {
            assert_eq!(table.get_value(k), Some(v), "key: {k:?}");
        }

        for k in expected.keys() {
            assert!(table.remove(k));
            assert_eq!(table.get_value(k), None);
        }
        assert!(table.is_empty());
    }

    #[test]
    fn it_s_a_hash_map() {
        let entries = proptest::collection::hash_map("[a-z]{1,12}", "[a-z0-9]{0,12}", 1..250);

        proptest!(|(expected in entries)| {
            check_against_std(expected);
        });
    }
}
