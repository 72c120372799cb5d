//! Table: bucket array, load monitoring, growth and the CRUD operations.

use crate::chain::{Arena, Chain, Entry, EntryId, Head};
use crate::config::{TableConfig, DEFAULT_INITIAL_BUCKETS, LOAD_THRESHOLD};
use crate::error::TableError;
use crate::hash::bucket_index;

/// String-keyed table of `i64` values using separate chaining.
///
/// Each bucket holds the head of a singly linked chain; entries live in a
/// slab owned by the table. `set` grows the bucket array to `2 * size + 1`
/// when occupancy is above 60%; the array never shrinks.
pub struct Table {
    buckets: Vec<Head>,
    arena: Arena,
}

fn alloc_buckets(size: usize) -> Result<Vec<Head>, TableError> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(size)
        .map_err(|_| TableError::AllocationFailure { buckets: size })?;
    buckets.resize(size, None);
    Ok(buckets)
}

/// Bucket count after one growth step, `None` on overflow.
fn grown_size(size: usize) -> Option<usize> {
    size.checked_mul(2).and_then(|n| n.checked_add(1))
}

impl Table {
    /// Creates a table with `size` empty buckets.
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Result<Self, TableError> {
        Self::with_config(TableConfig::default().with_initial_buckets(size))
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        assert!(config.initial_buckets > 0, "initial bucket count must be positive");
        Ok(Self::from_buckets(alloc_buckets(config.initial_buckets)?))
    }

    fn from_buckets(buckets: Vec<Head>) -> Self {
        Self {
            buckets,
            arena: Arena::new(),
        }
    }

    /// Current bucket count.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Occupancy as a truncated percentage: `100 * entries / size`.
    ///
    /// Recounted by walking every chain, so it costs O(size + entries).
    pub fn used(&self) -> usize {
        let entries: usize = self
            .buckets
            .iter()
            .map(|&head| self.arena.chain(head).count())
            .sum();
        debug_assert_eq!(entries, self.arena.len());
        entries.saturating_mul(100) / self.size()
    }

    fn index_of(&self, key: &str) -> usize {
        bucket_index(key, self.size())
    }

    /// Inserts `key` or overwrites its value, returning the previous value.
    ///
    /// When occupancy is above the threshold the table grows once before
    /// the key is placed; a failed growth aborts with no entry created.
    pub fn set(&mut self, key: &str, value: i64) -> Result<Option<i64>, TableError> {
        // One growth per insert is enough at 60%: the previous insert left
        // at most 60% + 1 entry, and 2 * size + 1 buckets absorb that.
        if self.used() > LOAD_THRESHOLD {
            self.resize()?;
            debug_assert!(self.used() <= LOAD_THRESHOLD);
        }

        let index = self.index_of(key);
        let head = &mut self.buckets[index];
        if let Some(entry) = self
            .arena
            .find(*head, key)
            .and_then(|id| self.arena.get_mut(id))
        {
            return Ok(Some(std::mem::replace(entry.value_mut(), value)));
        }
        self.arena.push(head, key, value);
        Ok(None)
    }

    /// First entry in the key's chain whose key matches.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        let id = self.arena.find(self.buckets[self.index_of(key)], key)?;
        self.arena.get(id)
    }

    /// Mutable access to a stored value; never grows the table.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut i64> {
        let id = self.arena.find(self.buckets[self.index_of(key)], key)?;
        self.arena.get_mut(id).map(|e| e.value_mut())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value.
    ///
    /// Fails with `EmptyBucket` when the key's bucket has no chain and with
    /// `NotFound` when the chain holds no matching key; the table is left
    /// unchanged in both cases. The bucket array is never shrunk.
    pub fn del(&mut self, key: &str) -> Result<i64, TableError> {
        let index = self.index_of(key);
        let head = &mut self.buckets[index];
        if head.is_none() {
            return Err(TableError::EmptyBucket { index });
        }
        self.arena
            .unlink(head, key)
            .map(|e| e.value())
            .ok_or(TableError::NotFound { index })
    }

    /// Grows the bucket array to `2 * size + 1` and re-links every entry.
    ///
    /// Old buckets are visited in index order and each chain head to tail;
    /// every entry is appended to the tail of its new chain, as `set` does.
    /// On `AllocationFailure` the table is unchanged.
    pub fn resize(&mut self) -> Result<(), TableError> {
        let new_size =
            grown_size(self.size()).ok_or(TableError::AllocationFailure { buckets: usize::MAX })?;
        self.grow_to(new_size)
    }

    fn grow_to(&mut self, new_size: usize) -> Result<(), TableError> {
        let old = std::mem::replace(&mut self.buckets, alloc_buckets(new_size)?);

        for head in old {
            let mut cursor = head;
            while let Some(id) = cursor {
                cursor = self.arena.next_of(id);
                self.relink(id);
            }
        }
        Ok(())
    }

    fn relink(&mut self, id: EntryId) {
        let Some(entry) = self.arena.get(id) else {
            return;
        };
        let index = bucket_index(entry.key(), self.size());
        self.arena.link_tail(&mut self.buckets[index], id);
    }

    /// Releases every entry; the bucket count is kept.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.buckets.iter_mut().for_each(|head| *head = None);
    }

    /// Releases the table and everything it owns.
    pub fn cleanup(self) {
        drop(self);
    }

    /// Entries of bucket `index`, head to tail. Empty past the last bucket.
    pub fn bucket(&self, index: usize) -> Chain<'_> {
        self.arena.chain(self.buckets.get(index).copied().flatten())
    }

    /// All entries in bucket order, each chain head to tail. The order
    /// changes when the table grows.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: self,
            next_bucket: 0,
            chain: self.arena.chain(None),
        }
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::from_buckets(vec![None; DEFAULT_INITIAL_BUCKETS])
    }
}

impl core::fmt::Debug for Table {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(key, value)` pairs of a [`Table`].
pub struct Iter<'a> {
    table: &'a Table,
    next_bucket: usize,
    chain: Chain<'a>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, i64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.chain.next() {
                return Some((e.key(), e.value()));
            }
            if self.next_bucket >= self.table.size() {
                return None;
            }
            self.chain = self.table.bucket(self.next_bucket);
            self.next_bucket += 1;
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a str, i64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn snapshot(t: &Table) -> BTreeMap<String, i64> {
        t.iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    /// Invariant: a fresh table has `size` empty buckets and zero occupancy.
    #[test]
    fn init_allocates_empty_buckets() {
        let t = Table::new(10).unwrap();
        assert_eq!(t.size(), 10);
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.used(), 0);
        assert!((0..10).all(|i| t.bucket(i).next().is_none()));
    }

    #[test]
    #[should_panic(expected = "initial bucket count must be positive")]
    fn init_zero_panics() {
        let _ = Table::new(0);
    }

    /// Invariant: a bucket array that cannot be reserved is reported, not aborted on.
    #[test]
    fn init_reports_allocation_failure() {
        match Table::new(usize::MAX) {
            Err(TableError::AllocationFailure { buckets }) => assert_eq!(buckets, usize::MAX),
            other => panic!("unexpected result: {:?}", other.map(|t| t.size())),
        }
    }

    /// Invariant: set then get returns the value; overwrite keeps the count.
    #[test]
    fn set_get_and_overwrite() {
        let mut t = Table::new(10).unwrap();
        assert_eq!(t.set("k", 1).unwrap(), None);
        assert_eq!(t.get("k").map(Entry::value), Some(1));
        assert_eq!(t.set("k", 2).unwrap(), Some(1));
        assert_eq!(t.get("k").map(Entry::value), Some(2));
        assert_eq!(t.len(), 1);
        assert!(t.get("missing").is_none());
    }

    /// Invariant: colliding keys share a chain in insertion order and each
    /// one is updated in place, not appended again.
    #[test]
    fn collisions_chain_and_update_in_place() {
        let mut t = Table::new(10).unwrap();
        // "a", "k" and "u" all land in bucket 0 of 10
        t.set("a", 1).unwrap();
        t.set("k", 2).unwrap();
        t.set("u", 3).unwrap();
        t.set("k", 20).unwrap();
        t.set("u", 30).unwrap();
        let chain: Vec<_> = t.bucket(0).map(|e| (e.key(), e.value())).collect();
        assert_eq!(chain, [("a", 1), ("k", 20), ("u", 30)]);
        assert_eq!(t.len(), 3);
    }

    /// Invariant: `get_mut` edits the stored value and never triggers growth.
    #[test]
    fn get_mut_updates_without_growth() {
        let mut t = Table::new(1).unwrap();
        t.set("a", 1).unwrap();
        // 100% full; a set would grow, get_mut must not
        *t.get_mut("a").unwrap() += 41;
        assert_eq!(t.get("a").map(Entry::value), Some(42));
        assert_eq!(t.size(), 1);
        assert!(t.get_mut("b").is_none());
    }

    /// Invariant: del distinguishes an empty bucket from a key missing in a chain.
    #[test]
    fn del_statuses() {
        let mut t = Table::new(10).unwrap();
        t.set("a", 1).unwrap();
        assert_eq!(t.del("b"), Err(TableError::EmptyBucket { index: 1 }));
        assert_eq!(t.del("k"), Err(TableError::NotFound { index: 0 }));
        assert_eq!(t.len(), 1);
        assert_eq!(t.del("a"), Ok(1));
        assert!(t.get("a").is_none());
        assert_eq!(t.del("a"), Err(TableError::EmptyBucket { index: 0 }));
    }

    /// Invariant: deleting head, middle and tail keeps the rest of the chain.
    #[test]
    fn del_each_chain_position() {
        let mut t = Table::new(10).unwrap();
        for (i, k) in ["a", "k", "u", "e"].iter().enumerate() {
            t.set(k, i as i64).unwrap();
        }
        assert_eq!(t.del("k"), Ok(1));
        assert_eq!(t.del("u"), Ok(2));
        assert_eq!(t.del("a"), Ok(0));
        let chain: Vec<_> = t.bucket(0).map(Entry::key).collect();
        assert!(chain.is_empty());
        assert_eq!(t.get("e").map(Entry::value), Some(3));
        assert_eq!(t.size(), 10, "deletion never shrinks");
    }

    /// Invariant: occupancy is `100 * entries / size`, truncated.
    #[test]
    fn used_is_truncated_percentage() {
        let mut t = Table::new(3).unwrap();
        t.set("a", 1).unwrap();
        assert_eq!(t.used(), 33);
        t.set("b", 1).unwrap();
        assert_eq!(t.used(), 66);
    }

    /// Invariant: growth happens only when occupancy is strictly above the
    /// threshold, checked before the key is placed.
    #[test]
    fn growth_threshold_is_strict() {
        let mut t = Table::new(10).unwrap();
        for k in ["a", "b", "c", "d", "e", "f", "g"] {
            t.set(k, 19).unwrap();
        }
        // 60% before "g" is not above the threshold
        assert_eq!(t.size(), 10);
        assert_eq!(t.used(), 70);
        t.set("h", 19).unwrap();
        assert_eq!(t.size(), 21);
        assert_eq!(t.len(), 8);
    }

    /// Invariant: an overwrite on a table above the threshold still grows it.
    #[test]
    fn overwrite_may_grow() {
        let mut t = Table::new(1).unwrap();
        t.set("a", 1).unwrap();
        t.set("a", 2).unwrap();
        assert_eq!(t.size(), 3);
        assert_eq!(t.len(), 1);
        assert_eq!(t.get("a").map(Entry::value), Some(2));
    }

    /// Invariant: resize preserves the exact set of pairs and the new size
    /// is `2 * old + 1`.
    #[test]
    fn resize_preserves_membership() {
        let mut t = Table::new(5).unwrap();
        for i in 0..3 {
            t.set(&format!("key{i}"), i).unwrap();
        }
        let before = snapshot(&t);
        t.resize().unwrap();
        assert_eq!(t.size(), 11);
        assert_eq!(snapshot(&t), before);
        assert_eq!(t.len(), 3);
        for (k, v) in &before {
            assert_eq!(t.get(k).map(Entry::value), Some(*v));
        }
    }

    /// Invariant: entries that share a new bucket keep their relative order.
    #[test]
    fn resize_keeps_chain_order() {
        let mut t = Table::new(1).unwrap();
        // Bypass `set` so that only the explicit resize moves entries.
        for (k, v) in [("a", 1), ("d", 2), ("g", 3)] {
            t.push_unchecked(k, v);
        }
        t.resize().unwrap();
        assert_eq!(t.size(), 3);
        // 'a', 'd', 'g' are three bytes apart, so all land in bucket 1 of 3
        let chain: Vec<_> = t.bucket(1).map(Entry::key).collect();
        assert_eq!(chain, ["a", "d", "g"]);
    }

    /// Invariant: clear drops every entry but keeps the grown size.
    #[test]
    fn clear_keeps_size() {
        let mut t = Table::new(1).unwrap();
        for k in ["a", "b", "c"] {
            t.set(k, 1).unwrap();
        }
        let size = t.size();
        assert!(size > 1);
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.size(), size);
        assert!(t.get("a").is_none());
        t.set("a", 5).unwrap();
        assert_eq!(t.get("a").map(Entry::value), Some(5));
    }

    #[test]
    fn iter_visits_each_entry_once() {
        let mut t = Table::new(4).unwrap();
        for (i, k) in ["x", "y", "z", "w"].iter().enumerate() {
            t.set(k, i as i64).unwrap();
        }
        let seen = snapshot(&t);
        assert_eq!(seen.len(), 4);
        assert_eq!(seen["z"], 2);
        assert_eq!((&t).into_iter().count(), t.len());
    }

    #[test]
    fn bucket_past_the_end_is_empty() {
        let t = Table::new(2).unwrap();
        assert!(t.bucket(99).next().is_none());
    }

    #[test]
    fn default_table() {
        let mut t = Table::default();
        assert_eq!(t.size(), 16);
        t.set("a", 1).unwrap();
        assert_eq!(format!("{:?}", t), "{\"a\": 1}");
    }

    /// Invariant: the growth inside `set` brings occupancy back to at most
    /// 60% before the key is placed, from any starting size.
    #[test]
    fn one_growth_step_restores_threshold() {
        for initial in 1..40 {
            let mut t = Table::new(initial).unwrap();
            for i in 0..200 {
                let size = t.size();
                let before = t.len();
                t.set(&format!("k{i}"), i).unwrap();
                if t.size() != size {
                    assert_eq!(t.size(), 2 * size + 1);
                    assert!(
                        100 * before / t.size() <= LOAD_THRESHOLD,
                        "initial {initial}: {before} entries over {} buckets",
                        t.size()
                    );
                }
            }
        }
    }

    /// Invariant: an overflowing growth size is reported, not wrapped.
    #[test]
    fn grown_size_overflow() {
        assert_eq!(grown_size(10), Some(21));
        assert_eq!(grown_size(usize::MAX / 2), Some(usize::MAX));
        assert_eq!(grown_size(usize::MAX / 2 + 1), None);
    }

    /// Invariant: a growth whose bucket array cannot be reserved fails with
    /// AllocationFailure and leaves size, entries and chains untouched.
    #[test]
    fn failed_growth_leaves_table_unchanged() {
        let mut t = Table::new(10).unwrap();
        for (i, k) in ["a", "k", "b", "c"].iter().enumerate() {
            t.set(k, i as i64).unwrap();
        }
        let before = snapshot(&t);
        let chain: Vec<_> = t.bucket(0).map(Entry::key).map(str::to_owned).collect();

        assert_eq!(
            t.grow_to(usize::MAX),
            Err(TableError::AllocationFailure { buckets: usize::MAX })
        );
        assert_eq!(t.size(), 10);
        assert_eq!(t.len(), 4);
        assert_eq!(snapshot(&t), before);
        let after: Vec<_> = t.bucket(0).map(Entry::key).map(str::to_owned).collect();
        assert_eq!(after, chain);

        // Still usable afterwards
        t.set("d", 9).unwrap();
        assert_eq!(t.del("k"), Ok(1));
        assert_eq!(t.get("d").map(Entry::value), Some(9));
    }

    /// Invariant: `Default` goes through the same constructor as `new`.
    #[test]
    fn default_matches_new() {
        let d = Table::default();
        let n = Table::with_config(TableConfig::default()).unwrap();
        assert_eq!(d.size(), n.size());
        assert_eq!(d.size(), DEFAULT_INITIAL_BUCKETS);
        assert!(d.is_empty() && n.is_empty());
    }

    impl Table {
        fn push_unchecked(&mut self, key: &str, value: i64) {
            let index = self.index_of(key);
            self.arena.push(&mut self.buckets[index], key, value);
        }
    }
}
