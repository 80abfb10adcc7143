//! Natural-key deduplication with surrogate ids.

use std::collections::HashMap;
use std::hash::Hash;

/// Keeps the first record built for each natural key.
///
/// Surrogate ids are 1-based and follow first-observation order. A key
/// seen again is a no-op: the first record wins.
#[derive(Debug)]
pub struct EntityDeduplicator<K, R> {
    index: HashMap<K, usize>,
    records: Vec<R>,
}

impl<K: Hash + Eq, R> Default for EntityDeduplicator<K, R> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            records: Vec::new(),
        }
    }
}

impl<K: Hash + Eq, R> EntityDeduplicator<K, R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical record for `key`, built by `construct(surrogate_id)` on first sight
    pub fn observe<C>(&mut self, key: K, construct: C) -> &R
    where
        C: FnOnce(u32) -> R,
    {
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                let position = self.records.len();
                self.records.push(construct(position as u32 + 1));
                self.index.insert(key, position);
                position
            }
        };
        &self.records[position]
    }

    /// Surrogate id assigned to `key`, if observed
    pub fn surrogate_of(&self, key: &K) -> Option<u32> {
        self.index.get(key).map(|&position| position as u32 + 1)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One record per distinct key, in first-observed order
    pub fn finalize(self) -> Vec<R> {
        self.records
    }
}
