use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyRow<K> {
    pub key: K,
    pub count: u64,
}

/// Category → count table, ordered by descending count unless built with
/// [`Tally::from_rows`]. Equal counts keep first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tally<K> {
    rows: Vec<TallyRow<K>>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn count<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut index: HashMap<K, usize> = HashMap::new();
        let mut rows: Vec<TallyRow<K>> = Vec::new();
        for key in keys {
            match index.get(&key) {
                Some(&slot) => rows[slot].count += 1,
                None => {
                    index.insert(key.clone(), rows.len());
                    rows.push(TallyRow { key, count: 1 });
                }
            }
        }
        // sort_by is stable, which is what keeps ties in first-seen order.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Self { rows }
    }
}

impl<K> Tally<K> {
    /// Keeps the given order as-is.
    pub fn from_rows(rows: Vec<TallyRow<K>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TallyRow<K>] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.rows.iter().map(|row| (&row.key, row.count))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.rows.iter().map(|row| row.count).sum()
    }

    pub fn first(&self) -> Option<(&K, u64)> {
        self.rows.first().map(|row| (&row.key, row.count))
    }

    pub fn get(&self, key: &K) -> u64
    where
        K: PartialEq,
    {
        self.rows
            .iter()
            .find(|row| row.key == *key)
            .map_or(0, |row| row.count)
    }

    pub fn head(&self, n: usize) -> Self
    where
        K: Clone,
    {
        Self {
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tally;

    #[test]
    fn ties_keep_first_seen_order() {
        let tally = Tally::count(["b", "a", "c", "a", "b", "d"]);
        let keys: Vec<&str> = tally.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["b", "a", "c", "d"]);
        assert_eq!(tally.total(), 6);
        assert_eq!(tally.get(&"a"), 2);
        assert_eq!(tally.get(&"z"), 0);
    }

    #[test]
    fn head_truncates_without_reordering() {
        let tally = Tally::count([3, 3, 3, 1, 2, 2]);
        let top = tally.head(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top.first(), Some((&3, 3)));
        assert_eq!(tally.head(10).len(), 3);
    }
}
