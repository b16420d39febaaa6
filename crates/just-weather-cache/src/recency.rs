use std::collections::HashMap;

use just_weather_core::{CacheEntry, List, NodeRef};

/// In-memory entries ordered oldest write first
///
/// The map gives O(1) lookup of a key's node; the list keeps write order.
/// Reads never reorder.
#[derive(Debug, Default)]
pub(crate) struct RecencyIndex {
    nodes: HashMap<String, NodeRef>,
    order: List<CacheEntry>,
}

impl RecencyIndex {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
            order: List::with_capacity(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.nodes.get(key).and_then(|&node| self.order.value(node))
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Replace the entry for an existing key and make it the newest
    ///
    /// Hands `entry` back when the key is not present.
    pub(crate) fn update(&mut self, entry: CacheEntry) -> Result<(), CacheEntry> {
        let Some(&node) = self.nodes.get(&entry.key) else {
            return Err(entry);
        };
        match self.order.value_mut(node) {
            Some(slot) => *slot = entry,
            None => return Err(entry),
        }
        self.order.move_to_back(node);
        Ok(())
    }

    /// Append an entry for a key that is not present
    pub(crate) fn push(&mut self, entry: CacheEntry) {
        let key = entry.key.clone();
        let node = self.order.push_back(entry);
        self.nodes.insert(key, node);
    }

    /// Drop and return the oldest entry
    pub(crate) fn pop_oldest(&mut self) -> Option<CacheEntry> {
        let entry = self.order.pop_front()?;
        self.nodes.remove(&entry.key);
        Some(entry)
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let node = self.nodes.remove(key)?;
        self.order.remove(node)
    }

    /// Remove every entry matching `pred`, oldest first
    pub(crate) fn remove_where(
        &mut self,
        mut pred: impl FnMut(&CacheEntry) -> bool,
    ) -> Vec<CacheEntry> {
        let doomed: Vec<String> = self
            .order
            .iter()
            .filter(|e| pred(*e))
            .map(|e| e.key.clone())
            .collect();
        doomed.iter().filter_map(|key| self.remove(key)).collect()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.order.clear();
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|e| e.key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: &str) -> CacheEntry {
        CacheEntry::new(key, value, 0, None)
    }

    #[test]
    fn test_write_order() {
        let mut index = RecencyIndex::default();
        index.push(entry("a", "1"));
        index.push(entry("b", "2"));
        index.push(entry("c", "3"));
        assert_eq!(index.keys().collect::<Vec<_>>(), ["a", "b", "c"]);

        // Updating moves to the newest end, reading does not
        index.update(entry("a", "10")).unwrap();
        let _ = index.get("b");
        assert_eq!(index.keys().collect::<Vec<_>>(), ["b", "c", "a"]);
        assert_eq!(index.get("a").map(|e| e.value.as_str()), Some("10"));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_update_missing_hands_back() {
        let mut index = RecencyIndex::default();
        let rejected = index.update(entry("x", "1")).unwrap_err();
        assert_eq!(rejected.key, "x");
        assert_eq!(index.len(), 0);
    }

    #[test]
    fn test_pop_and_remove() {
        let mut index = RecencyIndex::with_capacity(4);
        index.push(entry("a", "1"));
        index.push(entry("b", "2"));
        index.push(entry("c", "3"));

        assert_eq!(index.pop_oldest().map(|e| e.key), Some("a".to_string()));
        assert!(!index.contains("a"));
        assert_eq!(index.remove("c").map(|e| e.value), Some("3".to_string()));
        assert!(index.remove("c").is_none());
        assert_eq!(index.keys().collect::<Vec<_>>(), ["b"]);

        index.clear();
        assert_eq!(index.len(), 0);
        assert!(index.pop_oldest().is_none());
    }

    #[test]
    fn test_remove_where() {
        let mut index = RecencyIndex::default();
        for (k, v) in [("a", "old"), ("b", "new"), ("c", "old")] {
            index.push(entry(k, v));
        }
        let removed = index.remove_where(|e| e.value == "old");
        assert_eq!(removed.len(), 2);
        assert_eq!(index.keys().collect::<Vec<_>>(), ["b"]);
    }
}
