//! Insertion-ordered id → entry storage

use std::collections::HashMap;

/// Owning map from string id to entry that iterates in insertion order.
///
/// Every output of the pipeline is derived by walking these arenas, so the
/// iteration order is what makes repeated runs produce identical documents.
#[derive(Debug, Clone)]
pub struct Arena<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Arena<V> {
    pub fn new() -> Self {
        Arena {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert an entry. Returns false (and keeps the existing entry) if the
    /// id is already taken.
    pub fn insert(&mut self, id: String, value: V) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push((id, value));
        true
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut V> {
        let i = *self.index.get(id)?;
        Some(&mut self.entries[i].1)
    }

    /// The stored key equal to `id`, borrowed from the arena.
    pub fn key(&self, id: &str) -> Option<&str> {
        self.index.get(id).map(|&i| self.entries[i].0.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position of an id in insertion order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keep only the entries for which `keep` returns true. Returns the
    /// number of entries removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &V) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, v)| keep(k, v));
        let removed = before - self.entries.len();
        if removed > 0 {
            self.reindex();
        }
        removed
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, (k, _)) in self.entries.iter().enumerate() {
            self.index.insert(k.clone(), i);
        }
    }
}

impl<V> Default for Arena<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut arena = Arena::new();
        for id in ["c", "a", "b", "d"] {
            assert!(arena.insert(id.to_string(), id.len()));
        }
        assert!(!arena.insert("a".to_string(), 99));
        assert_eq!(arena.get("a"), Some(&1));

        let removed = arena.retain(|k, _| k != "a");
        assert_eq!(removed, 1);
        assert_eq!(arena.keys().collect::<Vec<_>>(), vec!["c", "b", "d"]);
        assert_eq!(arena.position("d"), Some(2));
        assert!(!arena.contains("a"));
    }
}
