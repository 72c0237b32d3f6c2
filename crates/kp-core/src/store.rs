use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// A concurrent map where every entry has its own lock.
///
/// The outer `RwLock` only guards the shape of the map and is held for the
/// duration of a lookup or an insert, never while an entry is being
/// mutated. Work on an entry happens under that entry's `Mutex`, so two
/// different keys never serialize against each other while a compound
/// update on one key stays atomic.
///
/// Entries are created lazily with `V::default()` the first time they are
/// written. Read-only lookups of unseen keys allocate nothing.
#[derive(Debug)]
pub struct KeyedStore<K, V> {
    entries: RwLock<HashMap<K, Arc<Mutex<V>>>>,
}

impl<K, V> Default for KeyedStore<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Default,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for `key`, inserting a default one if it is missing.
    pub fn entry(&self, key: &K) -> Arc<Mutex<V>> {
        if let Some(existing) = self.entries.read().get(key) {
            return Arc::clone(existing);
        }
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key.clone()).or_default())
    }

    /// Get the entry for `key` without creating it.
    pub fn get(&self, key: &K) -> Option<Arc<Mutex<V>>> {
        self.entries.read().get(key).map(Arc::clone)
    }

    /// Run `f` with exclusive access to the entry for `key`, creating it if
    /// needed. The entry stays locked for the whole closure.
    pub fn update<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> R {
        let entry = self.entry(key);
        let mut guard = entry.lock();
        f(&mut guard)
    }

    /// Run `f` against the entry for `key` if it exists.
    pub fn inspect<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        let entry = self.get(key)?;
        let guard = entry.lock();
        Some(f(&guard))
    }

    /// Every key currently in the store.
    pub fn keys(&self) -> Vec<K> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Collect `f(key, value)` for every entry.
    ///
    /// Each entry is locked on its own while `f` runs; there is no moment
    /// where the whole map is frozen.
    pub fn collect<T>(&self, mut f: impl FnMut(&K, &V) -> Option<T>) -> Vec<T> {
        let entries: Vec<(K, Arc<Mutex<V>>)> = self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        entries
            .iter()
            .filter_map(|(k, v)| {
                let guard = v.lock();
                f(k, &guard)
            })
            .collect()
    }

    /// Replace the whole contents of the store.
    pub fn replace_all(&self, items: impl IntoIterator<Item = (K, V)>) {
        let fresh: HashMap<K, Arc<Mutex<V>>> = items
            .into_iter()
            .map(|(k, v)| (k, Arc::new(Mutex::new(v))))
            .collect();
        *self.entries.write() = fresh;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazily_creates_default_entries() {
        let store: KeyedStore<u32, u64> = KeyedStore::new();
        assert!(store.is_empty());
        assert_eq!(store.inspect(&1, |v| *v), None);
        assert!(store.is_empty());

        store.update(&1, |v| *v += 5);
        assert_eq!(store.inspect(&1, |v| *v), Some(5));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn entry_returns_same_lock() {
        let store: KeyedStore<&str, u8> = KeyedStore::new();
        let a = store.entry(&"x");
        let b = store.entry(&"x");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn collect_and_replace() {
        let store: KeyedStore<u32, u32> = KeyedStore::new();
        store.replace_all([(1, 10), (2, 0), (3, 30)]);
        let mut nonzero = store.collect(|k, v| (*v > 0).then_some(*k));
        nonzero.sort_unstable();
        assert_eq!(nonzero, vec![1, 3]);

        store.replace_all([(9, 9)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.inspect(&1, |v| *v), None);
    }

    #[test]
    fn keys_lists_every_entry() {
        let store: KeyedStore<u32, u32> = KeyedStore::new();
        store.update(&3, |v| *v = 1);
        store.entry(&1);
        assert_eq!(store.inspect(&2, |v| *v), None);

        let mut keys = store.keys();
        keys.sort_unstable();
        assert_eq!(keys, vec![1, 3]);
    }

    #[test]
    fn holding_one_entry_does_not_block_another() {
        let store: KeyedStore<u32, u32> = KeyedStore::new();
        let held = store.entry(&1);
        let _guard = held.lock();
        // A different key must still be writable while key 1 is locked.
        store.update(&2, |v| *v = 7);
        assert_eq!(store.inspect(&2, |v| *v), Some(7));
    }
}
