use std::collections::BTreeMap;


/// Side-table from an engine handle to whatever owns it on our side.
/// Iteration follows handle order, which is creation order for monotonic handles.
pub struct HandleTable<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord + Copy, V> HandleTable<K, V> {

    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new()
        }
    }

    pub fn insert(&mut self, handle: K, value: V) -> Option<V> {
        self.entries.insert(handle, value)
    }

    pub fn get(&self, handle: K) -> Option<&V> {
        self.entries.get(&handle)
    }

    pub fn remove(&mut self, handle: K) -> Option<V> {
        self.entries.remove(&handle)
    }

    pub fn contains(&self, handle: K) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.values()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(K, &V) -> bool) {
        self.entries.retain(|k, v| keep(*k, v));
    }
}

impl<K: Ord + Copy, V> Default for HandleTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_handle_order() {
        let mut table = HandleTable::new();
        table.insert(3u32, "c");
        table.insert(1u32, "a");
        table.insert(2u32, "b");

        assert_eq!(table.values().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        table.retain(|k, _| k != 2);
        assert!(!table.contains(2));
        assert_eq!(table.remove(1), Some("a"));
        assert_eq!(table.len(), 1);
    }
}
