use std::collections::BTreeMap;

/// Live entities of one kind, keyed by a per-registry id. Iteration is in id
/// order, which keeps tick processing deterministic.
#[derive(Clone, Debug)]
pub struct Registry<T> {
    prefix: &'static str,
    entries: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Registry<T> {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, value: T) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.entries.insert(id, value);
        id
    }

    pub fn remove(&mut self, id: u64) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut T)> {
        self.entries.iter_mut().map(|(id, value)| (*id, value))
    }

    pub fn ids(&self) -> Vec<u64> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry and returns their ids. Ids are not reused.
    pub fn clear(&mut self) -> Vec<u64> {
        let ids = self.ids();
        self.entries.clear();
        ids
    }

    /// Name used for render proxies, e.g. `projectile_4`.
    pub fn proxy_id(&self, id: u64) -> String {
        format!("{}_{}", self.prefix, id)
    }
}
