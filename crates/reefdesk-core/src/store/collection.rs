// ── Generic keyed entity collection ──
//
// Ordered map of shared entities plus a version counter. Cloning is
// cheap (entities are `Arc`ed), which lets the store stage a whole
// write on a copy and swap it in only after it has been persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A keyed collection for a single entity type.
///
/// Iteration is always in ascending key order. Every mutation bumps the
/// version, which the persistence layer uses to skip untouched collections.
#[derive(Debug)]
pub(crate) struct EntityCollection<K: Ord + Clone, T> {
    by_key: BTreeMap<K, Arc<T>>,
    version: u64,
}

impl<K: Ord + Clone, T> Clone for EntityCollection<K, T> {
    fn clone(&self) -> Self {
        Self {
            by_key: self.by_key.clone(),
            version: self.version,
        }
    }
}

impl<K: Ord + Clone, T> Default for EntityCollection<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, T> EntityCollection<K, T> {
    pub(crate) fn new() -> Self {
        Self {
            by_key: BTreeMap::new(),
            version: 0,
        }
    }

    /// Build from loaded entities. The version starts at zero.
    pub(crate) fn from_entities(entities: impl IntoIterator<Item = T>, key: impl Fn(&T) -> K) -> Self {
        let by_key = entities
            .into_iter()
            .map(|e| (key(&e), Arc::new(e)))
            .collect();
        Self { by_key, version: 0 }
    }

    /// Insert or update an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&mut self, key: K, entity: T) -> bool {
        let is_new = self.by_key.insert(key, Arc::new(entity)).is_none();
        self.bump_version();
        is_new
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&mut self, key: &K) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key);
        if removed.is_some() {
            self.bump_version();
        }
        removed
    }

    /// Remove every entity matching `pred`. Returns how many were dropped.
    pub(crate) fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.by_key.len();
        self.by_key.retain(|_, v| !pred(v));
        let removed = before - self.by_key.len();
        if removed > 0 {
            self.bump_version();
        }
        removed
    }

    pub(crate) fn get_by_key(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.get(key).cloned()
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.by_key.contains_key(key)
    }

    /// All entities in key order (cheap `Arc` clones).
    pub(crate) fn snapshot(&self) -> Vec<Arc<T>> {
        self.by_key.values().cloned().collect()
    }

    pub(crate) fn values(&self) -> impl DoubleEndedIterator<Item = &Arc<T>> {
        self.by_key.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Largest key currently stored.
    pub(crate) fn last_key(&self) -> Option<&K> {
        self.by_key.keys().next_back()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}

impl<K: Ord + Clone, T: Serialize> EntityCollection<K, T> {
    /// Serialize as a JSON array in key order.
    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        let values: Vec<&T> = self.by_key.values().map(AsRef::as_ref).collect();
        serde_json::to_string_pretty(&values)
    }
}

impl<K: Ord + Clone, T: DeserializeOwned> EntityCollection<K, T> {
    pub(crate) fn from_json(raw: &str, key: impl Fn(&T) -> K) -> serde_json::Result<Self> {
        let entities: Vec<T> = serde_json::from_str(raw)?;
        Ok(Self::from_entities(entities, key))
    }
}
