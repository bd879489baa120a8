//! Copy-on-write map
//!
//! `LazyMap` reads through to a shared original until the first effective
//! write, then owns a private copy. Added, changed and deleted keys are
//! tracked against the original so an overlay can report a change summary
//! without diffing.
//!
//! Writes can be grouped into a batch. A batch journals the inverse of each
//! write, so rolling back touches only the keys the batch wrote.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

/// Equality used to decide whether a write is effective
pub type Equality<V> = fn(&V, &V) -> bool;

#[derive(Clone)]
enum Undo<K, V> {
    Inserted(K),
    Replaced(K, V),
    Removed(usize, K, V),
    Cleared(Arc<IndexMap<K, V>>),
}

/// Open batch state
#[derive(Clone)]
struct Journal<K, V> {
    /// The map still read through to the original when the batch began
    shared: bool,
    added: IndexSet<K>,
    changed: IndexSet<K>,
    deleted: IndexSet<K>,
    entries: Vec<Undo<K, V>>,
}

#[derive(Clone)]
pub struct LazyMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    original: Arc<IndexMap<K, V>>,
    current: Arc<IndexMap<K, V>>,
    added: IndexSet<K>,
    changed: IndexSet<K>,
    deleted: IndexSet<K>,
    equals: Equality<V>,
    journal: Option<Journal<K, V>>,
}

impl<K, V> fmt::Debug for LazyMap<K, V>
where
    K: Hash + Eq + Clone + fmt::Debug,
    V: Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyMap")
            .field("current", &self.current)
            .field("added", &self.added)
            .field("changed", &self.changed)
            .field("deleted", &self.deleted)
            .field("in_batch", &self.journal.is_some())
            .finish_non_exhaustive()
    }
}

impl<K, V> LazyMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    pub fn new(original: Arc<IndexMap<K, V>>) -> Self {
        Self::with_equality(original, |a, b| a == b)
    }
}

impl<K, V> LazyMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub fn with_equality(original: Arc<IndexMap<K, V>>, equals: Equality<V>) -> Self {
        Self {
            current: Arc::clone(&original),
            original,
            added: IndexSet::new(),
            changed: IndexSet::new(),
            deleted: IndexSet::new(),
            equals,
            journal: None,
        }
    }

    fn is_shared(&self) -> bool {
        Arc::ptr_eq(&self.original, &self.current)
    }

    fn current_mut(&mut self) -> &mut IndexMap<K, V> {
        if self.is_shared() {
            tracing::debug!(entries = self.original.len(), "lazy map copied on first write");
        }
        Arc::make_mut(&mut self.current)
    }

    /// Journal an inverse write, unless the batch can roll back by re-sharing
    fn record(&mut self, undo: Undo<K, V>) {
        if let Some(journal) = self.journal.as_mut() {
            if !journal.shared {
                journal.entries.push(undo);
            }
        }
    }

    /// Start a batch of writes that can be rolled back as one
    ///
    /// An open batch is committed first.
    pub fn begin_batch(&mut self) {
        self.journal = Some(Journal {
            shared: self.is_shared(),
            added: self.added.clone(),
            changed: self.changed.clone(),
            deleted: self.deleted.clone(),
            entries: Vec::new(),
        });
    }

    /// Keep every write made since [`begin_batch`](Self::begin_batch)
    pub fn commit_batch(&mut self) {
        self.journal = None;
    }

    /// Undo every write made since [`begin_batch`](Self::begin_batch)
    ///
    /// Restores contents, entry order and key tracking. Without an open
    /// batch this does nothing.
    pub fn rollback_batch(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };

        if journal.shared {
            self.current = Arc::clone(&self.original);
        } else {
            for undo in journal.entries.into_iter().rev() {
                match undo {
                    Undo::Inserted(key) => {
                        Arc::make_mut(&mut self.current).shift_remove(&key);
                    }
                    Undo::Replaced(key, value) => {
                        Arc::make_mut(&mut self.current).insert(key, value);
                    }
                    Undo::Removed(index, key, value) => {
                        Arc::make_mut(&mut self.current).shift_insert(index, key, value);
                    }
                    Undo::Cleared(previous) => {
                        self.current = previous;
                    }
                }
            }
        }

        self.added = journal.added;
        self.changed = journal.changed;
        self.deleted = journal.deleted;
    }

    /// Insert or replace a value
    ///
    /// Writing a value equal to the one already held is a no-op and keeps
    /// the original shared.
    pub fn insert(&mut self, key: K, value: V) {
        if let Some(existing) = self.current.get(&key) {
            if (self.equals)(existing, &value) {
                return;
            }
        }

        match self.original.get(&key) {
            None => {
                self.added.insert(key.clone());
            }
            Some(before) => {
                self.deleted.shift_remove(&key);
                if (self.equals)(before, &value) {
                    self.changed.shift_remove(&key);
                } else {
                    self.changed.insert(key.clone());
                }
            }
        }
        let undo_key = self.journal.as_ref().map(|_| key.clone());
        let previous = self.current_mut().insert(key, value);
        if let Some(key) = undo_key {
            match previous {
                Some(value) => self.record(Undo::Replaced(key, value)),
                None => self.record(Undo::Inserted(key)),
            }
        }
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &K) -> Option<V> {
        if !self.current.contains_key(key) {
            return None;
        }
        if self.original.contains_key(key) {
            self.changed.shift_remove(key);
            self.deleted.insert(key.clone());
        } else {
            self.added.shift_remove(key);
        }
        let (index, key, value) = self.current_mut().shift_remove_full(key)?;
        if self.journal.is_some() {
            self.record(Undo::Removed(index, key, value.clone()));
        }
        Some(value)
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        if self.current.is_empty() {
            return;
        }
        self.added.clear();
        self.changed.clear();
        self.deleted = self.original.keys().cloned().collect();
        let previous = std::mem::replace(&mut self.current, Arc::new(IndexMap::new()));
        self.record(Undo::Cleared(previous));
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.current.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.current.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, K, V> {
        self.current.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, K, V> {
        self.current.iter()
    }

    /// True once any effective write has happened since construction
    pub fn has_changed(&self) -> bool {
        !self.is_shared()
    }

    /// Value held by the original for `key`
    pub fn original_value(&self, key: &K) -> Option<&V> {
        self.original.get(key)
    }

    /// Current contents as a shared map
    ///
    /// Before the first write this is the original `Arc`.
    pub fn snapshot(&self) -> Arc<IndexMap<K, V>> {
        Arc::clone(&self.current)
    }

    pub fn added(&self) -> &IndexSet<K> {
        &self.added
    }

    pub fn changed(&self) -> &IndexSet<K> {
        &self.changed
    }

    pub fn deleted(&self) -> &IndexSet<K> {
        &self.deleted
    }
}
