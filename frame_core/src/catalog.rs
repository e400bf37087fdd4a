//! # Named Catalogs
//!
//! Shared arena storage for catalog entities (materials, sections, releases,
//! actions). Entries are held behind stable opaque handles; referencing
//! entities (bars, loads) store handles and never own the entry itself.
//!
//! Catalog invariants:
//! - names are unique within a catalog (case-sensitive)
//! - iteration order is non-decreasing lexicographic by name
//! - a failed insert or rename leaves the catalog unchanged

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{EntityKind, ModelError, ModelResult};

/// Typed handle into a [`NamedArena`].
pub trait CatalogId: Copy + Eq + Hash + Ord + std::fmt::Display {
    /// Mint a fresh, unique handle.
    fn generate() -> Self;
    /// The raw identifier, for cross-kind bookkeeping (events, dependency sets).
    fn raw(&self) -> Uuid;
}

/// A catalog entry with a unique, user-visible name.
pub trait CatalogEntry {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

/// Handle-keyed arena with name-sorted iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedArena<K: Eq + Hash, T> {
    kind: EntityKind,
    entries: HashMap<K, T>,
}

impl<K: CatalogId, T: CatalogEntry> NamedArena<K, T> {
    pub fn new(kind: EntityKind) -> Self {
        NamedArena {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Which entity kind this arena stores (used in error reporting).
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Insert an entry, minting a fresh handle.
    ///
    /// Fails with `DuplicateName` (catalog unchanged) if the name is taken.
    pub fn insert(&mut self, entry: T) -> ModelResult<K> {
        if self.find_by_name(entry.name()).is_some() {
            return Err(ModelError::duplicate_name(self.kind, entry.name()));
        }
        let id = K::generate();
        self.entries.insert(id, entry);
        Ok(id)
    }

    pub fn get(&self, id: K) -> ModelResult<&T> {
        self.entries
            .get(&id)
            .ok_or_else(|| ModelError::not_found(self.kind, id))
    }

    pub fn get_mut(&mut self, id: K) -> ModelResult<&mut T> {
        self.entries
            .get_mut(&id)
            .ok_or_else(|| ModelError::not_found(self.kind, id))
    }

    pub fn get_opt(&self, id: K) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: K) -> bool {
        self.entries.contains_key(&id)
    }

    /// Remove an entry. Reference integrity (InUse checks) is the model's
    /// responsibility; the arena only stores.
    pub fn remove(&mut self, id: K) -> Option<T> {
        self.entries.remove(&id)
    }

    /// Look up an entry by its exact name.
    pub fn find_by_name(&self, name: &str) -> Option<(K, &T)> {
        self.entries
            .iter()
            .find(|(_, e)| e.name() == name)
            .map(|(id, e)| (*id, e))
    }

    /// Rename an entry. The sorted iteration order repositions automatically.
    pub fn rename(&mut self, id: K, new_name: impl Into<String>) -> ModelResult<()> {
        let new_name = new_name.into();
        if let Some((existing, _)) = self.find_by_name(&new_name) {
            if existing != id {
                return Err(ModelError::duplicate_name(self.kind, new_name));
            }
        }
        self.get_mut(id)?.set_name(new_name);
        Ok(())
    }

    /// All entries, sorted non-decreasing by name.
    pub fn iter_sorted(&self) -> Vec<(K, &T)> {
        let mut entries: Vec<(K, &T)> = self.entries.iter().map(|(id, e)| (*id, e)).collect();
        entries.sort_by(|(_, a), (_, b)| a.name().cmp(b.name()));
        entries
    }

    /// All handles, in no particular order.
    pub fn ids(&self) -> Vec<K> {
        self.entries.keys().copied().collect()
    }

    /// Unordered iteration, for traversals that do not care about names.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    struct TestId(Uuid);

    impl CatalogId for TestId {
        fn generate() -> Self {
            TestId(Uuid::new_v4())
        }
        fn raw(&self) -> Uuid {
            self.0
        }
    }

    impl std::fmt::Display for TestId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    #[derive(Debug, Clone)]
    struct TestEntry {
        name: String,
    }

    impl CatalogEntry for TestEntry {
        fn name(&self) -> &str {
            &self.name
        }
        fn set_name(&mut self, name: String) {
            self.name = name;
        }
    }

    fn entry(name: &str) -> TestEntry {
        TestEntry {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_sorted_iteration_after_adds() {
        let mut arena: NamedArena<TestId, TestEntry> = NamedArena::new(EntityKind::Material);
        arena.insert(entry("C30/37")).unwrap();
        arena.insert(entry("B500")).unwrap();
        arena.insert(entry("C25/30")).unwrap();

        let names: Vec<&str> = arena.iter_sorted().iter().map(|(_, e)| e.name()).collect();
        assert_eq!(names, vec!["B500", "C25/30", "C30/37"]);
    }

    #[test]
    fn test_duplicate_insert_leaves_catalog_unchanged() {
        let mut arena: NamedArena<TestId, TestEntry> = NamedArena::new(EntityKind::Material);
        arena.insert(entry("C25/30")).unwrap();

        let err = arena.insert(entry("C25/30")).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_NAME");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_rename_repositions_and_checks_uniqueness() {
        let mut arena: NamedArena<TestId, TestEntry> = NamedArena::new(EntityKind::Material);
        let a = arena.insert(entry("A")).unwrap();
        arena.insert(entry("M")).unwrap();

        arena.rename(a, "Z").unwrap();
        let names: Vec<&str> = arena.iter_sorted().iter().map(|(_, e)| e.name()).collect();
        assert_eq!(names, vec!["M", "Z"]);

        // renaming onto an existing name fails
        assert!(arena.rename(a, "M").is_err());
        // renaming onto its own name is a no-op, not a clash
        arena.rename(a, "Z").unwrap();
    }

    #[test]
    fn test_find_by_name() {
        let mut arena: NamedArena<TestId, TestEntry> = NamedArena::new(EntityKind::Section);
        let id = arena.insert(entry("IPE 200")).unwrap();
        let (found, _) = arena.find_by_name("IPE 200").unwrap();
        assert_eq!(found, id);
        assert!(arena.find_by_name("ipe 200").is_none());
    }
}
