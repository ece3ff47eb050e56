//! # Enchantment Catalog
//!
//! **Copy-on-write registry of enchantment definitions**
//!
//! The catalog is read on every enchant action and written only by
//! administrative commands (startup load, hot reload, removal). Readers
//! never hold a lock while they work:
//!
//! ```text
//! reader:  lock ─> clone Arc<Snapshot> ─> unlock ─> filter/iterate freely
//! writer:  lock ─> clone snapshot ─> mutate copy ─> swap Arc ─> unlock
//! ```
//!
//! A snapshot taken before a write stays valid and unchanged after it.
//!
//! Definitions are kept in registration order. Weighted selection walks
//! the pool in this order, so the order is part of the deterministic
//! contract.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::content;
use crate::definition::{Category, EnchantmentDefinition, Rarity};
use crate::equipment::{EquipmentClasses, EquipmentClassifier};
use crate::error::CatalogError;
use crate::record::Item;

/// Immutable view of the catalog at one point in time.
#[derive(Clone, Debug, Default)]
pub struct CatalogSnapshot {
    /// Definitions in registration order.
    order: Vec<Arc<EnchantmentDefinition>>,
    /// Position of each id in `order`.
    index: HashMap<String, usize>,
}

impl CatalogSnapshot {
    /// Looks up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Arc<EnchantmentDefinition>> {
        self.index.get(id).map(|&i| &self.order[i])
    }

    /// Iterates definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<EnchantmentDefinition>> {
        self.order.iter()
    }

    /// Registration position of an id.
    #[must_use]
    pub fn rank(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the snapshot holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .order
            .iter()
            .enumerate()
            .map(|(i, def)| (def.id.clone(), i))
            .collect();
    }
}

/// The enchantment catalog.
///
/// Explicitly constructed and passed to consumers (usually behind an
/// `Arc`). There is no process-wide instance.
#[derive(Debug, Default)]
pub struct EnchantmentCatalog {
    /// Current snapshot. Swapped whole on every write.
    snapshot: RwLock<Arc<CatalogSnapshot>>,
}

impl EnchantmentCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog seeded with the built-in definitions.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::from_definitions(content::default_definitions())
    }

    /// Creates a catalog from definitions, in order.
    ///
    /// Later duplicates overwrite earlier ones (see [`Self::register`]).
    #[must_use]
    pub fn from_definitions(definitions: impl IntoIterator<Item = EnchantmentDefinition>) -> Self {
        let mut snapshot = CatalogSnapshot::default();
        for definition in definitions {
            Self::insert_into(&mut snapshot, Arc::new(definition));
        }
        Self {
            snapshot: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Registers a definition, overwriting any definition with the same id.
    ///
    /// An overwrite keeps the original registration position and returns
    /// the definition it replaced.
    pub fn register(&self, definition: EnchantmentDefinition) -> Option<Arc<EnchantmentDefinition>> {
        let definition = Arc::new(definition);
        let mut guard = self.snapshot.write();
        let mut next = CatalogSnapshot::clone(&guard);
        let previous = Self::insert_into(&mut next, Arc::clone(&definition));
        *guard = Arc::new(next);
        drop(guard);

        if previous.is_some() {
            tracing::warn!(id = %definition.id, "enchantment definition overwritten");
        } else {
            tracing::debug!(id = %definition.id, rarity = %definition.rarity, "enchantment registered");
        }
        previous
    }

    /// Removes a definition. Returns it if it was present.
    pub fn remove(&self, id: &str) -> Option<Arc<EnchantmentDefinition>> {
        let mut guard = self.snapshot.write();
        let position = guard.rank(id)?;
        let mut next = CatalogSnapshot::clone(&guard);
        let removed = next.order.remove(position);
        next.rebuild_index();
        *guard = Arc::new(next);
        drop(guard);

        tracing::info!(id = %removed.id, "enchantment removed from catalog");
        Some(removed)
    }

    /// Gets a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<EnchantmentDefinition>> {
        self.snapshot().get(id).cloned()
    }

    /// True if the id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.snapshot.read().index.contains_key(id)
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<EnchantmentDefinition>> {
        self.snapshot().order.clone()
    }

    /// Definitions in a category.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<Arc<EnchantmentDefinition>> {
        self.filtered(|def| def.category == category)
    }

    /// Definitions of a rarity.
    #[must_use]
    pub fn by_rarity(&self, rarity: Rarity) -> Vec<Arc<EnchantmentDefinition>> {
        self.filtered(|def| def.rarity == rarity)
    }

    /// Definitions that can go on `item`.
    #[must_use]
    pub fn applicable_to(
        &self,
        item: &Item,
        classifier: &dyn EquipmentClassifier,
    ) -> Vec<Arc<EnchantmentDefinition>> {
        self.applicable_to_classes(classifier.classify(item))
    }

    /// Definitions that accept any of `classes`.
    #[must_use]
    pub fn applicable_to_classes(&self, classes: EquipmentClasses) -> Vec<Arc<EnchantmentDefinition>> {
        if classes.is_empty() {
            return Vec::new();
        }
        self.filtered(|def| def.applicable_classes().overlaps(classes))
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.read().is_empty()
    }

    /// Pairs `(a, b)` where `a` lists `b` as a conflict but `b` does not list `a`.
    ///
    /// Conflicts naming ids that are not registered are ignored.
    #[must_use]
    pub fn asymmetric_conflicts(&self) -> Vec<(String, String)> {
        let snapshot = self.snapshot();
        let mut pairs = Vec::new();
        for def in snapshot.iter() {
            for other_id in &def.conflicts {
                if let Some(other) = snapshot.get(other_id) {
                    if !other.conflicts_with_id(&def.id) {
                        pairs.push((def.id.clone(), other_id.clone()));
                    }
                }
            }
        }
        pairs
    }

    /// Checks every definition and the symmetry of conflicts.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem or asymmetric conflict found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for def in self.snapshot().iter() {
            def.validate()?;
        }
        if let Some((id, other)) = self.asymmetric_conflicts().into_iter().next() {
            return Err(CatalogError::AsymmetricConflict { id, other });
        }
        Ok(())
    }

    fn filtered(&self, keep: impl Fn(&EnchantmentDefinition) -> bool) -> Vec<Arc<EnchantmentDefinition>> {
        self.snapshot()
            .iter()
            .filter(|def| keep(def))
            .cloned()
            .collect()
    }

    fn insert_into(
        snapshot: &mut CatalogSnapshot,
        definition: Arc<EnchantmentDefinition>,
    ) -> Option<Arc<EnchantmentDefinition>> {
        if let Some(&position) = snapshot.index.get(&definition.id) {
            Some(std::mem::replace(&mut snapshot.order[position], definition))
        } else {
            snapshot.index.insert(definition.id.clone(), snapshot.order.len());
            snapshot.order.push(definition);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::MaterialClassifier;

    fn def(id: &str, rarity: Rarity, classes: EquipmentClasses) -> EnchantmentDefinition {
        EnchantmentDefinition::new(id, id, Category::Combat, rarity, 3)
            .unwrap()
            .applies_to(classes)
    }

    #[test]
    fn test_register_and_get() {
        let catalog = EnchantmentCatalog::new();
        assert!(catalog.register(def("a", Rarity::Common, EquipmentClasses::SWORD)).is_none());
        assert_eq!(catalog.get("a").unwrap().id, "a");
        assert!(catalog.get("missing").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_overwrite_keeps_position_and_returns_previous() {
        let catalog = EnchantmentCatalog::new();
        catalog.register(def("a", Rarity::Common, EquipmentClasses::SWORD));
        catalog.register(def("b", Rarity::Common, EquipmentClasses::SWORD));

        let previous = catalog.register(def("a", Rarity::Epic, EquipmentClasses::SWORD));
        assert_eq!(previous.unwrap().rarity, Rarity::Common);
        assert_eq!(catalog.get("a").unwrap().rarity, Rarity::Epic);

        let ids: Vec<String> = catalog.all().iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_writes() {
        let catalog = EnchantmentCatalog::new();
        catalog.register(def("a", Rarity::Common, EquipmentClasses::SWORD));
        let before = catalog.snapshot();

        catalog.register(def("b", Rarity::Common, EquipmentClasses::SWORD));
        catalog.remove("a");

        assert_eq!(before.len(), 1);
        assert!(before.get("a").is_some());
        assert!(catalog.get("a").is_none());
        assert_eq!(catalog.snapshot().rank("b"), Some(0));
    }

    #[test]
    fn test_filters() {
        let catalog = EnchantmentCatalog::new();
        catalog.register(def("blade", Rarity::Common, EquipmentClasses::SWORD));
        catalog.register(def("plate", Rarity::Rare, EquipmentClasses::ARMOR));

        assert_eq!(catalog.by_rarity(Rarity::Rare).len(), 1);
        assert_eq!(catalog.by_category(Category::Combat).len(), 2);
        assert_eq!(catalog.by_category(Category::Cursed).len(), 0);

        let classifier = MaterialClassifier::with_defaults();
        let sword = catalog.applicable_to(&Item::new("iron_sword"), &classifier);
        assert_eq!(sword.len(), 1);
        assert_eq!(sword[0].id, "blade");
        assert!(catalog.applicable_to(&Item::new("dirt"), &classifier).is_empty());
    }

    #[test]
    fn test_remove_missing_is_none() {
        let catalog = EnchantmentCatalog::new();
        assert!(catalog.remove("ghost").is_none());
    }

    #[test]
    fn test_asymmetric_conflicts_reported() {
        let catalog = EnchantmentCatalog::new();
        catalog.register(def("a", Rarity::Common, EquipmentClasses::SWORD).conflicts_with(["b"]));
        catalog.register(def("b", Rarity::Common, EquipmentClasses::SWORD));

        assert_eq!(
            catalog.asymmetric_conflicts(),
            vec![("a".to_string(), "b".to_string())]
        );
        assert_eq!(
            catalog.validate(),
            Err(CatalogError::AsymmetricConflict {
                id: "a".into(),
                other: "b".into()
            })
        );
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = EnchantmentCatalog::with_defaults();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.validate(), Ok(()));
    }

    #[test]
    fn test_concurrent_reads_during_writes() {
        let catalog = Arc::new(EnchantmentCatalog::with_defaults());
        let initial = catalog.len();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let catalog = Arc::clone(&catalog);
                std::thread::spawn(move || {
                    for _ in 0..1_000 {
                        let snapshot = catalog.snapshot();
                        assert!(snapshot.len() >= initial);
                        assert!(snapshot.iter().all(|d| snapshot.get(&d.id).is_some()));
                    }
                })
            })
            .collect();

        for i in 0..100 {
            catalog.register(def(&format!("extra_{i}"), Rarity::Common, EquipmentClasses::SWORD));
        }

        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(catalog.len(), initial + 100);
    }
}
