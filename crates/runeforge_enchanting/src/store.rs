//! # Enchantment Store
//!
//! Encodes applied enchantments onto an item's durable record.
//!
//! ## Encoding
//!
//! ```text
//! int records      "runeforge:sharpness" = 3
//!                  "runeforge:unbreaking" = 2
//! description      "✦ Sharpness III"          <- rebuilt after every mutation
//!                  "✦ Unbreaking II"
//!                  "Forged by Alex"           <- host line, preserved
//! marker           enchanted = true while any record exists
//! ```
//!
//! ## Per-enchantment State
//!
//! ```text
//! Absent ──apply──> Present(level) ──upgrade──> Present(level')
//!    ^                    │
//!    └──────remove────────┘          apply on Present is rejected
//! ```
//!
//! A rejected operation leaves the record untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use runeforge_shared::constants::{DESCRIPTION_MARKER, RECORD_NAMESPACE};

use crate::catalog::{CatalogSnapshot, EnchantmentCatalog};
use crate::definition::EnchantmentDefinition;
use crate::error::{StoreError, StoreResult};
use crate::executor::AppliedEnchantment;
use crate::record::DurableRecord;

/// Result of one entry of [`EnchantmentStore::apply_all`].
#[derive(Clone, Debug, PartialEq)]
pub struct ApplyOutcome {
    /// Enchantment id.
    pub id: String,
    /// Level that was requested.
    pub level: u32,
    /// What happened.
    pub result: StoreResult<()>,
}

impl ApplyOutcome {
    /// True if the entry was written.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }
}

/// Record key for an enchantment id.
#[must_use]
pub fn record_key(id: &str) -> String {
    format!("{RECORD_NAMESPACE}:{id}")
}

fn id_from_key(key: &str) -> Option<&str> {
    key.strip_prefix(RECORD_NAMESPACE)?.strip_prefix(':')
}

/// Upper-case Roman numeral for `1..=3999`, decimal otherwise.
#[must_use]
pub fn roman_numeral(value: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    if value == 0 || value >= 4000 {
        return value.to_string();
    }
    let mut remaining = value;
    let mut out = String::new();
    for (amount, numeral) in TABLE {
        while remaining >= amount {
            out.push_str(numeral);
            remaining -= amount;
        }
    }
    out
}

/// Reads and writes enchantments on items.
#[derive(Clone, Debug)]
pub struct EnchantmentStore {
    catalog: Arc<EnchantmentCatalog>,
}

impl EnchantmentStore {
    /// Creates a store backed by `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<EnchantmentCatalog>) -> Self {
        Self { catalog }
    }

    /// Writes `definition` at `level` onto `item`.
    ///
    /// Levels above the definition's max are clamped.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidArgument`] for a zero level or invalid definition
    /// - [`StoreError::ConflictDetected`] if an exclusive enchantment is present
    /// - [`StoreError::AlreadyPresent`] if this id is already present
    pub fn apply<R: DurableRecord + ?Sized>(
        &self,
        item: &mut R,
        definition: &EnchantmentDefinition,
        level: u32,
    ) -> StoreResult<()> {
        if level == 0 {
            return Err(StoreError::InvalidArgument(format!(
                "level for {} must be positive",
                definition.id
            )));
        }
        definition
            .validate()
            .map_err(|e| StoreError::InvalidArgument(e.to_string()))?;

        let snapshot = self.catalog.snapshot();
        let present = decode_record(item);

        for existing in present.keys() {
            if existing == &definition.id {
                continue;
            }
            let listed_by_existing = snapshot
                .get(existing)
                .is_some_and(|other| other.conflicts_with_id(&definition.id));
            if definition.conflicts_with_id(existing) || listed_by_existing {
                return Err(StoreError::ConflictDetected {
                    id: definition.id.clone(),
                    existing: existing.clone(),
                });
            }
        }
        if present.contains_key(&definition.id) {
            return Err(StoreError::AlreadyPresent(definition.id.clone()));
        }

        let level = level.min(definition.max_level);
        item.set_int(&record_key(&definition.id), i64::from(level));
        rebuild_description(item, &snapshot);
        Ok(())
    }

    /// Looks up `id` in the catalog and applies it.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidArgument`] if the id is unknown, otherwise as [`Self::apply`].
    pub fn apply_by_id<R: DurableRecord + ?Sized>(&self, item: &mut R, id: &str, level: u32) -> StoreResult<()> {
        let definition = self
            .catalog
            .get(id)
            .ok_or_else(|| StoreError::InvalidArgument(format!("unknown enchantment {id}")))?;
        self.apply(item, &definition, level)
    }

    /// Applies an executor result in order. Rejections do not stop the rest.
    pub fn apply_all<R: DurableRecord + ?Sized>(
        &self,
        item: &mut R,
        applied: &[AppliedEnchantment],
    ) -> Vec<ApplyOutcome> {
        applied
            .iter()
            .map(|entry| {
                let result = self.apply(item, &entry.definition, entry.final_level);
                if let Err(err) = &result {
                    tracing::warn!(id = %entry.definition.id, level = entry.final_level, %err, "enchantment rejected");
                }
                ApplyOutcome {
                    id: entry.definition.id.clone(),
                    level: entry.final_level,
                    result,
                }
            })
            .collect()
    }

    /// All stored enchantments. Non-positive levels are ignored.
    #[must_use]
    pub fn decode<R: DurableRecord + ?Sized>(&self, item: &R) -> BTreeMap<String, u32> {
        decode_record(item)
    }

    /// Stored level of `id`, 0 if absent.
    #[must_use]
    pub fn level_of<R: DurableRecord + ?Sized>(&self, item: &R, id: &str) -> u32 {
        item.get_int(&record_key(id))
            .and_then(|level| u32::try_from(level).ok())
            .unwrap_or(0)
    }

    /// True if any enchantment is stored.
    #[must_use]
    pub fn has_any<R: DurableRecord + ?Sized>(&self, item: &R) -> bool {
        !decode_record(item).is_empty()
    }

    /// Removes `id`. Returns true if it was present.
    pub fn remove<R: DurableRecord + ?Sized>(&self, item: &mut R, id: &str) -> bool {
        let key = record_key(id);
        let was_present = item.get_int(&key).is_some();
        item.remove_int(&key);
        rebuild_description(item, &self.catalog.snapshot());
        was_present
    }

    /// Replaces `id` at `new_level` (clamped to max).
    ///
    /// Returns `Ok(false)` without touching the item if `id` is not in the
    /// catalog.
    ///
    /// # Errors
    ///
    /// As [`Self::apply`]. On error the previous level is restored.
    pub fn upgrade<R: DurableRecord + ?Sized>(&self, item: &mut R, id: &str, new_level: u32) -> StoreResult<bool> {
        let Some(definition) = self.catalog.get(id) else {
            tracing::debug!(id, "upgrade of unknown enchantment ignored");
            return Ok(false);
        };
        if new_level == 0 {
            return Err(StoreError::InvalidArgument(format!("level for {id} must be positive")));
        }

        let key = record_key(id);
        let previous = item.get_int(&key);
        item.remove_int(&key);

        if let Err(err) = self.apply(item, &definition, new_level.min(definition.max_level)) {
            if let Some(level) = previous {
                item.set_int(&key, level);
            }
            rebuild_description(item, &self.catalog.snapshot());
            return Err(err);
        }
        Ok(true)
    }

    /// Removes every stored enchantment.
    pub fn clear_all<R: DurableRecord + ?Sized>(&self, item: &mut R) {
        for key in item.int_keys() {
            if id_from_key(&key).is_some() {
                item.remove_int(&key);
            }
        }
        rebuild_description(item, &self.catalog.snapshot());
    }

    /// Rebuilds the description block from the stored records.
    pub fn refresh<R: DurableRecord + ?Sized>(&self, item: &mut R) {
        rebuild_description(item, &self.catalog.snapshot());
    }
}

fn decode_record<R: DurableRecord + ?Sized>(item: &R) -> BTreeMap<String, u32> {
    item.int_keys()
        .into_iter()
        .filter_map(|key| {
            let id = id_from_key(&key)?;
            let level = u32::try_from(item.get_int(&key)?).ok().filter(|&l| l > 0)?;
            Some((id.to_string(), level))
        })
        .collect()
}

fn rebuild_description<R: DurableRecord + ?Sized>(item: &mut R, snapshot: &CatalogSnapshot) {
    let mut entries: Vec<(String, u32)> = decode_record(item).into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| match (snapshot.rank(a), snapshot.rank(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.cmp(b),
    });

    let mut lines: Vec<String> = entries
        .iter()
        .map(|(id, level)| match snapshot.get(id) {
            Some(def) if def.max_level == 1 => format!("{DESCRIPTION_MARKER}{}", def.name),
            Some(def) => format!("{DESCRIPTION_MARKER}{} {}", def.name, roman_numeral(*level)),
            None => format!("{DESCRIPTION_MARKER}{id} {}", roman_numeral(*level)),
        })
        .collect();
    lines.extend(
        item.description()
            .into_iter()
            .filter(|line| !line.starts_with(DESCRIPTION_MARKER)),
    );

    item.set_description(lines);
    item.set_enchanted_marker(!entries.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{Category, Rarity};
    use crate::record::Item;

    fn setup() -> (EnchantmentStore, Arc<EnchantmentCatalog>) {
        let catalog = Arc::new(EnchantmentCatalog::from_definitions([
            EnchantmentDefinition::new("sharpness", "Sharpness", Category::Combat, Rarity::Common, 5)
                .unwrap()
                .conflicts_with(["smite"]),
            EnchantmentDefinition::new("smite", "Smite", Category::Combat, Rarity::Common, 5).unwrap(),
            EnchantmentDefinition::new("unbreaking", "Unbreaking", Category::Utility, Rarity::Common, 3).unwrap(),
            EnchantmentDefinition::new("mending", "Mending", Category::Utility, Rarity::Legendary, 1).unwrap(),
        ]));
        (EnchantmentStore::new(Arc::clone(&catalog)), catalog)
    }

    #[test]
    fn test_apply_and_decode() {
        let (store, catalog) = setup();
        let mut item = Item::new("iron_sword");
        store.apply(&mut item, &catalog.get("sharpness").unwrap(), 3).unwrap();

        assert_eq!(store.decode(&item).get("sharpness"), Some(&3));
        assert_eq!(store.level_of(&item, "sharpness"), 3);
        assert_eq!(store.level_of(&item, "smite"), 0);
        assert!(item.enchanted_marker());
        assert_eq!(item.get_int("runeforge:sharpness"), Some(3));
    }

    #[test]
    fn test_apply_twice_rejected() {
        let (store, catalog) = setup();
        let mut item = Item::new("iron_sword");
        let sharpness = catalog.get("sharpness").unwrap();
        store.apply(&mut item, &sharpness, 2).unwrap();
        assert_eq!(
            store.apply(&mut item, &sharpness, 3),
            Err(StoreError::AlreadyPresent("sharpness".into()))
        );
        assert_eq!(store.decode(&item).get("sharpness"), Some(&2));
    }

    #[test]
    fn test_conflicts_both_directions() {
        let (store, catalog) = setup();
        let sharpness = catalog.get("sharpness").unwrap();
        let smite = catalog.get("smite").unwrap();

        let mut item = Item::new("iron_sword");
        store.apply(&mut item, &sharpness, 1).unwrap();
        let before = item.clone();
        assert!(matches!(
            store.apply(&mut item, &smite, 1),
            Err(StoreError::ConflictDetected { .. })
        ));
        assert_eq!(item, before);

        // smite does not list sharpness, but the reverse check still rejects.
        let mut item = Item::new("iron_sword");
        store.apply(&mut item, &smite, 1).unwrap();
        assert_eq!(
            store.apply(&mut item, &sharpness, 1),
            Err(StoreError::ConflictDetected {
                id: "sharpness".into(),
                existing: "smite".into()
            })
        );
    }

    #[test]
    fn test_invalid_arguments() {
        let (store, catalog) = setup();
        let mut item = Item::new("iron_sword");
        assert!(matches!(
            store.apply(&mut item, &catalog.get("smite").unwrap(), 0),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(matches!(
            store.apply_by_id(&mut item, "ghost", 1),
            Err(StoreError::InvalidArgument(_))
        ));
        assert!(!store.has_any(&item));
    }

    #[test]
    fn test_level_clamped_to_max() {
        let (store, _) = setup();
        let mut item = Item::new("iron_sword");
        store.apply_by_id(&mut item, "unbreaking", 10).unwrap();
        assert_eq!(store.level_of(&item, "unbreaking"), 3);
    }

    #[test]
    fn test_remove_clears_marker_when_empty() {
        let (store, _) = setup();
        let mut item = Item::new("iron_sword");
        store.apply_by_id(&mut item, "smite", 2).unwrap();
        store.apply_by_id(&mut item, "unbreaking", 1).unwrap();

        assert!(store.remove(&mut item, "smite"));
        assert!(item.enchanted_marker());
        assert!(!store.remove(&mut item, "smite"));

        store.remove(&mut item, "unbreaking");
        assert!(!item.enchanted_marker());
        assert!(item.description().is_empty());
    }

    #[test]
    fn test_upgrade() {
        let (store, _) = setup();
        let mut item = Item::new("iron_sword");
        store.apply_by_id(&mut item, "smite", 1).unwrap();
        assert_eq!(store.upgrade(&mut item, "smite", 9), Ok(true));
        assert_eq!(store.level_of(&item, "smite"), 5);

        let before = item.clone();
        assert_eq!(store.upgrade(&mut item, "ghost", 2), Ok(false));
        assert_eq!(item, before);
    }

    #[test]
    fn test_failed_upgrade_restores_previous() {
        let (store, _) = setup();
        let mut item = Item::new("iron_sword");
        store.apply_by_id(&mut item, "smite", 2).unwrap();
        // Not present, conflicts with smite.
        assert!(store.upgrade(&mut item, "sharpness", 3).is_err());
        assert_eq!(store.decode(&item).len(), 1);
        assert_eq!(store.level_of(&item, "smite"), 2);
    }

    #[test]
    fn test_clear_all_keeps_foreign_records() {
        let (store, _) = setup();
        let mut item = Item::new("iron_sword");
        item.set_int("host:durability", 120);
        store.apply_by_id(&mut item, "smite", 2).unwrap();
        store.apply_by_id(&mut item, "unbreaking", 2).unwrap();

        store.clear_all(&mut item);
        assert!(!store.has_any(&item));
        assert!(!item.enchanted_marker());
        assert_eq!(item.get_int("host:durability"), Some(120));
    }

    #[test]
    fn test_non_positive_levels_ignored() {
        let (store, _) = setup();
        let mut item = Item::new("iron_sword");
        item.set_int("runeforge:smite", 0);
        item.set_int("runeforge:unbreaking", -2);
        assert!(store.decode(&item).is_empty());
        assert!(!store.has_any(&item));
    }

    #[test]
    fn test_description_ordering_and_host_lines() {
        let (store, _) = setup();
        let mut item = Item::new("iron_sword").with_description_line("Forged by Alex");
        store.apply_by_id(&mut item, "mending", 1).unwrap();
        store.apply_by_id(&mut item, "smite", 4).unwrap();
        item.set_int("runeforge:zeal", 2);
        store.refresh(&mut item);

        let expected = vec![
            format!("{DESCRIPTION_MARKER}Smite IV"),
            format!("{DESCRIPTION_MARKER}Mending"),
            format!("{DESCRIPTION_MARKER}zeal II"),
            "Forged by Alex".to_string(),
        ];
        assert_eq!(item.description(), expected);

        store.refresh(&mut item);
        assert_eq!(item.description(), expected);
    }

    #[test]
    fn test_apply_all_reports_rejections() {
        let (store, catalog) = setup();
        let mut item = Item::new("iron_sword");
        let applied = vec![
            AppliedEnchantment { definition: catalog.get("smite").unwrap(), final_level: 2 },
            AppliedEnchantment { definition: catalog.get("sharpness").unwrap(), final_level: 2 },
            AppliedEnchantment { definition: catalog.get("unbreaking").unwrap(), final_level: 1 },
        ];
        let outcomes = store.apply_all(&mut item, &applied);
        let applied_flags: Vec<bool> = outcomes.iter().map(ApplyOutcome::is_applied).collect();
        assert_eq!(applied_flags, vec![true, false, true]);
        assert_eq!(store.decode(&item).len(), 2);
    }

    #[test]
    fn test_roman_numerals() {
        assert_eq!(roman_numeral(1), "I");
        assert_eq!(roman_numeral(4), "IV");
        assert_eq!(roman_numeral(9), "IX");
        assert_eq!(roman_numeral(14), "XIV");
        assert_eq!(roman_numeral(0), "0");
        assert_eq!(roman_numeral(5000), "5000");
    }
}
