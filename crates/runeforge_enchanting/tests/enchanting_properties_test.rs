//! Property tests for the level curve, selection bounds and store semantics.

use std::sync::Arc;

use proptest::prelude::*;
use runeforge_enchanting::{
    level_from_power, slot_count, ActorContext, Category, EnchantingPower, EnchantmentCatalog,
    EnchantmentDefinition, EnchantmentExecutor, EnchantmentSelector, EnchantmentStore, EquipmentClasses,
    ExecutionConfig, Item, MaterialClassifier, Rarity, SeededRandom, SelectionConfig, SelectionRequest, StoreError,
};
use strum::IntoEnumIterator;

fn rarity() -> impl Strategy<Value = Rarity> {
    (0u8..6).prop_map(Rarity::from_u8)
}

fn catalog() -> Arc<EnchantmentCatalog> {
    Arc::new(EnchantmentCatalog::from_definitions([
        EnchantmentDefinition::new("a", "A", Category::Combat, Rarity::Common, 5)
            .unwrap()
            .applies_to(EquipmentClasses::SWORD)
            .conflicts_with(["b"]),
        EnchantmentDefinition::new("b", "B", Category::Combat, Rarity::Rare, 3)
            .unwrap()
            .applies_to(EquipmentClasses::SWORD),
        EnchantmentDefinition::new("c", "C", Category::Utility, Rarity::Epic, 2)
            .unwrap()
            .applies_to(EquipmentClasses::SWORD),
    ]))
}

#[test]
fn test_level_at_required_power_is_max() {
    for rarity in Rarity::iter() {
        for max_level in 1..=10 {
            assert_eq!(level_from_power(rarity.required_power_for_max(), rarity, max_level), max_level);
        }
    }
}

proptest! {
    #[test]
    fn prop_level_curve_monotonic_and_bounded(rarity in rarity(), max_level in 1u32..10, power in 0u32..1000) {
        let here = level_from_power(power, rarity, max_level);
        let next = level_from_power(power + 1, rarity, max_level);
        prop_assert!(here <= next);
        prop_assert!((1..=max_level).contains(&here));
    }

    #[test]
    fn prop_selection_bounds(power in 0u32..1000, seed in any::<u64>()) {
        let selector = EnchantmentSelector::new(
            Arc::new(EnchantmentCatalog::with_defaults()),
            Arc::new(MaterialClassifier::with_defaults()),
            SelectionConfig::default(),
        );
        let item = Item::new("book");
        let actor = ActorContext::default();
        let power = EnchantingPower::from_level(power);
        let request = SelectionRequest { item: &item, power: &power, materials: &[], actor: &actor, unlock: None };
        let mut rng = SeededRandom::new(seed);
        let candidates = selector.select(&request, &mut rng);

        prop_assert!(candidates.len() <= slot_count(power.total_level));
        if let Some(first) = candidates.first() {
            prop_assert!(first.guaranteed);
            prop_assert!((first.probability - 1.0).abs() < f64::EPSILON);
        }
        for c in candidates.iter().skip(1) {
            prop_assert!(!c.guaranteed);
            prop_assert!(c.probability >= 0.05 && c.probability <= 0.95);
            prop_assert!((1..=c.definition.max_level).contains(&c.target_level));
        }

        let applied = EnchantmentExecutor::new(ExecutionConfig::default()).execute(&candidates, &mut rng);
        for a in &applied {
            prop_assert!((1..=a.definition.max_level).contains(&a.final_level));
        }
    }

    #[test]
    fn prop_apply_then_decode(level in 1u32..20) {
        let catalog = catalog();
        let store = EnchantmentStore::new(Arc::clone(&catalog));
        let mut item = Item::new("iron_sword");
        let def = catalog.get("c").unwrap();
        store.apply(&mut item, &def, level).unwrap();
        prop_assert_eq!(store.decode(&item).get("c").copied(), Some(level.min(def.max_level)));

        let second = store.apply(&mut item, &def, level);
        prop_assert_eq!(second, Err(StoreError::AlreadyPresent("c".into())));
    }

    #[test]
    fn prop_upgrade_matches_remove_then_apply(first in 1u32..6, second in 1u32..12) {
        let catalog = catalog();
        let store = EnchantmentStore::new(Arc::clone(&catalog));
        let def = catalog.get("a").unwrap();

        let mut upgraded = Item::new("iron_sword");
        store.apply(&mut upgraded, &def, first).unwrap();
        store.upgrade(&mut upgraded, "a", second).unwrap();

        let mut manual = Item::new("iron_sword");
        store.apply(&mut manual, &def, first).unwrap();
        store.remove(&mut manual, "a");
        store.apply(&mut manual, &def, second.min(def.max_level)).unwrap();

        prop_assert_eq!(upgraded, manual);
    }

    #[test]
    fn prop_conflicts_are_symmetric(la in 1u32..5, lb in 1u32..3) {
        let catalog = catalog();
        let store = EnchantmentStore::new(Arc::clone(&catalog));
        let (a, b) = (catalog.get("a").unwrap(), catalog.get("b").unwrap());

        let mut with_a = Item::new("iron_sword");
        store.apply(&mut with_a, &a, la).unwrap();
        let before = with_a.clone();
        let is_conflict = matches!(store.apply(&mut with_a, &b, lb), Err(StoreError::ConflictDetected { .. }));
        prop_assert!(is_conflict);
        prop_assert_eq!(&with_a, &before);

        let mut with_b = Item::new("iron_sword");
        store.apply(&mut with_b, &b, lb).unwrap();
        let is_conflict = matches!(store.apply(&mut with_b, &a, la), Err(StoreError::ConflictDetected { .. }));
        prop_assert!(is_conflict);
    }
}
