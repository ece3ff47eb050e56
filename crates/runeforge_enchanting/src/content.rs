//! # Built-in Content
//!
//! Default enchantments, runes and materials. Any of these can be replaced
//! through configuration at startup.

use crate::definition::{Category, EnchantmentDefinition, Rarity};
use crate::equipment::EquipmentClasses;
use crate::material::MaterialBonus;
use crate::rune::RuneDefinition;

/// Plain row used to build the default catalog.
struct Row {
    id: &'static str,
    name: &'static str,
    category: Category,
    rarity: Rarity,
    max_level: u32,
    classes: EquipmentClasses,
    conflicts: &'static [&'static str],
}

const DEFAULTS: &[Row] = &[
    // Combat
    Row { id: "sharpness", name: "Sharpness", category: Category::Combat, rarity: Rarity::Common, max_level: 5, classes: EquipmentClasses::SWORD.union(EquipmentClasses::AXE), conflicts: &["smite", "bane_of_arthropods"] },
    Row { id: "smite", name: "Smite", category: Category::Combat, rarity: Rarity::Uncommon, max_level: 5, classes: EquipmentClasses::SWORD.union(EquipmentClasses::AXE), conflicts: &["sharpness", "bane_of_arthropods"] },
    Row { id: "bane_of_arthropods", name: "Bane of Arthropods", category: Category::Combat, rarity: Rarity::Uncommon, max_level: 5, classes: EquipmentClasses::SWORD.union(EquipmentClasses::AXE), conflicts: &["sharpness", "smite"] },
    Row { id: "fire_aspect", name: "Fire Aspect", category: Category::Combat, rarity: Rarity::Rare, max_level: 2, classes: EquipmentClasses::SWORD, conflicts: &[] },
    Row { id: "lifesteal", name: "Lifesteal", category: Category::Combat, rarity: Rarity::Epic, max_level: 3, classes: EquipmentClasses::WEAPON, conflicts: &[] },
    Row { id: "power", name: "Power", category: Category::Combat, rarity: Rarity::Common, max_level: 5, classes: EquipmentClasses::BOW, conflicts: &[] },
    Row { id: "infinity", name: "Infinity", category: Category::Combat, rarity: Rarity::Legendary, max_level: 1, classes: EquipmentClasses::BOW, conflicts: &["mending"] },
    Row { id: "executioner", name: "Executioner", category: Category::Combat, rarity: Rarity::Mythic, max_level: 5, classes: EquipmentClasses::WEAPON, conflicts: &[] },
    // Tool
    Row { id: "efficiency", name: "Efficiency", category: Category::Tool, rarity: Rarity::Common, max_level: 5, classes: EquipmentClasses::TOOL, conflicts: &[] },
    Row { id: "fortune", name: "Fortune", category: Category::Tool, rarity: Rarity::Rare, max_level: 3, classes: EquipmentClasses::TOOL, conflicts: &["silk_touch"] },
    Row { id: "silk_touch", name: "Silk Touch", category: Category::Tool, rarity: Rarity::Rare, max_level: 1, classes: EquipmentClasses::TOOL, conflicts: &["fortune"] },
    Row { id: "vein_miner", name: "Vein Miner", category: Category::Tool, rarity: Rarity::Epic, max_level: 3, classes: EquipmentClasses::PICKAXE, conflicts: &[] },
    // Protection
    Row { id: "protection", name: "Protection", category: Category::Protection, rarity: Rarity::Common, max_level: 4, classes: EquipmentClasses::ARMOR, conflicts: &["blast_protection", "fire_protection"] },
    Row { id: "blast_protection", name: "Blast Protection", category: Category::Protection, rarity: Rarity::Uncommon, max_level: 4, classes: EquipmentClasses::ARMOR, conflicts: &["protection", "fire_protection"] },
    Row { id: "fire_protection", name: "Fire Protection", category: Category::Protection, rarity: Rarity::Uncommon, max_level: 4, classes: EquipmentClasses::ARMOR, conflicts: &["protection", "blast_protection"] },
    Row { id: "thorns", name: "Thorns", category: Category::Protection, rarity: Rarity::Rare, max_level: 3, classes: EquipmentClasses::ARMOR.union(EquipmentClasses::SHIELD), conflicts: &[] },
    // Utility
    Row { id: "unbreaking", name: "Unbreaking", category: Category::Utility, rarity: Rarity::Common, max_level: 3, classes: EquipmentClasses::all(), conflicts: &[] },
    Row { id: "mending", name: "Mending", category: Category::Utility, rarity: Rarity::Legendary, max_level: 1, classes: EquipmentClasses::all(), conflicts: &["infinity"] },
    Row { id: "feather_falling", name: "Feather Falling", category: Category::Utility, rarity: Rarity::Uncommon, max_level: 4, classes: EquipmentClasses::BOOTS, conflicts: &[] },
    Row { id: "lure", name: "Lure", category: Category::Utility, rarity: Rarity::Common, max_level: 3, classes: EquipmentClasses::FISHING_ROD, conflicts: &[] },
    // Mystical
    Row { id: "arcane_ward", name: "Arcane Ward", category: Category::Mystical, rarity: Rarity::Epic, max_level: 3, classes: EquipmentClasses::ARMOR.union(EquipmentClasses::TRINKET), conflicts: &[] },
    Row { id: "soul_siphon", name: "Soul Siphon", category: Category::Mystical, rarity: Rarity::Legendary, max_level: 3, classes: EquipmentClasses::WEAPON.union(EquipmentClasses::TRINKET), conflicts: &[] },
    // Cursed
    Row { id: "curse_of_binding", name: "Curse of Binding", category: Category::Cursed, rarity: Rarity::Rare, max_level: 1, classes: EquipmentClasses::ARMOR.union(EquipmentClasses::ELYTRA), conflicts: &[] },
    Row { id: "curse_of_vanishing", name: "Curse of Vanishing", category: Category::Cursed, rarity: Rarity::Rare, max_level: 1, classes: EquipmentClasses::all(), conflicts: &[] },
];

/// The built-in enchantment definitions, in registration order.
#[must_use]
pub fn default_definitions() -> Vec<EnchantmentDefinition> {
    DEFAULTS
        .iter()
        .map(|row| EnchantmentDefinition {
            id: row.id.to_string(),
            name: row.name.to_string(),
            category: row.category,
            rarity: row.rarity,
            max_level: row.max_level,
            applicable: row.classes.classes().collect(),
            conflicts: row.conflicts.iter().map(|c| (*c).to_string()).collect(),
        })
        .collect()
}

/// The built-in runes.
#[must_use]
pub fn default_runes() -> Vec<RuneDefinition> {
    vec![
        RuneDefinition::new("blank", 10),
        RuneDefinition::new("arcane", 60),
        RuneDefinition::new("ember", 40).specialized(Category::Combat, 0.05),
        RuneDefinition::new("bulwark", 40).specialized(Category::Protection, 0.05),
        RuneDefinition::new("delver", 40).specialized(Category::Tool, 0.05),
        RuneDefinition::new("wayfarer", 30).specialized(Category::Utility, 0.04),
    ]
}

/// The built-in enhancement materials.
#[must_use]
pub fn default_materials() -> Vec<MaterialBonus> {
    vec![
        MaterialBonus::new("lapis_lazuli", 0.05),
        MaterialBonus::new("amethyst_shard", 0.03).favoring([Category::Mystical], 0.07),
        MaterialBonus::new("echo_shard", 0.05).with_rarity_bonus(0.10),
        MaterialBonus::new("nether_star", 0.10)
            .with_rarity_bonus(0.10)
            .with_level_bonus(1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn test_default_ids_unique_and_valid() {
        let defs = default_definitions();
        let ids: HashSet<&str> = defs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), defs.len());
        assert!(defs.iter().all(|d| d.validate().is_ok()));
    }

    #[test]
    fn test_defaults_cover_every_category_and_rarity() {
        let defs = default_definitions();
        for category in Category::iter() {
            assert!(defs.iter().any(|d| d.category == category), "{category}");
        }
        for rarity in Rarity::iter() {
            assert!(defs.iter().any(|d| d.rarity == rarity), "{rarity}");
        }
    }

    #[test]
    fn test_default_conflicts_reference_known_ids() {
        let defs = default_definitions();
        let ids: HashSet<&str> = defs.iter().map(|d| d.id.as_str()).collect();
        for def in &defs {
            for conflict in &def.conflicts {
                assert!(ids.contains(conflict.as_str()), "{} -> {conflict}", def.id);
            }
        }
    }
}
