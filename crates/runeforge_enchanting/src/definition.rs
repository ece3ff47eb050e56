//! # Enchantment Definitions
//!
//! Immutable description of an enchantment: its category, rarity tier,
//! level cap, the equipment it can go on, and what it cannot coexist with.
//!
//! ## Rarity Table
//!
//! ```text
//! Rarity     ord  cost  weight  min power  power for max level
//! Common      0   1.0    1.0        1            60
//! Uncommon    1   1.5    0.8        5           100
//! Rare        2   2.0    0.6       15           250
//! Epic        3   3.0    0.4       25           500
//! Legendary   4   5.0    0.2       40           750
//! Mythic      5   8.0    0.1       60           900
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::equipment::{EquipmentClass, EquipmentClasses};
use crate::error::CatalogError;

/// Rarity tier of an enchantment.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Rarity {
    /// Everyday enchantments
    Common = 0,
    /// Slightly harder to find
    Uncommon = 1,
    /// Needs a real library
    Rare = 2,
    /// Needs runes
    Epic = 3,
    /// Late-game
    Legendary = 4,
    /// Near the power ceiling
    Mythic = 5,
}

impl Rarity {
    /// Position in the tier order (Common = 0).
    #[inline]
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Experience cost multiplier per level.
    #[inline]
    #[must_use]
    pub const fn cost_multiplier(self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Uncommon => 1.5,
            Self::Rare => 2.0,
            Self::Epic => 3.0,
            Self::Legendary => 5.0,
            Self::Mythic => 8.0,
        }
    }

    /// Base weight in the selection lottery.
    #[inline]
    #[must_use]
    pub const fn selection_weight(self) -> f64 {
        match self {
            Self::Common => 1.0,
            Self::Uncommon => 0.8,
            Self::Rare => 0.6,
            Self::Epic => 0.4,
            Self::Legendary => 0.2,
            Self::Mythic => 0.1,
        }
    }

    /// Minimum enchanting power before this tier can be offered.
    #[inline]
    #[must_use]
    pub const fn min_power(self) -> u32 {
        match self {
            Self::Common => 1,
            Self::Uncommon => 5,
            Self::Rare => 15,
            Self::Epic => 25,
            Self::Legendary => 40,
            Self::Mythic => 60,
        }
    }

    /// Power at which the level curve saturates at max level.
    #[inline]
    #[must_use]
    pub const fn required_power_for_max(self) -> u32 {
        match self {
            Self::Common => 60,
            Self::Uncommon => 100,
            Self::Rare => 250,
            Self::Epic => 500,
            Self::Legendary => 750,
            Self::Mythic => 900,
        }
    }

    /// Base success chance before power, level and material modifiers.
    #[inline]
    #[must_use]
    pub const fn base_success_rate(self) -> f64 {
        match self {
            Self::Common => 0.8,
            Self::Uncommon => 0.7,
            Self::Rare => 0.6,
            Self::Epic => 0.5,
            Self::Legendary => 0.4,
            Self::Mythic => 0.3,
        }
    }

    /// Converts from u8 to Rarity.
    #[inline]
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Common,
            1 => Self::Uncommon,
            2 => Self::Rare,
            3 => Self::Epic,
            4 => Self::Legendary,
            _ => Self::Mythic,
        }
    }
}

/// Thematic grouping of an enchantment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Damage dealing
    Combat,
    /// Gathering and mining
    Tool,
    /// Damage mitigation
    Protection,
    /// Quality of life
    Utility,
    /// Arcane effects
    Mystical,
    /// Drawbacks
    Cursed,
}

/// An enchantment as registered in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnchantmentDefinition {
    /// Globally unique identifier (also the persistence key).
    pub id: String,
    /// Human-readable name used in item descriptions.
    pub name: String,
    /// Thematic category.
    pub category: Category,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Highest level this enchantment can reach.
    pub max_level: u32,
    /// Equipment classes that accept this enchantment.
    #[serde(default)]
    pub applicable: Vec<EquipmentClass>,
    /// Ids that may never coexist with this one on an item.
    #[serde(default)]
    pub conflicts: Vec<String>,
}

impl EnchantmentDefinition {
    /// Creates a definition with basic validation.
    ///
    /// The definition starts with no applicable equipment and no conflicts.
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty or `max_level` is zero.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        rarity: Rarity,
        max_level: u32,
    ) -> Result<Self, CatalogError> {
        let definition = Self {
            id: id.into(),
            name: name.into(),
            category,
            rarity,
            max_level,
            applicable: Vec::new(),
            conflicts: Vec::new(),
        };
        definition.validate()?;
        Ok(definition)
    }

    /// Sets the applicable equipment classes.
    #[must_use]
    pub fn applies_to(mut self, classes: EquipmentClasses) -> Self {
        self.applicable = classes.classes().collect();
        self
    }

    /// Adds conflicting ids.
    #[must_use]
    pub fn conflicts_with<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            let id = id.into();
            if !self.conflicts.contains(&id) {
                self.conflicts.push(id);
            }
        }
        self
    }

    /// Checks the structural invariants of a single definition.
    ///
    /// # Errors
    ///
    /// Returns error if the id is empty or `max_level` is zero.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.id.trim().is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if self.max_level == 0 {
            return Err(CatalogError::InvalidMaxLevel {
                id: self.id.clone(),
                max_level: self.max_level,
            });
        }
        Ok(())
    }

    /// Equipment classes as a set.
    #[must_use]
    pub fn applicable_classes(&self) -> EquipmentClasses {
        self.applicable.iter().copied().collect()
    }

    /// True if this definition lists `other_id` as a conflict.
    #[must_use]
    pub fn conflicts_with_id(&self, other_id: &str) -> bool {
        self.conflicts.iter().any(|c| c == other_id)
    }

    /// True if either definition lists the other as a conflict.
    #[must_use]
    pub fn is_exclusive_with(&self, other: &Self) -> bool {
        self.conflicts_with_id(&other.id) || other.conflicts_with_id(&self.id)
    }

    /// Clamps a level into `1..=max_level`.
    #[inline]
    #[must_use]
    pub fn clamp_level(&self, level: u32) -> u32 {
        level.clamp(1, self.max_level.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_rarity_order() {
        let tiers: Vec<Rarity> = Rarity::iter().collect();
        assert!(tiers.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Rarity::from_u8(3), Rarity::Epic);
        assert_eq!(Rarity::from_u8(200), Rarity::Mythic);
    }

    #[test]
    fn test_base_success_rate_steps_down_by_tenth() {
        for rarity in Rarity::iter() {
            let expected = 0.8 - f64::from(rarity.ordinal()) * 0.1;
            assert!((rarity.base_success_rate() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_requirements_grow_with_rarity() {
        let tiers: Vec<Rarity> = Rarity::iter().collect();
        for pair in tiers.windows(2) {
            assert!(pair[0].min_power() < pair[1].min_power());
            assert!(pair[0].required_power_for_max() < pair[1].required_power_for_max());
            assert!(pair[0].selection_weight() > pair[1].selection_weight());
        }
    }

    #[test]
    fn test_definition_validation() {
        assert_eq!(
            EnchantmentDefinition::new("", "Nothing", Category::Utility, Rarity::Common, 1),
            Err(CatalogError::EmptyId)
        );
        assert!(matches!(
            EnchantmentDefinition::new("zero", "Zero", Category::Utility, Rarity::Common, 0),
            Err(CatalogError::InvalidMaxLevel { .. })
        ));
    }

    #[test]
    fn test_exclusive_is_checked_both_ways() {
        let a = EnchantmentDefinition::new("a", "A", Category::Combat, Rarity::Common, 3)
            .unwrap()
            .conflicts_with(["b"]);
        let b = EnchantmentDefinition::new("b", "B", Category::Combat, Rarity::Common, 3).unwrap();
        assert!(a.is_exclusive_with(&b));
        assert!(b.is_exclusive_with(&a));
        assert!(!b.conflicts_with_id("a"));
    }

    #[test]
    fn test_conflicts_deduplicated() {
        let a = EnchantmentDefinition::new("a", "A", Category::Combat, Rarity::Common, 3)
            .unwrap()
            .conflicts_with(["b", "b", "c"]);
        assert_eq!(a.conflicts, vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_clamp_level() {
        let a = EnchantmentDefinition::new("a", "A", Category::Combat, Rarity::Common, 3).unwrap();
        assert_eq!(a.clamp_level(0), 1);
        assert_eq!(a.clamp_level(2), 2);
        assert_eq!(a.clamp_level(9), 3);
    }
}
