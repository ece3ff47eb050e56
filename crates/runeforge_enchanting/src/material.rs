//! # Enhancement Materials
//!
//! Materials a player holds while enchanting. Each recognized material
//! carries a [`MaterialBonus`] that raises success chances and may raise
//! rolled levels.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::content;
use crate::definition::{Category, EnchantmentDefinition, Rarity};

/// Bonus granted by one enhancement material.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialBonus {
    /// Material id this bonus belongs to.
    pub material: String,
    /// Flat success bonus for every candidate.
    pub success_rate_bonus: f64,
    /// Extra success bonus for Rare and above.
    pub rarity_bonus: f64,
    /// Categories that get `per_category_bonus`.
    pub favored_categories: Vec<Category>,
    /// Success bonus for favored categories.
    pub per_category_bonus: f64,
    /// Added to every candidate's rolled level.
    pub level_bonus: u32,
}

impl MaterialBonus {
    /// Creates a bonus with only a flat success bonus.
    #[must_use]
    pub fn new(material: impl Into<String>, success_rate_bonus: f64) -> Self {
        Self {
            material: material.into(),
            success_rate_bonus,
            ..Self::default()
        }
    }

    /// Sets the bonus for Rare and above.
    #[must_use]
    pub fn with_rarity_bonus(mut self, bonus: f64) -> Self {
        self.rarity_bonus = bonus;
        self
    }

    /// Sets favored categories and their bonus.
    #[must_use]
    pub fn favoring(mut self, categories: impl IntoIterator<Item = Category>, bonus: f64) -> Self {
        self.favored_categories = categories.into_iter().collect();
        self.per_category_bonus = bonus;
        self
    }

    /// Sets the level bonus.
    #[must_use]
    pub fn with_level_bonus(mut self, levels: u32) -> Self {
        self.level_bonus = levels;
        self
    }

    /// Success bonus this material grants to one definition.
    #[must_use]
    pub fn success_bonus_for(&self, definition: &EnchantmentDefinition) -> f64 {
        let mut bonus = self.success_rate_bonus;
        if definition.rarity >= Rarity::Rare {
            bonus += self.rarity_bonus;
        }
        if self.favored_categories.contains(&definition.category) {
            bonus += self.per_category_bonus;
        }
        bonus
    }
}

/// A held stack of some material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialStack {
    /// Material id.
    pub material: String,
    /// Stack size.
    pub count: u32,
}

impl MaterialStack {
    /// Creates a stack.
    #[must_use]
    pub fn new(material: impl Into<String>, count: u32) -> Self {
        Self {
            material: material.into(),
            count,
        }
    }
}

/// Maps held material stacks to their bonus records.
pub trait MaterialIdentifier {
    /// Bonus for `stack`, or `None` if it is not an enhancement material.
    fn identify(&self, stack: &MaterialStack) -> Option<MaterialBonus>;

    /// Bonuses for every recognized, non-empty stack.
    fn bonuses_for(&self, stacks: &[MaterialStack]) -> Vec<MaterialBonus> {
        stacks
            .iter()
            .filter(|stack| stack.count > 0)
            .filter_map(|stack| self.identify(stack))
            .collect()
    }
}

/// Material bonuses keyed by exact material id.
#[derive(Clone, Debug, Default)]
pub struct MaterialTable {
    bonuses: HashMap<String, MaterialBonus>,
}

impl MaterialTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Table seeded with the built-in materials.
    #[must_use]
    pub fn with_defaults() -> Self {
        content::default_materials().into_iter().collect()
    }

    /// Registers a bonus, returning the one it replaced.
    pub fn insert(&mut self, bonus: MaterialBonus) -> Option<MaterialBonus> {
        self.bonuses.insert(bonus.material.clone(), bonus)
    }

    /// Number of known materials.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bonuses.len()
    }

    /// True if no materials are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }
}

impl FromIterator<MaterialBonus> for MaterialTable {
    fn from_iter<T: IntoIterator<Item = MaterialBonus>>(iter: T) -> Self {
        let mut table = Self::new();
        for bonus in iter {
            table.insert(bonus);
        }
        table
    }
}

impl MaterialIdentifier for MaterialTable {
    fn identify(&self, stack: &MaterialStack) -> Option<MaterialBonus> {
        self.bonuses.get(&stack.material).cloned()
    }
}

/// Summed material success bonus for a definition, capped at `cap`.
#[must_use]
pub fn total_success_bonus(
    bonuses: &[MaterialBonus],
    definition: &EnchantmentDefinition,
    cap: f64,
) -> f64 {
    bonuses
        .iter()
        .map(|bonus| bonus.success_bonus_for(definition))
        .sum::<f64>()
        .min(cap)
}

/// Summed material level bonus.
#[must_use]
pub fn total_level_bonus(bonuses: &[MaterialBonus]) -> u32 {
    bonuses
        .iter()
        .fold(0u32, |acc, bonus| acc.saturating_add(bonus.level_bonus))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rare_combat() -> EnchantmentDefinition {
        EnchantmentDefinition::new("x", "X", Category::Combat, Rarity::Rare, 5).unwrap()
    }

    #[test]
    fn test_success_bonus_components() {
        let bonus = MaterialBonus::new("m", 0.05)
            .with_rarity_bonus(0.1)
            .favoring([Category::Combat], 0.02);
        assert!((bonus.success_bonus_for(&rare_combat()) - 0.17).abs() < 1e-9);

        let common_tool =
            EnchantmentDefinition::new("y", "Y", Category::Tool, Rarity::Common, 5).unwrap();
        assert!((bonus.success_bonus_for(&common_tool) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_total_bonus_capped() {
        let bonuses = vec![MaterialBonus::new("a", 0.3), MaterialBonus::new("b", 0.3)];
        assert!((total_success_bonus(&bonuses, &rare_combat(), 0.40) - 0.40).abs() < 1e-9);
    }

    #[test]
    fn test_identify_by_exact_material() {
        let table = MaterialTable::with_defaults();
        assert!(table.identify(&MaterialStack::new("lapis_lazuli", 3)).is_some());
        assert!(table.identify(&MaterialStack::new("lapis", 3)).is_none());

        let held = [
            MaterialStack::new("lapis_lazuli", 1),
            MaterialStack::new("dirt", 64),
            MaterialStack::new("echo_shard", 0),
        ];
        assert_eq!(table.bonuses_for(&held).len(), 1);
    }

    #[test]
    fn test_level_bonus_sums() {
        let bonuses = vec![
            MaterialBonus::new("a", 0.0).with_level_bonus(1),
            MaterialBonus::new("b", 0.0).with_level_bonus(2),
        ];
        assert_eq!(total_level_bonus(&bonuses), 3);
    }
}
