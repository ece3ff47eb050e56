//! # Enchantment Effects
//!
//! Typed table from enchantment id to what the enchantment does. The stat
//! aggregator owned by the host reads magnitudes from here; this crate
//! never folds effects into character stats itself.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::EnchantmentCatalog;
use crate::error::EffectError;

/// What an enchantment does, per level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnchantmentEffect {
    /// Flat extra damage.
    BonusDamage {
        /// Damage per level.
        per_level: f64,
    },
    /// Fraction of incoming damage removed.
    DamageReduction {
        /// Fraction per level.
        per_level: f64,
    },
    /// Fraction of dealt damage returned as health.
    Lifesteal {
        /// Fraction per level.
        per_level: f64,
    },
    /// Multiplier added to gathering speed.
    MiningSpeed {
        /// Multiplier per level.
        per_level: f64,
    },
    /// Chance to reflect damage to the attacker.
    Thorns {
        /// Chance per level.
        chance_per_level: f64,
    },
    /// Chance to not consume durability.
    Durability {
        /// Chance per level.
        chance_per_level: f64,
    },
    /// Drawback with no magnitude.
    Curse,
}

impl EnchantmentEffect {
    /// Magnitude at `level`.
    #[must_use]
    pub fn magnitude(self, level: u32) -> f64 {
        let level = f64::from(level);
        match self {
            Self::BonusDamage { per_level }
            | Self::DamageReduction { per_level }
            | Self::Lifesteal { per_level }
            | Self::MiningSpeed { per_level } => per_level * level,
            Self::Thorns { chance_per_level } | Self::Durability { chance_per_level } => {
                (chance_per_level * level).min(1.0)
            }
            Self::Curse => 0.0,
        }
    }
}

/// An effect resolved for a stored enchantment.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedEffect {
    /// Enchantment id.
    pub id: String,
    /// Stored level.
    pub level: u32,
    /// The effect.
    pub effect: EnchantmentEffect,
    /// `effect.magnitude(level)`.
    pub magnitude: f64,
}

/// Effects for one item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedEffects {
    /// Effects of known enchantments, in id order.
    pub resolved: Vec<ResolvedEffect>,
    /// Stored ids with no registered effect.
    pub unknown: Vec<String>,
}

/// Id to effect mapping, validated against the catalog.
#[derive(Debug)]
pub struct EffectTable {
    catalog: Arc<EnchantmentCatalog>,
    effects: HashMap<String, EnchantmentEffect>,
}

impl EffectTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new(catalog: Arc<EnchantmentCatalog>) -> Self {
        Self {
            catalog,
            effects: HashMap::new(),
        }
    }

    /// Table with effects for the built-in enchantments present in `catalog`.
    #[must_use]
    pub fn with_defaults(catalog: Arc<EnchantmentCatalog>) -> Self {
        let mut table = Self::new(catalog);
        let defaults = [
            ("sharpness", EnchantmentEffect::BonusDamage { per_level: 1.25 }),
            ("smite", EnchantmentEffect::BonusDamage { per_level: 2.5 }),
            ("bane_of_arthropods", EnchantmentEffect::BonusDamage { per_level: 2.5 }),
            ("power", EnchantmentEffect::BonusDamage { per_level: 0.5 }),
            ("executioner", EnchantmentEffect::BonusDamage { per_level: 3.0 }),
            ("lifesteal", EnchantmentEffect::Lifesteal { per_level: 0.05 }),
            ("soul_siphon", EnchantmentEffect::Lifesteal { per_level: 0.03 }),
            ("efficiency", EnchantmentEffect::MiningSpeed { per_level: 0.25 }),
            ("vein_miner", EnchantmentEffect::MiningSpeed { per_level: 0.1 }),
            ("protection", EnchantmentEffect::DamageReduction { per_level: 0.04 }),
            ("blast_protection", EnchantmentEffect::DamageReduction { per_level: 0.08 }),
            ("fire_protection", EnchantmentEffect::DamageReduction { per_level: 0.08 }),
            ("arcane_ward", EnchantmentEffect::DamageReduction { per_level: 0.05 }),
            ("thorns", EnchantmentEffect::Thorns { chance_per_level: 0.15 }),
            ("unbreaking", EnchantmentEffect::Durability { chance_per_level: 0.25 }),
            ("curse_of_binding", EnchantmentEffect::Curse),
            ("curse_of_vanishing", EnchantmentEffect::Curse),
        ];
        for (id, effect) in defaults {
            if table.catalog.contains(id) {
                table.effects.insert(id.to_string(), effect);
            }
        }
        table
    }

    /// Registers an effect, returning the one it replaced.
    ///
    /// # Errors
    ///
    /// [`EffectError::UnknownEnchantment`] if `id` is not in the catalog.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        effect: EnchantmentEffect,
    ) -> Result<Option<EnchantmentEffect>, EffectError> {
        let id = id.into();
        if !self.catalog.contains(&id) {
            return Err(EffectError::UnknownEnchantment(id));
        }
        Ok(self.effects.insert(id, effect))
    }

    /// Effect of `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<EnchantmentEffect> {
        self.effects.get(id).copied()
    }

    /// Magnitude of `id` at `level`.
    #[must_use]
    pub fn magnitude(&self, id: &str, level: u32) -> Option<f64> {
        self.get(id).map(|effect| effect.magnitude(level))
    }

    /// Resolves every stored enchantment of an item.
    #[must_use]
    pub fn effects_for(&self, decoded: &BTreeMap<String, u32>) -> ResolvedEffects {
        let mut out = ResolvedEffects::default();
        for (id, &level) in decoded {
            match self.get(id) {
                Some(effect) => out.resolved.push(ResolvedEffect {
                    id: id.clone(),
                    level,
                    effect,
                    magnitude: effect.magnitude(level),
                }),
                None => {
                    tracing::warn!(id = %id, "stored enchantment has no effect");
                    out.unknown.push(id.clone());
                }
            }
        }
        out
    }

    /// Number of registered effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// True if no effects are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
