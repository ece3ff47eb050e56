//! # Enchantment Selector
//!
//! **Weighted multi-slot roll of enchantment candidates**
//!
//! ## Pipeline
//!
//! ```text
//! catalog ─> applicable to item ─> unlocked ─> rarity power gate
//!                                                    │
//!                                 slots = f(power)   ▼
//!                        primary pick (x1.3, guaranteed, p = 1.0)
//!                                                    │
//!                 secondary picks (x0.8^i, from the remaining pool)
//!                                                    │
//!                  target level (curve + materials) / success chance
//!                                                    │
//!                                 chaos perturbation ▼
//!                                              candidates
//! ```
//!
//! ## Draw Order
//!
//! 1. One draw per pick, primary first.
//! 2. Per non-guaranteed candidate: one chaos draw, then one factor draw
//!    only if the chaos draw hit.
//!
//! Replaying the same draws always gives the same candidates.

use std::sync::Arc;

use runeforge_shared::events::EntityId;

use crate::catalog::EnchantmentCatalog;
use crate::config::SelectionConfig;
use crate::definition::{EnchantmentDefinition, Rarity};
use crate::equipment::EquipmentClassifier;
use crate::material::{total_level_bonus, total_success_bonus, MaterialBonus};
use crate::power::EnchantingPower;
use crate::record::Item;
use crate::rng::RandomSource;

/// Power thresholds that unlock the 2nd through 5th slots.
pub const DEFAULT_SLOT_THRESHOLDS: [u32; 4] = [20, 40, 60, 80];

/// Exponent of the default level saturation curve.
pub const DEFAULT_LEVEL_CURVE_EXPONENT: f64 = 0.7;

/// Who is enchanting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActorContext {
    /// Host entity id of the actor.
    pub entity: EntityId,
    /// Display name, for logs.
    pub name: String,
}

impl ActorContext {
    /// Creates an actor context.
    #[must_use]
    pub fn new(entity: EntityId, name: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
        }
    }
}

/// Per-actor gate on which enchantments may be offered.
pub trait UnlockOracle {
    /// True if `actor` may receive `definition_id`.
    fn is_unlocked(&self, definition_id: &str, actor: &ActorContext) -> bool;
}

impl<F> UnlockOracle for F
where
    F: Fn(&str, &ActorContext) -> bool,
{
    fn is_unlocked(&self, definition_id: &str, actor: &ActorContext) -> bool {
        self(definition_id, actor)
    }
}

/// One rolled offer.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// The enchantment offered.
    pub definition: Arc<EnchantmentDefinition>,
    /// Level the enchantment would be applied at.
    pub target_level: u32,
    /// Chance the executor applies it.
    pub probability: f64,
    /// Always applied when true.
    pub guaranteed: bool,
    /// 0 for the primary pick, then 1, 2, ...
    pub priority: usize,
}

/// Inputs of one selection.
#[derive(Clone, Copy)]
pub struct SelectionRequest<'a> {
    /// Item being enchanted.
    pub item: &'a Item,
    /// Measured power.
    pub power: &'a EnchantingPower,
    /// Bonuses of held enhancement materials.
    pub materials: &'a [MaterialBonus],
    /// Who is enchanting.
    pub actor: &'a ActorContext,
    /// Unlock gate. `None` unlocks everything.
    pub unlock: Option<&'a dyn UnlockOracle>,
}

// =============================================================================
// PURE FORMULAS
// =============================================================================

/// Slot count for a power level, using the default thresholds.
#[must_use]
pub fn slot_count(power: u32) -> usize {
    slots_from_thresholds(power, &DEFAULT_SLOT_THRESHOLDS)
}

/// Level on the default saturation curve.
#[must_use]
pub fn level_from_power(power: u32, rarity: Rarity, max_level: u32) -> u32 {
    curve_level(power, rarity, max_level, DEFAULT_LEVEL_CURVE_EXPONENT)
}

fn slots_from_thresholds(power: u32, thresholds: &[u32]) -> usize {
    1 + thresholds.iter().filter(|&&t| power >= t).count()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn curve_level(power: u32, rarity: Rarity, max_level: u32, exponent: f64) -> u32 {
    let max_level = max_level.max(1);
    let required = rarity.required_power_for_max();
    if power >= required {
        return max_level;
    }
    let progress = f64::from(power) / f64::from(required);
    let curved = progress.powf(exponent);
    let level = (curved * f64::from(max_level)).ceil() as u32;
    level.clamp(1, max_level)
}

impl SelectionConfig {
    /// Slot count for a power level.
    #[must_use]
    pub fn slot_count(&self, power: u32) -> usize {
        slots_from_thresholds(power, &self.slot_thresholds)
    }

    /// Level on the saturation curve, before material bonuses.
    #[must_use]
    pub fn level_from_power(&self, power: u32, rarity: Rarity, max_level: u32) -> u32 {
        curve_level(power, rarity, max_level, self.level_curve_exponent)
    }

    /// Lottery weight of a definition at `priority` (0 = primary).
    #[must_use]
    pub fn selection_weight(&self, definition: &EnchantmentDefinition, power: u32, priority: usize) -> f64 {
        let level = self.level_from_power(power, definition.rarity, definition.max_level);
        let mut multiplier = (1.0 + f64::from(power) / self.power_weight_scale)
            * (1.0 + f64::from(level - 1) * self.level_weight_step);
        if definition.rarity >= Rarity::Legendary && power >= self.high_rarity_power {
            multiplier *= self.high_rarity_multiplier;
        }
        let base = definition.rarity.selection_weight() * multiplier;
        if priority == 0 {
            base * self.primary_boost
        } else {
            base * self.secondary_weight_decay.powi(priority_exp(priority))
        }
    }

    /// Success chance of a non-guaranteed candidate, before chaos.
    #[must_use]
    pub fn success_probability(
        &self,
        definition: &EnchantmentDefinition,
        power: u32,
        target_level: u32,
        priority: usize,
        material_bonus: f64,
        rune_bonus: f64,
    ) -> f64 {
        let rarity = definition.rarity;
        let mut chance = rarity.base_success_rate();

        let required = rarity.min_power();
        if power > required {
            chance += (f64::from(power - required) * self.success_per_power).min(self.success_power_cap);
        }
        chance -= f64::from(target_level.saturating_sub(1)) * self.level_success_penalty;
        chance += material_bonus.min(self.material_bonus_cap);
        chance += rune_bonus;
        chance = chance.clamp(self.success_floor, self.success_ceiling);

        if priority > 0 {
            chance *= self.secondary_success_decay.powi(priority_exp(priority));
            chance = chance.max(self.probability_floor);
        }
        chance
    }

    /// Chance that a candidate's probability gets perturbed.
    #[must_use]
    pub fn chaos_chance(&self, power: u32) -> f64 {
        (f64::from(power) * self.chaos_per_power).min(self.chaos_cap)
    }
}

fn priority_exp(priority: usize) -> i32 {
    i32::try_from(priority).unwrap_or(i32::MAX)
}

/// Draws an index from `weights`: the first entry whose cumulative weight
/// reaches the roll wins. Float fall-through picks the last entry.
fn weighted_pick(weights: &[f64], rng: &mut dyn RandomSource) -> usize {
    let total: f64 = weights.iter().sum();
    let roll = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if roll <= cumulative {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

// =============================================================================
// SELECTOR
// =============================================================================

/// Rolls enchantment candidates for an item.
pub struct EnchantmentSelector {
    catalog: Arc<EnchantmentCatalog>,
    classifier: Arc<dyn EquipmentClassifier + Send + Sync>,
    config: SelectionConfig,
}

impl EnchantmentSelector {
    /// Creates a selector.
    #[must_use]
    pub fn new(
        catalog: Arc<EnchantmentCatalog>,
        classifier: Arc<dyn EquipmentClassifier + Send + Sync>,
        config: SelectionConfig,
    ) -> Self {
        Self {
            catalog,
            classifier,
            config,
        }
    }

    /// Selection configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Definitions that survive the item, unlock and power filters, in
    /// catalog order.
    #[must_use]
    pub fn eligible(&self, request: &SelectionRequest<'_>) -> Vec<Arc<EnchantmentDefinition>> {
        let power = request.power.total_level;
        self.catalog
            .applicable_to(request.item, self.classifier.as_ref())
            .into_iter()
            .filter(|def| match request.unlock {
                Some(oracle) => oracle.is_unlocked(&def.id, request.actor),
                None => true,
            })
            .filter(|def| power >= def.rarity.min_power())
            .collect()
    }

    /// Rolls candidates. Empty if nothing is eligible.
    pub fn select(&self, request: &SelectionRequest<'_>, rng: &mut dyn RandomSource) -> Vec<Candidate> {
        let power = request.power.total_level;
        let mut pool = self.eligible(request);
        if pool.is_empty() {
            tracing::debug!(power, item = %request.item.material, "no eligible enchantments");
            return Vec::new();
        }

        let slots = self.config.slot_count(power);
        let mut picks: Vec<Arc<EnchantmentDefinition>> = Vec::with_capacity(slots);

        for priority in 0..slots {
            if pool.is_empty() {
                break;
            }
            let weights: Vec<f64> = pool
                .iter()
                .map(|def| self.config.selection_weight(def, power, priority))
                .collect();
            let chosen = weighted_pick(&weights, rng);
            picks.push(pool.remove(chosen));
        }

        let level_bonus = total_level_bonus(request.materials);
        let mut candidates: Vec<Candidate> = picks
            .into_iter()
            .enumerate()
            .map(|(priority, definition)| self.build_candidate(definition, priority, level_bonus, request))
            .collect();

        self.apply_chaos(&mut candidates, power, rng);

        tracing::debug!(
            power,
            slots,
            rolled = candidates.len(),
            primary = %candidates[0].definition.id,
            "enchantment candidates rolled"
        );
        candidates
    }

    fn build_candidate(
        &self,
        definition: Arc<EnchantmentDefinition>,
        priority: usize,
        level_bonus: u32,
        request: &SelectionRequest<'_>,
    ) -> Candidate {
        let power = request.power.total_level;
        let curve = self.config.level_from_power(power, definition.rarity, definition.max_level);
        let target_level = definition.clamp_level(curve.saturating_add(level_bonus));

        let guaranteed = priority == 0;
        let probability = if guaranteed {
            1.0
        } else {
            self.config.success_probability(
                &definition,
                power,
                target_level,
                priority,
                total_success_bonus(request.materials, &definition, self.config.material_bonus_cap),
                request.power.category_bonus(definition.category),
            )
        };

        Candidate {
            definition,
            target_level,
            probability,
            guaranteed,
            priority,
        }
    }

    fn apply_chaos(&self, candidates: &mut [Candidate], power: u32, rng: &mut dyn RandomSource) {
        let chance = self.config.chaos_chance(power);
        for candidate in candidates.iter_mut().filter(|c| !c.guaranteed) {
            if rng.next_f64() < chance {
                let factor = rng.next_range(self.config.chaos_factor_min, self.config.chaos_factor_max);
                candidate.probability = (candidate.probability * factor)
                    .clamp(self.config.probability_floor, self.config.success_ceiling);
                tracing::debug!(
                    id = %candidate.definition.id,
                    factor,
                    probability = candidate.probability,
                    "chaos perturbation"
                );
            }
        }
    }
}
