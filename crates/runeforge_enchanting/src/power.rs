//! # Enchanting Power
//!
//! **Bounded scan of nearby power sources**
//!
//! ```text
//!   dy = 0 and dy = 1, radius 2 (top view, A = anchor)
//!
//!      B B B B B
//!      B . . . B        B  basic source (bookshelf), capped at 15
//!      B . A . B        L  advanced source (lectern) holding runes
//!      B . . . L
//!      B B B B B
//!
//!   total = min(min(basic, 15) * 2 + sum(rune power) / 10, 1000)
//! ```
//!
//! The scan is pure: same world, same power. It never fails; an anchor
//! outside the world yields [`EnchantingPower::ZERO`].

use std::sync::Arc;

use runeforge_shared::math::{BlockOffset, BlockPos};
use serde::{Deserialize, Serialize};

use crate::config::PowerConfig;
use crate::definition::Category;
use crate::rune::RuneRegistry;

// =============================================================================
// SOURCES
// =============================================================================

/// Tier of an advanced source. Higher tiers hold more runes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    /// One rune slot
    Novice,
    /// Two rune slots
    Adept,
    /// Three rune slots
    Master,
}

impl SourceTier {
    /// Runes read from a source of this tier.
    #[inline]
    #[must_use]
    pub const fn rune_slots(self) -> usize {
        match self {
            Self::Novice => 1,
            Self::Adept => 2,
            Self::Master => 3,
        }
    }
}

/// Something near an anchor that contributes power.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerSource {
    /// Presence-only source.
    Basic,
    /// Tiered source holding rune ids.
    Advanced {
        /// Tier, bounding how many runes are read.
        tier: SourceTier,
        /// Rune ids in slot order.
        runes: Vec<String>,
    },
}

/// A source found during a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerSourceObservation {
    /// World position of the source.
    pub pos: BlockPos,
    /// What was found there.
    pub source: PowerSource,
}

/// The region scanned around an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanBounds {
    /// Horizontal radius.
    pub horizontal_radius: i32,
    /// Layers below the anchor.
    pub vertical_below: i32,
    /// Layers above the anchor.
    pub vertical_above: i32,
}

impl ScanBounds {
    /// Bounds from power configuration.
    #[must_use]
    pub const fn from_config(config: &PowerConfig) -> Self {
        Self {
            horizontal_radius: config.horizontal_radius,
            vertical_below: config.vertical_below,
            vertical_above: config.vertical_above,
        }
    }

    /// Offsets in scan order: dy, then dx, then dz, ascending. Excludes zero.
    pub fn offsets(self) -> impl Iterator<Item = BlockOffset> {
        let r = self.horizontal_radius;
        (-self.vertical_below..=self.vertical_above)
            .flat_map(move |dy| (-r..=r).flat_map(move |dx| (-r..=r).map(move |dz| BlockOffset::new(dx, dy, dz))))
            .filter(|offset| !offset.is_zero())
    }
}

/// World access used by the power scan.
pub trait PowerSourceScanner {
    /// Source at `pos`, if any.
    fn source_at(&self, pos: BlockPos) -> Option<PowerSource>;

    /// True if `pos` is inside the world.
    fn in_bounds(&self, _pos: BlockPos) -> bool {
        true
    }

    /// True if `pos` blocks sight. Defaults to "holds a source".
    fn is_occupied(&self, pos: BlockPos) -> bool {
        self.source_at(pos).is_some()
    }

    /// Sources in `bounds` around `anchor`, in scan order.
    fn sources_near(&self, anchor: BlockPos, bounds: ScanBounds) -> Vec<PowerSourceObservation> {
        bounds
            .offsets()
            .filter_map(|offset| {
                let pos = anchor + offset;
                self.source_at(pos)
                    .map(|source| PowerSourceObservation { pos, source })
            })
            .collect()
    }
}

// =============================================================================
// LINE OF SIGHT
// =============================================================================

/// Decides whether a source can reach the anchor.
pub trait SightCheck {
    /// True if the source at `source` counts for `anchor`.
    fn is_visible(&self, scanner: &dyn PowerSourceScanner, anchor: BlockPos, source: BlockPos) -> bool;
}

/// Every source is visible.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysVisible;

impl SightCheck for AlwaysVisible {
    fn is_visible(&self, _scanner: &dyn PowerSourceScanner, _anchor: BlockPos, _source: BlockPos) -> bool {
        true
    }
}

/// A source is hidden when the cell halfway to the anchor is occupied.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearPathSight;

impl SightCheck for ClearPathSight {
    fn is_visible(&self, scanner: &dyn PowerSourceScanner, anchor: BlockPos, source: BlockPos) -> bool {
        let mid = source.midpoint_toward(anchor);
        if mid == source || mid == anchor {
            return true;
        }
        !scanner.is_occupied(mid)
    }
}

// =============================================================================
// POWER
// =============================================================================

/// One rune accepted during a scan.
#[derive(Clone, Debug, PartialEq)]
pub struct RuneContribution {
    /// Rune id.
    pub rune_id: String,
    /// Where the holding source is.
    pub source: BlockPos,
    /// Raw rune power.
    pub power: u32,
    /// Favored category.
    pub specialization: Option<Category>,
    /// Success bonus for the favored category.
    pub category_bonus: f64,
}

/// Result of a power scan.
#[derive(Clone, Debug, PartialEq)]
pub struct EnchantingPower {
    /// Total power level.
    pub total_level: u32,
    /// Counted basic sources, after the cap.
    pub basic_component: u32,
    /// Rune power divided down to levels.
    pub advanced_component: u32,
    /// Accepted runes in scan order.
    pub runes: Vec<RuneContribution>,
}

impl EnchantingPower {
    /// No power at all.
    pub const ZERO: Self = Self {
        total_level: 0,
        basic_component: 0,
        advanced_component: 0,
        runes: Vec::new(),
    };

    /// Synthetic power with no sources behind it.
    #[must_use]
    pub const fn from_level(total_level: u32) -> Self {
        Self {
            total_level,
            basic_component: 0,
            advanced_component: 0,
            runes: Vec::new(),
        }
    }

    /// Summed rune bonus toward `category`.
    #[must_use]
    pub fn category_bonus(&self, category: Category) -> f64 {
        self.runes
            .iter()
            .filter(|rune| rune.specialization == Some(category))
            .map(|rune| rune.category_bonus)
            .sum()
    }
}

/// Computes [`EnchantingPower`] from the world around an anchor.
pub struct PowerCalculator {
    config: PowerConfig,
    runes: Arc<RuneRegistry>,
    sight: Box<dyn SightCheck + Send + Sync>,
}

impl PowerCalculator {
    /// Creates a calculator where every source is visible.
    #[must_use]
    pub fn new(config: PowerConfig, runes: Arc<RuneRegistry>) -> Self {
        Self {
            config,
            runes,
            sight: Box::new(AlwaysVisible),
        }
    }

    /// Replaces the line-of-sight check.
    #[must_use]
    pub fn with_sight_check(mut self, sight: impl SightCheck + Send + Sync + 'static) -> Self {
        self.sight = Box::new(sight);
        self
    }

    /// Power configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PowerConfig {
        &self.config
    }

    /// Scans around `anchor` and computes its power.
    #[must_use]
    pub fn compute_power(&self, scanner: &dyn PowerSourceScanner, anchor: Option<BlockPos>) -> EnchantingPower {
        let Some(anchor) = anchor.filter(|pos| scanner.in_bounds(*pos)) else {
            tracing::debug!("power scan skipped: no valid anchor");
            return EnchantingPower::ZERO;
        };

        let mut basic_count = 0u32;
        let mut inspected = 0usize;
        let mut runes = Vec::new();

        for observation in scanner.sources_near(anchor, ScanBounds::from_config(&self.config)) {
            if !self.sight.is_visible(scanner, anchor, observation.pos) {
                continue;
            }
            match observation.source {
                PowerSource::Basic => basic_count += 1,
                PowerSource::Advanced { tier, runes: ids } => {
                    if inspected >= self.config.advanced_limit {
                        continue;
                    }
                    let accepted = self.resolve_runes(observation.pos, tier, &ids);
                    if !accepted.is_empty() {
                        inspected += 1;
                        runes.extend(accepted);
                    }
                }
            }
        }

        let basic_component = basic_count.min(self.config.basic_cap);
        let rune_power: u32 = runes.iter().fold(0u32, |acc, r: &RuneContribution| acc.saturating_add(r.power));
        let advanced_component = rune_power / self.config.advanced_divisor.max(1);
        let total_level = basic_component
            .saturating_mul(self.config.basic_weight)
            .saturating_add(advanced_component)
            .min(self.config.max_power);

        tracing::debug!(
            x = anchor.x,
            y = anchor.y,
            z = anchor.z,
            basic = basic_component,
            advanced = advanced_component,
            runes = runes.len(),
            power = total_level,
            "power scan complete"
        );

        EnchantingPower {
            total_level,
            basic_component,
            advanced_component,
            runes,
        }
    }

    /// Summed rune bonus toward `category` for a computed power.
    #[must_use]
    pub fn category_bonus(&self, power: &EnchantingPower, category: Category) -> f64 {
        power.category_bonus(category)
    }

    fn resolve_runes(&self, pos: BlockPos, tier: SourceTier, ids: &[String]) -> Vec<RuneContribution> {
        ids.iter()
            .take(tier.rune_slots())
            .filter_map(|id| {
                let Some(rune) = self.runes.get(id) else {
                    tracing::debug!(rune = %id, "unknown rune ignored");
                    return None;
                };
                Some(RuneContribution {
                    rune_id: rune.id.clone(),
                    source: pos,
                    power: rune.power,
                    specialization: rune.specialization,
                    category_bonus: rune.category_bonus,
                })
            })
            .collect()
    }
}
