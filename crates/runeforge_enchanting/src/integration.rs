//! # Integration API
//!
//! **The enchanting table** - one player action, end to end.
//!
//! ## The Golden Path: Enchant
//!
//! ```text
//! host ──> EnchantingTable::enchant()
//!                 │
//!                 ▼
//!          PowerCalculator        scan around the anchor
//!                 │
//!                 ▼
//!          EnchantmentSelector    roll candidates (injected RNG)
//!                 │
//!                 ▼
//!          EnchantmentExecutor    success + level variance
//!                 │
//!                 ▼
//!          EnchantmentStore       conflict-checked write onto the item
//!                 │
//!                 ▼
//!          EnchantOutcome + EnchantEvents (drain_events)
//! ```
//!
//! The host charges `experience_cost`; the engine does not own player
//! experience.

use std::sync::Arc;

use parking_lot::Mutex;
use runeforge_shared::events::EntityId;
use runeforge_shared::math::BlockPos;

use crate::catalog::EnchantmentCatalog;
use crate::config::EnchantingConfig;
use crate::equipment::EquipmentClassifier;
use crate::executor::{AppliedEnchantment, EnchantmentExecutor};
use crate::material::{MaterialIdentifier, MaterialStack};
use crate::power::{EnchantingPower, PowerCalculator, PowerSourceScanner, SightCheck};
use crate::record::Item;
use crate::rng::RandomSource;
use crate::selector::{ActorContext, Candidate, EnchantmentSelector, SelectionRequest, UnlockOracle};
use crate::store::{ApplyOutcome, EnchantmentStore};

// ============================================================================
// Public Types
// ============================================================================

/// Inputs of one enchant action.
pub struct EnchantRequest<'a> {
    /// Enchanting table position. `None` means no power.
    pub anchor: Option<BlockPos>,
    /// World access for the power scan.
    pub scanner: &'a dyn PowerSourceScanner,
    /// Who is enchanting.
    pub actor: &'a ActorContext,
    /// Stacks the actor offers as enhancement materials.
    pub held: &'a [MaterialStack],
    /// Unlock gate. `None` unlocks everything.
    pub unlock: Option<&'a dyn UnlockOracle>,
}

/// Everything that happened during one enchant action.
#[derive(Clone, Debug, PartialEq)]
pub struct EnchantOutcome {
    /// Measured power.
    pub power: EnchantingPower,
    /// Rolled candidates, primary first.
    pub candidates: Vec<Candidate>,
    /// Enchantments written onto the item.
    pub applied: Vec<AppliedEnchantment>,
    /// Candidate ids that failed their roll.
    pub failed: Vec<String>,
    /// Store rejections (conflicts, duplicates).
    pub rejected: Vec<ApplyOutcome>,
    /// Experience the host should charge.
    pub experience_cost: u32,
}

impl EnchantOutcome {
    /// True if at least one enchantment was written.
    #[must_use]
    pub fn is_enchanted(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Engine event for downstream consumers (effects, UI, audit).
#[derive(Clone, Debug, PartialEq)]
pub enum EnchantEvent {
    /// A power scan completed.
    PowerMeasured {
        /// Actor.
        entity: EntityId,
        /// Total power.
        power: u32,
    },
    /// Candidates were rolled.
    CandidatesRolled {
        /// Actor.
        entity: EntityId,
        /// Candidate ids in priority order.
        ids: Vec<String>,
    },
    /// An enchantment was written onto an item.
    EnchantmentApplied {
        /// Actor.
        entity: EntityId,
        /// Enchantment id.
        id: String,
        /// Stored level.
        level: u32,
    },
    /// The store refused an enchantment.
    EnchantmentRejected {
        /// Actor.
        entity: EntityId,
        /// Enchantment id.
        id: String,
        /// Why.
        reason: String,
    },
}

/// Experience cost: `ceil(sum(level * rarity cost multiplier))`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn experience_cost(applied: &[AppliedEnchantment]) -> u32 {
    let raw: f64 = applied
        .iter()
        .map(|a| f64::from(a.final_level) * a.definition.rarity.cost_multiplier())
        .sum();
    raw.ceil().max(0.0) as u32
}

// ============================================================================
// EnchantingTable
// ============================================================================

/// Composes power, selection, execution and storage.
pub struct EnchantingTable {
    catalog: Arc<EnchantmentCatalog>,
    calculator: PowerCalculator,
    selector: EnchantmentSelector,
    executor: EnchantmentExecutor,
    store: EnchantmentStore,
    materials: Arc<dyn MaterialIdentifier + Send + Sync>,
    event_buffer: Mutex<Vec<EnchantEvent>>,
}

impl EnchantingTable {
    /// Builds a table from configuration.
    ///
    /// Catalog, runes and materials come from the config (or the built-in
    /// sets when the config lists none).
    #[must_use]
    pub fn from_config(config: &EnchantingConfig, classifier: Arc<dyn EquipmentClassifier + Send + Sync>) -> Self {
        let catalog = Arc::new(config.build_catalog());
        let runes = Arc::new(config.build_runes());
        let materials: Arc<dyn MaterialIdentifier + Send + Sync> = Arc::new(config.build_materials());

        tracing::info!(
            enchantments = catalog.len(),
            runes = runes.len(),
            "enchanting table initialized"
        );

        Self {
            calculator: PowerCalculator::new(config.power.clone(), runes),
            selector: EnchantmentSelector::new(Arc::clone(&catalog), classifier, config.selection.clone()),
            executor: EnchantmentExecutor::new(config.execution.clone()),
            store: EnchantmentStore::new(Arc::clone(&catalog)),
            catalog,
            materials,
            event_buffer: Mutex::new(Vec::new()),
        }
    }

    /// Replaces the line-of-sight check used by the power scan.
    #[must_use]
    pub fn with_sight_check(mut self, sight: impl SightCheck + Send + Sync + 'static) -> Self {
        self.calculator = self.calculator.with_sight_check(sight);
        self
    }

    /// Replaces the material identifier.
    #[must_use]
    pub fn with_materials(mut self, materials: Arc<dyn MaterialIdentifier + Send + Sync>) -> Self {
        self.materials = materials;
        self
    }

    /// Shared catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<EnchantmentCatalog> {
        &self.catalog
    }

    /// Store, for reads and administrative edits.
    #[must_use]
    pub const fn store(&self) -> &EnchantmentStore {
        &self.store
    }

    /// Power at an anchor, without rolling.
    #[must_use]
    pub fn measure(&self, scanner: &dyn PowerSourceScanner, anchor: Option<BlockPos>) -> EnchantingPower {
        self.calculator.compute_power(scanner, anchor)
    }

    /// Runs one enchant action on `item`.
    pub fn enchant(&self, request: &EnchantRequest<'_>, item: &mut Item, rng: &mut dyn RandomSource) -> EnchantOutcome {
        let entity = request.actor.entity;
        let power = self.calculator.compute_power(request.scanner, request.anchor);
        let bonuses = self.materials.bonuses_for(request.held);

        let candidates = self.selector.select(
            &SelectionRequest {
                item: &*item,
                power: &power,
                materials: &bonuses,
                actor: request.actor,
                unlock: request.unlock,
            },
            rng,
        );

        let report = self.executor.execute_report(&candidates, rng);
        let outcomes = self.store.apply_all(item, &report.applied);

        let (stored, rejected): (Vec<_>, Vec<_>) = report
            .applied
            .into_iter()
            .zip(outcomes)
            .partition(|(_, outcome)| outcome.is_applied());
        let applied: Vec<AppliedEnchantment> = stored.into_iter().map(|(a, _)| a).collect();
        let rejected: Vec<ApplyOutcome> = rejected.into_iter().map(|(_, o)| o).collect();
        let experience_cost = experience_cost(&applied);

        self.record_events(entity, &power, &candidates, &applied, &rejected);

        tracing::info!(
            entity,
            actor = %request.actor.name,
            item = %item.material,
            power = power.total_level,
            rolled = candidates.len(),
            applied = applied.len(),
            failed = report.failed.len(),
            rejected = rejected.len(),
            cost = experience_cost,
            "enchant complete"
        );

        EnchantOutcome {
            power,
            candidates,
            applied,
            failed: report.failed,
            rejected,
            experience_cost,
        }
    }

    fn record_events(
        &self,
        entity: EntityId,
        power: &EnchantingPower,
        candidates: &[Candidate],
        applied: &[AppliedEnchantment],
        rejected: &[ApplyOutcome],
    ) {
        let mut events = self.event_buffer.lock();
        events.push(EnchantEvent::PowerMeasured {
            entity,
            power: power.total_level,
        });
        if !candidates.is_empty() {
            events.push(EnchantEvent::CandidatesRolled {
                entity,
                ids: candidates.iter().map(|c| c.definition.id.clone()).collect(),
            });
        }
        for a in applied {
            events.push(EnchantEvent::EnchantmentApplied {
                entity,
                id: a.definition.id.clone(),
                level: a.final_level,
            });
        }
        for r in rejected {
            let reason = match &r.result {
                Err(err) => err.to_string(),
                Ok(()) => continue,
            };
            events.push(EnchantEvent::EnchantmentRejected {
                entity,
                id: r.id.clone(),
                reason,
            });
        }
    }

    /// Drains all pending engine events.
    pub fn drain_events(&self) -> Vec<EnchantEvent> {
        let mut events = self.event_buffer.lock();
        std::mem::take(&mut *events)
    }

    /// Number of pending engine events.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.event_buffer.lock().len()
    }
}
