//! # RUNEFORGE Enchanting
//!
//! The enchantment assignment engine.
//!
//! ## Design Principles
//!
//! 1. **Injected randomness** - every roll draws from a caller-supplied [`RandomSource`]
//! 2. **Pure power scan** - same world, same power; no I/O, no failure
//! 3. **Copy-on-write catalog** - readers never block on administrative writes
//! 4. **Rejected writes change nothing** - conflicts and duplicates leave the item as it was
//! 5. **External configuration** - all tunables in TOML files
//!
//! ## Example
//!
//! ```rust,ignore
//! use runeforge_enchanting::{EnchantingConfig, EnchantingTable, MaterialClassifier, SeededRandom};
//!
//! let config = EnchantingConfig::from_path("data/enchanting.toml")?;
//! let table = EnchantingTable::from_config(&config, Arc::new(MaterialClassifier::with_defaults()));
//!
//! let outcome = table.enchant(&request, &mut item, &mut SeededRandom::new(seed));
//! host.charge_experience(player, outcome.experience_cost);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod content;
pub mod definition;
pub mod effects;
pub mod equipment;
pub mod error;
pub mod executor;
pub mod grid;
pub mod integration;
pub mod material;
pub mod power;
pub mod record;
pub mod rng;
pub mod rune;
pub mod selector;
pub mod session;
pub mod store;
pub mod triggers;

pub use catalog::{CatalogSnapshot, EnchantmentCatalog};
pub use config::{EnchantingConfig, ExecutionConfig, PowerConfig, SelectionConfig};
pub use definition::{Category, EnchantmentDefinition, Rarity};
pub use effects::{EffectTable, EnchantmentEffect, ResolvedEffect, ResolvedEffects};
pub use equipment::{EquipmentClass, EquipmentClasses, EquipmentClassifier, MaterialClassifier};
pub use error::{
    CatalogError, ConfigError, EffectError, EnchantingError, EnchantingResult, StoreError, StoreResult,
};
pub use executor::{AppliedEnchantment, EnchantmentExecutor, ExecutionReport};
pub use grid::BlockGrid;
pub use integration::{experience_cost, EnchantEvent, EnchantOutcome, EnchantRequest, EnchantingTable};
pub use material::{MaterialBonus, MaterialIdentifier, MaterialStack, MaterialTable};
pub use power::{
    AlwaysVisible, ClearPathSight, EnchantingPower, PowerCalculator, PowerSource, PowerSourceObservation,
    PowerSourceScanner, RuneContribution, ScanBounds, SightCheck, SourceTier,
};
pub use record::{DurableRecord, Item, ItemMeta};
pub use rng::{RandomSource, SeededRandom, SequenceRandom};
pub use rune::{RuneDefinition, RuneRegistry};
pub use selector::{
    level_from_power, slot_count, ActorContext, Candidate, EnchantmentSelector, SelectionRequest, UnlockOracle,
};
pub use session::{SessionKey, SessionStore, SessionValue};
pub use store::{ApplyOutcome, EnchantmentStore};
pub use triggers::{TriggerContext, TriggerDispatcher, TriggerKind};
