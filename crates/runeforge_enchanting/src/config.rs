//! # Engine Configuration
//!
//! Every tunable constant of the pipeline, loadable from TOML. Missing
//! fields fall back to the documented defaults, so an empty file is a
//! valid configuration.
//!
//! ```toml
//! [power]
//! horizontal_radius = 3
//!
//! [selection]
//! chaos_per_power = 0.001
//!
//! [[rune]]
//! id = "storm"
//! power = 80
//! specialization = "combat"
//! category_bonus = 0.06
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use runeforge_shared::constants::{
    ADVANCED_SOURCE_LIMIT, BASIC_SOURCE_CAP, DEFAULT_HORIZONTAL_RADIUS, DEFAULT_VERTICAL_ABOVE,
    DEFAULT_VERTICAL_BELOW, MAX_ENCHANTING_POWER,
};

use crate::catalog::EnchantmentCatalog;
use crate::definition::EnchantmentDefinition;
use crate::error::ConfigError;
use crate::material::{MaterialBonus, MaterialTable};
use crate::rune::{RuneDefinition, RuneRegistry};

// =============================================================================
// POWER
// =============================================================================

/// Power scan tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Horizontal scan radius in blocks.
    pub horizontal_radius: i32,
    /// Layers scanned below the anchor.
    pub vertical_below: i32,
    /// Layers scanned above the anchor.
    pub vertical_above: i32,
    /// Cap on counted basic sources.
    pub basic_cap: u32,
    /// Power levels per counted basic source.
    pub basic_weight: u32,
    /// Rune power per power level.
    pub advanced_divisor: u32,
    /// Advanced sources inspected per scan.
    pub advanced_limit: usize,
    /// Ceiling on total power.
    pub max_power: u32,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            horizontal_radius: DEFAULT_HORIZONTAL_RADIUS,
            vertical_below: DEFAULT_VERTICAL_BELOW,
            vertical_above: DEFAULT_VERTICAL_ABOVE,
            basic_cap: BASIC_SOURCE_CAP,
            basic_weight: 2,
            advanced_divisor: 10,
            advanced_limit: ADVANCED_SOURCE_LIMIT,
            max_power: MAX_ENCHANTING_POWER,
        }
    }
}

// =============================================================================
// SELECTION
// =============================================================================

/// Selection tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Power thresholds that each unlock one more slot. Ascending.
    pub slot_thresholds: Vec<u32>,
    /// Weight multiplier for the primary pick.
    pub primary_boost: f64,
    /// Per-priority weight decay for secondary picks.
    pub secondary_weight_decay: f64,
    /// Power divisor in the `(1 + power / scale)` weight term.
    pub power_weight_scale: f64,
    /// Weight added per rolled level above 1.
    pub level_weight_step: f64,
    /// Power at which Legendary and above get `high_rarity_multiplier`.
    pub high_rarity_power: u32,
    /// Weight multiplier for Legendary and above at high power.
    pub high_rarity_multiplier: f64,
    /// Exponent of the level saturation curve.
    pub level_curve_exponent: f64,
    /// Success bonus per power point above the rarity minimum.
    pub success_per_power: f64,
    /// Cap on the power success bonus.
    pub success_power_cap: f64,
    /// Success penalty per rolled level above 1.
    pub level_success_penalty: f64,
    /// Cap on summed material bonuses.
    pub material_bonus_cap: f64,
    /// Lower clamp on success before secondary decay.
    pub success_floor: f64,
    /// Upper clamp on success.
    pub success_ceiling: f64,
    /// Per-priority success decay for secondary picks.
    pub secondary_success_decay: f64,
    /// Absolute floor on non-guaranteed success.
    pub probability_floor: f64,
    /// Chaos chance per power point.
    pub chaos_per_power: f64,
    /// Cap on chaos chance.
    pub chaos_cap: f64,
    /// Lower bound of the chaos factor.
    pub chaos_factor_min: f64,
    /// Upper bound of the chaos factor.
    pub chaos_factor_max: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            slot_thresholds: vec![20, 40, 60, 80],
            primary_boost: 1.3,
            secondary_weight_decay: 0.8,
            power_weight_scale: 100.0,
            level_weight_step: 0.3,
            high_rarity_power: 200,
            high_rarity_multiplier: 2.0,
            level_curve_exponent: 0.7,
            success_per_power: 0.01,
            success_power_cap: 0.30,
            level_success_penalty: 0.05,
            material_bonus_cap: 0.40,
            success_floor: 0.10,
            success_ceiling: 0.95,
            secondary_success_decay: 0.7,
            probability_floor: 0.05,
            chaos_per_power: 0.002,
            chaos_cap: 0.15,
            chaos_factor_min: 0.8,
            chaos_factor_max: 1.2,
        }
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Execution tunables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Chance that a successful non-guaranteed roll shifts level by one.
    pub variance_chance: f64,
    /// Chance that a shift goes up rather than down.
    pub variance_up_chance: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            variance_chance: 0.1,
            variance_up_chance: 0.5,
        }
    }
}

// =============================================================================
// ROOT
// =============================================================================

/// Complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnchantingConfig {
    /// `[power]`
    pub power: PowerConfig,
    /// `[selection]`
    pub selection: SelectionConfig,
    /// `[execution]`
    pub execution: ExecutionConfig,
    /// `[[enchantment]]`. Empty means the built-in catalog.
    #[serde(rename = "enchantment")]
    pub enchantments: Vec<EnchantmentDefinition>,
    /// `[[rune]]`. Empty means the built-in runes.
    #[serde(rename = "rune")]
    pub runes: Vec<RuneDefinition>,
    /// `[[material]]`. Empty means the built-in materials.
    #[serde(rename = "material")]
    pub materials: Vec<MaterialBonus>,
}

impl EnchantingConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns error if the document does not parse or a value is out of range.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, does not parse, or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(
            path = %path.display(),
            enchantments = config.enchantments.len(),
            runes = config.runes.len(),
            materials = config.materials.len(),
            "enchanting config loaded"
        );
        Ok(config)
    }

    /// Checks every value for range and consistency.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.power;
        if p.horizontal_radius < 0 {
            return Err(ConfigError::invalid("power.horizontal_radius", "must be >= 0"));
        }
        if p.vertical_below < 0 || p.vertical_above < 0 {
            return Err(ConfigError::invalid("power.vertical_*", "must be >= 0"));
        }
        if p.advanced_divisor == 0 {
            return Err(ConfigError::invalid("power.advanced_divisor", "must be > 0"));
        }

        let s = &self.selection;
        if s.slot_thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid(
                "selection.slot_thresholds",
                "must be strictly ascending",
            ));
        }
        if s.power_weight_scale <= 0.0 {
            return Err(ConfigError::invalid("selection.power_weight_scale", "must be > 0"));
        }
        if s.level_curve_exponent <= 0.0 {
            return Err(ConfigError::invalid("selection.level_curve_exponent", "must be > 0"));
        }
        check_unit("selection.probability_floor", s.probability_floor)?;
        check_unit("selection.success_floor", s.success_floor)?;
        check_unit("selection.success_ceiling", s.success_ceiling)?;
        if s.success_floor > s.success_ceiling {
            return Err(ConfigError::invalid(
                "selection.success_floor",
                "must not exceed success_ceiling",
            ));
        }
        if s.probability_floor > s.success_ceiling {
            return Err(ConfigError::invalid(
                "selection.probability_floor",
                "must not exceed success_ceiling",
            ));
        }
        check_unit("selection.chaos_cap", s.chaos_cap)?;
        if s.chaos_factor_min > s.chaos_factor_max {
            return Err(ConfigError::invalid(
                "selection.chaos_factor_min",
                "must not exceed chaos_factor_max",
            ));
        }

        check_unit("execution.variance_chance", self.execution.variance_chance)?;
        check_unit("execution.variance_up_chance", self.execution.variance_up_chance)?;

        for (i, def) in self.enchantments.iter().enumerate() {
            def.validate()
                .map_err(|e| ConfigError::invalid(format!("enchantment[{i}]"), e.to_string()))?;
        }
        Ok(())
    }

    /// Builds the catalog: configured definitions, or the built-in set.
    #[must_use]
    pub fn build_catalog(&self) -> EnchantmentCatalog {
        if self.enchantments.is_empty() {
            EnchantmentCatalog::with_defaults()
        } else {
            EnchantmentCatalog::from_definitions(self.enchantments.iter().cloned())
        }
    }

    /// Builds the rune registry: configured runes, or the built-in set.
    #[must_use]
    pub fn build_runes(&self) -> RuneRegistry {
        if self.runes.is_empty() {
            RuneRegistry::with_defaults()
        } else {
            self.runes.iter().cloned().collect()
        }
    }

    /// Builds the material table: configured materials, or the built-in set.
    #[must_use]
    pub fn build_materials(&self) -> MaterialTable {
        if self.materials.is_empty() {
            MaterialTable::with_defaults()
        } else {
            self.materials.iter().cloned().collect()
        }
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be within [0, 1]"))
    }
}
