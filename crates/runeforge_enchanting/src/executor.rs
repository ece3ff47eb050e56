//! # Enchantment Executor
//!
//! Resolves rolled candidates into applied enchantments.
//!
//! Per non-guaranteed candidate the draws are, in order:
//! 1. success draw (`< probability` succeeds)
//! 2. on success, variance draw (`< variance_chance` shifts the level)
//! 3. on variance, direction draw (`< variance_up_chance` goes up)
//!
//! Guaranteed candidates consume no draws and never shift level.

use std::sync::Arc;

use crate::config::ExecutionConfig;
use crate::definition::EnchantmentDefinition;
use crate::rng::RandomSource;
use crate::selector::Candidate;

/// An enchantment that passed its roll.
#[derive(Clone, Debug, PartialEq)]
pub struct AppliedEnchantment {
    /// The enchantment.
    pub definition: Arc<EnchantmentDefinition>,
    /// Level to store, within `1..=max_level`.
    pub final_level: u32,
}

/// Full outcome of one execution, for logs and events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionReport {
    /// Candidates that passed, in candidate order.
    pub applied: Vec<AppliedEnchantment>,
    /// Ids of candidates that failed their roll.
    pub failed: Vec<String>,
}

/// Rolls success and level variance for candidates.
#[derive(Clone, Debug, Default)]
pub struct EnchantmentExecutor {
    config: ExecutionConfig,
}

impl EnchantmentExecutor {
    /// Creates an executor.
    #[must_use]
    pub const fn new(config: ExecutionConfig) -> Self {
        Self { config }
    }

    /// Applied enchantments only.
    pub fn execute(&self, candidates: &[Candidate], rng: &mut dyn RandomSource) -> Vec<AppliedEnchantment> {
        self.execute_report(candidates, rng).applied
    }

    /// Applied enchantments plus the ids that failed.
    pub fn execute_report(&self, candidates: &[Candidate], rng: &mut dyn RandomSource) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for candidate in candidates {
            let definition = &candidate.definition;
            let mut level = definition.clamp_level(candidate.target_level);

            if !candidate.guaranteed {
                if rng.next_f64() >= candidate.probability {
                    tracing::debug!(id = %definition.id, probability = candidate.probability, "enchantment roll failed");
                    report.failed.push(definition.id.clone());
                    continue;
                }
                if rng.next_f64() < self.config.variance_chance {
                    let up = rng.next_f64() < self.config.variance_up_chance;
                    let shifted = if up && level < definition.max_level {
                        level + 1
                    } else if !up && level > 1 {
                        level - 1
                    } else {
                        level
                    };
                    tracing::debug!(id = %definition.id, from = level, to = shifted, "level variance");
                    level = shifted;
                }
            }

            report.applied.push(AppliedEnchantment {
                definition: Arc::clone(definition),
                final_level: definition.clamp_level(level),
            });
        }

        report
    }
}
