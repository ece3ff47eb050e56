//! # Runes
//!
//! Runes are socketed into advanced power sources. Each resolved rune adds
//! raw power and may specialize toward one category, raising the success
//! chance of enchantments in that category.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::content;
use crate::definition::Category;

/// A rune as registered in the [`RuneRegistry`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuneDefinition {
    /// Unique rune id.
    pub id: String,
    /// Raw power. Ten points of rune power make one power level.
    pub power: u32,
    /// Category this rune favors, if any.
    #[serde(default)]
    pub specialization: Option<Category>,
    /// Additive success bonus for enchantments of `specialization`.
    #[serde(default)]
    pub category_bonus: f64,
}

impl RuneDefinition {
    /// Creates an unspecialized rune.
    #[must_use]
    pub fn new(id: impl Into<String>, power: u32) -> Self {
        Self {
            id: id.into(),
            power,
            specialization: None,
            category_bonus: 0.0,
        }
    }

    /// Specializes this rune toward a category.
    #[must_use]
    pub fn specialized(mut self, category: Category, bonus: f64) -> Self {
        self.specialization = Some(category);
        self.category_bonus = bonus;
        self
    }
}

/// Registry of rune definitions, resolved by id during power scans.
#[derive(Clone, Debug, Default)]
pub struct RuneRegistry {
    runes: HashMap<String, RuneDefinition>,
}

impl RuneRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the built-in runes.
    #[must_use]
    pub fn with_defaults() -> Self {
        content::default_runes().into_iter().collect()
    }

    /// Registers a rune, returning the one it replaced.
    pub fn register(&mut self, rune: RuneDefinition) -> Option<RuneDefinition> {
        self.runes.insert(rune.id.clone(), rune)
    }

    /// Resolves a rune id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RuneDefinition> {
        self.runes.get(id)
    }

    /// Number of registered runes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runes.len()
    }

    /// True if no runes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runes.is_empty()
    }
}

impl FromIterator<RuneDefinition> for RuneRegistry {
    fn from_iter<T: IntoIterator<Item = RuneDefinition>>(iter: T) -> Self {
        let mut registry = Self::new();
        for rune in iter {
            registry.register(rune);
        }
        registry
    }
}
