//! # Enchanting Error Types
//!
//! All errors that can occur in the enchanting engine.
//!
//! Store failures are expected gameplay outcomes (a conflicting enchantment,
//! a duplicate apply), not bugs. They leave the item untouched.

use thiserror::Error;

/// Rejections from [`crate::store::EnchantmentStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Missing definition or non-positive level.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A mutually exclusive enchantment is already on the item.
    #[error("enchantment {id} conflicts with {existing} already on the item")]
    ConflictDetected {
        /// The enchantment being applied.
        id: String,
        /// The enchantment already present.
        existing: String,
    },

    /// The same enchantment is already on the item.
    #[error("enchantment {0} is already present, upgrade it instead")]
    AlreadyPresent(String),
}

/// Problems with catalog content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Definition id is empty.
    #[error("enchantment id must not be empty")]
    EmptyId,

    /// Max level must be at least 1.
    #[error("enchantment {id} has invalid max level {max_level}")]
    InvalidMaxLevel {
        /// The offending definition.
        id: String,
        /// The configured max level.
        max_level: u32,
    },

    /// `id` lists `other` as a conflict but not the other way around.
    #[error("enchantment {id} conflicts with {other}, but {other} does not list {id}")]
    AsymmetricConflict {
        /// Definition listing the conflict.
        id: String,
        /// Definition missing the reverse entry.
        other: String,
    },
}

/// Problems loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::Invalid`].
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Problems registering effects or trigger handlers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// The id is not in the catalog, so the effect could never fire.
    #[error("unknown enchantment: {0}")]
    UnknownEnchantment(String),
}

/// Any error produced by the enchanting engine.
#[derive(Error, Debug)]
pub enum EnchantingError {
    /// Store rejection.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Catalog content problem.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Effect table problem.
    #[error(transparent)]
    Effect(#[from] EffectError),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for enchanting operations.
pub type EnchantingResult<T> = Result<T, EnchantingError>;
