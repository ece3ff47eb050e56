//! # RUNEFORGE Shared
//!
//! Common types used by both the enchanting engine and the host adapter.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - a random number generator
//! - the filesystem or the network
//! - the enchanting engine itself
//!
//! If you need engine types, put them in `runeforge_enchanting`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod events;
pub mod math;

pub use constants::{
    ADVANCED_SOURCE_LIMIT, BASIC_SOURCE_CAP, DEFAULT_HORIZONTAL_RADIUS, DEFAULT_VERTICAL_ABOVE,
    DEFAULT_VERTICAL_BELOW, MAX_ENCHANTING_POWER,
};
pub use events::{EntityId, HostEvent, HostEventType};
pub use math::{BlockOffset, BlockPos};
