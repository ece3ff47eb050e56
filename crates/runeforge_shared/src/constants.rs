//! # Engine Constants
//!
//! Default values shared by the engine and the host.
//!
//! **NOTE:** These are the defaults only. Every value here can be overridden
//! through the engine's TOML configuration at startup.

// =============================================================================
// POWER SCAN
// =============================================================================

/// Horizontal scan radius around an enchanting anchor, in blocks.
pub const DEFAULT_HORIZONTAL_RADIUS: i32 = 2;

/// Number of layers scanned below the anchor.
pub const DEFAULT_VERTICAL_BELOW: i32 = 0;

/// Number of layers scanned above the anchor.
pub const DEFAULT_VERTICAL_ABOVE: i32 = 1;

/// Maximum number of basic sources (bookshelves) that count toward power.
pub const BASIC_SOURCE_CAP: u32 = 15;

/// Maximum number of advanced sources inspected per scan.
pub const ADVANCED_SOURCE_LIMIT: usize = 32;

/// Hard ceiling on total enchanting power.
pub const MAX_ENCHANTING_POWER: u32 = 1000;

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Namespace prefix for enchantment records stored on items.
pub const RECORD_NAMESPACE: &str = "runeforge";

/// Marker prefix for enchantment lines in an item's description block.
///
/// Lines without this prefix belong to the host and are never touched.
pub const DESCRIPTION_MARKER: &str = "\u{2726} ";
