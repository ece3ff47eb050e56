//! In-memory block world for power scans.
//!
//! Used by tests, benchmarks and the simulation binary. Hosts with a real
//! world implement [`PowerSourceScanner`] over their own storage.

use std::collections::HashMap;

use runeforge_shared::math::BlockPos;

use crate::power::{PowerSource, PowerSourceScanner, SourceTier};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Cell {
    Solid,
    Source(PowerSource),
}

/// Sparse block grid.
#[derive(Clone, Debug)]
pub struct BlockGrid {
    cells: HashMap<BlockPos, Cell>,
    min_y: i32,
    max_y: i32,
}

impl Default for BlockGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockGrid {
    /// Unbounded empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::with_height_limits(i32::MIN, i32::MAX)
    }

    /// Empty grid where only `min_y..=max_y` is inside the world.
    #[must_use]
    pub fn with_height_limits(min_y: i32, max_y: i32) -> Self {
        Self {
            cells: HashMap::new(),
            min_y,
            max_y,
        }
    }

    /// Places a basic source.
    pub fn place_bookshelf(&mut self, pos: BlockPos) {
        self.cells.insert(pos, Cell::Source(PowerSource::Basic));
    }

    /// Places an advanced source holding `runes`.
    pub fn place_lectern<I, S>(&mut self, pos: BlockPos, tier: SourceTier, runes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let runes = runes.into_iter().map(Into::into).collect();
        self.cells
            .insert(pos, Cell::Source(PowerSource::Advanced { tier, runes }));
    }

    /// Places an opaque block that contributes nothing.
    pub fn place_solid(&mut self, pos: BlockPos) {
        self.cells.insert(pos, Cell::Solid);
    }

    /// Empties a cell.
    pub fn clear(&mut self, pos: BlockPos) {
        self.cells.remove(&pos);
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if every cell is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl PowerSourceScanner for BlockGrid {
    fn source_at(&self, pos: BlockPos) -> Option<PowerSource> {
        match self.cells.get(&pos) {
            Some(Cell::Source(source)) => Some(source.clone()),
            _ => None,
        }
    }

    fn in_bounds(&self, pos: BlockPos) -> bool {
        (self.min_y..=self.max_y).contains(&pos.y)
    }

    fn is_occupied(&self, pos: BlockPos) -> bool {
        self.cells.contains_key(&pos)
    }
}
