//! Integer block coordinates shared between engine and host.
//!
//! These are the canonical representations used by the power scanner.

use serde::{Deserialize, Serialize};

/// Position of a block in the world grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    /// X component
    pub x: i32,
    /// Y component (vertical)
    pub y: i32,
    /// Z component
    pub z: i32,
}

impl BlockPos {
    /// Creates a new position
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// World origin
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    /// Returns this position shifted by an offset.
    #[must_use]
    pub const fn offset(self, delta: BlockOffset) -> Self {
        Self::new(self.x + delta.dx, self.y + delta.dy, self.z + delta.dz)
    }

    /// Cell halfway between `self` and `other`, rounded toward `self`.
    #[must_use]
    pub const fn midpoint_toward(self, other: Self) -> Self {
        Self::new(
            self.x + (other.x - self.x) / 2,
            self.y + (other.y - self.y) / 2,
            self.z + (other.z - self.z) / 2,
        )
    }
}

/// Relative offset between two block positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockOffset {
    /// X delta
    pub dx: i32,
    /// Y delta
    pub dy: i32,
    /// Z delta
    pub dz: i32,
}

impl BlockOffset {
    /// Creates a new offset
    #[must_use]
    pub const fn new(dx: i32, dy: i32, dz: i32) -> Self {
        Self { dx, dy, dz }
    }

    /// No displacement
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// True for the zero offset.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.dx == 0 && self.dy == 0 && self.dz == 0
    }
}

impl std::ops::Add<BlockOffset> for BlockPos {
    type Output = Self;
    fn add(self, rhs: BlockOffset) -> Self {
        self.offset(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_shifts_position() {
        let a = BlockPos::new(10, 64, -3);
        assert_eq!(a + BlockOffset::new(2, 1, -2), BlockPos::new(12, 65, -5));
        assert_eq!(a.offset(BlockOffset::ZERO), a);
    }

    #[test]
    fn test_midpoint_toward() {
        let anchor = BlockPos::new(0, 64, 0);
        let source = BlockPos::new(2, 65, -2);
        assert_eq!(anchor.midpoint_toward(source), BlockPos::new(1, 64, -1));
    }

    #[test]
    fn test_zero_offset() {
        assert!(BlockOffset::ZERO.is_zero());
        assert!(!BlockOffset::new(0, 1, 0).is_zero());
    }
}
