//! Block locations and displacement vectors.
//!
//! A [`BlockLocation`] identifies a single block position in a named world
//! and is the primary key for every persisted tag. A [`Vector`] is a
//! one-step displacement applied to a location, typically produced from a
//! piston push direction.
//!
//! Offsets use checked arithmetic: a coordinate that would leave the `i32`
//! range yields `None` rather than wrapping. Real worlds never come close
//! to the boundary, so an overflow indicates corrupt adapter input.

use serde::{Deserialize, Serialize};

/// A block position within a named world.
///
/// Equality, ordering, and hashing are structural; two locations are the
/// same key if and only if the world name and all three coordinates match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockLocation {
    /// Name of the world this location belongs to.
    pub world: String,
    /// East/west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North/south coordinate.
    pub z: i32,
}

impl BlockLocation {
    /// Create a location from a world name and coordinates.
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Compute the location displaced by `direction`.
    ///
    /// Returns `None` if any coordinate would overflow the `i32` range.
    /// The world name is carried over unchanged; displacement never moves
    /// a block across worlds.
    pub fn offset(&self, direction: &Vector) -> Option<Self> {
        Some(Self {
            world: self.world.clone(),
            x: self.x.checked_add(direction.x)?,
            y: self.y.checked_add(direction.y)?,
            z: self.z.checked_add(direction.z)?,
        })
    }
}

impl core::fmt::Display for BlockLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({},{},{})", self.world, self.x, self.y, self.z)
    }
}

/// A three-component integer displacement.
///
/// Physics events report the direction a block set was pushed; the engine
/// adds this component-wise to each affected location.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Vector {
    /// East/west delta.
    pub x: i32,
    /// Vertical delta.
    pub y: i32,
    /// North/south delta.
    pub z: i32,
}

impl Vector {
    /// Create a displacement from raw deltas.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// One step upward.
    pub const UP: Self = Self::new(0, 1, 0);
    /// One step downward.
    pub const DOWN: Self = Self::new(0, -1, 0);
    /// One step north (negative z).
    pub const NORTH: Self = Self::new(0, 0, -1);
    /// One step south (positive z).
    pub const SOUTH: Self = Self::new(0, 0, 1);
    /// One step east (positive x).
    pub const EAST: Self = Self::new(1, 0, 0);
    /// One step west (negative x).
    pub const WEST: Self = Self::new(-1, 0, 0);
}

impl core::fmt::Display for Vector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        let a = BlockLocation::new("world", 1, 64, -3);
        let b = BlockLocation::new("world", 1, 64, -3);
        let c = BlockLocation::new("world_nether", 1, 64, -3);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn offset_adds_component_wise() {
        let origin = BlockLocation::new("world", 10, 64, -5);
        let moved = origin.offset(&Vector::new(0, 0, 1)).unwrap();
        assert_eq!(moved, BlockLocation::new("world", 10, 64, -4));
        // The original is untouched.
        assert_eq!(origin.z, -5);
    }

    #[test]
    fn offset_overflow_is_none() {
        let edge = BlockLocation::new("world", i32::MAX, 0, 0);
        assert!(edge.offset(&Vector::EAST).is_none());
        assert!(edge.offset(&Vector::WEST).is_some());
    }

    #[test]
    fn cardinal_vectors_are_unit_steps() {
        assert_eq!(Vector::UP, Vector::new(0, 1, 0));
        assert_eq!(Vector::SOUTH, Vector::new(0, 0, 1));
        assert_eq!(Vector::WEST, Vector::new(-1, 0, 0));
    }

    #[test]
    fn display_includes_world_and_coordinates() {
        let loc = BlockLocation::new("world", 1, 2, 3);
        assert_eq!(loc.to_string(), "world(1,2,3)");
    }
}
