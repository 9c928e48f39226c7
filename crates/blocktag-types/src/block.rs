//! Material identifiers and the block value handed in by the event adapter.

use serde::{Deserialize, Serialize};

use crate::location::BlockLocation;

/// A block material identifier (e.g. `STONE`, `BEACON`).
///
/// Thin wrapper around the engine-provided material name so that material
/// strings cannot be mixed up with world names or other identifiers at
/// compile time. Comparison is exact and case-preserving; the event
/// adapter is expected to hand in the engine's canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Material(String);

impl Material {
    /// Create a material from its engine name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Return the material name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner name.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for Material {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Material {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for Material {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// A block as observed by the game-event adapter: a location plus the
/// material currently occupying it.
///
/// Blocks are transient inputs; they are never persisted. Only the
/// location (as a tag key) survives into storage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Block {
    /// Where the block sits.
    pub location: BlockLocation,
    /// What the block is made of.
    pub material: Material,
}

impl Block {
    /// Create a block from a location and material.
    pub fn new(location: BlockLocation, material: impl Into<Material>) -> Self {
        Self {
            location,
            material: material.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_comparison_is_exact() {
        assert_eq!(Material::from("STONE"), Material::new("STONE"));
        assert_ne!(Material::from("STONE"), Material::from("stone"));
    }

    #[test]
    fn block_equality_covers_location_and_material() {
        let loc = BlockLocation::new("world", 0, 64, 0);
        let a = Block::new(loc.clone(), "DIRT");
        let b = Block::new(loc.clone(), "DIRT");
        let c = Block::new(loc, "GRASS_BLOCK");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
