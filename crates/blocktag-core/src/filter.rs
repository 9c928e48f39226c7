//! Material restriction policy and block filtering.
//!
//! Operators exempt materials from tag tracking (farmable crops, cheap
//! bulk blocks) through a restriction policy. The filter is a pure
//! function over immutable inputs; it holds no state beyond the policy
//! and performs no I/O.

use std::collections::BTreeSet;

use blocktag_types::{Block, Material, RestrictionMode};

/// A validated restriction policy: a material set plus the mode that
/// gives the set its meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestrictionPolicy {
    mode: RestrictionMode,
    materials: BTreeSet<Material>,
}

impl RestrictionPolicy {
    /// Create a policy from a mode and a material set.
    ///
    /// Any combination is valid; in particular, [`RestrictionMode::Disabled`]
    /// with a non-empty set is how operators park a list while enforcement
    /// is switched off.
    pub const fn new(mode: RestrictionMode, materials: BTreeSet<Material>) -> Self {
        Self { mode, materials }
    }

    /// The active restriction mode.
    pub const fn mode(&self) -> RestrictionMode {
        self.mode
    }

    /// The configured material set.
    pub const fn materials(&self) -> &BTreeSet<Material> {
        &self.materials
    }
}

/// Classifies block materials as restricted or unrestricted per the
/// configured [`RestrictionPolicy`].
///
/// Restricted materials are invisible to the patch: they are never
/// tagged, never untagged, never moved, and never flagged as exploit
/// targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRestrictionFilter {
    policy: RestrictionPolicy,
}

impl BlockRestrictionFilter {
    /// Create a filter from a policy.
    pub const fn new(policy: RestrictionPolicy) -> Self {
        Self { policy }
    }

    /// Whether `material` is restricted under the configured policy.
    pub fn is_restricted(&self, material: &Material) -> bool {
        match self.policy.mode {
            RestrictionMode::Blacklist => self.policy.materials.contains(material),
            RestrictionMode::Whitelist => !self.policy.materials.contains(material),
            RestrictionMode::Disabled => false,
        }
    }

    /// Return the subset of `blocks` whose materials are unrestricted.
    ///
    /// An empty input yields an empty output for every policy.
    pub fn filter(&self, blocks: &BTreeSet<Block>) -> BTreeSet<Block> {
        blocks
            .iter()
            .filter(|block| !self.is_restricted(&block.material))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use blocktag_types::BlockLocation;

    use super::*;

    fn materials(names: &[&str]) -> BTreeSet<Material> {
        names.iter().copied().map(Material::from).collect()
    }

    fn filter(mode: RestrictionMode, names: &[&str]) -> BlockRestrictionFilter {
        BlockRestrictionFilter::new(RestrictionPolicy::new(mode, materials(names)))
    }

    fn block(x: i32, material: &str) -> Block {
        Block::new(BlockLocation::new("world", x, 64, 0), material)
    }

    #[test]
    fn empty_input_filters_to_empty_for_every_mode() {
        let empty = BTreeSet::new();
        for mode in [
            RestrictionMode::Blacklist,
            RestrictionMode::Whitelist,
            RestrictionMode::Disabled,
        ] {
            assert!(filter(mode, &["STONE"]).filter(&empty).is_empty());
            assert!(filter(mode, &[]).filter(&empty).is_empty());
        }
    }

    #[test]
    fn blacklist_restricts_listed_materials() {
        let f = filter(RestrictionMode::Blacklist, &["STONE", "DIRT"]);
        assert!(f.is_restricted(&Material::from("STONE")));
        assert!(f.is_restricted(&Material::from("DIRT")));
        assert!(!f.is_restricted(&Material::from("WOOD")));
    }

    #[test]
    fn blacklist_filter_keeps_unlisted_blocks() {
        let f = filter(RestrictionMode::Blacklist, &["STONE", "DIRT"]);
        let blocks: BTreeSet<Block> = [
            block(0, "STONE"),
            block(1, "DIRT"),
            block(2, "WOOD"),
            block(3, "BEACON"),
        ]
        .into_iter()
        .collect();

        let kept = f.filter(&blocks);
        let expected: BTreeSet<Block> = [block(2, "WOOD"), block(3, "BEACON")]
            .into_iter()
            .collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn whitelist_restricts_everything_but_listed_materials() {
        let f = filter(RestrictionMode::Whitelist, &["BEACON"]);
        assert!(!f.is_restricted(&Material::from("BEACON")));
        assert!(f.is_restricted(&Material::from("STONE")));
        assert!(f.is_restricted(&Material::from("DIRT")));
    }

    #[test]
    fn disabled_restricts_nothing() {
        for names in [&["STONE", "DIRT"][..], &[][..]] {
            let f = filter(RestrictionMode::Disabled, names);
            assert!(!f.is_restricted(&Material::from("STONE")));
            assert!(!f.is_restricted(&Material::from("ANYTHING_AT_ALL")));
        }
    }
}
