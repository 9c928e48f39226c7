//! Batch-move command objects.
//!
//! When a physics event displaces a set of blocks, each affected tag's key
//! must be rewritten from its old location to its new one. The engine
//! collects all rewrites for one event into an [`OldNewLocationPairSet`]
//! and hands the whole set to the store in a single call, so the backend
//! may apply it as one batch or transaction. These values are transient
//! commands; they are never stored.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::location::BlockLocation;

/// A single "rewrite the tag key at `old` to `new`" instruction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OldNewLocationPair {
    /// Where the tag is currently keyed.
    pub old: BlockLocation,
    /// Where the tag should be keyed after the move.
    pub new: BlockLocation,
}

impl OldNewLocationPair {
    /// Create a rewrite instruction.
    pub const fn new(old: BlockLocation, new: BlockLocation) -> Self {
        Self { old, new }
    }
}

/// An ordered set of independent key rewrites from one physics event.
///
/// Pairs are independent of one another: a pair whose `old` location holds
/// no tag is a silent no-op at the store, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OldNewLocationPairSet(BTreeSet<OldNewLocationPair>);

impl OldNewLocationPairSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Insert a rewrite instruction. Returns `true` if it was not already
    /// present.
    pub fn insert(&mut self, pair: OldNewLocationPair) -> bool {
        self.0.insert(pair)
    }

    /// Number of rewrites in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no rewrites.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the rewrites in key order.
    pub fn iter(&self) -> impl Iterator<Item = &OldNewLocationPair> {
        self.0.iter()
    }
}

impl FromIterator<OldNewLocationPair> for OldNewLocationPairSet {
    fn from_iter<I: IntoIterator<Item = OldNewLocationPair>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for OldNewLocationPairSet {
    type Item = OldNewLocationPair;
    type IntoIter = std::collections::btree_set::IntoIter<OldNewLocationPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a OldNewLocationPairSet {
    type Item = &'a OldNewLocationPair;
    type IntoIter = std::collections::btree_set::Iter<'a, OldNewLocationPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(z_old: i32, z_new: i32) -> OldNewLocationPair {
        OldNewLocationPair::new(
            BlockLocation::new("world", 0, 64, z_old),
            BlockLocation::new("world", 0, 64, z_new),
        )
    }

    #[test]
    fn duplicate_pairs_collapse() {
        let mut set = OldNewLocationPairSet::new();
        assert!(set.insert(pair(0, 1)));
        assert!(!set.insert(pair(0, 1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn collects_from_iterator() {
        let set: OldNewLocationPairSet = vec![pair(0, 1), pair(1, 2)].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }
}
