//! The persisted tag record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::BlockLocation;

/// A persisted marker recording that a reward has already been granted for
/// a block location.
///
/// At most one tag exists per [`BlockLocation`] at any time; the storage
/// backend enforces this with upsert semantics. A *persistent* tag
/// (`is_ephemeral == false`) signals an exploit on rediscovery regardless
/// of age. An *ephemeral* tag only does so within a configured active
/// window after `created_at`, after which it is treated as expired even
/// though the record may still be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// The location this tag is keyed by.
    pub location: BlockLocation,
    /// Whether this tag expires after the configured active window.
    pub is_ephemeral: bool,
    /// When the tag was created or last overwritten.
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a tag for a location.
    pub const fn new(location: BlockLocation, is_ephemeral: bool, created_at: DateTime<Utc>) -> Self {
        Self {
            location,
            is_ephemeral,
            created_at,
        }
    }

    /// Return a copy of this tag keyed by a different location, with all
    /// other fields preserved. Used when the underlying block physically
    /// moves.
    pub fn at_location(&self, location: BlockLocation) -> Self {
        Self {
            location,
            is_ephemeral: self.is_ephemeral,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_location_preserves_other_fields() {
        let created = Utc::now();
        let tag = Tag::new(BlockLocation::new("world", 0, 64, 0), true, created);
        let moved = tag.at_location(BlockLocation::new("world", 0, 64, 1));
        assert_eq!(moved.location, BlockLocation::new("world", 0, 64, 1));
        assert!(moved.is_ephemeral);
        assert_eq!(moved.created_at, created);
    }
}
