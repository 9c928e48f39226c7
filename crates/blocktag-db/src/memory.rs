//! In-memory reference implementation of [`TagStore`].
//!
//! A [`BTreeMap`] behind a [`tokio::sync::RwLock`]. This is the executable
//! definition of the store contract: the SQL backends must be
//! observationally equivalent to it. Production deployments use it only
//! when tag persistence across restarts is explicitly not wanted.

use std::collections::BTreeMap;

use async_trait::async_trait;
use blocktag_types::{BlockLocation, OldNewLocationPairSet, Tag};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::store::TagStore;

/// In-memory tag storage.
#[derive(Debug, Default)]
pub struct MemoryTagStore {
    tags: RwLock<BTreeMap<BlockLocation, Tag>>,
}

impl MemoryTagStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            tags: RwLock::const_new(BTreeMap::new()),
        }
    }

    /// Number of tags currently held. Test helper.
    pub async fn len(&self) -> usize {
        self.tags.read().await.len()
    }

    /// Whether the store holds no tags. Test helper.
    pub async fn is_empty(&self) -> bool {
        self.tags.read().await.is_empty()
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn put(&self, tag: &Tag) -> Result<(), StoreError> {
        self.tags
            .write()
            .await
            .insert(tag.location.clone(), tag.clone());
        Ok(())
    }

    async fn delete(&self, location: &BlockLocation) -> Result<(), StoreError> {
        self.tags.write().await.remove(location);
        Ok(())
    }

    async fn find_by_location(
        &self,
        location: &BlockLocation,
    ) -> Result<Option<Tag>, StoreError> {
        Ok(self.tags.read().await.get(location).cloned())
    }

    async fn update_locations(&self, pairs: &OldNewLocationPairSet) -> Result<(), StoreError> {
        let mut tags = self.tags.write().await;

        // Two phases under one lock: detach every affected tag first, then
        // re-insert at the new keys. Overlapping pairs (old of one == new
        // of another) therefore see the pre-move snapshot.
        let mut moved = Vec::with_capacity(pairs.len());
        for pair in pairs {
            if let Some(tag) = tags.remove(&pair.old) {
                moved.push(tag.at_location(pair.new.clone()));
            }
        }
        for tag in moved {
            tags.insert(tag.location.clone(), tag);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blocktag_types::OldNewLocationPair;
    use chrono::Utc;

    use super::*;

    fn loc(z: i32) -> BlockLocation {
        BlockLocation::new("world", 0, 64, z)
    }

    #[tokio::test]
    async fn put_is_an_upsert() {
        let store = MemoryTagStore::new();
        let first = Tag::new(loc(0), false, Utc::now());
        let second = Tag::new(loc(0), true, Utc::now());

        store.put(&first).await.unwrap();
        store.put(&second).await.unwrap();

        assert_eq!(store.len().await, 1);
        let found = store.find_by_location(&loc(0)).await.unwrap().unwrap();
        assert!(found.is_ephemeral);
    }

    #[tokio::test]
    async fn delete_missing_key_is_silent() {
        let store = MemoryTagStore::new();
        store.delete(&loc(7)).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn find_missing_key_is_none() {
        let store = MemoryTagStore::new();
        assert!(store.find_by_location(&loc(3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_locations_preserves_fields() {
        let store = MemoryTagStore::new();
        let created = Utc::now();
        store.put(&Tag::new(loc(0), true, created)).await.unwrap();

        let pairs: OldNewLocationPairSet =
            std::iter::once(OldNewLocationPair::new(loc(0), loc(1))).collect();
        store.update_locations(&pairs).await.unwrap();

        assert!(store.find_by_location(&loc(0)).await.unwrap().is_none());
        let moved = store.find_by_location(&loc(1)).await.unwrap().unwrap();
        assert!(moved.is_ephemeral);
        assert_eq!(moved.created_at, created);
    }

    #[tokio::test]
    async fn overlapping_pairs_shift_a_column() {
        // A piston pushing two stacked tags one step south: 0 -> 1 -> 2.
        let store = MemoryTagStore::new();
        let t = Utc::now();
        store.put(&Tag::new(loc(0), false, t)).await.unwrap();
        store.put(&Tag::new(loc(1), true, t)).await.unwrap();

        let pairs: OldNewLocationPairSet = [
            OldNewLocationPair::new(loc(0), loc(1)),
            OldNewLocationPair::new(loc(1), loc(2)),
        ]
        .into_iter()
        .collect();
        store.update_locations(&pairs).await.unwrap();

        assert!(store.find_by_location(&loc(0)).await.unwrap().is_none());
        let at_one = store.find_by_location(&loc(1)).await.unwrap().unwrap();
        assert!(!at_one.is_ephemeral, "tag from z=0 should now sit at z=1");
        let at_two = store.find_by_location(&loc(2)).await.unwrap().unwrap();
        assert!(at_two.is_ephemeral, "tag from z=1 should now sit at z=2");
    }

    #[tokio::test]
    async fn pair_with_untagged_old_is_a_no_op() {
        let store = MemoryTagStore::new();
        let pairs: OldNewLocationPairSet =
            std::iter::once(OldNewLocationPair::new(loc(5), loc(6))).collect();
        store.update_locations(&pairs).await.unwrap();
        assert!(store.is_empty().await);
    }
}
