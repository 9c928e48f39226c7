//! The patch engine: tagging, untagging, bulk retagging, and exploit
//! classification.
//!
//! The game-event adapter maps native block events to the four operations
//! here. All of them are async and non-blocking from the caller's
//! perspective; store failures propagate unchanged and are never retried
//! at this layer. The engine imposes no ordering across concurrent calls,
//! including calls that race on the same location -- per-location mutual
//! exclusion, where needed, belongs to the storage engine or its caller.

use std::collections::BTreeSet;
use std::sync::Arc;

use blocktag_db::{StoreError, TagStore};
use blocktag_types::{ActionKind, Block, BlockLocation, OldNewLocationPair, OldNewLocationPairSet, Tag, Vector};
use chrono::Duration;

use crate::filter::BlockRestrictionFilter;
use crate::time::TimeSource;

/// Engine tuning values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// How long an ephemeral tag keeps signaling an exploit after its
    /// creation. Must be non-negative; enforced by the configuration
    /// loader.
    pub ephemeral_active_window: Duration,
}

impl EngineConfig {
    /// Create a config from an ephemeral active window.
    pub const fn new(ephemeral_active_window: Duration) -> Self {
        Self {
            ephemeral_active_window,
        }
    }
}

/// Errors that can occur in the patch engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The storage backend failed; propagated unchanged from the store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Displacing a location left the representable coordinate range.
    /// Real worlds never reach the boundary, so this indicates corrupt
    /// adapter input; the whole batch is rejected before any store call.
    #[error("coordinate overflow displacing {location} by {direction}")]
    CoordinateOverflow {
        /// The location that could not be displaced.
        location: BlockLocation,
        /// The displacement that overflowed.
        direction: Vector,
    },
}

/// Orchestrates tag bookkeeping for the exploit patch.
///
/// Holds the restriction filter, an injected [`TimeSource`], and the
/// [`TagStore`] boundary. Restricted materials short-circuit every
/// operation without touching the store; that no-op is part of the
/// observable contract, not an optimization detail.
pub struct PatchEngine {
    filter: BlockRestrictionFilter,
    time: Arc<dyn TimeSource>,
    store: Arc<dyn TagStore>,
    config: EngineConfig,
}

impl PatchEngine {
    /// Create an engine from its collaborators.
    pub fn new(
        filter: BlockRestrictionFilter,
        time: Arc<dyn TimeSource>,
        store: Arc<dyn TagStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            filter,
            time,
            store,
            config,
        }
    }

    /// Record that a reward has been granted for `block`'s location.
    ///
    /// Upserts a [`Tag`] timestamped with the injected clock. Restricted
    /// materials are a guaranteed no-op with zero store interaction.
    pub async fn tag(&self, block: &Block, is_ephemeral: bool) -> Result<(), EngineError> {
        if self.filter.is_restricted(&block.material) {
            return Ok(());
        }
        let tag = Tag::new(block.location.clone(), is_ephemeral, self.time.now());
        self.store.put(&tag).await?;
        Ok(())
    }

    /// Remove the tag at `block`'s location after a legitimate break.
    ///
    /// Restricted materials are skipped without a store call: under
    /// normal operation such locations never hold a tag, and avoiding
    /// the delete keeps break handling cheap. The accepted cost is a
    /// "ghost tag" left behind when a material becomes restricted after
    /// tags for it were already created.
    pub async fn untag(&self, block: &Block) -> Result<(), EngineError> {
        if self.filter.is_restricted(&block.material) {
            return Ok(());
        }
        self.store.delete(&block.location).await?;
        Ok(())
    }

    /// Re-key tags for a set of blocks displaced by one step.
    ///
    /// Filters `blocks` through the restriction policy, computes
    /// `new = old + direction` for each survivor, and hands all pairs to
    /// the store in a single call so the backend may apply them as one
    /// batch. If no block survives the filter, the store is not called.
    pub async fn retag_on_move(
        &self,
        blocks: &BTreeSet<Block>,
        direction: &Vector,
    ) -> Result<(), EngineError> {
        let surviving = self.filter.filter(blocks);
        if surviving.is_empty() {
            return Ok(());
        }

        let mut pairs = OldNewLocationPairSet::new();
        for block in &surviving {
            let new = block.location.offset(direction).ok_or_else(|| {
                EngineError::CoordinateOverflow {
                    location: block.location.clone(),
                    direction: *direction,
                }
            })?;
            pairs.insert(OldNewLocationPair::new(block.location.clone(), new));
        }

        self.store.update_locations(&pairs).await?;
        tracing::debug!(moved = pairs.len(), "Retagged displaced blocks");
        Ok(())
    }

    /// Classify an action against `block` as exploitative or legitimate.
    ///
    /// Restricted materials are never exploit targets and return `false`
    /// with zero store interaction. Otherwise the stored tag decides:
    ///
    /// - no tag: `false`
    /// - persistent tag: `true`, regardless of age
    /// - ephemeral tag: `true` while its age is within the configured
    ///   active window, `false` once it has aged past it (the record is
    ///   left in place; expiry is a read-side interpretation)
    pub async fn is_exploit(
        &self,
        action: ActionKind,
        block: &Block,
    ) -> Result<bool, EngineError> {
        if self.filter.is_restricted(&block.material) {
            return Ok(false);
        }

        let Some(tag) = self.store.find_by_location(&block.location).await? else {
            return Ok(false);
        };

        let exploit = if tag.is_ephemeral {
            let age = self.time.now().signed_duration_since(tag.created_at);
            age <= self.config.ephemeral_active_window
        } else {
            true
        };

        tracing::debug!(
            ?action,
            location = %block.location,
            ephemeral = tag.is_ephemeral,
            exploit,
            "Classified tagged block"
        );
        Ok(exploit)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use blocktag_db::MemoryTagStore;
    use blocktag_types::{Material, RestrictionMode};
    use chrono::{TimeZone, Utc};

    use crate::filter::RestrictionPolicy;
    use crate::time::FixedTimeSource;

    use super::*;

    /// Wraps [`MemoryTagStore`] and counts every call, so tests can
    /// assert the zero-interaction guarantees of the restricted fast
    /// paths.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryTagStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TagStore for CountingStore {
        async fn put(&self, tag: &Tag) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.put(tag).await
        }

        async fn delete(&self, location: &BlockLocation) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(location).await
        }

        async fn find_by_location(
            &self,
            location: &BlockLocation,
        ) -> Result<Option<Tag>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_location(location).await
        }

        async fn update_locations(
            &self,
            pairs: &OldNewLocationPairSet,
        ) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.update_locations(pairs).await
        }
    }

    fn t0() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().unwrap()
    }

    fn blacklist(names: &[&str]) -> BlockRestrictionFilter {
        BlockRestrictionFilter::new(RestrictionPolicy::new(
            RestrictionMode::Blacklist,
            names.iter().copied().map(Material::from).collect(),
        ))
    }

    fn loc(x: i32, z: i32) -> BlockLocation {
        BlockLocation::new("world", x, 64, z)
    }

    fn block(x: i32, z: i32, material: &str) -> Block {
        Block::new(loc(x, z), material)
    }

    /// Engine over a counting store: blacklist {STONE, DIRT}, clock
    /// frozen at `t0`, 5 second ephemeral window.
    fn engine() -> (PatchEngine, Arc<CountingStore>, Arc<FixedTimeSource>) {
        let store = Arc::new(CountingStore::default());
        let time = Arc::new(FixedTimeSource::new(t0()));
        let engine = PatchEngine::new(
            blacklist(&["STONE", "DIRT"]),
            Arc::clone(&time) as Arc<dyn TimeSource>,
            Arc::clone(&store) as Arc<dyn TagStore>,
            EngineConfig::new(Duration::seconds(5)),
        );
        (engine, store, time)
    }

    #[tokio::test]
    async fn tag_restricted_block_never_touches_the_store() {
        let (engine, store, _) = engine();
        engine.tag(&block(0, 0, "STONE"), false).await.unwrap();
        engine.tag(&block(0, 1, "DIRT"), true).await.unwrap();
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn tag_unrestricted_block_upserts_with_clock_timestamp() {
        let (engine, store, _) = engine();
        engine.tag(&block(0, 0, "WOOD"), false).await.unwrap();

        let stored = store
            .inner
            .find_by_location(&loc(0, 0))
            .await
            .unwrap()
            .expect("tag should be stored");
        assert_eq!(stored.location, loc(0, 0));
        assert!(!stored.is_ephemeral);
        assert_eq!(stored.created_at, t0());
    }

    #[tokio::test]
    async fn tag_ephemeral_flag_is_preserved() {
        let (engine, store, _) = engine();
        engine.tag(&block(0, 0, "WOOD"), true).await.unwrap();
        let stored = store
            .inner
            .find_by_location(&loc(0, 0))
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_ephemeral);
    }

    #[tokio::test]
    async fn re_tagging_overwrites_the_existing_tag() {
        let (engine, store, time) = engine();
        engine.tag(&block(0, 0, "WOOD"), true).await.unwrap();
        time.set(t0() + Duration::seconds(30));
        engine.tag(&block(0, 0, "WOOD"), false).await.unwrap();

        assert_eq!(store.inner.len().await, 1);
        let stored = store
            .inner
            .find_by_location(&loc(0, 0))
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.is_ephemeral);
        assert_eq!(stored.created_at, t0() + Duration::seconds(30));
    }

    #[tokio::test]
    async fn untag_restricted_block_never_touches_the_store() {
        let (engine, store, _) = engine();
        engine.untag(&block(0, 0, "DIRT")).await.unwrap();
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn untag_unrestricted_block_deletes_exactly_that_location() {
        let (engine, store, _) = engine();
        engine.tag(&block(0, 0, "WOOD"), false).await.unwrap();
        engine.tag(&block(0, 1, "WOOD"), false).await.unwrap();

        engine.untag(&block(0, 0, "WOOD")).await.unwrap();

        assert!(store.inner.find_by_location(&loc(0, 0)).await.unwrap().is_none());
        assert!(store.inner.find_by_location(&loc(0, 1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn retag_on_move_shifts_only_unrestricted_blocks() {
        let (engine, store, _) = engine();
        engine.tag(&block(0, 0, "WOOD"), false).await.unwrap();
        // A stone block at z=1 carries no tag; even if it did, the move
        // must ignore it.
        store
            .inner
            .put(&Tag::new(loc(0, 1), false, t0()))
            .await
            .unwrap();

        let blocks: BTreeSet<Block> = [block(0, 0, "WOOD"), block(0, 1, "STONE")]
            .into_iter()
            .collect();
        engine
            .retag_on_move(&blocks, &Vector::new(0, 0, 1))
            .await
            .unwrap();

        // WOOD tag moved from z=0 to z=1 (overwriting the stray stone
        // tag); the STONE block produced no pair, so nothing moved to z=2.
        assert!(store.inner.find_by_location(&loc(0, 0)).await.unwrap().is_none());
        assert!(store.inner.find_by_location(&loc(0, 1)).await.unwrap().is_some());
        assert!(store.inner.find_by_location(&loc(0, 2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn retag_on_move_with_all_blocks_restricted_never_calls_the_store() {
        let (engine, store, _) = engine();
        let blocks: BTreeSet<Block> = [block(0, 0, "STONE"), block(0, 1, "DIRT")]
            .into_iter()
            .collect();
        engine
            .retag_on_move(&blocks, &Vector::new(0, 0, 1))
            .await
            .unwrap();
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn retag_on_move_rejects_coordinate_overflow_before_any_store_call() {
        let (engine, store, _) = engine();
        let blocks: BTreeSet<Block> =
            std::iter::once(Block::new(BlockLocation::new("world", i32::MAX, 64, 0), "WOOD"))
                .collect();
        let result = engine.retag_on_move(&blocks, &Vector::EAST).await;
        assert!(matches!(
            result,
            Err(EngineError::CoordinateOverflow { .. })
        ));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn is_exploit_restricted_block_is_false_with_zero_interaction() {
        let (engine, store, _) = engine();
        // Even a tagged restricted location is never flagged.
        store
            .inner
            .put(&Tag::new(loc(0, 0), false, t0()))
            .await
            .unwrap();
        let exploit = engine
            .is_exploit(ActionKind::Break, &block(0, 0, "STONE"))
            .await
            .unwrap();
        assert!(!exploit);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn is_exploit_untagged_location_is_false() {
        let (engine, _, _) = engine();
        let exploit = engine
            .is_exploit(ActionKind::Break, &block(0, 0, "WOOD"))
            .await
            .unwrap();
        assert!(!exploit);
    }

    #[tokio::test]
    async fn is_exploit_persistent_tag_is_true_regardless_of_age() {
        let (engine, _, time) = engine();
        engine.tag(&block(0, 0, "WOOD"), false).await.unwrap();
        time.set(t0() + Duration::days(365));
        let exploit = engine
            .is_exploit(ActionKind::Break, &block(0, 0, "WOOD"))
            .await
            .unwrap();
        assert!(exploit);
    }

    #[tokio::test]
    async fn is_exploit_fresh_ephemeral_tag_is_true() {
        let (engine, _, _) = engine();
        engine.tag(&block(0, 0, "WOOD"), true).await.unwrap();
        let exploit = engine
            .is_exploit(ActionKind::Break, &block(0, 0, "WOOD"))
            .await
            .unwrap();
        assert!(exploit, "a tag created now must be active");
    }

    #[tokio::test]
    async fn is_exploit_expired_ephemeral_tag_is_false() {
        let (engine, store, time) = engine();
        engine.tag(&block(0, 0, "WOOD"), true).await.unwrap();
        time.set(t0() + Duration::seconds(10));

        let exploit = engine
            .is_exploit(ActionKind::Break, &block(0, 0, "WOOD"))
            .await
            .unwrap();
        assert!(!exploit, "a 10s-old tag is past the 5s window");

        // Expiry is read-side only: the record stays in the store.
        assert!(store.inner.find_by_location(&loc(0, 0)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn is_exploit_at_the_window_boundary_is_still_active() {
        let (engine, _, time) = engine();
        engine.tag(&block(0, 0, "WOOD"), true).await.unwrap();
        time.set(t0() + Duration::seconds(5));
        let exploit = engine
            .is_exploit(ActionKind::Break, &block(0, 0, "WOOD"))
            .await
            .unwrap();
        assert!(exploit, "age equal to the window is within it");
    }
}
