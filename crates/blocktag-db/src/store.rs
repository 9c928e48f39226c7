//! The `TagStore` boundary trait.
//!
//! This is the seam between the patch engine and whatever persistence
//! engine a deployment wires in. The contract is deliberately narrow: an
//! upsert, a delete, a point lookup, and a batch key rewrite. Everything
//! else (pooling, retries, schema) lives behind the implementation.

use async_trait::async_trait;
use blocktag_types::{BlockLocation, OldNewLocationPairSet, Tag};

use crate::error::StoreError;

/// Async key-value storage for tags, keyed by [`BlockLocation`].
///
/// Implementations must uphold:
///
/// - **At most one tag per location.** [`put`] is an idempotent upsert
///   that overwrites any existing tag at the same location.
/// - **Missing keys are not errors.** [`delete`] succeeds whether or not
///   a tag existed; [`find_by_location`] returns `None` for absent keys;
///   a rewrite pair whose old location holds no tag is a silent no-op.
/// - **Batch rewrites are applied as one simultaneous snapshot.** In
///   [`update_locations`], an old key that also appears as another
///   pair's new key must not collide: all affected tags are read out
///   before any key is rewritten (a piston push shifts a whole column of
///   blocks by one step, so chains of overlapping pairs are the common
///   case, not the exception).
///
/// Failures surface as [`StoreError`] and are never retried here; the
/// engine propagates them unchanged.
///
/// [`put`]: TagStore::put
/// [`delete`]: TagStore::delete
/// [`find_by_location`]: TagStore::find_by_location
/// [`update_locations`]: TagStore::update_locations
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Insert or overwrite the tag at `tag.location`.
    async fn put(&self, tag: &Tag) -> Result<(), StoreError>;

    /// Remove the tag at `location`, if any.
    async fn delete(&self, location: &BlockLocation) -> Result<(), StoreError>;

    /// Return the tag at `location`, or `None` if the location is untagged.
    async fn find_by_location(
        &self,
        location: &BlockLocation,
    ) -> Result<Option<Tag>, StoreError>;

    /// Rewrite tag keys in bulk: for each pair, the tag stored at `old`
    /// (if any) is re-keyed to `new` with its other fields preserved.
    async fn update_locations(&self, pairs: &OldNewLocationPairSet) -> Result<(), StoreError>;
}
