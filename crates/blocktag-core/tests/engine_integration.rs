//! End-to-end tests: the patch engine wired to a real `SQLite` backend.
//!
//! These mirror the exploit scenario the patch exists for: a player
//! placing, breaking, and piston-shifting the same rewarded block.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::arithmetic_side_effects
)]

use std::collections::BTreeSet;
use std::sync::Arc;

use blocktag_core::{
    BlockRestrictionFilter, EngineConfig, FixedTimeSource, PatchEngine, RestrictionPolicy,
    TimeSource,
};
use blocktag_db::{DatabaseConfig, SqliteTagStore, TagStore};
use blocktag_types::{ActionKind, Block, BlockLocation, Material, RestrictionMode, Vector};
use chrono::{Duration, TimeZone, Utc};

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().unwrap()
}

async fn engine_over_sqlite() -> (PatchEngine, Arc<FixedTimeSource>) {
    let config = DatabaseConfig::new("sqlite::memory:").with_max_connections(1);
    let store = SqliteTagStore::connect(&config)
        .await
        .expect("Failed to open in-memory SQLite");

    let policy = RestrictionPolicy::new(
        RestrictionMode::Blacklist,
        [Material::from("STONE")].into_iter().collect(),
    );
    let time = Arc::new(FixedTimeSource::new(t0()));
    let engine = PatchEngine::new(
        BlockRestrictionFilter::new(policy),
        Arc::clone(&time) as Arc<dyn TimeSource>,
        Arc::new(store) as Arc<dyn TagStore>,
        EngineConfig::new(Duration::seconds(5)),
    );
    (engine, time)
}

fn diamond_ore(x: i32, z: i32) -> Block {
    Block::new(BlockLocation::new("world", x, 12, z), "DIAMOND_ORE")
}

#[tokio::test]
async fn place_break_cycle_is_flagged_then_cleared() {
    let (engine, _) = engine_over_sqlite().await;
    let block = diamond_ore(0, 0);

    // First break: nothing tagged yet, reward is legitimate.
    assert!(
        !engine
            .is_exploit(ActionKind::Break, &block)
            .await
            .unwrap()
    );

    // The player places a rewarded block; the adapter tags it.
    engine.tag(&block, false).await.unwrap();

    // Breaking it again is now an exploit, however long they wait.
    assert!(engine.is_exploit(ActionKind::Break, &block).await.unwrap());

    // After a legitimate break the adapter untags; the next placement
    // starts from a clean slate.
    engine.untag(&block).await.unwrap();
    assert!(
        !engine
            .is_exploit(ActionKind::Break, &block)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn piston_push_carries_the_tag_along() {
    let (engine, _) = engine_over_sqlite().await;
    let block = diamond_ore(4, 0);
    engine.tag(&block, false).await.unwrap();

    // A piston pushes the block one step south.
    let moved: BTreeSet<Block> = std::iter::once(block).collect();
    engine.retag_on_move(&moved, &Vector::SOUTH).await.unwrap();

    // Breaking the block at its new location is still an exploit, and
    // the old location is clean.
    assert!(
        engine
            .is_exploit(ActionKind::Break, &diamond_ore(4, 1))
            .await
            .unwrap()
    );
    assert!(
        !engine
            .is_exploit(ActionKind::Break, &diamond_ore(4, 0))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn ephemeral_tag_expires_across_the_backend() {
    let (engine, time) = engine_over_sqlite().await;
    let block = diamond_ore(8, 0);
    engine.tag(&block, true).await.unwrap();

    assert!(engine.is_exploit(ActionKind::Break, &block).await.unwrap());

    time.set(t0() + Duration::seconds(10));
    assert!(
        !engine
            .is_exploit(ActionKind::Break, &block)
            .await
            .unwrap(),
        "a 10s-old ephemeral tag is past the 5s window"
    );
}

#[tokio::test]
async fn restricted_material_is_invisible_end_to_end() {
    let (engine, _) = engine_over_sqlite().await;
    let stone = Block::new(BlockLocation::new("world", 1, 12, 0), "STONE");

    engine.tag(&stone, false).await.unwrap();
    assert!(
        !engine
            .is_exploit(ActionKind::Break, &stone)
            .await
            .unwrap()
    );
}
