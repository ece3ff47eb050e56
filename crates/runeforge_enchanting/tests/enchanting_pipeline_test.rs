//! Integration test for the full enchant pipeline through the public API.

use std::collections::HashMap;
use std::sync::Arc;

use runeforge_enchanting::{
    ActorContext, BlockGrid, ClearPathSight, EffectTable, EnchantEvent, EnchantRequest,
    EnchantingConfig, EnchantingTable, Item, MaterialClassifier, MaterialStack, PowerConfig, ScanBounds,
    SeededRandom, SessionStore, SourceTier, TriggerDispatcher, TriggerKind,
};
use runeforge_shared::events::HostEvent;
use runeforge_shared::math::{BlockOffset, BlockPos};

fn table() -> EnchantingTable {
    EnchantingTable::from_config(&EnchantingConfig::default(), Arc::new(MaterialClassifier::with_defaults()))
}

fn library(anchor: BlockPos, shelves: usize) -> BlockGrid {
    let mut grid = BlockGrid::new();
    let ring = ScanBounds::from_config(&PowerConfig::default())
        .offsets()
        .filter(|o| o.dx.abs() == 2 || o.dz.abs() == 2);
    for offset in ring.take(shelves) {
        grid.place_bookshelf(anchor + offset);
    }
    grid
}

#[test]
fn test_many_rolls_respect_invariants() {
    let table = table();
    let anchor = BlockPos::new(0, 64, 0);
    let mut grid = library(anchor, 32);
    grid.place_lectern(anchor + BlockOffset::new(1, 1, 1), SourceTier::Master, ["arcane", "arcane", "ember"]);
    let actor = ActorContext::new(1, "tester");
    let held = [MaterialStack::new("echo_shard", 1)];
    let request = EnchantRequest {
        anchor: Some(anchor),
        scanner: &grid,
        actor: &actor,
        held: &held,
        unlock: None,
    };

    let mut rng = SeededRandom::new(2024);
    for material in ["diamond_sword", "iron_pickaxe", "netherite_chestplate", "bow", "book"] {
        for _ in 0..200 {
            let mut item = Item::new(material);
            let outcome = table.enchant(&request, &mut item, &mut rng);

            assert!(outcome.candidates.len() <= runeforge_enchanting::slot_count(outcome.power.total_level));
            assert!(outcome.candidates[0].guaranteed);
            assert_eq!(outcome.candidates[0].probability, 1.0);
            for candidate in outcome.candidates.iter().skip(1) {
                assert!((0.05..=0.95).contains(&candidate.probability));
            }
            for applied in &outcome.applied {
                assert!((1..=applied.definition.max_level).contains(&applied.final_level));
            }

            // Stored set never holds two exclusive enchantments.
            let decoded = table.store().decode(&item);
            let catalog = table.catalog();
            for a in decoded.keys() {
                for b in decoded.keys().filter(|b| *b != a) {
                    let (da, db) = (catalog.get(a).unwrap(), catalog.get(b).unwrap());
                    assert!(!da.is_exclusive_with(&db), "{a} and {b} stored together");
                }
            }
        }
    }
    table.drain_events();
}

#[test]
fn test_event_stream_matches_outcome() {
    let table = table();
    let anchor = BlockPos::ORIGIN;
    let grid = library(anchor, 20);
    let actor = ActorContext::new(5, "mira");
    let request = EnchantRequest {
        anchor: Some(anchor),
        scanner: &grid,
        actor: &actor,
        held: &[],
        unlock: None,
    };
    let mut item = Item::new("iron_helmet");
    let outcome = table.enchant(&request, &mut item, &mut SeededRandom::new(99));

    let events = table.drain_events();
    let applied_events = events
        .iter()
        .filter(|e| matches!(e, EnchantEvent::EnchantmentApplied { .. }))
        .count();
    assert_eq!(applied_events, outcome.applied.len());
    assert_eq!(events[0], EnchantEvent::PowerMeasured { entity: 5, power: 30 });
}

#[test]
fn test_occluded_library_yields_less_power() {
    let anchor = BlockPos::ORIGIN;
    let mut grid = library(anchor, 32);
    // Wall off the +x side at distance 1.
    for dy in 0..=1 {
        for dz in -1..=1 {
            grid.place_solid(anchor + BlockOffset::new(1, dy, dz));
        }
    }
    let open = table().measure(&grid, Some(anchor));
    let walled = table().with_sight_check(ClearPathSight).measure(&grid, Some(anchor));
    assert!(walled.basic_component <= open.basic_component);
    assert_eq!(open.basic_component, 15);
}

#[test]
fn test_unlock_oracle_limits_offers() {
    let table = table();
    let anchor = BlockPos::ORIGIN;
    let grid = library(anchor, 32);
    let actor = ActorContext::new(3, "novice");
    let only_unbreaking = |id: &str, _: &ActorContext| id == "unbreaking";
    let request = EnchantRequest {
        anchor: Some(anchor),
        scanner: &grid,
        actor: &actor,
        held: &[],
        unlock: Some(&only_unbreaking),
    };
    let mut item = Item::new("diamond_sword");
    let outcome = table.enchant(&request, &mut item, &mut SeededRandom::new(5));
    assert_eq!(outcome.candidates.len(), 1);
    assert_eq!(outcome.applied[0].definition.id, "unbreaking");
    assert_eq!(table.store().level_of(&item, "unbreaking"), outcome.applied[0].final_level);
}

#[test]
fn test_stored_enchantments_drive_effects_and_triggers() {
    let table = table();
    let catalog = Arc::clone(table.catalog());
    let mut sword = Item::new("diamond_sword");
    table.store().apply_by_id(&mut sword, "sharpness", 4).unwrap();
    table.store().apply_by_id(&mut sword, "lifesteal", 2).unwrap();

    let decoded = table.store().decode(&sword);
    let effects = EffectTable::with_defaults(Arc::clone(&catalog)).effects_for(&decoded);
    let magnitudes: HashMap<&str, f64> = effects.resolved.iter().map(|e| (e.id.as_str(), e.magnitude)).collect();
    assert_eq!(magnitudes["sharpness"], 5.0);
    assert!((magnitudes["lifesteal"] - 0.1).abs() < 1e-12);
    assert!(effects.unknown.is_empty());

    let sessions = Arc::new(SessionStore::new());
    let mut dispatcher = TriggerDispatcher::new(catalog, Arc::clone(&sessions));
    dispatcher
        .register(TriggerKind::OnHit, "lifesteal", |ctx| {
            let healed = (ctx.event.damage() * 0.05 * f64::from(ctx.level) * 100.0).round() as i64;
            ctx.sessions.increment(
                ctx.event.holder(),
                runeforge_enchanting::SessionKey::Custom("healed".into()),
                healed,
                ctx.event.tick(),
                100,
            );
        })
        .unwrap();

    let hit = HostEvent::EntityHit { attacker: 8, target: 9, damage: 10.0, tick: 1 };
    assert_eq!(dispatcher.dispatch(&hit, &decoded), 1);
    assert_eq!(
        sessions.get(8, &runeforge_enchanting::SessionKey::Custom("healed".into()), 2),
        Some(100)
    );
    assert_eq!(sessions.sweep(500), 1);
    assert!(sessions.is_empty());
}

#[test]
fn test_config_file_round_trip() {
    let path = std::env::temp_dir().join(format!("runeforge_config_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        [power]
        basic_cap = 5

        [[material]]
        material = "glowstone"
        success_rate_bonus = 0.02
        level_bonus = 1
        "#,
    )
    .unwrap();

    let config = EnchantingConfig::from_path(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(config.power.basic_cap, 5);

    let table = EnchantingTable::from_config(&config, Arc::new(MaterialClassifier::with_defaults()));
    let anchor = BlockPos::ORIGIN;
    let grid = library(anchor, 32);
    assert_eq!(table.measure(&grid, Some(anchor)).total_level, 10);
    assert!(!table.catalog().is_empty());
}
