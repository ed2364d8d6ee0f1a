//! Event log and snapshot persistence.

use melee_core::{
    config::BattleConfig,
    engine::BattleEngine,
    error::SimError,
    event::SimEvent,
    snapshot::SNAPSHOT_INTERVAL,
    store::SimStore,
};

const DT: f64 = 1.0 / 60.0;

fn build(run_id: &str, seed: u64) -> (BattleEngine, SimStore) {
    let store = SimStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    let engine = BattleEngine::build_test(run_id.to_string(), seed).expect("engine");
    store
        .insert_run(run_id, seed, "0.1.0-test", engine.config(), 0)
        .expect("insert run");
    (engine, store)
}

/// Drive the engine the way the runner does: one tick, one batch.
fn record(engine: &mut BattleEngine, store: &mut SimStore, ticks: u64) {
    if let Some(event) = engine.start() {
        store.append_events(&engine.run_id, engine.generation(), engine.current_tick(), &[event]).unwrap();
    }
    for _ in 0..ticks {
        let events = engine.tick(DT);
        if events.is_empty() {
            break;
        }
        store.append_events(&engine.run_id, engine.generation(), engine.current_tick(), &events).unwrap();
        if engine.current_tick() % SNAPSHOT_INTERVAL == 0 {
            store.save_snapshot(&engine.snapshot()).unwrap();
        }
    }
}

#[test]
fn tick_events_are_logged_in_order() {
    let (mut engine, mut store) = build("log-order", 42);
    record(&mut engine, &mut store, 10);

    let entries = store.events_for_tick("log-order", 0, 3).unwrap();
    assert!(entries.len() >= 2);
    assert_eq!(entries.first().unwrap().event_type, "tick_started");
    assert_eq!(entries.last().unwrap().event_type, "tick_completed");

    let first: SimEvent = serde_json::from_str(&entries[0].payload).unwrap();
    assert!(matches!(first, SimEvent::TickStarted { tick: 3, .. }));

    assert_eq!(store.event_count("log-order", "tick_completed").unwrap(), 10);
    assert_eq!(store.event_count("log-order", "battle_started").unwrap(), 1);
}

#[test]
fn resets_keep_their_events_apart() {
    let (mut engine, mut store) = build("gen", 42);
    record(&mut engine, &mut store, 3);
    let reset = engine.reset();
    store
        .append_events(&engine.run_id, engine.generation(), engine.current_tick(), &[reset])
        .unwrap();
    record(&mut engine, &mut store, 3);

    for generation in [0, 1] {
        let entries = store.events_for_tick("gen", generation, 2).unwrap();
        let types: Vec<_> = entries.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, ["tick_started", "tick_completed"], "generation {generation}");
        assert!(entries.iter().all(|e| e.generation == generation));
    }

    let reset_entries = store.events_for_tick("gen", 1, 0).unwrap();
    assert!(reset_entries.iter().any(|e| e.event_type == "battle_reset"));
    assert!(store.events_for_tick("gen", 2, 2).unwrap().is_empty());
}

#[test]
fn full_battle_logs_every_kill_and_one_decision() {
    let (mut engine, mut store) = build("log-battle", 7);
    record(&mut engine, &mut store, 100_000);

    assert!(engine.winner().is_some());
    assert_eq!(store.event_count("log-battle", "battle_decided").unwrap(), 1);
    let kills = store.event_count("log-battle", "unit_killed").unwrap();
    let survivors = engine.roster().len() as i64;
    assert_eq!(kills + survivors, 5);
}

#[test]
fn snapshots_restore_the_roster() {
    let (mut engine, mut store) = build("snap", 42);
    record(&mut engine, &mut store, SNAPSHOT_INTERVAL * 2 + 5);

    let snap = store
        .latest_snapshot_before("snap", SNAPSHOT_INTERVAL * 2 + 3)
        .unwrap()
        .expect("snapshot exists");
    assert_eq!(snap.tick, SNAPSHOT_INTERVAL * 2);
    assert_eq!(snap.clock.current_tick, SNAPSHOT_INTERVAL * 2);
    assert!(!snap.roster.is_empty());

    assert!(store.latest_snapshot_before("snap", SNAPSHOT_INTERVAL - 1).unwrap().is_none());
}

#[test]
fn recorded_setup_replays_the_same_battle() {
    let (mut engine, mut store) = build("replay", 1234);
    record(&mut engine, &mut store, 100_000);

    let (seed, config) = store.run_setup("replay").unwrap();
    assert_eq!(seed, 1234);
    assert_eq!(config, BattleConfig::default_test());

    let mut replay = BattleEngine::new("replay-2".into(), seed, config).unwrap();
    replay.run_ticks(100_000, DT);
    assert_eq!(replay.outcome(), engine.outcome());
    assert_eq!(replay.frame(), engine.frame());
}

#[test]
fn unknown_run_is_reported() {
    let store = SimStore::in_memory().unwrap();
    store.migrate().unwrap();
    assert!(matches!(store.run_setup("missing"), Err(SimError::RunNotInitialized)));
}
