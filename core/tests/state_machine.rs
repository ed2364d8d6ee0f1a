//! Control surface: start / pause / reset / winner.

use melee_core::{
    command::ControlCommand,
    config::BattleConfig,
    engine::BattleEngine,
    event::{Outcome, SimEvent},
    snapshot::BattleState,
    unit::Team,
};

const DT: f64 = 1.0 / 60.0;

fn build(run_id: &str, seed: u64) -> BattleEngine {
    BattleEngine::build_test(run_id.to_string(), seed).expect("build test engine")
}

#[test]
fn new_engine_is_idle_with_full_roster() {
    let engine = build("idle-test", 42);
    assert_eq!(engine.state(), BattleState::Idle);
    assert_eq!(engine.winner(), None);
    assert_eq!(engine.living(Team::Man), 3);
    assert_eq!(engine.living(Team::Gorilla), 2);
    assert!(engine.roster().iter().all(|u| u.hp() == u.max_hp()));
}

#[test]
fn frame_carries_the_arena_and_every_living_unit() {
    let engine = build("frame-test", 42);
    let frame = engine.frame();
    assert_eq!(frame.arena, BattleConfig::default_test().arena);
    assert_eq!(frame.living(Team::Man), 3);
    assert_eq!(frame.living(Team::Gorilla), 2);
    assert_eq!(frame.state, BattleState::Idle);
}

#[test]
fn ticks_before_start_do_nothing() {
    let mut engine = build("no-start-test", 42);
    let before = engine.frame();
    assert!(engine.tick(DT).is_empty());
    assert_eq!(engine.frame(), before);
    assert_eq!(engine.current_tick(), 0);
}

#[test]
fn start_is_idempotent() {
    let mut engine = build("start-twice-test", 42);
    assert!(matches!(engine.start(), Some(SimEvent::BattleStarted { tick: 0 })));
    assert_eq!(engine.start(), None);
    assert_eq!(engine.state(), BattleState::Running);
}

#[test]
fn pause_freezes_roster_and_resume_continues() {
    let mut engine = build("pause-test", 42);
    engine.run_ticks(20, DT);
    assert!(engine.pause().is_some());
    assert_eq!(engine.state(), BattleState::Paused);
    assert_eq!(engine.pause(), None);

    let frozen = engine.snapshot();
    for _ in 0..10 {
        assert!(engine.tick(DT).is_empty());
    }
    assert_eq!(engine.roster(), frozen.roster.as_slice());
    assert_eq!(engine.current_tick(), 20);

    assert!(engine.start().is_some());
    engine.tick(DT);
    assert_eq!(engine.current_tick(), 21);
}

#[test]
fn reset_mid_battle_returns_to_idle_with_fresh_units() {
    let mut engine = build("reset-test", 42);
    engine.run_ticks(200, DT);
    let old_ids: Vec<u64> = engine.roster().iter().map(|u| u.id()).collect();

    let event = engine.reset();
    assert!(matches!(event, SimEvent::BattleReset { generation: 1, men: 3, gorillas: 2 }));
    assert_eq!(engine.state(), BattleState::Idle);
    assert_eq!(engine.winner(), None);
    assert_eq!(engine.current_tick(), 0);

    // A stale tick from the cancelled loop must not touch the new roster.
    let fresh = engine.frame();
    assert!(engine.tick(DT).is_empty());
    assert_eq!(engine.frame(), fresh);

    // Ids are never reused across resets.
    assert!(engine.roster().iter().all(|u| !old_ids.contains(&u.id())));
}

#[test]
fn double_reset_yields_matching_rosters() {
    let mut engine = BattleEngine::new("double-reset".into(), 9, BattleConfig::skirmish()).unwrap();
    engine.reset();
    let first: Vec<(Team, f64, f64)> = engine
        .roster()
        .iter()
        .map(|u| (u.team(), u.hp(), u.max_hp()))
        .collect();
    engine.reset();
    let second: Vec<(Team, f64, f64)> = engine
        .roster()
        .iter()
        .map(|u| (u.team(), u.hp(), u.max_hp()))
        .collect();

    assert_eq!(first.len(), 101);
    assert_eq!(first, second);
    assert!(second.iter().all(|(_, hp, max)| hp == max));
}

#[test]
fn one_sided_roster_is_decided_without_ai() {
    let mut cfg = BattleConfig::default_test();
    cfg.gorilla.count = 0;
    let mut engine = BattleEngine::new("one-sided".into(), 1, cfg).unwrap();
    let before = engine.frame();

    engine.start();
    let events = engine.tick(DT);

    assert_eq!(
        events,
        vec![SimEvent::BattleDecided { tick: 0, outcome: Outcome::Winner(Team::Man) }]
    );
    assert_eq!(engine.winner(), Some(Team::Man));
    assert_eq!(engine.current_tick(), 0);
    assert_eq!(engine.frame().units, before.units);
}

#[test]
fn empty_field_is_a_draw() {
    let mut cfg = BattleConfig::default_test();
    cfg.man.count = 0;
    cfg.gorilla.count = 0;
    let mut engine = BattleEngine::new("draw".into(), 1, cfg).unwrap();
    engine.start();
    engine.tick(DT);

    assert_eq!(engine.outcome(), Some(Outcome::Draw));
    assert_eq!(engine.winner(), None);
    assert_eq!(engine.state(), BattleState::Victory(Outcome::Draw));
}

#[test]
fn victory_is_terminal() {
    let mut engine = build("terminal-test", 42);
    engine.run_ticks(100_000, DT);
    let winner = engine.winner();
    assert!(winner.is_some());

    let decided = engine.frame();
    for _ in 0..50 {
        assert!(engine.tick(DT).is_empty());
    }
    assert_eq!(engine.start(), None);
    assert_eq!(engine.pause(), None);
    assert_eq!(engine.frame(), decided);
    assert_eq!(engine.winner(), winner);
}

#[test]
fn control_commands_drive_the_engine() {
    let mut engine = build("command-test", 42);
    assert!(engine.apply(&ControlCommand::Tick { count: 5, dt: DT }).is_empty());

    engine.apply(&ControlCommand::Start);
    let events = engine.apply(&ControlCommand::Tick { count: 5, dt: DT });
    let completed = events
        .iter()
        .filter(|e| matches!(e, SimEvent::TickCompleted { .. }))
        .count();
    assert_eq!(completed, 5);

    engine.apply(&ControlCommand::Pause);
    assert_eq!(engine.state(), BattleState::Paused);

    let events = engine.apply(&ControlCommand::Reset);
    assert!(matches!(events.as_slice(), [SimEvent::BattleReset { .. }]));
    assert_eq!(engine.state(), BattleState::Idle);
}

#[test]
fn control_commands_parse_from_json() {
    let cmd: ControlCommand = serde_json::from_str(r#"{"cmd":"tick","count":3,"dt":0.02}"#).unwrap();
    assert_eq!(cmd, ControlCommand::Tick { count: 3, dt: 0.02 });
    let cmd: ControlCommand = serde_json::from_str(r#"{"cmd":"reset"}"#).unwrap();
    assert_eq!(cmd, ControlCommand::Reset);
}
