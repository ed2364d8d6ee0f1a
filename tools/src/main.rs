//! battle-runner: headless battle runner.
//!
//! Usage:
//!   battle-runner --seed 12345 --preset skirmish --db battle.db
//!   battle-runner --config data/ragdoll.json --dt 0.0166 --max-ticks 20000
//!   battle-runner --seed 12345 --ipc-mode

use anyhow::{bail, Result};
use melee_core::{
    command::ControlCommand,
    config::BattleConfig,
    engine::BattleEngine,
    event::SimEvent,
    snapshot::{RenderFrame, SNAPSHOT_INTERVAL},
    store::SimStore,
    unit::Team,
};
use std::env;
use std::io::{self, BufRead, Write};

/// One JSON line on stdin, e.g. `{"cmd":"tick","count":60,"dt":0.0166}`.
#[derive(serde::Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum IpcRequest {
    GetState,
    Start,
    Pause,
    Reset,
    Tick { count: u64, dt: f64 },
    Quit,
}

impl IpcRequest {
    fn control(&self) -> Option<ControlCommand> {
        match *self {
            Self::Start => Some(ControlCommand::Start),
            Self::Pause => Some(ControlCommand::Pause),
            Self::Reset => Some(ControlCommand::Reset),
            Self::Tick { count, dt } => Some(ControlCommand::Tick { count, dt }),
            Self::GetState | Self::Quit => None,
        }
    }
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    frame:   RenderFrame,
    winner:  Option<Team>,
    banner:  Option<&'static str>,
    events:  &'a [SimEvent],
}

/// Persists engine output: every event, plus a snapshot on interval ticks.
struct Recorder {
    store:  SimStore,
    run_id: String,
}

impl Recorder {
    fn record(&mut self, engine: &BattleEngine, events: &[SimEvent]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let tick = engine.current_tick();
        self.store.append_events(&self.run_id, engine.generation(), tick, events)?;
        let ticked = events.iter().any(|e| matches!(e, SimEvent::TickCompleted { .. }));
        if ticked && tick % SNAPSHOT_INTERVAL == 0 {
            self.store.save_snapshot(&engine.snapshot())?;
            log::debug!("Snapshot saved at tick {tick}");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let max_ticks = parse_arg(&args, "--max-ticks", 60 * 60 * 10u64);
    let dt = parse_arg(&args, "--dt", 1.0 / 60.0f64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = find_arg(&args, "--db").unwrap_or(":memory:");
    let preset = find_arg(&args, "--preset").unwrap_or("skirmish");

    let config = match find_arg(&args, "--config") {
        Some(path) => BattleConfig::load(path)?,
        None => match BattleConfig::preset(preset) {
            Some(cfg) => cfg,
            None => bail!("unknown preset '{preset}' (expected skirmish, ragdoll or test)"),
        },
    };

    if !ipc_mode {
        println!("Melee battle runner");
        println!("  seed:      {seed}");
        println!("  preset:    {preset}");
        println!("  dt:        {dt:.4}");
        println!("  max ticks: {max_ticks}");
        println!("  db:        {db}");
        println!("  units:     {} men vs {} gorillas", config.man.count, config.gorilla.count);
        println!();
    }

    let store = SimStore::open(db)?;
    store.migrate()?;

    let run_id = format!("battle-{}", uuid::Uuid::new_v4());
    store.insert_run(
        &run_id,
        seed,
        env!("CARGO_PKG_VERSION"),
        &config,
        chrono::Utc::now().timestamp(),
    )?;

    let mut engine = BattleEngine::new(run_id.clone(), seed, config)?;
    let mut recorder = Recorder { store, run_id: run_id.clone() };
    recorder.record(
        &engine,
        &[SimEvent::RunInitialized { run_id: run_id.clone(), seed }],
    )?;

    if ipc_mode {
        run_ipc_loop(&mut engine, &mut recorder)?;
    } else {
        run_headless(&mut engine, &mut recorder, max_ticks, dt)?;
        print_summary(&engine, &recorder)?;
    }

    Ok(())
}

fn run_headless(
    engine: &mut BattleEngine,
    recorder: &mut Recorder,
    max_ticks: u64,
    dt: f64,
) -> Result<()> {
    let started: Vec<SimEvent> = engine.start().into_iter().collect();
    recorder.record(engine, &started)?;
    for _ in 0..max_ticks {
        if engine.outcome().is_some() {
            break;
        }
        let events = engine.tick(dt);
        recorder.record(engine, &events)?;
    }
    if engine.outcome().is_none() {
        log::warn!("tick cap {max_ticks} reached before the battle was decided");
    }
    Ok(())
}

fn run_ipc_loop(engine: &mut BattleEngine, recorder: &mut Recorder) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let request: IpcRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        if matches!(request, IpcRequest::Quit) {
            break;
        }
        let events = match request.control() {
            // Record tick by tick so each event lands under its own tick.
            Some(ControlCommand::Tick { count, dt }) => {
                let mut events = Vec::new();
                for _ in 0..count {
                    let batch = engine.tick(dt);
                    if batch.is_empty() {
                        break;
                    }
                    recorder.record(engine, &batch)?;
                    events.extend(batch);
                }
                events
            }
            Some(command) => {
                let events = engine.apply(&command);
                recorder.record(engine, &events)?;
                events
            }
            None => Vec::new(),
        };
        let state = build_ui_state(engine, &events);
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state<'a>(engine: &BattleEngine, events: &'a [SimEvent]) -> UiState<'a> {
    UiState {
        frame:  engine.frame(),
        winner: engine.winner(),
        banner: engine.outcome().map(|o| o.banner()),
        events,
    }
}

fn print_summary(engine: &BattleEngine, recorder: &Recorder) -> Result<()> {
    let run_id = &recorder.run_id;
    let strikes = recorder.store.event_count(run_id, "unit_struck")?;
    let kills = recorder.store.event_count(run_id, "unit_killed")?;

    println!("=== BATTLE SUMMARY ===");
    println!("  run_id:         {run_id}");
    println!("  final tick:     {}", engine.current_tick());
    println!("  battle time:    {:.2}s", engine.clock.elapsed);
    println!("  men left:       {}", engine.living(Team::Man));
    println!("  gorillas left:  {}", engine.living(Team::Gorilla));
    println!("  blows landed:   {strikes}");
    println!("  units killed:   {kills}");
    println!();
    match engine.outcome() {
        Some(outcome) => println!("  {}", outcome.banner()),
        None => println!("  (undecided)"),
    }
    Ok(())
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
