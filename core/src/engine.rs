//! The battle engine: owns the roster and drives the tick loop.
//!
//! TICK ORDER (fixed, never reordered):
//!   1. Sanitize dt.
//!   2. Victory pre-check (a one-sided roster is decided without AI).
//!   3. Snapshot the roster (id, team, position).
//!   4. Targeting and combat for every unit still alive, in roster order.
//!   5. Hand movement orders to the motion backend; apply its reports.
//!   6. Purge units with hp == 0.
//!   7. Victory check.
//!
//! RULES:
//!   - The roster is built completely inside reset() before start() can
//!     run a tick. No tick ever sees a partially spawned roster.
//!   - Only the engine mutates the roster. Collaborators get frames.
//!   - All randomness flows through the RngBank.

use crate::{
    clock::SimClock,
    combat::{self, Action},
    command::ControlCommand,
    config::{BattleConfig, TeamConfig},
    error::SimResult,
    event::{Outcome, SimEvent},
    motion::{EulerMotion, MotionBackend, MotionCommand, MotionOrder},
    rng::{RngBank, RngSlot, SlotRng},
    snapshot::{BattleSnapshot, BattleState, RenderFrame, UnitView},
    types::{RunId, Tick},
    unit::{IdAllocator, Team, Unit},
    vector::Vec2,
};
use std::collections::HashMap;
use std::f64::consts::TAU;

pub struct BattleEngine {
    pub run_id:  RunId,
    pub clock:   SimClock,
    rng_bank:    RngBank,
    config:      BattleConfig,
    ids:         IdAllocator,
    roster:      Vec<Unit>,
    state:       BattleState,
    generation:  u64,
    motion:      Box<dyn MotionBackend>,
}

impl BattleEngine {
    /// Validate `config` and spawn the first roster. The engine starts Idle.
    pub fn new(run_id: RunId, seed: u64, config: BattleConfig) -> SimResult<Self> {
        config.validate()?;
        let mut engine = Self {
            clock:      SimClock::new(config.max_dt),
            rng_bank:   RngBank::new(seed),
            ids:        IdAllocator::new(),
            roster:     Vec::new(),
            state:      BattleState::Idle,
            generation: 0,
            motion:     Box::new(EulerMotion),
            config,
            run_id,
        };
        engine.spawn();
        Ok(engine)
    }

    /// Engine over the small test config.
    pub fn build_test(run_id: RunId, seed: u64) -> SimResult<Self> {
        Self::new(run_id, seed, BattleConfig::default_test())
    }

    /// Replace the movement backend (e.g. with a physics engine adapter).
    pub fn with_motion(mut self, motion: Box<dyn MotionBackend>) -> Self {
        log::debug!("motion backend set to {}", motion.name());
        self.motion = motion;
        self
    }

    // ── Control surface ────────────────────────────────────────

    /// Any state -> Idle with a fresh roster and no winner.
    pub fn reset(&mut self) -> SimEvent {
        self.generation += 1;
        self.spawn();
        log::debug!(
            "reset to generation {} ({} units)",
            self.generation,
            self.roster.len()
        );
        SimEvent::BattleReset {
            generation: self.generation,
            men:        self.living(Team::Man),
            gorillas:   self.living(Team::Gorilla),
        }
    }

    /// Idle/Paused -> Running. No-op when already running or decided.
    pub fn start(&mut self) -> Option<SimEvent> {
        match self.state {
            BattleState::Idle | BattleState::Paused => {
                self.transition(BattleState::Running);
                Some(SimEvent::BattleStarted { tick: self.clock.current_tick })
            }
            BattleState::Running | BattleState::Victory(_) => None,
        }
    }

    /// Running -> Paused. Roster and cooldowns are left untouched.
    pub fn pause(&mut self) -> Option<SimEvent> {
        if self.state != BattleState::Running {
            return None;
        }
        self.transition(BattleState::Paused);
        Some(SimEvent::BattlePaused { tick: self.clock.current_tick })
    }

    /// Dispatch a control command. Ticks only advance while Running.
    pub fn apply(&mut self, command: &ControlCommand) -> Vec<SimEvent> {
        match *command {
            ControlCommand::Start => self.start().into_iter().collect(),
            ControlCommand::Pause => self.pause().into_iter().collect(),
            ControlCommand::Reset => vec![self.reset()],
            ControlCommand::Tick { count, dt } => {
                let mut events = Vec::new();
                for _ in 0..count {
                    if self.state != BattleState::Running {
                        break;
                    }
                    events.extend(self.tick(dt));
                }
                events
            }
        }
    }

    pub fn winner(&self) -> Option<Team> {
        self.outcome().and_then(|o| o.winner())
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            BattleState::Victory(outcome) => Some(outcome),
            _ => None,
        }
    }

    // ── Tick loop ──────────────────────────────────────────────

    /// Advance one tick of (sanitized) `dt` seconds.
    /// Does nothing unless the battle is Running.
    pub fn tick(&mut self, dt: f64) -> Vec<SimEvent> {
        if self.state != BattleState::Running {
            return vec![];
        }
        let dt = self.clock.sanitize_dt(dt);

        if let Some(outcome) = self.decide() {
            let tick = self.clock.current_tick;
            self.conclude(outcome);
            return vec![SimEvent::BattleDecided { tick, outcome }];
        }

        let tick = self.clock.advance(dt);
        let mut events = vec![SimEvent::TickStarted { tick, dt }];

        let sightings = combat::snapshot(&self.roster);
        let mut orders = Vec::with_capacity(self.roster.len());

        for i in 0..self.roster.len() {
            // Units killed earlier this tick forfeit their action.
            if self.roster[i].dead() {
                continue;
            }
            let action = combat::engage(&mut self.roster, i, &sightings, dt);
            let attacker = &self.roster[i];
            let command = match action {
                Action::Idle => continue,
                Action::Hold { .. } => MotionCommand::Hold,
                Action::Advance { direction, speed, .. } => MotionCommand::Move { direction, speed },
                Action::Strike { target, damage, remaining_hp, killed } => {
                    events.push(SimEvent::UnitStruck {
                        tick,
                        attacker: attacker.id(),
                        target,
                        damage,
                        remaining_hp,
                    });
                    if killed {
                        let team = attacker.team().opponent();
                        log::debug!("tick={tick} {} #{target} killed by #{}", team.name(), attacker.id());
                        events.push(SimEvent::UnitKilled {
                            tick,
                            unit: target,
                            team,
                            killer: attacker.id(),
                        });
                    }
                    MotionCommand::Hold
                }
            };
            orders.push(MotionOrder {
                id: attacker.id(),
                position: attacker.pos,
                command,
            });
        }

        self.apply_motion(orders, dt);
        self.roster.retain(|u| !u.dead());

        if let Some(outcome) = self.decide() {
            self.conclude(outcome);
            events.push(SimEvent::BattleDecided { tick, outcome });
        }

        events.push(SimEvent::TickCompleted {
            tick,
            men:      self.living(Team::Man),
            gorillas: self.living(Team::Gorilla),
        });
        events
    }

    /// Start (if needed) and tick up to `n` times at fixed `dt`, stopping
    /// early once the battle is decided. Used for testing and headless runs.
    pub fn run_ticks(&mut self, n: u64, dt: f64) -> Vec<SimEvent> {
        let mut events: Vec<SimEvent> = self.start().into_iter().collect();
        for _ in 0..n {
            if self.outcome().is_some() {
                break;
            }
            events.extend(self.tick(dt));
        }
        events
    }

    // ── Read-only views ────────────────────────────────────────

    pub fn state(&self) -> BattleState { self.state }
    pub fn roster(&self) -> &[Unit] { &self.roster }
    pub fn config(&self) -> &BattleConfig { &self.config }
    pub fn generation(&self) -> u64 { self.generation }
    pub fn seed(&self) -> u64 { self.rng_bank.master_seed() }
    pub fn current_tick(&self) -> Tick { self.clock.current_tick }

    pub fn living(&self, team: Team) -> usize {
        self.roster.iter().filter(|u| u.team() == team && !u.dead()).count()
    }

    pub fn frame(&self) -> RenderFrame {
        RenderFrame {
            tick:    self.clock.current_tick,
            elapsed: self.clock.elapsed,
            state:   self.state,
            arena:   self.config.arena,
            units:   self.roster.iter().filter(|u| !u.dead()).map(UnitView::from).collect(),
        }
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            run_id:     self.run_id.clone(),
            tick:       self.clock.current_tick,
            generation: self.generation,
            clock:      self.clock.clone(),
            state:      self.state,
            roster:     self.roster.clone(),
        }
    }

    // ── Internals ──────────────────────────────────────────────

    fn transition(&mut self, next: BattleState) {
        log::debug!(
            "tick={} state {} -> {}",
            self.clock.current_tick,
            self.state.name(),
            next.name()
        );
        self.state = next;
    }

    fn conclude(&mut self, outcome: Outcome) {
        log::info!(
            "battle decided at tick {} ({:.2}s): {}",
            self.clock.current_tick,
            self.clock.elapsed,
            outcome.banner()
        );
        self.transition(BattleState::Victory(outcome));
    }

    fn decide(&self) -> Option<Outcome> {
        let men = self.living(Team::Man) > 0;
        let gorillas = self.living(Team::Gorilla) > 0;
        match (men, gorillas) {
            (true, true)   => None,
            (true, false)  => Some(Outcome::Winner(Team::Man)),
            (false, true)  => Some(Outcome::Winner(Team::Gorilla)),
            (false, false) => Some(Outcome::Draw),
        }
    }

    /// Replace the roster with a freshly spawned one and return to Idle.
    fn spawn(&mut self) {
        let mut rng = self.rng_bank.for_slot(RngSlot::Formation, self.generation);
        let mut roster = Vec::with_capacity(self.config.man.count + self.config.gorilla.count);
        for team in Team::ALL {
            let cfg = self.config.team(team);
            for pos in formation(cfg, &mut rng) {
                roster.push(Unit::new(&mut self.ids, team, cfg.stats, pos));
            }
        }
        self.roster = roster;
        self.clock.restart();
        self.state = BattleState::Idle;
    }

    fn apply_motion(&mut self, mut orders: Vec<MotionOrder>, dt: f64) {
        let index: HashMap<_, _> = self
            .roster
            .iter()
            .enumerate()
            .map(|(i, u)| (u.id(), i))
            .collect();

        // Victims that fell after acting this tick do not move.
        orders.retain(|o| index.get(&o.id).is_some_and(|&i| !self.roster[i].dead()));

        for report in self.motion.integrate(&orders, dt) {
            let Some(&i) = index.get(&report.id) else {
                log::warn!("{} reported unknown unit #{}", self.motion.name(), report.id);
                continue;
            };
            if !report.position.is_finite() {
                log::warn!("{} reported non-finite position for #{}", self.motion.name(), report.id);
                continue;
            }
            self.roster[i].pos = report.position;
        }
    }
}

/// Ring positions for one team.
fn formation(cfg: &TeamConfig, rng: &mut SlotRng) -> Vec<Vec2> {
    let f = &cfg.formation;
    (0..cfg.count)
        .map(|i| {
            let angle = TAU * i as f64 / cfg.count as f64;
            let r = f.radius * rng.range_f64(1.0 - f.jitter, 1.0);
            Vec2::new(f.center.x + angle.cos() * r, f.center.y + angle.sin() * r)
        })
        .collect()
}
