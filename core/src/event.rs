//! Battle events: the engine's outward record of what happened.
//!
//! RULE: Every state change visible to a collaborator is reported as an
//! event. Variants are append-only; the serialized tag is the contract.

use crate::{
    types::{RunId, Tick, UnitId},
    unit::Team,
};
use serde::{Deserialize, Serialize};

/// How a battle ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", content = "team", rename_all = "snake_case")]
pub enum Outcome {
    Winner(Team),
    /// Both teams were wiped out in the same tick.
    Draw,
}

impl Outcome {
    pub fn winner(&self) -> Option<Team> {
        match self {
            Self::Winner(team) => Some(*team),
            Self::Draw => None,
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            Self::Winner(team) => team.victory_banner(),
            Self::Draw => "Mutual annihilation: nobody wins.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Control events ────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed:   u64,
    },
    BattleReset {
        generation: u64,
        men:        usize,
        gorillas:   usize,
    },
    BattleStarted {
        tick: Tick,
    },
    BattlePaused {
        tick: Tick,
    },

    // ── Tick events ───────────────────────────────
    TickStarted {
        tick: Tick,
        dt:   f64,
    },
    UnitStruck {
        tick:         Tick,
        attacker:     UnitId,
        target:       UnitId,
        damage:       f64,
        remaining_hp: f64,
    },
    UnitKilled {
        tick:   Tick,
        unit:   UnitId,
        team:   Team,
        killer: UnitId,
    },
    BattleDecided {
        tick:    Tick,
        outcome: Outcome,
    },
    TickCompleted {
        tick:     Tick,
        men:      usize,
        gorillas: usize,
    },
}

impl SimEvent {
    /// Stable name for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. } => "run_initialized",
            Self::BattleReset { .. }    => "battle_reset",
            Self::BattleStarted { .. }  => "battle_started",
            Self::BattlePaused { .. }   => "battle_paused",
            Self::TickStarted { .. }    => "tick_started",
            Self::UnitStruck { .. }     => "unit_struck",
            Self::UnitKilled { .. }     => "unit_killed",
            Self::BattleDecided { .. }  => "battle_decided",
            Self::TickCompleted { .. }  => "tick_completed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub generation: u64,
    pub tick:       Tick,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}
