//! Read-only views of the battle for collaborators.
//!
//! `RenderFrame` is what a renderer gets once per displayed frame.
//! `BattleSnapshot` is what the store persists every SNAPSHOT_INTERVAL
//! ticks: enough to inspect or replay-check a battle at that tick.

use crate::{
    clock::SimClock,
    config::ArenaConfig,
    types::{RunId, Tick, UnitId},
    unit::{Team, Unit},
    vector::Vec2,
    event::Outcome,
};
use serde::{Deserialize, Serialize};

/// One second of battle at 60 Hz.
pub const SNAPSHOT_INTERVAL: Tick = 60;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", content = "outcome", rename_all = "snake_case")]
pub enum BattleState {
    Idle,
    Running,
    Paused,
    Victory(Outcome),
}

impl BattleState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle       => "idle",
            Self::Running    => "running",
            Self::Paused     => "paused",
            Self::Victory(_) => "victory",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UnitView {
    pub id:       UnitId,
    pub team:     Team,
    pub position: Vec2,
    pub hp:       f64,
    pub max_hp:   f64,
    pub radius:   f64,
}

impl From<&Unit> for UnitView {
    fn from(u: &Unit) -> Self {
        Self {
            id: u.id(),
            team: u.team(),
            position: u.pos,
            hp: u.hp(),
            max_hp: u.max_hp(),
            radius: u.radius(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderFrame {
    pub tick:    Tick,
    pub elapsed: f64,
    pub state:   BattleState,
    pub arena:   ArenaConfig,
    pub units:   Vec<UnitView>,
}

impl RenderFrame {
    pub fn living(&self, team: Team) -> usize {
        self.units.iter().filter(|u| u.team == team).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub run_id:     RunId,
    pub tick:       Tick,
    pub generation: u64,
    pub clock:      SimClock,
    pub state:      BattleState,
    pub roster:     Vec<Unit>,
}
