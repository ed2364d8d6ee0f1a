//! Unit model: teams, stat blocks, and the combatants themselves.
//!
//! RULE: Stats are fixed at construction. The only mutation paths are
//! movement (`move_toward` / `hold` / `set_position`), combat damage
//! (`take_damage`) and the attack cooldown.

use crate::{
    types::UnitId,
    vector::Vec2,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Man,
    Gorilla,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Man, Team::Gorilla];

    pub fn opponent(&self) -> Team {
        match self {
            Self::Man     => Self::Gorilla,
            Self::Gorilla => Self::Man,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Man     => "man",
            Self::Gorilla => "gorilla",
        }
    }

    /// Banner shown when this team wins.
    pub fn victory_banner(&self) -> &'static str {
        match self {
            Self::Man     => "The Man prevails!",
            Self::Gorilla => "Gorillas overwhelm!",
        }
    }
}

/// Per-team stat table. Opaque configuration as far as combat is concerned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UnitStats {
    pub radius:         f64,
    pub max_hp:         f64,
    /// Distance units per second.
    pub speed:          f64,
    pub damage:         f64,
    pub range:          f64,
    /// Attacks per second.
    pub attack_cadence: f64,
}

impl UnitStats {
    /// Seconds between attacks.
    pub fn cooldown_secs(&self) -> f64 {
        1.0 / self.attack_cadence
    }

    pub fn man() -> Self {
        Self {
            radius:         12.0,
            max_hp:         120.0,
            speed:          90.0,
            damage:         16.0,
            range:          40.0,
            attack_cadence: 1.2,
        }
    }

    pub fn gorilla() -> Self {
        Self {
            radius:         16.0,
            max_hp:         200.0,
            speed:          65.0,
            damage:         24.0,
            range:          32.0,
            attack_cadence: 0.8,
        }
    }
}

/// Accumulates time toward the next permitted attack.
/// Persists across target switches; only a landed attack resets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    elapsed: f64,
}

impl Cooldown {
    /// Absorbs rounding accumulated from summing many small `dt`s, so a
    /// 1.25 s cooldown at 60 Hz fires on tick 75 rather than 76.
    const READY_TOLERANCE: f64 = 1e-9;

    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt;
    }

    pub fn ready(&self, cadence: f64) -> bool {
        self.elapsed + Self::READY_TOLERANCE >= 1.0 / cadence
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

/// Hands out unit ids. Owned by a single engine; ids keep increasing
/// across resets so none is ever reused.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: UnitId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn allocate(&mut self) -> UnitId {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id:           UnitId,
    team:         Team,
    stats:        UnitStats,
    pub pos:      Vec2,
    pub vel:      Vec2,
    hp:           f64,
    cooldown:     Cooldown,
}

impl Unit {
    pub fn new(ids: &mut IdAllocator, team: Team, stats: UnitStats, pos: Vec2) -> Self {
        Self {
            id: ids.allocate(),
            team,
            stats,
            pos,
            vel: Vec2::ZERO,
            hp: stats.max_hp,
            cooldown: Cooldown::default(),
        }
    }

    pub fn man(ids: &mut IdAllocator, pos: Vec2) -> Self {
        Self::new(ids, Team::Man, UnitStats::man(), pos)
    }

    pub fn gorilla(ids: &mut IdAllocator, pos: Vec2) -> Self {
        Self::new(ids, Team::Gorilla, UnitStats::gorilla(), pos)
    }

    pub fn id(&self) -> UnitId { self.id }
    pub fn team(&self) -> Team { self.team }
    pub fn stats(&self) -> &UnitStats { &self.stats }
    pub fn hp(&self) -> f64 { self.hp }
    pub fn max_hp(&self) -> f64 { self.stats.max_hp }
    pub fn radius(&self) -> f64 { self.stats.radius }

    pub fn dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Apply damage, flooring hp at zero. Non-finite or negative amounts
    /// are ignored so hp can never become NaN or exceed max.
    pub fn take_damage(&mut self, amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        self.hp = (self.hp - amount).max(0.0);
    }

    pub fn cooldown(&self) -> &Cooldown {
        &self.cooldown
    }

    pub fn cooldown_mut(&mut self) -> &mut Cooldown {
        &mut self.cooldown
    }
}
