use crate::{
    clock::DEFAULT_MAX_DT,
    error::{SimError, SimResult},
    unit::{Team, UnitStats},
    vector::Vec2,
};
use serde::{Deserialize, Serialize};

/// Playfield size. The engine does not bound movement by it; it is handed
/// to renderers with every frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ArenaConfig {
    pub width:  f64,
    pub height: f64,
}

/// Ring formation: unit `i` of `n` sits at angle `2πi/n` around `center`,
/// at distance `radius * (1 - jitter + jitter * u)` with `u` in [0, 1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormationConfig {
    pub center: Vec2,
    pub radius: f64,
    #[serde(default)]
    pub jitter: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TeamConfig {
    pub count:     usize,
    pub stats:     UnitStats,
    pub formation: FormationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BattleConfig {
    pub arena:   ArenaConfig,
    #[serde(default = "default_max_dt")]
    pub max_dt:  f64,
    pub man:     TeamConfig,
    pub gorilla: TeamConfig,
}

fn default_max_dt() -> f64 {
    DEFAULT_MAX_DT
}

impl BattleConfig {
    /// Load a battle description from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: BattleConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a built-in preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "skirmish" => Some(Self::skirmish()),
            "ragdoll"  => Some(Self::ragdoll()),
            "test"     => Some(Self::default_test()),
            _ => None,
        }
    }

    pub fn team(&self, team: Team) -> &TeamConfig {
        match team {
            Team::Man     => &self.man,
            Team::Gorilla => &self.gorilla,
        }
    }

    /// One man on the left against a hundred gorillas in a loose ring.
    pub fn skirmish() -> Self {
        let arena = ArenaConfig { width: 800.0, height: 600.0 };
        Self {
            man: TeamConfig {
                count: 1,
                stats: UnitStats::man(),
                formation: FormationConfig {
                    center: Vec2::new(arena.width * 0.2, arena.height / 2.0),
                    radius: 0.0,
                    jitter: 0.0,
                },
            },
            gorilla: TeamConfig {
                count: 100,
                stats: UnitStats::gorilla(),
                formation: FormationConfig {
                    center: Vec2::new(arena.width * 0.75, arena.height * 0.5),
                    radius: 180.0,
                    jitter: 0.4,
                },
            },
            max_dt: DEFAULT_MAX_DT,
            arena,
        }
    }

    /// The physics-body balance, projected onto the ground plane:
    /// a hundred men ringed around +x against one heavy gorilla.
    pub fn ragdoll() -> Self {
        // Both sides swing at most once every 0.6 s.
        let cadence = 1.0 / 0.6;
        Self {
            arena: ArenaConfig { width: 40.0, height: 40.0 },
            max_dt: DEFAULT_MAX_DT,
            man: TeamConfig {
                count: 100,
                stats: UnitStats {
                    radius: 0.3,
                    max_hp: 120.0,
                    speed: 6.0,
                    damage: 16.0,
                    range: 4.0,
                    attack_cadence: cadence,
                },
                formation: FormationConfig {
                    center: Vec2::from_horizontal(6.0, 0.0, 0.0),
                    radius: 7.0,
                    jitter: 0.4,
                },
            },
            gorilla: TeamConfig {
                count: 1,
                stats: UnitStats {
                    radius: 0.45,
                    max_hp: 220.0,
                    speed: 4.2,
                    damage: 26.0,
                    range: 3.2,
                    attack_cadence: cadence,
                },
                formation: FormationConfig {
                    center: Vec2::from_horizontal(-6.0, 4.0, 0.0),
                    radius: 0.0,
                    jitter: 0.0,
                },
            },
        }
    }

    /// Config with hardcoded defaults for use in unit tests:
    /// three men against two gorillas, no jitter.
    pub fn default_test() -> Self {
        Self {
            arena: ArenaConfig { width: 400.0, height: 300.0 },
            max_dt: DEFAULT_MAX_DT,
            man: TeamConfig {
                count: 3,
                stats: UnitStats::man(),
                formation: FormationConfig {
                    center: Vec2::new(100.0, 150.0),
                    radius: 30.0,
                    jitter: 0.0,
                },
            },
            gorilla: TeamConfig {
                count: 2,
                stats: UnitStats::gorilla(),
                formation: FormationConfig {
                    center: Vec2::new(300.0, 150.0),
                    radius: 20.0,
                    jitter: 0.0,
                },
            },
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            return Err(invalid(format!("max_dt must be positive, got {}", self.max_dt)));
        }
        for team in Team::ALL {
            let cfg = self.team(team);
            let name = team.name();
            let s = &cfg.stats;
            let finite = [s.radius, s.max_hp, s.speed, s.damage, s.range, s.attack_cadence]
                .iter()
                .all(|v| v.is_finite());
            if !finite {
                return Err(invalid(format!("{name}: stats must be finite")));
            }
            if s.max_hp <= 0.0 {
                return Err(invalid(format!("{name}: max_hp must be positive")));
            }
            if s.attack_cadence <= 0.0 {
                return Err(invalid(format!("{name}: attack_cadence must be positive")));
            }
            if s.radius < 0.0 || s.speed < 0.0 || s.damage < 0.0 || s.range < 0.0 {
                return Err(invalid(format!(
                    "{name}: radius, speed, damage and range must be non-negative"
                )));
            }
            let f = &cfg.formation;
            if !(f.center.is_finite() && f.radius.is_finite()) || f.radius < 0.0 {
                return Err(invalid(format!("{name}: formation must be finite, radius >= 0")));
            }
            if !(0.0..=1.0).contains(&f.jitter) {
                return Err(invalid(format!("{name}: jitter must lie in [0, 1]")));
            }
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::skirmish()
    }
}

fn invalid(reason: String) -> SimError {
    SimError::InvalidConfig { reason }
}
