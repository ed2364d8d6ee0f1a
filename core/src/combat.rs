//! Targeting and combat: the per-unit, per-tick decision.
//!
//! RULES:
//!   - Targeting reads ONLY the tick-start snapshot (id, team, position).
//!     Damage dealt earlier in the tick never changes who is nearest.
//!   - hp is live: it is read and written on the roster itself.
//!   - Ties on distance go to the first enemy in snapshot order.
//!   - The attack cooldown advances every tick an enemy exists, in or out
//!     of range, and is not reset by switching targets.

use crate::{
    types::UnitId,
    unit::{Cooldown, Team, Unit, UnitStats},
    vector::Vec2,
};
use serde::{Deserialize, Serialize};

/// The capability set the combat step needs from a unit, regardless of
/// whether its movement is written directly or handed to a physics body.
pub trait Combatant {
    fn id(&self) -> UnitId;
    fn team(&self) -> Team;
    fn position(&self) -> Vec2;
    fn stats(&self) -> &UnitStats;
    fn hp(&self) -> f64;
    fn dead(&self) -> bool;
    fn take_damage(&mut self, amount: f64);
    /// `direction` is a unit vector.
    fn move_toward(&mut self, direction: Vec2, speed: f64);
    fn hold(&mut self);
    fn cooldown(&mut self) -> &mut Cooldown;
}

impl Combatant for Unit {
    fn id(&self) -> UnitId { Unit::id(self) }
    fn team(&self) -> Team { Unit::team(self) }
    fn position(&self) -> Vec2 { self.pos }
    fn stats(&self) -> &UnitStats { Unit::stats(self) }
    fn hp(&self) -> f64 { Unit::hp(self) }
    fn dead(&self) -> bool { Unit::dead(self) }

    fn take_damage(&mut self, amount: f64) {
        Unit::take_damage(self, amount)
    }

    fn move_toward(&mut self, direction: Vec2, speed: f64) {
        let mut vel = direction;
        vel.scale(speed);
        self.vel = vel;
    }

    fn hold(&mut self) {
        self.vel = Vec2::ZERO;
    }

    fn cooldown(&mut self) -> &mut Cooldown {
        self.cooldown_mut()
    }
}

/// One roster entry as seen at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Index into the roster this snapshot was taken from.
    pub index:    usize,
    pub id:       UnitId,
    pub team:     Team,
    pub position: Vec2,
}

/// Capture the targeting snapshot. Units already dead are left out.
pub fn snapshot<C: Combatant>(roster: &[C]) -> Vec<Sighting> {
    roster
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.dead())
        .map(|(index, c)| Sighting {
            index,
            id: c.id(),
            team: c.team(),
            position: c.position(),
        })
        .collect()
}

/// The nearest enemy of `team` standing at `from`, by squared distance.
/// Strict `<` keeps the first of equally distant enemies.
pub fn nearest_enemy(sightings: &[Sighting], team: Team, from: Vec2) -> Option<(Sighting, f64)> {
    let mut best: Option<(Sighting, f64)> = None;
    for s in sightings.iter().filter(|s| s.team != team) {
        let d2 = Vec2::distance_sq(from, s.position);
        match best {
            Some((_, best_d2)) if d2 >= best_d2 => {}
            _ => best = Some((*s, d2)),
        }
    }
    best
}

/// What a unit did this tick. Returned to the driver for event logging and
/// for building movement orders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// No enemy on the field.
    Idle,
    /// In range, cooling down.
    Hold { target: UnitId },
    /// In range, attack landed.
    Strike {
        target:       UnitId,
        damage:       f64,
        remaining_hp: f64,
        killed:       bool,
    },
    /// Out of range, closing in.
    Advance {
        target:    UnitId,
        direction: Vec2,
        speed:     f64,
    },
}

/// Run targeting and combat for `roster[attacker]` against the tick
/// snapshot. Callers skip attackers that are already dead.
pub fn engage<C: Combatant>(
    roster: &mut [C],
    attacker: usize,
    sightings: &[Sighting],
    dt: f64,
) -> Action {
    let (team, from) = {
        let a = &roster[attacker];
        (a.team(), a.position())
    };

    let Some((target, d2)) = nearest_enemy(sightings, team, from) else {
        return Action::Idle;
    };
    let distance = d2.sqrt();

    let a = &mut roster[attacker];
    let stats = *a.stats();
    a.cooldown().advance(dt);

    if distance <= stats.range {
        a.hold();
        if !a.cooldown().ready(stats.attack_cadence) {
            return Action::Hold { target: target.id };
        }
        a.cooldown().reset();

        let victim = &mut roster[target.index];
        let was_dead = victim.dead();
        victim.take_damage(stats.damage);
        let remaining_hp = victim.hp();
        return Action::Strike {
            target: target.id,
            damage: stats.damage,
            remaining_hp,
            killed: !was_dead && victim.dead(),
        };
    }

    let mut direction = target.position;
    direction.sub(from).normalize();
    if direction.is_zero() {
        a.hold();
        return Action::Hold { target: target.id };
    }
    a.move_toward(direction, stats.speed);
    Action::Advance {
        target: target.id,
        direction,
        speed: stats.speed,
    }
}
