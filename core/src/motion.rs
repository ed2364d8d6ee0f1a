//! Movement realization.
//!
//! The combat step decides intent; a `MotionBackend` turns intent into
//! positions. `EulerMotion` writes positions directly. A physics engine
//! implements the same trait, integrates the orders against its bodies
//! (collisions included) and reports where each body ended up.
//!
//! RULE: Backends never touch the roster. They receive orders and return
//! reports; the engine applies the reports.

use crate::{types::UnitId, vector::Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionCommand {
    Move { direction: Vec2, speed: f64 },
    Hold,
}

impl MotionCommand {
    pub fn velocity(&self) -> Vec2 {
        match *self {
            Self::Move { direction, speed } => {
                let mut v = direction;
                v.scale(speed);
                v
            }
            Self::Hold => Vec2::ZERO,
        }
    }
}

/// One unit's movement order for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionOrder {
    pub id:       UnitId,
    /// Where the engine believes the unit stands before moving.
    pub position: Vec2,
    pub command:  MotionCommand,
}

/// Where a unit stands after the backend has moved it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub id:       UnitId,
    pub position: Vec2,
}

pub trait MotionBackend {
    fn name(&self) -> &'static str;

    /// Realize `orders` over `dt` seconds. Units absent from the returned
    /// reports keep their current position.
    fn integrate(&mut self, orders: &[MotionOrder], dt: f64) -> Vec<PositionReport>;
}

/// Explicit Euler: `pos += vel * dt`, no sub-stepping, no collisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerMotion;

impl MotionBackend for EulerMotion {
    fn name(&self) -> &'static str { "euler" }

    fn integrate(&mut self, orders: &[MotionOrder], dt: f64) -> Vec<PositionReport> {
        orders
            .iter()
            .map(|o| {
                let mut step = o.command.velocity();
                step.scale(dt);
                let mut position = o.position;
                position.add(step);
                PositionReport { id: o.id, position }
            })
            .collect()
    }
}
