//! Simulation clock. Owns tick count, elapsed battle time, and the
//! policy for untrusted frame deltas.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

/// Upper bound on a single step when the config does not say otherwise.
/// At the fastest stock unit speed (90/s) this is 9 units per tick, well
/// inside every stock attack range, so nobody skips past an enemy.
pub const DEFAULT_MAX_DT: f64 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub current_tick: Tick,
    /// Battle seconds simulated so far (sum of sanitized dts).
    pub elapsed:      f64,
    pub max_dt:       f64,
}

impl SimClock {
    pub fn new(max_dt: f64) -> Self {
        Self {
            current_tick: 0,
            elapsed: 0.0,
            max_dt,
        }
    }

    /// Clamp a caller-supplied dt:
    ///   NaN or negative -> 0
    ///   +inf or above max_dt -> max_dt
    pub fn sanitize_dt(&self, dt: f64) -> f64 {
        if dt.is_nan() || dt < 0.0 {
            log::warn!("discarding malformed dt={dt}");
            return 0.0;
        }
        if dt > self.max_dt {
            log::debug!("clamping dt={dt} to {}", self.max_dt);
            return self.max_dt;
        }
        dt
    }

    /// Advance one tick of `dt` seconds. `dt` must already be sanitized.
    /// Returns the new tick number.
    pub fn advance(&mut self, dt: f64) -> Tick {
        self.current_tick += 1;
        self.elapsed += dt;
        self.current_tick
    }

    pub fn restart(&mut self) {
        self.current_tick = 0;
        self.elapsed = 0.0;
    }
}
