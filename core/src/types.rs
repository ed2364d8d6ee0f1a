//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one caller-driven step of `dt` seconds.
pub type Tick = u64;

/// A stable, unique identifier for a unit. Never reused within a driver.
pub type UnitId = u64;

/// The canonical run identifier.
pub type RunId = String;
