//! melee-core: deterministic two-team melee battle simulation.

pub mod clock;
pub mod combat;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod motion;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod unit;
pub mod vector;
