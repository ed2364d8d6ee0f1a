use serde::{Deserialize, Serialize};

/// Commands a driving collaborator (UI, IPC client) may issue.
/// Variants are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum ControlCommand {
    Start,
    Pause,
    Reset,
    /// Advance up to `count` ticks of `dt` seconds each.
    Tick { count: u64, dt: f64 },
}
