//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never writes here itself; drivers hand it events and
//! snapshots after each tick.

use rusqlite::{params, Connection, OptionalExtension};
use crate::{
    config::BattleConfig,
    error::{SimError, SimResult},
    event::{EventLogEntry, SimEvent},
    snapshot::BattleSnapshot,
    types::Tick,
};

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the battle database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; in-memory ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_battle.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: u64,
        version: &str,
        config: &BattleConfig,
        started_at: i64,
    ) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, config_json, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![run_id, seed as i64, version, serde_json::to_string(config)?, started_at],
        )?;
        Ok(())
    }

    /// Seed and config a run was recorded with, for replaying it.
    pub fn run_setup(&self, run_id: &str) -> SimResult<(u64, BattleConfig)> {
        let row = self
            .conn
            .query_row(
                "SELECT seed, config_json FROM run WHERE run_id = ?1",
                params![run_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let (seed, config_json) = row.ok_or(SimError::RunNotInitialized)?;
        Ok((seed as u64, serde_json::from_str(&config_json)?))
    }

    // ── Event log ──────────────────────────────────────────────

    /// Persist a batch of engine events in one transaction.
    /// `generation` tells resets apart, since each one restarts the tick count.
    pub fn append_events(
        &mut self,
        run_id: &str,
        generation: u64,
        tick: Tick,
        events: &[SimEvent],
    ) -> SimResult<()> {
        let tx = self.conn.transaction()?;
        for event in events {
            tx.execute(
                "INSERT INTO event_log (run_id, generation, tick, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    run_id,
                    generation as i64,
                    tick as i64,
                    event.type_name(),
                    serde_json::to_string(event)?,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Events logged at `tick` of one generation, in insertion order.
    pub fn events_for_tick(
        &self,
        run_id: &str,
        generation: u64,
        tick: Tick,
    ) -> SimResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, generation, tick, event_type, payload
             FROM event_log WHERE run_id = ?1 AND generation = ?2 AND tick = ?3
             ORDER BY id ASC"
        )?;
        let entries = stmt.query_map(params![run_id, generation as i64, tick as i64], |row| {
            Ok(EventLogEntry {
                id:         Some(row.get(0)?),
                run_id:     row.get(1)?,
                generation: row.get::<_, i64>(2)? as u64,
                tick:       row.get::<_, i64>(3)? as u64,
                event_type: row.get(4)?,
                payload:    row.get(5)?,
            })
        })?.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, run_id: &str, event_type: &str) -> SimResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE run_id = ?1 AND event_type = ?2",
            params![run_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Snapshot ───────────────────────────────────────────────

    pub fn save_snapshot(&self, snapshot: &BattleSnapshot) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO snapshot (run_id, tick, generation, state_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                snapshot.run_id,
                snapshot.tick as i64,
                snapshot.generation as i64,
                serde_json::to_string(snapshot)?,
            ],
        )?;
        Ok(())
    }

    /// Most recent snapshot at or before `tick` in the latest generation.
    pub fn latest_snapshot_before(
        &self, run_id: &str, tick: Tick
    ) -> SimResult<Option<BattleSnapshot>> {
        let json: Option<String> = self.conn.query_row(
            "SELECT state_json FROM snapshot
             WHERE run_id = ?1 AND tick <= ?2
             ORDER BY generation DESC, tick DESC LIMIT 1",
            params![run_id, tick as i64],
            |row| row.get(0),
        ).optional()?;
        json.map(|j| serde_json::from_str(&j).map_err(SimError::from))
            .transpose()
    }
}
