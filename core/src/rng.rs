//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SlotRng instances derived from the
//! single master seed stored on the engine.
//!
//! Each slot gets its own stream, seeded from
//! (master_seed, slot_index, generation). This means:
//!   - Adding a new slot never changes existing slots' streams.
//!   - Each reset (generation) draws a fresh but reproducible stream.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single slot.
pub struct SlotRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SlotRng {
    pub fn new(master_seed: u64, slot_index: u64, generation: u64) -> Self {
        let derived_seed = master_seed
            ^ slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15)
            ^ generation.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [lo, hi).
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Stream factory for a single engine.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_slot(&self, slot: RngSlot, generation: u64) -> SlotRng {
        SlotRng::new(self.master_seed, slot as u64, generation).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    Formation = 0,
    // Add new slots here, append only.
}

impl RngSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Formation => "formation",
        }
    }
}
