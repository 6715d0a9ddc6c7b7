//! Configuration for the cache simulator.
//!
//! This module defines the structures that parameterize a simulation run.
//! It provides:
//! 1. **Defaults:** The baseline geometry students see before touching anything.
//! 2. **Geometry:** Slot count, block size, associativity, and write policy.
//! 3. **Enums:** Write policy and memory fill selections.
//!
//! Geometry is plain data; legality is decided once, by
//! `FieldWidths::for_geometry`, when the engine is configured.

use serde::{Deserialize, Serialize};

/// Default configuration constants for the simulator.
///
/// These match the initial state of the configuration panel in the
/// accompanying teaching front-ends.
mod defaults {
    /// Default total number of cache lines.
    pub const NUM_SLOTS: usize = 256;

    /// Default words per cache line (single-word lines).
    pub const BLOCK_SIZE_WORDS: usize = 1;

    /// Default associativity (direct-mapped).
    pub const ASSOCIATIVITY: usize = 1;
}

/// What a write does to main memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum WritePolicy {
    /// Every write is stored to memory immediately; lines never become dirty.
    #[default]
    #[serde(alias = "write-through")]
    WriteThrough,
    /// Writes stay in the cache and mark the line dirty; memory is updated
    /// when the line is evicted or the cache is flushed.
    #[serde(alias = "write-back")]
    WriteBack,
}

/// Fill pattern applied by a memory reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryFill {
    /// Every word zeroed.
    #[default]
    Zero,
    /// Every word set to the same constant.
    Constant(u32),
    /// Reproducible pseudo-random words derived from a seed.
    Random(u64),
}

/// Cache shape selected for a simulation run.
///
/// `num_slots` counts TOTAL cache lines; the number of sets is
/// `num_slots / associativity`. Legal shapes are decided at configure time,
/// not here, so a `Geometry` can hold any values until the engine sees it.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{Geometry, WritePolicy};
///
/// let geometry: Geometry = serde_json::from_str(r#"{
///     "num_slots": 64,
///     "block_size_words": 4,
///     "associativity": 2,
///     "write_policy": "write-back"
/// }"#).unwrap();
/// assert_eq!(geometry.num_sets(), 32);
/// assert_eq!(geometry.write_policy, WritePolicy::WriteBack);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Geometry {
    /// Total number of cache lines across all sets.
    #[serde(default = "Geometry::default_num_slots")]
    pub num_slots: usize,

    /// Words per cache line.
    #[serde(default = "Geometry::default_block_size_words")]
    pub block_size_words: usize,

    /// Ways per set.
    #[serde(default = "Geometry::default_associativity")]
    pub associativity: usize,

    /// What a write does to main memory.
    #[serde(default)]
    pub write_policy: WritePolicy,
}

impl Geometry {
    /// Returns the default total slot count.
    fn default_num_slots() -> usize {
        defaults::NUM_SLOTS
    }

    /// Returns the default block size in words.
    fn default_block_size_words() -> usize {
        defaults::BLOCK_SIZE_WORDS
    }

    /// Returns the default associativity.
    fn default_associativity() -> usize {
        defaults::ASSOCIATIVITY
    }

    /// The number of sets this geometry describes.
    ///
    /// Plain integer division; only meaningful once the geometry has passed
    /// validation (associativity divides the slot count).
    #[inline]
    pub fn num_sets(&self) -> usize {
        self.num_slots / self.associativity
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            num_slots: defaults::NUM_SLOTS,
            block_size_words: defaults::BLOCK_SIZE_WORDS,
            associativity: defaults::ASSOCIATIVITY,
            write_policy: WritePolicy::default(),
        }
    }
}
