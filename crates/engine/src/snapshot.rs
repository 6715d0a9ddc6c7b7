//! Owned copies of the observable simulator state.
//!
//! Front-ends render cache contents, memory, and statistics from these
//! types. Every snapshot is a full copy: holding or mutating one never
//! affects the engine, and later snapshots never alias earlier ones.

use serde::Serialize;

use crate::config::Geometry;
use crate::core::decoder::FieldWidths;
use crate::stats::CacheStats;

/// Copy of one cache line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineSnapshot {
    /// Whether the line holds a block.
    pub valid: bool,
    /// Tag of the resident block; meaningless while invalid.
    pub tag: u16,
    /// Whether the line holds data newer than memory.
    pub dirty: bool,
    /// The block's words.
    pub data: Vec<u32>,
    /// Recency stamp; higher means more recently used, zero means never.
    pub last_used_seq: u64,
}

/// Copy of one set, ways in slot order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SetSnapshot {
    /// The set's lines, indexed by way.
    pub lines: Vec<LineSnapshot>,
}

/// Copy of everything a front-end can show.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EngineSnapshot {
    /// The configured geometry.
    pub geometry: Geometry,
    /// Field widths derived from the geometry.
    pub widths: FieldWidths,
    /// All sets, indexed by set index.
    pub sets: Vec<SetSnapshot>,
    /// Every main-memory word; index = byte address / 4.
    pub memory: Vec<u32>,
    /// Hit/miss counters at the moment of the snapshot.
    pub stats: CacheStats,
}

impl EngineSnapshot {
    /// The line at `(set_index, way)`, if both indices are in range.
    pub fn line(&self, set_index: usize, way: usize) -> Option<&LineSnapshot> {
        self.sets.get(set_index).and_then(|set| set.lines.get(way))
    }
}
