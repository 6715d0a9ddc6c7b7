//! Guided exercises.
//!
//! An exercise is plain data: a cache geometry, an initial memory image,
//! and a sequence of operations with an optional answer key. This module
//! provides:
//! 1. **Data Model:** `Exercise`, `Step`, and `MemoryCell`, all serde types.
//! 2. **Driver:** Stepping, two-attempt grading, and whole-run reports.
//! 3. **Library:** The builtin worksheet exercises.

/// The exercise driver (stepping and grading).
pub mod driver;

/// Builtin worksheet exercises.
pub mod library;

use serde::{Deserialize, Serialize};

use crate::common::data::MemOp;

/// One word of an exercise's initial memory image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCell {
    /// Byte address of the word.
    pub addr: u32,
    /// Word value placed there before the first step.
    pub value: u32,
}

/// One step of an exercise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// The operation the student is asked to predict.
    #[serde(flatten)]
    pub op: MemOp,
    /// Worksheet answer key: whether this step should hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_hit: Option<bool>,
    /// Optional display text shown alongside the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Step {
    /// A read step with an answer key entry.
    pub fn read(addr: u32, expected_hit: bool) -> Self {
        Self {
            op: MemOp::Read { addr },
            expected_hit: Some(expected_hit),
            note: None,
        }
    }

    /// A write step with an answer key entry.
    pub fn write(addr: u32, value: u32, expected_hit: bool) -> Self {
        Self {
            op: MemOp::Write { addr, value },
            expected_hit: Some(expected_hit),
            note: None,
        }
    }

    /// Attaches display text to the step.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// A complete exercise: geometry, initial memory, and the step sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Short unique name, used to select the exercise.
    pub name: String,
    /// One-line description shown in listings.
    pub description: String,
    /// Cache geometry the exercise assumes.
    pub geometry: crate::config::Geometry,
    /// Words present in memory before the first step.
    #[serde(default)]
    pub memory_image: Vec<MemoryCell>,
    /// The operations, in order.
    pub steps: Vec<Step>,
}

impl Exercise {
    /// The memory image as `(address, word)` pairs for the engine.
    pub fn image_pairs(&self) -> Vec<(u32, u32)> {
        self.memory_image
            .iter()
            .map(|cell| (cell.addr, cell.value))
            .collect()
    }
}
