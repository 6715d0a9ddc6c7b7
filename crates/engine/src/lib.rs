//! Teaching cache simulator library.
//!
//! This crate implements a deterministic model of a CPU cache in front of a
//! small word-addressable main memory, with the following pieces:
//! 1. **Decomposition:** 16-bit addresses split into tag, set index, block offset, and byte offset.
//! 2. **Engine:** Set-associative lookup, LRU eviction, write-through and write-back policies.
//! 3. **Memory:** A 64 KiB word store with fill modes and modification tracking.
//! 4. **Exercises:** Worksheet data, a grading driver, and the builtin library.
//! 5. **Reporting:** Hit/miss statistics and full-state snapshots for front-ends.
//!
//! Everything is synchronous and single-threaded; identical input sequences
//! produce identical outcomes, statistics, and snapshots.

/// Common types and helpers (addresses, operations, errors).
pub mod common;
/// Simulator configuration (geometry, write policy, memory fill).
pub mod config;
/// The simulation core (address decoder and cache engine).
pub mod core;
/// Exercise data model, driver, and builtin library.
pub mod exercise;
/// Word-addressable main memory.
pub mod memory;
/// Owned copies of the observable state.
pub mod snapshot;
/// Hit/miss statistics.
pub mod stats;

/// Crate-wide error type; every fallible operation returns it.
pub use crate::common::EngineError;
/// The read/write operation type and its kind labels.
pub use crate::common::{AccessKind, MemOp};
/// Geometry and the policy/fill enums; deserialize from JSON or use defaults.
pub use crate::config::{Geometry, MemoryFill, WritePolicy};
/// The engine and the decomposition types it exposes.
pub use crate::core::{AccessOutcome, CacheEngine, DecomposedAddress, FieldWidths};
/// Exercise driver types (sessions, verdicts, reports).
pub use crate::exercise::driver::{ExerciseDriver, ExerciseReport, StepRecord, Verdict};
/// Exercise data types; builtins live in `exercise::library`.
pub use crate::exercise::{Exercise, MemoryCell, Step};
/// Main memory, exposed read-only through the engine.
pub use crate::memory::MainMemory;
/// Snapshot types returned by `CacheEngine::snapshot`.
pub use crate::snapshot::{EngineSnapshot, LineSnapshot, SetSnapshot};
/// Running hit/miss counters.
pub use crate::stats::CacheStats;
