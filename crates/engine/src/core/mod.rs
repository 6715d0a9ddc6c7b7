//! The simulation core: address decomposition and the cache engine.

/// Address field widths, decomposition, and base-address arithmetic.
pub mod decoder;

/// The cache engine and its access outcomes.
pub mod engine;

pub use decoder::{DecomposedAddress, FieldWidths};
pub use engine::{AccessOutcome, CacheEngine};
