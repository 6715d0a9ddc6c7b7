//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides the building blocks shared across all components:
//! 1. **Address Helpers:** Constants, alignment, and bounds checking for the 16-bit space.
//! 2. **Memory Operations:** The read/write operation type and its kind labels.
//! 3. **Error Handling:** The crate-wide error enum.

/// Address-space constants and helpers.
pub mod addr;

/// Memory operation definitions.
pub mod data;

/// Error types.
pub mod error;

pub use data::{AccessKind, MemOp};
pub use error::EngineError;
