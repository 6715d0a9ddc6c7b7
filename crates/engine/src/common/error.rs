//! Engine error definitions.
//!
//! A single error enum covers every fallible operation in the crate. It provides:
//! 1. **Geometry Validation:** Rejecting impossible cache shapes at configure time.
//! 2. **Address Bounds:** Reporting byte addresses outside the 16-bit space.
//! 3. **Lifecycle Misuse:** Flagging cache operations issued before `configure`.

use thiserror::Error;

/// Errors produced by the cache engine and the exercise driver.
///
/// The messages are written to be shown to students verbatim, so they name
/// the violated constraint rather than an internal state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The requested cache geometry cannot exist in a 16-bit address space.
    ///
    /// Raised by `configure` before any state changes; the engine keeps
    /// whatever configuration it had.
    #[error("invalid geometry: {reason}")]
    InvalidGeometry {
        /// Which constraint the geometry violated.
        reason: String,
    },

    /// A byte address does not fit the 16-bit address space.
    ///
    /// Raised at every public entry point that accepts a raw address.
    #[error("address {addr:#x} is outside the 16-bit address space")]
    AddressOutOfRange {
        /// The offending byte address.
        addr: u32,
    },

    /// A cache operation was issued in a state that cannot serve it.
    ///
    /// Currently this means an access, probe, flush, or snapshot before the
    /// first successful `configure`.
    #[error("illegal operation: {reason}")]
    IllegalOperation {
        /// What was attempted and why the engine refused it.
        reason: &'static str,
    },
}

impl EngineError {
    /// Builds an `InvalidGeometry` from any printable reason.
    pub fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }
}
