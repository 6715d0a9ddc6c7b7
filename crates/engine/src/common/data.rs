//! Memory operation types.
//!
//! This module defines the operations students issue against the cache.
//! These types are used for the following:
//! 1. **Engine Input:** `CacheEngine::access` consumes one `MemOp` per step.
//! 2. **Exercise Data:** Worksheet steps serialize as plain `MemOp` values.
//! 3. **Reporting:** `AccessKind` labels operations in tables and logs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single memory operation against the cache.
///
/// Addresses are raw byte addresses; the engine validates them against the
/// 16-bit space. A write always carries its word value, so an unvalued
/// write cannot be represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum MemOp {
    /// Read the word containing `addr`.
    Read {
        /// Byte address to read.
        addr: u32,
    },
    /// Store `value` into the word containing `addr`.
    Write {
        /// Byte address to write.
        addr: u32,
        /// Word value to store.
        value: u32,
    },
}

impl MemOp {
    /// The byte address the operation targets.
    #[inline]
    pub fn addr(&self) -> u32 {
        match *self {
            Self::Read { addr } | Self::Write { addr, .. } => addr,
        }
    }

    /// The operation's kind, for labels and statistics.
    #[inline]
    pub fn kind(&self) -> AccessKind {
        match self {
            Self::Read { .. } => AccessKind::Read,
            Self::Write { .. } => AccessKind::Write,
        }
    }

    /// Whether this operation stores a value.
    #[inline]
    pub fn is_write(&self) -> bool {
        matches!(self, Self::Write { .. })
    }
}

impl fmt::Display for MemOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Read { addr } => write!(f, "read {addr:#06x}"),
            Self::Write { addr, value } => write!(f, "write {addr:#06x} <- {value}"),
        }
    }
}

/// Kind of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// Data read access.
    Read,
    /// Data write access.
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}
