//! Address-space constants and helpers.
//!
//! The simulated machine is fixed: 16-bit byte addresses over 32-bit words.
//! This module provides the following:
//! 1. **Constants:** Address width, word size, and the derived memory capacity.
//! 2. **Alignment:** Word flooring and flat word-array indexing.
//! 3. **Bounds Checking:** The single place a raw `u32` becomes a valid address.

use super::error::EngineError;

/// Width of a byte address in bits.
pub const ADDRESS_BITS: u32 = 16;

/// Number of byte addresses in the machine (64 KiB).
pub const ADDRESS_SPACE: u32 = 1 << ADDRESS_BITS;

/// Bytes per machine word.
pub const BYTES_PER_WORD: u16 = 4;

/// Bits of a byte address that select the byte within its word.
pub const BYTE_OFFSET_BITS: u32 = 2;

/// Number of words in main memory (16 384).
pub const MEMORY_WORDS: usize = (ADDRESS_SPACE as usize) / (BYTES_PER_WORD as usize);

/// Floors a byte address to the start of its containing word.
///
/// Accesses are served at word granularity; the low two bits only matter
/// for the decomposition display.
#[inline]
pub fn word_align(addr: u16) -> u16 {
    addr & !(BYTES_PER_WORD - 1)
}

/// Converts a byte address to its index in the flat word array.
#[inline]
pub fn word_index(addr: u16) -> usize {
    (addr >> BYTE_OFFSET_BITS) as usize
}

/// Validates that a raw byte address fits the 16-bit space.
///
/// Every public entry point funnels addresses through here, so the rest of
/// the crate carries them as `u16` and never re-checks.
#[inline]
pub fn check(addr: u32) -> Result<u16, EngineError> {
    if addr < ADDRESS_SPACE {
        Ok(addr as u16)
    } else {
        Err(EngineError::AddressOutOfRange { addr })
    }
}
