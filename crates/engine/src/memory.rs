//! Word-addressable main memory.
//!
//! The flat 64 KiB backing store behind the cache. This module provides:
//! 1. **Word Store:** 16 384 x 32-bit words; byte addresses floor to word boundaries.
//! 2. **Fill Modes:** Zero, constant, and seeded pseudo-random resets.
//! 3. **Modification Tracking:** The set of word addresses written since the last reset.
//!
//! Because the address space is exactly 2^16 bytes, every `u16` is a valid
//! byte address and the word-level API is total.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use crate::common::addr::{self, BYTES_PER_WORD, MEMORY_WORDS, word_align, word_index};
use crate::common::error::EngineError;
use crate::config::MemoryFill;

/// Flat main memory with modification tracking.
pub struct MainMemory {
    words: Vec<u32>,
    modified: BTreeSet<u16>,
}

impl MainMemory {
    /// Creates a zero-filled memory with an empty modification set.
    pub fn new() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS],
            modified: BTreeSet::new(),
        }
    }

    /// Refills every word according to `fill` and clears the modification set.
    pub fn reset(&mut self, fill: MemoryFill) {
        match fill {
            MemoryFill::Zero => self.words.fill(0),
            MemoryFill::Constant(value) => self.words.fill(value),
            MemoryFill::Random(seed) => {
                // xorshift64; a zero seed would stick at zero, so displace it.
                let mut state = if seed == 0 { 0x9E37_79B9 } else { seed };
                for word in &mut self.words {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    *word = state as u32;
                }
            }
        }
        self.modified.clear();
        debug!("reset memory ({fill:?})");
    }

    /// Reads the word containing byte address `addr`.
    #[inline]
    pub fn read_word(&self, addr: u16) -> u32 {
        self.words[word_index(addr)]
    }

    /// Writes the word containing byte address `addr` and records it as
    /// modified.
    pub fn write_word(&mut self, addr: u16, value: u32) {
        let aligned = word_align(addr);
        self.words[word_index(aligned)] = value;
        let _ = self.modified.insert(aligned);
    }

    /// Copies a block out of memory into `out`.
    ///
    /// `base` must be aligned to the block size in bytes, which keeps the
    /// whole copy inside the address space.
    pub(crate) fn read_block_into(&self, base: u16, out: &mut [u32]) {
        let start = word_index(base);
        out.copy_from_slice(&self.words[start..start + out.len()]);
    }

    /// Writes a whole block starting at `base`, recording every word as
    /// modified.
    ///
    /// Same alignment contract as `read_block_into`.
    pub(crate) fn write_block(&mut self, base: u16, data: &[u32]) {
        let start = word_index(base);
        self.words[start..start + data.len()].copy_from_slice(data);
        for offset in 0..data.len() {
            let _ = self.modified.insert(base + offset as u16 * BYTES_PER_WORD);
        }
    }

    /// Writes the given `(byte address, word)` pairs, e.g. an exercise's
    /// initial image.
    ///
    /// All addresses are validated up front; if any is out of range, memory
    /// is left untouched.
    pub fn load_image(&mut self, image: &[(u32, u32)]) -> Result<(), EngineError> {
        let mut checked = Vec::with_capacity(image.len());
        for &(raw, value) in image {
            checked.push((addr::check(raw)?, value));
        }
        for (address, value) in checked {
            self.write_word(address, value);
        }
        Ok(())
    }

    /// All words as a flat slice; index = byte address / 4.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Word addresses written since the last reset, in ascending order.
    pub fn modified_addresses(&self) -> impl Iterator<Item = u16> + '_ {
        self.modified.iter().copied()
    }

    /// Whether the word containing `addr` was written since the last reset.
    pub fn is_modified(&self, addr: u16) -> bool {
        self.modified.contains(&word_align(addr))
    }

    /// The `(address, word)` pairs covering `start..=end`, one per word.
    ///
    /// `start` floors to its word boundary; an inverted range is empty.
    pub fn range(&self, start: u16, end: u16) -> impl Iterator<Item = (u16, u32)> + '_ {
        let first = word_index(word_align(start));
        let last = word_index(end);
        (first..=last).map(|idx| ((idx as u16) * BYTES_PER_WORD, self.words[idx]))
    }
}

impl Default for MainMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MainMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainMemory")
            .field("words", &self.words.len())
            .field("modified", &self.modified.len())
            .finish()
    }
}
