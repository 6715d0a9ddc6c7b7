//! Address decomposition.
//!
//! Splits a 16-bit byte address into the four bit-fields the cache works
//! with, extracted right to left: byte offset, block offset, set index, tag.
//! This module provides:
//! 1. **Validation:** `FieldWidths::for_geometry` is the only place geometry legality is decided.
//! 2. **Decomposition:** Mask-and-shift field extraction, plus the inverse.
//! 3. **Reconstruction:** Block base and line base addresses for refill and write-back.

use serde::Serialize;

use crate::common::addr::{ADDRESS_BITS, BYTE_OFFSET_BITS};
use crate::common::error::EngineError;
use crate::config::Geometry;

/// Block sizes and associativities the machine supports.
const LEGAL_POWERS: [usize; 4] = [1, 2, 4, 8];

/// Bit widths of the four address fields under a validated geometry.
///
/// The four widths always sum to the full address width. Front-ends use
/// them to pad binary renderings of each field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FieldWidths {
    /// Bits identifying a block within its set.
    pub tag_bits: u32,
    /// Bits selecting the set.
    pub set_index_bits: u32,
    /// Bits selecting the word within the block.
    pub block_offset_bits: u32,
    /// Bits selecting the byte within the word (always 2).
    pub byte_offset_bits: u32,
}

/// A byte address split into its four cache fields.
///
/// Each field holds the raw bits, right-aligned; the widths live in the
/// `FieldWidths` that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DecomposedAddress {
    /// Tag bits.
    pub tag: u16,
    /// Set index bits.
    pub set_index: u16,
    /// Word index within the block.
    pub block_offset: u16,
    /// Byte index within the word.
    pub byte_offset: u16,
}

impl FieldWidths {
    /// Derives the field widths for a geometry, rejecting impossible shapes.
    ///
    /// A geometry is legal when the block size and associativity are one of
    /// 1/2/4/8, the associativity divides the slot count, the resulting set
    /// count is a power of two, and the set and block offset fields still
    /// leave room for a non-negative tag within 16 bits.
    pub fn for_geometry(geometry: &Geometry) -> Result<Self, EngineError> {
        if !LEGAL_POWERS.contains(&geometry.block_size_words) {
            return Err(EngineError::geometry(format!(
                "block size of {} words is not one of 1, 2, 4, or 8",
                geometry.block_size_words
            )));
        }
        if !LEGAL_POWERS.contains(&geometry.associativity) {
            return Err(EngineError::geometry(format!(
                "associativity of {} is not one of 1, 2, 4, or 8",
                geometry.associativity
            )));
        }
        if geometry.num_slots == 0 {
            return Err(EngineError::geometry("cache must have at least one slot"));
        }
        if geometry.num_slots % geometry.associativity != 0 {
            return Err(EngineError::geometry(format!(
                "{} slots cannot be divided into {}-way sets",
                geometry.num_slots, geometry.associativity
            )));
        }

        let num_sets = geometry.num_sets();
        if !num_sets.is_power_of_two() {
            return Err(EngineError::geometry(format!(
                "{} sets ({} slots / {} ways) is not a power of two",
                num_sets, geometry.num_slots, geometry.associativity
            )));
        }

        let block_offset_bits = geometry.block_size_words.ilog2();
        let set_index_bits = num_sets.ilog2();
        let used = set_index_bits + block_offset_bits + BYTE_OFFSET_BITS;
        if used > ADDRESS_BITS {
            return Err(EngineError::geometry(format!(
                "set index ({set_index_bits} bits), block offset ({block_offset_bits} bits), \
                 and byte offset ({BYTE_OFFSET_BITS} bits) exceed the {ADDRESS_BITS}-bit address"
            )));
        }

        Ok(Self {
            tag_bits: ADDRESS_BITS - used,
            set_index_bits,
            block_offset_bits,
            byte_offset_bits: BYTE_OFFSET_BITS,
        })
    }

    /// Sum of the four field widths; the full address width for any
    /// validated geometry.
    #[inline]
    pub fn total_bits(&self) -> u32 {
        self.tag_bits + self.set_index_bits + self.block_offset_bits + self.byte_offset_bits
    }

    /// Splits an address into its four fields, extracting right to left.
    pub fn decompose(&self, addr: u16) -> DecomposedAddress {
        let mut rest = u32::from(addr);

        let byte_offset = (rest & mask(self.byte_offset_bits)) as u16;
        rest >>= self.byte_offset_bits;

        let block_offset = (rest & mask(self.block_offset_bits)) as u16;
        rest >>= self.block_offset_bits;

        let set_index = (rest & mask(self.set_index_bits)) as u16;
        rest >>= self.set_index_bits;

        let tag = (rest & mask(self.tag_bits)) as u16;

        DecomposedAddress {
            tag,
            set_index,
            block_offset,
            byte_offset,
        }
    }

    /// Reassembles an address from its fields; the inverse of `decompose`.
    pub fn reassemble(&self, decomposed: &DecomposedAddress) -> u16 {
        let mut addr = u32::from(decomposed.tag);
        addr = (addr << self.set_index_bits) | u32::from(decomposed.set_index);
        addr = (addr << self.block_offset_bits) | u32::from(decomposed.block_offset);
        addr = (addr << self.byte_offset_bits) | u32::from(decomposed.byte_offset);
        addr as u16
    }

    /// Lowest byte address covered by the block containing `addr`.
    ///
    /// Block fetches start here; the result is always aligned to the block
    /// size in bytes.
    #[inline]
    pub fn block_base(&self, addr: u16) -> u16 {
        addr & !((1 << (self.block_offset_bits + self.byte_offset_bits)) - 1)
    }

    /// Reconstructs the block base address of a resident line from its tag
    /// and set index.
    ///
    /// Lines do not store their base address; a dirty line's write-back
    /// target is recovered from exactly these two fields.
    #[inline]
    pub fn line_base(&self, tag: u16, set_index: u16) -> u16 {
        let block_number = (u32::from(tag) << self.set_index_bits) | u32::from(set_index);
        (block_number << (self.block_offset_bits + self.byte_offset_bits)) as u16
    }
}

/// A right-aligned mask of `bits` ones; zero bits give an empty mask.
#[inline]
const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}
