//! The cache engine.
//!
//! Owns main memory and an optionally configured cache, and executes the
//! protocol students observe step by step:
//! 1. **Lookup:** Valid-line tag comparison across the ways of one set.
//! 2. **Miss Handling:** Victim selection (invalid ways first, then least recently used), write-back of dirty victims, block fetch.
//! 3. **Write Policies:** Write-through stores to memory immediately; write-back defers until eviction or flush.
//! 4. **Queries:** Probe and decompose inspect without disturbing state or statistics.

use tracing::{debug, trace};

use crate::common::addr;
use crate::common::data::MemOp;
use crate::common::error::EngineError;
use crate::config::{Geometry, MemoryFill, WritePolicy};
use crate::core::decoder::{DecomposedAddress, FieldWidths};
use crate::memory::MainMemory;
use crate::snapshot::{EngineSnapshot, LineSnapshot, SetSnapshot};
use crate::stats::CacheStats;

/// What a single access did.
///
/// Returned by `CacheEngine::access`; carries everything a front-end needs
/// to narrate the step.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct AccessOutcome {
    /// Whether the lookup hit before any refill.
    pub hit: bool,
    /// The address split the cache used.
    pub decoded: DecomposedAddress,
    /// The way that served the access (after refill on a miss).
    pub way: usize,
    /// Word returned by a read; `None` for writes.
    pub value: Option<u32>,
    /// Tag of a valid line this access replaced.
    pub evicted_tag: Option<u16>,
    /// Whether a dirty victim was written back to memory.
    pub writeback: bool,
}

/// One cache line: tag-match state plus a copy of the block's words.
#[derive(Clone, Debug)]
struct CacheLine {
    valid: bool,
    tag: u16,
    dirty: bool,
    data: Vec<u32>,
    last_used_seq: u64,
}

impl CacheLine {
    fn empty(block_size_words: usize) -> Self {
        Self {
            valid: false,
            tag: 0,
            dirty: false,
            data: vec![0; block_size_words],
            last_used_seq: 0,
        }
    }
}

/// Everything that exists only after a successful `configure`.
#[derive(Debug)]
struct CacheState {
    geometry: Geometry,
    widths: FieldWidths,
    /// Flattened lines; index = set_index * ways + way.
    lines: Vec<CacheLine>,
    num_sets: usize,
    ways: usize,
    stats: CacheStats,
    /// Monotonic access clock driving LRU recency.
    access_seq: u64,
}

impl CacheState {
    fn new(geometry: Geometry, widths: FieldWidths) -> Self {
        let num_sets = geometry.num_sets();
        let ways = geometry.associativity;
        Self {
            lines: vec![CacheLine::empty(geometry.block_size_words); geometry.num_slots],
            num_sets,
            ways,
            geometry,
            widths,
            stats: CacheStats::default(),
            access_seq: 0,
        }
    }

    #[inline]
    fn set_base(&self, set_index: u16) -> usize {
        set_index as usize * self.ways
    }

    /// The way holding `tag` in the given set, if resident.
    fn lookup(&self, set_index: u16, tag: u16) -> Option<usize> {
        let base = self.set_base(set_index);
        (0..self.ways).find(|&way| {
            let line = &self.lines[base + way];
            line.valid && line.tag == tag
        })
    }

    /// Picks the way a refill will overwrite.
    ///
    /// The first invalid way wins; otherwise the smallest recency stamp.
    /// The strict `<` keeps the lowest way index when stamps were equal.
    fn select_victim(&self, set_index: u16) -> usize {
        let base = self.set_base(set_index);
        let mut victim = 0;
        let mut oldest = u64::MAX;
        for way in 0..self.ways {
            let line = &self.lines[base + way];
            if !line.valid {
                return way;
            }
            if line.last_used_seq < oldest {
                oldest = line.last_used_seq;
                victim = way;
            }
        }
        victim
    }

    /// Executes one operation against the cache and memory.
    fn access(&mut self, memory: &mut MainMemory, op: MemOp) -> Result<AccessOutcome, EngineError> {
        let address = addr::check(op.addr())?;
        self.access_seq += 1;

        let decoded = self.widths.decompose(address);
        let base = self.set_base(decoded.set_index);

        let mut evicted_tag = None;
        let mut writeback = false;

        let (hit, way) = match self.lookup(decoded.set_index, decoded.tag) {
            Some(way) => (true, way),
            None => {
                let way = self.select_victim(decoded.set_index);
                let victim = &self.lines[base + way];
                if victim.valid {
                    evicted_tag = Some(victim.tag);
                    if victim.dirty {
                        let victim_base = self.widths.line_base(victim.tag, decoded.set_index);
                        memory.write_block(victim_base, &victim.data);
                        writeback = true;
                        trace!(
                            "wrote back dirty victim (tag={:#x}, base={victim_base:#06x})",
                            victim.tag
                        );
                    }
                }
                let block_base = self.widths.block_base(address);
                let line = &mut self.lines[base + way];
                memory.read_block_into(block_base, &mut line.data);
                line.valid = true;
                line.tag = decoded.tag;
                line.dirty = false;
                (false, way)
            }
        };

        self.stats.record(hit);

        // The refilled line is served exactly like a hit.
        let line = &mut self.lines[base + way];
        let value = match op {
            MemOp::Read { .. } => Some(line.data[decoded.block_offset as usize]),
            MemOp::Write { value, .. } => {
                line.data[decoded.block_offset as usize] = value;
                match self.geometry.write_policy {
                    WritePolicy::WriteThrough => memory.write_word(address, value),
                    WritePolicy::WriteBack => line.dirty = true,
                }
                None
            }
        };
        line.last_used_seq = self.access_seq;

        trace!(
            "{} {address:#06x}: {} (set={}, way={way}, tag={:#x})",
            op.kind(),
            if hit { "hit" } else { "miss" },
            decoded.set_index,
            decoded.tag
        );

        Ok(AccessOutcome {
            hit,
            decoded,
            way,
            value,
            evicted_tag,
            writeback,
        })
    }

    /// Would `address` hit right now? Never touches state or statistics.
    fn probe(&self, address: u16) -> bool {
        let decoded = self.widths.decompose(address);
        self.lookup(decoded.set_index, decoded.tag).is_some()
    }

    /// Writes every dirty line back; returns how many lines moved.
    fn flush(&mut self, memory: &mut MainMemory) -> usize {
        if self.geometry.write_policy == WritePolicy::WriteThrough {
            return 0;
        }
        let mut flushed = 0;
        for set_index in 0..self.num_sets {
            let base = set_index * self.ways;
            for way in 0..self.ways {
                let line = &mut self.lines[base + way];
                if line.valid && line.dirty {
                    let line_base = self.widths.line_base(line.tag, set_index as u16);
                    memory.write_block(line_base, &line.data);
                    line.dirty = false;
                    flushed += 1;
                }
            }
        }
        flushed
    }

    fn snapshot(&self, memory: &MainMemory) -> EngineSnapshot {
        let sets = (0..self.num_sets)
            .map(|set_index| {
                let base = set_index * self.ways;
                SetSnapshot {
                    lines: self.lines[base..base + self.ways]
                        .iter()
                        .map(|line| LineSnapshot {
                            valid: line.valid,
                            tag: line.tag,
                            dirty: line.dirty,
                            data: line.data.clone(),
                            last_used_seq: line.last_used_seq,
                        })
                        .collect(),
                }
            })
            .collect();
        EngineSnapshot {
            geometry: self.geometry,
            widths: self.widths,
            sets,
            memory: memory.words().to_vec(),
            stats: self.stats,
        }
    }
}

/// The simulator students drive: main memory plus an optional cache.
///
/// Memory exists from construction; the cache only after `configure`.
/// Cache operations before that fail with `IllegalOperation` instead of
/// guessing a geometry.
#[derive(Debug, Default)]
pub struct CacheEngine {
    memory: MainMemory,
    cache: Option<CacheState>,
}

const NOT_CONFIGURED: EngineError = EngineError::IllegalOperation {
    reason: "no cache configured; call configure first",
};

impl CacheEngine {
    /// Creates an engine with zeroed memory and no cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a cache with the given geometry.
    ///
    /// Validation happens first; a failed configure leaves any existing
    /// configuration untouched. On success all lines start invalid and the
    /// statistics and LRU clock start cold. Memory contents survive.
    pub fn configure(&mut self, geometry: Geometry) -> Result<(), EngineError> {
        let widths = FieldWidths::for_geometry(&geometry)?;
        debug!(
            "configured cache: {} slots, {}-word blocks, {}-way, {:?}",
            geometry.num_slots, geometry.block_size_words, geometry.associativity,
            geometry.write_policy
        );
        self.cache = Some(CacheState::new(geometry, widths));
        Ok(())
    }

    /// Refills every memory word according to `fill` and forgets the
    /// modification history. Works with or without a configured cache.
    pub fn reset_memory(&mut self, fill: MemoryFill) {
        self.memory.reset(fill);
    }

    /// Writes `(byte address, word)` pairs into memory, e.g. an exercise's
    /// initial image. A bad address leaves memory unchanged.
    pub fn load_memory_image(&mut self, image: &[(u32, u32)]) -> Result<(), EngineError> {
        self.memory.load_image(image)
    }

    /// Executes one read or write against the cache.
    pub fn access(&mut self, op: MemOp) -> Result<AccessOutcome, EngineError> {
        let Some(cache) = self.cache.as_mut() else {
            return Err(NOT_CONFIGURED);
        };
        cache.access(&mut self.memory, op)
    }

    /// Convenience for `access` with a read operation.
    pub fn read(&mut self, addr: u32) -> Result<AccessOutcome, EngineError> {
        self.access(MemOp::Read { addr })
    }

    /// Convenience for `access` with a write operation.
    pub fn write(&mut self, addr: u32, value: u32) -> Result<AccessOutcome, EngineError> {
        self.access(MemOp::Write { addr, value })
    }

    /// Whether `addr` would hit right now.
    ///
    /// Pure query: no refill, no eviction, no statistics.
    pub fn probe(&self, addr: u32) -> Result<bool, EngineError> {
        let address = addr::check(addr)?;
        Ok(self.configured()?.probe(address))
    }

    /// Splits an address under the configured geometry without touching the
    /// cache.
    pub fn decompose(&self, addr: u32) -> Result<DecomposedAddress, EngineError> {
        let address = addr::check(addr)?;
        Ok(self.configured()?.widths.decompose(address))
    }

    /// Writes every dirty line back to memory and returns how many moved.
    ///
    /// A write-through cache never holds dirty lines, so this returns 0.
    /// Statistics are unaffected either way.
    pub fn flush(&mut self) -> Result<usize, EngineError> {
        let Some(cache) = self.cache.as_mut() else {
            return Err(NOT_CONFIGURED);
        };
        let flushed = cache.flush(&mut self.memory);
        debug!("flushed {flushed} dirty lines");
        Ok(flushed)
    }

    /// Owned copy of the whole observable state.
    pub fn snapshot(&self) -> Result<EngineSnapshot, EngineError> {
        Ok(self.configured()?.snapshot(&self.memory))
    }

    /// The configured geometry, if any.
    pub fn geometry(&self) -> Option<Geometry> {
        self.cache.as_ref().map(|cache| cache.geometry)
    }

    /// Field widths derived at configure time, if any.
    pub fn field_widths(&self) -> Option<FieldWidths> {
        self.cache.as_ref().map(|cache| cache.widths)
    }

    /// Hit/miss counters since the last configure, if any.
    pub fn stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats)
    }

    /// Read-only view of main memory.
    pub fn memory(&self) -> &MainMemory {
        &self.memory
    }

    fn configured(&self) -> Result<&CacheState, EngineError> {
        self.cache.as_ref().ok_or(NOT_CONFIGURED)
    }
}
