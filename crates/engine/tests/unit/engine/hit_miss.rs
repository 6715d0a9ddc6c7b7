//! # Hit/Miss Protocol Tests
//!
//! Lookup and refill outcomes, the lifecycle errors around `configure`, and
//! the purity of the probe/decompose queries.

use pretty_assertions::assert_eq;

use cachesim_core::{CacheEngine, EngineError};

use crate::common::harness;

// ──────────────────────────────────────────────────────────
// Lifecycle
// ──────────────────────────────────────────────────────────

/// Every cache operation before the first configure is refused; memory
/// operations are not.
#[test]
fn cache_operations_require_a_configure() {
    let mut engine = CacheEngine::new();

    assert!(matches!(
        engine.read(0x0010),
        Err(EngineError::IllegalOperation { .. })
    ));
    assert!(matches!(
        engine.probe(0x0010),
        Err(EngineError::IllegalOperation { .. })
    ));
    assert!(matches!(
        engine.decompose(0x0010),
        Err(EngineError::IllegalOperation { .. })
    ));
    assert!(matches!(
        engine.flush(),
        Err(EngineError::IllegalOperation { .. })
    ));
    assert!(matches!(
        engine.snapshot(),
        Err(EngineError::IllegalOperation { .. })
    ));
    assert!(engine.geometry().is_none());
    assert!(engine.stats().is_none());

    // Memory exists independently of the cache.
    engine.load_memory_image(&[(0x0010, 5)]).unwrap();
    assert_eq!(engine.memory().read_word(0x0010), 5);
}

#[test]
fn out_of_range_addresses_are_rejected() {
    let mut engine = harness::engine_with(harness::tiny_direct_mapped());
    assert_eq!(
        engine.read(0x1_0000).unwrap_err(),
        EngineError::AddressOutOfRange { addr: 0x1_0000 }
    );
    assert_eq!(
        engine.probe(0xFFFF_FFFF).unwrap_err(),
        EngineError::AddressOutOfRange { addr: 0xFFFF_FFFF }
    );
}

/// A failed configure keeps the previous configuration running.
#[test]
fn failed_configure_preserves_the_old_cache() {
    let mut engine = harness::engine_with(harness::tiny_direct_mapped());
    engine.read(0x0010).unwrap();

    let mut bad = harness::tiny_direct_mapped();
    bad.associativity = 3;
    assert!(matches!(
        engine.configure(bad),
        Err(EngineError::InvalidGeometry { .. })
    ));

    assert_eq!(engine.geometry(), Some(harness::tiny_direct_mapped()));
    assert!(engine.probe(0x0010).unwrap(), "the old cache still holds 0x0010");
    assert_eq!(engine.stats().unwrap().total(), 1);
}

// ──────────────────────────────────────────────────────────
// Hits and misses
// ──────────────────────────────────────────────────────────

/// The same read twice: cold miss, then a hit returning the same value.
#[test]
fn repeated_read_misses_then_hits() {
    let mut engine =
        harness::engine_with_image(harness::tiny_direct_mapped(), &[(0x0010, 1234)]);

    let first = engine.read(0x0010).unwrap();
    assert!(!first.hit);
    assert_eq!(first.value, Some(1234));
    assert_eq!(first.evicted_tag, None);
    assert!(!first.writeback);

    let second = engine.read(0x0010).unwrap();
    assert!(second.hit);
    assert_eq!(second.value, Some(1234));
}

/// A miss fetches the whole block, so a neighbor in the same block hits.
#[test]
fn block_neighbors_hit_after_one_miss() {
    let geometry = harness::blocked_write_through();
    let mut engine = harness::engine_with_image(geometry, &[(0x0010, 100), (0x0014, 200)]);

    assert!(!engine.read(0x0010).unwrap().hit);
    let neighbor = engine.read(0x0014).unwrap();
    assert!(neighbor.hit);
    assert_eq!(neighbor.value, Some(200));
}

/// The worked example: 4 slots, direct-mapped, 1-word blocks. 0x0004 and
/// 0x0014 share set 1 with different tags, so each access evicts the other.
#[test]
fn direct_mapped_conflict_evicts_every_time() {
    let mut engine = harness::engine_with(harness::tiny_direct_mapped());

    let first = engine.read(0x0004).unwrap();
    assert!(!first.hit);
    assert_eq!(first.decoded.set_index, 1);
    assert_eq!(first.decoded.tag, 0);
    assert_eq!(first.evicted_tag, None, "the slot was still invalid");

    let second = engine.read(0x0014).unwrap();
    assert!(!second.hit);
    assert_eq!(second.decoded.set_index, 1);
    assert_eq!(second.decoded.tag, 1);
    assert_eq!(second.evicted_tag, Some(0));

    let third = engine.read(0x0004).unwrap();
    assert!(!third.hit, "0x0004 was evicted by 0x0014");
    assert_eq!(third.evicted_tag, Some(1));

    assert_eq!(engine.stats().unwrap().misses, 3);
}

/// An unaligned address is served from the word containing it.
#[test]
fn unaligned_reads_serve_the_containing_word() {
    let mut engine =
        harness::engine_with_image(harness::tiny_direct_mapped(), &[(0x0010, 4321)]);
    let outcome = engine.read(0x0013).unwrap();
    assert_eq!(outcome.value, Some(4321));
    assert_eq!(outcome.decoded.byte_offset, 3);
}

// ──────────────────────────────────────────────────────────
// Query purity
// ──────────────────────────────────────────────────────────

/// `probe` and `decompose` change nothing: not the lines, not the LRU
/// order, not the statistics.
#[test]
fn probe_and_decompose_leave_no_trace() {
    let mut engine =
        harness::engine_with_image(harness::tiny_direct_mapped(), &[(0x0010, 7)]);
    engine.read(0x0010).unwrap();
    let before = engine.snapshot().unwrap();

    assert!(engine.probe(0x0010).unwrap());
    assert!(!engine.probe(0x0020).unwrap());
    let _ = engine.decompose(0xBD28).unwrap();

    assert_eq!(engine.snapshot().unwrap(), before);
    assert_eq!(engine.stats().unwrap().total(), 1);
}
