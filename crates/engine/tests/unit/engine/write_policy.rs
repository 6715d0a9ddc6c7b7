//! # Write Policy Tests
//!
//! Write-through stores reach memory immediately; write-back stores stay in
//! the cache until eviction or flush moves the whole dirty block.

use cachesim_core::{EngineError, WritePolicy};

use crate::common::harness::{self, addr_with};

// ──────────────────────────────────────────────────────────
// Write-through
// ──────────────────────────────────────────────────────────

/// A write-through write hit updates cache and memory in the same step.
#[test]
fn write_through_hits_update_memory_immediately() {
    let geometry = harness::blocked_write_through();
    let mut engine = harness::engine_with_image(geometry, &[(0x0010, 100)]);
    engine.read(0x0010).unwrap();

    let outcome = engine.write(0x0010, 111).unwrap();
    assert!(outcome.hit);
    assert_eq!(outcome.value, None, "writes return no word value");

    assert_eq!(engine.memory().read_word(0x0010), 111);
    assert_eq!(engine.read(0x0010).unwrap().value, Some(111));
}

/// Write misses allocate: the line becomes resident, and under
/// write-through the word also lands in memory.
#[test]
fn write_through_misses_allocate_and_store() {
    let geometry = harness::blocked_write_through();
    let mut engine = harness::engine_with(geometry);

    let outcome = engine.write(0x0010, 222).unwrap();
    assert!(!outcome.hit);

    assert!(engine.probe(0x0010).unwrap(), "the written block is now resident");
    assert_eq!(engine.memory().read_word(0x0010), 222);
}

/// A write-through cache holds no dirty lines, so flush moves nothing.
#[test]
fn write_through_flush_is_a_no_op() {
    let geometry = harness::blocked_write_through();
    let mut engine = harness::engine_with(geometry);
    engine.write(0x0010, 1).unwrap();
    engine.write(0x0014, 2).unwrap();

    assert_eq!(engine.flush().unwrap(), 0);

    let snapshot = engine.snapshot().unwrap();
    for set in &snapshot.sets {
        for line in &set.lines {
            assert!(!line.dirty);
        }
    }
}

// ──────────────────────────────────────────────────────────
// Write-back
// ──────────────────────────────────────────────────────────

/// A write-back write leaves memory stale and marks the line dirty.
#[test]
fn write_back_defers_the_memory_store() {
    let geometry = harness::blocked_write_back();
    let mut engine = harness::engine_with_image(geometry, &[(0x0010, 100)]);

    let outcome = engine.write(0x0010, 999).unwrap();
    assert!(!outcome.hit, "cold write miss, allocated");

    // The cache serves the new value while memory still holds the old one.
    assert_eq!(engine.read(0x0010).unwrap().value, Some(999));
    assert_eq!(engine.memory().read_word(0x0010), 100);

    let decoded = engine.decompose(0x0010).unwrap();
    let snapshot = engine.snapshot().unwrap();
    let line = snapshot
        .line(decoded.set_index as usize, 0)
        .unwrap();
    assert!(line.valid);
    assert!(line.dirty);
}

/// Evicting a dirty line writes its whole block back at the line's own
/// base address, not at the incoming address.
#[test]
fn eviction_writes_the_dirty_block_back() {
    let geometry = harness::blocked_write_back();
    // 0x0010 and the conflicting address share set 2 under this geometry.
    let conflict = addr_with(&geometry, 9, 2);
    let mut engine =
        harness::engine_with_image(geometry, &[(0x0010, 100), (0x0014, 200)]);

    engine.write(0x0014, 777).unwrap();
    assert_eq!(engine.memory().read_word(0x0014), 200, "still deferred");

    let outcome = engine.read(conflict).unwrap();
    assert!(!outcome.hit);
    assert_eq!(outcome.evicted_tag, Some(0));
    assert!(outcome.writeback);

    // The whole two-word block moved, including the word never written.
    assert_eq!(engine.memory().read_word(0x0010), 100);
    assert_eq!(engine.memory().read_word(0x0014), 777);
}

/// Evicting a clean line reports the eviction but moves no data.
#[test]
fn clean_evictions_do_not_write_back() {
    let geometry = harness::blocked_write_back();
    let conflict = addr_with(&geometry, 9, 2);
    let mut engine = harness::engine_with_image(geometry, &[(0x0010, 100)]);

    engine.read(0x0010).unwrap();
    let outcome = engine.read(conflict).unwrap();

    assert_eq!(outcome.evicted_tag, Some(0));
    assert!(!outcome.writeback);
    assert_eq!(engine.memory().read_word(0x0010), 100);
}

/// The refilled line after a dirty eviction starts clean: a read that
/// evicts a dirty block must not inherit the dirty bit.
#[test]
fn refilled_lines_start_clean() {
    let geometry = harness::blocked_write_back();
    let conflict = addr_with(&geometry, 9, 2);
    let mut engine = harness::engine_with(geometry);

    engine.write(0x0010, 5).unwrap();
    engine.read(conflict).unwrap();

    assert_eq!(engine.flush().unwrap(), 0, "no dirty lines remain");
}

/// Memory modification tracking sees exactly the words the policy touched:
/// write-through marks them on the write, write-back on the write-back.
#[test]
fn modification_tracking_follows_the_policy() {
    let mut through = harness::engine_with(harness::blocked_write_through());
    through.write(0x0010, 1).unwrap();
    assert!(through.memory().is_modified(0x0010));

    let mut back = harness::engine_with(harness::blocked_write_back());
    back.write(0x0010, 1).unwrap();
    assert!(!back.memory().is_modified(0x0010), "deferred, nothing written yet");

    back.flush().unwrap();
    assert!(back.memory().is_modified(0x0010));
    assert!(back.memory().is_modified(0x0014), "the block's other word moved too");
}

/// Policies only differ in when stores reach memory; hit/miss accounting is
/// identical.
#[test]
fn policies_agree_on_hit_miss_classification() {
    for policy in [WritePolicy::WriteThrough, WritePolicy::WriteBack] {
        let mut geometry = harness::blocked_write_back();
        geometry.write_policy = policy;
        let mut engine = harness::engine_with(geometry);

        assert!(!engine.write(0x0010, 1).unwrap().hit);
        assert!(engine.write(0x0014, 2).unwrap().hit, "same block");
        assert!(engine.read(0x0010).unwrap().hit);

        let stats = engine.stats().unwrap();
        assert_eq!((stats.hits, stats.misses), (2, 1), "{policy:?}");
    }
}

/// Writes validate their address like reads do.
#[test]
fn out_of_range_writes_are_rejected() {
    let mut engine = harness::engine_with(harness::blocked_write_back());
    assert_eq!(
        engine.write(0x2_0000, 1).unwrap_err(),
        EngineError::AddressOutOfRange { addr: 0x2_0000 }
    );
}
