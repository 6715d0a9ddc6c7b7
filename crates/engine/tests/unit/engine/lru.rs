//! # LRU Eviction Tests
//!
//! Victim selection: invalid ways first, then the least recently used line,
//! with the lowest way index winning the scan.

use cachesim_core::{Geometry, WritePolicy};

use crate::common::harness::{self, addr_with};

// ──────────────────────────────────────────────────────────
// Filling a set
// ──────────────────────────────────────────────────────────

/// Two distinct tags fill both ways of a two-way set without evicting.
#[test]
fn filling_a_set_evicts_nothing() {
    let geometry = harness::two_way();
    let mut engine = harness::engine_with(geometry);

    let first = engine.read(addr_with(&geometry, 1, 2)).unwrap();
    let second = engine.read(addr_with(&geometry, 2, 2)).unwrap();

    assert!(!first.hit);
    assert!(!second.hit);
    assert_eq!(first.evicted_tag, None);
    assert_eq!(second.evicted_tag, None);
    assert_eq!(first.way, 0, "invalid ways are claimed in slot order");
    assert_eq!(second.way, 1);

    // Both lines are resident afterwards.
    assert!(engine.probe(addr_with(&geometry, 1, 2)).unwrap());
    assert!(engine.probe(addr_with(&geometry, 2, 2)).unwrap());
}

/// With the set full, a new tag evicts the least recently used line: the
/// first one brought in, when nothing was re-touched.
#[test]
fn full_set_evicts_the_oldest_line() {
    let geometry = harness::two_way();
    let mut engine = harness::engine_with(geometry);

    engine.read(addr_with(&geometry, 1, 2)).unwrap();
    engine.read(addr_with(&geometry, 2, 2)).unwrap();

    let third = engine.read(addr_with(&geometry, 3, 2)).unwrap();
    assert!(!third.hit);
    assert_eq!(third.evicted_tag, Some(1));
    assert_eq!(third.way, 0, "tag 1 lived in way 0");

    assert!(!engine.probe(addr_with(&geometry, 1, 2)).unwrap());
    assert!(engine.probe(addr_with(&geometry, 2, 2)).unwrap());
}

/// Re-touching a line between fills changes the victim: the hit refreshes
/// its recency, so the other line becomes LRU.
#[test]
fn a_hit_refreshes_the_recency_order() {
    let geometry = harness::two_way();
    let mut engine = harness::engine_with(geometry);

    engine.read(addr_with(&geometry, 1, 2)).unwrap();
    engine.read(addr_with(&geometry, 2, 2)).unwrap();
    assert!(engine.read(addr_with(&geometry, 1, 2)).unwrap().hit);

    let fourth = engine.read(addr_with(&geometry, 3, 2)).unwrap();
    assert_eq!(fourth.evicted_tag, Some(2), "tag 1 was refreshed; tag 2 is LRU");
    assert!(engine.probe(addr_with(&geometry, 1, 2)).unwrap());
}

/// The N+1 property for a four-way set: after four distinct tags, the fifth
/// evicts exactly the first.
#[test]
fn four_way_set_evicts_in_arrival_order() {
    let geometry = Geometry {
        num_slots: 16,
        block_size_words: 1,
        associativity: 4,
        write_policy: WritePolicy::WriteThrough,
    };
    let mut engine = harness::engine_with(geometry);

    for tag in 1..=4 {
        let outcome = engine.read(addr_with(&geometry, tag, 1)).unwrap();
        assert_eq!(outcome.evicted_tag, None);
    }

    let fifth = engine.read(addr_with(&geometry, 5, 1)).unwrap();
    assert_eq!(fifth.evicted_tag, Some(1));

    // The rest of the set survived.
    for tag in 2..=4 {
        assert!(engine.probe(addr_with(&geometry, tag, 1)).unwrap());
    }
}

/// Eviction is per set: pressure on one set never disturbs another.
#[test]
fn eviction_is_confined_to_its_set() {
    let geometry = harness::two_way();
    let mut engine = harness::engine_with(geometry);

    engine.read(addr_with(&geometry, 7, 0)).unwrap();
    for tag in 1..=3 {
        engine.read(addr_with(&geometry, tag, 2)).unwrap();
    }

    assert!(engine.probe(addr_with(&geometry, 7, 0)).unwrap());
}

/// Writes count as uses too: a write hit protects its line from eviction.
#[test]
fn writes_refresh_recency_like_reads() {
    let geometry = harness::two_way();
    let mut engine = harness::engine_with(geometry);

    engine.read(addr_with(&geometry, 1, 2)).unwrap();
    engine.read(addr_with(&geometry, 2, 2)).unwrap();
    assert!(engine.write(addr_with(&geometry, 1, 2), 99).unwrap().hit);

    let outcome = engine.read(addr_with(&geometry, 3, 2)).unwrap();
    assert_eq!(outcome.evicted_tag, Some(2));
}
