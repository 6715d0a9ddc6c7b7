//! # Configuration Tests
//!
//! Geometry defaults, derived set counts, and the serde surface exercises
//! and front-ends depend on.

use cachesim_core::config::{Geometry, MemoryFill, WritePolicy};

#[test]
fn geometry_defaults_match_the_configuration_panel() {
    let geometry = Geometry::default();
    assert_eq!(geometry.num_slots, 256);
    assert_eq!(geometry.block_size_words, 1);
    assert_eq!(geometry.associativity, 1);
    assert_eq!(geometry.write_policy, WritePolicy::WriteThrough);
}

#[test]
fn num_sets_is_slots_over_ways() {
    let geometry = Geometry {
        num_slots: 64,
        block_size_words: 4,
        associativity: 2,
        write_policy: WritePolicy::WriteThrough,
    };
    assert_eq!(geometry.num_sets(), 32);

    // Direct-mapped: one line per set.
    assert_eq!(Geometry::default().num_sets(), 256);
}

#[test]
fn empty_json_object_deserializes_to_the_defaults() {
    let geometry: Geometry = serde_json::from_str("{}").unwrap();
    assert_eq!(geometry, Geometry::default());
}

#[test]
fn partial_json_keeps_defaults_for_missing_fields() {
    let geometry: Geometry = serde_json::from_str(r#"{ "associativity": 2 }"#).unwrap();
    assert_eq!(geometry.associativity, 2);
    assert_eq!(geometry.num_slots, 256);
    assert_eq!(geometry.block_size_words, 1);
    assert_eq!(geometry.write_policy, WritePolicy::WriteThrough);
}

/// Older exercise files spell the policy `"write-through"` /
/// `"write-back"`; those stay accepted alongside the canonical names.
#[test]
fn write_policy_accepts_both_spellings() {
    let canonical: WritePolicy = serde_json::from_str(r#""WriteBack""#).unwrap();
    let legacy: WritePolicy = serde_json::from_str(r#""write-back""#).unwrap();
    assert_eq!(canonical, WritePolicy::WriteBack);
    assert_eq!(legacy, WritePolicy::WriteBack);

    let legacy: WritePolicy = serde_json::from_str(r#""write-through""#).unwrap();
    assert_eq!(legacy, WritePolicy::WriteThrough);
}

#[test]
fn geometry_serde_round_trips() {
    let geometry = Geometry {
        num_slots: 32,
        block_size_words: 8,
        associativity: 4,
        write_policy: WritePolicy::WriteBack,
    };
    let text = serde_json::to_string(&geometry).unwrap();
    let back: Geometry = serde_json::from_str(&text).unwrap();
    assert_eq!(back, geometry);
}

#[test]
fn memory_fill_defaults_to_zero() {
    assert_eq!(MemoryFill::default(), MemoryFill::Zero);
}
