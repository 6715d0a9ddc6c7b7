//! # Cache Engine Tests
//!
//! The engine's access protocol, split along its observable behaviors.


/// Lookup, hit/miss outcomes, and the lifecycle errors.
pub mod hit_miss;

/// Victim selection and LRU eviction order.
pub mod lru;

/// Write-through versus write-back behavior.
pub mod write_policy;
