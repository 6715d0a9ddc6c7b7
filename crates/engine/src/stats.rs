//! Simulation statistics collection and reporting.
//!
//! Tracks the counters students watch while working through an exercise:
//! 1. **Hits and Misses:** One increment per access, on the access that caused it.
//! 2. **Derived Metrics:** Total accesses and hit rate.
//!
//! Counters are owned by the configured cache and reset on every
//! `configure`.

use serde::Serialize;

/// Running hit/miss counters for a configured cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Accesses served without a refill.
    pub hits: u64,
    /// Accesses that had to fetch a block from memory.
    pub misses: u64,
}

impl CacheStats {
    /// Total number of accesses.
    #[inline]
    pub fn total(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hits as a fraction of all accesses; 0.0 before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Counts one access.
    pub(crate) fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    /// Prints the counters in the fixed-width report format.
    pub fn print(&self) {
        println!("accesses                 {}", self.total());
        println!("hits                     {}", self.hits);
        println!("misses                   {}", self.misses);
        println!("hit_rate                 {:.1}%", self.hit_rate() * 100.0);
    }
}
