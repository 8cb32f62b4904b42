//! Pool statistics for monitoring

use super::prototype::TypeKey;
use std::fmt;

/// Statistics for the pool registry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of buckets created so far
    pub buckets: usize,
    /// Slots across all buckets
    pub total_slots: usize,
    /// Slots currently granted
    pub active_slots: usize,
    /// Deferred releases still waiting
    pub pending_releases: usize,
    /// Successful acquires since creation
    pub total_acquired: u64,
    /// Acquires served by an idle slot
    pub total_reused: u64,
    /// Slots added by growth after pre-warm
    pub total_grown: u64,
    /// Slots returned to the idle set
    pub total_released: u64,
    /// Release requests that were no-ops (already idle or stale)
    pub ignored_releases: u64,
    /// Requests that failed and returned nothing
    pub failed_requests: u64,
}

impl PoolStats {
    /// Slots currently idle
    pub fn idle_slots(&self) -> usize {
        self.total_slots - self.active_slots
    }

    /// Fraction of acquires that did not allocate (0.0 - 1.0)
    pub fn reuse_ratio(&self) -> f32 {
        if self.total_acquired == 0 {
            0.0
        } else {
            self.total_reused as f32 / self.total_acquired as f32
        }
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} buckets, {}/{} slots active, {} pending, {} acquired ({} reused, {} grown), {} released",
            self.buckets,
            self.active_slots,
            self.total_slots,
            self.pending_releases,
            self.total_acquired,
            self.total_reused,
            self.total_grown,
            self.total_released,
        )
    }
}

/// Snapshot of a single bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketStats {
    /// Type key of the bucket
    pub type_key: TypeKey,
    /// Grouping label
    pub group_label: String,
    /// Total slots
    pub slots: usize,
    /// Granted slots
    pub active: usize,
}

impl BucketStats {
    /// Idle slots
    pub fn idle(&self) -> usize {
        self.slots - self.active
    }
}
