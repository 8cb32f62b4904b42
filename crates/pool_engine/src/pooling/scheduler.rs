//! Deferred release scheduling
//!
//! A delayed release is parked in a [`ReleaseScheduler`] until the host's
//! clock has advanced far enough. Schedulers only hold the slot reference and
//! grant generation; they never own pooled objects.

use super::slot::SlotRef;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A release waiting for its delay to elapse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRelease {
    /// Slot to return to the idle set
    pub slot: SlotRef,
    /// Grant the release was requested for
    pub generation: u32,
}

impl PendingRelease {
    /// Create a new pending release
    pub fn new(slot: SlotRef, generation: u32) -> Self {
        Self { slot, generation }
    }
}

/// Time-driven scheduler the registry parks delayed releases in
pub trait ReleaseScheduler {
    /// Queue `release` to fire once `delay` time units have elapsed
    fn schedule(&mut self, delay: f32, release: PendingRelease);

    /// Advance the clock by `delta_time` and return every release that is now
    /// due, in firing order
    fn advance(&mut self, delta_time: f32) -> Vec<PendingRelease>;

    /// Number of releases still waiting
    fn pending(&self) -> usize;
}

#[derive(Debug)]
struct ScheduledRelease {
    fire_at: f64,
    sequence: u64,
    release: PendingRelease,
}

impl PartialEq for ScheduledRelease {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledRelease {}

impl PartialOrd for ScheduledRelease {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledRelease {
    fn cmp(&self, other: &Self) -> Ordering {
        self.fire_at
            .total_cmp(&other.fire_at)
            .then(self.sequence.cmp(&other.sequence))
    }
}

/// Default scheduler: a min-heap of fire times on a host-driven clock
///
/// Releases due at the same instant fire in the order they were scheduled.
#[derive(Debug, Default)]
pub struct TimerQueue {
    now: f64,
    next_sequence: u64,
    queue: BinaryHeap<Reverse<ScheduledRelease>>,
}

impl TimerQueue {
    /// Create an empty queue with the clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since the queue was created
    pub fn now(&self) -> f64 {
        self.now
    }
}

impl ReleaseScheduler for TimerQueue {
    fn schedule(&mut self, delay: f32, release: PendingRelease) {
        let fire_at = self.now + f64::from(delay.max(0.0));
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        self.queue.push(Reverse(ScheduledRelease { fire_at, sequence, release }));
    }

    fn advance(&mut self, delta_time: f32) -> Vec<PendingRelease> {
        if delta_time > 0.0 {
            self.now += f64::from(delta_time);
        }

        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.fire_at > self.now {
                break;
            }
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push(entry.release);
            }
        }
        due
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }
}
