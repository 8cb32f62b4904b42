//! Pooled slots
//!
//! A slot pairs one pooled object with its active/idle flag. Slots are never
//! destroyed; they cycle between `Idle` and `Active` for the registry's whole
//! lifetime.

use crate::foundation::math::{Quat, Vec3};
use super::prototype::Poolable;

slotmap::new_key_type! {
    /// Stable identifier of a bucket inside one registry
    pub struct BucketId;
}

/// Non-owning back-reference from an object to the slot that holds it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    /// Bucket the slot belongs to
    pub bucket: BucketId,
    /// Insertion index inside the bucket
    pub index: usize,
}

impl SlotRef {
    /// Create a new slot reference
    pub fn new(bucket: BucketId, index: usize) -> Self {
        Self { bucket, index }
    }
}

/// Handle to one grant of a pooled object
///
/// The generation distinguishes successive grants of the same slot, so a
/// handle kept after its object was released cannot touch the next user's
/// object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    /// Slot the object lives in
    pub slot: SlotRef,
    /// Grant counter at the time of acquisition
    pub generation: u32,
}

impl ObjectHandle {
    /// Create a new handle
    pub fn new(slot: SlotRef, generation: u32) -> Self {
        Self { slot, generation }
    }
}

/// State of a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Available for the next acquire
    Idle,
    /// Granted to a caller
    Active,
}

/// What a release request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The slot was deactivated right away
    Released,
    /// A deferred release was queued
    Scheduled,
    /// The slot was already idle; nothing changed
    AlreadyIdle,
    /// The request belonged to an earlier grant of the slot; nothing changed
    Stale,
}

/// One pooled object plus its bookkeeping
#[derive(Debug)]
pub struct PooledSlot<O> {
    object: O,
    active: bool,
    generation: u32,
}

impl<O: Poolable> PooledSlot<O> {
    /// Wrap a freshly instantiated object; the slot starts idle and the
    /// object is switched off
    pub fn new(mut object: O) -> Self {
        object.set_active(false);
        Self {
            object,
            active: false,
            generation: 0,
        }
    }

    /// Hand the slot out: mark it active, move the object and switch it on.
    ///
    /// Returns the generation of the new grant.
    pub(crate) fn grant(&mut self, position: Vec3, orientation: Quat) -> u32 {
        debug_assert!(!self.active, "granting a slot that is already active");

        self.generation = self.generation.wrapping_add(1);
        self.active = true;
        self.object.set_placement(position, orientation);
        self.object.set_active(true);
        self.generation
    }

    /// Return the slot to the idle set.
    ///
    /// Returns `false` when the slot was already idle.
    pub(crate) fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }

        self.active = false;
        self.object.set_active(false);
        true
    }

    /// Deactivate only if `generation` is the current grant
    pub(crate) fn release_grant(&mut self, generation: u32) -> ReleaseOutcome {
        if !self.active {
            ReleaseOutcome::AlreadyIdle
        } else if self.generation != generation {
            ReleaseOutcome::Stale
        } else {
            self.deactivate();
            ReleaseOutcome::Released
        }
    }

    /// Whether the slot is currently granted
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current state
    pub fn state(&self) -> SlotState {
        if self.active {
            SlotState::Active
        } else {
            SlotState::Idle
        }
    }

    /// Grant counter; zero until the first acquire
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Whether `handle_generation` names the live grant of this slot
    pub fn is_current(&self, handle_generation: u32) -> bool {
        self.active && self.generation == handle_generation
    }

    /// The pooled object
    pub fn object(&self) -> &O {
        &self.object
    }

    /// The pooled object, mutably
    pub fn object_mut(&mut self) -> &mut O {
        &mut self.object
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Probe {
        position: Vec3,
        visible: bool,
        toggles: u32,
    }

    impl Poolable for Probe {
        fn set_placement(&mut self, position: Vec3, _orientation: Quat) {
            self.position = position;
        }

        fn set_active(&mut self, active: bool) {
            self.visible = active;
            self.toggles += 1;
        }
    }

    #[test]
    fn test_new_slot_is_idle_and_hidden() {
        let slot = PooledSlot::new(Probe { visible: true, ..Default::default() });
        assert_eq!(slot.state(), SlotState::Idle);
        assert!(!slot.object().visible);
        assert_eq!(slot.generation(), 0);
    }

    #[test]
    fn test_grant_places_and_shows_object() {
        let mut slot = PooledSlot::new(Probe::default());
        let generation = slot.grant(Vec3::new(1.0, 2.0, 3.0), Quat::identity());

        assert_eq!(generation, 1);
        assert!(slot.is_active());
        assert!(slot.is_current(generation));
        assert!(slot.object().visible);
        assert_eq!(slot.object().position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_deactivate_is_idempotent() {
        let mut slot = PooledSlot::new(Probe::default());
        slot.grant(Vec3::zeros(), Quat::identity());
        let toggles_before = slot.object().toggles;

        assert!(slot.deactivate());
        assert!(!slot.deactivate());

        assert_eq!(slot.state(), SlotState::Idle);
        assert!(!slot.object().visible);
        // Only the first call touched the object
        assert_eq!(slot.object().toggles, toggles_before + 1);
    }

    #[test]
    fn test_release_grant_ignores_older_generation() {
        let mut slot = PooledSlot::new(Probe::default());
        let first = slot.grant(Vec3::zeros(), Quat::identity());
        assert_eq!(slot.release_grant(first), ReleaseOutcome::Released);

        let second = slot.grant(Vec3::zeros(), Quat::identity());
        assert_ne!(first, second);
        assert_eq!(slot.release_grant(first), ReleaseOutcome::Stale);
        assert!(slot.is_active());

        assert_eq!(slot.release_grant(second), ReleaseOutcome::Released);
        assert_eq!(slot.release_grant(second), ReleaseOutcome::AlreadyIdle);
    }
}
