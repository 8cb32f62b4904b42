//! Pool buckets
//!
//! A bucket is the growable, insertion-ordered collection of slots for one
//! type key. It only ever grows.

use super::prototype::{Poolable, TypeKey};
use super::slot::{BucketId, PooledSlot, SlotRef};

/// Prefix of every bucket's grouping label
pub const GROUP_LABEL_PREFIX: &str = "[ObjectPool]";

/// All slots for one type key
#[derive(Debug)]
pub struct PoolBucket<O> {
    type_key: TypeKey,
    /// Diagnostic grouping context, e.g. `"[ObjectPool] bullet"`
    group_label: String,
    slots: Vec<PooledSlot<O>>,
}

impl<O: Poolable> PoolBucket<O> {
    /// Create an empty bucket
    pub fn new(type_key: TypeKey) -> Self {
        let group_label = format!("{} {}", GROUP_LABEL_PREFIX, type_key);
        Self {
            type_key,
            group_label,
            slots: Vec::new(),
        }
    }

    /// Append a new idle slot holding `object` and return its index
    ///
    /// `id` is the key this bucket is stored under; the object is told its
    /// slot reference before it is stored.
    pub(crate) fn push(&mut self, id: BucketId, mut object: O) -> usize {
        let index = self.slots.len();
        object.attach_to_pool(SlotRef::new(id, index), &self.group_label);
        self.slots.push(PooledSlot::new(object));
        index
    }

    /// Index of the first idle slot in insertion order
    pub fn first_idle(&self) -> Option<usize> {
        self.slots.iter().position(|slot| !slot.is_active())
    }

    /// Type key of this bucket
    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    /// Grouping label used for diagnostics
    pub fn group_label(&self) -> &str {
        &self.group_label
    }

    /// Total number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the bucket has no slots at all
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of granted slots
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    /// Number of idle slots
    pub fn idle_count(&self) -> usize {
        self.len() - self.active_count()
    }

    /// Slot at `index`
    pub fn slot(&self, index: usize) -> Option<&PooledSlot<O>> {
        self.slots.get(index)
    }

    /// Slot at `index`, mutably
    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut PooledSlot<O>> {
        self.slots.get_mut(index)
    }

    /// Iterate over slots in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &PooledSlot<O>> {
        self.slots.iter()
    }
}
