//! Prototypes and the pooled-object contract
//!
//! The host engine owns what a pooled object actually is. The pool only needs
//! to place it, switch it on and off, and tell it which slot it lives in.

use super::slot::SlotRef;
use crate::foundation::math::{Quat, Vec3};
use std::fmt;

/// Identifier distinguishing one kind of pooled object from another
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(String);

impl TypeKey {
    /// Create a new type key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for TypeKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Pooling metadata attached to a prototype
///
/// A prototype without this metadata cannot be pooled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolingMetadata {
    /// Bucket the prototype's instances are pooled under
    pub type_key: TypeKey,
}

impl PoolingMetadata {
    /// Create metadata for a type key
    pub fn new(type_key: impl Into<TypeKey>) -> Self {
        Self { type_key: type_key.into() }
    }
}

/// Behaviour the pool needs from the objects it stores
pub trait Poolable {
    /// Move the object to a spawn position and orientation
    fn set_placement(&mut self, position: Vec3, orientation: Quat);

    /// Show/enable (`true`) or hide/disable (`false`) the object
    fn set_active(&mut self, active: bool);

    /// Called once, right after instantiation, with the slot that now owns
    /// the object and the label of its bucket's grouping context.
    ///
    /// Objects that release themselves keep `slot` and pass it to
    /// [`PoolRegistry::release_slot`](super::PoolRegistry::release_slot).
    fn attach_to_pool(&mut self, _slot: SlotRef, _group: &str) {}
}

/// Template that pooled objects are instantiated from
pub trait Prototype {
    /// Object type this prototype produces
    type Object: Poolable;

    /// Human readable name used in diagnostics
    fn name(&self) -> &str;

    /// Pooling metadata, if the prototype was configured for pooling
    fn pooling_metadata(&self) -> Option<&PoolingMetadata>;

    /// Create a fresh object at the given placement
    fn instantiate(&self, position: Vec3, orientation: Quat) -> Self::Object;
}
