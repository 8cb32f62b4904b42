//! Object pooling
//!
//! Recycles pre-created instances of frequently spawned objects, keyed by a
//! logical type identifier.
//!
//! # Architecture
//!
//! ```text
//! PoolRegistry
//!     ├── TypeKey -> BucketId index
//!     ├── SlotMap<BucketId, PoolBucket>
//!     │        └── Vec<PooledSlot>  (insertion ordered, append-only)
//!     └── ReleaseScheduler (deferred releases)
//! ```
//!
//! Acquire hands out the first idle slot of a bucket, growing it by one when
//! every slot is busy. Release returns a slot to the idle set, immediately or
//! after a delay driven by [`PoolRegistry::update`].

pub mod error;
pub mod prototype;
pub mod slot;
pub mod bucket;
pub mod scheduler;
pub mod registry;
pub mod stats;

pub use error::*;
pub use prototype::*;
pub use slot::*;
pub use bucket::*;
pub use scheduler::*;
pub use registry::*;
pub use stats::*;
