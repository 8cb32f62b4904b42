//! # Pool Engine
//!
//! Recycles pre-created instances of frequently spawned and despawned game
//! objects, keyed by a logical type identifier.
//!
//! ## Features
//!
//! - **Pre-warmed buckets**: the first request for a type creates a batch of idle objects
//! - **Idle-first reuse**: requests take the first idle slot, growing by one only when all are busy
//! - **Deferred release**: objects can be returned after a delay driven by the host's frame clock
//! - **Generation checked handles**: stale handles and stale timers never touch a newer grant
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pool_engine::prelude::*;
//!
//! let mut pools = PoolRegistry::with_config(PoolConfig::default());
//! pools.initialize()?;
//!
//! let bullet = pools.acquire(&bullet_prototype, Vec3::zeros(), Quat::identity());
//! if let Some(bullet) = bullet {
//!     pools.release(bullet, 1.5);
//! }
//!
//! // Each frame
//! pools.update(delta_time);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_precision_loss)]

pub mod foundation;
pub mod config;
pub mod pooling;

#[cfg(test)]
mod tests;

/// Common imports for pool users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PoolConfig},
        foundation::math::{Placement, Quat, Vec3},
        pooling::{
            ObjectHandle, PoolError, PoolRegistry, PoolStats, Poolable, PoolingMetadata,
            Prototype, ReleaseOutcome, ReleaseScheduler, SlotRef, TimerQueue, TypeKey,
        },
    };
}
