//! Pool Registry
//!
//! Owns every bucket and services acquire/release requests with an
//! "idle first, else grow" policy.

use super::bucket::PoolBucket;
use super::error::{PoolError, PoolResult};
use super::prototype::{Poolable, Prototype, TypeKey};
use super::scheduler::{PendingRelease, ReleaseScheduler, TimerQueue};
use super::slot::{BucketId, ObjectHandle, PooledSlot, ReleaseOutcome, SlotRef};
use super::stats::{BucketStats, PoolStats};
use crate::config::{ConfigError, PoolConfig};
use crate::foundation::math::{Quat, Vec3};
use slotmap::SlotMap;
use std::collections::HashMap;

/// Registry of pooled objects, one bucket per type key
///
/// # Allocation policy
///
/// - The first request for a type key creates its bucket and pre-warms it
///   with [`PoolConfig::pool_size_for`] idle slots
/// - Requests take the first idle slot in insertion order
/// - When every slot is active the bucket grows by exactly one slot; there is
///   no capacity ceiling and active objects are never evicted
///
/// # Usage
///
/// ```rust,ignore
/// let mut pools = PoolRegistry::with_config(PoolConfig::default());
/// pools.initialize()?;
///
/// let handle = pools.acquire(&bullet_prototype, muzzle_position, muzzle_rotation);
///
/// // Later, or from the object itself via its SlotRef
/// if let Some(handle) = handle {
///     pools.release(handle, 2.0);
/// }
///
/// // Once per frame
/// pools.update(delta_time);
/// ```
///
/// All methods take `&mut self`: the registry is meant to be driven from a
/// single logical thread, so a scan-then-grant sequence cannot interleave with
/// another request.
pub struct PoolRegistry<O, S = TimerQueue> {
    config: PoolConfig,
    initialized: bool,
    /// Type key index into `buckets`
    keys: HashMap<TypeKey, BucketId>,
    buckets: SlotMap<BucketId, PoolBucket<O>>,
    scheduler: S,
    stats: PoolStats,
}

impl<O: Poolable> PoolRegistry<O, TimerQueue> {
    /// Create a registry driven by the built-in [`TimerQueue`]
    pub fn with_config(config: PoolConfig) -> Self {
        Self::new(config, TimerQueue::new())
    }
}

impl<O: Poolable, S: ReleaseScheduler> PoolRegistry<O, S> {
    /// Create an uninitialized registry
    pub fn new(config: PoolConfig, scheduler: S) -> Self {
        Self {
            config,
            initialized: false,
            keys: HashMap::new(),
            buckets: SlotMap::with_key(),
            scheduler,
            stats: PoolStats::default(),
        }
    }

    /// Validate the configuration and accept requests from now on
    ///
    /// Calling this again after a successful initialization is a no-op.
    pub fn initialize(&mut self) -> Result<(), ConfigError> {
        if self.initialized {
            return Ok(());
        }

        self.config.validate()?;
        self.initialized = true;

        log::info!(
            "Object pool registry initialized (default pool size {}, {} per-type overrides)",
            self.config.default_pool_size,
            self.config.bucket_sizes.len()
        );
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Acquire an object for `prototype`, placed at `position`/`orientation`
    ///
    /// Failures are logged and yield `None`; see [`try_acquire`](Self::try_acquire).
    pub fn acquire<P>(
        &mut self,
        prototype: &P,
        position: Vec3,
        orientation: Quat,
    ) -> Option<ObjectHandle>
    where
        P: Prototype<Object = O>,
    {
        match self.try_acquire(prototype, position, orientation) {
            Ok(handle) => Some(handle),
            Err(err) => {
                self.stats.failed_requests += 1;
                log::error!("Failed to acquire pooled object: {}", err);
                None
            }
        }
    }

    /// Acquire an object, reporting why a request could not be served
    ///
    /// # Errors
    ///
    /// * [`PoolError::NotInitialized`] - the registry was never initialized
    /// * [`PoolError::MissingMetadata`] - the prototype has no type key; no
    ///   bucket is created
    /// * [`PoolError::BucketNotFound`] - the key index points at a missing bucket
    pub fn try_acquire<P>(
        &mut self,
        prototype: &P,
        position: Vec3,
        orientation: Quat,
    ) -> PoolResult<ObjectHandle>
    where
        P: Prototype<Object = O>,
    {
        if !self.initialized {
            return Err(PoolError::NotInitialized);
        }

        let type_key = &prototype
            .pooling_metadata()
            .ok_or_else(|| PoolError::MissingMetadata {
                prototype: prototype.name().to_string(),
            })?
            .type_key;

        let id = match self.keys.get(type_key) {
            Some(&id) => id,
            None => self.create_bucket(type_key, prototype, position, orientation),
        };

        self.grant_from(id, type_key, prototype, position, orientation)
    }

    /// Create and pre-warm the bucket for `type_key`
    fn create_bucket<P>(
        &mut self,
        type_key: &TypeKey,
        prototype: &P,
        position: Vec3,
        orientation: Quat,
    ) -> BucketId
    where
        P: Prototype<Object = O>,
    {
        let pool_size = self.config.pool_size_for(type_key.as_str());
        let id = self.buckets.insert(PoolBucket::new(type_key.clone()));
        self.keys.insert(type_key.clone(), id);

        if let Some(bucket) = self.buckets.get_mut(id) {
            for _ in 0..pool_size {
                bucket.push(id, prototype.instantiate(position, orientation));
            }
            log::info!(
                "Created new repository '{}' ({}) with {} slots",
                type_key,
                bucket.group_label(),
                pool_size
            );
        }

        id
    }

    /// Grant the first idle slot of a bucket, growing it by one if needed
    fn grant_from<P>(
        &mut self,
        id: BucketId,
        type_key: &TypeKey,
        prototype: &P,
        position: Vec3,
        orientation: Quat,
    ) -> PoolResult<ObjectHandle>
    where
        P: Prototype<Object = O>,
    {
        let bucket = self
            .buckets
            .get_mut(id)
            .ok_or_else(|| PoolError::BucketNotFound(type_key.clone()))?;

        let (index, reused) = match bucket.first_idle() {
            Some(index) => (index, true),
            None => {
                let index = bucket.push(id, prototype.instantiate(position, orientation));
                log::debug!("Grew repository '{}' to {} slots", type_key, bucket.len());
                (index, false)
            }
        };

        let slot_ref = SlotRef::new(id, index);
        let slot = bucket
            .slot_mut(index)
            .ok_or(PoolError::SlotNotFound { slot: slot_ref })?;
        let generation = slot.grant(position, orientation);

        self.stats.total_acquired += 1;
        if reused {
            self.stats.total_reused += 1;
        } else {
            self.stats.total_grown += 1;
        }

        let handle = ObjectHandle::new(slot_ref, generation);
        log::trace!("Granted {:?} from '{}' at {:?}", handle, type_key, position);
        Ok(handle)
    }

    /// Release the object behind `handle`, immediately or after `delay`
    ///
    /// Releasing an idle slot, or a handle from an earlier grant, does
    /// nothing. Failures are logged.
    pub fn release(&mut self, handle: ObjectHandle, delay: f32) {
        if let Err(err) = self.try_release(handle, delay) {
            self.stats.failed_requests += 1;
            log::warn!("Failed to release pooled object {:?}: {}", handle, err);
        }
    }

    /// Release through a handle, reporting the outcome
    ///
    /// # Errors
    ///
    /// * [`PoolError::InvalidDelay`] - `delay` is NaN or infinite
    /// * [`PoolError::SlotNotFound`] - the handle does not belong to this registry
    pub fn try_release(&mut self, handle: ObjectHandle, delay: f32) -> PoolResult<ReleaseOutcome> {
        self.request_release(handle.slot, Some(handle.generation), delay)
    }

    /// Release whatever grant currently occupies `slot`
    ///
    /// This is the self-release path: objects receive their [`SlotRef`] in
    /// [`Poolable::attach_to_pool`] and hand it back here.
    pub fn release_slot(&mut self, slot: SlotRef, delay: f32) {
        if let Err(err) = self.try_release_slot(slot, delay) {
            self.stats.failed_requests += 1;
            log::warn!("Failed to release pooled slot {:?}: {}", slot, err);
        }
    }

    /// Release by slot reference, reporting the outcome
    ///
    /// # Errors
    ///
    /// Same as [`try_release`](Self::try_release).
    pub fn try_release_slot(&mut self, slot: SlotRef, delay: f32) -> PoolResult<ReleaseOutcome> {
        self.request_release(slot, None, delay)
    }

    fn request_release(
        &mut self,
        slot_ref: SlotRef,
        generation: Option<u32>,
        delay: f32,
    ) -> PoolResult<ReleaseOutcome> {
        if !delay.is_finite() {
            return Err(PoolError::InvalidDelay(delay));
        }

        let slot = lookup_slot_mut(&mut self.buckets, slot_ref)?;
        let generation = generation.unwrap_or_else(|| slot.generation());

        let outcome = if delay <= 0.0 {
            slot.release_grant(generation)
        } else if !slot.is_active() {
            ReleaseOutcome::AlreadyIdle
        } else if !slot.is_current(generation) {
            ReleaseOutcome::Stale
        } else {
            self.scheduler.schedule(delay, PendingRelease::new(slot_ref, generation));
            log::trace!("Scheduled release of {:?} in {}", slot_ref, delay);
            ReleaseOutcome::Scheduled
        };

        self.record_release(slot_ref, outcome);
        Ok(outcome)
    }

    fn record_release(&mut self, slot_ref: SlotRef, outcome: ReleaseOutcome) {
        match outcome {
            ReleaseOutcome::Released => {
                self.stats.total_released += 1;
                log::trace!("Released {:?}", slot_ref);
            }
            ReleaseOutcome::AlreadyIdle | ReleaseOutcome::Stale => {
                self.stats.ignored_releases += 1;
                log::trace!("Ignored release of {:?}: {:?}", slot_ref, outcome);
            }
            ReleaseOutcome::Scheduled => {}
        }
    }

    /// Advance the scheduler clock and apply every deferred release that is due
    ///
    /// Returns the number of slots that went idle. A deferred release whose
    /// slot was released and re-acquired in the meantime is dropped.
    pub fn update(&mut self, delta_time: f32) -> usize {
        let mut released = 0;

        for pending in self.scheduler.advance(delta_time) {
            match lookup_slot_mut(&mut self.buckets, pending.slot) {
                Ok(slot) => {
                    let outcome = slot.release_grant(pending.generation);
                    if outcome == ReleaseOutcome::Released {
                        released += 1;
                    }
                    self.record_release(pending.slot, outcome);
                }
                Err(err) => {
                    self.stats.failed_requests += 1;
                    log::warn!("Dropping deferred release: {}", err);
                }
            }
        }

        released
    }

    /// Object behind a live handle
    pub fn get(&self, handle: ObjectHandle) -> Option<&O> {
        lookup_slot(&self.buckets, handle.slot)
            .ok()
            .filter(|slot| slot.is_current(handle.generation))
            .map(PooledSlot::object)
    }

    /// Object behind a live handle, mutably
    ///
    /// Mutate the object in place. Replacing it wholesale (`*obj = other`)
    /// swaps out the pooled instance and loses the [`SlotRef`] it was given in
    /// [`Poolable::attach_to_pool`].
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut O> {
        lookup_slot_mut(&mut self.buckets, handle.slot)
            .ok()
            .filter(|slot| slot.is_current(handle.generation))
            .map(PooledSlot::object_mut)
    }

    /// Object stored in `slot`, whether active or idle
    pub fn object_at(&self, slot: SlotRef) -> Option<&O> {
        lookup_slot(&self.buckets, slot).ok().map(PooledSlot::object)
    }

    /// Whether `handle` still names an active grant
    pub fn is_active(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Bucket for a type key
    pub fn bucket(&self, type_key: &str) -> Option<&PoolBucket<O>> {
        self.keys
            .get(&TypeKey::from(type_key))
            .and_then(|&id| self.buckets.get(id))
    }

    /// Total slots for a type key, or `None` if no bucket exists yet
    pub fn bucket_len(&self, type_key: &str) -> Option<usize> {
        self.bucket(type_key).map(PoolBucket::len)
    }

    /// Active slots for a type key
    pub fn active_count(&self, type_key: &str) -> usize {
        self.bucket(type_key).map_or(0, PoolBucket::active_count)
    }

    /// Idle slots for a type key
    pub fn idle_count(&self, type_key: &str) -> usize {
        self.bucket(type_key).map_or(0, PoolBucket::idle_count)
    }

    /// Grouping label of a type key's bucket
    pub fn group_label(&self, type_key: &str) -> Option<&str> {
        self.bucket(type_key).map(PoolBucket::group_label)
    }

    /// Type keys with a bucket, in no particular order
    pub fn type_keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.keys.keys()
    }

    /// Visit every active object with its handle
    pub fn for_each_active<F>(&self, mut callback: F)
    where
        F: FnMut(ObjectHandle, &O),
    {
        for (id, bucket) in &self.buckets {
            for (index, slot) in bucket.iter().enumerate() {
                if slot.is_active() {
                    let handle = ObjectHandle::new(SlotRef::new(id, index), slot.generation());
                    callback(handle, slot.object());
                }
            }
        }
    }

    /// Deferred releases still waiting
    pub fn pending_releases(&self) -> usize {
        self.scheduler.pending()
    }

    /// Current statistics
    pub fn stats(&self) -> PoolStats {
        let mut stats = self.stats.clone();
        stats.buckets = self.buckets.len();
        stats.total_slots = self.buckets.values().map(PoolBucket::len).sum();
        stats.active_slots = self.buckets.values().map(PoolBucket::active_count).sum();
        stats.pending_releases = self.scheduler.pending();
        stats
    }

    /// Per-bucket statistics, sorted by type key
    pub fn bucket_stats(&self) -> Vec<BucketStats> {
        let mut stats: Vec<BucketStats> = self
            .buckets
            .values()
            .map(|bucket| BucketStats {
                type_key: bucket.type_key().clone(),
                group_label: bucket.group_label().to_string(),
                slots: bucket.len(),
                active: bucket.active_count(),
            })
            .collect();
        stats.sort_by(|a, b| a.type_key.cmp(&b.type_key));
        stats
    }

    /// Configuration the registry was created with
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// The release scheduler
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

fn lookup_slot<O>(
    buckets: &SlotMap<BucketId, PoolBucket<O>>,
    slot: SlotRef,
) -> PoolResult<&PooledSlot<O>>
where
    O: Poolable,
{
    buckets
        .get(slot.bucket)
        .and_then(|bucket| bucket.slot(slot.index))
        .ok_or(PoolError::SlotNotFound { slot })
}

fn lookup_slot_mut<O>(
    buckets: &mut SlotMap<BucketId, PoolBucket<O>>,
    slot: SlotRef,
) -> PoolResult<&mut PooledSlot<O>>
where
    O: Poolable,
{
    buckets
        .get_mut(slot.bucket)
        .and_then(|bucket| bucket.slot_mut(slot.index))
        .ok_or(PoolError::SlotNotFound { slot })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pooling::error::ErrorKind;
    use crate::pooling::prototype::PoolingMetadata;

    #[derive(Debug)]
    struct Spark {
        serial: u32,
        position: Vec3,
        visible: bool,
    }

    impl Poolable for Spark {
        fn set_placement(&mut self, position: Vec3, _orientation: Quat) {
            self.position = position;
        }

        fn set_active(&mut self, active: bool) {
            self.visible = active;
        }
    }

    struct SparkPrototype {
        metadata: Option<PoolingMetadata>,
        made: std::cell::Cell<u32>,
    }

    impl SparkPrototype {
        fn new(key: &str) -> Self {
            Self {
                metadata: Some(PoolingMetadata::new(key)),
                made: std::cell::Cell::new(0),
            }
        }
    }

    impl Prototype for SparkPrototype {
        type Object = Spark;

        fn name(&self) -> &str {
            "spark"
        }

        fn pooling_metadata(&self) -> Option<&PoolingMetadata> {
            self.metadata.as_ref()
        }

        fn instantiate(&self, position: Vec3, _orientation: Quat) -> Spark {
            let serial = self.made.get();
            self.made.set(serial + 1);
            Spark { serial, position, visible: true }
        }
    }

    fn registry(size: usize) -> PoolRegistry<Spark> {
        let config = PoolConfig::new().with_default_pool_size(size);
        let mut registry = PoolRegistry::with_config(config);
        registry.initialize().expect("valid config");
        registry
    }

    #[test]
    fn test_acquire_before_initialize_fails() {
        let mut registry: PoolRegistry<Spark> = PoolRegistry::with_config(PoolConfig::default());
        let prototype = SparkPrototype::new("spark");

        let result = registry.try_acquire(&prototype, Vec3::zeros(), Quat::identity());
        assert_eq!(result, Err(PoolError::NotInitialized));
        assert!(registry.bucket_len("spark").is_none());
        assert_eq!(prototype.made.get(), 0);
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let mut registry: PoolRegistry<Spark> =
            PoolRegistry::with_config(PoolConfig::new().with_default_pool_size(0));
        assert!(registry.initialize().is_err());
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_first_acquire_prewarms_bucket() {
        let mut registry = registry(4);
        let prototype = SparkPrototype::new("spark");

        let handle = registry
            .acquire(&prototype, Vec3::new(1.0, 0.0, 0.0), Quat::identity())
            .expect("acquire");

        assert_eq!(registry.bucket_len("spark"), Some(4));
        assert_eq!(registry.active_count("spark"), 1);
        assert_eq!(registry.idle_count("spark"), 3);
        assert_eq!(prototype.made.get(), 4);
        assert_eq!(registry.group_label("spark"), Some("[ObjectPool] spark"));

        let spark = registry.get(handle).expect("live handle");
        assert_eq!(spark.serial, 0);
        assert!(spark.visible);
    }

    #[test]
    fn test_idle_prewarmed_objects_are_hidden() {
        let mut registry = registry(3);
        let prototype = SparkPrototype::new("spark");
        let handle = registry
            .acquire(&prototype, Vec3::zeros(), Quat::identity())
            .expect("acquire");

        for index in 1..3 {
            let idle = registry
                .object_at(SlotRef::new(handle.slot.bucket, index))
                .expect("prewarmed slot");
            assert!(!idle.visible);
        }
    }

    #[test]
    fn test_prewarmed_objects_start_at_request_placement() {
        let mut registry = registry(3);
        let prototype = SparkPrototype::new("spark");
        let muzzle = Vec3::new(4.0, -2.0, 9.5);
        let handle = registry.acquire(&prototype, muzzle, Quat::identity()).expect("acquire");

        for index in 1..3 {
            let idle = registry
                .object_at(SlotRef::new(handle.slot.bucket, index))
                .expect("prewarmed slot");
            assert_eq!(idle.position, muzzle);
            assert!(!idle.visible);
        }
    }

    #[test]
    fn test_zero_default_size_grows_on_first_acquire() {
        let mut registry = registry(0);
        assert!(registry.is_initialized());

        let prototype = SparkPrototype::new("bulletA");
        let handle = registry
            .try_acquire(&prototype, Vec3::zeros(), Quat::identity())
            .expect("acquire from empty bucket");

        assert_eq!(registry.bucket_len("bulletA"), Some(1));
        assert!(registry.is_active(handle));
        assert_eq!(registry.stats().total_grown, 1);
    }

    #[test]
    fn test_stale_handle_cannot_reach_new_grant() {
        let mut registry = registry(1);
        let prototype = SparkPrototype::new("spark");

        let first = registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).expect("first");
        registry.release(first, 0.0);
        let second = registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).expect("second");

        assert_eq!(first.slot, second.slot);
        assert!(registry.get(first).is_none());
        assert!(registry.get(second).is_some());

        let outcome = registry.try_release(first, 0.0).expect("release");
        assert_eq!(outcome, ReleaseOutcome::Stale);
        assert!(registry.is_active(second));
    }

    #[test]
    fn test_release_slot_releases_current_grant() {
        let mut registry = registry(2);
        let prototype = SparkPrototype::new("spark");
        let handle = registry
            .acquire(&prototype, Vec3::zeros(), Quat::identity())
            .expect("acquire");

        let outcome = registry.try_release_slot(handle.slot, 0.0).expect("release");
        assert_eq!(outcome, ReleaseOutcome::Released);
        assert!(!registry.is_active(handle));
    }

    #[test]
    fn test_invalid_delay_is_rejected() {
        let mut registry = registry(2);
        let prototype = SparkPrototype::new("spark");
        let handle = registry
            .acquire(&prototype, Vec3::zeros(), Quat::identity())
            .expect("acquire");

        let result = registry.try_release(handle, f32::NAN);
        assert!(matches!(result, Err(PoolError::InvalidDelay(_))));
        assert!(registry.is_active(handle));
    }

    #[test]
    fn test_unknown_slot_is_a_lookup_error() {
        let mut registry = registry(2);
        let prototype = SparkPrototype::new("spark");
        let handle = registry
            .acquire(&prototype, Vec3::zeros(), Quat::identity())
            .expect("acquire");

        let dangling = SlotRef::new(handle.slot.bucket, 99);
        let err = registry.try_release_slot(dangling, 0.0).expect_err("out of range");
        assert_eq!(err.kind(), ErrorKind::Lookup);

        let foreign = SlotRef::new(BucketId::default(), 0);
        assert!(registry.try_release_slot(foreign, 0.0).is_err());

        // The logging entry point swallows the error
        registry.release_slot(dangling, 0.0);
        assert_eq!(registry.stats().failed_requests, 1);
    }

    #[test]
    fn test_missing_bucket_storage_declines_acquire() {
        let mut registry = registry(2);
        let prototype = SparkPrototype::new("spark");
        let handle = registry
            .acquire(&prototype, Vec3::zeros(), Quat::identity())
            .expect("acquire");

        // Corrupt the bookkeeping: the key index survives, the bucket does not
        registry.buckets.remove(handle.slot.bucket);

        let result = registry.try_acquire(&prototype, Vec3::zeros(), Quat::identity());
        assert_eq!(result, Err(PoolError::BucketNotFound(TypeKey::from("spark"))));
        assert!(registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).is_none());
    }

    #[test]
    fn test_for_each_active_visits_granted_objects_only() {
        let mut registry = registry(4);
        let prototype = SparkPrototype::new("spark");
        let a = registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).expect("a");
        let b = registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).expect("b");
        registry.release(a, 0.0);

        let mut seen = Vec::new();
        registry.for_each_active(|handle, spark| seen.push((handle, spark.serial)));
        assert_eq!(seen, vec![(b, 1)]);
    }

    #[test]
    fn test_stats_track_reuse_and_growth() {
        let mut registry = registry(1);
        let prototype = SparkPrototype::new("spark");

        let a = registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).expect("a");
        let _b = registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).expect("b");
        registry.release(a, 0.0);
        registry.release(a, 0.0);
        let _c = registry.acquire(&prototype, Vec3::zeros(), Quat::identity()).expect("c");

        let stats = registry.stats();
        assert_eq!(stats.buckets, 1);
        assert_eq!(stats.total_slots, 2);
        assert_eq!(stats.active_slots, 2);
        assert_eq!(stats.total_acquired, 3);
        assert_eq!(stats.total_reused, 2);
        assert_eq!(stats.total_grown, 1);
        assert_eq!(stats.total_released, 1);
        assert_eq!(stats.ignored_releases, 1);

        let buckets = registry.bucket_stats();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].slots, 2);
        assert_eq!(buckets[0].idle(), 0);
    }
}
