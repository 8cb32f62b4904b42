//! Projectiles used by the spawn demo

use pool_engine::prelude::*;

/// A pooled projectile
#[derive(Debug)]
pub struct Projectile {
    pub kind: &'static str,
    pub position: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    pub visible: bool,
    /// Back-reference for self-release
    pub slot: Option<SlotRef>,
}

impl Projectile {
    /// Move along the current velocity
    pub fn advance(&mut self, delta_time: f32) {
        self.position += self.velocity * delta_time;
    }

    /// Whether the projectile has left the play area
    pub fn out_of_bounds(&self, radius: f32) -> bool {
        self.position.norm() > radius
    }
}

impl Poolable for Projectile {
    fn set_placement(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.velocity = Placement::new(position, orientation).forward() * self.speed;
    }

    fn set_active(&mut self, active: bool) {
        self.visible = active;
        if !active {
            self.velocity = Vec3::zeros();
        }
    }

    fn attach_to_pool(&mut self, slot: SlotRef, group: &str) {
        log::trace!("{} projectile joined {} at {:?}", self.kind, group, slot);
        self.slot = Some(slot);
    }
}

/// Template for one kind of projectile
pub struct ProjectilePrototype {
    kind: &'static str,
    speed: f32,
    metadata: Option<PoolingMetadata>,
}

impl ProjectilePrototype {
    /// A projectile kind pooled under its own name
    pub fn new(kind: &'static str, speed: f32) -> Self {
        Self {
            kind,
            speed,
            metadata: Some(PoolingMetadata::new(kind)),
        }
    }

    /// A projectile kind someone forgot to set up for pooling
    pub fn unpooled(kind: &'static str, speed: f32) -> Self {
        Self {
            kind,
            speed,
            metadata: None,
        }
    }
}

impl Prototype for ProjectilePrototype {
    type Object = Projectile;

    fn name(&self) -> &str {
        self.kind
    }

    fn pooling_metadata(&self) -> Option<&PoolingMetadata> {
        self.metadata.as_ref()
    }

    fn instantiate(&self, position: Vec3, orientation: Quat) -> Projectile {
        let mut projectile = Projectile {
            kind: self.kind,
            position,
            velocity: Vec3::zeros(),
            speed: self.speed,
            visible: true,
            slot: None,
        };
        projectile.set_placement(position, orientation);
        projectile
    }
}
