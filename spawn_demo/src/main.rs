//! Spawn demo application
//!
//! Runs a headless fixed-step frame loop in which two turrets fire pooled
//! projectiles. Bullets expire through delayed release; rockets release
//! themselves when they leave the arena.
//!
//! Usage: `spawn_demo [config.toml|config.ron] [frames]`

mod projectile;

use pool_engine::foundation::logging;
use pool_engine::prelude::*;
use projectile::{Projectile, ProjectilePrototype};
use rand::Rng;
use thiserror::Error;

const FRAME_TIME: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u32 = 600;
const ARENA_RADIUS: f32 = 40.0;

/// Errors that stop the demo before the frame loop starts
#[derive(Debug, Error)]
enum DemoError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid frame count '{0}'")]
    FrameCount(String),
}

struct SpawnDemo {
    pools: PoolRegistry<Projectile>,
    bullet: ProjectilePrototype,
    rocket: ProjectilePrototype,
    flare: ProjectilePrototype,
    live: Vec<ObjectHandle>,
    elapsed: f32,
}

impl SpawnDemo {
    fn new(config: PoolConfig) -> Result<Self, DemoError> {
        let mut pools = PoolRegistry::with_config(config);
        pools.initialize()?;

        Ok(Self {
            pools,
            bullet: ProjectilePrototype::new("bullet", 30.0),
            rocket: ProjectilePrototype::new("rocket", 12.0),
            flare: ProjectilePrototype::unpooled("flare", 5.0),
            live: Vec::new(),
            elapsed: 0.0,
        })
    }

    fn frame(&mut self, rng: &mut impl Rng) {
        self.elapsed += FRAME_TIME;

        // Turret sweeps around the Y axis
        let aim = Quat::from_axis_angle(&Vec3::y_axis(), self.elapsed * 0.8);
        let muzzle = Vec3::new(0.0, 1.0, 0.0);

        for _ in 0..rng.gen_range(0..3) {
            if let Some(handle) = self.pools.acquire(&self.bullet, muzzle, aim) {
                let lifetime = rng.gen_range(0.3..1.2);
                self.pools.release(handle, lifetime);
                self.live.push(handle);
            }
        }

        if rng.gen_bool(0.05) {
            if let Some(handle) = self.pools.acquire(&self.rocket, muzzle, aim) {
                self.live.push(handle);
            }
        }

        // Misconfigured prototype: logged by the registry and skipped
        if rng.gen_bool(0.002) && self.pools.acquire(&self.flare, muzzle, aim).is_none() {
            log::debug!("Flare spawn skipped");
        }

        self.move_projectiles();
        let expired = self.pools.update(FRAME_TIME);
        if expired > 0 {
            log::trace!("{} projectiles expired this frame", expired);
        }
    }

    fn move_projectiles(&mut self) {
        let mut escaped = Vec::new();

        self.live.retain(|&handle| match self.pools.get_mut(handle) {
            Some(projectile) => {
                projectile.advance(FRAME_TIME);
                if projectile.out_of_bounds(ARENA_RADIUS) {
                    escaped.extend(projectile.slot);
                }
                true
            }
            None => false,
        });

        for slot in escaped {
            self.pools.release_slot(slot, 0.0);
        }
    }

    fn report(&self) {
        log::info!("Pools: {}", self.pools.stats());
        for bucket in self.pools.bucket_stats() {
            log::info!(
                "  {:<24} {:>4} slots, {:>4} active, {:>4} idle",
                bucket.group_label,
                bucket.slots,
                bucket.active,
                bucket.idle()
            );
        }
    }
}

fn load_config(path: Option<&str>) -> Result<PoolConfig, DemoError> {
    match path {
        Some(path) => Ok(PoolConfig::load_from_file(path)?),
        None => Ok(PoolConfig::new()
            .with_bucket_size("bullet", 48)
            .with_bucket_size("rocket", 4)),
    }
}

fn run() -> Result<(), DemoError> {
    let args: Vec<String> = std::env::args().collect();
    let config = load_config(args.get(1).map(String::as_str))?;
    let frames = match args.get(2) {
        Some(raw) => raw.parse().map_err(|_| DemoError::FrameCount(raw.clone()))?,
        None => DEFAULT_FRAMES,
    };

    logging::init_with_level(&config.log_level);
    log::info!("Starting spawn demo for {} frames", frames);

    let mut demo = SpawnDemo::new(config)?;
    let mut rng = rand::thread_rng();

    for frame in 1..=frames {
        demo.frame(&mut rng);
        if frame % 120 == 0 {
            demo.report();
        }
    }

    demo.report();
    let stats = demo.pools.stats();
    log::info!("Reuse ratio {:.1}%", stats.reuse_ratio() * 100.0);
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("spawn_demo: {}", err);
        std::process::exit(1);
    }
}
