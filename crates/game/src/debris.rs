//! Debris chunks thrown off crumbling people.
//!
//! A fixed ring of particles. Spawning always takes the slot under the cursor,
//! live or not, so a burst during heavy traffic recycles the oldest chunks
//! instead of growing the pool.

use engine_core::{Transform, TransformRaw, Vec3};
use rand::Rng;

use crate::config::DebrisTuning;
use crate::tint::Tint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebrisParticle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Seconds since spawn.
    pub life: f32,
    pub max_life: f32,
    pub tint: Tint,
    pub active: bool,
}

impl Default for DebrisParticle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            life: 0.0,
            max_life: 0.0,
            tint: Tint::GREY,
            active: false,
        }
    }
}

impl DebrisParticle {
    /// Fraction of its life used up, in [0, 1].
    pub fn age_fraction(&self) -> f32 {
        if self.max_life <= 0.0 {
            return 1.0;
        }
        (self.life / self.max_life).min(1.0)
    }
}

pub struct DebrisPool {
    tuning: DebrisTuning,
    particles: Vec<DebrisParticle>,
    cursor: usize,
    spawned_total: u64,
}

impl DebrisPool {
    pub fn new(tuning: DebrisTuning) -> Self {
        let capacity = tuning.capacity.max(1);
        Self {
            tuning,
            particles: vec![DebrisParticle::default(); capacity],
            cursor: 0,
            spawned_total: 0,
        }
    }

    /// Throw `count` chunks up from `origin`, each a lightness variant of `tint`.
    pub fn spawn_burst(&mut self, origin: Vec3, tint: Tint, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            let idx = self.cursor;
            self.cursor = (self.cursor + 1) % self.particles.len();

            let t = &self.tuning;
            self.particles[idx] = DebrisParticle {
                position: origin
                    + Vec3::new(
                        (rng.gen::<f32>() - 0.5) * 0.5,
                        0.3 + rng.gen::<f32>() * 0.8,
                        (rng.gen::<f32>() - 0.5) * 0.5,
                    ),
                velocity: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * 6.0,
                    3.0 + rng.gen::<f32>() * 5.0,
                    (rng.gen::<f32>() - 0.5) * 6.0,
                ),
                life: 0.0,
                max_life: t.min_life + rng.gen::<f32>() * (t.max_life - t.min_life),
                tint: tint.offset_hsl(0.0, 0.0, (rng.gen::<f32>() - 0.5) * 0.2),
                active: true,
            };
        }
        self.spawned_total += count as u64;
    }

    pub fn update(&mut self, dt: f32, terrain: impl Fn(f32, f32) -> f32) {
        let t = &self.tuning;
        for d in self.particles.iter_mut().filter(|d| d.active) {
            d.life += dt;
            if d.life >= d.max_life {
                d.active = false;
                continue;
            }

            d.velocity.y -= t.gravity * dt;
            d.position += d.velocity * dt;

            let ground = terrain(d.position.x, d.position.z);
            if d.position.y < ground && d.velocity.y < 0.0 {
                d.position.y = ground;
                d.velocity.y *= -t.restitution;
                d.velocity.x *= t.friction;
                d.velocity.z *= t.friction;
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Chunks ever spawned, including ones since recycled.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|d| d.active).count()
    }

    pub fn particles(&self) -> &[DebrisParticle] {
        &self.particles
    }

    /// Shrinking, tumbling pose per slot; retired slots are hidden.
    pub fn transform(&self, index: usize) -> Transform {
        let d = &self.particles[index];
        if !d.active {
            return Transform::hidden();
        }
        let size = self.tuning.size * (1.0 - d.age_fraction() * 0.7);
        let spin = d.life * 10.0;
        Transform::from_euler(d.position, Vec3::new(spin, spin * 0.7, spin * 1.3), Vec3::splat(size))
    }

    /// Instance matrices for every slot, hidden ones included.
    pub fn instance_data(&self) -> Vec<TransformRaw> {
        (0..self.particles.len()).map(|i| TransformRaw::from(self.transform(i))).collect()
    }
}
