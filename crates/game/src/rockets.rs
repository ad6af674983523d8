//! Rockets fired by the otter. Purely cosmetic: they fly straight and expire.

use engine_core::{Lifetime, Transform, TransformRaw, Vec3};

use crate::config::RocketTuning;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rocket {
    pub position: Vec3,
    pub velocity: Vec3,
    pub heading: f32,
    pub lifetime: Lifetime,
    pub active: bool,
}

/// Up to `max_rockets` rockets. Once all are in flight the oldest slots are
/// reused round-robin.
pub struct RocketPool {
    tuning: RocketTuning,
    rockets: Vec<Rocket>,
    reuse_cursor: usize,
}

impl RocketPool {
    pub fn new(tuning: RocketTuning) -> Self {
        Self {
            rockets: Vec::with_capacity(tuning.max_rockets),
            tuning,
            reuse_cursor: 0,
        }
    }

    /// Fire from `origin` along `heading`, tilted up by `pitch`.
    pub fn shoot(&mut self, origin: Vec3, heading: f32, pitch: f32) {
        let direction = Vec3::new(heading.sin(), pitch.sin(), heading.cos()).normalize_or_zero();
        let rocket = Rocket {
            position: origin + Vec3::Y * self.tuning.muzzle_height,
            velocity: direction * self.tuning.speed,
            heading,
            lifetime: Lifetime::new(self.tuning.lifetime),
            active: true,
        };

        if let Some(slot) = self.rockets.iter_mut().find(|r| !r.active) {
            *slot = rocket;
        } else if self.rockets.len() < self.tuning.max_rockets {
            self.rockets.push(rocket);
        } else {
            let idx = self.reuse_cursor % self.rockets.len();
            self.rockets[idx] = rocket;
            self.reuse_cursor = (idx + 1) % self.rockets.len();
        }
    }

    pub fn update(&mut self, dt: f32) {
        for r in self.rockets.iter_mut().filter(|r| r.active) {
            r.position += r.velocity * dt;
            if r.lifetime.update(dt) {
                r.active = false;
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.rockets.iter().filter(|r| r.active).count()
    }

    /// Slots allocated so far, live or spent.
    pub fn allocated(&self) -> usize {
        self.rockets.len()
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn instance_data(&self) -> Vec<TransformRaw> {
        self.rockets
            .iter()
            .map(|r| {
                let pose = if r.active {
                    Transform::from_yaw(r.position, r.heading, 1.0)
                } else {
                    Transform::hidden()
                };
                TransformRaw::from(pose)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rocket_flies_forward_then_expires() {
        let mut pool = RocketPool::new(RocketTuning::default());
        pool.shoot(Vec3::ZERO, 0.0, 0.0);
        let r = pool.rockets()[0];
        assert_eq!(r.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(r.velocity, Vec3::new(0.0, 0.0, 40.0));

        pool.update(0.5);
        assert!((pool.rockets()[0].position.z - 20.0).abs() < 1e-4);
        for _ in 0..5 {
            pool.update(0.5);
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn spent_slots_are_reused_first() {
        let mut pool = RocketPool::new(RocketTuning::default());
        pool.shoot(Vec3::ZERO, 0.0, 0.0);
        pool.update(4.0);
        pool.shoot(Vec3::ZERO, 1.0, 0.0);
        assert_eq!(pool.allocated(), 1);
        assert_eq!(pool.active_count(), 1);
    }

    #[test]
    fn full_pool_recycles_round_robin() {
        let mut pool = RocketPool::new(RocketTuning::default());
        for i in 0..20 {
            pool.shoot(Vec3::new(i as f32, 0.0, 0.0), 0.0, 0.0);
        }
        assert_eq!(pool.allocated(), 20);
        pool.shoot(Vec3::new(100.0, 0.0, 0.0), 0.0, 0.0);
        pool.shoot(Vec3::new(200.0, 0.0, 0.0), 0.0, 0.0);
        assert_eq!(pool.allocated(), 20);
        assert_eq!(pool.active_count(), 20);
        assert_eq!(pool.rockets()[0].position.x, 100.0);
        assert_eq!(pool.rockets()[1].position.x, 200.0);
        assert_eq!(pool.rockets()[2].position.x, 2.0);
    }

    #[test]
    fn pitch_tilts_direction() {
        let mut pool = RocketPool::new(RocketTuning::default());
        pool.shoot(Vec3::ZERO, 0.0, 0.5);
        let v = pool.rockets()[0].velocity;
        assert!(v.y > 0.0);
        assert!((v.length() - 40.0).abs() < 1e-3);
    }
}
