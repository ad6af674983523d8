//! A single person: state, timers, and the per-state behaviours.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use engine_core::{TickAccumulator, Transform, Vec3};
use rand::Rng;

use crate::config::CrowdTuning;
use crate::tint::{Tint, PERSON_PALETTE};

/// Stages of being thrown by a repel blast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FleePhase {
    /// Ballistic arc until touching down.
    Airborne { velocity: Vec3, timer: f32 },
    /// Folding over on impact.
    LFold { timer: f32 },
    /// Shrinking away.
    Crumble { timer: f32 },
}

impl FleePhase {
    /// 0 airborne, 1 folding, 2 crumbling.
    pub fn index(&self) -> u8 {
        match self {
            FleePhase::Airborne { .. } => 0,
            FleePhase::LFold { .. } => 1,
            FleePhase::Crumble { .. } => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PersonState {
    Wander,
    Idle,
    Chase,
    /// Mounted on the otter at `slot` in the rider stack.
    Riding { slot: usize },
    /// Flailing around `anchor` until `timer` runs out.
    Drowning { timer: f32, anchor: Vec3 },
    Dead,
    /// Launched by a repel; `heading` is the blast direction.
    Flee { heading: f32, phase: FleePhase },
}

impl PersonState {
    pub fn kind(&self) -> PersonStateKind {
        match self {
            PersonState::Wander => PersonStateKind::Wander,
            PersonState::Idle => PersonStateKind::Idle,
            PersonState::Chase => PersonStateKind::Chase,
            PersonState::Riding { .. } => PersonStateKind::Riding,
            PersonState::Drowning { .. } => PersonStateKind::Drowning,
            PersonState::Dead => PersonStateKind::Dead,
            PersonState::Flee { .. } => PersonStateKind::Flee,
        }
    }

    /// A repel blast leaves these alone.
    pub fn ignores_repel(&self) -> bool {
        matches!(
            self,
            PersonState::Dead | PersonState::Drowning { .. } | PersonState::Flee { .. } | PersonState::Riding { .. }
        )
    }
}

/// Payload-free view of [`PersonState`] for counting and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonStateKind {
    Wander,
    Idle,
    Chase,
    Riding,
    Drowning,
    Dead,
    Flee,
}

/// What a flee step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleeEvent {
    None,
    Landed,
    /// Finished folding; debris should burst from the person.
    Crumbled,
    Died,
}

#[derive(Debug, Clone)]
pub struct Person {
    pub position: Vec3,
    pub heading: f32,
    /// Wander speed.
    pub speed: f32,
    pub scale: f32,
    pub tint: Tint,
    pub state: PersonState,
    pub wander_timer: f32,
    pub wander_interval: f32,
    pub idle_timer: f32,
    /// Consecutive effective seconds spent below the water line.
    pub underwater_timer: f32,
    pub lod: TickAccumulator,
    /// Last computed presentation pose.
    pub pose: Transform,
}

impl Person {
    pub fn new(position: Vec3, heading: f32, scale: f32, speed: f32, tint: Tint, state: PersonState) -> Self {
        Self {
            position,
            heading,
            speed,
            scale,
            tint,
            state,
            wander_timer: 0.0,
            wander_interval: 5.0,
            idle_timer: 3.0,
            underwater_timer: 0.0,
            lod: TickAccumulator::default(),
            pose: Transform::from_yaw(position, heading, scale),
        }
    }

    /// A randomly dressed person standing at `position`, wandering or idle.
    pub fn random(position: Vec3, tuning: &CrowdTuning, rng: &mut impl Rng) -> Self {
        let heading = rng.gen::<f32>() * TAU;
        let scale = 0.8 + rng.gen::<f32>() * 0.4;
        let tint = Tint::from_hex(PERSON_PALETTE[rng.gen_range(0..PERSON_PALETTE.len())]).offset_hsl(
            (rng.gen::<f32>() - 0.5) * 0.06,
            0.0,
            (rng.gen::<f32>() - 0.5) * 0.1,
        );
        let speed = tuning.wander_speed * (0.6 + rng.gen::<f32>() * 0.8);
        let state = if rng.gen_bool(0.5) { PersonState::Wander } else { PersonState::Idle };

        let mut person = Self::new(position, heading, scale, speed, tint, state);
        person.wander_timer = rng.gen::<f32>() * 6.0;
        person.wander_interval = random_between(rng, tuning.wander_interval_min, tuning.wander_interval_max);
        person.idle_timer = rng.gen::<f32>() * 4.0;
        person.lod = TickAccumulator::with_offset(rng.gen::<f32>() * 0.1);
        person
    }

    pub fn is_dead(&self) -> bool {
        self.state == PersonState::Dead
    }

    /// Height of a rider at `slot` above an otter at `otter_y`.
    pub fn riding_height(&self, otter_y: f32, slot: usize, tuning: &CrowdTuning) -> f32 {
        otter_y + tuning.ride_offset + slot as f32 * tuning.stack_height * self.scale
    }

    /// Accumulate submersion at height `y`. Returns true on the step the
    /// accumulated time reaches the drown threshold.
    pub fn check_drowning(&mut self, dt: f32, y: f32, tuning: &CrowdTuning) -> bool {
        if y < tuning.water_level {
            self.underwater_timer += dt;
            self.underwater_timer >= tuning.drown_time
        } else {
            self.underwater_timer = 0.0;
            false
        }
    }

    pub fn start_drowning(&mut self, anchor: Vec3) {
        self.state = PersonState::Drowning { timer: 0.0, anchor };
    }

    /// Advance the drowning animation. `index` decorrelates people's flailing.
    /// Returns true when the person dies.
    pub fn update_drowning(&mut self, dt: f32, time: f32, index: usize, tuning: &CrowdTuning) -> bool {
        let PersonState::Drowning { timer, anchor } = &mut self.state else {
            return false;
        };
        *timer += dt;
        let (elapsed, anchor) = (*timer, *anchor);
        if elapsed >= tuning.drowning_duration {
            self.die();
            return true;
        }

        let t = elapsed / tuning.drowning_duration;
        let i = index as f32;
        let bob_speed = 12.0 - t * 6.0;
        let bob = 0.3 * (1.0 - t);
        let sink = t * 2.5;
        let y = anchor.y + (time * bob_speed + i).sin() * bob - sink;
        let flail_x = (time * 8.0 + i * 2.0).sin() * 0.15 * (1.0 - t);
        let flail_z = (time * 7.0 + i * 3.0).cos() * 0.15 * (1.0 - t);
        let tilt_x = (time * 6.0 + i).sin() * 0.5 * (1.0 - t * 0.5);
        let tilt_z = (time * 5.0 + i * 1.5).cos() * 0.4 * (1.0 - t * 0.5);

        self.pose = Transform::from_euler(
            Vec3::new(anchor.x + flail_x, y, anchor.z + flail_z),
            Vec3::new(tilt_x, self.heading, tilt_z),
            Vec3::splat(self.scale * (1.0 - t * 0.3)),
        );
        false
    }

    pub fn die(&mut self) {
        self.state = PersonState::Dead;
        self.pose = Transform::hidden();
    }

    /// Sit on the otter with a little per-slot sway. `position` follows the
    /// seat so it stays current while riding.
    pub fn update_riding(&mut self, time: f32, otter_pos: Vec3, otter_heading: f32, tuning: &CrowdTuning) {
        let PersonState::Riding { slot } = self.state else {
            return;
        };
        let s = slot as f32;
        let sway = 0.05 * (s + 1.0);
        let sway_x = (time * 2.0 + s * 0.7).sin() * sway;
        let sway_z = (time * 1.7 + s * 1.1).cos() * sway;
        let y = self.riding_height(otter_pos.y, slot, tuning);
        self.position = Vec3::new(otter_pos.x + sway_x, y, otter_pos.z + sway_z);
        self.pose = Transform::from_yaw(self.position, otter_heading, self.scale);
    }

    /// Run straight at the otter, `(dx, dz)` away.
    pub fn update_chase(&mut self, dt: f32, dx: f32, dz: f32, tuning: &CrowdTuning, terrain: impl Fn(f32, f32) -> f32) {
        self.heading = dx.atan2(dz);
        self.position.x += self.heading.sin() * tuning.chase_speed * dt;
        self.position.z += self.heading.cos() * tuning.chase_speed * dt;
        let ground = terrain(self.position.x, self.position.z);
        // Chasers wade through shallows at their last dry height.
        if ground >= tuning.shore_height {
            self.position.y = ground;
        }
        self.stand();
    }

    /// Stroll forward, staying on dry land inside `roam_radius`.
    pub fn update_wander(
        &mut self,
        dt: f32,
        roam_radius: f32,
        tuning: &CrowdTuning,
        rng: &mut impl Rng,
        terrain: impl Fn(f32, f32) -> f32,
    ) {
        let step_x = self.heading.sin() * self.speed * dt;
        let step_z = self.heading.cos() * self.speed * dt;
        self.position.x += step_x;
        self.position.z += step_z;

        let (x, z) = (self.position.x, self.position.z);
        if x * x + z * z > roam_radius * roam_radius {
            self.heading += PI;
            self.position.x -= step_x * 2.0;
            self.position.z -= step_z * 2.0;
        }

        let ground = terrain(self.position.x, self.position.z);
        if ground < tuning.shore_height {
            self.heading += FRAC_PI_2;
            self.position.x -= step_x;
            self.position.z -= step_z;
        } else {
            self.position.y = ground;
        }

        self.wander_timer += dt;
        if self.wander_timer >= self.wander_interval {
            self.wander_timer = 0.0;
            self.heading += (rng.gen::<f32>() - 0.5) * PI;
            self.wander_interval = random_between(rng, tuning.wander_interval_min, tuning.wander_interval_max);
            if rng.gen::<f32>() < tuning.idle_chance {
                self.state = PersonState::Idle;
                self.idle_timer = random_between(rng, tuning.idle_dwell_min, tuning.idle_dwell_max);
            }
        }
        self.stand();
    }

    pub fn update_idle(&mut self, dt: f32, rng: &mut impl Rng) {
        self.idle_timer -= dt;
        if self.idle_timer <= 0.0 {
            self.state = PersonState::Wander;
            self.heading += (rng.gen::<f32>() - 0.5) * PI;
            self.wander_timer = 0.0;
        }
        self.stand();
    }

    /// Throw the person away from `(origin_x, origin_z)`. Closer means faster.
    pub fn launch(&mut self, origin_x: f32, origin_z: f32, tuning: &CrowdTuning, rng: &mut impl Rng) {
        let dx = self.position.x - origin_x;
        let dz = self.position.z - origin_z;
        let mut dist = (dx * dx + dz * dz).sqrt();
        if dist == 0.0 {
            dist = 1.0;
        }
        let (nx, nz) = (dx / dist, dz / dist);

        let strength = 1.0 - (dist / tuning.flee_radius).min(1.0);
        let out_speed = tuning.flee_launch_out * (0.7 + strength * 0.6);
        let spread = (rng.gen::<f32>() - 0.5) * 0.4;
        let velocity = Vec3::new(
            (nx + spread) * out_speed,
            tuning.flee_launch_up * (0.8 + rng.gen::<f32>() * 0.4),
            (nz + spread) * out_speed,
        );

        self.state = PersonState::Flee {
            heading: nx.atan2(nz),
            phase: FleePhase::Airborne { velocity, timer: 0.0 },
        };
    }

    /// Advance whichever flee phase the person is in.
    pub fn update_flee(&mut self, dt: f32, tuning: &CrowdTuning, terrain: impl Fn(f32, f32) -> f32) -> FleeEvent {
        let PersonState::Flee { heading, phase } = &mut self.state else {
            return FleeEvent::None;
        };
        let heading = *heading;
        let scale = self.scale;

        match phase {
            FleePhase::Airborne { velocity, timer } => {
                velocity.y -= tuning.flee_gravity * dt;
                self.position += *velocity * dt;
                *timer += dt;
                let spin = *timer * 8.0;
                self.pose = Transform::from_euler(self.position, Vec3::new(spin, heading, spin * 0.7), Vec3::splat(scale));

                let ground = terrain(self.position.x, self.position.z);
                if self.position.y <= ground && velocity.y < 0.0 {
                    self.position.y = ground;
                    *phase = FleePhase::LFold { timer: 0.0 };
                    return FleeEvent::Landed;
                }
                FleeEvent::None
            }
            FleePhase::LFold { timer } => {
                *timer += dt;
                let t = (*timer / tuning.lfold_duration).min(1.0);
                self.pose = Transform::from_euler(
                    self.position,
                    Vec3::new(-FRAC_PI_2 - t * 1.1, heading, 0.0),
                    Vec3::new(scale, scale * (1.0 - t * 0.4), scale),
                );
                if t >= 1.0 {
                    *phase = FleePhase::Crumble { timer: 0.0 };
                    return FleeEvent::Crumbled;
                }
                FleeEvent::None
            }
            FleePhase::Crumble { timer } => {
                *timer += dt;
                let t = (*timer / tuning.crumble_duration).min(1.0);
                self.pose = Transform::from_euler(
                    self.position,
                    Vec3::new(-FRAC_PI_2 - 1.1, heading, 0.0),
                    Vec3::splat(scale * (1.0 - t)),
                );
                if t >= 1.0 {
                    self.die();
                    return FleeEvent::Died;
                }
                FleeEvent::None
            }
        }
    }

    fn stand(&mut self) {
        self.pose = Transform::from_yaw(self.position, self.heading, self.scale);
    }
}

fn random_between(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    min + rng.gen::<f32>() * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat(_: f32, _: f32) -> f32 {
        1.0
    }

    fn person_at(x: f32, z: f32) -> Person {
        Person::new(Vec3::new(x, 1.0, z), 0.0, 1.0, 1.0, Tint::GREY, PersonState::Wander)
    }

    #[test]
    fn underwater_timer_resets_on_surfacing() {
        let tuning = CrowdTuning::default();
        let mut p = person_at(0.0, 0.0);
        assert!(!p.check_drowning(6.0, -1.0, &tuning));
        assert!(!p.check_drowning(1.0, 0.5, &tuning));
        assert_eq!(p.underwater_timer, 0.0);
        assert!(!p.check_drowning(9.0, -1.0, &tuning));
        assert!(p.check_drowning(1.0, -1.0, &tuning));
    }

    #[test]
    fn launch_at_origin_has_finite_velocity() {
        let tuning = CrowdTuning::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut p = person_at(0.0, 0.0);
        p.launch(0.0, 0.0, &tuning, &mut rng);
        let PersonState::Flee { heading, phase: FleePhase::Airborne { velocity, .. } } = p.state else {
            panic!("not airborne: {:?}", p.state);
        };
        assert!(heading.is_finite());
        assert!(velocity.is_finite());
        assert!(velocity.y >= 44.0 && velocity.y <= 66.0);
    }

    #[test]
    fn closer_people_fly_further() {
        let tuning = CrowdTuning::default();
        let horizontal = |x: f32| {
            let mut rng = StdRng::seed_from_u64(3);
            let mut p = person_at(x, 0.0);
            p.launch(0.0, 0.0, &tuning, &mut rng);
            match p.state {
                PersonState::Flee { phase: FleePhase::Airborne { velocity, .. }, .. } => velocity.x.abs(),
                _ => unreachable!(),
            }
        };
        assert!(horizontal(5.0) > horizontal(45.0));
    }

    #[test]
    fn flee_runs_through_phases_in_order() {
        let tuning = CrowdTuning::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut p = person_at(10.0, 0.0);
        p.launch(0.0, 0.0, &tuning, &mut rng);

        let mut events = Vec::new();
        for _ in 0..2000 {
            match p.update_flee(1.0 / 64.0, &tuning, flat) {
                FleeEvent::None => {}
                e => events.push(e),
            }
            if p.is_dead() {
                break;
            }
        }
        assert_eq!(events, vec![FleeEvent::Landed, FleeEvent::Crumbled, FleeEvent::Died]);
        assert_eq!(p.position.y, 1.0);
        assert!(p.position.x > 10.0);
        assert!(p.pose.is_hidden());
    }

    #[test]
    fn wanderer_turns_back_at_roam_edge() {
        let tuning = CrowdTuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = person_at(0.0, 99.9);
        p.wander_interval = 100.0;
        p.update_wander(1.0, 100.0, &tuning, &mut rng, flat);
        assert!(p.position.z < 99.9);
        assert!((p.heading - PI).abs() < 1e-6);
    }

    #[test]
    fn wanderer_avoids_water() {
        let tuning = CrowdTuning::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = person_at(0.0, 0.0);
        p.wander_interval = 100.0;
        let lake = |_: f32, z: f32| if z > 0.5 { -2.0 } else { 1.0 };
        p.update_wander(1.0, 500.0, &tuning, &mut rng, lake);
        assert_eq!(p.position.z, 0.0);
        assert_eq!(p.position.y, 1.0);
        assert!((p.heading - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn idle_resumes_wandering() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut p = person_at(0.0, 0.0);
        p.state = PersonState::Idle;
        p.idle_timer = 0.5;
        p.update_idle(0.25, &mut rng);
        assert_eq!(p.state, PersonState::Idle);
        p.update_idle(0.25, &mut rng);
        assert_eq!(p.state, PersonState::Wander);
    }

    #[test]
    fn drowning_dies_after_animation() {
        let tuning = CrowdTuning::default();
        let mut p = person_at(0.0, 0.0);
        p.start_drowning(Vec3::new(0.0, -0.5, 0.0));
        for _ in 0..191 {
            assert!(!p.update_drowning(1.0 / 64.0, 0.0, 0, &tuning));
        }
        assert!(p.update_drowning(1.0 / 64.0, 0.0, 0, &tuning));
        assert!(p.is_dead());
    }

    #[test]
    fn random_people_are_in_range() {
        let tuning = CrowdTuning::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..50 {
            let p = Person::random(Vec3::ZERO, &tuning, &mut rng);
            assert!(p.scale >= 0.8 && p.scale <= 1.2);
            assert!(p.speed >= 0.6 && p.speed <= 1.4);
            assert!(p.wander_interval >= 3.0 && p.wander_interval <= 8.0);
            assert!(matches!(p.state, PersonState::Wander | PersonState::Idle));
            assert!(p.lod.banked() <= 0.1);
        }
    }
}
