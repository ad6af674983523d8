//! The crowd: people who wander, chase and ride the otter, drown, or get
//! blasted away by a repel.
//!
//! Far-away people are ticked less often (see [`LodTier`]) with their banked
//! frame time, so their motion adds up the same as if they ran every frame.
//! Anyone chasing or within detection range always runs at full rate.

mod person;
mod rider_stack;

pub use person::*;
pub use rider_stack::*;

use std::fmt;

use engine_core::{LodThresholds, LodTier, TransformRaw, Vec3};
use procgen::HeightFieldCache;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{CrowdTuning, DebrisTuning};
use crate::debris::DebrisPool;

/// Number of people in each state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrowdCounts {
    pub wander: usize,
    pub idle: usize,
    pub chase: usize,
    pub riding: usize,
    pub drowning: usize,
    pub dead: usize,
    pub flee: usize,
}

impl CrowdCounts {
    pub fn get(&self, kind: PersonStateKind) -> usize {
        match kind {
            PersonStateKind::Wander => self.wander,
            PersonStateKind::Idle => self.idle,
            PersonStateKind::Chase => self.chase,
            PersonStateKind::Riding => self.riding,
            PersonStateKind::Drowning => self.drowning,
            PersonStateKind::Dead => self.dead,
            PersonStateKind::Flee => self.flee,
        }
    }

    pub fn alive(&self) -> usize {
        self.total() - self.dead
    }

    pub fn total(&self) -> usize {
        self.wander + self.idle + self.chase + self.riding + self.drowning + self.dead + self.flee
    }
}

impl fmt::Display for CrowdCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wander {} idle {} chase {} riding {} flee {} drowning {} dead {}",
            self.wander, self.idle, self.chase, self.riding, self.flee, self.drowning, self.dead
        )
    }
}

pub struct Crowd {
    tuning: CrowdTuning,
    lod: LodThresholds,
    /// Wanderers stay inside this radius of the world centre.
    roam_radius: f32,
    /// Half extent of the square people spawn in.
    spawn_extent: f32,
    people: Vec<Person>,
    riders: RiderStack,
    debris: DebrisPool,
    rng: StdRng,
}

impl Crowd {
    /// An empty crowd for a world of the given half extent.
    pub fn new(tuning: CrowdTuning, debris: DebrisTuning, half_world: f32, seed: u64) -> Self {
        Self {
            lod: tuning.lod_thresholds(),
            roam_radius: half_world * tuning.wander_radius_fraction,
            spawn_extent: half_world * tuning.spawn_extent_fraction,
            tuning,
            people: Vec::new(),
            riders: RiderStack::new(),
            debris: DebrisPool::new(debris),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Scatter up to `person_count` people over dry, not-too-surreal ground.
    /// Gives up after five attempts per person. Returns how many were placed.
    pub fn spawn(&mut self, heights: &HeightFieldCache) -> usize {
        let t = &self.tuning;
        let wanted = t.person_count;
        let mut placed = 0;
        for _ in 0..wanted * 5 {
            if placed >= wanted {
                break;
            }
            let x = (self.rng.gen::<f32>() - 0.5) * self.spawn_extent * 2.0;
            let z = (self.rng.gen::<f32>() - 0.5) * self.spawn_extent * 2.0;
            if heights.surreal_factor_at(x, z) > t.spawn_max_surreal {
                continue;
            }
            let h = heights.cached_height_at(x, z);
            if h < t.spawn_min_height || h > t.spawn_max_height {
                continue;
            }
            self.people.push(Person::random(Vec3::new(x, h, z), t, &mut self.rng));
            placed += 1;
        }
        log::info!("Spawned {} of {} people", placed, wanted);
        placed
    }

    /// Add a specific person. Returns their index.
    pub fn push_person(&mut self, person: Person) -> usize {
        self.people.push(person);
        self.people.len() - 1
    }

    pub fn update(
        &mut self,
        dt: f32,
        time: f32,
        otter_pos: Vec3,
        otter_heading: f32,
        terrain: impl Fn(f32, f32) -> f32,
    ) {
        let detect_sq = self.tuning.detect_range * self.tuning.detect_range;
        let mount_sq = self.tuning.mount_range * self.tuning.mount_range;

        for i in 0..self.people.len() {
            let t = &self.tuning;
            let p = &mut self.people[i];

            match p.state {
                PersonState::Dead => continue,
                PersonState::Drowning { anchor, .. } => {
                    let dist_sq = horizontal_dist_sq(otter_pos, anchor);
                    let tier = LodTier::from_distance_sq(dist_sq, &self.lod);
                    let Some(step) = p.lod.tick(dt, tier, t.max_lod_step) else {
                        continue;
                    };
                    if p.update_drowning(step, time, i, t) {
                        log::debug!("Person {} drowned", i);
                    }
                    continue;
                }
                PersonState::Riding { slot } => {
                    p.update_riding(time, otter_pos, otter_heading, t);
                    let ride_y = p.riding_height(otter_pos.y, slot, t);
                    if p.check_drowning(dt, ride_y, t) {
                        p.start_drowning(Vec3::new(otter_pos.x, ride_y, otter_pos.z));
                        log::debug!("Rider {} slipped off and is drowning", i);
                        self.riders.remove(i);
                        // Riders later in this pass must see their new slots.
                        self.sync_rider_slots();
                    }
                    continue;
                }
                _ => {}
            }

            let dx = otter_pos.x - p.position.x;
            let dz = otter_pos.z - p.position.z;
            let dist_sq = dx * dx + dz * dz;

            let tier = if p.state == PersonState::Chase || dist_sq <= detect_sq {
                LodTier::Full
            } else {
                LodTier::from_distance_sq(dist_sq, &self.lod)
            };
            let Some(step) = p.lod.tick(dt, tier, t.max_lod_step) else {
                continue;
            };

            if p.check_drowning(step, p.position.y, t) {
                p.start_drowning(p.position);
                log::debug!("Person {} is drowning", i);
                continue;
            }

            if let PersonState::Flee { .. } = p.state {
                if p.update_flee(step, t, &terrain) == FleeEvent::Crumbled {
                    self.debris
                        .spawn_burst(p.position, p.tint, t.debris_per_person, &mut self.rng);
                }
                continue;
            }

            if p.state != PersonState::Chase && dist_sq < detect_sq {
                p.state = PersonState::Chase;
            }

            match p.state {
                PersonState::Chase if dist_sq < mount_sq => {
                    let slot = self.riders.push(i);
                    p.state = PersonState::Riding { slot };
                    p.update_riding(time, otter_pos, otter_heading, t);
                    log::debug!("Person {} mounted the otter in slot {}", i, slot);
                }
                PersonState::Chase => p.update_chase(step, dx, dz, t, &terrain),
                PersonState::Wander => p.update_wander(step, self.roam_radius, t, &mut self.rng, &terrain),
                _ => p.update_idle(step, &mut self.rng),
            }
        }

        self.debris.update(dt, &terrain);
    }

    /// Blast everyone within the flee radius of `(origin_x, origin_z)` into
    /// the air. Riders are knocked off first, top down, and launched from
    /// beside the origin. Returns how many people were launched.
    pub fn repel_all(&mut self, origin_x: f32, origin_z: f32, terrain: impl Fn(f32, f32) -> f32) -> usize {
        let t = &self.tuning;
        let mut launched = 0;

        while let Some(idx) = self.riders.pop() {
            let p = &mut self.people[idx];
            p.position.x = origin_x + (self.rng.gen::<f32>() - 0.5) * 2.0;
            p.position.z = origin_z + (self.rng.gen::<f32>() - 0.5) * 2.0;
            p.position.y = terrain(p.position.x, p.position.z);
            p.launch(origin_x, origin_z, t, &mut self.rng);
            launched += 1;
        }

        let radius_sq = t.flee_radius * t.flee_radius;
        for p in self.people.iter_mut() {
            if p.state.ignores_repel() {
                continue;
            }
            let dx = p.position.x - origin_x;
            let dz = p.position.z - origin_z;
            if dx * dx + dz * dz > radius_sq {
                continue;
            }
            p.launch(origin_x, origin_z, t, &mut self.rng);
            launched += 1;
        }

        log::debug!("Repel at ({:.1}, {:.1}) launched {} people", origin_x, origin_z, launched);
        launched
    }

    /// Renumber riders after a removal so slots stay contiguous.
    fn sync_rider_slots(&mut self) {
        for (slot, idx) in self.riders.iter() {
            self.people[idx].state = PersonState::Riding { slot };
        }
    }

    pub fn counts(&self) -> CrowdCounts {
        let mut c = CrowdCounts::default();
        for p in &self.people {
            let n = match p.state.kind() {
                PersonStateKind::Wander => &mut c.wander,
                PersonStateKind::Idle => &mut c.idle,
                PersonStateKind::Chase => &mut c.chase,
                PersonStateKind::Riding => &mut c.riding,
                PersonStateKind::Drowning => &mut c.drowning,
                PersonStateKind::Dead => &mut c.dead,
                PersonStateKind::Flee => &mut c.flee,
            };
            *n += 1;
        }
        c
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn person(&self, index: usize) -> Option<&Person> {
        self.people.get(index)
    }

    pub fn person_mut(&mut self, index: usize) -> Option<&mut Person> {
        self.people.get_mut(index)
    }

    pub fn riders(&self) -> &RiderStack {
        &self.riders
    }

    pub fn debris(&self) -> &DebrisPool {
        &self.debris
    }

    pub fn tuning(&self) -> &CrowdTuning {
        &self.tuning
    }

    /// Instance matrices, one per person.
    pub fn instance_data(&self) -> Vec<TransformRaw> {
        self.people.iter().map(|p| TransformRaw::from(&p.pose)).collect()
    }

    /// Instance colours, one per person.
    pub fn instance_tints(&self) -> Vec<[f32; 4]> {
        self.people.iter().map(|p| p.tint.to_array()).collect()
    }
}

fn horizontal_dist_sq(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}
