//! One play session: progressive terrain loading, then the per-frame driver
//! that ticks the otter, rockets, chunk window and crowd in a fixed order.

use engine_core::{clamp_delta, Vec2};
use procgen::{ChunkStreamer, WorldBorder};

use crate::config::GameConfig;
use crate::crowd::Crowd;
use crate::otter::{OtterController, OtterInput, OtterState};
use crate::rockets::RocketPool;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Terrain chunks are still being generated.
    Loading,
    Playing,
}

/// Decoded player input for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub move_dir: Vec2,
    pub want_fly: bool,
    pub want_descend: bool,
    pub camera_yaw: f32,
    pub fire_rocket: bool,
    pub repel: bool,
}

impl FrameInput {
    pub fn otter_input(&self) -> OtterInput {
        OtterInput {
            move_dir: self.move_dir,
            want_fly: self.want_fly,
            want_descend: self.want_descend,
            camera_yaw: self.camera_yaw,
        }
    }
}

pub struct Session {
    config: GameConfig,
    phase: SessionPhase,
    streamer: ChunkStreamer,
    otter: OtterController,
    crowd: Crowd,
    rockets: RocketPool,
}

impl Session {
    /// Start a session. A config that fails validation is replaced by the
    /// defaults.
    pub fn new(config: GameConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Rejected session config: {}, using defaults", e);
                GameConfig::default()
            }
        };
        let terrain = config.terrain_config();
        let half_world = terrain.half_world();
        let streamer = ChunkStreamer::new(terrain, config.world.view_distance);
        let heights = streamer.heights();
        let otter = OtterController::new(
            config.otter.clone(),
            WorldBorder::for_half_world(half_world),
            |x, z| heights.cached_height_at(x, z),
        );
        let crowd = Crowd::new(config.crowd.clone(), config.debris.clone(), half_world, config.seed);
        let rockets = RocketPool::new(config.rockets.clone());
        log::info!(
            "New session: seed {}, {} chunks to generate",
            config.seed,
            streamer.total_chunks()
        );

        Self {
            config,
            phase: SessionPhase::Loading,
            streamer,
            otter,
            crowd,
            rockets,
        }
    }

    /// Generate the next batch of terrain. When the last batch lands the crowd
    /// is spawned and play begins.
    pub fn load_step(&mut self) -> SessionPhase {
        if self.phase == SessionPhase::Loading && self.streamer.generate_batch(self.config.load_batch_size) {
            self.crowd.spawn(self.streamer.heights());
            let focus = self.otter.position();
            self.streamer.update_visibility(focus.x, focus.z);
            self.phase = SessionPhase::Playing;
            log::info!("World ready: {} people, {} chunks visible", self.crowd.len(), self.streamer.visible_count());
        }
        self.phase
    }

    /// Advance one frame. `raw_dt` is clamped to the configured maximum;
    /// `time` drives the sway and flail animations. Does nothing while loading.
    pub fn step(&mut self, raw_dt: f32, time: f32, input: &FrameInput) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        let dt = clamp_delta(raw_dt, self.config.max_frame_delta);
        let heights = self.streamer.heights();
        let terrain = |x: f32, z: f32| heights.cached_height_at(x, z);

        self.otter.update(dt, &input.otter_input(), terrain);
        let controllable = !self.otter.state().is_incapacitated();
        let otter_pos = self.otter.position();

        if input.fire_rocket && controllable {
            self.rockets.shoot(otter_pos, self.otter.heading(), 0.0);
        }
        self.rockets.update(dt);

        if input.repel && controllable {
            self.crowd.repel_all(otter_pos.x, otter_pos.z, terrain);
        }

        self.streamer.update_visibility(otter_pos.x, otter_pos.z);
        let heights = self.streamer.heights();
        self.crowd.update(dt, time, otter_pos, self.otter.heading(), |x, z| {
            heights.cached_height_at(x, z)
        });
    }

    /// Start the otter's fatal fall (out of bounds, scripted hazards).
    pub fn trigger_fall(&mut self) {
        self.otter.trigger_fall();
    }

    pub fn respawn(&mut self) {
        let heights = self.streamer.heights();
        self.otter.respawn(|x, z| heights.cached_height_at(x, z));
    }

    pub fn is_game_over(&self) -> bool {
        self.otter.state() == OtterState::GameOver
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Terrain loading progress in [0, 1].
    pub fn progress(&self) -> f32 {
        self.streamer.progress()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn otter(&self) -> &OtterController {
        &self.otter
    }

    pub fn crowd(&self) -> &Crowd {
        &self.crowd
    }

    pub fn crowd_mut(&mut self) -> &mut Crowd {
        &mut self.crowd
    }

    pub fn rockets(&self) -> &RocketPool {
        &self.rockets
    }

    pub fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }
}
