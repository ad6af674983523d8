//! Game configuration and gameplay tuning. Loaded from config.ron at startup.
//!
//! Every gameplay constant lives here as a named value. They are tuned by feel,
//! not derived from a physical model, so keep them as data.

use std::path::{Path, PathBuf};

use engine_core::{LodThresholds, DEFAULT_MAX_FRAME_DELTA};
use procgen::{TerrainConfig, DEFAULT_VIEW_DISTANCE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a config file could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config syntax: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// World dimensions and terrain resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldSettings {
    pub world_size: f32,
    pub chunk_size: f32,
    pub height_segments: usize,
    pub max_height: f32,
    pub view_distance: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        let terrain = TerrainConfig::default();
        Self {
            world_size: terrain.world_size,
            chunk_size: terrain.chunk_size,
            height_segments: terrain.segments,
            max_height: terrain.max_height,
            view_distance: DEFAULT_VIEW_DISTANCE,
        }
    }
}

/// Otter locomotion tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OtterTuning {
    pub walk_speed: f32,
    pub fly_speed: f32,
    /// Fly-height climb rate while the fly input is held.
    pub fly_ascend_speed: f32,
    /// Fly-height sink rate while the descend input is held.
    pub fly_descend_speed: f32,
    pub fall_accel: f32,
    pub max_fall_speed: f32,
    /// Seconds of falling before the game is over.
    pub fall_duration: f32,
    /// Heading snappiness.
    pub turn_speed: f32,
    /// Velocity snappiness with input held.
    pub move_damping: f32,
    /// Velocity snappiness with no input.
    pub stop_damping: f32,
    /// Feet hover this far above the terrain.
    pub ground_offset: f32,
    pub ground_follow: f32,
    pub fly_follow: f32,
    /// Fly height gained on take-off.
    pub takeoff_lift: f32,
    /// Flight ends when the fly height sinks within this of the terrain.
    pub landing_margin: f32,
    pub input_deadzone: f32,
    pub bounce_speed: f32,
    /// Bounced players land at this fraction of the border radius.
    pub bounce_safe_fraction: f32,
}

impl Default for OtterTuning {
    fn default() -> Self {
        Self {
            walk_speed: 8.0,
            fly_speed: 30.0,
            fly_ascend_speed: 16.0,
            fly_descend_speed: 12.0,
            fall_accel: 15.0,
            max_fall_speed: 60.0,
            fall_duration: 1.5,
            turn_speed: 8.0,
            move_damping: 14.0,
            stop_damping: 10.0,
            ground_offset: 0.1,
            ground_follow: 18.0,
            fly_follow: 6.0,
            takeoff_lift: 2.0,
            landing_margin: 0.5,
            input_deadzone: 0.01,
            bounce_speed: 15.0,
            bounce_safe_fraction: 0.95,
        }
    }
}

/// People tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrowdTuning {
    pub person_count: usize,
    pub wander_speed: f32,
    pub chase_speed: f32,
    pub detect_range: f32,
    pub mount_range: f32,
    /// Vertical spacing per rider slot, scaled by the rider's size.
    pub stack_height: f32,
    /// Height of the bottom rider above the otter.
    pub ride_offset: f32,
    pub water_level: f32,
    /// Accumulated seconds under water before drowning starts.
    pub drown_time: f32,
    /// Seconds of drowning animation before death.
    pub drowning_duration: f32,
    pub flee_radius: f32,
    pub flee_gravity: f32,
    pub flee_launch_up: f32,
    pub flee_launch_out: f32,
    pub lfold_duration: f32,
    pub crumble_duration: f32,
    pub debris_per_person: usize,
    pub lod_near: f32,
    pub lod_mid: f32,
    pub lod_far: f32,
    /// Longest step a decimated person may take at once.
    pub max_lod_step: f32,
    /// Wanderers turn back beyond this fraction of the half world.
    pub wander_radius_fraction: f32,
    /// Spawn square half-extent as a fraction of the half world.
    pub spawn_extent_fraction: f32,
    pub spawn_max_surreal: f32,
    pub spawn_min_height: f32,
    pub spawn_max_height: f32,
    /// Terrain below this counts as shoreline to wanderers.
    pub shore_height: f32,
    /// Chance to stop and idle at each wander direction change.
    pub idle_chance: f32,
    pub wander_interval_min: f32,
    pub wander_interval_max: f32,
    pub idle_dwell_min: f32,
    pub idle_dwell_max: f32,
}

impl Default for CrowdTuning {
    fn default() -> Self {
        Self {
            person_count: 230,
            wander_speed: 1.0,
            chase_speed: 6.0,
            detect_range: 40.0,
            mount_range: 1.5,
            stack_height: 1.4,
            ride_offset: 0.8,
            water_level: 0.0,
            drown_time: 10.0,
            drowning_duration: 3.0,
            flee_radius: 50.0,
            flee_gravity: 18.0,
            flee_launch_up: 55.0,
            flee_launch_out: 3.0,
            lfold_duration: 0.6,
            crumble_duration: 1.0,
            debris_per_person: 8,
            lod_near: 70.0,
            lod_mid: 160.0,
            lod_far: 320.0,
            max_lod_step: 0.25,
            wander_radius_fraction: 0.65,
            spawn_extent_fraction: 0.7,
            spawn_max_surreal: 0.6,
            spawn_min_height: 1.0,
            spawn_max_height: 20.0,
            shore_height: 0.5,
            idle_chance: 0.35,
            wander_interval_min: 3.0,
            wander_interval_max: 8.0,
            idle_dwell_min: 2.0,
            idle_dwell_max: 7.0,
        }
    }
}

impl CrowdTuning {
    pub fn lod_thresholds(&self) -> LodThresholds {
        LodThresholds {
            near: self.lod_near,
            mid: self.lod_mid,
            far: self.lod_far,
        }
    }
}

/// Debris particle tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebrisTuning {
    pub capacity: usize,
    pub gravity: f32,
    /// Fraction of downward speed returned on a bounce.
    pub restitution: f32,
    /// Fraction of horizontal speed kept on a bounce.
    pub friction: f32,
    pub min_life: f32,
    pub max_life: f32,
    pub size: f32,
}

impl Default for DebrisTuning {
    fn default() -> Self {
        Self {
            capacity: 400,
            gravity: 12.0,
            restitution: 0.3,
            friction: 0.6,
            min_life: 1.5,
            max_life: 2.5,
            size: 0.12,
        }
    }
}

/// Rocket tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RocketTuning {
    pub max_rockets: usize,
    pub speed: f32,
    pub lifetime: f32,
    /// Launch height above the shooter.
    pub muzzle_height: f32,
}

impl Default for RocketTuning {
    fn default() -> Self {
        Self {
            max_rockets: 20,
            speed: 40.0,
            lifetime: 3.0,
            muzzle_height: 0.5,
        }
    }
}

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// World seed for terrain and crowd randomness.
    #[serde(default)]
    pub seed: u64,
    /// Chunks generated per loading frame.
    #[serde(default = "default_load_batch_size")]
    pub load_batch_size: usize,
    /// Frame deltas are clamped to this many seconds.
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f32,
    #[serde(default)]
    pub world: WorldSettings,
    #[serde(default)]
    pub otter: OtterTuning,
    #[serde(default)]
    pub crowd: CrowdTuning,
    #[serde(default)]
    pub debris: DebrisTuning,
    #[serde(default)]
    pub rockets: RocketTuning,
}

fn default_load_batch_size() -> usize {
    4
}
fn default_max_frame_delta() -> f32 {
    DEFAULT_MAX_FRAME_DELTA
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            load_batch_size: default_load_batch_size(),
            max_frame_delta: default_max_frame_delta(),
            world: WorldSettings::default(),
            otter: OtterTuning::default(),
            crowd: CrowdTuning::default(),
            debris: DebrisTuning::default(),
            rockets: RocketTuning::default(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Strict load: read, parse and validate.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&data)
    }

    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(s) => {
                if let Err(e) = std::fs::write(&path, s) {
                    log::warn!("Could not write config to {:?}: {}", path, e);
                }
            }
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }
    }

    /// Terrain parameters derived from the world settings and seed.
    pub fn terrain_config(&self) -> TerrainConfig {
        TerrainConfig {
            world_size: self.world.world_size,
            chunk_size: self.world.chunk_size,
            segments: self.world.height_segments,
            max_height: self.world.max_height,
            seed: self.seed,
            ..Default::default()
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.world_size", self.world.world_size)?;
        positive("world.chunk_size", self.world.chunk_size)?;
        positive("world.view_distance", self.world.view_distance)?;
        if self.world.height_segments == 0 {
            return Err(invalid("world.height_segments", "must be at least 1"));
        }
        if self.load_batch_size == 0 {
            return Err(invalid("load_batch_size", "must be at least 1"));
        }
        positive("max_frame_delta", self.max_frame_delta)?;

        positive("otter.fall_duration", self.otter.fall_duration)?;
        positive("otter.walk_speed", self.otter.walk_speed)?;
        positive("otter.fly_speed", self.otter.fly_speed)?;
        if !(0.0..1.0).contains(&self.otter.bounce_safe_fraction) {
            return Err(invalid("otter.bounce_safe_fraction", "must be in [0, 1)"));
        }

        let c = &self.crowd;
        positive("crowd.drown_time", c.drown_time)?;
        positive("crowd.drowning_duration", c.drowning_duration)?;
        positive("crowd.flee_radius", c.flee_radius)?;
        positive("crowd.lfold_duration", c.lfold_duration)?;
        positive("crowd.crumble_duration", c.crumble_duration)?;
        positive("crowd.max_lod_step", c.max_lod_step)?;
        if !(c.lod_near < c.lod_mid && c.lod_mid < c.lod_far) {
            return Err(invalid("crowd.lod_*", "thresholds must be strictly increasing"));
        }
        if c.wander_interval_min > c.wander_interval_max {
            return Err(invalid("crowd.wander_interval_min", "exceeds the maximum"));
        }
        if c.idle_dwell_min > c.idle_dwell_max {
            return Err(invalid("crowd.idle_dwell_min", "exceeds the maximum"));
        }

        if self.debris.capacity == 0 {
            return Err(invalid("debris.capacity", "must be at least 1"));
        }
        if self.debris.min_life > self.debris.max_life {
            return Err(invalid("debris.min_life", "exceeds the maximum"));
        }
        if self.rockets.max_rockets == 0 {
            return Err(invalid("rockets.max_rockets", "must be at least 1"));
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config = GameConfig::from_ron("(seed: 7, crowd: (person_count: 12))").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.crowd.person_count, 12);
        assert_eq!(config.crowd.drown_time, 10.0);
        assert_eq!(config.load_batch_size, 4);
        assert_eq!(config.debris.capacity, 400);
    }

    #[test]
    fn syntax_errors_are_parse_errors() {
        let err = GameConfig::from_ron("(seed: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn lod_thresholds_must_increase() {
        let err = GameConfig::from_ron("(crowd: (lod_near: 200.0))").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "crowd.lod_*", .. }));
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut config = GameConfig::default();
        config.debris.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips_through_ron() {
        let config = GameConfig {
            seed: 99,
            ..Default::default()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert_eq!(GameConfig::from_ron(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GameConfig::load_from(Path::new("/definitely/not/here/config.ron")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn terrain_config_carries_seed() {
        let config = GameConfig {
            seed: 1234,
            ..Default::default()
        };
        let terrain = config.terrain_config();
        assert_eq!(terrain.seed, 1234);
        assert_eq!(terrain.segments, 32);
    }
}
