//! Small per-agent components shared across simulations.

/// Age-based lifetime for short-lived things (debris, rockets).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lifetime {
    pub age: f32,
    pub max: f32,
}

impl Lifetime {
    pub fn new(max: f32) -> Self {
        Self { age: 0.0, max }
    }

    /// Age by `dt`. Returns true once the lifetime is used up.
    pub fn update(&mut self, dt: f32) -> bool {
        self.age += dt;
        self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.max
    }

    /// Normalized age in [0, 1].
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 1.0;
        }
        (self.age / self.max).clamp(0.0, 1.0)
    }
}

/// Distance bands (world units) separating LOD tick tiers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LodThresholds {
    pub near: f32,
    pub mid: f32,
    pub far: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self {
            near: 70.0,
            mid: 160.0,
            far: 320.0,
        }
    }
}

/// How often an agent's logic runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LodTier {
    /// Every frame.
    #[default]
    Full,
    /// 30 Hz.
    Near,
    /// 12 Hz.
    Mid,
    /// 4 Hz.
    Far,
}

impl LodTier {
    /// Pick a tier from squared distance to the player.
    pub fn from_distance_sq(dist_sq: f32, thresholds: &LodThresholds) -> Self {
        if dist_sq > thresholds.far * thresholds.far {
            LodTier::Far
        } else if dist_sq > thresholds.mid * thresholds.mid {
            LodTier::Mid
        } else if dist_sq > thresholds.near * thresholds.near {
            LodTier::Near
        } else {
            LodTier::Full
        }
    }

    /// Seconds between logic ticks; zero means every frame.
    pub fn interval(self) -> f32 {
        match self {
            LodTier::Full => 0.0,
            LodTier::Near => 1.0 / 30.0,
            LodTier::Mid => 1.0 / 12.0,
            LodTier::Far => 0.25,
        }
    }
}

/// Banks frame time for a decimated agent and releases it in one step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickAccumulator {
    banked: f32,
}

impl TickAccumulator {
    /// Start with some time already banked so a crowd does not tick in lockstep.
    pub fn with_offset(offset: f32) -> Self {
        Self { banked: offset.max(0.0) }
    }

    /// Returns the step to simulate this frame, or `None` to skip.
    /// Released steps are capped at `max_step`.
    pub fn tick(&mut self, dt: f32, tier: LodTier, max_step: f32) -> Option<f32> {
        let interval = tier.interval();
        if interval <= 0.0 {
            return Some(dt);
        }
        self.banked += dt;
        if self.banked < interval {
            return None;
        }
        let step = self.banked.min(max_step);
        self.banked = 0.0;
        Some(step)
    }

    pub fn banked(&self) -> f32 {
        self.banked
    }
}
