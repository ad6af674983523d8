//! Time management for the game loop.

use std::time::{Duration, Instant};

/// Longest step the simulation will take in one frame. Stalls (tab switches,
/// debugger breaks) are absorbed here instead of exploding the integrators.
pub const DEFAULT_MAX_FRAME_DELTA: f32 = 0.08;

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time of the last frame.
    last_frame: Instant,
    /// Clamped duration of the last frame, in seconds.
    delta: f32,
    /// Total simulated time, sum of clamped deltas.
    elapsed: f64,
    /// Frame count since start.
    frame_count: u64,
    /// Upper bound applied to every delta.
    max_delta: f32,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self::with_max_delta(DEFAULT_MAX_FRAME_DELTA)
    }

    pub fn with_max_delta(max_delta: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            max_delta: max_delta.max(0.0),
        }
    }

    /// Update timing from the wall clock at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let raw = now - self.last_frame;
        self.last_frame = now;
        self.advance(raw.as_secs_f32());
    }

    /// Advance by an externally supplied delta (headless or fixed-rate drivers).
    /// Negative deltas count as zero.
    pub fn advance(&mut self, raw_delta: f32) {
        self.delta = clamp_delta(raw_delta, self.max_delta);
        if raw_delta > self.max_delta * 4.0 {
            log::debug!("Frame stall of {:.3}s clamped to {:.3}s", raw_delta, self.delta);
        }
        self.elapsed += self.delta as f64;
        self.frame_count += 1;
    }

    /// Get the clamped delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta
    }

    /// Get the clamped delta time as a Duration.
    pub fn delta(&self) -> Duration {
        Duration::from_secs_f32(self.delta)
    }

    /// Get total simulated time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed as f32
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Get the current FPS (averaged over last frame).
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 {
            1.0 / self.delta
        } else {
            0.0
        }
    }
}

/// Clamp a raw frame delta into `[0, max_delta]`.
#[inline]
pub fn clamp_delta(raw_delta: f32, max_delta: f32) -> f32 {
    if raw_delta.is_nan() {
        return 0.0;
    }
    raw_delta.clamp(0.0, max_delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_clamps_stalls() {
        let mut time = Time::new();
        time.advance(1.5);
        assert_eq!(time.delta_seconds(), DEFAULT_MAX_FRAME_DELTA);
        time.advance(0.016);
        assert_eq!(time.delta_seconds(), 0.016);
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn negative_and_nan_deltas_are_zero() {
        assert_eq!(clamp_delta(-0.5, 0.08), 0.0);
        assert_eq!(clamp_delta(f32::NAN, 0.08), 0.0);
    }

    #[test]
    fn elapsed_sums_clamped_deltas() {
        let mut time = Time::with_max_delta(0.1);
        for _ in 0..10 {
            time.advance(0.5);
        }
        assert!((time.elapsed_seconds() - 1.0).abs() < 1e-5);
    }
}
