//! Circular playable border (the cactus ring).

/// Ring of cacti that keeps the player inside the playable disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBorder {
    /// Centre line of the ring.
    pub ring_radius: f32,
    /// Radial thickness of the ring.
    pub width: f32,
}

impl WorldBorder {
    pub const RING_FRACTION: f32 = 0.92;
    pub const DEFAULT_WIDTH: f32 = 15.0;

    /// Border sized for a world with the given half-extent.
    pub fn for_half_world(half_world: f32) -> Self {
        Self {
            ring_radius: half_world * Self::RING_FRACTION,
            width: Self::DEFAULT_WIDTH,
        }
    }

    /// Outer edge of the ring; beyond this the player is bounced back.
    pub fn border_radius(&self) -> f32 {
        self.ring_radius + self.width * 0.5
    }

    pub fn is_outside_border(&self, x: f32, z: f32) -> bool {
        let r = self.border_radius();
        x * x + z * z > r * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_includes_half_width() {
        let border = WorldBorder::for_half_world(1024.0);
        assert!((border.border_radius() - (1024.0 * 0.92 + 7.5)).abs() < 1e-3);
    }

    #[test]
    fn outside_test_is_radial() {
        let border = WorldBorder::for_half_world(1024.0);
        let r = border.border_radius();
        assert!(!border.is_outside_border(0.0, 0.0));
        assert!(!border.is_outside_border(r - 1.0, 0.0));
        assert!(border.is_outside_border(r + 1.0, 0.0));
        let d = (r + 1.0) / 2f32.sqrt();
        assert!(border.is_outside_border(-d, d));
    }
}
