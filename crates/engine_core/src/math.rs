//! Scalar helpers shared by terrain shaping and agent motion.
//!
//! The damping helpers move a value a fraction `1 - e^(-λ·dt)` of the way to its
//! target per step, so a sequence of small steps lands where one large step
//! would.

use std::f32::consts::{PI, TAU};

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    (v - a) / (b - a)
}

/// Hermite ramp from 0 at `edge0` to 1 at `edge1`.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = clamp01((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

/// Fraction of the remaining distance covered in `dt` at snappiness `lambda`.
#[inline]
pub fn exp_damp_factor(lambda: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-lambda * dt).exp()
}

#[inline]
pub fn damp(a: f32, b: f32, lambda: f32, dt: f32) -> f32 {
    lerp(a, b, exp_damp_factor(lambda, dt))
}

/// Smallest signed difference `b - a`, wrapped to [-π, π].
pub fn angle_diff(a: f32, b: f32) -> f32 {
    let d = (b - a).rem_euclid(TAU);
    if d > PI {
        d - TAU
    } else {
        d
    }
}

/// Damp an angle along the shorter arc.
#[inline]
pub fn damp_angle(a: f32, b: f32, lambda: f32, dt: f32) -> f32 {
    a + angle_diff(a, b) * exp_damp_factor(lambda, dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_edges() {
        assert_eq!(smoothstep(20.0, 60.0, 0.0), 0.0);
        assert_eq!(smoothstep(20.0, 60.0, 20.0), 0.0);
        assert_eq!(smoothstep(20.0, 60.0, 60.0), 1.0);
        assert_eq!(smoothstep(20.0, 60.0, 500.0), 1.0);
        assert!((smoothstep(20.0, 60.0, 40.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn damp_is_frame_rate_independent() {
        let mut coarse = 0.0;
        coarse = damp(coarse, 10.0, 6.0, 0.1);
        let mut fine = 0.0;
        for _ in 0..10 {
            fine = damp(fine, 10.0, 6.0, 0.01);
        }
        assert!((coarse - fine).abs() < 1e-4, "{coarse} vs {fine}");
    }

    #[test]
    fn damp_zero_dt_holds() {
        assert_eq!(damp(3.0, 9.0, 14.0, 0.0), 3.0);
    }

    #[test]
    fn angle_diff_takes_short_way() {
        let d = angle_diff(3.0, -3.0);
        assert!(d > 0.0 && d < 0.3, "{d}");
        let d = angle_diff(-3.0, 3.0);
        assert!(d < 0.0 && d > -0.3, "{d}");
        assert!((angle_diff(0.0, PI / 2.0) - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn angle_diff_stays_in_range() {
        for i in -20..20 {
            let b = i as f32 * 0.9;
            let d = angle_diff(0.4, b);
            assert!((-PI..=PI).contains(&d), "{b} -> {d}");
        }
    }
}
