//! Fractal simplex noise shared by every terrain layer.

use noise::{NoiseFn, Simplex};

/// Derive a deterministic u32 noise seed from a world seed and an offset.
/// Same (seed, offset) always gives the same result so terrain is reproducible.
#[inline]
pub fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// Octave stack parameters for one noise layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctaveParams {
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Base frequency (lower = smoother).
    pub scale: f64,
}

impl OctaveParams {
    pub const fn new(octaves: u32, persistence: f64, lacunarity: f64, scale: f64) -> Self {
        Self {
            octaves,
            persistence,
            lacunarity,
            scale,
        }
    }
}

/// Pure 2D noise: the same `(x, z)` always yields the same bits.
#[derive(Debug, Clone)]
pub struct NoiseField {
    simplex: Simplex,
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        Self {
            simplex: Simplex::new(deterministic_noise_seed(seed, 0)),
        }
    }

    /// Normalized fractal sum in [-1, 1].
    pub fn octave(&self, x: f64, z: f64, params: OctaveParams) -> f64 {
        let mut value = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = params.scale;
        let mut max_value = 0.0;

        for _ in 0..params.octaves {
            value += self.simplex.get([x * frequency, z * frequency]) * amplitude;
            max_value += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }

        if max_value > 0.0 {
            value / max_value
        } else {
            0.0
        }
    }

    /// Ridge-line noise: 1 at the zero crossings of a 3-octave stack.
    pub fn ridged(&self, x: f64, z: f64, scale: f64) -> f64 {
        1.0 - self
            .octave(x, z, OctaveParams::new(3, 0.5, 2.0, scale))
            .abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: OctaveParams = OctaveParams::new(4, 0.5, 2.0, 0.006);

    #[test]
    fn octave_is_pure() {
        let field = NoiseField::new(7);
        let a = field.octave(123.5, -987.25, BASE);
        let b = field.octave(123.5, -987.25, BASE);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn octave_stays_normalized() {
        let field = NoiseField::new(42);
        for i in 0..200 {
            let x = i as f64 * 17.3 - 1500.0;
            let z = i as f64 * -9.1 + 300.0;
            let v = field.octave(x, z, BASE);
            // Simplex output is nominally [-1, 1]; leave a little headroom.
            assert!(v.abs() <= 1.1, "octave({x}, {z}) = {v}");
        }
    }

    #[test]
    fn ridged_peaks_at_one() {
        let field = NoiseField::new(3);
        for i in 0..100 {
            let v = field.ridged(i as f64 * 31.0, i as f64 * 11.0, 0.003);
            assert!(v <= 1.0 && v >= -0.1, "{v}");
        }
    }

    #[test]
    fn zero_octaves_is_flat() {
        let field = NoiseField::new(1);
        assert_eq!(field.octave(5.0, 5.0, OctaveParams::new(0, 0.5, 2.0, 0.01)), 0.0);
    }

    #[test]
    fn seeds_differ() {
        assert_ne!(deterministic_noise_seed(1, 0), deterministic_noise_seed(2, 0));
        let a = NoiseField::new(11111).octave(40.0, 80.0, BASE);
        let b = NoiseField::new(22222).octave(40.0, 80.0, BASE);
        assert_ne!(a, b);
    }
}
