//! Analytic terrain height field and per-chunk height grids.
//!
//! **Seed-based determinism:** all noise is derived from `config.seed`, so the
//! same seed produces the same height at every (world_x, world_z) regardless of
//! chunk load order. Neighbouring grids sample identical world coordinates along
//! their shared edge, so there are no seams.

use engine_core::smoothstep;

use crate::noise_field::{NoiseField, OctaveParams};

/// Integer chunk coordinate. Chunk `(x, z)` is centred on `(x, z) * chunk_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance in chunks.
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Configuration for terrain generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainConfig {
    /// Edge length of the square world.
    pub world_size: f32,
    /// Edge length of one chunk.
    pub chunk_size: f32,
    /// Height segments per chunk edge; a grid stores (segments + 1)² samples.
    pub segments: usize,
    /// Maximum height of unamplified terrain.
    pub max_height: f32,
    /// Seed for noise generation.
    pub seed: u64,
    /// Low-frequency rolling hills.
    pub base: OctaveParams,
    /// Higher-frequency bumps.
    pub detail: OctaveParams,
    /// Coordinate shift decorrelating the detail layer from the base.
    pub detail_offset: f64,
    /// Weight of the base layer; detail gets the remainder.
    pub base_weight: f64,
    /// Fully flat inside this radius around the origin.
    pub spawn_flat_radius: f32,
    /// Full height from this radius outwards.
    pub spawn_ramp_radius: f32,
    /// Normalized radial distance where the surreal band starts.
    pub surreal_start: f32,
    /// Normalized radial distance where the surreal band is complete.
    pub surreal_end: f32,
    /// Extra height multiplier at full surreal factor.
    pub surreal_amplify: f32,
    /// Sea level (world Y).
    pub water_level: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            world_size: 2048.0,
            chunk_size: 64.0,
            segments: 32,
            max_height: 30.0,
            seed: 0,
            base: OctaveParams::new(4, 0.5, 2.0, 0.006),
            detail: OctaveParams::new(2, 0.4, 2.5, 0.02),
            detail_offset: 1000.0,
            base_weight: 0.8,
            spawn_flat_radius: 20.0,
            spawn_ramp_radius: 60.0,
            surreal_start: 0.4,
            surreal_end: 0.9,
            surreal_amplify: 1.5,
            water_level: 0.0,
        }
    }
}

impl TerrainConfig {
    pub fn half_world(&self) -> f32 {
        self.world_size * 0.5
    }

    /// Chunks along one edge of the world grid.
    pub fn chunks_per_side(&self) -> i32 {
        (self.world_size / self.chunk_size).ceil() as i32
    }

    /// Chunk owning world position `(x, z)`.
    pub fn chunk_coord_of(&self, x: f32, z: f32) -> ChunkCoord {
        let half = self.chunk_size * 0.5;
        ChunkCoord::new(
            ((x + half) / self.chunk_size).floor() as i32,
            ((z + half) / self.chunk_size).floor() as i32,
        )
    }

    /// World-space centre of a chunk.
    pub fn chunk_center(&self, coord: ChunkCoord) -> (f32, f32) {
        (
            coord.x as f32 * self.chunk_size,
            coord.z as f32 * self.chunk_size,
        )
    }

    /// Distance between neighbouring samples in a grid.
    pub fn sample_spacing(&self) -> f32 {
        self.chunk_size / self.segments as f32
    }
}

/// The analytic height field. Expensive; used to fill grids and as the cold-cache fallback.
#[derive(Debug, Clone)]
pub struct TerrainField {
    config: TerrainConfig,
    noise: NoiseField,
}

impl TerrainField {
    pub fn new(config: TerrainConfig) -> Self {
        let noise = NoiseField::new(config.seed);
        Self { config, noise }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Full-precision height at a world position.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let cfg = &self.config;
        let (xd, zd) = (x as f64, z as f64);
        let base = self.noise.octave(xd, zd, cfg.base);
        let detail = self.noise.octave(
            xd + cfg.detail_offset,
            zd + cfg.detail_offset,
            cfg.detail,
        );
        let mut h = ((base * cfg.base_weight + detail * (1.0 - cfg.base_weight)) as f32)
            * cfg.max_height;

        // Flat spawn meadow around the origin
        let dist = (x * x + z * z).sqrt();
        h *= smoothstep(cfg.spawn_flat_radius, cfg.spawn_ramp_radius, dist);

        // Dramatic relief towards the world edge
        h *= 1.0 + self.surreal_factor_at(x, z) * cfg.surreal_amplify;
        h
    }

    /// 0 in the realistic interior, rising to 1 in the fantastical edge band.
    pub fn surreal_factor_at(&self, x: f32, z: f32) -> f32 {
        let half = self.config.half_world();
        let dx = x / half;
        let dz = z / half;
        smoothstep(
            self.config.surreal_start,
            self.config.surreal_end,
            (dx * dx + dz * dz).sqrt(),
        )
    }

    /// Sample a full grid for one chunk.
    pub fn generate_grid(&self, coord: ChunkCoord) -> HeightGrid {
        let n = self.config.segments;
        let row = n + 1;
        let step = self.config.sample_spacing();
        let half = self.config.chunk_size * 0.5;
        let (ox, oz) = self.config.chunk_center(coord);

        let mut heights = Vec::with_capacity(row * row);
        for iz in 0..row {
            let wz = oz + (iz as f32 * step - half);
            for ix in 0..row {
                let wx = ox + (ix as f32 * step - half);
                heights.push(self.height_at(wx, wz));
            }
        }

        HeightGrid {
            coord,
            segments: n,
            heights: heights.into_boxed_slice(),
        }
    }

    /// World position of grid sample `(ix, iz)` in chunk `coord`.
    pub fn sample_position(&self, coord: ChunkCoord, ix: usize, iz: usize) -> (f32, f32) {
        let step = self.config.sample_spacing();
        let half = self.config.chunk_size * 0.5;
        let (ox, oz) = self.config.chunk_center(coord);
        (
            ox + (ix as f32 * step - half),
            oz + (iz as f32 * step - half),
        )
    }
}

/// Row-major (segments + 1)² height samples for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    coord: ChunkCoord,
    segments: usize,
    heights: Box<[f32]>,
}

impl HeightGrid {
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn segments(&self) -> usize {
        self.segments
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Stored sample at grid index `(ix, iz)`.
    pub fn get(&self, ix: usize, iz: usize) -> f32 {
        self.heights[iz * (self.segments + 1) + ix]
    }

    /// Bilinear interpolation at chunk-local normalized coordinates in [0, 1].
    pub fn interpolate(&self, u: f32, v: f32) -> f32 {
        let n = self.segments;
        let fx = u * n as f32;
        let fz = v * n as f32;

        let x0 = (fx.floor().max(0.0) as usize).min(n - 1);
        let z0 = (fz.floor().max(0.0) as usize).min(n - 1);
        let tx = (fx - x0 as f32).clamp(0.0, 1.0);
        let tz = (fz - z0 as f32).clamp(0.0, 1.0);

        let h00 = self.get(x0, z0);
        let h10 = self.get(x0 + 1, z0);
        let h01 = self.get(x0, z0 + 1);
        let h11 = self.get(x0 + 1, z0 + 1);

        // Weighted form keeps exact samples at t = 0 and t = 1
        let hx0 = h00 * (1.0 - tx) + h10 * tx;
        let hx1 = h01 * (1.0 - tx) + h11 * tx;
        hx0 * (1.0 - tz) + hx1 * tz
    }
}
