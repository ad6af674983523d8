//! Heightfield cache populated as chunks are generated, so runtime systems
//! (player, crowd, debris) can query terrain without recomputing noise.

use std::collections::HashMap;

use crate::terrain::{ChunkCoord, HeightGrid, TerrainField};

/// Generated height grids keyed by chunk, with the analytic field as fallback.
#[derive(Debug)]
pub struct HeightFieldCache {
    field: TerrainField,
    grids: HashMap<ChunkCoord, HeightGrid>,
}

impl HeightFieldCache {
    pub fn new(field: TerrainField) -> Self {
        Self {
            field,
            grids: HashMap::new(),
        }
    }

    pub fn field(&self) -> &TerrainField {
        &self.field
    }

    /// Full-precision analytic height (slow path).
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        self.field.height_at(x, z)
    }

    pub fn surreal_factor_at(&self, x: f32, z: f32) -> f32 {
        self.field.surreal_factor_at(x, z)
    }

    /// Fast height lookup. Chunks that are not generated yet fall back to the
    /// analytic field instead of failing.
    pub fn cached_height_at(&self, x: f32, z: f32) -> f32 {
        let cfg = self.field.config();
        let coord = cfg.chunk_coord_of(x, z);
        let Some(grid) = self.grids.get(&coord) else {
            return self.field.height_at(x, z);
        };

        let (ox, oz) = cfg.chunk_center(coord);
        let u = (x - ox) / cfg.chunk_size + 0.5;
        let v = (z - oz) / cfg.chunk_size + 0.5;
        grid.interpolate(u, v)
    }

    /// Generate and publish the grid for `coord`. The grid becomes visible to
    /// readers only once every sample is written.
    pub fn generate(&mut self, coord: ChunkCoord) {
        let grid = self.field.generate_grid(coord);
        self.publish(grid);
    }

    /// Publish a complete grid, replacing any previous one for its chunk.
    pub fn publish(&mut self, grid: HeightGrid) {
        self.grids.insert(grid.coord(), grid);
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.grids.contains_key(&coord)
    }

    pub fn grid(&self, coord: ChunkCoord) -> Option<&HeightGrid> {
        self.grids.get(&coord)
    }

    /// Stored sample, if the chunk is generated.
    pub fn sample(&self, coord: ChunkCoord, ix: usize, iz: usize) -> Option<f32> {
        self.grids.get(&coord).map(|g| g.get(ix, iz))
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }
}
