//! Progressive chunk generation and a streaming visibility window.
//!
//! During loading, chunks are generated a batch at a time in row-major order so
//! a loading screen can show progress. Afterwards every chunk stays allocated
//! for the session and only its visibility flag follows the player.

use std::collections::{HashMap, HashSet};

use crate::height_cache::HeightFieldCache;
use crate::terrain::{ChunkCoord, TerrainConfig, TerrainField};

/// Default draw distance in world units.
pub const DEFAULT_VIEW_DISTANCE: f32 = 500.0;

/// Bookkeeping for one generated chunk. Heights live in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRecord {
    pub coord: ChunkCoord,
    pub visible: bool,
}

/// Owns the height cache and decides which chunks exist and which are shown.
#[derive(Debug)]
pub struct ChunkStreamer {
    cache: HeightFieldCache,
    chunks: HashMap<ChunkCoord, ChunkRecord>,
    chunks_per_side: i32,
    total_chunks: usize,
    /// Next row-major grid index to generate.
    cursor: usize,
    view_radius: i32,
    last_focus: Option<ChunkCoord>,
    visible: HashSet<ChunkCoord>,
}

impl ChunkStreamer {
    pub fn new(config: TerrainConfig, view_distance: f32) -> Self {
        let chunks_per_side = config.chunks_per_side().max(1);
        let view_radius = (view_distance / config.chunk_size).ceil() as i32 + 1;
        let total_chunks = (chunks_per_side * chunks_per_side) as usize;
        Self {
            cache: HeightFieldCache::new(TerrainField::new(config)),
            chunks: HashMap::with_capacity(total_chunks),
            chunks_per_side,
            total_chunks,
            cursor: 0,
            view_radius,
            last_focus: None,
            visible: HashSet::new(),
        }
    }

    /// Read access to terrain heights for every other system.
    pub fn heights(&self) -> &HeightFieldCache {
        &self.cache
    }

    pub fn config(&self) -> &TerrainConfig {
        self.cache.field().config()
    }

    /// Chunk coordinate of row-major grid index `i`.
    fn coord_of_index(&self, i: usize) -> ChunkCoord {
        let side = self.chunks_per_side as usize;
        let half = self.chunks_per_side / 2;
        ChunkCoord::new((i % side) as i32 - half, (i / side) as i32 - half)
    }

    /// Generate up to `batch_size` chunks. Returns true once every chunk exists.
    pub fn generate_batch(&mut self, batch_size: usize) -> bool {
        let was_complete = self.is_complete();
        let end = (self.cursor + batch_size).min(self.total_chunks);
        for i in self.cursor..end {
            let coord = self.coord_of_index(i);
            if self.chunks.contains_key(&coord) {
                continue;
            }
            self.cache.generate(coord);
            // Before the first window pass everything starts shown; afterwards
            // new chunks join the current window state.
            let visible = match self.last_focus {
                None => true,
                Some(focus) => focus.chebyshev(coord) <= self.view_radius,
            };
            if visible && self.last_focus.is_some() {
                self.visible.insert(coord);
            }
            self.chunks.insert(coord, ChunkRecord { coord, visible });
        }
        self.cursor = end;

        let done = self.is_complete();
        if done && !was_complete {
            log::info!("Terrain generation complete: {} chunks", self.chunks.len());
        }
        done
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.total_chunks
    }

    /// Fraction of the grid generated, in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.total_chunks == 0 {
            return 1.0;
        }
        self.cursor as f32 / self.total_chunks as f32
    }

    pub fn generated_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_chunks(&self) -> usize {
        self.total_chunks
    }

    pub fn view_radius(&self) -> i32 {
        self.view_radius
    }

    /// Recompute the visible window around the focus. No-op while the focus stays
    /// inside the same chunk; returns whether a recomputation happened.
    pub fn update_visibility(&mut self, focus_x: f32, focus_z: f32) -> bool {
        let focus = self.config().chunk_coord_of(focus_x, focus_z);
        if self.last_focus == Some(focus) {
            return false;
        }
        let first_pass = self.last_focus.is_none();
        self.last_focus = Some(focus);

        let r = self.view_radius;
        let mut next_visible = HashSet::new();
        for dz in -r..=r {
            for dx in -r..=r {
                let coord = ChunkCoord::new(focus.x + dx, focus.z + dz);
                if let Some(rec) = self.chunks.get_mut(&coord) {
                    rec.visible = true;
                    next_visible.insert(coord);
                }
            }
        }

        for coord in &self.visible {
            if next_visible.contains(coord) {
                continue;
            }
            if let Some(rec) = self.chunks.get_mut(coord) {
                rec.visible = false;
            }
        }

        // Raw generation leaves everything shown; hide the rest once.
        if first_pass {
            for (coord, rec) in self.chunks.iter_mut() {
                if !next_visible.contains(coord) {
                    rec.visible = false;
                }
            }
        }

        log::debug!(
            "Chunk window moved to ({}, {}): {} visible",
            focus.x,
            focus.z,
            next_visible.len()
        );
        self.visible = next_visible;
        true
    }

    pub fn is_visible(&self, coord: ChunkCoord) -> bool {
        self.chunks.get(&coord).is_some_and(|rec| rec.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.chunks.values().filter(|rec| rec.visible).count()
    }

    pub fn chunks(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.chunks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8x8 chunks of 64 units with coarse grids keeps tests fast.
    fn small_streamer() -> ChunkStreamer {
        ChunkStreamer::new(
            TerrainConfig {
                world_size: 512.0,
                segments: 4,
                seed: 77,
                ..Default::default()
            },
            100.0,
        )
    }

    #[test]
    fn batches_generate_every_chunk_once() {
        let mut streamer = small_streamer();
        assert_eq!(streamer.total_chunks(), 64);
        let mut calls = 0;
        while !streamer.generate_batch(5) {
            calls += 1;
            assert!(calls < 100);
        }
        assert_eq!(calls, 12);
        assert_eq!(streamer.generated_count(), 64);
        assert_eq!(streamer.heights().len(), 64);
        assert_eq!(streamer.progress(), 1.0);
        // Every grid cell, -4..=3 on both axes
        for z in -4..=3 {
            for x in -4..=3 {
                assert!(streamer.heights().contains(ChunkCoord::new(x, z)));
            }
        }
        // Further calls are harmless
        assert!(streamer.generate_batch(5));
        assert_eq!(streamer.generated_count(), 64);
    }

    #[test]
    fn progress_tracks_batches() {
        let mut streamer = small_streamer();
        assert_eq!(streamer.progress(), 0.0);
        assert!(!streamer.generate_batch(16));
        assert_eq!(streamer.progress(), 0.25);
        // Row-major: the first 16 chunks are rows z = -4 and z = -3
        assert!(streamer.heights().contains(ChunkCoord::new(3, -3)));
        assert!(!streamer.heights().contains(ChunkCoord::new(-4, -2)));
    }

    #[test]
    fn first_visibility_pass_hides_outside_window() {
        let mut streamer = small_streamer();
        while !streamer.generate_batch(64) {}
        assert_eq!(streamer.visible_count(), 64);
        assert_eq!(streamer.view_radius(), 3);

        assert!(streamer.update_visibility(0.0, 0.0));
        // Window is -3..=3 clipped to the grid (-4..=3): 7x7 chunks
        assert_eq!(streamer.visible_count(), 49);
        assert!(streamer.is_visible(ChunkCoord::new(3, 3)));
        assert!(!streamer.is_visible(ChunkCoord::new(-4, 0)));
    }

    #[test]
    fn same_chunk_focus_is_noop() {
        let mut streamer = small_streamer();
        while !streamer.generate_batch(64) {}
        assert!(streamer.update_visibility(0.0, 0.0));
        assert!(!streamer.update_visibility(10.0, -20.0));
        assert!(streamer.update_visibility(64.0, 0.0));
    }

    #[test]
    fn window_follows_focus() {
        let mut streamer = small_streamer();
        while !streamer.generate_batch(64) {}
        streamer.update_visibility(0.0, 0.0);
        streamer.update_visibility(-200.0, -200.0);
        // Focus chunk (-3, -3): window -6..=0 clipped to -4..=0 → 5x5
        assert_eq!(streamer.visible_count(), 25);
        assert!(!streamer.is_visible(ChunkCoord::new(3, 3)));
        assert!(streamer.is_visible(ChunkCoord::new(-4, -4)));
        for rec in streamer.chunks() {
            let expected = rec.coord.x <= 0 && rec.coord.z <= 0;
            assert_eq!(rec.visible, expected, "{:?}", rec.coord);
        }
    }

    #[test]
    fn chunks_generated_after_first_pass_join_window() {
        let mut streamer = small_streamer();
        streamer.generate_batch(8);
        streamer.update_visibility(0.0, 0.0);
        while !streamer.generate_batch(8) {}
        assert!(streamer.is_visible(ChunkCoord::new(0, 0)));
        assert!(!streamer.is_visible(ChunkCoord::new(-4, 3)));
        assert_eq!(streamer.visible_count(), 49);
    }
}
