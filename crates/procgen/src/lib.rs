//! Procedural terrain: noise, height grids, the runtime height cache, and chunk streaming.

pub mod border;
pub mod chunk_streamer;
pub mod height_cache;
pub mod noise_field;
pub mod terrain;

pub use border::*;
pub use chunk_streamer::*;
pub use height_cache::*;
pub use noise_field::*;
pub use terrain::*;
