//! Otter world gameplay: the otter, the crowd it terrorises, and the session
//! driver that ties them to the streamed terrain.

pub mod config;
pub mod crowd;
pub mod debris;
pub mod otter;
pub mod rockets;
pub mod session;
pub mod tint;

pub use config::{ConfigError, GameConfig};
pub use crowd::{Crowd, CrowdCounts, Person, PersonState};
pub use otter::{OtterController, OtterInput, OtterState};
pub use session::{FrameInput, Session, SessionPhase};
