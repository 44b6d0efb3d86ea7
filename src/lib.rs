//! Coin Dash - a timed coin-collecting arcade round
//!
//! Core modules:
//! - `sim`: Deterministic round simulation (scheduler, entities, score/timer, round state machine)
//! - `mosaic`: End-of-round pixel mosaic built from collected coin counts
//! - `tuning`: Data-driven round balance
//! - `error`: Error types shared by the modules above

pub mod error;
pub mod mosaic;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use error::{RoundError, SchedulerError, TuningError};
pub use mosaic::{Mosaic, TileColor};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default play-field dimensions (the browser build uses the window size)
    pub const FIELD_WIDTH: f32 = 1280.0;
    pub const FIELD_HEIGHT: f32 = 720.0;

    /// Player sprite size
    pub const PLAYER_WIDTH: f32 = 48.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;

    /// Distance from the right/bottom edge that sends the player to the next room
    pub const ROOM_EDGE_MARGIN: f32 = 50.0;
    /// Number of rooms the player cycles through
    pub const ROOM_COUNT: u8 = 2;

    /// Fixed physics step (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Centre of a play field with the given size
#[inline]
pub fn field_center(size: Vec2) -> Vec2 {
    size * 0.5
}

/// Clamp a point so a box of `extent` centred on it stays inside `size`
#[inline]
pub fn clamp_to_field(pos: Vec2, extent: Vec2, size: Vec2) -> Vec2 {
    let half = extent * 0.5;
    let max = (size - half).max(half);
    pos.clamp(half, max)
}
