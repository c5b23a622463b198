//! Type Siege - An arcade typing game
//!
//! Core modules:
//! - `sim`: Game-state engine (spawning, input resolution, combat, freeze mode, ticking)
//! - `session`: Lifecycle owner that drives the sim and feeds the collaborators
//! - `hud`: Read-only view model for whatever draws the screen
//! - `audio`: Sound cues and the fire-and-forget sink
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

pub mod audio;
pub mod error;
pub mod hud;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod words;

pub use audio::{AudioSink, NullAudio, SoundCue};
pub use error::ConfigError;
pub use session::{LoopControl, Renderer, Session};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Per-frame constants (speeds, particle physics) are expressed in this frame rate
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Nominal frame duration in seconds
    pub const FRAME_DT: f32 = 1.0 / REFERENCE_FPS;
    /// Largest `dt` accepted by a single tick (a backgrounded tab can report seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Starting (and maximum) number of lives
    pub const MAX_LIVES: u8 = 3;

    /// Enemy walk cycle length in ticks (4 sprites x 8 ticks)
    pub const WALK_CYCLE_TICKS: u32 = 32;

    /// Particles spawned per enemy explosion
    pub const EXPLOSION_PARTICLES: usize = 12;
}

/// Scale a per-reference-frame quantity to an arbitrary `dt` (seconds).
#[inline]
pub fn frame_scale(dt: f32) -> f32 {
    dt.clamp(0.0, consts::MAX_FRAME_DT) * consts::REFERENCE_FPS
}

/// Unit vector from `from` toward `to` and the distance between them
#[inline]
pub fn bearing(from: Vec2, to: Vec2) -> (Vec2, f32) {
    let delta = to - from;
    let distance = delta.length();
    (delta.normalize_or_zero(), distance)
}
