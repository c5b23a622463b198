//! Game-state engine
//!
//! All gameplay logic lives here. The module is deterministic for a given
//! seed and input sequence:
//! - Seeded RNG only
//! - Wall-clock time is passed in, never read
//! - Stable iteration order (collection order)
//! - No rendering or platform dependencies

pub mod combat;
pub mod dancer;
pub mod freeze;
pub mod input;
pub mod spawn;
pub mod state;
pub mod tick;

pub use combat::{STREAK_TIERS, combo_bonus, destroy_enemy, streak_tier};
pub use dancer::{Dance, Dancer};
pub use input::{Resolution, effective_input, handle_input, resolve};
pub use spawn::{SpawnEdge, spawn_enemy};
pub use state::{
    Banner, BannerKind, Enemy, Facing, FireEffect, FireStage, FreezeMode, GameEvent, GamePhase,
    GameState, Particle, TimedText,
};
pub use tick::tick;
