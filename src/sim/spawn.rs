//! Spawn controller
//!
//! Decides when, where and with which word a new enemy appears.

use glam::Vec2;
use rand::Rng;

use super::state::{GamePhase, GameState};
use crate::tuning::Tuning;
use crate::words::{FREEZE_WORD, WORDS};

/// Viewport edge an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnEdge {
    Left,
    Right,
    Top,
    Bottom,
}

impl SpawnEdge {
    const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Left,
        SpawnEdge::Right,
        SpawnEdge::Top,
        SpawnEdge::Bottom,
    ];

    /// Uniform position along this edge, `margin` pixels outside the viewport
    pub fn position(&self, t: f32, tuning: &Tuning) -> Vec2 {
        let (w, h, m) = (tuning.viewport_width, tuning.viewport_height, tuning.spawn_margin);
        match self {
            SpawnEdge::Left => Vec2::new(-m, t * h),
            SpawnEdge::Right => Vec2::new(w + m, t * h),
            SpawnEdge::Top => Vec2::new(t * w, -m),
            SpawnEdge::Bottom => Vec2::new(t * w, h + m),
        }
    }
}

/// Create one enemy at a random edge. Never fails. Returns its id.
pub fn spawn_enemy(state: &mut GameState) -> u32 {
    let superpower = state.rng.random_bool(state.tuning.superpower_chance);
    let word = if superpower {
        FREEZE_WORD
    } else {
        WORDS[state.rng.random_range(0..WORDS.len())]
    };
    let edge = SpawnEdge::ALL[state.rng.random_range(0..SpawnEdge::ALL.len())];
    let t: f32 = state.rng.random();
    let pos = edge.position(t, &state.tuning);

    let id = state.push_enemy(word, pos);
    log::debug!("Spawned enemy {id} \"{word}\" from {edge:?} (level {})", state.level);
    id
}

/// Spawn if the inter-spawn interval has elapsed. Returns true if an enemy was added.
pub fn spawn_if_due(state: &mut GameState, now_ms: f64) -> bool {
    if now_ms - state.last_spawn_at > state.spawn_interval_ms {
        spawn_enemy(state);
        state.last_spawn_at = now_ms;
        return true;
    }
    false
}

/// Never leave a running board empty. Returns true if an enemy was forced in.
pub fn ensure_not_empty(state: &mut GameState) -> bool {
    if state.enemies.is_empty() && state.phase == GamePhase::Running {
        spawn_enemy(state);
        return true;
    }
    false
}

/// Shrink the spawn interval after a level-up, down to the floor
pub fn accelerate(state: &mut GameState) {
    let tuning = &state.tuning;
    state.spawn_interval_ms =
        (state.spawn_interval_ms - tuning.spawn_interval_step_ms).max(tuning.min_spawn_interval_ms);
}
