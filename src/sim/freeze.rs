//! Freeze superpower
//!
//! Typing the reserved word while a carrier is on the board destroys every
//! carrier and stops the rest of the board for a fixed wall-clock window.
//! Words completed during the window only mark their enemies; marked enemies
//! detonate together when the window closes, or as soon as everything live
//! is marked.

use super::combat::{self, schedule_deaths};
use super::input::{self, Resolution};
use super::state::{BannerKind, Enemy, FreezeMode, GameEvent, GameState};
use crate::audio::SoundCue;
use crate::words::{FREEZE_WORD, is_freeze_word};

fn live_indices(state: &GameState, pred: impl Fn(&Enemy) -> bool) -> Vec<usize> {
    state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_live() && pred(e))
        .map(|(i, _)| i)
        .collect()
}

/// Enter freeze mode. Returns false (and changes nothing) when freeze is
/// already active or no live enemy carries the reserved word.
pub fn activate(state: &mut GameState, now_ms: f64) -> bool {
    if state.is_freeze_active() {
        return false;
    }
    let carriers = live_indices(state, |e| is_freeze_word(&e.word));
    if carriers.is_empty() {
        return false;
    }

    state.freeze = FreezeMode::Active { started_at: now_ms };
    schedule_deaths(state, &carriers, true);
    for enemy in state.enemies.iter_mut().filter(|e| e.is_live()) {
        enemy.frozen = true;
        enemy.marked_for_freeze = false;
    }

    let count = carriers.len();
    combat::register_kills(state, count, now_ms);
    state.score += state.tuning.points_per_kill * u64::from(state.level) * count as u64;
    state.record_completed_word(FREEZE_WORD, now_ms);

    state.clear_input();
    state.dancer.on_word_completed();
    state.show_banner(BannerKind::Freeze, "FREEZE!", now_ms);
    state.play(SoundCue::Freeze);

    log::info!("Freeze started: {count} carrier(s) destroyed, score {}", state.score);
    state.emit(GameEvent::FreezeStarted { destroyed: count });
    true
}

/// Buffer change while freeze is active: completing a word marks its enemies
pub fn handle_marking_input(state: &mut GameState, now_ms: f64) {
    let markable = input::candidates(state, false);
    match input::resolve_owned(&state.current_input, &markable) {
        Resolution::Completed(word) => {
            for enemy in state.enemies.iter_mut() {
                if enemy.is_live() && enemy.word == word {
                    enemy.marked_for_freeze = true;
                }
            }
            log::debug!("Marked \"{word}\" for detonation");
            state.record_completed_word(&word, now_ms);
            state.clear_input();
            state.dancer.on_word_completed();

            if state.live_enemies().all(|e| e.marked_for_freeze) {
                finish_early(state, now_ms);
            }
        }
        Resolution::Targeted(id) => state.targeted = Some(id),
        Resolution::NoMatch => input::flag_wrong_input(state, now_ms),
    }
}

/// Detonate every marked live enemy, `points_per_kill * level` each, with a
/// streak announcement for more than one. Returns how many were detonated.
fn detonate_marked(state: &mut GameState, now_ms: f64) -> usize {
    let marked = live_indices(state, |e| e.marked_for_freeze);
    schedule_deaths(state, &marked, false);

    let count = marked.len();
    state.score += state.tuning.points_per_kill * u64::from(state.level) * count as u64;
    combat::announce_streak(state, count, now_ms);
    state.last_kill_at = Some(now_ms);
    state.freeze = FreezeMode::Inactive;
    count
}

/// Every live enemy is marked: leave freeze now
pub fn finish_early(state: &mut GameState, now_ms: f64) {
    let detonated = detonate_marked(state, now_ms);
    log::info!("Freeze ended early: {detonated} detonated");
    state.emit(GameEvent::FreezeEnded {
        early: true,
        detonated,
    });
}

/// Close the freeze window once its duration has passed. Returns true if it
/// ended on this call.
pub fn expire_if_due(state: &mut GameState, now_ms: f64) -> bool {
    let FreezeMode::Active { started_at } = state.freeze else {
        return false;
    };
    if now_ms - started_at <= state.tuning.freeze_duration_ms {
        return false;
    }

    let detonated = detonate_marked(state, now_ms);
    for enemy in state.enemies.iter_mut().filter(|e| e.is_live()) {
        enemy.frozen = false;
    }
    log::info!("Freeze expired: {detonated} detonated");
    state.emit(GameEvent::FreezeEnded {
        early: false,
        detonated,
    });
    true
}
