//! Combat and combo engine
//!
//! A completed word kills every live enemy carrying it as one batch. The batch
//! is scored at once; the enemies themselves explode one after another as their
//! staggered death timers run out.

use super::spawn;
use super::state::{BannerKind, GameEvent, GameState};
use crate::audio::SoundCue;

/// Simultaneous-kill announcements, indexed by `kill_count - 2` (saturating)
pub const STREAK_TIERS: [(&str, SoundCue); 14] = [
    ("DOUBLE KILL!", SoundCue::DoubleKill),
    ("TRIPLE KILL!", SoundCue::TripleKill),
    ("QUADRUPLE KILL!", SoundCue::Overkill),
    ("QUINTUPLE KILL!", SoundCue::Killtacular),
    ("SEXTUPLE KILL!", SoundCue::Killtrocity),
    ("SEPTUPLE KILL!", SoundCue::Killimanjaro),
    ("OCTUPLE KILL!", SoundCue::Killtastrophe),
    ("NONUPLE KILL!", SoundCue::Killpocalypse),
    ("DECUPLE KILL!", SoundCue::Killionaire),
    ("MEGA KILL!", SoundCue::RunningRiot),
    ("ULTRA KILL!", SoundCue::Rampage),
    ("MONSTER KILL!", SoundCue::Untouchable),
    ("LEGENDARY KILL!", SoundCue::Invincible),
    ("GODLIKE KILL!", SoundCue::Invincible),
];

/// Announcement for a batch of `kill_count` simultaneous kills (none below 2)
pub fn streak_tier(kill_count: usize) -> Option<(&'static str, SoundCue)> {
    if kill_count < 2 {
        return None;
    }
    Some(STREAK_TIERS[(kill_count - 2).min(STREAK_TIERS.len() - 1)])
}

/// Bonus on top of `base` for the current combo: `floor(base * combo * 0.1)` above 1
pub fn combo_bonus(base: u64, combo: u32) -> u64 {
    if combo > 1 { base * u64::from(combo) / 10 } else { 0 }
}

/// Apply the combo accumulation law for `kill_count` kills at `now_ms`
pub fn register_kills(state: &mut GameState, kill_count: usize, now_ms: f64) -> u32 {
    let kills = kill_count as u32;
    let within_window = state
        .last_kill_at
        .is_some_and(|last| now_ms - last < state.tuning.combo_timeout_ms);
    state.combo = if within_window { state.combo + kills } else { kills };
    state.last_kill_at = Some(now_ms);
    state.combo
}

/// Freeze the enemies at `indices` and give them staggered death timers
pub(crate) fn schedule_deaths(state: &mut GameState, indices: &[usize], with_attack_delay: bool) {
    for (order, &idx) in indices.iter().enumerate() {
        let delay = state.tuning.staggered_delay(order, with_attack_delay);
        let enemy = &mut state.enemies[idx];
        enemy.frozen = true;
        enemy.death_timer = Some(delay);
    }
}

/// Show and play the streak tier for `kill_count`; returns false below a double kill
pub(crate) fn announce_streak(state: &mut GameState, kill_count: usize, now_ms: f64) -> bool {
    let Some((text, cue)) = streak_tier(kill_count) else {
        return false;
    };
    state.show_banner(BannerKind::Kill, text, now_ms);
    state.play(cue);
    true
}

/// Kill every live enemy whose word is `word`. Returns the batch size (0 is a no-op).
pub fn destroy_enemy(state: &mut GameState, word: &str, now_ms: f64) -> usize {
    let batch: Vec<usize> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_live() && e.word == word)
        .map(|(i, _)| i)
        .collect();
    let kill_count = batch.len();
    if kill_count == 0 {
        return 0;
    }

    schedule_deaths(state, &batch, true);
    let combo = register_kills(state, kill_count, now_ms);

    let base = state.tuning.points_per_kill * u64::from(state.level) * kill_count as u64;
    state.score += base + combo_bonus(base, combo);

    if !announce_streak(state, kill_count, now_ms) {
        if combo > 3 {
            state.show_banner(BannerKind::Combo, format!("{combo}x COMBO!"), now_ms);
        } else {
            state.banner = None;
        }
    }

    log::debug!("Killed {kill_count}x \"{word}\" (combo {combo}, score {})", state.score);
    state.emit(GameEvent::Kill {
        word: word.to_string(),
        count: kill_count,
        combo,
    });
    kill_count
}

/// Raise the level for every score threshold crossed. Each level-up also
/// speeds up spawning.
pub fn check_level_up(state: &mut GameState) {
    let step = state.tuning.level_score_step;
    while state.score >= u64::from(state.level) * step {
        state.level += 1;
        spawn::accelerate(state);
        log::info!(
            "Level {} (score {}, spawn every {}ms)",
            state.level,
            state.score,
            state.spawn_interval_ms
        );
        state.emit(GameEvent::LevelUp { level: state.level });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn running_with(words: &[&str]) -> GameState {
        let mut state = GameState::new(11, Tuning::default(), Settings::default());
        state.reset(0.0);
        for (i, word) in words.iter().enumerate() {
            state.push_enemy(word, Vec2::new(-50.0, 30.0 * i as f32));
        }
        state
    }

    #[test]
    fn test_batch_kills_every_holder() {
        let mut state = running_with(&["paw", "cat", "paw", "paw"]);
        let killed = destroy_enemy(&mut state, "paw", 0.0);
        assert_eq!(killed, 3);
        for enemy in &state.enemies {
            assert_eq!(enemy.is_dying(), enemy.word == "paw");
        }
        // Staggered: attack delay, then one explosion delay apart
        let timers: Vec<u32> = state.enemies.iter().filter_map(|e| e.death_timer).collect();
        assert_eq!(timers, vec![10, 25, 40]);
        assert!(state.enemies.iter().filter(|e| e.is_dying()).all(|e| e.frozen));
    }

    #[test]
    fn test_unknown_word_is_noop() {
        let mut state = running_with(&["cat"]);
        assert_eq!(destroy_enemy(&mut state, "dog", 0.0), 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.combo, 0);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_combo_window() {
        let mut state = running_with(&["cat", "paw", "tail"]);
        destroy_enemy(&mut state, "cat", 1_000.0);
        assert_eq!(state.combo, 1);
        destroy_enemy(&mut state, "paw", 2_999.0);
        assert_eq!(state.combo, 2);
        destroy_enemy(&mut state, "tail", 4_999.0);
        assert_eq!(state.combo, 1, "exactly the timeout apart breaks the chain");
    }

    #[test]
    fn test_score_with_bonus() {
        let mut state = running_with(&["cat", "paw"]);
        destroy_enemy(&mut state, "cat", 0.0);
        assert_eq!(state.score, 10);
        destroy_enemy(&mut state, "paw", 100.0);
        // base 10, combo 2 -> bonus floor(10 * 2 * 0.1) = 2
        assert_eq!(state.score, 22);
    }

    #[test]
    fn test_streak_table_saturates() {
        assert_eq!(streak_tier(1), None);
        assert_eq!(streak_tier(2).unwrap().0, "DOUBLE KILL!");
        assert_eq!(streak_tier(3).unwrap().1, SoundCue::TripleKill);
        assert_eq!(streak_tier(15).unwrap().0, "GODLIKE KILL!");
        assert_eq!(streak_tier(400).unwrap().0, "GODLIKE KILL!");
    }

    #[test]
    fn test_combo_banner_after_three() {
        let mut state = running_with(&["cat", "paw", "tail", "key"]);
        for (i, word) in ["cat", "paw", "tail"].iter().enumerate() {
            destroy_enemy(&mut state, word, i as f64 * 100.0);
        }
        assert!(state.banner.is_none());
        destroy_enemy(&mut state, "key", 300.0);
        let banner = state.banner.as_ref().unwrap();
        assert_eq!(banner.message.text, "4x COMBO!");
        assert_eq!(banner.kind, BannerKind::Combo);
    }

    #[test]
    fn test_level_up_thresholds() {
        let mut state = running_with(&[]);
        state.score = 49;
        check_level_up(&mut state);
        assert_eq!(state.level, 1);

        state.score = 50;
        check_level_up(&mut state);
        assert_eq!(state.level, 2);
        assert_eq!(state.spawn_interval_ms, 1_050.0);

        // A big jump crosses several thresholds at once
        state.score = 260;
        check_level_up(&mut state);
        assert_eq!(state.level, 6);
        let level_ups = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::LevelUp { .. }))
            .count();
        assert_eq!(level_ups, 5);
    }

    proptest! {
        /// combo' = k if the gap reaches the timeout, else combo + k
        #[test]
        fn prop_combo_law(prev in 0u32..50, k in 1usize..6, gap in 0.0f64..5_000.0) {
            let mut state = running_with(&[]);
            state.combo = prev;
            state.last_kill_at = Some(10_000.0);
            let combo = register_kills(&mut state, k, 10_000.0 + gap);
            let expected = if gap >= 2_000.0 { k as u32 } else { prev + k as u32 };
            prop_assert_eq!(combo, expected);
            prop_assert_eq!(state.last_kill_at, Some(10_000.0 + gap));
        }

        /// Score delta is exactly 10*level*k + floor(10*level*k*combo/10) for combo > 1
        #[test]
        fn prop_score_formula(level in 1u32..20, k in 1usize..5, prev in 0u32..10) {
            let words: Vec<&str> = std::iter::repeat_n("cat", k).collect();
            let mut state = running_with(&words);
            state.level = level;
            state.combo = prev;
            state.last_kill_at = Some(0.0);
            destroy_enemy(&mut state, "cat", 1.0);
            let combo = u64::from(prev) + k as u64;
            let base = 10 * u64::from(level) * k as u64;
            let bonus = if combo > 1 { base * combo / 10 } else { 0 };
            prop_assert_eq!(state.score, base + bonus);
        }
    }
}
