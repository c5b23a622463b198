//! Input resolver
//!
//! The player types into one continuous buffer. Instead of detecting word
//! boundaries, every buffer change is matched by its longest suffix that is
//! still a prefix of some live enemy's word, so leading garbage (a typo, or
//! the tail of the previous word) falls away on its own.

use super::combat;
use super::freeze;
use super::state::{GamePhase, GameEvent, GameState, TimedText};
use crate::words::is_freeze_word;

/// Outcome of matching a buffer against a candidate set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The effective input is exactly this word
    Completed(String),
    /// The effective input is a proper prefix of this enemy's word
    Targeted(u32),
    /// No suffix of the buffer starts any candidate word
    NoMatch,
}

/// Longest suffix of `buffer` that is a non-empty prefix of one of `words`.
/// Returns `""` when every suffix is rejected.
pub fn effective_input<'a>(buffer: &'a str, words: &[&str]) -> &'a str {
    buffer
        .char_indices()
        .map(|(i, _)| &buffer[i..])
        .find(|suffix| words.iter().any(|w| w.starts_with(suffix)))
        .unwrap_or("")
}

/// Resolve `buffer` against `(id, word)` candidates (in collection order)
pub fn resolve(buffer: &str, candidates: &[(u32, &str)]) -> Resolution {
    let words: Vec<&str> = candidates.iter().map(|&(_, w)| w).collect();
    let search = effective_input(buffer, &words);
    if search.is_empty() {
        return Resolution::NoMatch;
    }
    if let Some(&(_, word)) = candidates.iter().find(|&&(_, w)| w == search) {
        return Resolution::Completed(word.to_string());
    }
    candidates
        .iter()
        .find(|&&(_, w)| w.starts_with(search))
        .map_or(Resolution::NoMatch, |&(id, _)| Resolution::Targeted(id))
}

/// Live enemies as `(id, word)` pairs, optionally without freeze carriers
pub(crate) fn candidates(state: &GameState, include_freeze: bool) -> Vec<(u32, String)> {
    state
        .live_enemies()
        .filter(|e| include_freeze || !is_freeze_word(&e.word))
        .map(|e| (e.id, e.word.clone()))
        .collect()
}

/// Resolve the current buffer against owned candidates
pub(crate) fn resolve_owned(buffer: &str, owned: &[(u32, String)]) -> Resolution {
    let borrowed: Vec<(u32, &str)> = owned.iter().map(|(id, w)| (*id, w.as_str())).collect();
    resolve(buffer, &borrowed)
}

/// Entry point for every buffer change. `raw` is the full text box value.
pub fn handle_input(state: &mut GameState, raw: &str, now_ms: f64) {
    if state.phase != GamePhase::Running {
        return;
    }

    let buffer = raw.to_lowercase();
    if buffer.chars().count() == 1 {
        state.completed_word = None;
    }
    let was_empty = state.current_input.is_empty();
    state
        .dancer
        .on_input(was_empty, buffer.is_empty(), now_ms, &mut state.rng);
    state.current_input = buffer;

    let everyone = candidates(state, true);
    let global = {
        let words: Vec<&str> = everyone.iter().map(|(_, w)| w.as_str()).collect();
        effective_input(&state.current_input, &words).to_string()
    };
    if is_freeze_word(&global) && !state.is_freeze_active() && freeze::activate(state, now_ms) {
        return;
    }

    if state.is_freeze_active() {
        freeze::handle_marking_input(state, now_ms);
        return;
    }

    match resolve_owned(&state.current_input, &everyone) {
        Resolution::Completed(word) => {
            state.record_completed_word(&word, now_ms);
            combat::destroy_enemy(state, &word, now_ms);
            state.clear_input();
            state.dancer.on_word_completed();
        }
        Resolution::Targeted(id) => state.targeted = Some(id),
        Resolution::NoMatch => flag_wrong_input(state, now_ms),
    }
}

/// Nothing matches: drop the highlight and, for long enough buffers, raise the
/// error indicator. The buffer is kept so a later suffix can still match.
pub(crate) fn flag_wrong_input(state: &mut GameState, now_ms: f64) {
    state.targeted = None;
    if state.current_input.chars().count() <= state.tuning.wrong_input_min_len {
        return;
    }
    let text = state.current_input.clone();
    log::debug!("Wrong input \"{text}\"");
    state.wrong_input = Some(TimedText::new(text.clone(), now_ms));
    if !state.is_freeze_active() {
        state.shake(0.5);
    }
    state.emit(GameEvent::WrongInput { text });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::tuning::Tuning;
    use glam::Vec2;
    use proptest::prelude::*;

    fn running_with(words: &[&str]) -> GameState {
        let mut state = GameState::new(3, Tuning::default(), Settings::default());
        state.reset(0.0);
        for (i, word) in words.iter().enumerate() {
            state.push_enemy(word, Vec2::new(-50.0, 40.0 * i as f32));
        }
        state
    }

    #[test]
    fn test_effective_input_drops_leading_garbage() {
        let words = ["cat", "paw"];
        assert_eq!(effective_input("xxca", &words), "ca");
        assert_eq!(effective_input("catpa", &words), "pa");
        assert_eq!(effective_input("cat", &words), "cat");
        assert_eq!(effective_input("zzz", &words), "");
        assert_eq!(effective_input("", &words), "");
    }

    #[test]
    fn test_effective_input_prefers_longest_suffix() {
        // "ca" and "a" are both prefixes once "attack" is present; the longer one wins
        let words = ["cat", "attack"];
        assert_eq!(effective_input("ca", &words), "ca");
        assert_eq!(effective_input("xat", &words), "at");
    }

    #[test]
    fn test_resolve_variants() {
        let candidates = [(1, "cat"), (2, "curse")];
        assert_eq!(resolve("c", &candidates), Resolution::Targeted(1));
        assert_eq!(resolve("cu", &candidates), Resolution::Targeted(2));
        assert_eq!(resolve("qqcat", &candidates), Resolution::Completed("cat".into()));
        assert_eq!(resolve("qq", &candidates), Resolution::NoMatch);
        assert_eq!(resolve("", &candidates), Resolution::NoMatch);
    }

    #[test]
    fn test_targets_then_completes() {
        let mut state = running_with(&["cat"]);
        handle_input(&mut state, "ca", 100.0);
        assert_eq!(state.targeted, Some(state.enemies[0].id));
        assert_eq!(state.current_input, "ca");

        handle_input(&mut state, "cat", 200.0);
        assert!(state.current_input.is_empty());
        assert_eq!(state.targeted, None);
        assert!(state.enemies[0].is_dying());
        assert!(state.events.contains(&GameEvent::InputCleared));
    }

    #[test]
    fn test_uppercase_input_matches() {
        let mut state = running_with(&["cat"]);
        handle_input(&mut state, "CAT", 0.0);
        assert!(state.enemies[0].is_dying());
    }

    #[test]
    fn test_wrong_input_keeps_buffer() {
        let mut state = running_with(&["cat"]);
        handle_input(&mut state, "zq", 0.0);
        assert!(state.wrong_input.is_none(), "two characters are not yet an error");

        handle_input(&mut state, "zqx", 10.0);
        assert_eq!(state.current_input, "zqx");
        assert_eq!(state.wrong_input.as_ref().map(|t| t.text.as_str()), Some("zqx"));
        assert!(state.screen_shake > 0.0);

        // Suffix recovery without clearing
        handle_input(&mut state, "zqxcat", 20.0);
        assert!(state.enemies[0].is_dying());
    }

    #[test]
    fn test_dying_enemies_are_not_candidates() {
        let mut state = running_with(&["cat"]);
        handle_input(&mut state, "cat", 0.0);
        let score = state.score;
        handle_input(&mut state, "cat", 10.0);
        assert_eq!(state.score, score);
        assert_eq!(state.current_input, "cat");
    }

    #[test]
    fn test_ignored_when_not_running() {
        let mut state = running_with(&["cat"]);
        state.phase = GamePhase::PendingTermination;
        handle_input(&mut state, "cat", 0.0);
        assert!(state.enemies[0].is_live());
        assert!(state.current_input.is_empty());
    }

    #[test]
    fn test_single_char_clears_completed_caption() {
        let mut state = running_with(&["cat", "paw"]);
        handle_input(&mut state, "cat", 0.0);
        assert!(state.completed_word.is_some());
        handle_input(&mut state, "p", 50.0);
        assert!(state.completed_word.is_none());
    }

    proptest! {
        /// A buffer ending in a live enemy's exact word completes it, whatever
        /// comes before, including letters that start one of the words.
        #[test]
        fn prop_exact_word_survives_garbage(
            garbage in prop_oneof!["[0-9]{0,8}", "[a-z]{0,8}"],
            pick in 0usize..4,
        ) {
            let words = ["cat", "whisker", "strike", "demon"];
            let word = words[pick];
            let candidates: Vec<(u32, &str)> =
                words.iter().enumerate().map(|(i, w)| (i as u32, *w)).collect();
            let buffer = format!("{garbage}{word}");
            prop_assert_eq!(resolve(&buffer, &candidates), Resolution::Completed(word.to_string()));
        }

        /// The effective input is a suffix of the buffer and either empty or
        /// a prefix of some word
        #[test]
        fn prop_effective_input_is_valid_suffix(buffer in "[a-z]{0,12}") {
            let words = ["cat", "meow", "purr", "paw", "tail"];
            let eff = effective_input(&buffer, &words);
            prop_assert!(buffer.ends_with(eff));
            prop_assert!(eff.is_empty() || words.iter().any(|w| w.starts_with(eff)));
        }
    }
}
