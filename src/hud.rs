//! HUD view model
//!
//! Everything a presentation layer needs to draw text on top of the board,
//! derived from the game state at a given instant. Serializable so a web
//! front end (or a log line) can consume it as JSON.

use serde::Serialize;

use crate::consts::MAX_LIVES;
use crate::sim::input::effective_input;
use crate::sim::{BannerKind, Enemy, FreezeMode, GamePhase, GameState};

const HEART_FULL: &str = "\u{2764}\u{fe0f}";
const HEART_EMPTY: &str = "\u{1f5a4}";

/// Fading streak/freeze/combo message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannerView {
    pub text: String,
    pub kind: BannerKind,
    /// 1 when shown, fading to 0
    pub alpha: f32,
    /// Starts at 1.5 and settles to 1
    pub scale: f32,
}

/// Text shown above the character
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Caption {
    /// Nothing matched this buffer
    Wrong { text: String },
    /// Keystrokes in progress
    Typing { text: String },
    /// Last completed word, fading out
    Completed { word: String, alpha: f32 },
}

/// How an enemy sprite is tinted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EnemyTint {
    Normal,
    /// Marked for detonation (red)
    Marked,
    /// Carries the freeze word (blue)
    Superpower,
    /// Frozen in place (white)
    Frozen,
}

impl EnemyTint {
    pub fn of(enemy: &Enemy) -> Self {
        if enemy.marked_for_freeze {
            EnemyTint::Marked
        } else if enemy.has_superpower && !enemy.frozen {
            EnemyTint::Superpower
        } else if enemy.frozen {
            EnemyTint::Frozen
        } else {
            EnemyTint::Normal
        }
    }
}

/// An enemy's word split at the typed prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordSplit<'a> {
    pub typed: &'a str,
    pub rest: &'a str,
}

/// Split the targeted enemy's word into its typed and untyped parts.
/// Every other enemy shows its whole word as `rest`.
pub fn split_word<'a>(state: &GameState, enemy: &'a Enemy) -> WordSplit<'a> {
    let whole = WordSplit {
        typed: "",
        rest: &enemy.word,
    };
    if state.targeted != Some(enemy.id) {
        return whole;
    }
    let typed = effective_input(&state.current_input, &[enemy.word.as_str()]);
    if typed.is_empty() {
        return whole;
    }
    let (typed, rest) = enemy.word.split_at(typed.len());
    WordSplit { typed, rest }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub level: u32,
    pub lives: u8,
    pub hearts: String,
    pub wpm: u32,
    /// Shown from 2 upward
    pub combo: Option<u32>,
    pub banner: Option<BannerView>,
    pub caption: Option<Caption>,
    /// Remaining freeze time (ms)
    pub freeze_remaining_ms: Option<f64>,
    pub screen_shake: f32,
}

impl Hud {
    pub fn from_state(state: &GameState, now_ms: f64) -> Self {
        let tuning = &state.tuning;
        let lives = state.lives.min(MAX_LIVES);
        let hearts = HEART_FULL.repeat(usize::from(lives))
            + &HEART_EMPTY.repeat(usize::from(MAX_LIVES - lives));

        let banner = state.banner.as_ref().and_then(|b| {
            let progress = b.message.progress(now_ms, tuning.banner_duration_ms)?;
            let scale = if state.settings.reduced_motion {
                1.0
            } else {
                1.0 + (1.0 - progress) * 0.5
            };
            Some(BannerView {
                text: b.message.text.clone(),
                kind: b.kind,
                alpha: 1.0 - progress,
                scale,
            })
        });

        let freeze_remaining_ms = match state.freeze {
            FreezeMode::Active { started_at } => {
                Some((tuning.freeze_duration_ms - (now_ms - started_at)).max(0.0))
            }
            FreezeMode::Inactive => None,
        };

        Self {
            phase: state.phase,
            score: state.score,
            level: state.level,
            lives: state.lives,
            hearts,
            wpm: state.wpm(now_ms),
            combo: (state.combo > 1).then_some(state.combo),
            banner,
            caption: caption(state, now_ms),
            freeze_remaining_ms,
            screen_shake: state.screen_shake,
        }
    }
}

fn caption(state: &GameState, now_ms: f64) -> Option<Caption> {
    let tuning = &state.tuning;
    let wrong = state
        .wrong_input
        .as_ref()
        .filter(|w| w.progress(now_ms, tuning.wrong_input_duration_ms).is_some());
    if let Some(wrong) = wrong {
        return Some(Caption::Wrong {
            text: wrong.text.clone(),
        });
    }
    if !state.current_input.is_empty() {
        return Some(Caption::Typing {
            text: state.current_input.clone(),
        });
    }
    let done = state.completed_word.as_ref()?;
    let progress = done.progress(now_ms, tuning.completed_word_duration_ms)?;
    Some(Caption::Completed {
        word: done.text.clone(),
        alpha: 1.0 - progress,
    })
}
