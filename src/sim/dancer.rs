//! The defended character
//!
//! Purely cosmetic except for one thing: the hurt animation countdown decides
//! when a session that ran out of lives is allowed to end.

use rand::Rng;

/// Frames per dance sheet
pub const DANCE_FRAMES: u8 = 8;

/// Ticks between frames while typing
const TYPING_FRAME_TICKS: u32 = 5;
/// Ticks between frames while idle
const IDLE_FRAME_TICKS: u32 = 12;
/// Typing counts as active this long after the last keystroke (ms)
const TYPING_ACTIVE_MS: f64 = 400.0;

/// Which animation sheet is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dance {
    /// Idle
    #[default]
    Balancing,
    Hips,
    Snap,
    /// Hurt (drawn with a red tint)
    Skip,
}

impl Dance {
    fn random_typing(rng: &mut impl Rng) -> Self {
        if rng.random_bool(0.5) { Dance::Hips } else { Dance::Snap }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dancer {
    pub dance: Dance,
    /// Current frame within the sheet (0..DANCE_FRAMES)
    pub frame: u8,
    anim_counter: u32,
    idle_counter: u32,
    /// Remaining hurt ticks
    hurt_ticks: u32,
    /// Random skip frames played while hurt
    hurt_sequence: Vec<u8>,
    hurt_index: usize,
    last_type_at: f64,
}

impl Dancer {
    /// Hurt animation still playing
    pub fn is_hurt(&self) -> bool {
        self.hurt_ticks > 0
    }

    /// React to a buffer change
    pub fn on_input(&mut self, was_empty: bool, is_empty: bool, now_ms: f64, rng: &mut impl Rng) {
        if self.is_hurt() {
            if !is_empty {
                self.last_type_at = now_ms;
            }
            return;
        }
        if is_empty {
            self.set_dance(Dance::Balancing);
            return;
        }
        if was_empty {
            self.set_dance(Dance::random_typing(rng));
        }
        self.last_type_at = now_ms;
    }

    /// A word was finished; return to idle unless hurt
    pub fn on_word_completed(&mut self) {
        if !self.is_hurt() {
            self.set_dance(Dance::Balancing);
        }
    }

    /// Start (or restart) the hurt animation
    pub fn hurt(&mut self, duration_ticks: u32, rng: &mut impl Rng) {
        self.dance = Dance::Skip;
        self.frame = 0;
        self.hurt_ticks = duration_ticks;
        self.hurt_index = 0;
        self.hurt_sequence = (0..duration_ticks)
            .map(|_| rng.random_range(0..DANCE_FRAMES))
            .collect();
    }

    /// Advance one tick
    pub fn advance(&mut self, typing: bool, now_ms: f64, rng: &mut impl Rng) {
        if !typing && !self.is_hurt() && self.dance != Dance::Balancing {
            self.set_dance(Dance::Balancing);
        }

        if self.is_hurt() {
            let idx = self.hurt_index.min(self.hurt_sequence.len().saturating_sub(1));
            self.frame = self.hurt_sequence.get(idx).copied().unwrap_or(0) % DANCE_FRAMES;
            self.hurt_index += 1;
            self.hurt_ticks -= 1;
            if self.hurt_ticks == 0 {
                let next = if typing { Dance::random_typing(rng) } else { Dance::Balancing };
                self.set_dance(next);
            }
            return;
        }

        let typing_active = typing && now_ms - self.last_type_at < TYPING_ACTIVE_MS;
        if typing_active {
            self.anim_counter += 1;
            if self.anim_counter >= TYPING_FRAME_TICKS {
                self.anim_counter = 0;
                self.frame = (self.frame + 1) % DANCE_FRAMES;
            }
        } else if self.dance == Dance::Balancing {
            self.idle_counter += 1;
            if self.idle_counter >= IDLE_FRAME_TICKS {
                self.idle_counter = 0;
                self.frame = (self.frame + 1) % DANCE_FRAMES;
            }
        }
    }

    fn set_dance(&mut self, dance: Dance) {
        self.dance = dance;
        self.frame = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_typing_picks_a_dance() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut dancer = Dancer::default();
        dancer.on_input(true, false, 0.0, &mut rng);
        assert!(matches!(dancer.dance, Dance::Hips | Dance::Snap));
        dancer.on_input(false, true, 10.0, &mut rng);
        assert_eq!(dancer.dance, Dance::Balancing);
    }

    #[test]
    fn test_hurt_counts_down_then_recovers() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut dancer = Dancer::default();
        dancer.hurt(48, &mut rng);
        assert_eq!(dancer.dance, Dance::Skip);

        for _ in 0..47 {
            dancer.advance(false, 0.0, &mut rng);
            assert!(dancer.is_hurt());
            assert!(dancer.frame < DANCE_FRAMES);
        }
        dancer.advance(false, 0.0, &mut rng);
        assert!(!dancer.is_hurt());
        assert_eq!(dancer.dance, Dance::Balancing);
    }

    #[test]
    fn test_completion_does_not_interrupt_hurt() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut dancer = Dancer::default();
        dancer.hurt(10, &mut rng);
        dancer.on_word_completed();
        assert_eq!(dancer.dance, Dance::Skip);
    }

    #[test]
    fn test_idle_animation_is_slow() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut dancer = Dancer::default();
        for _ in 0..IDLE_FRAME_TICKS - 1 {
            dancer.advance(false, 0.0, &mut rng);
        }
        assert_eq!(dancer.frame, 0);
        dancer.advance(false, 0.0, &mut rng);
        assert_eq!(dancer.frame, 1);
    }
}
