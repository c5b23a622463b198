//! Game state and core simulation types
//!
//! The session owns exactly one `GameState`; nothing else holds references
//! into it between calls.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::dancer::Dancer;
use crate::audio::SoundCue;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not started yet
    Idle,
    /// Active gameplay
    Running,
    /// Out of lives, waiting for the hurt animation to finish
    PendingTermination,
    /// Run ended; no further ticks
    Terminated,
}

impl GamePhase {
    /// True while frames should keep being scheduled
    pub fn is_live(&self) -> bool {
        matches!(self, GamePhase::Running | GamePhase::PendingTermination)
    }
}

/// Walking direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Right,
    Left,
    Down,
    Up,
}

impl Facing {
    /// Classify a movement delta by its dominant axis (screen coordinates, +y is down)
    pub fn from_delta(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 { Facing::Right } else { Facing::Left }
        } else if delta.y > 0.0 {
            Facing::Down
        } else {
            Facing::Up
        }
    }

    /// Unit vector pointing the way the enemy walks
    pub fn unit(&self) -> Vec2 {
        match self {
            Facing::Right => Vec2::X,
            Facing::Left => Vec2::NEG_X,
            Facing::Down => Vec2::Y,
            Facing::Up => Vec2::NEG_Y,
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub word: String,
    pub pos: Vec2,
    /// Pixels per reference frame
    pub speed: f32,
    pub radius: f32,
    /// Frozen enemies do not move
    pub frozen: bool,
    /// Ticks until the enemy explodes; `Some` means it is already dead in gameplay terms
    pub death_timer: Option<u32>,
    /// Pre-selected for detonation during freeze mode
    pub marked_for_freeze: bool,
    /// Carries the freeze word
    pub has_superpower: bool,
    pub facing: Facing,
    /// Walk cycle counter (0..WALK_CYCLE_TICKS)
    pub animation_frame: u32,
}

impl Enemy {
    /// Has a running death timer
    #[inline]
    pub fn is_dying(&self) -> bool {
        self.death_timer.is_some()
    }

    /// Can still be typed, marked or collide
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.is_dying()
    }

    /// Step of the 4-pose walk cycle
    pub fn sprite_index(&self) -> u32 {
        (self.animation_frame / 8) % 4
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    pub color: u32, // Index into the fire palette
    pub life: f32,  // 0-1, decreases over time
    pub max_life: f32,
    pub size: f32,
}

impl Particle {
    /// Opacity for rendering
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Which flame sprite a fire effect shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireStage {
    Spark,
    Blaze,
    Inferno,
}

impl FireStage {
    /// Draw scale for this stage's sprite
    pub fn scale(&self) -> f32 {
        match self {
            FireStage::Spark => 0.4,
            FireStage::Blaze => 0.6,
            FireStage::Inferno => 0.8,
        }
    }
}

/// Explosion left behind by a destroyed enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireEffect {
    pub pos: Vec2,
    pub frame: u32,
    pub max_frame: u32,
}

impl FireEffect {
    pub fn stage(&self) -> FireStage {
        match self.frame {
            0..10 => FireStage::Spark,
            10..25 => FireStage::Blaze,
            _ => FireStage::Inferno,
        }
    }
}

/// Freeze superpower mode
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum FreezeMode {
    #[default]
    Inactive,
    /// Wall-clock start of the episode (ms)
    Active { started_at: f64 },
}

impl FreezeMode {
    pub fn is_active(&self) -> bool {
        matches!(self, FreezeMode::Active { .. })
    }
}

/// Banner flavour, decides its color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerKind {
    Freeze,
    Kill,
    Combo,
}

/// Text shown for a limited wall-clock time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedText {
    pub text: String,
    pub shown_at: f64,
}

impl TimedText {
    pub fn new(text: impl Into<String>, shown_at: f64) -> Self {
        Self {
            text: text.into(),
            shown_at,
        }
    }

    /// Progress through the display window (0 = just shown, 1 = gone), `None` once expired
    pub fn progress(&self, now_ms: f64, duration_ms: f64) -> Option<f32> {
        let elapsed = now_ms - self.shown_at;
        if duration_ms <= 0.0 || !(0.0..duration_ms).contains(&elapsed) {
            return None;
        }
        Some((elapsed / duration_ms) as f32)
    }
}

/// Streak / freeze / combo message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: TimedText,
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Play a sound cue
    Sound(SoundCue),
    /// The core emptied the input buffer; the text box should follow
    InputCleared,
    /// Nothing matched a buffer of this text
    WrongInput { text: String },
    /// A batch of enemies was killed by completing a word
    Kill { word: String, count: usize, combo: u32 },
    /// An enemy's death timer ran out
    EnemyDestroyed { id: u32, pos: Vec2 },
    LifeLost { lives: u8 },
    LevelUp { level: u32 },
    FreezeStarted { destroyed: usize },
    FreezeEnded { early: bool, detonated: usize },
    GameOver { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Balance constants
    pub tuning: Tuning,
    /// Player preferences (particles, shake)
    pub settings: Settings,
    /// Run seed for reproducibility
    pub seed: u64,
    /// Seeded RNG for spawns and cosmetics
    pub rng: Pcg32,

    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    /// Consecutive kills inside the combo window
    pub combo: u32,
    /// Combo decay anchor (ms)
    pub last_kill_at: Option<f64>,
    pub freeze: FreezeMode,

    /// Lowercased in-progress keystrokes
    pub current_input: String,
    /// Enemy the current input is a prefix of
    pub targeted: Option<u32>,

    /// Active enemies (insertion order)
    pub enemies: Vec<Enemy>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub fire_effects: Vec<FireEffect>,

    pub spawn_interval_ms: f64,
    pub last_spawn_at: f64,

    pub banner: Option<Banner>,
    pub completed_word: Option<TimedText>,
    pub wrong_input: Option<TimedText>,
    /// 0-1 shake intensity, decays every tick
    pub screen_shake: f32,

    /// The character being defended
    pub dancer: Dancer,

    // WPM bookkeeping
    pub words_completed: u32,
    pub first_word_at: Option<f64>,

    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,

    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create an idle game state with the given seed
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            score: 0,
            lives: tuning.starting_lives,
            level: 1,
            combo: 0,
            last_kill_at: None,
            freeze: FreezeMode::Inactive,
            current_input: String::new(),
            targeted: None,
            enemies: Vec::new(),
            particles: Vec::new(),
            fire_effects: Vec::new(),
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            last_spawn_at: 0.0,
            banner: None,
            completed_word: None,
            wrong_input: None,
            screen_shake: 0.0,
            dancer: Dancer::default(),
            words_completed: 0,
            first_word_at: None,
            time_ticks: 0,
            events: Vec::new(),
            next_id: 0,
            tuning,
            settings,
        }
    }

    /// Reset every gameplay field to its initial value and mark the run as started.
    /// The RNG keeps its stream so restarts differ.
    pub fn reset(&mut self, now_ms: f64) {
        let rng = self.rng.clone();
        let fresh = Self::new(self.seed, self.tuning.clone(), self.settings.clone());
        *self = Self { rng, ..fresh };
        self.last_spawn_at = now_ms;
        self.phase = GamePhase::Running;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an enemy with `word` at `pos`, using the current level's speed.
    /// Returns its id. Enemies arriving mid-freeze start frozen.
    pub fn push_enemy(&mut self, word: &str, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let has_superpower = crate::words::is_freeze_word(word);
        self.enemies.push(Enemy {
            id,
            word: word.to_lowercase(),
            pos,
            speed: self.tuning.speed_for_level(self.level),
            radius: self.tuning.enemy_radius,
            frozen: self.freeze.is_active(),
            death_timer: None,
            marked_for_freeze: false,
            has_superpower,
            facing: Facing::from_delta(self.tuning.center() - pos),
            animation_frame: 0,
        });
        id
    }

    /// Enemies that can still be typed or collide
    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_live())
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn is_freeze_active(&self) -> bool {
        self.freeze.is_active()
    }

    /// Queue an event for the presentation layer
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Queue a sound cue
    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Show a banner starting at `now_ms`
    pub fn show_banner(&mut self, kind: BannerKind, text: impl Into<String>, now_ms: f64) {
        self.banner = Some(Banner {
            kind,
            message: TimedText::new(text, now_ms),
        });
    }

    /// Empty the input buffer and drop the highlight
    pub fn clear_input(&mut self) {
        self.current_input.clear();
        self.targeted = None;
        self.emit(GameEvent::InputCleared);
    }

    /// Count a typed word for WPM and show it above the character
    pub fn record_completed_word(&mut self, word: &str, now_ms: f64) {
        self.first_word_at.get_or_insert(now_ms);
        self.words_completed += 1;
        self.completed_word = Some(TimedText::new(word, now_ms));
    }

    /// Words per minute since the first completed word
    pub fn wpm(&self, now_ms: f64) -> u32 {
        let Some(first) = self.first_word_at else {
            return 0;
        };
        let minutes = (now_ms - first) / 60_000.0;
        if minutes <= 0.0 {
            return 0;
        }
        (f64::from(self.words_completed) / minutes).round() as u32
    }

    /// Bump shake intensity (no-op when disabled in settings)
    pub fn shake(&mut self, amount: f32) {
        if self.settings.effective_screen_shake() {
            self.screen_shake = (self.screen_shake + amount).min(1.0);
        }
    }
}
