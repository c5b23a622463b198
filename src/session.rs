//! Game session
//!
//! Owns the single `GameState` and the collaborators that present it. Drivers
//! call `on_input` for every text box change and `frame` once per display
//! refresh; both take the wall-clock time explicitly.

use crate::audio::{AudioSink, NullAudio};
use crate::hud::Hud;
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Events kept for `take_events`; older ones are dropped past this
pub const MAX_PENDING_EVENTS: usize = 256;

/// Draws the current state. Receives a shared borrow only.
pub trait Renderer {
    fn render(&mut self, state: &GameState, now_ms: f64);
}

/// Whether the driver should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Halt,
}

pub struct Session {
    state: GameState,
    audio: Box<dyn AudioSink>,
    renderer: Option<Box<dyn Renderer>>,
    /// Drained core events, waiting for `take_events` (newest `MAX_PENDING_EVENTS`)
    pending: Vec<GameEvent>,
}

impl Session {
    /// Idle session with silent audio and no renderer
    pub fn new(seed: u64, tuning: Tuning, settings: Settings) -> Self {
        Self {
            state: GameState::new(seed, tuning, settings),
            audio: Box::new(NullAudio),
            renderer: None,
            pending: Vec::new(),
        }
    }

    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Reset everything and put the first enemy on the board
    pub fn start(&mut self, now_ms: f64) {
        self.state.reset(now_ms);
        self.pending.clear();
        sim::spawn_enemy(&mut self.state);
        log::info!("Session started (seed {})", self.state.seed);
        self.dispatch_events();
    }

    /// Halt the run and return the final score
    pub fn stop(&mut self) -> u64 {
        if self.state.phase != GamePhase::Terminated {
            self.state.phase = GamePhase::Terminated;
            log::info!("Session stopped: score {}", self.state.score);
        }
        self.state.score
    }

    /// The text box changed to `buffer`
    pub fn on_input(&mut self, buffer: &str, now_ms: f64) {
        sim::handle_input(&mut self.state, buffer, now_ms);
        self.dispatch_events();
    }

    /// One display refresh, `dt` seconds after the previous one
    pub fn frame(&mut self, now_ms: f64, dt: f32) -> LoopControl {
        if !self.state.phase.is_live() {
            return LoopControl::Halt;
        }

        sim::tick(&mut self.state, now_ms, dt);
        self.dispatch_events();

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.state, now_ms);
        }

        if self.state.phase.is_live() {
            LoopControl::Continue
        } else {
            LoopControl::Halt
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutable access for drivers that set up scenarios
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// HUD view model at `now_ms`
    pub fn hud(&self, now_ms: f64) -> Hud {
        Hud::from_state(&self.state, now_ms)
    }

    /// Events produced since the last call, oldest first. Drivers that never
    /// call this only see the newest `MAX_PENDING_EVENTS`.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Play queued sounds and keep every event for `take_events`
    fn dispatch_events(&mut self) {
        let volume = self.state.settings.effective_volume();
        for event in self.state.events.drain(..) {
            if let GameEvent::Sound(cue) = &event {
                if volume > 0.0 {
                    self.audio.play(*cue, cue.base_volume() * volume);
                }
            }
            self.pending.push(event);
        }
        if self.pending.len() > MAX_PENDING_EVENTS {
            let overflow = self.pending.len() - MAX_PENDING_EVENTS;
            self.pending.drain(..overflow);
        }
    }
}
