//! Type Siege entry point
//!
//! In the browser this wires the text box, the animation loop, the HUD and the
//! audio to a `Session`. Natively it runs a headless demo with a bot typist.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement};

    use type_siege::audio::HtmlAudio;
    use type_siege::consts::FRAME_DT;
    use type_siege::hud::{Caption, EnemyTint, Hud, split_word};
    use type_siege::sim::{BannerKind, GameEvent, GamePhase, GameState};
    use type_siege::{LoopControl, Renderer, Session, Settings, Tuning};

    const FIRE_COLORS: [&str; 4] = ["#ff4d00", "#ff9500", "#ffd000", "#fff1a8"];

    /// Draws the board with plain 2D canvas shapes
    struct CanvasRenderer {
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
    }

    impl CanvasRenderer {
        fn enemy_color(tint: EnemyTint) -> &'static str {
            match tint {
                EnemyTint::Normal => "#a0522d",
                EnemyTint::Marked => "#ff4d4d",
                EnemyTint::Superpower => "#4db8ff",
                EnemyTint::Frozen => "#f0f0f0",
            }
        }

        fn circle(&self, x: f64, y: f64, r: f64, color: &str) {
            self.ctx.set_fill_style_str(color);
            self.ctx.begin_path();
            if self.ctx.arc(x, y, r, 0.0, TAU).is_ok() {
                self.ctx.fill();
            }
        }
    }

    impl Renderer for CanvasRenderer {
        fn render(&mut self, state: &GameState, _now_ms: f64) {
            let ctx = &self.ctx;
            ctx.clear_rect(0.0, 0.0, self.width, self.height);
            ctx.save();
            if state.screen_shake > 0.0 {
                let amount = f64::from(state.screen_shake) * 8.0;
                let phase = state.time_ticks as f64;
                let _ = ctx.translate(phase.sin() * amount, (phase * 1.3).cos() * amount);
            }

            let center = state.tuning.center();
            let dancer_color = if state.dancer.is_hurt() { "#ff4d4d" } else { "#4ecca3" };
            self.circle(
                f64::from(center.x),
                f64::from(center.y),
                f64::from(state.tuning.center_radius) * 0.5,
                dancer_color,
            );

            for fire in &state.fire_effects {
                let size = f64::from(fire.stage().scale()) * 60.0;
                let fade = 1.0 - f64::from(fire.frame) / f64::from(fire.max_frame.max(1));
                ctx.set_global_alpha(fade);
                self.circle(f64::from(fire.pos.x), f64::from(fire.pos.y), size, FIRE_COLORS[1]);
            }
            ctx.set_global_alpha(1.0);

            ctx.set_font("bold 16px sans-serif");
            ctx.set_text_align("center");
            for enemy in &state.enemies {
                // Bob with the walk pose; the eye looks where the enemy walks
                let bob = [0.0, -2.0, 0.0, 2.0][enemy.sprite_index() as usize % 4];
                let (x, y) = (f64::from(enemy.pos.x), f64::from(enemy.pos.y) + bob);
                let body = f64::from(enemy.radius) * 0.6;
                self.circle(x, y, body, Self::enemy_color(EnemyTint::of(enemy)));
                let look = enemy.facing.unit();
                let eye_x = x + f64::from(look.x) * body * 0.5;
                let eye_y = y + f64::from(look.y) * body * 0.5;
                self.circle(eye_x, eye_y, body * 0.2, "#111111");
                if enemy.is_dying() {
                    continue;
                }
                let split = split_word(state, enemy);
                let label_y = y - f64::from(enemy.radius) - 10.0;
                let typed_w = ctx.measure_text(split.typed).map(|m| m.width()).unwrap_or(0.0);
                let rest_w = ctx.measure_text(split.rest).map(|m| m.width()).unwrap_or(0.0);
                let left = x - (typed_w + rest_w) / 2.0;
                ctx.set_text_align("left");
                ctx.set_fill_style_str("#4ecca3");
                let _ = ctx.fill_text(split.typed, left, label_y);
                ctx.set_fill_style_str("#ffffff");
                let _ = ctx.fill_text(split.rest, left + typed_w, label_y);
                ctx.set_text_align("center");
            }

            for particle in &state.particles {
                ctx.set_global_alpha(f64::from(particle.alpha()));
                let color = FIRE_COLORS[particle.color as usize % FIRE_COLORS.len()];
                self.circle(
                    f64::from(particle.pos.x),
                    f64::from(particle.pos.y),
                    f64::from(particle.size),
                    color,
                );
            }
            ctx.set_global_alpha(1.0);
            ctx.restore();
        }
    }

    struct Game {
        session: Session,
        input: HtmlInputElement,
        last_frame: f64,
        /// Pending requestAnimationFrame handle
        raf_id: Option<i32>,
    }

    impl Game {
        /// Clear the text box when the core cleared its buffer
        fn sync_events(&mut self) {
            for event in self.session.take_events() {
                match event {
                    GameEvent::InputCleared => self.input.set_value(""),
                    GameEvent::GameOver { score } => log::info!("Final score: {score}"),
                    GameEvent::Sound(_) => {}
                    other => log::debug!("{other:?}"),
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn update_hud(document: &Document, hud: &Hud) {
        set_text(document, "score", &hud.score.to_string());
        set_text(document, "level", &hud.level.to_string());
        set_text(document, "lives", &hud.hearts);
        set_text(document, "wpm", &hud.wpm.to_string());
        set_text(
            document,
            "combo",
            &hud.combo.map(|c| format!("{c}x COMBO")).unwrap_or_default(),
        );

        if let Some(el) = document.get_element_by_id("banner") {
            match &hud.banner {
                Some(banner) => {
                    el.set_text_content(Some(&banner.text));
                    let class = match banner.kind {
                        BannerKind::Freeze => "banner freeze",
                        BannerKind::Kill => "banner kill",
                        BannerKind::Combo => "banner combo",
                    };
                    let _ = el.set_attribute("class", class);
                    let _ = el.set_attribute(
                        "style",
                        &format!("opacity: {}; transform: scale({})", banner.alpha, banner.scale),
                    );
                }
                None => {
                    el.set_text_content(None);
                    let _ = el.set_attribute("class", "banner hidden");
                }
            }
        }

        let (caption, class) = match &hud.caption {
            Some(Caption::Wrong { text }) => (text.clone(), "caption wrong"),
            Some(Caption::Typing { text }) => (text.clone(), "caption typing"),
            Some(Caption::Completed { word, .. }) => (word.clone(), "caption completed"),
            None => (String::new(), "caption"),
        };
        set_text(document, "caption", &caption);
        if let Some(el) = document.get_element_by_id("caption") {
            let _ = el.set_attribute("class", class);
        }

        let over = hud.phase == GamePhase::Terminated;
        set_hidden(document, "game-over", !over);
        if over {
            set_text(document, "final-score", &hud.score.to_string());
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let next = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(next, time);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => game.borrow_mut().raf_id = Some(id),
            Err(_) => log::warn!("requestAnimationFrame failed"),
        }
        closure.forget();
    }

    fn cancel_animation_frame(game: &Rc<RefCell<Game>>) {
        let Some(id) = game.borrow_mut().raf_id.take() else { return };
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let control = {
            let mut g = game.borrow_mut();
            g.raf_id = None;
            let dt = if g.last_frame > 0.0 {
                ((time - g.last_frame) / 1000.0) as f32
            } else {
                FRAME_DT
            };
            g.last_frame = time;

            let now = js_sys::Date::now();
            let control = g.session.frame(now, dt);
            g.sync_events();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                update_hud(&document, &g.session.hud(now));
            }
            control
        };

        if control == LoopControl::Continue {
            request_animation_frame(game);
        }
    }

    fn start_game(game: &Rc<RefCell<Game>>) {
        cancel_animation_frame(game);
        {
            let mut g = game.borrow_mut();
            g.session.start(js_sys::Date::now());
            g.last_frame = 0.0;
            g.input.set_value("");
            let _ = g.input.focus();
            g.sync_events();
        }
        request_animation_frame(game.clone());
    }

    fn setup_input(document: &Document, game: Rc<RefCell<Game>>) {
        let input = game.borrow().input.clone();
        {
            let game = game.clone();
            let reader = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.session.on_input(&reader.value(), js_sys::Date::now());
                g.sync_events();
            });
            let _ = input
                .add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                start_game(&game);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Escape ends the run
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            if event.key() == "Escape" {
                cancel_animation_frame(&game);
                let score = game.borrow_mut().session.stop();
                log::info!("Stopped with score {score}");
            }
        });
        let _ = document
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Type Siege starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let input: HtmlInputElement = document
            .get_element_by_id("type-input")
            .ok_or("missing #type-input")?
            .dyn_into()?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("missing #canvas")?
            .dyn_into()?;

        let tuning = Tuning::default();
        canvas.set_width(tuning.viewport_width as u32);
        canvas.set_height(tuning.viewport_height as u32);
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;
        let renderer = CanvasRenderer {
            ctx,
            width: f64::from(tuning.viewport_width),
            height: f64::from(tuning.viewport_height),
        };

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(seed, tuning, Settings::default())
            .with_audio(HtmlAudio::new("sounds"))
            .with_renderer(renderer);

        let game = Rc::new(RefCell::new(Game {
            session,
            input,
            last_frame: 0.0,
            raf_id: None,
        }));

        set_hidden(&document, "loading", true);
        setup_input(&document, game.clone());
        start_game(&game);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use type_siege::consts::FRAME_DT;
    use type_siege::sim::{GameEvent, GameState};
    use type_siege::words::is_freeze_word;
    use type_siege::{LoopControl, Session, Settings, Tuning};

    /// Frames between keystrokes (about 80 wpm at 60 fps)
    const KEYSTROKE_FRAMES: u32 = 4;
    /// Chance of hitting a wrong key
    const TYPO_CHANCE: f64 = 0.03;

    /// Bot typist: picks the most urgent word and types it one key at a time
    struct Typist {
        rng: Pcg32,
        buffer: String,
        target: Option<String>,
        /// Characters of `target` typed so far
        progress: usize,
        cooldown: u32,
    }

    impl Typist {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
                buffer: String::new(),
                target: None,
                progress: 0,
                cooldown: KEYSTROKE_FRAMES,
            }
        }

        /// Freeze carriers first; during freeze, the nearest unmarked word;
        /// otherwise whatever is closest to the center
        fn pick_target(state: &GameState) -> Option<String> {
            if !state.is_freeze_active() {
                let carrier = state.live_enemies().find(|e| is_freeze_word(&e.word));
                if let Some(carrier) = carrier {
                    return Some(carrier.word.clone());
                }
            }
            let center = state.tuning.center();
            state
                .live_enemies()
                .filter(|e| !is_freeze_word(&e.word) && !e.marked_for_freeze)
                .min_by(|a, b| a.pos.distance(center).total_cmp(&b.pos.distance(center)))
                .map(|e| e.word.clone())
        }

        /// Next buffer value, if a key is pressed this frame
        fn keystroke(&mut self, state: &GameState) -> Option<String> {
            self.cooldown = self.cooldown.saturating_sub(1);
            if self.cooldown > 0 {
                return None;
            }
            self.cooldown = KEYSTROKE_FRAMES;

            let still_there = self
                .target
                .as_ref()
                .is_some_and(|w| state.live_enemies().any(|e| &e.word == w));
            if !still_there {
                self.target = Self::pick_target(state);
                self.progress = 0;
            }
            let target = self.target.as_ref()?;

            // After a typo the word starts over; suffix matching drops the garbage
            if self.rng.random_bool(TYPO_CHANCE) {
                self.buffer.push('q');
                self.progress = 0;
            } else {
                let next = target.chars().nth(self.progress)?;
                self.buffer.push(next);
                self.progress += 1;
            }
            Some(self.buffer.clone())
        }

        fn on_cleared(&mut self) {
            self.buffer.clear();
            self.target = None;
            self.progress = 0;
        }
    }

    pub fn run(seconds: u32, seed: u64, tuning: Tuning) {
        log::info!("Type Siege (native demo) starting: {seconds}s, seed {seed}");

        let mut session = Session::new(seed, tuning, Settings::default());
        let mut typist = Typist::new(seed);
        let frame_ms = f64::from(FRAME_DT) * 1000.0;
        let mut now = 0.0;
        session.start(now);

        let frames = seconds * 60;
        for _ in 0..frames {
            now += frame_ms;
            if let Some(buffer) = typist.keystroke(session.state()) {
                session.on_input(&buffer, now);
            }
            let control = session.frame(now, FRAME_DT);

            for event in session.take_events() {
                match event {
                    GameEvent::InputCleared => typist.on_cleared(),
                    GameEvent::Sound(cue) => log::trace!("sound {}", cue.key()),
                    GameEvent::Kill { word, count, combo } => {
                        log::info!("{count}x {word} (combo {combo})")
                    }
                    GameEvent::GameOver { score } => log::info!("Game over with {score} points"),
                    other => log::debug!("{other:?}"),
                }
            }

            if control == LoopControl::Halt {
                break;
            }
        }

        let score = session.stop();
        let hud = session.hud(now);
        match serde_json::to_string_pretty(&hud) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("Failed to serialize HUD: {e}"),
        }
        println!("Final score: {score}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(60);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let tuning = match args.next() {
        Some(path) => load_tuning(&path),
        None => type_siege::Tuning::default(),
    };
    demo::run(seconds, seed, tuning);
}

/// Balance overrides from a JSON file; falls back to the defaults on any error
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> type_siege::Tuning {
    let loaded = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| type_siege::Tuning::from_json(&json).map_err(|e| e.to_string()));
    match loaded {
        Ok(tuning) => {
            log::info!("Loaded tuning from {path}");
            tuning
        }
        Err(e) => {
            log::warn!("Ignoring tuning file {path}: {e}");
            type_siege::Tuning::default()
        }
    }
}
