//! Simulation step
//!
//! Advances the game by one display frame. Movement and particle physics are
//! expressed per reference frame and scaled by `dt`; death timers, hurt,
//! fire and walk animations count calls.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::combat;
use super::freeze;
use super::spawn;
use super::state::{Facing, FireEffect, GameEvent, GamePhase, GameState, Particle};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::{bearing, frame_scale};

/// Advance the game state by one frame at wall-clock `now_ms`, `dt` seconds after the last
pub fn tick(state: &mut GameState, now_ms: f64, dt: f32) {
    if !state.phase.is_live() {
        return;
    }
    state.time_ticks += 1;
    let scale = frame_scale(dt);

    // Decay screen shake
    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    if state.phase == GamePhase::Running {
        spawn::spawn_if_due(state, now_ms);
        decay_combo(state, now_ms);
        freeze::expire_if_due(state, now_ms);
        update_enemies(state, scale);
    }

    update_particles(state, scale);
    update_fire_effects(state);

    let typing = !state.current_input.is_empty();
    state.dancer.advance(typing, now_ms, &mut state.rng);

    if state.phase == GamePhase::PendingTermination && !state.dancer.is_hurt() {
        state.phase = GamePhase::Terminated;
        log::info!("Game over: score {}, level {}", state.score, state.level);
        state.emit(GameEvent::GameOver { score: state.score });
    }

    prune_timed_texts(state, now_ms);
}

/// The combo survives a gap only inside the window; freeze holds it
fn decay_combo(state: &mut GameState, now_ms: f64) {
    if state.is_freeze_active() || state.combo == 0 {
        return;
    }
    let timeout = state.tuning.combo_timeout_ms;
    if state.last_kill_at.is_some_and(|last| now_ms - last > timeout) {
        state.combo = 0;
    }
}

/// One pass over the enemies, then compaction
fn update_enemies(state: &mut GameState, scale: f32) {
    let center = state.tuning.center();
    let mut keep = vec![true; state.enemies.len()];

    for idx in 0..state.enemies.len() {
        let enemy = &mut state.enemies[idx];

        if enemy.frozen {
            let Some(timer) = enemy.death_timer else {
                continue;
            };
            let timer = timer.saturating_sub(1);
            enemy.death_timer = Some(timer);
            if timer == 0 {
                keep[idx] = false;
                let (id, pos) = (enemy.id, enemy.pos);
                explode(state, pos);
                state.emit(GameEvent::EnemyDestroyed { id, pos });
                combat::check_level_up(state);
            }
            continue;
        }

        // Out of lives: the rest of the board stops where it is
        if state.phase != GamePhase::Running {
            continue;
        }

        let (dir, distance) = bearing(enemy.pos, center);
        if distance > 1.0 {
            enemy.pos += dir * enemy.speed * scale;
            enemy.facing = Facing::from_delta(center - enemy.pos);
            enemy.animation_frame = (enemy.animation_frame + 1) % WALK_CYCLE_TICKS;
        }

        if distance < state.tuning.hit_distance(enemy.radius) {
            keep[idx] = false;
            let id = enemy.id;
            hit_center(state, id);
        }
    }

    let mut flags = keep.into_iter();
    state.enemies.retain(|_| flags.next().unwrap_or(true));

    spawn::ensure_not_empty(state);
}

/// An enemy reached the center
fn hit_center(state: &mut GameState, id: u32) {
    state.lives = state.lives.saturating_sub(1);
    let duration = state.tuning.hurt_duration_ticks;
    state.dancer.hurt(duration, &mut state.rng);
    state.shake(1.0);
    log::debug!("Enemy {id} reached the center, {} lives left", state.lives);
    state.emit(GameEvent::LifeLost { lives: state.lives });

    if state.lives == 0 && state.phase == GamePhase::Running {
        state.phase = GamePhase::PendingTermination;
        log::info!("Out of lives, waiting for the hurt animation");
    }
}

/// Fire effect, particle burst and sound for an expired death timer
fn explode(state: &mut GameState, pos: Vec2) {
    state.fire_effects.push(FireEffect {
        pos,
        frame: 0,
        max_frame: state.tuning.fire_max_frame,
    });
    state.play(SoundCue::Explosion);

    let cap = state.settings.max_particles();
    if cap == 0 {
        return;
    }
    for _ in 0..EXPLOSION_PARTICLES {
        let angle = state.rng.random_range(0.0..TAU);
        let speed: f32 = state.rng.random_range(1.0..4.0);
        let life: f32 = state.rng.random_range(0.6..1.0);
        state.particles.push(Particle {
            pos,
            vel: Vec2::from_angle(angle) * speed - Vec2::new(0.0, 1.5),
            color: state.rng.random_range(0..4),
            life,
            max_life: life,
            size: state.rng.random_range(2.0_f32..5.0),
        });
    }
    // Drop the oldest beyond the cap
    let overflow = state.particles.len().saturating_sub(cap);
    state.particles.drain(..overflow);
}

fn update_particles(state: &mut GameState, scale: f32) {
    let friction = 0.98_f32.powf(scale);
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * scale;
        particle.vel.y += 0.15 * scale;
        particle.vel *= friction;
        particle.life -= 0.02 * scale;
    }
    state.particles.retain(|p| p.life > 0.0);
}

fn update_fire_effects(state: &mut GameState) {
    for fire in state.fire_effects.iter_mut() {
        fire.frame += 1;
    }
    state.fire_effects.retain(|f| f.frame < f.max_frame);
}

fn prune_timed_texts(state: &mut GameState, now_ms: f64) {
    let tuning = &state.tuning;
    if state
        .banner
        .as_ref()
        .is_some_and(|b| b.message.progress(now_ms, tuning.banner_duration_ms).is_none())
    {
        state.banner = None;
    }
    if state
        .completed_word
        .as_ref()
        .is_some_and(|t| t.progress(now_ms, tuning.completed_word_duration_ms).is_none())
    {
        state.completed_word = None;
    }
    if state
        .wrong_input
        .as_ref()
        .is_some_and(|t| t.progress(now_ms, tuning.wrong_input_duration_ms).is_none())
    {
        state.wrong_input = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::tuning::Tuning;

    fn running() -> GameState {
        let mut state = GameState::new(9, Tuning::default(), Settings::default());
        state.reset(0.0);
        state
    }

    #[test]
    fn test_empty_board_spawns_exactly_one() {
        let mut state = running();
        tick(&mut state, 16.0, FRAME_DT);
        assert_eq!(state.enemies.len(), 1);
        tick(&mut state, 32.0, FRAME_DT);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_idle_and_terminated_do_nothing() {
        let mut state = GameState::new(9, Tuning::default(), Settings::default());
        tick(&mut state, 10_000.0, FRAME_DT);
        assert_eq!(state.time_ticks, 0);
        assert!(state.enemies.is_empty());

        state.phase = GamePhase::Terminated;
        tick(&mut state, 20_000.0, FRAME_DT);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_movement_scales_with_dt() {
        let mut a = running();
        let mut b = running();
        for state in [&mut a, &mut b] {
            state.push_enemy("cat", Vec2::new(-50.0, 360.0));
        }
        tick(&mut a, 16.0, FRAME_DT);
        tick(&mut b, 16.0, FRAME_DT * 2.0);
        let speed = a.enemies[0].speed;
        assert!((a.enemies[0].pos.x - (-50.0 + speed)).abs() < 1e-3);
        assert!((b.enemies[0].pos.x - (-50.0 + 2.0 * speed)).abs() < 1e-3);
        assert_eq!(a.enemies[0].facing, Facing::Right);
        assert_eq!(a.enemies[0].animation_frame, 1);
    }

    #[test]
    fn test_frozen_enemies_stay_put() {
        let mut state = running();
        state.push_enemy("cat", Vec2::new(-50.0, 360.0));
        state.enemies[0].frozen = true;
        tick(&mut state, 16.0, FRAME_DT);
        assert_eq!(state.enemies[0].pos, Vec2::new(-50.0, 360.0));
    }

    #[test]
    fn test_death_timer_explodes() {
        let mut state = running();
        state.push_enemy("cat", Vec2::new(-50.0, 360.0));
        state.push_enemy("paw", Vec2::new(-50.0, 100.0));
        state.enemies[0].frozen = true;
        state.enemies[0].death_timer = Some(2);

        tick(&mut state, 1.0, FRAME_DT);
        assert_eq!(state.enemies.len(), 2);
        tick(&mut state, 2.0, FRAME_DT);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].word, "paw");
        assert_eq!(state.fire_effects.len(), 1);
        assert_eq!(state.particles.len(), EXPLOSION_PARTICLES);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::Explosion)));
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::EnemyDestroyed { id: 0, .. }))
        );
    }

    #[test]
    fn test_explosion_respects_particle_setting() {
        let mut state = GameState::new(
            9,
            Tuning::default(),
            Settings::from_preset(crate::settings::QualityPreset::Low),
        );
        state.reset(0.0);
        state.push_enemy("cat", Vec2::ZERO);
        state.enemies[0].frozen = true;
        state.enemies[0].death_timer = Some(0);
        tick(&mut state, 1.0, FRAME_DT);
        assert!(state.particles.is_empty());
        assert_eq!(state.fire_effects.len(), 1);
    }

    #[test]
    fn test_level_up_on_explosion() {
        let mut state = running();
        state.score = 50;
        state.push_enemy("cat", Vec2::ZERO);
        state.enemies[0].frozen = true;
        state.enemies[0].death_timer = Some(1);
        tick(&mut state, 1.0, FRAME_DT);
        assert_eq!(state.level, 2);
        assert_eq!(state.spawn_interval_ms, 1_050.0);
    }

    #[test]
    fn test_collision_costs_a_life() {
        let mut state = running();
        let center = state.tuning.center();
        state.push_enemy("cat", center - Vec2::new(100.0, 0.0));
        tick(&mut state, 1.0, FRAME_DT);
        assert_eq!(state.lives, 2);
        assert!(state.dancer.is_hurt());
        assert!(state.screen_shake > 0.0);
        assert!(state.events.contains(&GameEvent::LifeLost { lives: 2 }));
        // Replaced by a forced spawn
        assert_eq!(state.enemies.len(), 1);
        assert_ne!(state.enemies[0].id, 0);
    }

    #[test]
    fn test_pending_termination_waits_for_hurt() {
        let mut state = running();
        state.lives = 1;
        let center = state.tuning.center();
        state.push_enemy("cat", center);
        tick(&mut state, 1.0, FRAME_DT);
        assert_eq!(state.phase, GamePhase::PendingTermination);
        assert_eq!(state.lives, 0);
        assert!(state.enemies.is_empty(), "no forced spawn once the run is over");

        let hurt = state.tuning.hurt_duration_ticks;
        for i in 1..hurt - 1 {
            tick(&mut state, 1.0 + i as f64, FRAME_DT);
            assert_eq!(state.phase, GamePhase::PendingTermination);
        }
        tick(&mut state, 100.0, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Terminated);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0 }));
    }

    #[test]
    fn test_combo_decays_outside_freeze() {
        let mut state = running();
        state.push_enemy("cat", Vec2::new(-50.0, 0.0));
        state.combo = 3;
        state.last_kill_at = Some(0.0);
        tick(&mut state, 2_000.0, FRAME_DT);
        assert_eq!(state.combo, 3);
        tick(&mut state, 2_001.0, FRAME_DT);
        assert_eq!(state.combo, 0);

        state.combo = 3;
        state.freeze = crate::sim::state::FreezeMode::Active { started_at: 2_500.0 };
        tick(&mut state, 4_800.0, FRAME_DT);
        assert_eq!(state.combo, 3);
    }

    #[test]
    fn test_particles_and_fire_expire() {
        let mut state = running();
        state.particles.push(Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, 0.0),
            color: 0,
            life: 0.03,
            max_life: 1.0,
            size: 3.0,
        });
        state.fire_effects.push(FireEffect {
            pos: Vec2::ZERO,
            frame: 43,
            max_frame: 45,
        });
        tick(&mut state, 1.0, FRAME_DT);
        assert_eq!(state.particles.len(), 1);
        assert!(state.particles[0].vel.y > 0.0, "gravity pulls down");
        assert_eq!(state.fire_effects.len(), 1);
        tick(&mut state, 2.0, FRAME_DT);
        assert!(state.particles.is_empty());
        assert!(state.fire_effects.is_empty());
    }

    #[test]
    fn test_shake_decays() {
        let mut state = running();
        state.screen_shake = 1.0;
        tick(&mut state, 1.0, FRAME_DT);
        assert!((state.screen_shake - 0.9).abs() < 1e-6);
        state.screen_shake = 0.011;
        tick(&mut state, 2.0, FRAME_DT);
        assert_eq!(state.screen_shake, 0.0);
    }
}
