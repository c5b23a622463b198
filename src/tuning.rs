//! Data-driven game balance
//!
//! Every gameplay constant lives here. `Tuning::default()` is the shipped
//! balance; a JSON document may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Upper bound for every `*_ticks` field (ten seconds at the reference rate)
pub const MAX_TICKS: u32 = 600;

/// Game balance and timing parameters.
///
/// Distances are in pixels, speeds in pixels per reference frame (1/60 s),
/// `*_ms` fields are wall-clock milliseconds and `*_ticks` fields count
/// simulation steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    /// Viewport width; the defended character sits at its center
    pub viewport_width: f32,
    /// Viewport height
    pub viewport_height: f32,
    /// How far outside the viewport enemies appear
    pub spawn_margin: f32,
    /// Collision radius of the central character
    pub center_radius: f32,
    /// Fraction of the combined radii that counts as a hit (< 1 tightens the hit box)
    pub proximity_factor: f32,

    // === Enemies ===
    /// Enemy collision radius
    pub enemy_radius: f32,
    /// Speed at level 0
    pub base_speed: f32,
    /// Speed gained per level
    pub level_speed_factor: f32,
    /// Chance an enemy carries the freeze word
    pub superpower_chance: f64,

    // === Spawning ===
    pub initial_spawn_interval_ms: f64,
    pub spawn_interval_step_ms: f64,
    pub min_spawn_interval_ms: f64,

    // === Scoring ===
    /// Points per kill per level
    pub points_per_kill: u64,
    /// Score needed for each level-up
    pub level_score_step: u64,
    /// Window within which kills chain into a combo
    pub combo_timeout_ms: f64,

    // === Freeze ===
    pub freeze_duration_ms: f64,

    // === Death animation ===
    /// Delay before the first enemy of a batch explodes
    pub attack_delay_ticks: u32,
    /// Extra delay for each subsequent enemy in a batch
    pub explosion_delay_ticks: u32,
    /// Lifetime of a fire effect
    pub fire_max_frame: u32,

    // === Player ===
    pub starting_lives: u8,
    /// Length of the hurt animation
    pub hurt_duration_ticks: u32,

    // === Feedback ===
    /// Buffers longer than this raise a wrong-input event when nothing matches
    pub wrong_input_min_len: usize,
    pub banner_duration_ms: f64,
    pub completed_word_duration_ms: f64,
    pub wrong_input_duration_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            viewport_width: 1280.0,
            viewport_height: 720.0,
            spawn_margin: 50.0,
            center_radius: 95.0,
            proximity_factor: 0.85,

            enemy_radius: 45.0,
            base_speed: 0.5,
            level_speed_factor: 0.3,
            superpower_chance: 0.1,

            initial_spawn_interval_ms: 1200.0,
            spawn_interval_step_ms: 150.0,
            min_spawn_interval_ms: 300.0,

            points_per_kill: 10,
            level_score_step: 50,
            combo_timeout_ms: 2000.0,

            freeze_duration_ms: 3000.0,

            attack_delay_ticks: 10,
            explosion_delay_ticks: 15,
            fire_max_frame: 45,

            starting_lives: crate::consts::MAX_LIVES,
            hurt_duration_ticks: 48,

            wrong_input_min_len: 2,
            banner_duration_ms: 1500.0,
            completed_word_duration_ms: 2000.0,
            wrong_input_duration_ms: 500.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON document over the defaults and validate it
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms),
            ("spawn_interval_step_ms", self.spawn_interval_step_ms),
            ("min_spawn_interval_ms", self.min_spawn_interval_ms),
            ("combo_timeout_ms", self.combo_timeout_ms),
            ("freeze_duration_ms", self.freeze_duration_ms),
            ("banner_duration_ms", self.banner_duration_ms),
            ("completed_word_duration_ms", self.completed_word_duration_ms),
            ("wrong_input_duration_ms", self.wrong_input_duration_ms),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{value} is not a positive duration"),
                ));
            }
        }
        for (field, value) in [
            ("attack_delay_ticks", self.attack_delay_ticks),
            ("explosion_delay_ticks", self.explosion_delay_ticks),
            ("fire_max_frame", self.fire_max_frame),
            ("hurt_duration_ticks", self.hurt_duration_ticks),
        ] {
            if value > MAX_TICKS {
                return Err(ConfigError::invalid(
                    field,
                    format!("{value} is above the {MAX_TICKS} tick limit"),
                ));
            }
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(ConfigError::invalid("viewport_width", "viewport must be non-empty"));
        }
        if !(self.proximity_factor > 0.0 && self.proximity_factor <= 1.0) {
            return Err(ConfigError::invalid("proximity_factor", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.superpower_chance) {
            return Err(ConfigError::invalid("superpower_chance", "must be a probability"));
        }
        if self.base_speed <= 0.0 || self.level_speed_factor <= 0.0 {
            return Err(ConfigError::invalid(
                "level_speed_factor",
                "speed must strictly increase with level",
            ));
        }
        if self.min_spawn_interval_ms <= 0.0
            || self.min_spawn_interval_ms > self.initial_spawn_interval_ms
        {
            return Err(ConfigError::invalid(
                "min_spawn_interval_ms",
                format!(
                    "floor {} must be positive and not above the initial interval {}",
                    self.min_spawn_interval_ms, self.initial_spawn_interval_ms
                ),
            ));
        }
        if self.level_score_step == 0 {
            return Err(ConfigError::invalid("level_score_step", "must be positive"));
        }
        if self.starting_lives == 0 || self.starting_lives > crate::consts::MAX_LIVES {
            return Err(ConfigError::invalid(
                "starting_lives",
                format!("must be between 1 and {}", crate::consts::MAX_LIVES),
            ));
        }
        Ok(())
    }

    /// The fixed point enemies converge on
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.viewport_width / 2.0, self.viewport_height / 2.0)
    }

    /// Enemy speed for a given level
    pub fn speed_for_level(&self, level: u32) -> f32 {
        self.base_speed + level as f32 * self.level_speed_factor
    }

    /// Distance under which an enemy reaches the center
    pub fn hit_distance(&self, enemy_radius: f32) -> f32 {
        (self.center_radius + enemy_radius) * self.proximity_factor
    }

    /// Death timer for the `index`-th enemy of a batch
    pub fn staggered_delay(&self, index: usize, with_attack_delay: bool) -> u32 {
        let base = if with_attack_delay {
            self.attack_delay_ticks
        } else {
            0
        };
        let step = u32::try_from(index)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.explosion_delay_ticks);
        base.saturating_add(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "freeze_duration_ms": 4500.0 }"#).unwrap();
        assert_eq!(tuning.freeze_duration_ms, 4500.0);
        assert_eq!(tuning.combo_timeout_ms, 2000.0);
        assert_eq!(tuning.points_per_kill, 10);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "proximity_factor": 1.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "proximity_factor", .. }));

        let err = Tuning::from_json(r#"{ "min_spawn_interval_ms": 5000.0 }"#).unwrap_err();
        assert!(err.to_string().contains("min_spawn_interval_ms"));

        let err = Tuning::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_speed_strictly_increases() {
        let tuning = Tuning::default();
        for level in 1..20 {
            assert!(tuning.speed_for_level(level + 1) > tuning.speed_for_level(level));
        }
        assert!((tuning.speed_for_level(1) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_staggered_delay() {
        let tuning = Tuning::default();
        assert_eq!(tuning.staggered_delay(0, true), 10);
        assert_eq!(tuning.staggered_delay(2, true), 40);
        assert_eq!(tuning.staggered_delay(2, false), 30);
    }

    #[test]
    fn test_rejects_runaway_ticks_and_durations() {
        for json in [
            r#"{ "explosion_delay_ticks": 4294967295 }"#,
            r#"{ "attack_delay_ticks": 601 }"#,
            r#"{ "hurt_duration_ticks": 1000000 }"#,
            r#"{ "freeze_duration_ms": 0.0 }"#,
            r#"{ "combo_timeout_ms": -5.0 }"#,
        ] {
            let err = Tuning::from_json(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { .. }), "{json} accepted");
        }
        assert!(Tuning::from_json(r#"{ "hurt_duration_ticks": 600 }"#).is_ok());

        let tuning = Tuning {
            initial_spawn_interval_ms: f64::NAN,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_staggered_delay_saturates() {
        let tuning = Tuning {
            attack_delay_ticks: u32::MAX,
            explosion_delay_ticks: u32::MAX,
            ..Default::default()
        };
        assert_eq!(tuning.staggered_delay(3, true), u32::MAX);
    }
}
