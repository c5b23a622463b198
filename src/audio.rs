//! Sound cues
//!
//! The sim only names cues; a sink plays them. Playback is fire-and-forget:
//! a missing asset or a blocked autoplay must never reach game state.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    DoubleKill,
    TripleKill,
    Overkill,
    Killtacular,
    Killtrocity,
    Killimanjaro,
    Killtastrophe,
    Killpocalypse,
    Killionaire,
    RunningRiot,
    Rampage,
    Untouchable,
    Invincible,
    /// Freeze mode activated
    Freeze,
    /// An enemy's death timer ran out
    Explosion,
}

impl SoundCue {
    /// Every cue, in asset order
    pub const ALL: [SoundCue; 15] = [
        SoundCue::DoubleKill,
        SoundCue::TripleKill,
        SoundCue::Overkill,
        SoundCue::Killtacular,
        SoundCue::Killtrocity,
        SoundCue::Killimanjaro,
        SoundCue::Killtastrophe,
        SoundCue::Killpocalypse,
        SoundCue::Killionaire,
        SoundCue::RunningRiot,
        SoundCue::Rampage,
        SoundCue::Untouchable,
        SoundCue::Invincible,
        SoundCue::Freeze,
        SoundCue::Explosion,
    ];

    /// Symbolic key, also the asset file stem
    pub fn key(&self) -> &'static str {
        match self {
            SoundCue::DoubleKill => "doublekill",
            SoundCue::TripleKill => "triplekill",
            SoundCue::Overkill => "overkill",
            SoundCue::Killtacular => "killtacular",
            SoundCue::Killtrocity => "killtrocity",
            SoundCue::Killimanjaro => "killimanjaro",
            SoundCue::Killtastrophe => "killtastrophe",
            SoundCue::Killpocalypse => "killpocalypse",
            SoundCue::Killionaire => "killionaire",
            SoundCue::RunningRiot => "running_riot",
            SoundCue::Rampage => "rampage",
            SoundCue::Untouchable => "untouchable",
            SoundCue::Invincible => "invincible",
            SoundCue::Freeze => "freeze",
            SoundCue::Explosion => "explosion",
        }
    }

    /// Playback volume before settings are applied. Explosions overlap a lot, keep them quieter.
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundCue::Explosion => 0.4,
            _ => 0.6,
        }
    }
}

/// Anything that can play a cue. Implementations swallow their own failures.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue, volume: f32);
}

/// Silent sink for headless runs and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, cue: SoundCue, _volume: f32) {
        log::trace!("(muted) {}", cue.key());
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::HtmlAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::collections::HashMap;

    use wasm_bindgen::JsCast;
    use web_sys::HtmlAudioElement;

    use super::{AudioSink, SoundCue};

    /// `<audio>`-element backed sink. Each cue is preloaded once and cloned per
    /// playback so overlapping sounds work.
    pub struct HtmlAudio {
        clips: HashMap<SoundCue, HtmlAudioElement>,
    }

    impl HtmlAudio {
        /// Preload every cue from `{base_url}/{key}.mp3`
        pub fn new(base_url: &str) -> Self {
            let mut clips = HashMap::new();
            for cue in SoundCue::ALL {
                let src = format!("{base_url}/{}.mp3", cue.key());
                match HtmlAudioElement::new_with_src(&src) {
                    Ok(el) => {
                        el.set_preload("auto");
                        clips.insert(cue, el);
                    }
                    Err(_) => log::warn!("Failed to load sound: {src}"),
                }
            }
            Self { clips }
        }
    }

    impl AudioSink for HtmlAudio {
        fn play(&mut self, cue: SoundCue, volume: f32) {
            let Some(clip) = self.clips.get(&cue) else { return };
            let Ok(node) = clip.clone_node() else { return };
            let Ok(instance) = node.dyn_into::<HtmlAudioElement>() else { return };
            instance.set_volume(f64::from(volume));
            if instance.play().is_err() {
                log::warn!("Failed to play sound {}", cue.key());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        for cue in SoundCue::ALL {
            let dupes = SoundCue::ALL.iter().filter(|c| c.key() == cue.key()).count();
            assert_eq!(dupes, 1, "{} duplicated", cue.key());
        }
    }

    #[test]
    fn test_explosion_is_quieter() {
        assert!(SoundCue::Explosion.base_volume() < SoundCue::Freeze.base_volume());
    }
}
