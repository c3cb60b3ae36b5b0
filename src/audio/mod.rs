//! Audio system using kira
//!
//! The simulation never touches audio. The runner turns `GameEvent`s into
//! `AudioSink` calls; `AudioManager` plays the matching preloaded sample
//! and runs silent when no output device can be opened.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::{AudioManagerSettings, Decibels, DefaultBackend, Tween};
use thiserror::Error;

use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Looping music while a session runs
    Background,
    /// Player hit an obstacle
    Collision,
    /// Health ran out
    Lose,
    /// Survived the countdown
    Win,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 4] = [
        SoundEffect::Background,
        SoundEffect::Collision,
        SoundEffect::Lose,
        SoundEffect::Win,
    ];

    /// File name inside the sound directory
    pub fn file_name(self) -> &'static str {
        match self {
            SoundEffect::Background => "background.wav",
            SoundEffect::Collision => "collision.wav",
            SoundEffect::Lose => "lose.wav",
            SoundEffect::Win => "win.wav",
        }
    }

    pub fn is_music(self) -> bool {
        matches!(self, SoundEffect::Background)
    }
}

/// Decoded samples by effect. Effects that failed to load are absent.
pub type SoundBank = HashMap<SoundEffect, StaticSoundData>;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Failed to load '{path}': {reason}")]
    Load { path: String, reason: String },

    #[error("Failed to play {effect:?}: {reason}")]
    Play { effect: SoundEffect, reason: String },
}

/// Audio triggers the tick driver issues
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
    fn start_music(&mut self);
    fn stop_music(&mut self);
}

/// Audio manager for the game
pub struct AudioManager {
    manager: Option<kira::AudioManager<DefaultBackend>>,
    bank: SoundBank,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music: Option<StaticSoundHandle>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Open the default output device, or run silent if there is none
    pub fn new() -> Self {
        let manager =
            kira::AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
                .map_err(|e| log::warn!("No audio device available ({e}) - running silent"))
                .ok();
        Self::with_manager(manager)
    }

    /// Manager that never opens a device
    pub fn silent() -> Self {
        Self::with_manager(None)
    }

    fn with_manager(manager: Option<kira::AudioManager<DefaultBackend>>) -> Self {
        Self {
            manager,
            bank: SoundBank::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            music: None,
        }
    }

    /// Whether audio is actually available
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    pub fn set_bank(&mut self, bank: SoundBank) {
        log::info!("Sound bank ready ({} of {} sounds)", bank.len(), SoundEffect::ALL.len());
        self.bank = bank;
    }

    pub fn has_sound(&self, effect: SoundEffect) -> bool {
        self.bank.contains_key(&effect)
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_music();
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_music_volume(settings.music_volume);
        self.set_muted(settings.muted);
    }

    /// Linear gain for an effect after channel, master and mute
    fn effective_volume(&self, effect: SoundEffect) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = if effect.is_music() {
            self.music_volume
        } else {
            self.sfx_volume
        };
        self.master_volume * channel
    }

    /// Start a sample. `Ok(None)` means there was nothing to play.
    fn trigger(
        &mut self,
        effect: SoundEffect,
        looping: bool,
    ) -> Result<Option<StaticSoundHandle>, AudioError> {
        let gain = self.effective_volume(effect);
        if gain <= 0.0 {
            return Ok(None);
        }
        let Some(manager) = &mut self.manager else {
            return Ok(None);
        };
        let Some(sample) = self.bank.get(&effect) else {
            log::debug!("No sample loaded for {effect:?}");
            return Ok(None);
        };

        let mut data = sample.clone().volume(amplitude_to_db(gain));
        if looping {
            data = data.loop_region(..);
        }
        manager.play(data).map(Some).map_err(|e| AudioError::Play {
            effect,
            reason: e.to_string(),
        })
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, effect: SoundEffect) {
        if let Err(e) = self.trigger(effect, false) {
            log::warn!("{e}");
        }
    }

    fn start_music(&mut self) {
        if self.music.is_some() {
            return;
        }
        match self.trigger(SoundEffect::Background, true) {
            Ok(handle) => self.music = handle,
            Err(e) => log::warn!("{e}"),
        }
    }

    fn stop_music(&mut self) {
        if let Some(mut handle) = self.music.take() {
            let _ = handle.stop(Tween::default());
        }
    }
}

/// Convert linear amplitude (0.0 - 1.0) to decibels
fn amplitude_to_db(amplitude: f32) -> Decibels {
    if amplitude <= 0.0 {
        Decibels(-60.0)
    } else {
        Decibels((20.0 * amplitude.log10()).max(-60.0))
    }
}

/// Decode one sound file
pub fn load_sound(path: &Path) -> Result<StaticSoundData, AudioError> {
    StaticSoundData::from_file(path).map_err(|e| AudioError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Decode every effect's file from `dir`, skipping any that fail
pub fn load_bank(dir: &Path) -> SoundBank {
    let mut bank = SoundBank::new();
    for effect in SoundEffect::ALL {
        match load_sound(&dir.join(effect.file_name())) {
            Ok(sound) => {
                log::debug!("Loaded {effect:?} ({} Hz)", sound.sample_rate);
                bank.insert(effect, sound);
            }
            Err(e) => log::warn!("Skipping {effect:?}: {e}"),
        }
    }
    bank
}

/// Load the sound bank on a background thread. Join the handle before the
/// first tick.
pub fn preload(dir: PathBuf) -> JoinHandle<SoundBank> {
    std::thread::spawn(move || load_bank(&dir))
}
