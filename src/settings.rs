//! Preferences and per-game options
//!
//! Persisted in LocalStorage on the web; the native runner reads them from
//! an optional JSON file.

use serde::{Deserialize, Serialize};

use crate::games::army::TeamAi;
use crate::games::flappy::FlappyMode;
use crate::games::snake::SnakeMode;
use crate::games::spacewar::Variant;

pub const MIN_GAME_SPEED: f32 = 1.0;
pub const MAX_GAME_SPEED: f32 = 3.0;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Visual Effects ===
    /// Screen shake on explosions
    pub screen_shake: bool,
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    /// Simulation speed multiplier, 1-3
    pub game_speed: f32,

    // === Per-game options ===
    pub flappy_mode: FlappyMode,
    pub snake_mode: SnakeMode,
    pub spacewar_variant: Variant,
    /// Human pilots, 0-2 (the rest are AI)
    pub spacewar_humans: usize,
    /// OMD local players, 1-2
    pub omd_players: usize,
    pub army_red: TeamAi,
    pub army_blue: TeamAi,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,

            screen_shake: true,
            reduced_motion: false,

            game_speed: 1.0,

            flappy_mode: FlappyMode::default(),
            snake_mode: SnakeMode::default(),
            spacewar_variant: Variant::default(),
            spacewar_humans: 1,
            omd_players: 1,
            army_red: TeamAi::default(),
            army_blue: TeamAi::default(),
        }
    }
}

impl Settings {
    /// Parse settings JSON, falling back to defaults when it is unusable
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(e) => {
                log::warn!("Ignoring bad settings ({e}), using defaults");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Pull out-of-range values back into range
    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.game_speed = self.game_speed_clamped();
        self.spacewar_humans = self.spacewar_humans.min(2);
        self.omd_players = self.omd_players.clamp(1, 2);
        self
    }

    /// Game speed in the supported range (NaN falls back to normal speed)
    pub fn game_speed_clamped(&self) -> f32 {
        if self.game_speed.is_nan() {
            return MIN_GAME_SPEED;
        }
        self.game_speed.clamp(MIN_GAME_SPEED, MAX_GAME_SPEED)
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Combined output gain for sound effects
    pub fn effective_volume(&self) -> f32 {
        (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "arcade_pack_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if storage.set_item(Self::STORAGE_KEY, &self.to_json()).is_err() {
                log::warn!("Could not save settings");
            } else {
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs; the runner passes `--settings` through `from_json`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
