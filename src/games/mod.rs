//! Deterministic game simulations
//!
//! Every game in this module is pure and deterministic:
//! - Fixed 60 Hz ticks only (timers count ticks, never wall-clock time)
//! - Seeded RNG only (see [`RngState`])
//! - Stable iteration order (entities sorted by id)
//! - No rendering or platform dependencies beyond emitting vertices into a [`Canvas`]

pub mod army;
pub mod flappy;
pub mod omd;
pub mod slicing;
pub mod snake;
pub mod spacewar;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::input::InputFrame;
use crate::renderer::Canvas;
use crate::settings::Settings;

/// Which game to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Flappy,
    Omd,
    Spacewar,
    Slicing,
    Army,
    Snake,
}

impl GameKind {
    pub const ALL: [GameKind; 6] = [
        GameKind::Flappy,
        GameKind::Omd,
        GameKind::Spacewar,
        GameKind::Slicing,
        GameKind::Army,
        GameKind::Snake,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            GameKind::Flappy => "flappy",
            GameKind::Omd => "omd",
            GameKind::Spacewar => "spacewar",
            GameKind::Slicing => "slicing",
            GameKind::Army => "army",
            GameKind::Snake => "snake",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameKind::Flappy => "Flappy",
            GameKind::Omd => "Orcs Must Die",
            GameKind::Spacewar => "Spacewar",
            GameKind::Slicing => "Monster Slicing",
            GameKind::Army => "Army Battle",
            GameKind::Snake => "Snake",
        }
    }

    pub fn from_slug(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches('#').to_lowercase();
        Self::ALL.into_iter().find(|k| k.slug() == s)
    }
}

/// Sound cues emitted by games for the audio layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Flap,
    Score,
    Explosion,
    Fire,
    Hit,
    Slice,
    Pickup,
    Deliver,
    WaveStart,
    GameOver,
}

/// RNG state wrapper for serialization
///
/// Each tick draws a fresh generator from `(seed, stream)` and bumps the
/// stream, so state stays plain data and replays are exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    /// Generator for the next tick
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = self.to_rng();
        self.stream = self.stream.wrapping_add(1);
        rng
    }
}

/// Common interface the frontends drive
pub trait Game {
    fn kind(&self) -> GameKind;

    /// Logical playfield size in pixels
    fn screen_size(&self) -> Vec2;

    /// Advance one fixed tick
    fn tick(&mut self, input: &InputFrame);

    fn draw(&self, canvas: &mut Canvas);

    /// Text lines for the DOM/log HUD
    fn hud(&self) -> Vec<String>;

    fn is_over(&self) -> bool;

    /// Score to record on the leaderboard once the game is over
    fn final_score(&self) -> Option<u64>;

    /// The player asked to leave (Q/Escape where the game uses it)
    fn quit_requested(&self) -> bool {
        false
    }

    /// Pause if the game supports it (auto-pause on blur)
    fn pause(&mut self) {}

    /// Input an idle/demo player would give this tick
    fn autopilot(&self) -> InputFrame {
        InputFrame::default()
    }

    /// Drain sound cues produced since the last call
    fn take_cues(&mut self) -> Vec<SoundCue>;
}

/// Build a game from the persisted settings
pub fn create_game(kind: GameKind, seed: u64, settings: &Settings) -> Box<dyn Game> {
    log::info!("Starting {} (seed {})", kind.title(), seed);
    match kind {
        GameKind::Army => Box::new(army::Battle::new(seed, settings.army_red, settings.army_blue)),
        GameKind::Flappy => Box::new(
            flappy::Flappy::new(seed, settings.flappy_mode)
                .with_screen_shake(settings.effective_screen_shake()),
        ),
        GameKind::Omd => Box::new(omd::OmdGame::new(seed, settings.omd_players)),
        GameKind::Spacewar => Box::new(spacewar::Spacewar::new(
            seed,
            settings.spacewar_variant,
            settings.spacewar_humans,
        )),
        GameKind::Slicing => Box::new(slicing::Slicing::new(seed)),
        GameKind::Snake => Box::new(snake::SnakeGame::new(seed, settings.snake_mode)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_rng_state_streams_differ() {
        let mut state = RngState::new(42);
        let a: u32 = state.next_rng().random();
        let b: u32 = state.next_rng().random();
        assert_ne!(a, b);
        assert_eq!(state.stream, 2);
    }

    #[test]
    fn test_rng_state_replays() {
        let mut s1 = RngState::new(7);
        let mut s2 = RngState::new(7);
        for _ in 0..5 {
            let a: u64 = s1.next_rng().random();
            let b: u64 = s2.next_rng().random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_game_kind_slugs() {
        for kind in GameKind::ALL {
            assert_eq!(GameKind::from_slug(kind.slug()), Some(kind));
        }
        assert_eq!(GameKind::from_slug("#Army"), Some(GameKind::Army));
        assert_eq!(GameKind::from_slug("pong"), None);
    }

    #[test]
    fn test_every_game_ticks_and_draws() {
        let settings = Settings::default();
        for kind in GameKind::ALL {
            let mut game = create_game(kind, 1234, &settings);
            assert_eq!(game.kind(), kind);
            for _ in 0..120 {
                let input = game.autopilot();
                game.tick(&input);
            }
            let size = game.screen_size();
            let mut canvas = Canvas::new(size.x, size.y);
            game.draw(&mut canvas);
            assert!(!canvas.vertices().is_empty(), "{kind:?} drew nothing");
            assert!(!game.hud().is_empty());
        }
    }
}
