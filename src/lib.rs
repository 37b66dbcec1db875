//! Arcade Pack - small 2D arcade games on one fixed-timestep loop
//!
//! Core modules:
//! - `games`: Deterministic per-game simulations (army, flappy, omd, spacewar, slicing, snake)
//! - `input`: Platform-neutral keyboard/mouse state
//! - `renderer`: WebGPU triangle-list rendering
//! - `settings`: Persisted preferences and per-game options
//! - `highscores`: Per-game leaderboards

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod games;
pub mod highscores;
pub mod input;
pub mod renderer;
pub mod settings;

pub use games::{Game, GameKind, SoundCue, create_game};
pub use highscores::HighScores;
pub use input::{InputFrame, InputState, Key};
pub use settings::Settings;

use glam::Vec2;

/// Loop configuration constants
pub mod consts {
    /// Fixed simulation timestep (all game timers count 60 Hz ticks)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Ticks per second, for converting millisecond timings
    pub const TICKS_PER_SECOND: u32 = 60;
}

/// Convert a duration in milliseconds to whole ticks
#[inline]
pub const fn ms_to_ticks(ms: u32) -> u32 {
    ms * consts::TICKS_PER_SECOND / 1000
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Signed difference `to - from` in degrees, folded into (-180, 180]
#[inline]
pub fn angle_diff_degrees(from: f32, to: f32) -> f32 {
    let mut d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d -= 360.0;
    }
    d
}

/// Unit heading for an angle in degrees (screen space, y down)
#[inline]
pub fn heading_vec(angle_deg: f32) -> Vec2 {
    let r = angle_deg.to_radians();
    Vec2::new(r.cos(), r.sin())
}

/// Bearing in degrees [0, 360) from `from` to `to` (screen space, y down)
#[inline]
pub fn bearing_degrees(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    normalize_degrees(d.y.atan2(d.x).to_degrees())
}

/// Shortest displacement from `a` to `b` on a torus of the given size
#[inline]
pub fn wrapped_delta(a: Vec2, b: Vec2, size: Vec2) -> Vec2 {
    let mut d = b - a;
    if d.x > size.x / 2.0 {
        d.x -= size.x;
    } else if d.x < -size.x / 2.0 {
        d.x += size.x;
    }
    if d.y > size.y / 2.0 {
        d.y -= size.y;
    } else if d.y < -size.y / 2.0 {
        d.y += size.y;
    }
    d
}

/// Shortest distance between two points on a torus
#[inline]
pub fn wrapped_distance(a: Vec2, b: Vec2, size: Vec2) -> f32 {
    wrapped_delta(a, b, size).length()
}

/// Wrap a position back into [0, size)
#[inline]
pub fn wrap_position(p: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(p.x.rem_euclid(size.x), p.y.rem_euclid(size.y))
}

/// Fixed-timestep accumulator shared by the frontends
///
/// Frame time goes in, a whole number of simulation ticks comes out.
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    /// Bank `dt` seconds scaled by `speed` and return how many ticks to run
    pub fn advance(&mut self, dt: f32, speed: f32) -> u32 {
        // Long stalls (tab switches, breakpoints) are not replayed
        self.accumulator += dt.clamp(0.0, 0.1) * speed;
        let mut ticks = 0;
        while self.accumulator >= consts::SIM_DT && ticks < consts::MAX_SUBSTEPS {
            self.accumulator -= consts::SIM_DT;
            ticks += 1;
        }
        if ticks == consts::MAX_SUBSTEPS {
            // Spiral of death: drop the backlog
            self.accumulator = self.accumulator.min(consts::SIM_DT);
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_step_accumulates() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(consts::SIM_DT * 0.5, 1.0), 0);
        assert_eq!(step.advance(consts::SIM_DT * 0.6, 1.0), 1);
        assert_eq!(step.advance(consts::SIM_DT, 2.0), 2);
    }

    #[test]
    fn test_fixed_step_caps_substeps() {
        let mut step = FixedStep::default();
        assert_eq!(step.advance(1.0, 3.0), consts::MAX_SUBSTEPS);
        assert!(step.advance(0.0, 1.0) <= 1);
    }

    #[test]
    fn test_angle_diff_folds() {
        assert_eq!(angle_diff_degrees(350.0, 10.0), 20.0);
        assert_eq!(angle_diff_degrees(10.0, 350.0), -20.0);
        assert_eq!(angle_diff_degrees(0.0, 180.0), 180.0);
    }

    #[test]
    fn test_wrapped_distance_crosses_edge() {
        let size = Vec2::new(1600.0, 1200.0);
        let d = wrapped_distance(Vec2::new(5.0, 600.0), Vec2::new(1595.0, 600.0), size);
        assert!((d - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_ms_to_ticks() {
        assert_eq!(ms_to_ticks(500), 30);
        assert_eq!(ms_to_ticks(2200), 132);
        assert_eq!(ms_to_ticks(10_000), 600);
    }

    proptest! {
        #[test]
        fn prop_normalize_degrees_in_range(a in -10_000.0f32..10_000.0) {
            let n = normalize_degrees(a);
            prop_assert!((0.0..360.0).contains(&n));
        }

        #[test]
        fn prop_angle_diff_in_range(a in -720.0f32..720.0, b in -720.0f32..720.0) {
            let d = angle_diff_degrees(a, b);
            prop_assert!(d > -180.0 - 1e-3 && d <= 180.0 + 1e-3);
        }

        #[test]
        fn prop_wrapped_distance_bounded(
            ax in 0.0f32..1600.0, ay in 0.0f32..1200.0,
            bx in 0.0f32..1600.0, by in 0.0f32..1200.0,
        ) {
            let size = Vec2::new(1600.0, 1200.0);
            let d = wrapped_distance(Vec2::new(ax, ay), Vec2::new(bx, by), size);
            prop_assert!(d <= (800.0f32.powi(2) + 600.0f32.powi(2)).sqrt() + 1e-2);
        }
    }
}
