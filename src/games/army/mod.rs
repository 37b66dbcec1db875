//! Line-formation army battle
//!
//! Two teams of three regiments fight it out under AI control. Regiments
//! advance, wheel, and fire slow volleys; the last team standing wins.

pub mod ai;
pub mod battle;
pub mod regiment;

pub use ai::{Personality, PersonalityParams, TeamAi, decide};
pub use battle::{Battle, BattlePhase, BattleStats};
pub use regiment::{Action, Bullet, Regiment, RegimentStatus, Team};

/// Battle tuning (distances in pixels, times in ticks)
pub mod consts {
    pub const SCREEN_WIDTH: f32 = 1000.0;
    pub const SCREEN_HEIGHT: f32 = 700.0;
    /// Border around the field; bullets past it are gone
    pub const MARGIN: f32 = 50.0;

    /// Depth of the formation (along the heading)
    pub const REGIMENT_DEPTH: f32 = 30.0;
    /// Width of the firing line (across the heading)
    pub const REGIMENT_FRONTAGE: f32 = 60.0;
    pub const REGIMENT_SPEED: f32 = 0.25;
    /// Degrees per tick
    pub const WHEEL_ANGLE: f32 = 0.4;
    pub const REGIMENT_HEALTH: u32 = 100;
    pub const REGIMENTS_PER_TEAM: usize = 3;

    pub const COOLDOWN_TICKS: u32 = 180;
    /// Ticks a regiment must stand still before it can fire
    pub const SETUP_TIME: u32 = 45;
    /// Ticks a regiment is pinned after a volley
    pub const RECOVERY_TIME: u32 = 60;

    pub const BULLET_SPEED: f32 = 5.0;
    pub const BULLET_LIFETIME: u32 = 250;
    pub const BULLET_DAMAGE: u32 = 5;
    pub const BULLET_RADIUS: f32 = 2.0;
    pub const BULLETS_PER_VOLLEY: usize = 10;
    /// Degrees either side of the heading
    pub const BULLET_SPREAD: f32 = 15.0;
    pub const MAX_VOLLEY_DELAY: u32 = 15;
    /// No volleys while this many bullets are in flight
    pub const MAX_BULLETS: usize = 500;
}
