//! Top-down co-op tower defense
//!
//! One or two players guard a central objective inside a generated maze
//! while waves of enemies march in from the entrances.

pub mod entities;
pub mod maze;
pub mod state;

pub use entities::{AttackEffect, Enemy, EnemyKind, Objective, Player};
pub use maze::{Maze, Rect};
pub use state::{OmdGame, OmdPhase};

/// Tuning (distances in pixels, times in ticks)
pub mod consts {
    use crate::ms_to_ticks;

    pub const SCREEN_WIDTH: f32 = 1000.0;
    pub const SCREEN_HEIGHT: f32 = 800.0;

    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_HEALTH: i32 = 100;
    pub const PLAYER_ATTACK_RADIUS: f32 = 50.0;
    pub const PLAYER_ATTACK_COOLDOWN: u32 = ms_to_ticks(500);
    pub const PLAYER_ATTACK_DAMAGE: i32 = 20;
    /// Extra clearance players keep from walls
    pub const PLAYER_WALL_BUFFER: f32 = 2.0;
    pub const KNOCKBACK_FORCE: f32 = 8.0;
    pub const ATTACK_EFFECT_TICKS: u32 = 15;

    pub const OBJECTIVE_RADIUS: f32 = 40.0;
    pub const OBJECTIVE_HEALTH: i32 = 500;
    pub const ENEMY_ATTACK_COOLDOWN: u32 = ms_to_ticks(1000);
    /// Minimum ticks between picking new detour directions
    pub const DETOUR_TICKS: u32 = ms_to_ticks(500);

    pub const WAVE_COOLDOWN: u32 = ms_to_ticks(10_000);
    pub const FIRST_WAVE_DELAY: u32 = ms_to_ticks(3000);
    pub const MAX_ENEMIES: usize = 20;
    pub const SPAWN_JITTER: i32 = 30;

    /// Maze grid unit: one basic enemy diameter
    pub const CELL: f32 = 30.0;
    /// Corridors are three cells wide
    pub const CORRIDOR_WIDTH: f32 = CELL * 3.0;
    pub const RANDOM_CONNECTIONS: usize = 10;
}
