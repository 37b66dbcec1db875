//! Spacewar: ships in a wrap-around asteroid field
//!
//! Two variants share the field. In Delivery, ships haul cargo from pickup
//! zones to dropoff zones for credits; in Survival they only have to outlast
//! each other.

pub mod ai;
pub mod entities;
pub mod game;

pub use ai::{AiKind, AiMode, ShipAi, create_ai, create_random_ai};
pub use entities::{Asteroid, AsteroidSize, Controls, DeliveryZone, Ship, ZoneKind};
pub use game::{Spacewar, SpacewarPhase, Variant};

/// Tuning (distances in pixels, times in ticks)
pub mod consts {
    use glam::Vec2;

    pub const WORLD_WIDTH: f32 = 1600.0;
    pub const WORLD_HEIGHT: f32 = 1200.0;
    pub const WORLD: Vec2 = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT);

    pub const SHIP_SIZE: f32 = 20.0;
    pub const SHIP_THRUST: f32 = 0.2;
    /// Degrees per tick
    pub const SHIP_ROTATION_SPEED: f32 = 3.0;
    pub const SHIP_DRAG: f32 = 0.005;
    pub const MAX_VELOCITY: f32 = 5.0;
    pub const MAX_SHIPS: usize = 3;

    pub const ASTEROID_SPEED_MIN: f32 = 0.5;
    pub const ASTEROID_SPEED_MAX: f32 = 2.0;
    pub const INITIAL_ASTEROIDS: usize = 10;
    pub const MAX_ASTEROIDS: usize = 15;
    pub const ASTEROID_SPAWN_CHANCE: f64 = 0.01;
    /// Minimum distance from ships for freshly spawned asteroids and zones
    pub const SPAWN_CLEARANCE: f32 = 100.0;

    pub const ZONE_SIZE: f32 = 60.0;
    pub const ZONE_SPAWN_INTERVAL: u32 = 10 * 60;
    pub const ZONE_ACTIVE_TIME: u32 = 20 * 60;
    pub const ZONE_SEPARATION: f32 = 300.0;
    pub const FIRST_ZONE_MIN: u32 = 3 * 60;
    pub const FIRST_ZONE_MAX: u32 = 6 * 60;
    /// Ships must be this slow to pick up or drop off
    pub const MAX_PICKUP_VELOCITY: f32 = 1.0;
    pub const INTERACTION_COOLDOWN: u32 = 60;
    pub const CREDIT_GOAL: u32 = 5;
}
