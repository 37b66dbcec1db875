//! Regiments and musket balls
//!
//! A regiment is a rotated rectangle: `REGIMENT_DEPTH` along its heading and
//! `REGIMENT_FRONTAGE` across it. It fires only after standing still for
//! `SETUP_TIME` ticks and is pinned in place for `RECOVERY_TIME` ticks after
//! each volley.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ai::Personality;
use super::consts::*;
use crate::{heading_vec, normalize_degrees};

/// Side of the battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Team::Red => "Red",
            Team::Blue => "Blue",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Team::Red => 0,
            Team::Blue => 1,
        }
    }
}

/// Per-tick regiment order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBackward,
    WheelLeft,
    WheelRight,
    Fire,
    Hold,
}

impl Action {
    /// Actions that break a regiment's firing stance
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            Action::MoveForward | Action::MoveBackward | Action::WheelLeft | Action::WheelRight
        )
    }

    /// Non-fire actions a regiment may pick at random
    pub const RANDOM_CHOICES: [Action; 5] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::WheelLeft,
        Action::WheelRight,
        Action::Hold,
    ];
}

/// Tactical state shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RegimentStatus {
    Destroyed,
    /// Pinned after a volley (ticks left)
    Recovering(u32),
    /// Waiting on cooldown (ticks left)
    Reloading(u32),
    /// Standing still, building up to `SETUP_TIME` (0..1)
    Aiming(f32),
    Ready,
}

impl RegimentStatus {
    pub fn label(&self) -> String {
        match self {
            RegimentStatus::Destroyed => "DESTROYED".to_string(),
            RegimentStatus::Recovering(_) => "RECOVERING".to_string(),
            RegimentStatus::Reloading(_) => "RELOADING".to_string(),
            RegimentStatus::Aiming(p) => format!("AIMING {}%", (p * 100.0) as u32),
            RegimentStatus::Ready => "READY".to_string(),
        }
    }
}

/// A single projectile from a volley
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    /// Heading in degrees
    pub angle: f32,
    pub team: Team,
    pub lifetime: u32,
    /// Ticks before the bullet leaves the line
    pub delay: u32,
}

impl Bullet {
    /// Whether the bullet has left the line and can hit anything
    pub fn is_live(&self) -> bool {
        self.delay == 0
    }

    /// Advance one tick. Returns false once the bullet should be removed.
    pub fn update(&mut self) -> bool {
        if self.delay > 0 {
            self.delay -= 1;
            return true;
        }
        self.pos += heading_vec(self.angle) * BULLET_SPEED;
        self.lifetime = self.lifetime.saturating_sub(1);
        !self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime == 0
            || self.pos.x < MARGIN
            || self.pos.x > SCREEN_WIDTH - MARGIN
            || self.pos.y < MARGIN
            || self.pos.y > SCREEN_HEIGHT - MARGIN
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let r = Vec2::splat(BULLET_RADIUS);
        (self.pos - r, self.pos + r)
    }
}

/// A line-infantry regiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regiment {
    pub id: u32,
    pub team: Team,
    pub pos: Vec2,
    /// Heading in degrees, [0, 360)
    pub angle: f32,
    pub health: u32,
    pub cooldown: u32,
    pub recovery_time: u32,
    pub stationary_time: u32,
    pub destroyed: bool,
    pub personality: Personality,
}

impl Regiment {
    pub fn new(id: u32, team: Team, pos: Vec2, angle: f32, personality: Personality) -> Self {
        Self {
            id,
            team,
            pos,
            angle: normalize_degrees(angle),
            health: REGIMENT_HEALTH,
            cooldown: 0,
            recovery_time: 0,
            stationary_time: 0,
            destroyed: false,
            personality,
        }
    }

    pub fn heading(&self) -> Vec2 {
        heading_vec(self.angle)
    }

    /// Apply one tick of orders
    pub fn apply(&mut self, action: Action) {
        if self.destroyed {
            return;
        }

        let action = if self.recovery_time > 0 {
            self.recovery_time -= 1;
            Action::Hold
        } else {
            action
        };

        if action.is_movement() {
            self.stationary_time = 0;
        } else {
            self.stationary_time += 1;
        }

        match action {
            Action::MoveForward => self.pos += self.heading() * REGIMENT_SPEED,
            Action::MoveBackward => self.pos -= self.heading() * REGIMENT_SPEED,
            Action::WheelLeft => self.angle = normalize_degrees(self.angle - WHEEL_ANGLE),
            Action::WheelRight => self.angle = normalize_degrees(self.angle + WHEEL_ANGLE),
            Action::Fire | Action::Hold => {}
        }

        // Keep the rotated rectangle on the field
        let buffer = MARGIN + 30.0;
        self.pos.x = self.pos.x.clamp(buffer, SCREEN_WIDTH - buffer);
        self.pos.y = self.pos.y.clamp(buffer, SCREEN_HEIGHT - buffer);

        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn can_fire(&self) -> bool {
        !self.destroyed && self.cooldown == 0 && self.stationary_time >= SETUP_TIME
    }

    /// Fire a volley if the regiment is set up. Bullet ids are assigned by the caller.
    pub fn fire(&mut self, rng: &mut impl Rng) -> Vec<Bullet> {
        if !self.can_fire() {
            return Vec::new();
        }

        let dir = self.heading();
        let perp = Vec2::new(-dir.y, dir.x);
        let front = self.pos + dir * (REGIMENT_DEPTH / 2.0);
        let half_line = REGIMENT_FRONTAGE / 2.0 - 5.0;

        let bullets = (0..BULLETS_PER_VOLLEY)
            .map(|_| {
                let spread = rng.random_range(-BULLET_SPREAD..=BULLET_SPREAD);
                let offset = rng.random_range(-half_line..=half_line);
                Bullet {
                    id: 0,
                    pos: front + perp * offset,
                    angle: normalize_degrees(self.angle + spread),
                    team: self.team,
                    lifetime: BULLET_LIFETIME,
                    delay: rng.random_range(0..=MAX_VOLLEY_DELAY),
                }
            })
            .collect();

        self.cooldown = COOLDOWN_TICKS;
        self.recovery_time = RECOVERY_TIME;
        bullets
    }

    pub fn status(&self) -> RegimentStatus {
        if self.destroyed {
            RegimentStatus::Destroyed
        } else if self.recovery_time > 0 {
            RegimentStatus::Recovering(self.recovery_time)
        } else if self.cooldown > 0 {
            RegimentStatus::Reloading(self.cooldown)
        } else if self.stationary_time < SETUP_TIME {
            RegimentStatus::Aiming(self.stationary_time as f32 / SETUP_TIME as f32)
        } else {
            RegimentStatus::Ready
        }
    }

    /// Corners of the rotated rectangle
    pub fn corners(&self) -> [Vec2; 4] {
        let hw = REGIMENT_DEPTH / 2.0;
        let hh = REGIMENT_FRONTAGE / 2.0;
        let dir = self.heading();
        let perp = Vec2::new(-dir.y, dir.x);
        [
            self.pos + dir * hw + perp * hh,
            self.pos + dir * hw - perp * hh,
            self.pos - dir * hw - perp * hh,
            self.pos - dir * hw + perp * hh,
        ]
    }

    /// Axis-aligned bounds of the rotated rectangle as (min, max)
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let c = self.corners();
        let min = c.iter().copied().fold(Vec2::splat(f32::MAX), Vec2::min);
        let max = c.iter().copied().fold(Vec2::splat(f32::MIN), Vec2::max);
        (min, max)
    }

    pub fn is_hit_by(&self, bullet: &Bullet) -> bool {
        if self.destroyed || !bullet.is_live() {
            return false;
        }
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = bullet.bounds();
        a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
    }

    pub fn take_damage(&mut self, amount: u32) {
        if self.destroyed {
            return;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.destroyed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn regiment() -> Regiment {
        Regiment::new(1, Team::Red, Vec2::new(400.0, 350.0), 0.0, Personality::Standard)
    }

    #[test]
    fn test_fire_requires_setup_time() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut r = regiment();
        assert!(r.fire(&mut rng).is_empty());

        for _ in 0..SETUP_TIME {
            r.apply(Action::Hold);
        }
        assert!(r.can_fire());
        let volley = r.fire(&mut rng);
        assert_eq!(volley.len(), BULLETS_PER_VOLLEY);
        assert_eq!(r.cooldown, COOLDOWN_TICKS);
        assert_eq!(r.recovery_time, RECOVERY_TIME);
        assert!(volley.iter().all(|b| b.delay <= MAX_VOLLEY_DELAY));
    }

    #[test]
    fn test_movement_resets_stance() {
        let mut r = regiment();
        for _ in 0..10 {
            r.apply(Action::Hold);
        }
        assert_eq!(r.stationary_time, 10);
        r.apply(Action::WheelLeft);
        assert_eq!(r.stationary_time, 0);
        assert!((r.angle - (360.0 - WHEEL_ANGLE)).abs() < 1e-4);
    }

    #[test]
    fn test_recovery_forces_hold() {
        let mut r = regiment();
        r.recovery_time = 2;
        let start = r.pos;
        r.apply(Action::MoveForward);
        assert_eq!(r.pos, start);
        assert_eq!(r.recovery_time, 1);
        assert_eq!(r.stationary_time, 1);
    }

    #[test]
    fn test_position_clamped_to_field() {
        let mut r = Regiment::new(1, Team::Red, Vec2::new(81.0, 81.0), 180.0, Personality::Standard);
        for _ in 0..20 {
            r.apply(Action::MoveForward);
        }
        assert_eq!(r.pos.x, MARGIN + 30.0);
    }

    #[test]
    fn test_status_progression() {
        let mut r = regiment();
        assert!(matches!(r.status(), RegimentStatus::Aiming(_)));
        r.cooldown = 5;
        assert_eq!(r.status(), RegimentStatus::Reloading(5));
        r.recovery_time = 3;
        assert_eq!(r.status(), RegimentStatus::Recovering(3));
        r.take_damage(REGIMENT_HEALTH);
        assert_eq!(r.status(), RegimentStatus::Destroyed);
    }

    #[test]
    fn test_delayed_bullet_does_not_hit() {
        let r = regiment();
        let mut b = Bullet {
            id: 1,
            pos: r.pos,
            angle: 0.0,
            team: Team::Blue,
            lifetime: BULLET_LIFETIME,
            delay: 3,
        };
        assert!(!r.is_hit_by(&b));
        b.delay = 0;
        assert!(r.is_hit_by(&b));
    }

    #[test]
    fn test_bullet_expires_at_margin() {
        let mut b = Bullet {
            id: 1,
            pos: Vec2::new(SCREEN_WIDTH - MARGIN - 1.0, 300.0),
            angle: 0.0,
            team: Team::Red,
            lifetime: BULLET_LIFETIME,
            delay: 0,
        };
        assert!(!b.update());
    }
}
