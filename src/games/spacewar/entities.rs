//! Ships, asteroids, and delivery zones

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::renderer::{Canvas, colors, rgb, with_alpha};
use crate::{heading_vec, normalize_degrees, wrap_position, wrapped_distance};

pub const HUMAN_COLORS: [[f32; 4]; 2] = [colors::GREEN, colors::SKY];
pub const AI_COLOR: [f32; 4] = colors::BLUE;

/// Pilot intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub thrust: bool,
    /// -1 counter-clockwise, 0 steady, 1 clockwise
    pub rotation: i8,
}

impl Controls {
    pub fn new(thrust: bool, rotation: i8) -> Self {
        Self { thrust, rotation }
    }
}

/// What happened when a ship touched a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    PickedUp,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in degrees
    pub angle: f32,
    pub controls: Controls,
    /// Human player slot, `None` for AI ships
    pub human: Option<usize>,
    pub has_cargo: bool,
    pub credits: u32,
    pub interaction_cooldown: u32,
    pub destroyed: bool,
    /// Ticks spent alive
    pub survived_ticks: u32,
}

impl Ship {
    pub fn new(id: u32, pos: Vec2, angle: f32, human: Option<usize>) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            angle: normalize_degrees(angle),
            controls: Controls::default(),
            human,
            has_cargo: false,
            credits: 0,
            interaction_cooldown: 0,
            destroyed: false,
            survived_ticks: 0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn is_alive(&self) -> bool {
        !self.destroyed
    }

    pub fn color(&self) -> [f32; 4] {
        match self.human {
            Some(slot) => HUMAN_COLORS[slot % HUMAN_COLORS.len()],
            None => AI_COLOR,
        }
    }

    /// Apply the current controls and integrate one tick
    pub fn update(&mut self) {
        if self.destroyed {
            return;
        }
        self.angle = normalize_degrees(self.angle + self.controls.rotation as f32 * SHIP_ROTATION_SPEED);
        if self.controls.thrust {
            self.vel += heading_vec(self.angle) * SHIP_THRUST;
            self.vel = self.vel.clamp_length_max(MAX_VELOCITY);
        }
        self.vel *= 1.0 - SHIP_DRAG;
        self.pos = wrap_position(self.pos + self.vel, WORLD);
        self.interaction_cooldown = self.interaction_cooldown.saturating_sub(1);
        self.survived_ticks += 1;
    }

    /// Try to use a zone; requires overlap, low speed, and no cooldown
    pub fn interact(&mut self, zone: &DeliveryZone) -> Option<ZoneEvent> {
        if self.destroyed
            || self.interaction_cooldown > 0
            || self.speed() > MAX_PICKUP_VELOCITY
            || !zone.contains(self.pos)
        {
            return None;
        }
        let event = match zone.kind {
            ZoneKind::Pickup if !self.has_cargo => {
                self.has_cargo = true;
                ZoneEvent::PickedUp
            }
            ZoneKind::Dropoff if self.has_cargo => {
                self.has_cargo = false;
                self.credits += 1;
                ZoneEvent::Delivered
            }
            _ => return None,
        };
        self.interaction_cooldown = INTERACTION_COOLDOWN;
        Some(event)
    }

    pub fn hits(&self, asteroid: &Asteroid) -> bool {
        !self.destroyed && wrapped_distance(self.pos, asteroid.pos, WORLD) < SHIP_SIZE + asteroid.radius()
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        if self.destroyed {
            return;
        }
        let nose = self.pos + heading_vec(self.angle) * SHIP_SIZE;
        let left = self.pos + heading_vec(self.angle + 140.0) * SHIP_SIZE * 0.7;
        let right = self.pos + heading_vec(self.angle - 140.0) * SHIP_SIZE * 0.7;
        canvas.polygon(&[nose, left, right], self.color());

        if self.controls.thrust {
            let tail = self.pos - heading_vec(self.angle) * SHIP_SIZE * 0.5;
            let flame = tail - heading_vec(self.angle) * SHIP_SIZE * 0.6;
            canvas.line(tail, flame, 3.0, colors::YELLOW);
        }
        if self.has_cargo {
            canvas.circle(self.pos, 5.0, colors::RED);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(self) -> f32 {
        match self {
            AsteroidSize::Large => 40.0,
            AsteroidSize::Medium => 20.0,
            AsteroidSize::Small => 10.0,
        }
    }

    /// Size of the fragments this breaks into
    pub fn smaller(self) -> Option<Self> {
        match self {
            AsteroidSize::Large => Some(AsteroidSize::Medium),
            AsteroidSize::Medium => Some(AsteroidSize::Small),
            AsteroidSize::Small => None,
        }
    }

    /// Weighted spawn pick (large 0.5, medium 0.3, small 0.2)
    pub fn pick(rng: &mut impl Rng) -> Self {
        let roll: f32 = rng.random();
        if roll < 0.5 {
            AsteroidSize::Large
        } else if roll < 0.8 {
            AsteroidSize::Medium
        } else {
            AsteroidSize::Small
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub size: AsteroidSize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Degrees
    pub rotation: f32,
    /// Degrees per tick
    pub spin: f32,
    /// Outline radius factors, evenly spaced around the body
    pub shape: Vec<f32>,
}

impl Asteroid {
    /// Random drift, spin, and outline; ids are assigned by the caller
    pub fn new(id: u32, pos: Vec2, size: AsteroidSize, rng: &mut impl Rng) -> Self {
        let heading = rng.random_range(0.0..360.0);
        let speed = rng.random_range(ASTEROID_SPEED_MIN..ASTEROID_SPEED_MAX);
        let vertices = rng.random_range(8..=12);
        let shape = (0..vertices).map(|_| rng.random_range(0.8..1.2)).collect();
        Self {
            id,
            size,
            pos,
            vel: heading_vec(heading) * speed,
            rotation: rng.random_range(0.0..360.0),
            spin: rng.random_range(-0.2..0.2),
            shape,
        }
    }

    pub fn radius(&self) -> f32 {
        self.size.radius()
    }

    pub fn update(&mut self) {
        self.pos = wrap_position(self.pos + self.vel, WORLD);
        self.rotation = normalize_degrees(self.rotation + self.spin);
    }

    /// Fragments of the next smaller size, inheriting most of the momentum
    pub fn break_apart(&self, rng: &mut impl Rng) -> Vec<Asteroid> {
        let Some(size) = self.size.smaller() else {
            return Vec::new();
        };
        let half = self.radius() / 2.0;
        let pieces = rng.random_range(2..=3);
        (0..pieces)
            .map(|_| {
                let offset = Vec2::new(rng.random_range(-half..=half), rng.random_range(-half..=half));
                let mut piece = Asteroid::new(0, wrap_position(self.pos + offset, WORLD), size, rng);
                piece.vel = self.vel * 0.8
                    + Vec2::new(rng.random_range(-0.5..=0.5), rng.random_range(-0.5..=0.5));
                piece
            })
            .collect()
    }

    pub fn outline(&self) -> Vec<Vec2> {
        let step = 360.0 / self.shape.len() as f32;
        self.shape
            .iter()
            .enumerate()
            .map(|(i, factor)| self.pos + heading_vec(self.rotation + i as f32 * step) * self.radius() * factor)
            .collect()
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.outline(&self.outline(), 1.5, colors::WHITE);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneKind {
    Pickup,
    Dropoff,
}

impl ZoneKind {
    pub fn color(self) -> [f32; 4] {
        match self {
            ZoneKind::Pickup => colors::GREEN,
            ZoneKind::Dropoff => colors::ORANGE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub id: u32,
    pub kind: ZoneKind,
    pub pos: Vec2,
    pub ticks_left: u32,
}

impl DeliveryZone {
    pub fn new(id: u32, kind: ZoneKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            ticks_left: ZONE_ACTIVE_TIME,
        }
    }

    pub fn update(&mut self) {
        self.ticks_left = self.ticks_left.saturating_sub(1);
    }

    pub fn is_expired(&self) -> bool {
        self.ticks_left == 0
    }

    /// Ship body overlaps the zone
    pub fn contains(&self, pos: Vec2) -> bool {
        wrapped_distance(self.pos, pos, WORLD) < ZONE_SIZE + SHIP_SIZE
    }

    pub fn draw(&self, canvas: &mut Canvas, time_ticks: u64) {
        let color = self.kind.color();
        canvas.circle(self.pos, ZONE_SIZE, with_alpha(color, 0.15));
        // Pulse the border once a second
        let phase = (time_ticks % 60) as f32 / 60.0 * std::f32::consts::TAU;
        let stroke = 2.0 + phase.sin().abs() * 2.0;
        canvas.ring(self.pos, ZONE_SIZE, stroke, color);
        // Fade the marker as the zone runs out
        let remaining = self.ticks_left as f32 / ZONE_ACTIVE_TIME as f32;
        canvas.circle(self.pos, 6.0, with_alpha(rgb(255, 255, 255), remaining.max(0.2)));
    }
}

/// A random point at least `clearance` from every point in `avoid`
///
/// Gives up after a bounded number of tries and returns the last sample.
pub fn random_point_away(rng: &mut impl Rng, avoid: &[Vec2], clearance: f32) -> Vec2 {
    let mut point = Vec2::ZERO;
    for _ in 0..100 {
        point = Vec2::new(rng.random_range(0.0..WORLD_WIDTH), rng.random_range(0.0..WORLD_HEIGHT));
        if avoid.iter().all(|p| wrapped_distance(*p, point, WORLD) >= clearance) {
            return point;
        }
    }
    log::debug!("No clear spawn point after 100 tries; using {:?}", point);
    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(5)
    }

    #[test]
    fn test_thrust_is_capped() {
        let mut ship = Ship::new(1, Vec2::new(800.0, 600.0), 0.0, Some(0));
        ship.controls = Controls::new(true, 0);
        for _ in 0..500 {
            ship.update();
        }
        assert!(ship.speed() <= MAX_VELOCITY);
        assert!(ship.speed() > MAX_VELOCITY * 0.9);
    }

    #[test]
    fn test_drag_slows_coasting_ship() {
        let mut ship = Ship::new(1, Vec2::new(800.0, 600.0), 0.0, None);
        ship.vel = Vec2::new(3.0, 0.0);
        ship.update();
        assert!((ship.speed() - 3.0 * (1.0 - SHIP_DRAG)).abs() < 1e-4);
    }

    #[test]
    fn test_rotation_direction() {
        let mut ship = Ship::new(1, Vec2::new(800.0, 600.0), 0.0, None);
        ship.controls = Controls::new(false, -1);
        ship.update();
        assert_eq!(ship.angle, 357.0);
        ship.controls = Controls::new(false, 1);
        ship.update();
        ship.update();
        assert_eq!(ship.angle, 3.0);
    }

    #[test]
    fn test_ship_wraps_around_edges() {
        let mut ship = Ship::new(1, Vec2::new(WORLD_WIDTH - 1.0, 5.0), 0.0, None);
        ship.vel = Vec2::new(4.0, -10.0);
        ship.update();
        assert!(ship.pos.x < 5.0);
        assert!(ship.pos.y > WORLD_HEIGHT - 10.0);
    }

    #[test]
    fn test_pickup_then_dropoff() {
        let pickup = DeliveryZone::new(1, ZoneKind::Pickup, Vec2::new(400.0, 400.0));
        let dropoff = DeliveryZone::new(2, ZoneKind::Dropoff, Vec2::new(900.0, 400.0));
        let mut ship = Ship::new(3, Vec2::new(410.0, 400.0), 0.0, None);

        assert_eq!(ship.interact(&dropoff), None);
        assert_eq!(ship.interact(&pickup), Some(ZoneEvent::PickedUp));
        assert!(ship.has_cargo);
        assert_eq!(ship.interaction_cooldown, INTERACTION_COOLDOWN);

        ship.pos = Vec2::new(905.0, 400.0);
        assert_eq!(ship.interact(&dropoff), None, "still cooling down");
        ship.interaction_cooldown = 0;
        assert_eq!(ship.interact(&dropoff), Some(ZoneEvent::Delivered));
        assert_eq!(ship.credits, 1);
        assert!(!ship.has_cargo);
    }

    #[test]
    fn test_fast_ship_cannot_interact() {
        let pickup = DeliveryZone::new(1, ZoneKind::Pickup, Vec2::new(400.0, 400.0));
        let mut ship = Ship::new(3, Vec2::new(400.0, 400.0), 0.0, None);
        ship.vel = Vec2::new(MAX_PICKUP_VELOCITY + 0.5, 0.0);
        assert_eq!(ship.interact(&pickup), None);
        ship.vel = Vec2::new(MAX_PICKUP_VELOCITY, 0.0);
        assert_eq!(ship.interact(&pickup), Some(ZoneEvent::PickedUp));
    }

    #[test]
    fn test_pickup_with_cargo_is_ignored() {
        let pickup = DeliveryZone::new(1, ZoneKind::Pickup, Vec2::new(400.0, 400.0));
        let mut ship = Ship::new(3, Vec2::new(400.0, 400.0), 0.0, None);
        ship.has_cargo = true;
        assert_eq!(ship.interact(&pickup), None);
        assert_eq!(ship.interaction_cooldown, 0);
    }

    #[test]
    fn test_asteroid_breaks_into_smaller_pieces() {
        let mut rng = rng();
        let mut large = Asteroid::new(1, Vec2::new(500.0, 500.0), AsteroidSize::Large, &mut rng);
        large.vel = Vec2::new(1.0, 0.0);
        let pieces = large.break_apart(&mut rng);
        assert!((2..=3).contains(&pieces.len()));
        for p in &pieces {
            assert_eq!(p.size, AsteroidSize::Medium);
            assert!(wrapped_distance(p.pos, large.pos, WORLD) <= 20.0 * std::f32::consts::SQRT_2 + 1e-3);
            assert!((p.vel - Vec2::new(0.8, 0.0)).abs().max_element() <= 0.5 + 1e-4);
        }

        let small = Asteroid::new(2, Vec2::new(500.0, 500.0), AsteroidSize::Small, &mut rng);
        assert!(small.break_apart(&mut rng).is_empty());
    }

    #[test]
    fn test_asteroid_shape_and_speed() {
        let mut rng = rng();
        for _ in 0..50 {
            let a = Asteroid::new(1, Vec2::new(500.0, 500.0), AsteroidSize::pick(&mut rng), &mut rng);
            assert!((8..=12).contains(&a.shape.len()));
            assert!(a.shape.iter().all(|f| (0.8..1.2).contains(f)));
            assert!(a.vel.length() >= ASTEROID_SPEED_MIN - 1e-4 && a.vel.length() <= ASTEROID_SPEED_MAX);
            assert!(a.spin.abs() <= 0.2);
        }
    }

    #[test]
    fn test_zone_expires() {
        let mut zone = DeliveryZone::new(1, ZoneKind::Pickup, Vec2::ZERO);
        for _ in 0..ZONE_ACTIVE_TIME - 1 {
            zone.update();
        }
        assert!(!zone.is_expired());
        zone.update();
        assert!(zone.is_expired());
    }

    #[test]
    fn test_collision_across_wrap_edge() {
        let mut rng = rng();
        let ship = Ship::new(1, Vec2::new(5.0, 600.0), 0.0, None);
        let asteroid = Asteroid::new(2, Vec2::new(WORLD_WIDTH - 20.0, 600.0), AsteroidSize::Medium, &mut rng);
        assert!(ship.hits(&asteroid));
    }

    #[test]
    fn test_random_point_away_keeps_clearance() {
        let mut rng = rng();
        let avoid = [Vec2::new(400.0, 300.0), Vec2::new(1200.0, 900.0)];
        for _ in 0..20 {
            let p = random_point_away(&mut rng, &avoid, SPAWN_CLEARANCE);
            assert!(avoid.iter().all(|a| wrapped_distance(*a, p, WORLD) >= SPAWN_CLEARANCE));
        }
    }
}
