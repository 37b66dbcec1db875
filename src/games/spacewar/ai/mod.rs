//! Ship pilots
//!
//! Every AI ship carries a [`ShipAi`]: the shared per-ship memory (mode,
//! cruise heading, zone target, approach phase) plus which behaviour
//! drives it. Behaviours are looked up by name so settings and logs can
//! refer to them.

pub mod cautious;
pub mod delivery;
pub mod nav;
pub mod original;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::consts::SHIP_SIZE;
use super::entities::{Asteroid, Controls, DeliveryZone, Ship, ZoneKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiKind {
    /// Reactive pilot that detours for nearby zones
    Original,
    /// Longer lookahead, avoids risky paths
    Cautious,
    /// Phased braking approach to zones
    Delivery,
    /// Ignores zones entirely
    Survival,
}

impl AiKind {
    pub const ALL: [AiKind; 4] = [AiKind::Original, AiKind::Cautious, AiKind::Delivery, AiKind::Survival];

    /// Kinds that go after cargo
    pub const DELIVERY_CAPABLE: [AiKind; 3] = [AiKind::Original, AiKind::Cautious, AiKind::Delivery];

    pub fn name(self) -> &'static str {
        match self {
            AiKind::Original => "original",
            AiKind::Cautious => "cautious",
            AiKind::Delivery => "delivery",
            AiKind::Survival => "survival",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiMode {
    Cruise,
    Avoid,
    Evade,
    Pickup,
    Dropoff,
    WaitForDropoff,
}

impl AiMode {
    pub fn label(self) -> &'static str {
        match self {
            AiMode::Cruise => "cruise",
            AiMode::Avoid => "avoid",
            AiMode::Evade => "evade",
            AiMode::Pickup => "pickup",
            AiMode::Dropoff => "dropoff",
            AiMode::WaitForDropoff => "waiting",
        }
    }

    fn is_zone_run(self) -> bool {
        matches!(self, AiMode::Pickup | AiMode::Dropoff)
    }
}

/// Stage of a braking approach to a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApproachPhase {
    Direct,
    Brake,
    Final,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipAi {
    pub kind: AiKind,
    pub mode: AiMode,
    /// Heading to hold while cruising
    pub target_angle: f32,
    /// Ticks before cruise may pick a new heading
    pub course_timer: u32,
    pub target_zone: Option<u32>,
    pub safe_spot: Option<Vec2>,
    pub approach: ApproachPhase,
    pub braking_started: bool,
}

/// Ticks a freshly chosen cruise heading is held
const COURSE_CHANGE_DELAY: u32 = 30;

impl ShipAi {
    pub fn new(kind: AiKind, rng: &mut impl Rng) -> Self {
        Self {
            kind,
            mode: AiMode::Cruise,
            target_angle: rng.random_range(0.0..360.0),
            course_timer: 0,
            target_zone: None,
            safe_spot: None,
            approach: ApproachPhase::Direct,
            braking_started: false,
        }
    }

    /// Controls for this tick
    pub fn decide(
        &mut self,
        ship: &Ship,
        asteroids: &[Asteroid],
        zones: &[DeliveryZone],
        rng: &mut impl Rng,
    ) -> Controls {
        self.course_timer = self.course_timer.saturating_sub(1);
        match self.kind {
            AiKind::Original => original::decide(self, ship, asteroids, zones, rng),
            AiKind::Cautious => cautious::decide(self, ship, asteroids, zones, rng),
            AiKind::Delivery => delivery::decide(self, ship, asteroids, zones, rng),
            AiKind::Survival => original::react(self, ship, asteroids, &[], rng),
        }
    }

    /// Short status for the HUD, e.g. `cautious: evade`
    pub fn label(&self) -> String {
        format!("{}: {}", self.kind.name(), self.mode.label())
    }

    fn seek(&mut self, zone: &DeliveryZone) {
        if self.target_zone != Some(zone.id) {
            self.reset_approach();
        }
        self.mode = match zone.kind {
            ZoneKind::Pickup => AiMode::Pickup,
            ZoneKind::Dropoff => AiMode::Dropoff,
        };
        self.target_zone = Some(zone.id);
    }

    fn drop_target(&mut self, mode: AiMode) {
        self.mode = mode;
        self.target_zone = None;
        self.reset_approach();
    }

    fn reset_approach(&mut self) {
        self.approach = ApproachPhase::Direct;
        self.braking_started = false;
    }

    /// The zone being chased, if it still exists
    fn target<'a>(&self, zones: &'a [DeliveryZone]) -> Option<&'a DeliveryZone> {
        let id = self.target_zone?;
        zones.iter().find(|z| z.id == id)
    }

    /// Fall back to cruising once the course timer runs out, sometimes
    /// picking a new heading
    fn maybe_cruise(&mut self, rng: &mut impl Rng) {
        if self.course_timer > 0 || self.mode.is_zone_run() {
            return;
        }
        self.drop_target(AiMode::Cruise);
        self.safe_spot = None;
        if rng.random_bool(0.01) {
            self.new_heading(rng);
        }
    }

    fn new_heading(&mut self, rng: &mut impl Rng) {
        self.target_angle = rng.random_range(0.0..360.0);
        self.course_timer = COURSE_CHANGE_DELAY;
    }
}

/// Build a pilot by its registered name
pub fn create_ai(name: &str, rng: &mut impl Rng) -> Option<ShipAi> {
    AiKind::from_name(name).map(|kind| ShipAi::new(kind, rng))
}

/// A random cargo-hauling pilot
pub fn create_random_ai(rng: &mut impl Rng) -> ShipAi {
    let kind = AiKind::DELIVERY_CAPABLE.choose(rng).copied().unwrap_or(AiKind::Original);
    log::debug!("Picked {} pilot", kind.name());
    ShipAi::new(kind, rng)
}

/// Memoryless pilot used to drive human ships in demo mode
pub fn autopilot_controls(ship: &Ship, asteroids: &[Asteroid], zones: &[DeliveryZone]) -> Controls {
    let threats = nav::dangerous_asteroids(ship, asteroids, 150.0, 60.0);
    if let Some(threat) = threats.first() {
        return nav::evade(ship, &asteroids[threat.index], 10.0);
    }
    if nav::should_pursue_delivery(ship, asteroids, zones) {
        if let Some((zone, _)) = nav::closest_zone(ship, zones, nav::wanted_zone(ship)) {
            return nav::approach_zone(ship, zone);
        }
    }
    match nav::closest_asteroid(ship, asteroids) {
        Some((rock, d)) if d < 150.0 => nav::avoid(ship, rock, 150.0 - (SHIP_SIZE + rock.radius()), 0.3, 15.0),
        _ => Controls::new(ship.speed() < 1.0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::spacewar::consts::*;
    use crate::games::spacewar::entities::AsteroidSize;
    use crate::wrapped_distance;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rock(pos: Vec2, vel: Vec2) -> Asteroid {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut a = Asteroid::new(50, pos, AsteroidSize::Medium, &mut rng);
        a.vel = vel;
        a
    }

    /// Fly one ship with a pilot against a static field, returning the
    /// closest it got to `goal`
    fn fly(kind: AiKind, mut ship: Ship, zones: &[DeliveryZone], goal: Vec2, ticks: u32) -> f32 {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut ai = ShipAi::new(kind, &mut rng);
        let mut closest = f32::MAX;
        for _ in 0..ticks {
            ship.controls = ai.decide(&ship, &[], zones, &mut rng);
            ship.update();
            closest = closest.min(wrapped_distance(ship.pos, goal, WORLD));
        }
        closest
    }

    #[test]
    fn test_registry_names() {
        let mut rng = Pcg32::seed_from_u64(1);
        for kind in AiKind::ALL {
            assert_eq!(create_ai(kind.name(), &mut rng).map(|ai| ai.kind), Some(kind));
        }
        assert!(create_ai("kamikaze", &mut rng).is_none());
        assert_eq!(AiKind::from_name(" Cautious "), Some(AiKind::Cautious));
    }

    #[test]
    fn test_random_ai_hauls_cargo() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..50 {
            assert_ne!(create_random_ai(&mut rng).kind, AiKind::Survival);
        }
    }

    #[test]
    fn test_every_pilot_evades_incoming_rock() {
        for kind in AiKind::ALL {
            let mut rng = Pcg32::seed_from_u64(4);
            let mut ai = ShipAi::new(kind, &mut rng);
            let ship = Ship::new(1, Vec2::new(500.0, 500.0), 90.0, None);
            let asteroids = vec![rock(Vec2::new(620.0, 500.0), Vec2::new(-2.0, 0.0))];
            let controls = ai.decide(&ship, &asteroids, &[], &mut rng);
            assert_eq!(ai.mode, AiMode::Evade, "{}", kind.name());
            assert!(controls.thrust, "{}", kind.name());
        }
    }

    #[test]
    fn test_survival_ignores_zones() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ai = ShipAi::new(AiKind::Survival, &mut rng);
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        let zones = vec![DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(650.0, 500.0))];
        ai.decide(&ship, &[], &zones, &mut rng);
        assert_eq!(ai.mode, AiMode::Cruise);
        assert_eq!(ai.target_zone, None);
    }

    #[test]
    fn test_zone_pilots_reach_pickup() {
        for kind in AiKind::DELIVERY_CAPABLE {
            let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
            let goal = Vec2::new(800.0, 500.0);
            let zones = vec![DeliveryZone::new(2, ZoneKind::Pickup, goal)];
            let closest = fly(kind, ship, &zones, goal, 1200);
            assert!(closest < ZONE_SIZE, "{} got no closer than {closest}", kind.name());
        }
    }

    #[test]
    fn test_delivery_pilot_waits_for_dropoff() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut ai = ShipAi::new(AiKind::Delivery, &mut rng);
        let mut ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        ship.has_cargo = true;
        let zones = vec![DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(800.0, 500.0))];
        ai.decide(&ship, &[], &zones, &mut rng);
        assert_eq!(ai.mode, AiMode::WaitForDropoff);
    }

    #[test]
    fn test_lost_target_returns_to_cruise() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut ai = ShipAi::new(AiKind::Original, &mut rng);
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        let zones = vec![DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(700.0, 500.0))];
        ai.decide(&ship, &[], &zones, &mut rng);
        assert_eq!(ai.mode, AiMode::Pickup);
        ai.decide(&ship, &[], &[], &mut rng);
        assert_eq!(ai.mode, AiMode::Cruise);
        assert_eq!(ai.target_zone, None);
    }

    #[test]
    fn test_autopilot_heads_for_zone() {
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, Some(0));
        let zones = vec![DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(900.0, 500.0))];
        let controls = autopilot_controls(&ship, &[], &zones);
        assert!(controls.thrust);
        assert_eq!(controls.rotation, 0);
    }
}
