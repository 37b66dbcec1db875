//! The first pilot: reacts to the nearest danger, detours for close zones

use rand::Rng;

use super::nav::{self, Threat};
use super::{AiMode, ShipAi};
use crate::games::spacewar::consts::SHIP_SIZE;
use crate::games::spacewar::entities::{Asteroid, Controls, DeliveryZone, Ship};

const REACTION_DISTANCE: f32 = 150.0;
const PREDICTION_FRAMES: f32 = 60.0;
/// Zones further than this are ignored
const ZONE_RANGE: f32 = 450.0;

pub fn decide(
    ai: &mut ShipAi,
    ship: &Ship,
    asteroids: &[Asteroid],
    zones: &[DeliveryZone],
    rng: &mut impl Rng,
) -> Controls {
    let threats = nav::dangerous_asteroids(ship, asteroids, REACTION_DISTANCE, PREDICTION_FRAMES);
    if threats.is_empty() {
        if let Some((zone, distance)) = nav::closest_zone(ship, zones, nav::wanted_zone(ship)) {
            if distance < ZONE_RANGE {
                ai.seek(zone);
                return nav::approach_zone(ship, zone);
            }
        }
    }
    respond(ai, ship, asteroids, zones, &threats, rng)
}

/// Danger handling and cruising, without looking for new zones
pub fn react(
    ai: &mut ShipAi,
    ship: &Ship,
    asteroids: &[Asteroid],
    zones: &[DeliveryZone],
    rng: &mut impl Rng,
) -> Controls {
    let threats = nav::dangerous_asteroids(ship, asteroids, REACTION_DISTANCE, PREDICTION_FRAMES);
    respond(ai, ship, asteroids, zones, &threats, rng)
}

fn respond(
    ai: &mut ShipAi,
    ship: &Ship,
    asteroids: &[Asteroid],
    zones: &[DeliveryZone],
    threats: &[Threat],
    rng: &mut impl Rng,
) -> Controls {
    let closest = nav::closest_asteroid(ship, asteroids).filter(|(_, d)| *d < REACTION_DISTANCE);
    if !threats.is_empty() {
        ai.drop_target(AiMode::Evade);
    } else if closest.is_some() {
        ai.drop_target(AiMode::Avoid);
    } else {
        ai.maybe_cruise(rng);
    }

    if let (AiMode::Evade, Some(threat)) = (ai.mode, threats.first()) {
        return nav::evade(ship, &asteroids[threat.index], 10.0);
    }
    if let (AiMode::Avoid, Some((rock, _))) = (ai.mode, closest) {
        let span = REACTION_DISTANCE - (SHIP_SIZE + rock.radius());
        return nav::avoid(ship, rock, span, 0.3, 15.0);
    }
    if ai.mode.is_zone_run() {
        match ai.target(zones) {
            Some(zone) => return nav::approach_zone(ship, zone),
            None => ai.drop_target(AiMode::Cruise),
        }
    }
    cruise(ai, ship, rng)
}

fn cruise(ai: &ShipAi, ship: &Ship, rng: &mut impl Rng) -> Controls {
    let thrust = rng.random_bool(0.1) && ship.speed() < 2.0;
    Controls::new(thrust, nav::steering_direction(ship.angle, ai.target_angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::spacewar::ai::AiKind;
    use crate::games::spacewar::entities::{AsteroidSize, ZoneKind};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_close_rock_triggers_avoid() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ai = ShipAi::new(AiKind::Original, &mut rng);
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        // Stationary rock off to the side: close but not on course
        let mut rock = Asteroid::new(2, Vec2::new(500.0, 600.0), AsteroidSize::Small, &mut rng);
        rock.vel = Vec2::ZERO;
        let controls = decide(&mut ai, &ship, &[rock], &[], &mut rng);
        assert_eq!(ai.mode, AiMode::Avoid);
        // Away from a rock below means turning up (counter-clockwise)
        assert_eq!(controls.rotation, -1);
    }

    #[test]
    fn test_far_zone_is_ignored() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ai = ShipAi::new(AiKind::Original, &mut rng);
        let ship = Ship::new(1, Vec2::new(100.0, 100.0), 0.0, None);
        let zones = vec![DeliveryZone::new(3, ZoneKind::Pickup, Vec2::new(700.0, 100.0))];
        decide(&mut ai, &ship, &[], &zones, &mut rng);
        assert_eq!(ai.mode, AiMode::Cruise);
    }

    #[test]
    fn test_threat_beats_zone() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ai = ShipAi::new(AiKind::Original, &mut rng);
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        let zones = vec![DeliveryZone::new(3, ZoneKind::Pickup, Vec2::new(700.0, 500.0))];
        let mut rock = Asteroid::new(2, Vec2::new(600.0, 500.0), AsteroidSize::Medium, &mut rng);
        rock.vel = Vec2::new(-2.0, 0.0);
        decide(&mut ai, &ship, &[rock], &zones, &mut rng);
        assert_eq!(ai.mode, AiMode::Evade);
        assert_eq!(ai.target_zone, None);
    }
}
