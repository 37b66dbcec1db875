//! Cargo-focused pilot: plans its braking so it coasts into zones slow
//! enough to trade, and loiters with cargo until a dropoff shows up

use rand::Rng;

use super::nav;
use super::{AiMode, ApproachPhase, ShipAi};
use crate::games::spacewar::consts::*;
use crate::games::spacewar::entities::{Asteroid, Controls, DeliveryZone, Ship};
use crate::{angle_diff_degrees, wrapped_distance};

const REACTION_DISTANCE: f32 = 150.0;
const PREDICTION_FRAMES: f32 = 60.0;

pub fn decide(
    ai: &mut ShipAi,
    ship: &Ship,
    asteroids: &[Asteroid],
    zones: &[DeliveryZone],
    rng: &mut impl Rng,
) -> Controls {
    let threats = nav::dangerous_asteroids(ship, asteroids, REACTION_DISTANCE, PREDICTION_FRAMES);

    if !zones.is_empty() && threats.is_empty() {
        match nav::closest_zone(ship, zones, nav::wanted_zone(ship)) {
            Some((zone, _)) => {
                ai.seek(zone);
                return precision_approach(ai, ship, zone);
            }
            None if ship.has_cargo => {
                ai.drop_target(AiMode::WaitForDropoff);
                return wait_for_dropoff(ai, ship, asteroids, rng);
            }
            None => {}
        }
    }

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
        return nav::avoid(ship, rock, span, 0.3, 5.0);
    }
    if ai.mode.is_zone_run() {
        match ai.target(zones) {
            Some(zone) => return precision_approach(ai, ship, zone),
            None => ai.drop_target(AiMode::Cruise),
        }
    }
    cruise_toward_work(ai, ship, zones, rng)
}

/// Direct flight, then a retro burn timed by the drag model, then a slow
/// final drift into the zone
fn precision_approach(ai: &mut ShipAi, ship: &Ship, zone: &DeliveryZone) -> Controls {
    let to_zone = nav::bearing(ship.pos, zone.pos);
    let diff = angle_diff_degrees(ship.angle, to_zone);
    let distance = wrapped_distance(ship.pos, zone.pos, WORLD);
    let speed = ship.speed();
    let turn = nav::steering_direction(ship.angle, to_zone);

    if distance < ZONE_SIZE * 0.8 {
        ai.approach = ApproachPhase::Final;
        if speed <= MAX_PICKUP_VELOCITY * 0.8 {
            return Controls::default();
        }
        let retro = nav::velocity_angle(-ship.vel);
        if angle_diff_degrees(ship.angle, retro).abs() < 30.0 {
            return Controls::new(true, 0);
        }
        return Controls::new(false, nav::steering_direction(ship.angle, retro));
    }

    if !ai.braking_started && distance < nav::braking_distance(speed, MAX_PICKUP_VELOCITY * 0.8) * 1.5 {
        ai.approach = ApproachPhase::Brake;
        ai.braking_started = true;
        return Controls::new(false, turn);
    }

    if ai.approach == ApproachPhase::Brake {
        if speed > MAX_PICKUP_VELOCITY {
            let retro = nav::velocity_angle(-ship.vel);
            let thrust = angle_diff_degrees(ship.angle, retro).abs() < 90.0;
            return Controls::new(thrust, nav::steering_direction(ship.angle, retro));
        }
        ai.approach = ApproachPhase::Direct;
        return Controls::new(false, turn);
    }

    ai.approach = ApproachPhase::Direct;
    // Far out, build speed; close in, only nudge a stalled ship along
    let thrust = diff.abs() < 20.0
        && speed < 3.0
        && (distance > ZONE_SIZE * 2.0 || speed < MAX_PICKUP_VELOCITY * 0.5);
    Controls::new(thrust, turn)
}

/// Loiter slowly with cargo, steering clear of anything ahead
fn wait_for_dropoff(ai: &mut ShipAi, ship: &Ship, asteroids: &[Asteroid], rng: &mut impl Rng) -> Controls {
    if nav::blocked_ahead(ship, asteroids, 100.0, 20.0) {
        ai.new_heading(rng);
    }
    let thrust = rng.random_bool(0.05) && ship.speed() < 1.0;
    Controls::new(thrust, nav::steering_direction(ship.angle, ai.target_angle))
}

/// Drift toward the next useful zone when one exists, else wander
fn cruise_toward_work(ai: &ShipAi, ship: &Ship, zones: &[DeliveryZone], rng: &mut impl Rng) -> Controls {
    if let Some((zone, _)) = nav::closest_zone(ship, zones, nav::wanted_zone(ship)) {
        let heading = nav::bearing(ship.pos, zone.pos);
        let thrust = angle_diff_degrees(ship.angle, heading).abs() < 30.0 && ship.speed() < 3.0;
        return Controls::new(thrust, nav::steering_direction(ship.angle, heading));
    }
    let thrust = rng.random_bool(0.2) && ship.speed() < 2.0;
    Controls::new(thrust, nav::steering_direction(ship.angle, ai.target_angle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::spacewar::ai::AiKind;
    use crate::games::spacewar::entities::ZoneKind;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pilot() -> ShipAi {
        ShipAi::new(AiKind::Delivery, &mut Pcg32::seed_from_u64(1))
    }

    #[test]
    fn test_fast_ship_starts_braking() {
        let mut ai = pilot();
        let mut ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        ship.vel = Vec2::new(4.0, 0.0);
        let zone = DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(900.0, 500.0));
        let controls = precision_approach(&mut ai, &ship, &zone);
        assert_eq!(ai.approach, ApproachPhase::Brake);
        assert!(!controls.thrust);

        // Next tick it turns toward a retro burn
        let controls = precision_approach(&mut ai, &ship, &zone);
        assert_eq!(ai.approach, ApproachPhase::Brake);
        assert_eq!(controls.rotation, 1);
    }

    #[test]
    fn test_far_slow_ship_flies_direct() {
        let mut ai = pilot();
        let ship = Ship::new(1, Vec2::new(100.0, 500.0), 0.0, None);
        let zone = DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(600.0, 500.0));
        let controls = precision_approach(&mut ai, &ship, &zone);
        assert_eq!(ai.approach, ApproachPhase::Direct);
        assert!(controls.thrust);
    }

    #[test]
    fn test_final_phase_drifts() {
        let mut ai = pilot();
        let mut ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        ship.vel = Vec2::new(0.5, 0.0);
        let zone = DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(520.0, 500.0));
        assert_eq!(precision_approach(&mut ai, &ship, &zone), Controls::default());
        assert_eq!(ai.approach, ApproachPhase::Final);
    }

    #[test]
    fn test_delivers_cargo_end_to_end() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut ai = pilot();
        let mut ship = Ship::new(1, Vec2::new(300.0, 500.0), 0.0, None);
        ship.has_cargo = true;
        let zones = vec![DeliveryZone::new(2, ZoneKind::Dropoff, Vec2::new(400.0, 500.0))];
        for _ in 0..600 {
            ship.controls = decide(&mut ai, &ship, &[], &zones, &mut rng);
            ship.update();
            ship.interact(&zones[0]);
            if ship.credits > 0 {
                break;
            }
        }
        assert_eq!(ship.credits, 1);
    }
}
