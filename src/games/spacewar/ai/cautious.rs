//! Careful pilot: longer lookahead, checks the path before chasing a zone,
//! and runs for open space when boxed in

use glam::Vec2;
use rand::Rng;

use super::nav::{self, Threat};
use super::{AiMode, ShipAi};
use crate::games::spacewar::consts::*;
use crate::games::spacewar::entities::{Asteroid, Controls, DeliveryZone, Ship};
use crate::{angle_diff_degrees, wrapped_delta, wrapped_distance};

const REACTION_DISTANCE: f32 = 200.0;
const PREDICTION_FRAMES: f32 = 90.0;
/// A spot is safe when no asteroid is this close
const DANGER_DISTANCE: f32 = 150.0;
const ZONE_RANGE: f32 = 400.0;
const SAFE_SPOT_SAMPLES: usize = 20;

pub fn decide(
    ai: &mut ShipAi,
    ship: &Ship,
    asteroids: &[Asteroid],
    zones: &[DeliveryZone],
    rng: &mut impl Rng,
) -> Controls {
    let mut threats = nav::dangerous_asteroids(ship, asteroids, REACTION_DISTANCE, PREDICTION_FRAMES);
    threats.sort_by(|a, b| a.time.total_cmp(&b.time));

    if threats.len() <= 1 {
        if let Some((zone, distance)) = nav::closest_zone(ship, zones, nav::wanted_zone(ship)) {
            if distance < ZONE_RANGE && !path_has_threats(ship, zone.pos, asteroids) {
                ai.seek(zone);
                return approach_safely(ship, zone);
            }
        }
    }

    let closest = nav::closest_asteroid(ship, asteroids).filter(|(_, d)| *d < REACTION_DISTANCE);
    if !threats.is_empty() {
        ai.drop_target(AiMode::Evade);
        if threats.len() > 1 && rng.random_bool(0.1) {
            ai.safe_spot = find_safe_spot(asteroids, rng);
        }
    } else if closest.is_some() {
        ai.drop_target(AiMode::Avoid);
    } else {
        ai.maybe_cruise(rng);
    }

    if ai.mode == AiMode::Evade && !threats.is_empty() {
        return match ai.safe_spot {
            Some(spot) => move_to_safe_spot(ai, ship, spot),
            None => escape(ship, asteroids, &threats),
        };
    }
    if let (AiMode::Avoid, Some((rock, _))) = (ai.mode, closest) {
        return nav::avoid(ship, rock, REACTION_DISTANCE * 0.7, 0.2, 10.0);
    }
    if ai.mode.is_zone_run() {
        match ai.target(zones) {
            Some(zone) => return approach_safely(ship, zone),
            None => ai.drop_target(AiMode::Cruise),
        }
    }
    cruise_safely(ai, ship, asteroids, rng)
}

/// Any asteroid sitting within clearance of the straight line to `target`
fn path_has_threats(ship: &Ship, target: Vec2, asteroids: &[Asteroid]) -> bool {
    let path = wrapped_delta(ship.pos, target, WORLD);
    let length = path.length();
    if length < 1.0 {
        return false;
    }
    let dir = path / length;
    asteroids.iter().any(|a| {
        let to = wrapped_delta(ship.pos, a.pos, WORLD);
        let along = to.dot(dir);
        (0.0..=length).contains(&along) && (to - dir * along).length() < a.radius() + SHIP_SIZE + 20.0
    })
}

/// Best of a handful of random points, if it is clear of danger
fn find_safe_spot(asteroids: &[Asteroid], rng: &mut impl Rng) -> Option<Vec2> {
    let (spot, clearance) = (0..SAFE_SPOT_SAMPLES)
        .map(|_| {
            let p = Vec2::new(rng.random_range(0.0..WORLD_WIDTH), rng.random_range(0.0..WORLD_HEIGHT));
            let clearance = asteroids
                .iter()
                .map(|a| wrapped_distance(p, a.pos, WORLD))
                .fold(f32::MAX, f32::min);
            (p, clearance)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    (clearance > DANGER_DISTANCE).then_some(spot)
}

fn move_to_safe_spot(ai: &mut ShipAi, ship: &Ship, spot: Vec2) -> Controls {
    if wrapped_distance(ship.pos, spot, WORLD) < 50.0 {
        ai.safe_spot = None;
    }
    let heading = nav::bearing(ship.pos, spot);
    let thrust = angle_diff_degrees(ship.angle, heading).abs() < 45.0;
    Controls::new(thrust, nav::steering_direction(ship.angle, heading))
}

/// Run from the soonest threats, weighting each by urgency
fn escape(ship: &Ship, asteroids: &[Asteroid], threats: &[Threat]) -> Controls {
    if threats.len() == 1 {
        return nav::evade(ship, &asteroids[threats[0].index], 5.0);
    }
    let pull: Vec2 = threats
        .iter()
        .take(3)
        .map(|t| {
            let to = wrapped_delta(ship.pos, asteroids[t.index].pos, WORLD).normalize_or_zero();
            to / t.time.max(1.0)
        })
        .sum();
    if pull.length_squared() < 1e-6 {
        return nav::evade(ship, &asteroids[threats[0].index], 5.0);
    }
    let heading = nav::velocity_angle(-pull);
    Controls::new(true, nav::steer(ship.angle, heading, 10.0))
}

fn approach_safely(ship: &Ship, zone: &DeliveryZone) -> Controls {
    let to_zone = nav::bearing(ship.pos, zone.pos);
    let diff = angle_diff_degrees(ship.angle, to_zone);
    let distance = wrapped_distance(ship.pos, zone.pos, WORLD);
    let speed = ship.speed();

    if distance < ZONE_SIZE {
        if speed > MAX_PICKUP_VELOCITY * 0.7 {
            let retro = nav::velocity_angle(-ship.vel);
            let thrust = angle_diff_degrees(ship.angle, retro).abs() < 60.0;
            return Controls::new(thrust, nav::steering_direction(ship.angle, retro));
        }
        return Controls::default();
    }

    let turn = nav::steering_direction(ship.angle, to_zone);
    if distance < speed * 10.0 && speed > MAX_PICKUP_VELOCITY * 1.5 {
        return Controls::new(false, turn);
    }
    Controls::new(diff.abs() < 30.0, turn)
}

fn cruise_safely(ai: &mut ShipAi, ship: &Ship, asteroids: &[Asteroid], rng: &mut impl Rng) -> Controls {
    if nav::blocked_ahead(ship, asteroids, ship.speed() * 10.0, 20.0) {
        ai.new_heading(rng);
    }
    let thrust = rng.random_bool(0.1) && ship.speed() < 1.5;
    Controls::new(thrust, nav::steering_direction(ship.angle, ai.target_angle))
}
