//! Navigation helpers shared by the ship AIs
//!
//! Bearings and distances are measured across the wrap-around edges.

use glam::Vec2;

use crate::games::spacewar::consts::*;
use crate::games::spacewar::entities::{Asteroid, Controls, DeliveryZone, Ship, ZoneKind};
use crate::{angle_diff_degrees, heading_vec, normalize_degrees, wrap_position, wrapped_delta, wrapped_distance};

/// An asteroid on a collision course
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threat {
    pub index: usize,
    pub distance: f32,
    /// Estimated ticks until impact
    pub time: f32,
}

/// Bearing in degrees from `from` to `to`, taking the short way around
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = wrapped_delta(from, to, WORLD);
    normalize_degrees(d.y.atan2(d.x).to_degrees())
}

/// Direction of a velocity in degrees
pub fn velocity_angle(v: Vec2) -> f32 {
    normalize_degrees(v.y.atan2(v.x).to_degrees())
}

/// Turn toward `target`, holding steady inside the deadband
pub fn steer(current: f32, target: f32, deadband: f32) -> i8 {
    let diff = angle_diff_degrees(current, target);
    if diff.abs() < deadband {
        0
    } else if diff > 0.0 {
        1
    } else {
        -1
    }
}

pub fn steering_direction(current: f32, target: f32) -> i8 {
    steer(current, target, 5.0)
}

/// Ticks until the ship and asteroid touch, if their paths come within a
/// 10px margin during the next `frames` ticks
pub fn predict_collision(ship: &Ship, asteroid: &Asteroid, frames: f32) -> Option<f32> {
    let delta = wrapped_delta(ship.pos, asteroid.pos, WORLD);
    let relative = asteroid.vel - ship.vel;
    let contact = SHIP_SIZE + asteroid.radius();

    // Closest approach inside the horizon, not just the endpoint
    let speed_sq = relative.length_squared();
    let t_min = if speed_sq < 1e-4 {
        0.0
    } else {
        (-delta.dot(relative) / speed_sq).clamp(0.0, frames)
    };
    if (delta + relative * t_min).length() >= contact + 10.0 {
        return None;
    }

    let current = delta.length();
    if current <= contact {
        return Some(0.0);
    }
    // Speed along the line between them
    let closing = -relative.dot(delta / current);
    if closing < 0.01 {
        return Some(frames);
    }
    Some(((current - contact) / closing).clamp(0.0, frames))
}

/// Asteroids within `reach` that are on a collision course, nearest first
pub fn dangerous_asteroids(ship: &Ship, asteroids: &[Asteroid], reach: f32, frames: f32) -> Vec<Threat> {
    let mut threats: Vec<Threat> = asteroids
        .iter()
        .enumerate()
        .filter_map(|(index, a)| {
            let distance = wrapped_distance(ship.pos, a.pos, WORLD);
            if distance >= reach {
                return None;
            }
            predict_collision(ship, a, frames).map(|time| Threat { index, distance, time })
        })
        .collect();
    threats.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    threats
}

pub fn closest_asteroid<'a>(ship: &Ship, asteroids: &'a [Asteroid]) -> Option<(&'a Asteroid, f32)> {
    asteroids
        .iter()
        .map(|a| (a, wrapped_distance(ship.pos, a.pos, WORLD)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn closest_zone<'a>(ship: &Ship, zones: &'a [DeliveryZone], kind: ZoneKind) -> Option<(&'a DeliveryZone, f32)> {
    zones
        .iter()
        .filter(|z| z.kind == kind)
        .map(|z| (z, wrapped_distance(ship.pos, z.pos, WORLD)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// The zone kind this ship should head for next
pub fn wanted_zone(ship: &Ship) -> ZoneKind {
    if ship.has_cargo { ZoneKind::Dropoff } else { ZoneKind::Pickup }
}

/// Zones are worth chasing unless the neighbourhood is crowded
pub fn should_pursue_delivery(ship: &Ship, asteroids: &[Asteroid], zones: &[DeliveryZone]) -> bool {
    if zones.is_empty() {
        return false;
    }
    let mut close = 0;
    for a in asteroids {
        let d = wrapped_distance(ship.pos, a.pos, WORLD);
        if d < 50.0 {
            return false;
        }
        if d < 100.0 {
            close += 1;
        }
    }
    close <= 3
}

/// Distance covered while drag bleeds `speed` down to `desired`
pub fn braking_distance(speed: f32, desired: f32) -> f32 {
    if speed <= desired {
        return 0.0;
    }
    if desired <= 0.01 {
        return speed / SHIP_DRAG;
    }
    let retain = 1.0 - SHIP_DRAG;
    let frames = (desired / speed).ln() / retain.ln();
    speed * (1.0 - retain.powf(frames)) / SHIP_DRAG
}

/// Thrust sideways out of an asteroid's path
pub fn evade(ship: &Ship, asteroid: &Asteroid, deadband: f32) -> Controls {
    let relative = asteroid.vel - ship.vel;
    let escape = if relative.length() < 0.01 {
        bearing(asteroid.pos, ship.pos)
    } else {
        let approach = velocity_angle(relative);
        let to_asteroid = bearing(ship.pos, asteroid.pos);
        let a = normalize_degrees(approach + 90.0);
        let b = normalize_degrees(approach - 90.0);
        // Pick the perpendicular that points further from the rock
        if angle_diff_degrees(to_asteroid, a).abs() > angle_diff_degrees(to_asteroid, b).abs() {
            a
        } else {
            b
        }
    };
    Controls::new(true, steer(ship.angle, escape, deadband))
}

/// Turn away from a nearby asteroid, thrusting harder the closer it is
///
/// Intensity ramps from 0 at `span` past contact up to 1 at contact.
pub fn avoid(ship: &Ship, asteroid: &Asteroid, span: f32, threshold: f32, deadband: f32) -> Controls {
    let away = bearing(asteroid.pos, ship.pos);
    let distance = wrapped_distance(ship.pos, asteroid.pos, WORLD);
    let gap = distance - (SHIP_SIZE + asteroid.radius());
    let intensity = 1.0 - (gap / span.max(1.0)).min(1.0);
    Controls::new(intensity > threshold, steer(ship.angle, away, deadband))
}

/// Head for a zone and ease off near it so the ship arrives slow enough
pub fn approach_zone(ship: &Ship, zone: &DeliveryZone) -> Controls {
    let to_zone = bearing(ship.pos, zone.pos);
    let diff = angle_diff_degrees(ship.angle, to_zone);
    let distance = wrapped_distance(ship.pos, zone.pos, WORLD);
    let speed = ship.speed();

    let thrust = if distance < ZONE_SIZE {
        if speed > MAX_PICKUP_VELOCITY * 0.8 {
            // Only burn when roughly facing against the drift
            let retro = velocity_angle(-ship.vel);
            angle_diff_degrees(ship.angle, retro).abs() < 30.0
        } else {
            false
        }
    } else if distance < ZONE_SIZE * 2.0 && speed > MAX_PICKUP_VELOCITY {
        false
    } else {
        diff.abs() < 45.0
    };
    Controls::new(thrust, steering_direction(ship.angle, to_zone))
}

/// Any asteroid within `reach` of the point `ahead` ticks-worth of travel
pub fn blocked_ahead(ship: &Ship, asteroids: &[Asteroid], ahead: f32, margin: f32) -> bool {
    let look = wrap_position(ship.pos + heading_vec(ship.angle) * ahead, WORLD);
    asteroids
        .iter()
        .any(|a| wrapped_distance(look, a.pos, WORLD) < a.radius() + SHIP_SIZE + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::spacewar::entities::AsteroidSize;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rock(pos: Vec2, vel: Vec2) -> Asteroid {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut a = Asteroid::new(9, pos, AsteroidSize::Medium, &mut rng);
        a.vel = vel;
        a
    }

    #[test]
    fn test_steering_deadband() {
        assert_eq!(steering_direction(0.0, 3.0), 0);
        assert_eq!(steering_direction(0.0, 20.0), 1);
        assert_eq!(steering_direction(0.0, 340.0), -1);
        assert_eq!(steering_direction(350.0, 10.0), 1);
    }

    #[test]
    fn test_predict_head_on_collision() {
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        let incoming = rock(Vec2::new(600.0, 500.0), Vec2::new(-2.0, 0.0));
        let time = predict_collision(&ship, &incoming, 60.0).expect("on course");
        // 60px gap closing at 2px/tick
        assert!((time - 30.0).abs() < 1.0, "time {time}");

        let passing = rock(Vec2::new(600.0, 300.0), Vec2::new(-2.0, 0.0));
        assert_eq!(predict_collision(&ship, &passing, 60.0), None);
    }

    #[test]
    fn test_dangerous_sorted_by_distance() {
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        let asteroids = vec![
            rock(Vec2::new(620.0, 500.0), Vec2::new(-2.0, 0.0)),
            rock(Vec2::new(560.0, 500.0), Vec2::new(-1.0, 0.0)),
            rock(Vec2::new(900.0, 500.0), Vec2::new(-5.0, 0.0)),
        ];
        let threats = dangerous_asteroids(&ship, &asteroids, 150.0, 60.0);
        assert_eq!(threats.iter().map(|t| t.index).collect::<Vec<_>>(), vec![1, 0]);
    }

    #[test]
    fn test_braking_distance() {
        assert_eq!(braking_distance(1.0, 2.0), 0.0);
        assert!((braking_distance(2.0, 0.0) - 400.0).abs() < 1e-3);
        let partial = braking_distance(4.0, 2.0);
        // Geometric series: the velocity lost is drag times distance
        assert!((partial * SHIP_DRAG - 2.0).abs() < 1e-2, "partial {partial}");
    }

    #[test]
    fn test_should_not_pursue_when_crowded() {
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        let zones = vec![DeliveryZone::new(2, ZoneKind::Pickup, Vec2::new(800.0, 500.0))];
        assert!(should_pursue_delivery(&ship, &[], &zones));
        assert!(!should_pursue_delivery(&ship, &[], &[]));
        let near = vec![rock(Vec2::new(540.0, 500.0), Vec2::ZERO)];
        assert!(!should_pursue_delivery(&ship, &near, &zones));
        let crowd: Vec<Asteroid> = (0..4)
            .map(|i| rock(heading_vec(i as f32 * 90.0) * 80.0 + ship.pos, Vec2::ZERO))
            .collect();
        assert!(!should_pursue_delivery(&ship, &crowd, &zones));
    }

    #[test]
    fn test_evade_thrusts_sideways() {
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 90.0, None);
        let incoming = rock(Vec2::new(600.0, 500.0), Vec2::new(-2.0, 0.0));
        let controls = evade(&ship, &incoming, 10.0);
        assert!(controls.thrust);
        // Already facing a perpendicular (down)
        assert_eq!(controls.rotation, 0);
    }

    #[test]
    fn test_avoid_turns_away() {
        let ship = Ship::new(1, Vec2::new(500.0, 500.0), 0.0, None);
        let close = rock(Vec2::new(550.0, 500.0), Vec2::ZERO);
        let controls = avoid(&ship, &close, 110.0, 0.3, 5.0);
        assert!(controls.thrust);
        assert_ne!(controls.rotation, 0);
    }

    #[test]
    fn test_bearing_uses_short_way() {
        let b = bearing(Vec2::new(10.0, 600.0), Vec2::new(1590.0, 600.0));
        assert!((b - 180.0).abs() < 1e-3);
    }
}
