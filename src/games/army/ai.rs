//! Regiment AI
//!
//! Every regiment carries a [`Personality`]. Each tick the AI picks one
//! [`Action`] from the battlefield snapshot: fire if set up and on target,
//! otherwise close or open the range, then wheel onto the target, then hold
//! to build up aim. Flanking regiments first try to break away from the
//! bearing their allies already cover.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::regiment::{Action, Regiment};
use crate::{angle_diff_degrees, bearing_degrees};

/// Tuning knobs for one AI style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityParams {
    pub optimal_distance_min: f32,
    pub optimal_distance_max: f32,
    /// Degrees; tighter means more precise aiming
    pub alignment_threshold: f32,
    /// Degrees; below this the regiment advances/retreats instead of wheeling
    pub maneuver_threshold: f32,
    pub random_action_chance: f64,
    pub aggression: f32,
    pub coordination: f32,
    pub caution: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Standard,
    Cautious,
    Aggressive,
    Flanking,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Standard,
        Personality::Cautious,
        Personality::Aggressive,
        Personality::Flanking,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Personality::Standard => "Standard",
            Personality::Cautious => "Cautious",
            Personality::Aggressive => "Aggressive",
            Personality::Flanking => "Flanking",
        }
    }

    pub fn params(self) -> PersonalityParams {
        match self {
            Personality::Standard => PersonalityParams {
                optimal_distance_min: 250.0,
                optimal_distance_max: 450.0,
                alignment_threshold: 10.0,
                maneuver_threshold: 20.0,
                random_action_chance: 0.02,
                aggression: 0.5,
                coordination: 0.5,
                caution: 0.5,
            },
            Personality::Cautious => PersonalityParams {
                optimal_distance_min: 350.0,
                optimal_distance_max: 500.0,
                alignment_threshold: 8.0,
                maneuver_threshold: 15.0,
                random_action_chance: 0.01,
                aggression: 0.2,
                coordination: 0.7,
                caution: 0.9,
            },
            Personality::Aggressive => PersonalityParams {
                optimal_distance_min: 180.0,
                optimal_distance_max: 350.0,
                alignment_threshold: 15.0,
                maneuver_threshold: 25.0,
                random_action_chance: 0.03,
                aggression: 0.9,
                coordination: 0.3,
                caution: 0.2,
            },
            Personality::Flanking => PersonalityParams {
                optimal_distance_min: 250.0,
                optimal_distance_max: 400.0,
                alignment_threshold: 12.0,
                maneuver_threshold: 18.0,
                random_action_chance: 0.02,
                aggression: 0.6,
                coordination: 0.5,
                caution: 0.4,
            },
        }
    }
}

impl PersonalityParams {
    /// Preferred engagement band after aggression/caution shifts
    pub fn effective_range(&self) -> (f32, f32) {
        let shift = if self.aggression > 0.5 {
            -(self.aggression - 0.5) * 100.0
        } else if self.caution > 0.5 {
            (self.caution - 0.5) * 100.0
        } else {
            0.0
        };
        (
            self.optimal_distance_min + shift,
            self.optimal_distance_max + shift,
        )
    }
}

/// How a team's regiments get their personalities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamAi {
    Fixed(Personality),
    /// Each regiment rolls its own personality
    Random,
}

impl Default for TeamAi {
    fn default() -> Self {
        TeamAi::Fixed(Personality::Standard)
    }
}

impl TeamAi {
    pub fn pick(self, rng: &mut impl Rng) -> Personality {
        match self {
            TeamAi::Fixed(p) => p,
            TeamAi::Random => *Personality::ALL
                .choose(rng)
                .unwrap_or(&Personality::Standard),
        }
    }
}

fn nearest_alive<'a>(regiment: &Regiment, enemies: &[&'a Regiment]) -> Option<&'a Regiment> {
    enemies
        .iter()
        .copied()
        .filter(|e| !e.destroyed)
        .min_by(|a, b| {
            let da = regiment.pos.distance_squared(a.pos);
            let db = regiment.pos.distance_squared(b.pos);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
}

fn wheel_toward(diff: f32) -> Action {
    if diff > 0.0 {
        Action::WheelRight
    } else {
        Action::WheelLeft
    }
}

/// Choose this tick's action. `None` means the regiment is out of the fight.
pub fn decide(
    regiment: &Regiment,
    allies: &[&Regiment],
    enemies: &[&Regiment],
    rng: &mut impl Rng,
) -> Option<Action> {
    if regiment.destroyed {
        return None;
    }
    if regiment.recovery_time > 0 {
        return Some(Action::Hold);
    }

    if regiment.personality == Personality::Flanking {
        if let Some(action) = flanking_action(regiment, allies, enemies) {
            return Some(action);
        }
    }

    Some(base_action(regiment, enemies, rng))
}

fn base_action(regiment: &Regiment, enemies: &[&Regiment], rng: &mut impl Rng) -> Action {
    let Some(target) = nearest_alive(regiment, enemies) else {
        return Action::MoveForward;
    };

    let p = regiment.personality.params();
    let distance = regiment.pos.distance(target.pos);
    let diff = angle_diff_degrees(regiment.angle, bearing_degrees(regiment.pos, target.pos));
    let (min_range, max_range) = p.effective_range();

    let in_range = (min_range..=max_range).contains(&distance);
    let aligned = diff.abs() < p.alignment_threshold;

    let action = if regiment.can_fire() && aligned && in_range {
        Action::Fire
    } else if aligned && in_range && regiment.stationary_time > 0 {
        // Keep building aim
        Action::Hold
    } else if distance > max_range {
        if diff.abs() < p.maneuver_threshold {
            Action::MoveForward
        } else {
            wheel_toward(diff)
        }
    } else if distance < min_range {
        if diff.abs() < p.maneuver_threshold {
            Action::MoveBackward
        } else {
            wheel_toward(diff)
        }
    } else if diff.abs() > p.alignment_threshold / 2.0 {
        wheel_toward(diff)
    } else {
        Action::Hold
    };

    if rng.random_bool(p.random_action_chance) {
        *Action::RANDOM_CHOICES.choose(rng).unwrap_or(&action)
    } else {
        action
    }
}

/// Wheel away when our bearing to the target is within 30 degrees of the
/// average bearing our allies have on it.
fn flanking_action(
    regiment: &Regiment,
    allies: &[&Regiment],
    enemies: &[&Regiment],
) -> Option<Action> {
    let target = nearest_alive(regiment, enemies)?;
    let ally_bearings: Vec<f32> = allies
        .iter()
        .filter(|a| !a.destroyed && a.id != regiment.id)
        .map(|a| bearing_degrees(a.pos, target.pos))
        .collect();
    if ally_bearings.is_empty() {
        return None;
    }

    let avg = ally_bearings.iter().sum::<f32>() / ally_bearings.len() as f32;
    let own = bearing_degrees(regiment.pos, target.pos);
    let d = (own - avg).rem_euclid(360.0);

    if d < 30.0 || d > 330.0 {
        log::debug!("regiment {} flanking away from allies (d={:.1})", regiment.id, d);
        Some(if d < 180.0 {
            Action::WheelLeft
        } else {
            Action::WheelRight
        })
    } else {
        None
    }
}
