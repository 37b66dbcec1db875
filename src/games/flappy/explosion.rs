//! Bird crash explosion
//!
//! A shock ring grows to `MAX_RADIUS`; crossing 30% and 60% of it releases
//! secondary bursts. The explosion is complete once the ring is fully grown
//! and every particle has burned out.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::renderer::{Canvas, with_alpha};

pub const MAX_RADIUS: f32 = 80.0;
pub const GROWTH_PER_TICK: f32 = 1.5;
pub const INITIAL_PARTICLES: usize = 50;
pub const FIRST_BURST: usize = 30;
pub const SECOND_BURST: usize = 40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub gravity: f32,
    pub size: f32,
    pub original_size: f32,
    pub lifetime: u32,
    pub max_lifetime: u32,
    pub color: [f32; 4],
    /// Leaves short-lived embers behind it
    pub trail: bool,
    pub trail_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub center: Vec2,
    pub color: [f32; 4],
    pub radius: f32,
    /// 0 = initial, 1 = after first burst, 2 = after second burst
    pub phase: u8,
    pub particles: Vec<Particle>,
    pub complete: bool,
}

fn jitter(rng: &mut impl Rng, c: f32, amount: f32) -> f32 {
    (c + rng.random_range(-amount..=amount)).clamp(0.0, 1.0)
}

impl Explosion {
    pub fn new(center: Vec2, color: [f32; 4], start_radius: f32, rng: &mut impl Rng) -> Self {
        let mut explosion = Self {
            center,
            color,
            radius: start_radius,
            phase: 0,
            particles: Vec::new(),
            complete: false,
        };
        explosion.add_particles(INITIAL_PARTICLES, false, rng);
        explosion
    }

    fn add_particles(&mut self, count: usize, secondary: bool, rng: &mut impl Rng) {
        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let (speed, size, lifetime, color) = if secondary {
                let color = if rng.random_bool(0.3) {
                    // Yellow/white sparks
                    [1.0, 1.0, rng.random_range(0.0..=0.4), 1.0]
                } else {
                    [
                        jitter(rng, self.color[0], 0.12),
                        jitter(rng, self.color[1], 0.12),
                        jitter(rng, self.color[2], 0.12),
                        1.0,
                    ]
                };
                (
                    rng.random_range(2.0..8.0),
                    rng.random_range(1..=6) as f32,
                    rng.random_range(30..=60),
                    color,
                )
            } else {
                let color = if rng.random_bool(0.6) {
                    // Fire colors
                    [
                        rng.random_range(0.78..=1.0),
                        rng.random_range(0.2..=0.6),
                        0.0,
                        1.0,
                    ]
                } else {
                    [
                        jitter(rng, self.color[0], 0.08),
                        jitter(rng, self.color[1], 0.08),
                        jitter(rng, self.color[2], 0.08),
                        1.0,
                    ]
                };
                (
                    rng.random_range(1.0..6.0),
                    rng.random_range(3..=10) as f32,
                    rng.random_range(40..=80),
                    color,
                )
            };

            let gravity = if rng.random_bool(0.7) {
                rng.random_range(0.0..0.1)
            } else {
                0.0
            };
            let offset = if secondary {
                Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0))
            } else {
                Vec2::ZERO
            };

            self.particles.push(Particle {
                pos: self.center + offset,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                gravity,
                size,
                original_size: size,
                lifetime,
                max_lifetime: lifetime,
                color,
                trail: rng.random_bool(0.3),
                trail_count: 0,
            });
        }
    }

    pub fn update(&mut self, rng: &mut impl Rng) {
        if self.complete {
            return;
        }

        if self.phase == 0 && self.radius > MAX_RADIUS * 0.3 {
            self.phase = 1;
            self.add_particles(FIRST_BURST, true, rng);
        } else if self.phase == 1 && self.radius > MAX_RADIUS * 0.6 {
            self.phase = 2;
            self.add_particles(SECOND_BURST, true, rng);
        }

        self.radius += GROWTH_PER_TICK;
        if self.radius > MAX_RADIUS {
            self.radius = MAX_RADIUS;
            if self.particles.is_empty() {
                self.complete = true;
                return;
            }
        }

        let mut embers = Vec::new();
        self.particles.retain_mut(|p| {
            p.pos += p.vel;
            p.vel.y += p.gravity;
            p.lifetime = p.lifetime.saturating_sub(1);
            let life = p.lifetime as f32 / p.max_lifetime as f32;
            p.size = p.original_size * life.max(0.5);
            if p.lifetime == 0 {
                return false;
            }

            if p.trail && rng.random_bool(0.3) {
                p.trail_count += 1;
                if p.trail_count % 2 == 0 {
                    let size = p.size * 0.6;
                    embers.push(Particle {
                        pos: p.pos,
                        vel: Vec2::ZERO,
                        gravity: 0.0,
                        size,
                        original_size: size,
                        lifetime: rng.random_range(5..=10),
                        max_lifetime: 10,
                        color: [
                            (p.color[0] + 0.2).min(1.0),
                            (p.color[1] + 0.2).min(1.0),
                            (p.color[2] + 0.2).min(1.0),
                            1.0,
                        ],
                        trail: false,
                        trail_count: 0,
                    });
                }
            }
            true
        });
        self.particles.extend(embers);
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        if self.complete {
            return;
        }

        canvas.ring(self.center, self.radius, 3.0, self.color);
        let bright = [
            (self.color[0] + 0.2).min(1.0),
            (self.color[1] + 0.2).min(1.0),
            (self.color[2] + 0.2).min(1.0),
            1.0,
        ];
        // Shockwave rings fading inward
        for i in 1..4 {
            let inner = self.radius * (0.8 - i as f32 * 0.15);
            if inner > 0.0 {
                canvas.ring(self.center, inner, 2.0, with_alpha(bright, inner / self.radius));
            }
        }

        if self.radius < MAX_RADIUS * 0.7 {
            let core = (15.0 * (1.0 - self.radius / MAX_RADIUS)).max(5.0);
            canvas.circle(self.center, core, [1.0, 1.0, 0.78, 1.0]);
        }

        for p in &self.particles {
            let alpha = (p.lifetime as f32 / p.max_lifetime as f32).clamp(0.2, 1.0);
            canvas.circle(p.pos, p.size.max(1.0), with_alpha(p.color, alpha));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_bursts_fire_once_each() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut e = Explosion::new(Vec2::new(100.0, 100.0), [1.0, 0.0, 0.0, 1.0], 15.0, &mut rng);
        assert_eq!(e.particles.len(), INITIAL_PARTICLES);
        let mut phases = Vec::new();
        for _ in 0..40 {
            e.update(&mut rng);
            phases.push(e.phase);
        }
        assert_eq!(e.phase, 2);
        // Phase never goes backwards
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_explosion_completes() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut e = Explosion::new(Vec2::ZERO, [0.0, 0.0, 1.0, 1.0], 15.0, &mut rng);
        for _ in 0..1000 {
            e.update(&mut rng);
            if e.complete {
                break;
            }
        }
        assert!(e.complete);
        assert!(e.particles.is_empty());
        assert_eq!(e.radius, MAX_RADIUS);
    }
}
