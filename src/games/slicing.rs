//! Monster Slicing: stand in the middle and cut down whatever walks in
//!
//! Monsters stream in from the screen edges. Clicking swings the sword
//! toward the mouse; slain monsters sometimes drop health or a sword boost.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::games::{Game, GameKind, RngState, SoundCue};
use crate::input::{InputFrame, Key};
use crate::normalize_degrees;
use crate::renderer::{Canvas, colors, rgb, with_alpha};

pub mod consts {
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;
    pub const PLAYER_SIZE: f32 = 64.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const MAX_HEALTH: i32 = 100;
    pub const MONSTER_SIZE: f32 = 64.0;
    pub const MONSTER_SPEED_MIN: f32 = 2.0;
    pub const MONSTER_SPEED_MAX: f32 = 5.0;
    /// One in this many ticks spawns a monster
    pub const MONSTER_SPAWN_RATE: u32 = 100;
    pub const SWORD_LENGTH: f32 = 100.0;
    pub const SWORD_WIDTH: f32 = 10.0;
    pub const BOOSTED_SWORD_FACTOR: f32 = 1.5;
    pub const SLICE_TICKS: u32 = 10;
    /// Half-angle of the swing arc in degrees
    pub const SLICE_ARC: f32 = 45.0;
    pub const DROP_CHANCE: f64 = 0.2;
    pub const HEALTH_BOOST: i32 = 10;
    pub const WEAPON_BOOST_TICKS: u32 = 500;
    pub const DROP_LIFETIME: u32 = 600;
}

use consts::*;

const MONSTER_COLORS: [[f32; 4]; 4] = [colors::RED, rgb(0, 180, 0), colors::PURPLE, colors::ORANGE];
const BLADE_COLOR: [f32; 4] = rgb(192, 192, 192);
const HANDLE_COLOR: [f32; 4] = rgb(139, 69, 19);

/// Angle in degrees from `from` to `to` with y pointing up, as the player
/// sees it on screen
pub fn screen_angle(from: Vec2, to: Vec2) -> f32 {
    normalize_degrees((from.y - to.y).atan2(to.x - from.x).to_degrees())
}

/// Unit direction for a screen angle (y up)
fn screen_dir(angle: f32) -> Vec2 {
    let r = angle.to_radians();
    Vec2::new(r.cos(), -r.sin())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub health: i32,
    /// Ticks left in the current swing
    pub slicing: u32,
    /// Degrees, y up
    pub slice_angle: f32,
    pub weapon_boost: u32,
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0),
            health: MAX_HEALTH,
            slicing: 0,
            slice_angle: 0.0,
            weapon_boost: 0,
        }
    }

    pub fn sword_range(&self) -> f32 {
        if self.weapon_boost > 0 {
            SWORD_LENGTH * BOOSTED_SWORD_FACTOR
        } else {
            SWORD_LENGTH
        }
    }

    pub fn slice_toward(&mut self, target: Vec2) {
        self.slicing = SLICE_TICKS;
        self.slice_angle = screen_angle(self.pos, target);
    }

    /// Move by a unit-ish direction, staying fully on screen
    pub fn step(&mut self, dir: Vec2) {
        let half = PLAYER_SIZE / 2.0;
        self.pos = (self.pos + dir * PLAYER_SPEED).clamp(
            Vec2::splat(half),
            Vec2::new(SCREEN_WIDTH - half, SCREEN_HEIGHT - half),
        );
        self.slicing = self.slicing.saturating_sub(1);
        self.weapon_boost = self.weapon_boost.saturating_sub(1);
    }

    /// Mid-swing and the monster is inside the sword's arc
    pub fn slice_hits(&self, monster: &Monster) -> bool {
        if self.slicing == 0 {
            return false;
        }
        if self.pos.distance(monster.pos) > self.sword_range() + MONSTER_SIZE / 2.0 {
            return false;
        }
        let diff = crate::angle_diff_degrees(self.slice_angle, screen_angle(self.pos, monster.pos));
        diff.abs() <= SLICE_ARC
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let r = PLAYER_SIZE / 2.0;
        canvas.circle(self.pos, r - 5.0, colors::BLUE);
        let eye = PLAYER_SIZE / 6.0;
        for side in [-1.0, 1.0] {
            let c = self.pos + Vec2::new(side * eye, -eye);
            canvas.circle(c, eye, colors::WHITE);
            canvas.circle(c, eye / 2.0, colors::BLACK);
        }
        canvas.line(
            self.pos + Vec2::new(-r / 3.0, r / 3.0),
            self.pos + Vec2::new(r / 3.0, r / 3.0),
            2.0,
            colors::BLACK,
        );

        if self.slicing > 0 {
            let color = if self.weapon_boost > 0 { colors::YELLOW } else { colors::WHITE };
            let tip = self.pos + screen_dir(self.slice_angle) * self.sword_range();
            canvas.line(self.pos, tip, SWORD_WIDTH, color);
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0..=3, tougher and faster as it rises
    pub variant: u8,
}

impl Monster {
    /// Enter from a random edge, heading inward within a quarter-turn cone
    pub fn spawn(id: u32, rng: &mut impl Rng) -> Self {
        use std::f32::consts::PI;
        let (pos, angle) = match rng.random_range(0..4) {
            0 => (
                Vec2::new(rng.random_range(0.0..=SCREEN_WIDTH), -MONSTER_SIZE),
                rng.random_range(PI / 4.0..3.0 * PI / 4.0),
            ),
            1 => (
                Vec2::new(SCREEN_WIDTH + MONSTER_SIZE, rng.random_range(0.0..=SCREEN_HEIGHT)),
                rng.random_range(3.0 * PI / 4.0..5.0 * PI / 4.0),
            ),
            2 => (
                Vec2::new(rng.random_range(0.0..=SCREEN_WIDTH), SCREEN_HEIGHT + MONSTER_SIZE),
                rng.random_range(5.0 * PI / 4.0..7.0 * PI / 4.0),
            ),
            _ => (
                Vec2::new(-MONSTER_SIZE, rng.random_range(0.0..=SCREEN_HEIGHT)),
                rng.random_range(-PI / 4.0..PI / 4.0),
            ),
        };
        let variant = rng.random_range(0..4u8);
        let mut speed = rng.random_range(MONSTER_SPEED_MIN..MONSTER_SPEED_MAX);
        if variant > 1 {
            speed *= 1.2;
        }
        Self {
            id,
            pos,
            vel: Vec2::from_angle(angle) * speed,
            variant,
        }
    }

    pub fn damage(&self) -> i32 {
        match self.variant {
            0 => 5,
            1 => 8,
            2 => 12,
            _ => 15,
        }
    }

    pub fn points(&self) -> u32 {
        (self.variant as u32 + 1) * 10
    }

    pub fn drop_chance(&self) -> f64 {
        DROP_CHANCE * (1.0 + self.variant as f64 * 0.2)
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x < -MONSTER_SIZE
            || self.pos.x > SCREEN_WIDTH + MONSTER_SIZE
            || self.pos.y < -MONSTER_SIZE
            || self.pos.y > SCREEN_HEIGHT + MONSTER_SIZE
    }

    pub fn touches(&self, player: &Player) -> bool {
        self.pos.distance(player.pos) < (PLAYER_SIZE + MONSTER_SIZE) / 2.0
    }

    /// Outline in unit-square coordinates, (0,0) top-left
    fn outline(&self) -> &'static [(f32, f32)] {
        match self.variant {
            0 => &[(0.5, 0.0), (1.0, 0.33), (0.8, 1.0), (0.5, 0.83), (0.2, 1.0), (0.0, 0.33)],
            1 => &[(0.5, 0.0), (1.0, 1.0), (0.0, 1.0)],
            2 => &[
                (0.5, 0.0),
                (0.75, 0.25),
                (1.0, 0.5),
                (0.75, 0.75),
                (0.5, 1.0),
                (0.25, 0.75),
                (0.0, 0.5),
                (0.25, 0.25),
            ],
            _ => &[(0.5, 0.0), (1.0, 0.5), (0.5, 1.0), (0.0, 0.5)],
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let corner = self.pos - Vec2::splat(MONSTER_SIZE / 2.0);
        let points: Vec<Vec2> = self
            .outline()
            .iter()
            .map(|&(x, y)| corner + Vec2::new(x, y) * MONSTER_SIZE)
            .collect();
        canvas.polygon(&points, MONSTER_COLORS[self.variant as usize % MONSTER_COLORS.len()]);
        let eye = MONSTER_SIZE / 7.0;
        for x in [1.0 / 3.0, 2.0 / 3.0] {
            let c = corner + Vec2::new(x, 1.0 / 3.0) * MONSTER_SIZE;
            canvas.circle(c, eye, colors::YELLOW);
            canvas.circle(c, eye / 2.0, colors::BLACK);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LootKind {
    Health,
    Weapon,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loot {
    pub pos: Vec2,
    pub kind: LootKind,
    pub ticks_left: u32,
}

impl Loot {
    /// Roll for loot from a slain monster
    pub fn roll(monster: &Monster, rng: &mut impl Rng) -> Option<Self> {
        if !rng.random_bool(monster.drop_chance()) {
            return None;
        }
        let kind = if monster.variant >= 2 && rng.random_bool(0.6) {
            LootKind::Weapon
        } else if rng.random_bool(0.5) {
            LootKind::Health
        } else {
            LootKind::Weapon
        };
        Some(Self {
            pos: monster.pos,
            kind,
            ticks_left: DROP_LIFETIME,
        })
    }

    pub fn reached_by(&self, player: &Player) -> bool {
        self.pos.distance(player.pos) < (PLAYER_SIZE + MONSTER_SIZE / 4.0) / 2.0
    }

    pub fn apply(&self, player: &mut Player) {
        match self.kind {
            LootKind::Health => player.health = (player.health + HEALTH_BOOST).min(MAX_HEALTH),
            LootKind::Weapon => player.weapon_boost = WEAPON_BOOST_TICKS,
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let s = MONSTER_SIZE / 2.0;
        let corner = self.pos - Vec2::splat(s / 2.0);
        // Blink during the last two seconds
        let alpha = if self.ticks_left < 120 && (self.ticks_left / 10) % 2 == 0 { 0.4 } else { 1.0 };
        match self.kind {
            LootKind::Health => {
                let color = with_alpha(colors::GREEN, alpha);
                canvas.circle(corner + Vec2::new(s / 4.0, s / 4.0), s / 4.0, color);
                canvas.circle(corner + Vec2::new(s * 0.75, s / 4.0), s / 4.0, color);
                canvas.polygon(
                    &[corner + Vec2::new(0.0, s / 4.0), corner + Vec2::new(s / 2.0, s), corner + Vec2::new(s, s / 4.0)],
                    color,
                );
            }
            LootKind::Weapon => {
                let blade = [
                    corner + Vec2::new(s / 2.0, 0.0),
                    corner + Vec2::new(s * 0.6, s / 3.0),
                    corner + Vec2::new(s / 2.0, s * 0.75),
                    corner + Vec2::new(s * 0.4, s / 3.0),
                ];
                canvas.polygon(&blade, with_alpha(BLADE_COLOR, alpha));
                canvas.rect(corner.x + s * 0.4, corner.y + s * 0.75, s / 5.0, s / 4.0, with_alpha(HANDLE_COLOR, alpha));
                canvas.rect(corner.x + s / 3.0, corner.y + s * 2.0 / 3.0, s / 3.0, s / 10.0, with_alpha(colors::YELLOW, alpha));
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlicingPhase {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slicing {
    pub seed: u64,
    pub rng_state: RngState,
    pub phase: SlicingPhase,
    pub player: Player,
    /// Sorted by id
    pub monsters: Vec<Monster>,
    pub drops: Vec<Loot>,
    pub score: u32,
    pub time_ticks: u64,
    quit: bool,
    next_id: u32,
    #[serde(skip)]
    cues: Vec<SoundCue>,
}

impl Slicing {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            phase: SlicingPhase::Playing,
            player: Player::new(),
            monsters: Vec::new(),
            drops: Vec::new(),
            score: 0,
            time_ticks: 0,
            quit: false,
            next_id: 1,
            cues: Vec::new(),
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn reset(&mut self) {
        self.player = Player::new();
        self.monsters.clear();
        self.drops.clear();
        self.score = 0;
        self.phase = SlicingPhase::Playing;
        log::info!("Slicing restarted");
    }

    fn movement(input: &InputFrame) -> Vec2 {
        let held = |a: Key, b: Key| input.is_held(a) || input.is_held(b);
        let mut dir = Vec2::ZERO;
        if held(Key::W, Key::Up) {
            dir.y -= 1.0;
        }
        if held(Key::S, Key::Down) {
            dir.y += 1.0;
        }
        if held(Key::A, Key::Left) {
            dir.x -= 1.0;
        }
        if held(Key::D, Key::Right) {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }

    fn play_tick(&mut self, input: &InputFrame) {
        let mut rng = self.rng_state.next_rng();

        if input.clicked {
            if let Some(mouse) = input.mouse {
                self.player.slice_toward(mouse);
                self.cues.push(SoundCue::Slice);
            }
        }

        if rng.random_range(0..MONSTER_SPAWN_RATE) == 0 {
            let id = self.next_entity_id();
            self.monsters.push(Monster::spawn(id, &mut rng));
        }

        self.player.step(Self::movement(input));

        let player = &mut self.player;
        let mut slain: Vec<Monster> = Vec::new();
        self.monsters.retain_mut(|m| {
            m.pos += m.vel;
            if m.is_off_screen() {
                return false;
            }
            if m.touches(player) {
                player.health -= m.damage();
                log::debug!("Monster {} hit the player for {}", m.id, m.damage());
                return false;
            }
            if player.slice_hits(m) {
                slain.push(m.clone());
                return false;
            }
            true
        });
        for monster in &slain {
            self.score += monster.points();
            self.cues.push(SoundCue::Hit);
            if let Some(drop) = Loot::roll(monster, &mut rng) {
                log::debug!("Monster {} dropped {:?}", monster.id, drop.kind);
                self.drops.push(drop);
            }
        }

        let player = &mut self.player;
        let cues = &mut self.cues;
        self.drops.retain_mut(|d| {
            if d.reached_by(player) {
                d.apply(player);
                cues.push(SoundCue::Pickup);
                return false;
            }
            d.ticks_left = d.ticks_left.saturating_sub(1);
            d.ticks_left > 0
        });

        if self.player.health <= 0 {
            self.phase = SlicingPhase::GameOver;
            self.cues.push(SoundCue::GameOver);
            log::info!("Slicing over with score {}", self.score);
        }
    }

    /// Back away from the closest monster and swing at it once in reach
    fn autopilot_frame(&self) -> InputFrame {
        let player = &self.player;
        let Some(target) = self
            .monsters
            .iter()
            .filter(|m| !m.is_off_screen())
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player.pos)
                    .total_cmp(&b.pos.distance_squared(player.pos))
            })
        else {
            return InputFrame::default();
        };

        let reach = player.sword_range() + MONSTER_SIZE / 2.0;
        if target.pos.distance(player.pos) <= reach {
            return InputFrame {
                mouse: Some(target.pos),
                clicked: player.slicing == 0,
                ..Default::default()
            };
        }
        // Grab any drop on the way
        let goal = self.drops.first().map(|d| d.pos).unwrap_or(player.pos);
        let d = goal - player.pos;
        let mut held = Vec::new();
        if d.x < -PLAYER_SPEED {
            held.push(Key::A);
        } else if d.x > PLAYER_SPEED {
            held.push(Key::D);
        }
        if d.y < -PLAYER_SPEED {
            held.push(Key::W);
        } else if d.y > PLAYER_SPEED {
            held.push(Key::S);
        }
        InputFrame::with_held(&held)
    }
}

impl Game for Slicing {
    fn kind(&self) -> GameKind {
        GameKind::Slicing
    }

    fn screen_size(&self) -> Vec2 {
        Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn tick(&mut self, input: &InputFrame) {
        self.time_ticks += 1;
        match self.phase {
            SlicingPhase::Playing => self.play_tick(input),
            SlicingPhase::GameOver => {
                if input.was_pressed(Key::R) {
                    self.reset();
                } else if input.was_pressed(Key::Q) {
                    self.quit = true;
                }
            }
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.fill(colors::BLACK);
        if self.phase == SlicingPhase::GameOver {
            return;
        }
        for drop in &self.drops {
            drop.draw(canvas);
        }
        for monster in &self.monsters {
            monster.draw(canvas);
        }
        self.player.draw(canvas);

        canvas.rect_outline(10.0, 10.0, 204.0, 24.0, 2.0, colors::WHITE);
        let fraction = self.player.health.max(0) as f32 / MAX_HEALTH as f32;
        canvas.rect(12.0, 12.0, 200.0 * fraction, 20.0, colors::GREEN);
    }

    fn hud(&self) -> Vec<String> {
        match self.phase {
            SlicingPhase::Playing => {
                let mut lines = vec![
                    format!("Score: {}", self.score),
                    format!("Health: {}/{}", self.player.health.max(0), MAX_HEALTH),
                ];
                if self.player.weapon_boost > 0 {
                    lines.push(format!("Weapon Boost: {}s", self.player.weapon_boost / 60 + 1));
                }
                lines
            }
            SlicingPhase::GameOver => vec![
                "GAME OVER".to_string(),
                format!("Final Score: {}", self.score),
                "Press R to Restart".to_string(),
                "Press Q to Quit".to_string(),
            ],
        }
    }

    fn is_over(&self) -> bool {
        self.phase == SlicingPhase::GameOver
    }

    fn final_score(&self) -> Option<u64> {
        Some(self.score as u64)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn autopilot(&self) -> InputFrame {
        match self.phase {
            SlicingPhase::Playing => self.autopilot_frame(),
            SlicingPhase::GameOver => InputFrame::default(),
        }
    }

    fn take_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn monster_at(pos: Vec2, variant: u8) -> Monster {
        Monster {
            id: 999,
            pos,
            vel: Vec2::ZERO,
            variant,
        }
    }

    fn click(at: Vec2) -> InputFrame {
        InputFrame {
            mouse: Some(at),
            clicked: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_screen_angle_is_y_up() {
        let p = Vec2::new(400.0, 300.0);
        assert!((screen_angle(p, Vec2::new(400.0, 200.0)) - 90.0).abs() < 1e-3);
        assert!((screen_angle(p, Vec2::new(500.0, 300.0))).abs() < 1e-3);
        assert!((screen_angle(p, Vec2::new(400.0, 400.0)) - 270.0).abs() < 1e-3);
    }

    #[test]
    fn test_player_clamped_and_diagonal_normalized() {
        let mut p = Player::new();
        p.step(Vec2::new(1.0, 1.0).normalize());
        let moved = p.pos - Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0);
        assert!((moved.length() - PLAYER_SPEED).abs() < 1e-3);

        for _ in 0..500 {
            p.step(Vec2::new(-1.0, -1.0).normalize());
        }
        assert_eq!(p.pos, Vec2::splat(PLAYER_SIZE / 2.0));
    }

    #[test]
    fn test_slice_arc_and_range() {
        let mut p = Player::new();
        p.slice_toward(p.pos + Vec2::new(0.0, -50.0));
        assert_eq!(p.slicing, SLICE_TICKS);

        // Straight above, inside range
        assert!(p.slice_hits(&monster_at(p.pos + Vec2::new(0.0, -120.0), 0)));
        // Forty degrees off the swing still counts
        let off = screen_dir(130.0) * 100.0;
        assert!(p.slice_hits(&monster_at(p.pos + off, 0)));
        // Below the player is behind the swing
        assert!(!p.slice_hits(&monster_at(p.pos + Vec2::new(0.0, 100.0), 0)));
        // Past the tip
        assert!(!p.slice_hits(&monster_at(p.pos + Vec2::new(0.0, -140.0), 0)));

        p.weapon_boost = 10;
        assert!(p.slice_hits(&monster_at(p.pos + Vec2::new(0.0, -180.0), 0)));
    }

    #[test]
    fn test_no_hit_without_swing() {
        let p = Player::new();
        assert!(!p.slice_hits(&monster_at(p.pos + Vec2::new(50.0, 0.0), 0)));
    }

    #[test]
    fn test_monster_spawns_on_edge_heading_in() {
        let mut rng = Pcg32::seed_from_u64(4);
        for id in 0..200 {
            let m = Monster::spawn(id, &mut rng);
            let on_edge = m.pos.x == -MONSTER_SIZE
                || m.pos.x == SCREEN_WIDTH + MONSTER_SIZE
                || m.pos.y == -MONSTER_SIZE
                || m.pos.y == SCREEN_HEIGHT + MONSTER_SIZE;
            assert!(on_edge);
            // Velocity points within 45 degrees of straight inward
            let inward = if m.pos.x < 0.0 {
                Vec2::X
            } else if m.pos.x > SCREEN_WIDTH {
                -Vec2::X
            } else if m.pos.y < 0.0 {
                Vec2::Y
            } else {
                -Vec2::Y
            };
            assert!(m.vel.normalize().dot(inward) >= std::f32::consts::FRAC_1_SQRT_2 - 1e-4);
            let max = if m.variant > 1 { MONSTER_SPEED_MAX * 1.2 } else { MONSTER_SPEED_MAX };
            assert!(m.vel.length() <= max + 1e-4);
            assert!(!m.is_off_screen());
        }
    }

    #[test]
    fn test_monster_stats() {
        let expected = [(5, 10), (8, 20), (12, 30), (15, 40)];
        for (v, (damage, points)) in expected.into_iter().enumerate() {
            let m = monster_at(Vec2::ZERO, v as u8);
            assert_eq!(m.damage(), damage);
            assert_eq!(m.points(), points);
        }
        assert!((monster_at(Vec2::ZERO, 3).drop_chance() - 0.32).abs() < 1e-9);
    }

    #[test]
    fn test_touching_monster_hurts_and_vanishes() {
        let mut g = Slicing::new(1);
        g.monsters.push(monster_at(g.player.pos + Vec2::new(30.0, 0.0), 2));
        g.tick(&InputFrame::default());
        assert_eq!(g.player.health, MAX_HEALTH - 12);
        assert!(g.monsters.iter().all(|m| m.id != 999));
    }

    #[test]
    fn test_slice_kills_and_scores() {
        let mut g = Slicing::new(2);
        let target = g.player.pos + Vec2::new(110.0, 0.0);
        g.monsters.push(monster_at(target, 3));
        g.tick(&click(target));
        assert_eq!(g.score, 40);
        assert!(g.monsters.iter().all(|m| m.id != 999));
        let cues = g.take_cues();
        assert!(cues.contains(&SoundCue::Slice) && cues.contains(&SoundCue::Hit));
    }

    #[test]
    fn test_off_screen_monsters_removed() {
        let mut g = Slicing::new(3);
        let mut m = monster_at(Vec2::new(-MONSTER_SIZE + 1.0, 100.0), 0);
        m.vel = Vec2::new(-3.0, 0.0);
        g.monsters.push(m);
        g.tick(&InputFrame::default());
        assert!(g.monsters.iter().all(|m| m.id != 999));
        assert_eq!(g.player.health, MAX_HEALTH);
    }

    #[test]
    fn test_drops_apply_and_expire() {
        let mut p = Player::new();
        p.health = 95;
        let health = Loot { pos: p.pos, kind: LootKind::Health, ticks_left: DROP_LIFETIME };
        health.apply(&mut p);
        assert_eq!(p.health, MAX_HEALTH);
        let weapon = Loot { pos: p.pos, kind: LootKind::Weapon, ticks_left: DROP_LIFETIME };
        weapon.apply(&mut p);
        assert_eq!(p.weapon_boost, WEAPON_BOOST_TICKS);

        let mut g = Slicing::new(4);
        g.drops.push(Loot { pos: Vec2::new(50.0, 50.0), kind: LootKind::Health, ticks_left: 2 });
        g.tick(&InputFrame::default());
        assert_eq!(g.drops.len(), 1);
        g.tick(&InputFrame::default());
        assert!(g.drops.is_empty());
    }

    #[test]
    fn test_drop_collected_on_contact() {
        let mut g = Slicing::new(5);
        g.player.weapon_boost = 0;
        let pos = g.player.pos + Vec2::new(20.0, 0.0);
        g.drops.push(Loot { pos, kind: LootKind::Weapon, ticks_left: DROP_LIFETIME });
        g.tick(&InputFrame::default());
        assert!(g.drops.is_empty());
        assert!(g.player.weapon_boost > 0);
    }

    #[test]
    fn test_death_restart_and_quit() {
        let mut g = Slicing::new(6);
        g.player.health = 5;
        g.monsters.push(monster_at(g.player.pos, 0));
        g.tick(&InputFrame::default());
        assert!(g.is_over());
        assert_eq!(g.final_score(), Some(0));

        g.tick(&InputFrame::with_pressed(&[Key::R]));
        assert!(!g.is_over());
        assert_eq!(g.player.health, MAX_HEALTH);

        g.phase = SlicingPhase::GameOver;
        g.tick(&InputFrame::with_pressed(&[Key::Q]));
        assert!(g.quit_requested());
    }

    #[test]
    fn test_autopilot_swings_at_close_monster() {
        let mut g = Slicing::new(7);
        let target = g.player.pos + Vec2::new(0.0, 120.0);
        g.monsters.push(monster_at(target, 1));
        let frame = g.autopilot();
        assert!(frame.clicked);
        assert_eq!(frame.mouse, Some(target));
    }
}
