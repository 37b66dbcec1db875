//! Players, enemies, and the objective

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::consts::*;
use super::maze::Maze;
use crate::renderer::{Canvas, colors, with_alpha};

pub const PLAYER_COLORS: [[f32; 4]; 2] = [colors::BLUE, colors::GREEN];

/// Fallback directions tried when an enemy is walled in
const DETOUR_DIRECTIONS: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(0.7, 0.7),
    Vec2::new(0.0, 1.0),
    Vec2::new(-0.7, 0.7),
    Vec2::new(-1.0, 0.0),
    Vec2::new(-0.7, -0.7),
    Vec2::new(0.0, -1.0),
    Vec2::new(0.7, -0.7),
];

fn on_screen(pos: Vec2, radius: f32) -> bool {
    (radius..=SCREEN_WIDTH - radius).contains(&pos.x)
        && (radius..=SCREEN_HEIGHT - radius).contains(&pos.y)
}

fn health_bar(canvas: &mut Canvas, pos: Vec2, radius: f32, offset: f32, h: f32, fraction: f32) {
    canvas.bar(
        pos.x - radius,
        pos.y - radius - offset,
        radius * 2.0,
        h,
        fraction,
        colors::GREEN,
        colors::RED,
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Basic,
    Fast,
    Tank,
}

impl EnemyKind {
    pub fn color(self) -> [f32; 4] {
        match self {
            EnemyKind::Basic => colors::RED,
            EnemyKind::Fast => colors::YELLOW,
            EnemyKind::Tank => colors::PURPLE,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            EnemyKind::Basic => 15.0,
            EnemyKind::Fast => 10.0,
            EnemyKind::Tank => 25.0,
        }
    }

    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Basic => 2.0,
            EnemyKind::Fast => 3.0,
            EnemyKind::Tank => 1.0,
        }
    }

    pub fn health(self) -> i32 {
        match self {
            EnemyKind::Basic => 50,
            EnemyKind::Fast => 30,
            EnemyKind::Tank => 150,
        }
    }

    pub fn damage(self) -> i32 {
        match self {
            EnemyKind::Basic => 10,
            EnemyKind::Fast => 5,
            EnemyKind::Tank => 20,
        }
    }

    /// Score for a kill
    pub fn value(self) -> u32 {
        match self {
            EnemyKind::Basic => 10,
            EnemyKind::Fast => 15,
            EnemyKind::Tank => 25,
        }
    }

    /// Kinds that can appear in the given wave
    pub fn unlocked(wave: u32) -> Vec<EnemyKind> {
        let mut kinds = vec![EnemyKind::Basic];
        if wave >= 3 {
            kinds.push(EnemyKind::Fast);
        }
        if wave >= 5 {
            kinds.push(EnemyKind::Tank);
        }
        kinds
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    pub pos: Vec2,
    pub health: i32,
}

impl Objective {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0),
            health: OBJECTIVE_HEALTH,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.circle(self.pos, OBJECTIVE_RADIUS, colors::ORANGE);
        let fraction = self.health as f32 / OBJECTIVE_HEALTH as f32;
        health_bar(canvas, self.pos, OBJECTIVE_RADIUS, 15.0, 8.0, fraction);
    }
}

impl Default for Objective {
    fn default() -> Self {
        Self::new()
    }
}

/// Fading ring left by a landed attack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackEffect {
    pub pos: Vec2,
    pub radius: f32,
    pub color: [f32; 4],
    pub ticks_left: u32,
}

impl AttackEffect {
    pub fn draw(&self, canvas: &mut Canvas) {
        let alpha = self.ticks_left as f32 / ATTACK_EFFECT_TICKS as f32;
        canvas.circle(self.pos, self.radius, with_alpha(self.color, alpha * 0.5));
        canvas.ring(self.pos, self.radius, 2.0, with_alpha(self.color, alpha));
    }
}

/// Hit landed by a player attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackHit {
    pub enemy_id: u32,
    pub killed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// 0 or 1
    pub index: usize,
    pub pos: Vec2,
    /// Facing in degrees (screen space)
    pub facing: f32,
    pub health: i32,
    pub attack_cooldown: u32,
    pub score: u32,
}

impl Player {
    pub fn new(index: usize, pos: Vec2) -> Self {
        Self {
            index,
            pos,
            facing: 0.0,
            health: PLAYER_HEALTH,
            attack_cooldown: 0,
            score: 0,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        PLAYER_COLORS[self.index % PLAYER_COLORS.len()]
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn blocked(&self, pos: Vec2, maze: &Maze) -> bool {
        maze.blocked(pos, PLAYER_RADIUS, PLAYER_WALL_BUFFER)
    }

    /// Move along `dir` (unit or zero), one axis at a time so walls can be slid along
    pub fn step(&mut self, dir: Vec2, maze: &Maze) {
        if dir == Vec2::ZERO {
            return;
        }
        self.facing = dir.y.atan2(dir.x).to_degrees();
        let delta = dir * PLAYER_SPEED;

        let next_x = Vec2::new(self.pos.x + delta.x, self.pos.y);
        if (PLAYER_RADIUS..=SCREEN_WIDTH - PLAYER_RADIUS).contains(&next_x.x)
            && !self.blocked(next_x, maze)
        {
            self.pos = next_x;
        }
        let next_y = Vec2::new(self.pos.x, self.pos.y + delta.y);
        if (PLAYER_RADIUS..=SCREEN_HEIGHT - PLAYER_RADIUS).contains(&next_y.y)
            && !self.blocked(next_y, maze)
        {
            self.pos = next_y;
        }
    }

    /// Swing at every enemy in reach. Returns the hits, empty when on cooldown.
    pub fn attack(&mut self, enemies: &mut [Enemy], maze: &Maze) -> Vec<AttackHit> {
        if self.attack_cooldown > 0 {
            return Vec::new();
        }
        self.attack_cooldown = PLAYER_ATTACK_COOLDOWN;

        let mut hits = Vec::new();
        for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
            let offset = enemy.pos - self.pos;
            if offset.length() > PLAYER_ATTACK_RADIUS + enemy.kind.radius() {
                continue;
            }
            enemy.health -= PLAYER_ATTACK_DAMAGE;
            enemy.knock_back(offset.normalize_or(Vec2::X), maze);
            let killed = !enemy.is_alive();
            if killed {
                self.score += enemy.kind.value();
            }
            hits.push(AttackHit {
                enemy_id: enemy.id,
                killed,
            });
        }
        hits
    }

    /// Shoved away from an enemy on contact; skipped if it would land in a wall
    pub fn shove_from(&mut self, from: Vec2, maze: &Maze) {
        let dir = (self.pos - from).normalize_or(Vec2::X);
        let target = self.pos + dir * KNOCKBACK_FORCE;
        let target = Vec2::new(
            target.x.clamp(PLAYER_RADIUS, SCREEN_WIDTH - PLAYER_RADIUS),
            target.y.clamp(PLAYER_RADIUS, SCREEN_HEIGHT - PLAYER_RADIUS),
        );
        if !self.blocked(target, maze) {
            self.pos = target;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.circle(self.pos, PLAYER_RADIUS, self.color());
        let tip = self.pos + crate::heading_vec(self.facing) * PLAYER_RADIUS;
        canvas.line(self.pos, tip, 3.0, colors::WHITE);
        let fraction = self.health as f32 / PLAYER_HEALTH as f32;
        health_bar(canvas, self.pos, PLAYER_RADIUS, 10.0, 5.0, fraction);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub health: i32,
    pub attack_cooldown: u32,
    /// Current detour while the direct route is blocked
    pub detour: Option<Vec2>,
    /// Ticks until a new detour may be picked
    pub detour_cooldown: u32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            health: kind.health(),
            attack_cooldown: 0,
            detour: None,
            detour_cooldown: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    fn can_stand(&self, pos: Vec2, maze: &Maze) -> bool {
        let r = self.kind.radius();
        on_screen(pos, r) && !maze.blocked(pos, r, 0.0)
    }

    /// Head for `target`: straight line, then an active detour, then each
    /// axis, then a fresh detour
    pub fn advance(&mut self, target: Vec2, maze: &Maze, rng: &mut impl Rng) {
        self.detour_cooldown = self.detour_cooldown.saturating_sub(1);
        let speed = self.kind.speed();
        let delta = (target - self.pos).normalize_or_zero() * speed;

        let direct = self.pos + delta;
        if self.can_stand(direct, maze) {
            self.pos = direct;
            self.detour = None;
            return;
        }

        if let Some(dir) = self.detour.filter(|_| self.detour_cooldown > 0) {
            let next = self.pos + dir * speed;
            if self.can_stand(next, maze) {
                self.pos = next;
                return;
            }
        }
        self.detour = None;

        let start = self.pos;
        let along_x = Vec2::new(self.pos.x + delta.x, self.pos.y);
        if self.can_stand(along_x, maze) {
            self.pos = along_x;
        }
        let along_y = Vec2::new(self.pos.x, self.pos.y + delta.y);
        if self.can_stand(along_y, maze) {
            self.pos = along_y;
        }
        // Creeping a fraction of a pixel along a wall counts as stuck
        if self.pos.distance(start) >= speed * 0.5 || self.detour_cooldown > 0 {
            return;
        }

        let first = rng.random_range(0..DETOUR_DIRECTIONS.len());
        for i in 0..DETOUR_DIRECTIONS.len() {
            let dir = DETOUR_DIRECTIONS[(first + i) % DETOUR_DIRECTIONS.len()];
            let next = self.pos + dir * speed;
            if self.can_stand(next, maze) {
                self.pos = next;
                self.detour = Some(dir);
                self.detour_cooldown = DETOUR_TICKS;
                break;
            }
        }
    }

    /// Hit the objective when touching it. Returns true if damage was dealt.
    pub fn attack_objective(&mut self, objective: &mut Objective) -> bool {
        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        let reach = self.kind.radius() + OBJECTIVE_RADIUS;
        if self.pos.distance(objective.pos) > reach || self.attack_cooldown > 0 {
            return false;
        }
        objective.health -= self.kind.damage();
        self.attack_cooldown = ENEMY_ATTACK_COOLDOWN;
        true
    }

    fn knock_back(&mut self, dir: Vec2, maze: &Maze) {
        let target = self.pos + dir * KNOCKBACK_FORCE;
        if self.can_stand(target, maze) {
            self.pos = target;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        let r = self.kind.radius();
        canvas.circle(self.pos, r, self.kind.color());
        let fraction = self.health as f32 / self.kind.health() as f32;
        health_bar(canvas, self.pos, r, 7.0, 3.0, fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::omd::maze::Rect;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn open_field() -> Maze {
        Maze {
            cols: 0,
            rows: 0,
            walls: Vec::new(),
            entrances: Vec::new(),
            obstacles: Vec::new(),
        }
    }

    fn walled(rect: Rect) -> Maze {
        Maze {
            obstacles: vec![rect],
            ..open_field()
        }
    }

    #[test]
    fn test_unlocked_kinds() {
        assert_eq!(EnemyKind::unlocked(1), vec![EnemyKind::Basic]);
        assert_eq!(EnemyKind::unlocked(3).len(), 2);
        assert_eq!(EnemyKind::unlocked(5).len(), 3);
    }

    #[test]
    fn test_player_slides_along_wall() {
        // Wall directly to the right of the player
        let maze = walled(Rect::new(125.0, 0.0, 50.0, 400.0));
        let mut p = Player::new(0, Vec2::new(100.0, 200.0));
        let dir = Vec2::new(1.0, 1.0).normalize();
        p.step(dir, &maze);
        assert_eq!(p.pos.x, 100.0);
        assert!(p.pos.y > 200.0);
    }

    #[test]
    fn test_player_clamped_to_screen() {
        let maze = open_field();
        let mut p = Player::new(0, Vec2::new(PLAYER_RADIUS + 1.0, 300.0));
        p.step(Vec2::new(-1.0, 0.0), &maze);
        assert_eq!(p.pos.x, PLAYER_RADIUS + 1.0);
    }

    #[test]
    fn test_attack_reach_and_cooldown() {
        let maze = open_field();
        let mut p = Player::new(0, Vec2::new(300.0, 300.0));
        let mut enemies = vec![
            Enemy::new(1, EnemyKind::Basic, Vec2::new(360.0, 300.0)),
            Enemy::new(2, EnemyKind::Basic, Vec2::new(400.0, 300.0)),
        ];
        let hits = p.attack(&mut enemies, &maze);
        assert_eq!(hits, vec![AttackHit { enemy_id: 1, killed: false }]);
        assert_eq!(enemies[0].health, 30);
        // Knocked away from the player
        assert!(enemies[0].pos.x > 360.0);
        assert!(p.attack(&mut enemies, &maze).is_empty());
    }

    #[test]
    fn test_kill_credits_player() {
        let maze = open_field();
        let mut p = Player::new(1, Vec2::new(300.0, 300.0));
        let mut enemies = vec![Enemy::new(1, EnemyKind::Fast, Vec2::new(310.0, 300.0))];
        enemies[0].health = 10;
        let hits = p.attack(&mut enemies, &maze);
        assert!(hits[0].killed);
        assert_eq!(p.score, 15);
    }

    #[test]
    fn test_enemy_walks_to_objective_and_attacks() {
        let maze = open_field();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut objective = Objective::new();
        let mut e = Enemy::new(1, EnemyKind::Basic, objective.pos - Vec2::new(200.0, 0.0));
        let mut hits = 0;
        for _ in 0..200 {
            e.advance(objective.pos, &maze, &mut rng);
            if e.attack_objective(&mut objective) {
                hits += 1;
            }
        }
        assert!(hits >= 2);
        assert_eq!(objective.health, OBJECTIVE_HEALTH - hits * 10);
    }

    #[test]
    fn test_enemy_detours_when_blocked() {
        // Short wall square across the direct route
        let objective = Vec2::new(500.0, 400.0);
        let maze = walled(Rect::new(300.0, 370.0, 30.0, 60.0));
        let mut rng = Pcg32::seed_from_u64(2);
        let mut e = Enemy::new(1, EnemyKind::Basic, Vec2::new(284.0, 400.0));
        for _ in 0..1200 {
            e.advance(objective, &maze, &mut rng);
        }
        assert!(e.pos.x > 330.0, "enemy stuck at {:?}", e.pos);
    }

    #[test]
    fn test_shove_respects_walls() {
        let maze = walled(Rect::new(110.0, 0.0, 50.0, 400.0));
        let mut p = Player::new(0, Vec2::new(85.0, 200.0));
        p.shove_from(Vec2::new(70.0, 200.0), &maze);
        assert_eq!(p.pos, Vec2::new(85.0, 200.0));
        p.shove_from(Vec2::new(100.0, 200.0), &maze);
        assert_eq!(p.pos, Vec2::new(77.0, 200.0));
    }
}
