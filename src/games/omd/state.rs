//! Game state, waves, and the per-tick update

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::consts::*;
use super::entities::{AttackEffect, Enemy, EnemyKind, Objective, Player};
use super::maze::Maze;
use crate::games::{Game, GameKind, RngState, SoundCue};
use crate::input::{InputFrame, Key};
use crate::renderer::{Canvas, colors, rgb, with_alpha};

const WALL_COLOR: [f32; 4] = rgb(80, 70, 60);

/// Movement and attack keys per player: up, down, left, right, attack
const PLAYER_KEYS: [[Key; 5]; 2] = [
    [Key::W, Key::S, Key::A, Key::D, Key::Space],
    [Key::Up, Key::Down, Key::Left, Key::Right, Key::RightCtrl],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OmdPhase {
    Menu,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdGame {
    pub seed: u64,
    pub rng_state: RngState,
    pub maze: Maze,
    pub phase: OmdPhase,
    pub players: Vec<Player>,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    pub objective: Objective,
    pub effects: Vec<AttackEffect>,
    /// Team score
    pub score: u32,
    pub wave: u32,
    pub wave_in_progress: bool,
    /// Ticks until the next wave may start
    pub wave_timer: u32,
    pub time_ticks: u64,
    quit: bool,
    next_id: u32,
    #[serde(skip)]
    cues: Vec<SoundCue>,
}

impl OmdGame {
    pub fn new(seed: u64, player_count: usize) -> Self {
        let mut rng_state = RngState::new(seed);
        let maze = Maze::generate(&mut rng_state.next_rng());
        let mut game = Self {
            seed,
            rng_state,
            maze,
            phase: OmdPhase::Menu,
            players: Vec::new(),
            enemies: Vec::new(),
            objective: Objective::new(),
            effects: Vec::new(),
            score: 0,
            wave: 0,
            wave_in_progress: false,
            wave_timer: FIRST_WAVE_DELAY,
            time_ticks: 0,
            quit: false,
            next_id: 1,
            cues: Vec::new(),
        };
        game.spawn_players(player_count.clamp(1, 2));
        game
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn spawn_players(&mut self, count: usize) {
        let preferred = [
            Vec2::new(SCREEN_WIDTH / 4.0, SCREEN_HEIGHT / 2.0),
            Vec2::new(3.0 * SCREEN_WIDTH / 4.0, SCREEN_HEIGHT / 2.0),
        ];
        self.players = (0..count)
            .map(|i| {
                let pos = self.maze.find_safe_position(preferred[i], PLAYER_RADIUS);
                Player::new(i, pos)
            })
            .collect();
    }

    /// Fresh round on the same maze
    pub fn reset(&mut self) {
        self.enemies.clear();
        self.effects.clear();
        self.objective = Objective::new();
        self.score = 0;
        self.wave = 0;
        self.wave_in_progress = false;
        self.wave_timer = FIRST_WAVE_DELAY;
        self.spawn_players(self.players.len());
        self.phase = OmdPhase::Playing;
        log::info!("OMD round started with {} player(s)", self.players.len());
    }

    pub fn start_wave(&mut self, rng: &mut impl Rng) {
        self.wave += 1;
        self.wave_in_progress = true;
        let count = (5 + 2 * self.wave as usize).min(MAX_ENEMIES);
        let kinds = EnemyKind::unlocked(self.wave);
        let entrances = self.maze.entrance_points();

        for _ in 0..count {
            let (Some(&kind), Some(&entrance)) = (kinds.choose(rng), entrances.choose(rng)) else {
                break;
            };
            let jitter = Vec2::new(
                rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER) as f32,
                rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER) as f32,
            );
            let pos = (entrance + jitter).clamp(
                Vec2::splat(30.0),
                Vec2::new(SCREEN_WIDTH - 30.0, SCREEN_HEIGHT - 30.0),
            );
            let pos = self.maze.find_safe_position(pos, kind.radius());
            let id = self.next_entity_id();
            self.enemies.push(Enemy::new(id, kind, pos));
        }
        self.cues.push(SoundCue::WaveStart);
        log::info!("Wave {} started: {} enemies", self.wave, count);
    }

    fn movement(input: &InputFrame, keys: &[Key; 5]) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if input.is_held(keys[0]) {
            dir.y -= 1.0;
        }
        if input.is_held(keys[1]) {
            dir.y += 1.0;
        }
        if input.is_held(keys[2]) {
            dir.x -= 1.0;
        }
        if input.is_held(keys[3]) {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }

    fn play_tick(&mut self, input: &InputFrame) {
        let mut rng = self.rng_state.next_rng();

        if !self.objective.is_alive() || self.players.iter().all(|p| !p.is_alive()) {
            self.phase = OmdPhase::GameOver;
            self.cues.push(SoundCue::GameOver);
            log::info!("OMD game over at wave {} with score {}", self.wave, self.score);
            return;
        }

        for enemy in &mut self.enemies {
            enemy.advance(self.objective.pos, &self.maze, &mut rng);
            if enemy.attack_objective(&mut self.objective) {
                log::debug!("Enemy {} hit the objective ({} left)", enemy.id, self.objective.health);
            }
        }

        if self.wave_in_progress && self.enemies.is_empty() {
            self.wave_in_progress = false;
            self.wave_timer = WAVE_COOLDOWN;
            log::info!("Wave {} cleared", self.wave);
        }
        if !self.wave_in_progress {
            if self.wave_timer == 0 {
                self.start_wave(&mut rng);
            } else {
                self.wave_timer -= 1;
            }
        }

        for i in 0..self.players.len() {
            if !self.players[i].is_alive() {
                continue;
            }
            let keys = &PLAYER_KEYS[i];
            let player = &mut self.players[i];
            player.attack_cooldown = player.attack_cooldown.saturating_sub(1);
            player.step(Self::movement(input, keys), &self.maze);

            if input.is_held(keys[4]) {
                let hits = player.attack(&mut self.enemies, &self.maze);
                if !hits.is_empty() {
                    self.effects.push(AttackEffect {
                        pos: player.pos,
                        radius: PLAYER_ATTACK_RADIUS,
                        color: player.color(),
                        ticks_left: ATTACK_EFFECT_TICKS,
                    });
                    self.cues.push(SoundCue::Hit);
                }
                for hit in hits.iter().filter(|h| h.killed) {
                    if let Some(e) = self.enemies.iter().find(|e| e.id == hit.enemy_id) {
                        self.score += e.kind.value();
                    }
                }
            }
        }
        self.enemies.retain(|e| e.is_alive());

        // Contact shoves players away; enemies never hurt them
        for player in self.players.iter_mut().filter(|p| p.is_alive()) {
            for enemy in &self.enemies {
                if player.pos.distance(enemy.pos) < PLAYER_RADIUS + enemy.kind.radius() {
                    player.shove_from(enemy.pos, &self.maze);
                }
            }
        }

        self.effects.retain_mut(|e| {
            e.ticks_left = e.ticks_left.saturating_sub(1);
            e.ticks_left > 0
        });
    }

    /// Steer toward the nearest enemy and swing when in reach
    fn autopilot_keys(&self, player: &Player) -> Vec<Key> {
        let keys = &PLAYER_KEYS[player.index];
        let Some(target) = self
            .enemies
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance_squared(player.pos)
                    .total_cmp(&b.pos.distance_squared(player.pos))
            })
            .map(|e| e.pos)
        else {
            return Vec::new();
        };

        let mut held = Vec::new();
        let d = target - player.pos;
        if d.y < -PLAYER_SPEED {
            held.push(keys[0]);
        } else if d.y > PLAYER_SPEED {
            held.push(keys[1]);
        }
        if d.x < -PLAYER_SPEED {
            held.push(keys[2]);
        } else if d.x > PLAYER_SPEED {
            held.push(keys[3]);
        }
        if d.length() < PLAYER_ATTACK_RADIUS {
            held.push(keys[4]);
        }
        held
    }
}

impl Game for OmdGame {
    fn kind(&self) -> GameKind {
        GameKind::Omd
    }

    fn screen_size(&self) -> Vec2 {
        Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn tick(&mut self, input: &InputFrame) {
        self.time_ticks += 1;
        if input.was_pressed(Key::Escape) {
            self.quit = true;
        }
        match self.phase {
            OmdPhase::Menu => {
                if input.was_pressed(Key::Enter) {
                    self.reset();
                } else if input.was_pressed(Key::Q) {
                    self.quit = true;
                }
            }
            OmdPhase::Playing => {
                if input.was_pressed(Key::P) {
                    self.phase = OmdPhase::Paused;
                    return;
                }
                self.play_tick(input);
            }
            OmdPhase::Paused => {
                if input.was_pressed(Key::P) {
                    self.phase = OmdPhase::Playing;
                } else if input.was_pressed(Key::Q) {
                    self.quit = true;
                }
            }
            OmdPhase::GameOver => {
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
        for wall in &self.maze.obstacles {
            canvas.rect(wall.x, wall.y, wall.w, wall.h, WALL_COLOR);
        }
        self.objective.draw(canvas);
        for enemy in &self.enemies {
            enemy.draw(canvas);
        }
        for player in self.players.iter().filter(|p| p.is_alive()) {
            player.draw(canvas);
        }
        for effect in &self.effects {
            effect.draw(canvas);
        }

        let dim = match self.phase {
            OmdPhase::Menu => 0.8,
            OmdPhase::Paused => 0.5,
            OmdPhase::GameOver => 0.6,
            OmdPhase::Playing => 0.0,
        };
        if dim > 0.0 {
            canvas.rect(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT, with_alpha(colors::BLACK, dim));
        }
    }

    fn hud(&self) -> Vec<String> {
        if self.phase == OmdPhase::Menu {
            let mut lines = vec![
                "Orcs Must Die - 2D".to_string(),
                "Player 1: WASD to move, SPACE to attack".to_string(),
            ];
            if self.players.len() > 1 {
                lines.push("Player 2: Arrow keys to move, RIGHT CTRL to attack".to_string());
            }
            lines.push("Defend the central objective from enemies!".to_string());
            lines.push("Press ENTER to start".to_string());
            return lines;
        }

        let mut lines = vec![
            format!("Wave: {}", self.wave),
            format!("Score: {}", self.score),
            format!("Objective: {}/{}", self.objective.health.max(0), OBJECTIVE_HEALTH),
        ];
        for (i, p) in self.players.iter().enumerate() {
            lines.push(format!("P{}: {}", i + 1, p.score));
        }
        match self.phase {
            OmdPhase::Paused => lines.push("PAUSED - Press P to resume".to_string()),
            OmdPhase::GameOver => {
                lines.push("GAME OVER".to_string());
                lines.push("Press R to restart".to_string());
            }
            _ => {}
        }
        lines
    }

    fn is_over(&self) -> bool {
        self.phase == OmdPhase::GameOver
    }

    fn final_score(&self) -> Option<u64> {
        Some(self.score as u64)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn pause(&mut self) {
        if self.phase == OmdPhase::Playing {
            self.phase = OmdPhase::Paused;
        }
    }

    fn autopilot(&self) -> InputFrame {
        match self.phase {
            OmdPhase::Menu => InputFrame::with_pressed(&[Key::Enter]),
            OmdPhase::Playing => {
                let held: Vec<Key> = self
                    .players
                    .iter()
                    .filter(|p| p.is_alive())
                    .flat_map(|p| self.autopilot_keys(p))
                    .collect();
                InputFrame::with_held(&held)
            }
            _ => InputFrame::default(),
        }
    }

    fn take_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(players: usize) -> OmdGame {
        let mut g = OmdGame::new(7, players);
        g.tick(&InputFrame::with_pressed(&[Key::Enter]));
        g
    }

    #[test]
    fn test_menu_to_playing() {
        let mut g = OmdGame::new(1, 2);
        assert_eq!(g.phase, OmdPhase::Menu);
        g.tick(&InputFrame::default());
        assert_eq!(g.phase, OmdPhase::Menu);
        g.tick(&InputFrame::with_pressed(&[Key::Enter]));
        assert_eq!(g.phase, OmdPhase::Playing);
        assert_eq!(g.players.len(), 2);
    }

    #[test]
    fn test_players_spawn_clear_of_walls() {
        let g = OmdGame::new(11, 2);
        for p in &g.players {
            assert!(!g.maze.blocked(p.pos, PLAYER_RADIUS, PLAYER_WALL_BUFFER));
        }
    }

    #[test]
    fn test_first_wave_after_delay() {
        let mut g = playing(1);
        for _ in 0..FIRST_WAVE_DELAY {
            g.tick(&InputFrame::default());
        }
        assert_eq!(g.wave, 0);
        g.tick(&InputFrame::default());
        assert_eq!(g.wave, 1);
        assert_eq!(g.enemies.len(), 7);
        assert!(g.enemies.iter().all(|e| e.kind == EnemyKind::Basic));
    }

    #[test]
    fn test_wave_size_caps() {
        let mut g = playing(1);
        let mut rng = g.rng_state.next_rng();
        g.wave = 9;
        g.start_wave(&mut rng);
        assert_eq!(g.wave, 10);
        assert_eq!(g.enemies.len(), MAX_ENEMIES);
    }

    #[test]
    fn test_next_wave_waits_for_cooldown() {
        let mut g = playing(1);
        g.wave = 1;
        g.wave_in_progress = true;
        g.wave_timer = 0;
        g.tick(&InputFrame::default());
        assert!(!g.wave_in_progress);
        assert_eq!(g.wave_timer, WAVE_COOLDOWN - 1);
    }

    #[test]
    fn test_kill_scores_team_and_player() {
        let mut g = playing(1);
        g.wave_timer = 1000;
        let pos = g.players[0].pos + Vec2::new(30.0, 0.0);
        let id = g.next_entity_id();
        let mut enemy = Enemy::new(id, EnemyKind::Basic, pos);
        enemy.health = 5;
        g.enemies.push(enemy);
        g.tick(&InputFrame::with_held(&[Key::Space]));
        assert!(g.enemies.is_empty());
        assert_eq!(g.score, 10);
        assert_eq!(g.players[0].score, 10);
        assert_eq!(g.effects.len(), 1);
    }

    #[test]
    fn test_objective_destroyed_ends_game() {
        let mut g = playing(2);
        g.objective.health = 0;
        g.tick(&InputFrame::default());
        assert!(g.is_over());
        g.tick(&InputFrame::with_pressed(&[Key::R]));
        assert_eq!(g.phase, OmdPhase::Playing);
        assert_eq!(g.objective.health, OBJECTIVE_HEALTH);
    }

    #[test]
    fn test_pause_freezes_enemies() {
        let mut g = playing(1);
        let mut rng = g.rng_state.next_rng();
        g.start_wave(&mut rng);
        g.tick(&InputFrame::with_pressed(&[Key::P]));
        let before: Vec<Vec2> = g.enemies.iter().map(|e| e.pos).collect();
        g.tick(&InputFrame::default());
        let after: Vec<Vec2> = g.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_deterministic_replay() {
        let run = || {
            let mut g = OmdGame::new(99, 2);
            for _ in 0..600 {
                let input = g.autopilot();
                g.tick(&input);
            }
            (g.score, g.wave, g.objective.health, g.enemies.len())
        };
        assert_eq!(run(), run());
    }
}
