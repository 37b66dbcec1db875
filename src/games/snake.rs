//! Grid snake for up to three players, optionally with a food-chasing bot

use glam::{IVec2, Vec2};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::games::{Game, GameKind, RngState, SoundCue};
use crate::input::{InputFrame, Key};
use crate::renderer::{Canvas, colors, rgb, with_alpha};

pub const GRID_WIDTH: i32 = 60;
pub const GRID_HEIGHT: i32 = 60;
pub const BLOCK_SIZE: f32 = 20.0;
pub const MAX_FOOD: usize = 5;
pub const INITIAL_LENGTH: usize = 3;
/// Ticks between grid steps (5 steps per second)
pub const STEP_TICKS: u32 = 12;

// Okabe-Ito
const BLUE: [f32; 4] = rgb(0, 114, 178);
const ORANGE: [f32; 4] = rgb(230, 159, 0);
const GREEN: [f32; 4] = rgb(0, 158, 115);

const WASD: [Key; 4] = [Key::W, Key::A, Key::S, Key::D];
const ARROWS: [Key; 4] = [Key::Up, Key::Left, Key::Down, Key::Right];
const YGHJ: [Key; 4] = [Key::Y, Key::G, Key::H, Key::J];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    /// Same order as the key sets: up, left, down, right
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Down => IVec2::new(0, 1),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnakeMode {
    #[default]
    One,
    Two,
    Three,
    HumansAndBot,
}

impl SnakeMode {
    pub const ALL: [SnakeMode; 4] = [
        SnakeMode::One,
        SnakeMode::Two,
        SnakeMode::Three,
        SnakeMode::HumansAndBot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SnakeMode::One => "Single Player",
            SnakeMode::Two => "Two Player",
            SnakeMode::Three => "Three Player",
            SnakeMode::HumansAndBot => "2 Players + AI Bot",
        }
    }

    fn menu_key(self) -> Key {
        match self {
            SnakeMode::One => Key::Digit1,
            SnakeMode::Two => Key::Digit2,
            SnakeMode::Three => Key::Digit3,
            SnakeMode::HumansAndBot => Key::Digit4,
        }
    }

    fn roster(self) -> Vec<Snake> {
        let mid = GRID_HEIGHT / 2;
        let west = |name: &str, keys| Snake::new(name, BLUE, IVec2::new(5, mid), Direction::Right, Some(keys));
        let east = |keys| Snake::new("Player 2", ORANGE, IVec2::new(GRID_WIDTH - 6, mid), Direction::Left, Some(keys));
        let north = |name: &str, keys| Snake::new(name, GREEN, IVec2::new(GRID_WIDTH / 2, 5), Direction::Down, keys);
        match self {
            SnakeMode::One => vec![west("Player", ARROWS)],
            SnakeMode::Two => vec![west("Player 1", WASD), east(ARROWS)],
            SnakeMode::Three => vec![west("Player 1", WASD), east(ARROWS), north("Player 3", Some(YGHJ))],
            SnakeMode::HumansAndBot => vec![west("Player 1", WASD), east(ARROWS), north("Bot", None)],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snake {
    pub name: String,
    pub color: [f32; 4],
    /// Head first
    pub body: VecDeque<IVec2>,
    pub direction: Direction,
    /// Latest accepted turn, applied on the next step
    pub queued: Option<Direction>,
    /// Target length; the body catches up as it moves
    pub length: usize,
    pub alive: bool,
    pub score: u32,
    /// Up, left, down, right; `None` for the bot
    pub keys: Option<[Key; 4]>,
}

impl Snake {
    pub fn new(name: &str, color: [f32; 4], head: IVec2, direction: Direction, keys: Option<[Key; 4]>) -> Self {
        let body = (0..INITIAL_LENGTH as i32)
            .map(|i| head - direction.delta() * i)
            .collect();
        Self {
            name: name.to_string(),
            color,
            body,
            direction,
            queued: None,
            length: INITIAL_LENGTH,
            alive: true,
            score: 0,
            keys,
        }
    }

    pub fn head(&self) -> IVec2 {
        self.body.front().copied().unwrap_or_default()
    }

    pub fn is_bot(&self) -> bool {
        self.keys.is_none()
    }

    /// Queue a turn unless it would fold back onto the neck
    pub fn turn(&mut self, dir: Direction) {
        if dir != self.direction.opposite() {
            self.queued = Some(dir);
        }
    }

    pub fn step(&mut self) {
        if let Some(dir) = self.queued.take() {
            self.direction = dir;
        }
        self.body.push_front(self.head() + self.direction.delta());
        self.body.truncate(self.length);
    }

    pub fn occupies(&self, cell: IVec2) -> bool {
        self.body.contains(&cell)
    }

    fn handle_keys(&mut self, input: &InputFrame) {
        let Some(keys) = self.keys else { return };
        for (key, dir) in keys.iter().zip(Direction::ALL) {
            if input.was_pressed(*key) {
                self.turn(dir);
            }
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        let color = if self.alive { self.color } else { with_alpha(self.color, 0.35) };
        for cell in &self.body {
            canvas.rect(cell.x as f32 * BLOCK_SIZE, cell.y as f32 * BLOCK_SIZE, BLOCK_SIZE, BLOCK_SIZE, color);
        }
    }
}

pub fn in_bounds(cell: IVec2) -> bool {
    (0..GRID_WIDTH).contains(&cell.x) && (0..GRID_HEIGHT).contains(&cell.y)
}

fn manhattan(a: IVec2, b: IVec2) -> i32 {
    let d = (a - b).abs();
    d.x + d.y
}

/// Head for the nearest food along an axis that closes the distance,
/// keeping the current heading when no such move is allowed
pub fn bot_direction(snake: &Snake, foods: &[IVec2], rng: &mut impl Rng) -> Direction {
    let head = snake.head();
    let Some(target) = foods.iter().copied().min_by_key(|f| manhattan(*f, head)) else {
        return snake.direction;
    };
    let d = target - head;
    let mut candidates = Vec::with_capacity(2);
    if d.x != 0 {
        candidates.push(if d.x > 0 { Direction::Right } else { Direction::Left });
    }
    if d.y != 0 {
        candidates.push(if d.y > 0 { Direction::Down } else { Direction::Up });
    }
    candidates.shuffle(rng);
    candidates
        .into_iter()
        .find(|c| *c != snake.direction.opposite())
        .unwrap_or(snake.direction)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakePhase {
    ModeSelect,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnakeGame {
    pub seed: u64,
    pub rng_state: RngState,
    pub mode: SnakeMode,
    pub phase: SnakePhase,
    pub snakes: Vec<Snake>,
    pub foods: Vec<IVec2>,
    pub step_timer: u32,
    /// Set when a multi-snake round ends with one survivor
    pub winner: Option<String>,
    pub time_ticks: u64,
    quit: bool,
    #[serde(skip)]
    cues: Vec<SoundCue>,
}

impl SnakeGame {
    pub fn new(seed: u64, mode: SnakeMode) -> Self {
        let mut game = Self {
            seed,
            rng_state: RngState::new(seed),
            mode,
            phase: SnakePhase::ModeSelect,
            snakes: Vec::new(),
            foods: Vec::new(),
            step_timer: STEP_TICKS,
            winner: None,
            time_ticks: 0,
            quit: false,
            cues: Vec::new(),
        };
        game.reset_round();
        game
    }

    pub fn start(&mut self, mode: SnakeMode) {
        self.mode = mode;
        self.reset_round();
        self.phase = SnakePhase::Playing;
        log::info!("Snake starting: {}", mode.name());
    }

    fn reset_round(&mut self) {
        self.snakes = self.mode.roster();
        self.foods.clear();
        self.winner = None;
        self.step_timer = STEP_TICKS;
        let mut rng = self.rng_state.next_rng();
        self.replenish_food(&mut rng);
    }

    fn is_single(&self) -> bool {
        self.snakes.len() == 1
    }

    /// A random cell clear of every snake and food, if any is left
    fn free_cell(&self, rng: &mut impl Rng) -> Option<IVec2> {
        let taken = |c: IVec2| self.foods.contains(&c) || self.snakes.iter().any(|s| s.occupies(c));
        for _ in 0..100 {
            let c = IVec2::new(rng.random_range(0..GRID_WIDTH), rng.random_range(0..GRID_HEIGHT));
            if !taken(c) {
                return Some(c);
            }
        }
        (0..GRID_HEIGHT)
            .flat_map(|y| (0..GRID_WIDTH).map(move |x| IVec2::new(x, y)))
            .find(|c| !taken(*c))
    }

    fn replenish_food(&mut self, rng: &mut impl Rng) {
        while self.foods.len() < MAX_FOOD {
            match self.free_cell(rng) {
                Some(cell) => self.foods.push(cell),
                None => {
                    log::warn!("Snake board is full, no room for food");
                    break;
                }
            }
        }
    }

    /// Advance every live snake one cell and resolve the outcome
    pub fn step(&mut self) {
        let mut rng = self.rng_state.next_rng();

        for i in 0..self.snakes.len() {
            if self.snakes[i].alive && self.snakes[i].is_bot() {
                let dir = bot_direction(&self.snakes[i], &self.foods, &mut rng);
                self.snakes[i].turn(dir);
            }
        }
        for snake in self.snakes.iter_mut().filter(|s| s.alive) {
            snake.step();
        }

        let before = self.foods.len();
        let snakes = &mut self.snakes;
        self.foods.retain(|food| {
            let mut eaten = false;
            for snake in snakes.iter_mut().filter(|s| s.alive && s.head() == *food) {
                snake.length += 1;
                snake.score += 1;
                eaten = true;
            }
            !eaten
        });
        if self.foods.len() < before {
            self.cues.push(SoundCue::Pickup);
        }
        self.replenish_food(&mut rng);

        // Judge everyone against the same board so head-on crashes take both
        let deaths: Vec<bool> = self
            .snakes
            .iter()
            .enumerate()
            .map(|(i, s)| s.alive && self.crashed(i))
            .collect();
        for (snake, dead) in self.snakes.iter_mut().zip(deaths) {
            if dead {
                snake.alive = false;
                log::debug!("{} crashed at {:?}", snake.name, snake.head());
            }
        }

        self.check_round_over();
    }

    fn crashed(&self, index: usize) -> bool {
        let snake = &self.snakes[index];
        let head = snake.head();
        if !in_bounds(head) || snake.body.iter().skip(1).any(|c| *c == head) {
            return true;
        }
        self.snakes
            .iter()
            .enumerate()
            .any(|(j, other)| j != index && other.alive && other.occupies(head))
    }

    fn check_round_over(&mut self) {
        let alive: Vec<&Snake> = self.snakes.iter().filter(|s| s.alive).collect();
        let over = if self.is_single() { alive.is_empty() } else { alive.len() <= 1 };
        if !over {
            return;
        }
        if !self.is_single() {
            self.winner = alive.first().map(|s| s.name.clone());
        }
        self.phase = SnakePhase::GameOver;
        self.cues.push(SoundCue::GameOver);
        log::info!("Snake over: {}", self.result_line());
    }

    pub fn result_line(&self) -> String {
        if self.is_single() {
            format!("Game Over - Score: {}", self.snakes.first().map_or(0, |s| s.score))
        } else {
            match &self.winner {
                Some(name) => format!("{name} Wins!"),
                None => "Draw!".to_string(),
            }
        }
    }

    fn choose_mode(input: &InputFrame) -> Option<SnakeMode> {
        SnakeMode::ALL.into_iter().find(|m| input.was_pressed(m.menu_key()))
    }

    /// Keys a human snake would press to follow the bot's plan
    fn autopilot_keys(&self) -> Vec<Key> {
        self.snakes
            .iter()
            .filter(|s| s.alive)
            .filter_map(|s| {
                let keys = s.keys?;
                let head = s.head();
                let target = self.foods.iter().copied().min_by_key(|f| manhattan(*f, head))?;
                let d = target - head;
                let closer = |dir: Direction| match dir {
                    Direction::Right => d.x > 0,
                    Direction::Left => d.x < 0,
                    Direction::Down => d.y > 0,
                    Direction::Up => d.y < 0,
                };
                // Closing moves first, then any sideways escape
                let mut options: Vec<Direction> = Direction::ALL
                    .into_iter()
                    .filter(|dir| *dir != s.direction.opposite())
                    .collect();
                options.sort_by_key(|dir| !closer(*dir));
                let wanted = options.into_iter().find(|dir| {
                    let next = head + dir.delta();
                    in_bounds(next) && !self.snakes.iter().any(|o| o.alive && o.occupies(next))
                })?;
                let slot = Direction::ALL.iter().position(|d| *d == wanted)?;
                (wanted != s.direction).then_some(keys[slot])
            })
            .collect()
    }
}

impl Game for SnakeGame {
    fn kind(&self) -> GameKind {
        GameKind::Snake
    }

    fn screen_size(&self) -> Vec2 {
        Vec2::new(GRID_WIDTH as f32 * BLOCK_SIZE, GRID_HEIGHT as f32 * BLOCK_SIZE)
    }

    fn tick(&mut self, input: &InputFrame) {
        self.time_ticks += 1;
        match self.phase {
            SnakePhase::ModeSelect => {
                if let Some(mode) = Self::choose_mode(input) {
                    self.start(mode);
                } else if input.was_pressed(Key::Escape) {
                    self.quit = true;
                }
            }
            SnakePhase::Playing => {
                if input.was_pressed(Key::P) {
                    self.phase = SnakePhase::Paused;
                    return;
                }
                if input.was_pressed(Key::R) {
                    self.start(self.mode);
                    return;
                }
                for snake in self.snakes.iter_mut().filter(|s| s.alive) {
                    snake.handle_keys(input);
                }
                self.step_timer = self.step_timer.saturating_sub(1);
                if self.step_timer == 0 {
                    self.step_timer = STEP_TICKS;
                    self.step();
                }
            }
            SnakePhase::Paused => {
                if input.was_pressed(Key::P) {
                    self.phase = SnakePhase::Playing;
                } else if input.was_pressed(Key::R) {
                    self.start(self.mode);
                }
            }
            SnakePhase::GameOver => {
                if input.any_pressed(&[Key::Enter, Key::R]) {
                    self.start(self.mode);
                } else if input.was_pressed(Key::Escape) {
                    self.reset_round();
                    self.phase = SnakePhase::ModeSelect;
                } else if input.was_pressed(Key::Q) {
                    self.quit = true;
                }
            }
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.fill(colors::BACKGROUND);
        if self.phase == SnakePhase::ModeSelect {
            return;
        }
        for snake in &self.snakes {
            snake.draw(canvas);
        }
        for food in &self.foods {
            let center = (food.as_vec2() + Vec2::splat(0.5)) * BLOCK_SIZE;
            canvas.circle(center, BLOCK_SIZE / 3.0, colors::RED);
        }
        if self.phase == SnakePhase::Paused {
            let size = self.screen_size();
            canvas.rect(0.0, 0.0, size.x, size.y, with_alpha(colors::BLACK, 0.5));
        }
    }

    fn hud(&self) -> Vec<String> {
        match self.phase {
            SnakePhase::ModeSelect => {
                let mut lines = vec!["Choose Mode".to_string()];
                lines.extend(
                    SnakeMode::ALL
                        .iter()
                        .enumerate()
                        .map(|(i, m)| format!("Press {} for {}", i + 1, m.name())),
                );
                lines
            }
            SnakePhase::Playing | SnakePhase::Paused => {
                let mut lines: Vec<String> = self
                    .snakes
                    .iter()
                    .map(|s| {
                        let status = if s.alive { "" } else { " (out)" };
                        format!("{}: {}{}", s.name, s.score, status)
                    })
                    .collect();
                if self.phase == SnakePhase::Paused {
                    lines.push("PAUSED - P to resume".to_string());
                }
                lines
            }
            SnakePhase::GameOver => vec![
                self.result_line(),
                "Press Enter to Restart".to_string(),
                "Escape for mode select".to_string(),
            ],
        }
    }

    fn is_over(&self) -> bool {
        self.phase == SnakePhase::GameOver
    }

    /// Only single-player rounds go on the leaderboard
    fn final_score(&self) -> Option<u64> {
        if !self.is_single() {
            return None;
        }
        self.snakes
            .first()
            .map(|s| s.length.saturating_sub(INITIAL_LENGTH) as u64)
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn pause(&mut self) {
        if self.phase == SnakePhase::Playing {
            self.phase = SnakePhase::Paused;
        }
    }

    fn autopilot(&self) -> InputFrame {
        match self.phase {
            SnakePhase::ModeSelect => InputFrame::with_pressed(&[self.mode.menu_key()]),
            SnakePhase::Playing => InputFrame::with_pressed(&self.autopilot_keys()),
            SnakePhase::Paused | SnakePhase::GameOver => InputFrame::default(),
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

    fn playing(mode: SnakeMode) -> SnakeGame {
        let mut g = SnakeGame::new(1, mode);
        g.start(mode);
        g
    }

    fn run_step(g: &mut SnakeGame, input: &InputFrame) {
        g.tick(input);
        for _ in 1..STEP_TICKS {
            g.tick(&InputFrame::default());
        }
    }

    #[test]
    fn test_mode_select_starts_round() {
        let mut g = SnakeGame::new(2, SnakeMode::One);
        assert_eq!(g.phase, SnakePhase::ModeSelect);
        g.tick(&InputFrame::with_pressed(&[Key::Digit3]));
        assert_eq!(g.phase, SnakePhase::Playing);
        assert_eq!(g.snakes.len(), 3);
        assert_eq!(g.foods.len(), MAX_FOOD);
    }

    #[test]
    fn test_roster_layouts() {
        let g = playing(SnakeMode::HumansAndBot);
        assert_eq!(g.snakes[0].head(), IVec2::new(5, 30));
        assert_eq!(g.snakes[0].body.back().copied(), Some(IVec2::new(3, 30)));
        assert_eq!(g.snakes[1].head(), IVec2::new(54, 30));
        assert_eq!(g.snakes[2].head(), IVec2::new(30, 5));
        assert!(g.snakes[2].is_bot());
        assert!(g.snakes.iter().all(|s| s.body.len() == INITIAL_LENGTH));
    }

    #[test]
    fn test_food_never_on_a_snake() {
        let g = playing(SnakeMode::Three);
        for food in &g.foods {
            assert!(in_bounds(*food));
            assert!(g.snakes.iter().all(|s| !s.occupies(*food)));
        }
    }

    #[test]
    fn test_reverse_is_ignored() {
        let mut g = playing(SnakeMode::One);
        g.foods.clear();
        run_step(&mut g, &InputFrame::with_pressed(&[Key::Left]));
        assert_eq!(g.snakes[0].direction, Direction::Right);
        assert_eq!(g.snakes[0].head(), IVec2::new(6, 30));
    }

    #[test]
    fn test_turn_waits_for_step() {
        let mut g = playing(SnakeMode::One);
        g.tick(&InputFrame::with_pressed(&[Key::Up]));
        assert_eq!(g.snakes[0].direction, Direction::Right);
        assert_eq!(g.snakes[0].queued, Some(Direction::Up));
        for _ in 1..STEP_TICKS {
            g.tick(&InputFrame::default());
        }
        assert_eq!(g.snakes[0].direction, Direction::Up);
        assert_eq!(g.snakes[0].head(), IVec2::new(5, 29));
    }

    #[test]
    fn test_quick_double_turn_cannot_fold_back() {
        let mut s = Snake::new("t", BLUE, IVec2::new(10, 10), Direction::Right, Some(ARROWS));
        s.turn(Direction::Up);
        // Left is the opposite of the direction actually travelled
        s.turn(Direction::Left);
        assert_eq!(s.queued, Some(Direction::Up));
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut g = playing(SnakeMode::One);
        g.foods = vec![IVec2::new(6, 30)];
        g.step();
        assert_eq!(g.snakes[0].score, 1);
        assert_eq!(g.snakes[0].length, INITIAL_LENGTH + 1);
        assert_eq!(g.foods.len(), MAX_FOOD);
        assert!(!g.foods.contains(&IVec2::new(6, 30)));
        g.foods = vec![IVec2::new(50, 50)];
        g.step();
        assert_eq!(g.snakes[0].body.len(), INITIAL_LENGTH + 1);
        assert_eq!(g.final_score(), Some(1));
    }

    #[test]
    fn test_wall_ends_single_game() {
        let mut g = playing(SnakeMode::One);
        g.foods.clear();
        g.snakes[0].direction = Direction::Left;
        g.snakes[0].body = [IVec2::new(0, 30), IVec2::new(1, 30), IVec2::new(2, 30)].into();
        g.step();
        assert!(!g.snakes[0].alive);
        assert!(g.is_over());
        assert_eq!(g.final_score(), Some(0));
    }

    #[test]
    fn test_self_collision() {
        let mut g = playing(SnakeMode::One);
        g.foods.clear();
        let s = &mut g.snakes[0];
        s.length = 5;
        s.body = [
            IVec2::new(10, 10),
            IVec2::new(10, 11),
            IVec2::new(11, 11),
            IVec2::new(11, 10),
            IVec2::new(11, 9),
        ]
        .into();
        s.direction = Direction::Up;
        s.turn(Direction::Right);
        g.step();
        assert!(g.is_over());
    }

    #[test]
    fn test_head_on_is_a_draw() {
        let mut g = playing(SnakeMode::Two);
        g.foods.clear();
        g.snakes[0].body = [IVec2::new(20, 30), IVec2::new(19, 30), IVec2::new(18, 30)].into();
        g.snakes[1].body = [IVec2::new(22, 30), IVec2::new(23, 30), IVec2::new(24, 30)].into();
        g.step();
        assert!(g.snakes.iter().all(|s| !s.alive));
        assert_eq!(g.phase, SnakePhase::GameOver);
        assert_eq!(g.result_line(), "Draw!");
        assert_eq!(g.final_score(), None);
    }

    #[test]
    fn test_last_alive_wins() {
        let mut g = playing(SnakeMode::Three);
        g.foods.clear();
        g.snakes[0].direction = Direction::Up;
        g.snakes[0].body = [IVec2::new(5, 0), IVec2::new(5, 1), IVec2::new(5, 2)].into();
        g.step();
        assert!(!g.snakes[0].alive);
        assert_eq!(g.phase, SnakePhase::Playing);

        g.snakes[1].body = [IVec2::new(59, 30), IVec2::new(58, 30), IVec2::new(57, 30)].into();
        g.snakes[1].direction = Direction::Right;
        g.step();
        assert_eq!(g.phase, SnakePhase::GameOver);
        assert_eq!(g.winner.as_deref(), Some("Player 3"));
    }

    #[test]
    fn test_dead_snakes_do_not_block() {
        let mut g = playing(SnakeMode::Three);
        g.foods.clear();
        g.snakes[1].alive = false;
        g.snakes[1].body = [IVec2::new(6, 30), IVec2::new(7, 30), IVec2::new(8, 30)].into();
        g.step();
        assert!(g.snakes[0].alive);
    }

    #[test]
    fn test_bot_closes_distance_without_reversing() {
        let mut rng = Pcg32::seed_from_u64(3);
        let bot = Snake::new("Bot", GREEN, IVec2::new(30, 5), Direction::Down, None);
        for _ in 0..20 {
            let dir = bot_direction(&bot, &[IVec2::new(40, 15)], &mut rng);
            assert!(matches!(dir, Direction::Right | Direction::Down));
        }
        // Only closing move is straight back: keep going
        let behind = [IVec2::new(30, 1)];
        assert_eq!(bot_direction(&bot, &behind, &mut rng), Direction::Down);
        assert_eq!(bot_direction(&bot, &[], &mut rng), Direction::Down);
    }

    #[test]
    fn test_bot_picks_nearest_food() {
        let mut rng = Pcg32::seed_from_u64(4);
        let bot = Snake::new("Bot", GREEN, IVec2::new(30, 30), Direction::Down, None);
        let foods = [IVec2::new(30, 50), IVec2::new(25, 30)];
        assert_eq!(bot_direction(&bot, &foods, &mut rng), Direction::Left);
    }

    #[test]
    fn test_pause_and_restart() {
        let mut g = playing(SnakeMode::One);
        g.tick(&InputFrame::with_pressed(&[Key::P]));
        assert_eq!(g.phase, SnakePhase::Paused);
        let head = g.snakes[0].head();
        for _ in 0..STEP_TICKS * 2 {
            g.tick(&InputFrame::default());
        }
        assert_eq!(g.snakes[0].head(), head);
        g.tick(&InputFrame::with_pressed(&[Key::P]));
        assert_eq!(g.phase, SnakePhase::Playing);

        g.snakes[0].alive = false;
        g.phase = SnakePhase::GameOver;
        g.tick(&InputFrame::with_pressed(&[Key::R]));
        assert_eq!(g.phase, SnakePhase::Playing);
        assert!(g.snakes[0].alive);
    }

    #[test]
    fn test_blur_pauses() {
        let mut g = playing(SnakeMode::Two);
        g.pause();
        assert_eq!(g.phase, SnakePhase::Paused);
    }

    #[test]
    fn test_autopilot_eats() {
        let mut g = SnakeGame::new(5, SnakeMode::One);
        for _ in 0..STEP_TICKS as usize * 200 {
            let input = g.autopilot();
            g.tick(&input);
            if g.is_over() {
                break;
            }
        }
        assert!(g.snakes[0].score > 0);
    }
}
