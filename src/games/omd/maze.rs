//! Procedural maze around the objective
//!
//! The field starts solid. A disc around the center is cleared, one entrance
//! is opened per side, and a drunk walk carves a three-cell corridor from
//! each entrance toward the center. Remaining wall cells are merged into
//! rectangles that the entities collide against.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::consts::*;

/// Clearance kept around spawn positions
const SAFE_BUFFER: f32 = 5.0;
/// Walk ends once both axes are this close (in cells) to the center
const NEAR_CENTER: i32 = 5;
const MAX_WALK_LEGS: usize = 500;

/// Axis-aligned rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Circle overlaps the rectangle when the nearest rect point is inside it
    pub fn hits_circle(&self, center: Vec2, radius: f32) -> bool {
        let nearest = Vec2::new(
            center.x.clamp(self.x, self.x + self.w),
            center.y.clamp(self.y, self.y + self.h),
        );
        nearest.distance(center) < radius
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    North,
    East,
    South,
    West,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    pub side: Side,
    /// Grid cell at the middle of the opening
    pub cell: (usize, usize),
    /// Middle of the opening on the screen edge
    pub point: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    pub cols: usize,
    pub rows: usize,
    /// Row-major, `true` = wall
    pub walls: Vec<bool>,
    pub entrances: Vec<Entrance>,
    pub obstacles: Vec<Rect>,
}

impl Maze {
    pub fn generate(rng: &mut impl Rng) -> Self {
        let cols = (SCREEN_WIDTH / CELL) as usize;
        let rows = (SCREEN_HEIGHT / CELL) as usize;
        let mut maze = Self {
            cols,
            rows,
            walls: vec![true; cols * rows],
            entrances: Vec::new(),
            obstacles: Vec::new(),
        };

        maze.clear_center();
        maze.open_entrances(rng);
        for i in 0..maze.entrances.len() {
            let (x, y) = maze.entrances[i].cell;
            maze.carve_path(x as i32, y as i32, rng);
        }
        maze.add_random_connections(rng);
        maze.obstacles = maze.merge_walls();

        log::debug!(
            "Maze generated: {} obstacles, entrances at {:?}",
            maze.obstacles.len(),
            maze.entrance_points()
        );
        maze
    }

    pub fn center_cell(&self) -> (usize, usize) {
        (self.cols / 2, self.rows / 2)
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.walls[self.index(x, y)]
    }

    fn open(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows {
            let i = self.index(x as usize, y as usize);
            self.walls[i] = false;
        }
    }

    /// Open the 3x3 block around a cell
    fn carve(&mut self, x: i32, y: i32) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                self.open(x + dx, y + dy);
            }
        }
    }

    fn clear_center(&mut self) {
        let (cx, cy) = self.center_cell();
        let radius = ((OBJECTIVE_RADIUS + CORRIDOR_WIDTH) / CELL) as i32 as f32;
        for y in 0..self.rows {
            for x in 0..self.cols {
                let d = Vec2::new(x as f32 - cx as f32, y as f32 - cy as f32).length();
                if d < radius {
                    self.open(x as i32, y as i32);
                }
            }
        }
    }

    fn open_entrances(&mut self, rng: &mut impl Rng) {
        let (cols, rows) = (self.cols, self.rows);
        for side in [Side::North, Side::East, Side::South, Side::West] {
            let (cell, point) = match side {
                Side::North | Side::South => {
                    let x = rng.random_range(5..=cols - 6);
                    let y = if side == Side::North { 0 } else { rows - 1 };
                    for i in 0..3 {
                        self.open((x + i) as i32, y as i32);
                    }
                    let py = if side == Side::North { 0.0 } else { SCREEN_HEIGHT };
                    ((x + 1, y), Vec2::new((x + 1) as f32 * CELL, py))
                }
                Side::East | Side::West => {
                    let y = rng.random_range(5..=rows - 6);
                    let x = if side == Side::West { 0 } else { cols - 1 };
                    for i in 0..3 {
                        self.open(x as i32, (y + i) as i32);
                    }
                    let px = if side == Side::West { 0.0 } else { SCREEN_WIDTH };
                    ((x, y + 1), Vec2::new(px, (y + 1) as f32 * CELL))
                }
            };
            self.entrances.push(Entrance { side, cell, point });
        }
    }

    /// Drunk walk from a cell toward the center, carving as it goes
    fn carve_path(&mut self, start_x: i32, start_y: i32, rng: &mut impl Rng) {
        let (cx, cy) = self.center_cell();
        let (cx, cy) = (cx as i32, cy as i32);
        let near = |x: i32, y: i32| (x - cx).abs() < NEAR_CENTER && (y - cy).abs() < NEAR_CENTER;

        let (mut x, mut y) = (start_x, start_y);
        self.carve(x, y);
        let mut legs = 0;
        while !near(x, y) && legs < MAX_WALK_LEGS {
            legs += 1;
            let (tx, ty) = (cx - x, cy - y);
            let (mut sx, mut sy) = if tx.abs() > ty.abs() {
                (tx.signum(), 0)
            } else {
                (0, ty.signum())
            };

            if rng.random_bool(0.3) && rng.random_bool(0.5) {
                let turn = if rng.random_bool(0.5) { 1 } else { -1 };
                if sx != 0 {
                    (sx, sy) = (0, turn);
                } else {
                    (sx, sy) = (turn, 0);
                }
            }

            for _ in 0..rng.random_range(3..=6) {
                x = (x + sx).clamp(0, self.cols as i32 - 1);
                y = (y + sy).clamp(0, self.rows as i32 - 1);
                self.carve(x, y);
                if near(x, y) {
                    break;
                }
            }
        }

        // Walk gave up: finish with a straight L-shaped corridor
        while x != cx {
            x += (cx - x).signum();
            self.carve(x, y);
        }
        while y != cy {
            y += (cy - y).signum();
            self.carve(x, y);
        }
    }

    fn add_random_connections(&mut self, rng: &mut impl Rng) {
        for _ in 0..RANDOM_CONNECTIONS {
            let x = rng.random_range(5..=self.cols - 6);
            let y = rng.random_range(5..=self.rows - 6);
            if !self.is_wall(x, y) {
                continue;
            }
            let open_neighbors = [(1i32, 0i32), (-1, 0), (0, 1), (0, -1)]
                .into_iter()
                .filter(|&(dx, dy)| !self.is_wall((x as i32 + dx) as usize, (y as i32 + dy) as usize))
                .count();
            if open_neighbors >= 2 {
                self.carve(x as i32, y as i32);
            }
        }
    }

    /// Greedily merge wall cells into rectangles (widest run first, then grow down)
    fn merge_walls(&self) -> Vec<Rect> {
        let mut visited = vec![false; self.walls.len()];
        let mut rects = Vec::new();
        let free = |x: usize, y: usize, visited: &[bool]| {
            self.is_wall(x, y) && !visited[self.index(x, y)]
        };

        for y in 0..self.rows {
            for x in 0..self.cols {
                if !free(x, y, &visited) {
                    continue;
                }
                let mut w = 1;
                while x + w < self.cols && free(x + w, y, &visited) {
                    w += 1;
                }
                let mut h = 1;
                while y + h < self.rows && (x..x + w).all(|nx| free(nx, y + h, &visited)) {
                    h += 1;
                }
                for ny in y..y + h {
                    for nx in x..x + w {
                        visited[self.index(nx, ny)] = true;
                    }
                }
                rects.push(Rect::new(
                    x as f32 * CELL,
                    y as f32 * CELL,
                    w as f32 * CELL,
                    h as f32 * CELL,
                ));
            }
        }
        rects
    }

    pub fn entrance_points(&self) -> Vec<Vec2> {
        self.entrances.iter().map(|e| e.point).collect()
    }

    /// Circle of `radius` at `pos` collides with a wall (with `buffer` slack)
    pub fn blocked(&self, pos: Vec2, radius: f32, buffer: f32) -> bool {
        self.obstacles
            .iter()
            .any(|o| o.hits_circle(pos, radius + buffer))
    }

    fn is_clear(&self, pos: Vec2, radius: f32) -> bool {
        pos.x - radius >= 0.0
            && pos.x + radius <= SCREEN_WIDTH
            && pos.y - radius >= 0.0
            && pos.y + radius <= SCREEN_HEIGHT
            && !self.blocked(pos, radius, SAFE_BUFFER)
    }

    /// Nearest free spot to `pos`, searched on growing rings
    pub fn find_safe_position(&self, pos: Vec2, radius: f32) -> Vec2 {
        if self.is_clear(pos, radius) {
            return pos;
        }
        for ring in 1..=60 {
            let r = ring as f32 * 10.0;
            let samples = 8 + ring * 2;
            for k in 0..samples {
                let angle = std::f32::consts::TAU * k as f32 / samples as f32;
                let candidate = pos + Vec2::from_angle(angle) * r;
                if self.is_clear(candidate, radius) {
                    return candidate;
                }
            }
        }
        log::warn!("No free spot near {pos:?}, using the center");
        Vec2::new(SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0)
    }

    /// Open cells reachable from the center (4-connected)
    pub fn reachable_from_center(&self) -> Vec<bool> {
        let mut seen = vec![false; self.walls.len()];
        let (cx, cy) = self.center_cell();
        let mut queue = VecDeque::from([(cx, cy)]);
        seen[self.index(cx, cy)] = true;
        while let Some((x, y)) = queue.pop_front() {
            let neighbors = [
                (x.wrapping_sub(1), y),
                (x + 1, y),
                (x, y.wrapping_sub(1)),
                (x, y + 1),
            ];
            for (nx, ny) in neighbors {
                if nx >= self.cols || ny >= self.rows {
                    continue;
                }
                let i = self.index(nx, ny);
                if !seen[i] && !self.walls[i] {
                    seen[i] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        seen
    }
}
