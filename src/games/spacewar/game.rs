//! Round setup, the per-tick update, and the menu

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ai::{AiKind, ShipAi, autopilot_controls, create_random_ai};
use super::consts::*;
use super::entities::{
    Asteroid, AsteroidSize, Controls, DeliveryZone, Ship, ZoneEvent, ZoneKind, random_point_away,
};
use crate::games::{Game, GameKind, RngState, SoundCue};
use crate::input::{InputFrame, Key};
use crate::renderer::{Canvas, colors, with_alpha};
use crate::{wrap_position, wrapped_distance};

/// Thrust, rotate left, rotate right per human slot
const HUMAN_KEYS: [[Key; 3]; 2] = [[Key::Up, Key::Left, Key::Right], [Key::W, Key::A, Key::D]];
const MENU_KEYS: [Key; 3] = [Key::Digit0, Key::Digit1, Key::Digit2];
const STAR_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// Haul cargo for credits
    #[default]
    Delivery,
    /// Last ship flying wins
    Survival,
}

impl Variant {
    pub fn name(self) -> &'static str {
        match self {
            Variant::Delivery => "delivery",
            Variant::Survival => "survival",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpacewarPhase {
    /// Choosing how many humans fly
    Menu,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spacewar {
    pub seed: u64,
    pub rng_state: RngState,
    pub variant: Variant,
    pub phase: SpacewarPhase,
    /// Human count highlighted in the menu, and flying once started
    pub humans: usize,
    pub ships: Vec<Ship>,
    /// Parallel to `ships`; `None` for human ships
    pub pilots: Vec<Option<ShipAi>>,
    pub asteroids: Vec<Asteroid>,
    pub zones: Vec<DeliveryZone>,
    /// Ticks until the next zone pair may spawn
    pub zone_timer: u32,
    /// Id of the winning ship once the round is over
    pub winner: Option<u32>,
    pub stars: Vec<Vec2>,
    pub time_ticks: u64,
    quit: bool,
    next_id: u32,
    #[serde(skip)]
    cues: Vec<SoundCue>,
}

impl Spacewar {
    pub fn new(seed: u64, variant: Variant, humans: usize) -> Self {
        let mut rng_state = RngState::new(seed);
        let mut rng = rng_state.next_rng();
        let stars = (0..STAR_COUNT)
            .map(|_| Vec2::new(rng.random_range(0.0..WORLD_WIDTH), rng.random_range(0.0..WORLD_HEIGHT)))
            .collect();
        let mut game = Self {
            seed,
            rng_state,
            variant,
            phase: SpacewarPhase::Menu,
            humans: humans.min(2),
            ships: Vec::new(),
            pilots: Vec::new(),
            asteroids: Vec::new(),
            zones: Vec::new(),
            zone_timer: 0,
            winner: None,
            stars,
            time_ticks: 0,
            quit: false,
            next_id: 1,
            cues: Vec::new(),
        };
        // The menu shows the field drifting behind it
        game.setup();
        game
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start a round with the given number of humans
    pub fn start(&mut self, humans: usize) {
        self.humans = humans.min(2);
        self.setup();
        self.phase = SpacewarPhase::Playing;
        log::info!(
            "Spacewar ({}) started: {} human(s), {} AI",
            self.variant.name(),
            self.humans,
            MAX_SHIPS - self.humans
        );
    }

    fn setup(&mut self) {
        let mut rng = self.rng_state.next_rng();
        self.ships.clear();
        self.pilots.clear();
        self.asteroids.clear();
        self.zones.clear();
        self.winner = None;

        let slots = [
            Vec2::new(WORLD_WIDTH / 4.0, WORLD_HEIGHT / 4.0),
            Vec2::new(WORLD_WIDTH * 3.0 / 4.0, WORLD_HEIGHT / 4.0),
            Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT * 3.0 / 4.0),
        ];
        for (slot, pos) in slots.into_iter().enumerate() {
            let id = self.next_entity_id();
            let human = (slot < self.humans).then_some(slot);
            self.ships.push(Ship::new(id, pos, rng.random_range(0.0..360.0), human));
            let pilot = match (human, self.variant) {
                (Some(_), _) => None,
                (None, Variant::Delivery) => Some(create_random_ai(&mut rng)),
                (None, Variant::Survival) => Some(ShipAi::new(AiKind::Survival, &mut rng)),
            };
            if let Some(ai) = &pilot {
                log::debug!("Ship {} flown by the {} pilot", id, ai.kind.name());
            }
            self.pilots.push(pilot);
        }

        for _ in 0..INITIAL_ASTEROIDS {
            self.spawn_asteroid(&mut rng);
        }
        self.zone_timer = rng.random_range(FIRST_ZONE_MIN..=FIRST_ZONE_MAX);
    }

    fn ship_positions(&self) -> Vec<Vec2> {
        self.ships.iter().filter(|s| s.is_alive()).map(|s| s.pos).collect()
    }

    fn spawn_asteroid(&mut self, rng: &mut impl Rng) {
        let pos = random_point_away(rng, &self.ship_positions(), SPAWN_CLEARANCE);
        let size = AsteroidSize::pick(rng);
        let id = self.next_entity_id();
        self.asteroids.push(Asteroid::new(id, pos, size, rng));
    }

    /// Occasionally top the field back up
    pub fn maybe_spawn_asteroid(&mut self, rng: &mut impl Rng) {
        if self.asteroids.len() < MAX_ASTEROIDS && rng.random_bool(ASTEROID_SPAWN_CHANCE) {
            self.spawn_asteroid(rng);
        }
    }

    /// A pickup clear of everything, then a dropoff well away from it
    fn spawn_zone_pair(&mut self, rng: &mut impl Rng) {
        let mut avoid = self.ship_positions();
        avoid.extend(self.asteroids.iter().map(|a| a.pos));
        let pickup = random_point_away(rng, &avoid, SPAWN_CLEARANCE);

        let mut dropoff = wrap_position(pickup + WORLD / 2.0, WORLD);
        for _ in 0..100 {
            let p = Vec2::new(rng.random_range(0.0..WORLD_WIDTH), rng.random_range(0.0..WORLD_HEIGHT));
            if wrapped_distance(p, pickup, WORLD) >= ZONE_SEPARATION
                && avoid.iter().all(|a| wrapped_distance(*a, p, WORLD) >= SPAWN_CLEARANCE)
            {
                dropoff = p;
                break;
            }
        }

        let id = self.next_entity_id();
        self.zones.push(DeliveryZone::new(id, ZoneKind::Pickup, pickup));
        let id = self.next_entity_id();
        self.zones.push(DeliveryZone::new(id, ZoneKind::Dropoff, dropoff));
        log::debug!("Zones spawned: pickup {:?}, dropoff {:?}", pickup, dropoff);
    }

    fn human_controls(input: &InputFrame, slot: usize) -> Controls {
        let [thrust, left, right] = HUMAN_KEYS[slot % HUMAN_KEYS.len()];
        let rotation = input.is_held(right) as i8 - input.is_held(left) as i8;
        Controls::new(input.is_held(thrust), rotation)
    }

    fn play_tick(&mut self, input: &InputFrame) {
        let mut rng = self.rng_state.next_rng();

        for i in 0..self.ships.len() {
            if !self.ships[i].is_alive() {
                continue;
            }
            let controls = match (&mut self.pilots[i], self.ships[i].human) {
                (Some(ai), _) => ai.decide(&self.ships[i], &self.asteroids, &self.zones, &mut rng),
                (None, Some(slot)) => Self::human_controls(input, slot),
                (None, None) => Controls::default(),
            };
            self.ships[i].controls = controls;
        }

        for ship in &mut self.ships {
            ship.update();
        }
        for asteroid in &mut self.asteroids {
            asteroid.update();
        }

        self.resolve_collisions(&mut rng);
        self.maybe_spawn_asteroid(&mut rng);

        if self.variant == Variant::Delivery {
            self.update_zones(&mut rng);
        }
        self.check_win();
    }

    fn resolve_collisions(&mut self, rng: &mut impl Rng) {
        let mut broken: Vec<usize> = Vec::new();
        for ship in self.ships.iter_mut().filter(|s| s.is_alive()) {
            let hit = self
                .asteroids
                .iter()
                .enumerate()
                .position(|(i, a)| !broken.contains(&i) && ship.hits(a));
            if let Some(i) = hit {
                ship.destroyed = true;
                broken.push(i);
                self.cues.push(SoundCue::Explosion);
                log::info!("Ship {} destroyed by asteroid {}", ship.id, self.asteroids[i].id);
            }
        }
        if broken.is_empty() {
            return;
        }

        let mut fragments: Vec<Asteroid> = broken
            .iter()
            .flat_map(|&i| self.asteroids[i].break_apart(rng))
            .collect();
        let mut index = 0;
        self.asteroids.retain(|_| {
            let keep = !broken.contains(&index);
            index += 1;
            keep
        });
        for piece in &mut fragments {
            piece.id = self.next_entity_id();
        }
        self.asteroids.extend(fragments);
    }

    fn update_zones(&mut self, rng: &mut impl Rng) {
        for zone in &mut self.zones {
            zone.update();
        }
        for ship in self.ships.iter_mut().filter(|s| s.is_alive()) {
            for zone in &self.zones {
                match ship.interact(zone) {
                    Some(ZoneEvent::PickedUp) => {
                        self.cues.push(SoundCue::Pickup);
                        log::debug!("Ship {} picked up cargo", ship.id);
                    }
                    Some(ZoneEvent::Delivered) => {
                        self.cues.push(SoundCue::Deliver);
                        log::info!("Ship {} delivered cargo ({} credits)", ship.id, ship.credits);
                    }
                    None => {}
                }
            }
        }
        self.zones.retain(|z| !z.is_expired());

        self.zone_timer = self.zone_timer.saturating_sub(1);
        if self.zone_timer == 0 {
            if self.zones.is_empty() {
                self.spawn_zone_pair(rng);
            }
            self.zone_timer = ZONE_SPAWN_INTERVAL;
        }
    }

    fn check_win(&mut self) {
        let rich = match self.variant {
            Variant::Delivery => self.ships.iter().find(|s| s.credits >= CREDIT_GOAL).map(|s| s.id),
            Variant::Survival => None,
        };
        let alive: Vec<u32> = self.ships.iter().filter(|s| s.is_alive()).map(|s| s.id).collect();
        if rich.is_none() && alive.len() > 1 {
            return;
        }
        self.winner = rich.or(match alive.as_slice() {
            [last] => Some(*last),
            _ => None,
        });
        self.phase = SpacewarPhase::GameOver;
        self.cues.push(SoundCue::GameOver);
        log::info!("Spacewar over, winner: {:?}", self.winner);
    }

    fn ship_name(&self, ship: &Ship) -> String {
        match ship.human {
            Some(slot) => format!("Player {}", slot + 1),
            None => format!("AI ship {}", ship.id),
        }
    }

    fn winner_line(&self) -> String {
        match self.winner.and_then(|id| self.ships.iter().find(|s| s.id == id)) {
            Some(ship) if self.variant == Variant::Delivery => {
                format!("{} WINS! Credits: ${}", self.ship_name(ship).to_uppercase(), ship.credits)
            }
            Some(ship) => format!("{} WINS!", self.ship_name(ship).to_uppercase()),
            None => "GAME OVER - All ships destroyed".to_string(),
        }
    }
}

impl Game for Spacewar {
    fn kind(&self) -> GameKind {
        GameKind::Spacewar
    }

    fn screen_size(&self) -> Vec2 {
        WORLD
    }

    fn tick(&mut self, input: &InputFrame) {
        self.time_ticks += 1;
        match self.phase {
            SpacewarPhase::Menu => {
                if let Some(n) = MENU_KEYS.iter().position(|k| input.was_pressed(*k)) {
                    self.start(n);
                } else if input.was_pressed(Key::Up) {
                    self.humans = (self.humans + 2) % 3;
                } else if input.was_pressed(Key::Down) {
                    self.humans = (self.humans + 1) % 3;
                } else if input.was_pressed(Key::Enter) {
                    self.start(self.humans);
                } else if input.was_pressed(Key::Escape) {
                    self.quit = true;
                }
            }
            SpacewarPhase::Playing | SpacewarPhase::GameOver => {
                if input.was_pressed(Key::Escape) {
                    self.phase = SpacewarPhase::Menu;
                    log::info!("Back to the Spacewar menu");
                } else if input.was_pressed(Key::R) {
                    self.start(self.humans);
                } else if self.phase == SpacewarPhase::Playing {
                    self.play_tick(input);
                }
            }
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.fill(colors::BLACK);
        for star in &self.stars {
            canvas.rect(star.x, star.y, 2.0, 2.0, with_alpha(colors::WHITE, 0.6));
        }
        for zone in &self.zones {
            zone.draw(canvas, self.time_ticks);
        }
        for asteroid in &self.asteroids {
            asteroid.draw(canvas);
        }
        for ship in &self.ships {
            ship.draw(canvas);
        }

        let dim = match self.phase {
            SpacewarPhase::Menu => 0.7,
            SpacewarPhase::GameOver => 0.4,
            SpacewarPhase::Playing => 0.0,
        };
        if dim > 0.0 {
            canvas.rect(0.0, 0.0, WORLD_WIDTH, WORLD_HEIGHT, with_alpha(colors::BLACK, dim));
        }
    }

    fn hud(&self) -> Vec<String> {
        if self.phase == SpacewarPhase::Menu {
            let mut lines = vec![format!("SPACEWAR ({})", self.variant.name())];
            for (i, option) in ["0 Players (AI Only)", "1 Player", "2 Players"].iter().enumerate() {
                let marker = if i == self.humans { ">" } else { " " };
                lines.push(format!("{marker} {option}"));
            }
            lines.push("Use UP/DOWN to select, ENTER to start (or press 0/1/2)".to_string());
            if self.variant == Variant::Delivery {
                lines.push("Slow down inside a PICKUP zone to load cargo,".to_string());
                lines.push(format!("then deliver it to a DROPOFF zone. First to ${CREDIT_GOAL} wins."));
            } else {
                lines.push("Avoid the asteroids and outlast the other ships.".to_string());
            }
            return lines;
        }

        let alive = self.ships.iter().filter(|s| s.is_alive()).count();
        let mut lines = vec![format!(
            "Ships: {} / {}   Asteroids: {}",
            alive,
            self.ships.len(),
            self.asteroids.len()
        )];
        if self.variant == Variant::Delivery {
            let pickups = self.zones.iter().filter(|z| z.kind == ZoneKind::Pickup).count();
            let dropoffs = self.zones.len() - pickups;
            lines.push(format!(
                "Goal: {CREDIT_GOAL} credits   Active zones: {pickups} pickup, {dropoffs} dropoff"
            ));
        }
        for (ship, pilot) in self.ships.iter().zip(&self.pilots) {
            let status = if ship.destroyed {
                "destroyed".to_string()
            } else {
                match pilot {
                    Some(ai) => ai.label(),
                    None if ship.has_cargo => "cargo".to_string(),
                    None => "flying".to_string(),
                }
            };
            lines.push(format!("{}: ${} ({})", self.ship_name(ship), ship.credits, status));
        }
        if self.humans >= 1 {
            lines.push("Player 1: Arrow keys (UP thrust, LEFT/RIGHT rotate)".to_string());
        }
        if self.humans >= 2 {
            lines.push("Player 2: WASD (W thrust, A/D rotate)".to_string());
        }
        if self.phase == SpacewarPhase::GameOver {
            lines.push(format!("{} - Press R to restart", self.winner_line()));
        }
        lines
    }

    fn is_over(&self) -> bool {
        self.phase == SpacewarPhase::GameOver
    }

    fn final_score(&self) -> Option<u64> {
        let humans = self.ships.iter().filter(|s| s.human.is_some());
        match self.variant {
            Variant::Delivery => humans.map(|s| s.credits as u64).max(),
            // Whole seconds survived
            Variant::Survival => humans.map(|s| (s.survived_ticks / 60) as u64).max(),
        }
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn autopilot(&self) -> InputFrame {
        match self.phase {
            SpacewarPhase::Menu => InputFrame::with_pressed(&[Key::Enter]),
            SpacewarPhase::Playing => {
                let mut held = Vec::new();
                for ship in self.ships.iter().filter(|s| s.is_alive()) {
                    let Some(slot) = ship.human else { continue };
                    let [thrust, left, right] = HUMAN_KEYS[slot % HUMAN_KEYS.len()];
                    let controls = autopilot_controls(ship, &self.asteroids, &self.zones);
                    if controls.thrust {
                        held.push(thrust);
                    }
                    match controls.rotation {
                        r if r < 0 => held.push(left),
                        r if r > 0 => held.push(right),
                        _ => {}
                    }
                }
                InputFrame::with_held(&held)
            }
            SpacewarPhase::GameOver => InputFrame::default(),
        }
    }

    fn take_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }
}
