//! Battle state and fixed-step update

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ai::{TeamAi, decide};
use super::consts::*;
use super::regiment::{Action, Bullet, Regiment, RegimentStatus, Team};
use crate::games::{Game, GameKind, RngState, SoundCue};
use crate::input::{InputFrame, Key};
use crate::renderer::{Canvas, colors, rgb, with_alpha};

const GRASS: [f32; 4] = rgb(100, 200, 100);
const BORDER: [f32; 4] = rgb(139, 69, 19);
const RED_TEAM: [f32; 4] = rgb(255, 50, 50);
const BLUE_TEAM: [f32; 4] = rgb(50, 50, 255);

fn team_color(team: Team) -> [f32; 4] {
    match team {
        Team::Red => RED_TEAM,
        Team::Blue => BLUE_TEAM,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattlePhase {
    Running,
    Paused,
    /// `None` winner means both sides were wiped out on the same tick
    GameOver { winner: Option<Team> },
}

/// Per-team counters, indexed by [`Team::index`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStats {
    pub bullets_fired: [u32; 2],
    pub damage_dealt: [u32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub seed: u64,
    pub rng_state: RngState,
    pub red_ai: TeamAi,
    pub blue_ai: TeamAi,
    /// Sorted by id; red regiments come first
    pub regiments: Vec<Regiment>,
    /// Sorted by id
    pub bullets: Vec<Bullet>,
    pub phase: BattlePhase,
    pub stats: BattleStats,
    /// Simulation steps per tick (1-3)
    pub speed: u32,
    pub debug: bool,
    pub time_ticks: u64,
    quit: bool,
    next_id: u32,
    #[serde(skip)]
    cues: Vec<SoundCue>,
}

impl Battle {
    pub fn new(seed: u64, red_ai: TeamAi, blue_ai: TeamAi) -> Self {
        let mut battle = Self {
            seed,
            rng_state: RngState::new(seed),
            red_ai,
            blue_ai,
            regiments: Vec::new(),
            bullets: Vec::new(),
            phase: BattlePhase::Running,
            stats: BattleStats::default(),
            speed: 1,
            debug: false,
            time_ticks: 0,
            quit: false,
            next_id: 1,
            cues: Vec::new(),
        };
        battle.deploy();
        battle
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn deploy(&mut self) {
        let mut rng = self.rng_state.next_rng();
        for (team, x, angle, ai) in [
            (Team::Red, MARGIN + 150.0, 0.0, self.red_ai),
            (Team::Blue, SCREEN_WIDTH - MARGIN - 150.0, 180.0, self.blue_ai),
        ] {
            for i in 0..REGIMENTS_PER_TEAM {
                let id = self.next_entity_id();
                let y = MARGIN + 150.0 + i as f32 * 180.0;
                let personality = ai.pick(&mut rng);
                self.regiments
                    .push(Regiment::new(id, team, Vec2::new(x, y), angle, personality));
            }
        }
        log::info!(
            "Battle deployed: red [{}] vs blue [{}]",
            self.personality_list(Team::Red),
            self.personality_list(Team::Blue)
        );
    }

    fn personality_list(&self, team: Team) -> String {
        self.regiments
            .iter()
            .filter(|r| r.team == team)
            .map(|r| r.personality.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Start over with a fresh seed, keeping AI selection and speed
    pub fn restart(&mut self) {
        let seed: u64 = self.rng_state.next_rng().random();
        let speed = self.speed;
        let debug = self.debug;
        *self = Self::new(seed, self.red_ai, self.blue_ai);
        self.speed = speed;
        self.debug = debug;
    }

    pub fn alive(&self, team: Team) -> usize {
        self.regiments
            .iter()
            .filter(|r| r.team == team && !r.destroyed)
            .count()
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.regiments.sort_by_key(|r| r.id);
        self.bullets.sort_by_key(|b| b.id);
    }

    /// One simulation step: decide, act, fly, resolve
    pub fn step(&mut self) {
        if self.phase != BattlePhase::Running {
            return;
        }
        self.time_ticks += 1;
        let mut rng = self.rng_state.next_rng();

        // Every regiment decides from the same snapshot
        let actions: Vec<Option<Action>> = self
            .regiments
            .iter()
            .map(|r| {
                let allies: Vec<&Regiment> = self
                    .regiments
                    .iter()
                    .filter(|o| o.team == r.team && o.id != r.id && !o.destroyed)
                    .collect();
                let enemies: Vec<&Regiment> =
                    self.regiments.iter().filter(|o| o.team != r.team).collect();
                decide(r, &allies, &enemies, &mut rng)
            })
            .collect();

        for (i, action) in actions.into_iter().enumerate() {
            let Some(action) = action else { continue };
            self.regiments[i].apply(action);

            if action == Action::Fire && self.bullets.len() < MAX_BULLETS {
                let volley = self.regiments[i].fire(&mut rng);
                if !volley.is_empty() {
                    let team = self.regiments[i].team;
                    self.stats.bullets_fired[team.index()] += volley.len() as u32;
                    log::debug!("regiment {} fired a volley", self.regiments[i].id);
                    for mut bullet in volley {
                        bullet.id = self.next_entity_id();
                        self.bullets.push(bullet);
                    }
                    self.cues.push(SoundCue::Fire);
                }
            }
        }

        self.update_bullets();
        self.normalize_order();
        self.check_win();
    }

    fn update_bullets(&mut self) {
        let mut any_hit = false;
        let regiments = &mut self.regiments;
        let stats = &mut self.stats;
        let cues = &mut self.cues;

        self.bullets.retain_mut(|bullet| {
            let alive = bullet.update();
            let target = regiments
                .iter_mut()
                .find(|r| r.team != bullet.team && r.is_hit_by(bullet));
            if let Some(regiment) = target {
                regiment.take_damage(BULLET_DAMAGE);
                stats.damage_dealt[bullet.team.index()] += BULLET_DAMAGE;
                any_hit = true;
                if regiment.destroyed {
                    log::info!("{} regiment {} destroyed", regiment.team.name(), regiment.id);
                    cues.push(SoundCue::Explosion);
                }
                return false;
            }
            alive
        });

        if any_hit {
            self.cues.push(SoundCue::Hit);
        }
    }

    fn check_win(&mut self) {
        let red = self.alive(Team::Red);
        let blue = self.alive(Team::Blue);
        let winner = match (red, blue) {
            (0, 0) => None,
            (0, _) => Some(Team::Blue),
            (_, 0) => Some(Team::Red),
            _ => return,
        };
        self.phase = BattlePhase::GameOver { winner };
        self.cues.push(SoundCue::GameOver);
        match winner {
            Some(team) => log::info!(
                "{} team wins after {} ticks (fired {:?}, damage {:?})",
                team.name(),
                self.time_ticks,
                self.stats.bullets_fired,
                self.stats.damage_dealt
            ),
            None => log::info!("Battle ends in mutual destruction"),
        }
    }

    fn handle_controls(&mut self, input: &InputFrame) {
        if input.any_pressed(&[Key::Escape, Key::Q]) {
            self.quit = true;
        }
        if input.any_pressed(&[Key::F1, Key::D]) {
            self.debug = !self.debug;
            log::info!("Debug overlay: {}", if self.debug { "ON" } else { "OFF" });
        }
        for (key, speed) in [(Key::Digit1, 1), (Key::Digit2, 2), (Key::Digit3, 3)] {
            if input.was_pressed(key) {
                self.speed = speed;
            }
        }
        if input.was_pressed(Key::P) {
            self.phase = match self.phase {
                BattlePhase::Running => BattlePhase::Paused,
                BattlePhase::Paused => BattlePhase::Running,
                over => over,
            };
        }
        if input.was_pressed(Key::Space) && matches!(self.phase, BattlePhase::GameOver { .. }) {
            self.restart();
        }
    }
}

impl Game for Battle {
    fn kind(&self) -> GameKind {
        GameKind::Army
    }

    fn screen_size(&self) -> Vec2 {
        Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn tick(&mut self, input: &InputFrame) {
        self.handle_controls(input);
        for _ in 0..self.speed.clamp(1, 3) {
            self.step();
        }
    }

    fn draw(&self, canvas: &mut Canvas) {
        canvas.fill(GRASS);
        canvas.rect_outline(
            MARGIN,
            MARGIN,
            SCREEN_WIDTH - 2.0 * MARGIN,
            SCREEN_HEIGHT - 2.0 * MARGIN,
            5.0,
            BORDER,
        );

        for bullet in self.bullets.iter().filter(|b| b.is_live()) {
            canvas.circle(bullet.pos, BULLET_RADIUS, team_color(bullet.team));
        }

        for regiment in self.regiments.iter().filter(|r| !r.destroyed) {
            canvas.quad(regiment.corners(), team_color(regiment.team));

            if self.debug {
                let front = regiment.pos + regiment.heading() * (REGIMENT_DEPTH / 2.0);
                canvas.line(regiment.pos, front, 2.0, colors::WHITE);
            }

            let frac = regiment.health as f32 / REGIMENT_HEALTH as f32;
            let bar_color = if frac < 0.3 {
                colors::RED
            } else if frac < 0.7 {
                colors::YELLOW
            } else {
                colors::GREEN
            };
            canvas.bar(
                regiment.pos.x - 20.0,
                regiment.pos.y - REGIMENT_FRONTAGE - 10.0,
                40.0,
                5.0,
                frac,
                bar_color,
                colors::BLACK,
            );

            if self.debug {
                // Readiness pip: green ready, yellow aiming, gray otherwise
                let pip = match regiment.status() {
                    RegimentStatus::Ready => colors::GREEN,
                    RegimentStatus::Aiming(_) => colors::YELLOW,
                    _ => colors::GRAY,
                };
                canvas.circle(
                    Vec2::new(regiment.pos.x + 26.0, regiment.pos.y - REGIMENT_FRONTAGE - 8.0),
                    3.0,
                    pip,
                );
            }
        }

        if let BattlePhase::GameOver { winner } = self.phase {
            canvas.rect(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT, with_alpha(colors::BLACK, 0.5));
            let banner = winner.map(team_color).unwrap_or(colors::WHITE);
            canvas.rect(SCREEN_WIDTH / 2.0 - 200.0, SCREEN_HEIGHT / 2.0 - 40.0, 400.0, 80.0, banner);
        }
    }

    fn hud(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Red Team: {}/{} alive", self.alive(Team::Red), REGIMENTS_PER_TEAM),
            format!("Blue Team: {}/{} alive", self.alive(Team::Blue), REGIMENTS_PER_TEAM),
            format!(
                "Bullets fired: red {} / blue {}",
                self.stats.bullets_fired[0], self.stats.bullets_fired[1]
            ),
            format!(
                "Damage dealt: red {} / blue {}",
                self.stats.damage_dealt[0], self.stats.damage_dealt[1]
            ),
            format!("Speed: {}x", self.speed),
        ];

        if self.debug {
            for team in [Team::Red, Team::Blue] {
                for (i, r) in self.regiments.iter().filter(|r| r.team == team).enumerate() {
                    lines.push(format!(
                        "{} {} ({}): {}",
                        team.name(),
                        i + 1,
                        r.personality.name(),
                        r.status().label()
                    ));
                }
            }
        }

        match self.phase {
            BattlePhase::GameOver { winner: Some(team) } => {
                lines.push(format!("{} Team wins! Press SPACE to restart", team.name()));
            }
            BattlePhase::GameOver { winner: None } => {
                lines.push("Draw! Press SPACE to restart".to_string());
            }
            BattlePhase::Paused => lines.push("PAUSED".to_string()),
            BattlePhase::Running => {}
        }
        lines
    }

    fn is_over(&self) -> bool {
        matches!(self.phase, BattlePhase::GameOver { .. })
    }

    fn final_score(&self) -> Option<u64> {
        // Spectator game: nothing to put on a leaderboard
        None
    }

    fn quit_requested(&self) -> bool {
        self.quit
    }

    fn pause(&mut self) {
        if self.phase == BattlePhase::Running {
            self.phase = BattlePhase::Paused;
        }
    }

    fn take_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::army::Personality;

    fn battle() -> Battle {
        Battle::new(12345, TeamAi::default(), TeamAi::Random)
    }

    #[test]
    fn test_deployment() {
        let b = battle();
        assert_eq!(b.regiments.len(), 6);
        assert_eq!(b.alive(Team::Red), 3);
        let red: Vec<_> = b.regiments.iter().filter(|r| r.team == Team::Red).collect();
        assert_eq!(red[0].pos, Vec2::new(MARGIN + 150.0, MARGIN + 150.0));
        assert_eq!(red[2].pos.y, MARGIN + 150.0 + 360.0);
        assert!(red.iter().all(|r| r.personality == Personality::Standard));
        let blue = b.regiments.iter().find(|r| r.team == Team::Blue).map(|r| r.angle);
        assert_eq!(blue, Some(180.0));
    }

    #[test]
    fn test_win_when_team_wiped() {
        let mut b = battle();
        for r in b.regiments.iter_mut().filter(|r| r.team == Team::Blue) {
            r.take_damage(REGIMENT_HEALTH);
        }
        b.step();
        assert_eq!(b.phase, BattlePhase::GameOver { winner: Some(Team::Red) });
        assert!(b.is_over());
        assert!(b.take_cues().contains(&SoundCue::GameOver));
    }

    #[test]
    fn test_draw_when_both_wiped() {
        let mut b = battle();
        for r in b.regiments.iter_mut() {
            r.take_damage(REGIMENT_HEALTH);
        }
        b.step();
        assert_eq!(b.phase, BattlePhase::GameOver { winner: None });
    }

    #[test]
    fn test_bullet_hit_credits_shooter() {
        let mut b = battle();
        let target = b.regiments.iter().find(|r| r.team == Team::Blue).map(|r| r.pos);
        let Some(pos) = target else {
            panic!("no blue regiment");
        };
        let id = b.next_entity_id();
        b.bullets.push(Bullet {
            id,
            pos,
            angle: 0.0,
            team: Team::Red,
            lifetime: BULLET_LIFETIME,
            delay: 0,
        });
        b.update_bullets();
        assert!(b.bullets.is_empty());
        assert_eq!(b.stats.damage_dealt[Team::Red.index()], BULLET_DAMAGE);
    }

    #[test]
    fn test_controls_speed_pause_restart() {
        let mut b = battle();
        b.tick(&InputFrame::with_pressed(&[Key::Digit3]));
        assert_eq!(b.speed, 3);
        assert_eq!(b.time_ticks, 3);

        b.tick(&InputFrame::with_pressed(&[Key::P]));
        assert_eq!(b.phase, BattlePhase::Paused);
        let t = b.time_ticks;
        b.tick(&InputFrame::default());
        assert_eq!(b.time_ticks, t);

        b.phase = BattlePhase::GameOver { winner: Some(Team::Blue) };
        b.tick(&InputFrame::with_pressed(&[Key::Space]));
        assert_eq!(b.phase, BattlePhase::Running);
        assert_eq!(b.speed, 3);
        assert_eq!(b.regiments.len(), 6);
    }

    #[test]
    fn test_quit_keys() {
        let mut b = battle();
        b.tick(&InputFrame::with_pressed(&[Key::Q]));
        assert!(b.quit_requested());
    }

    #[test]
    fn test_determinism() {
        let mut b1 = battle();
        let mut b2 = battle();
        for _ in 0..600 {
            b1.step();
            b2.step();
        }
        assert_eq!(b1.time_ticks, b2.time_ticks);
        assert_eq!(b1.bullets.len(), b2.bullets.len());
        assert_eq!(b1.stats, b2.stats);
        for (r1, r2) in b1.regiments.iter().zip(&b2.regiments) {
            assert_eq!(r1.pos, r2.pos);
            assert_eq!(r1.health, r2.health);
        }
    }

    #[test]
    fn test_battle_reaches_contact() {
        // Left alone the armies close, fire, and draw blood
        let mut b = Battle::new(7, TeamAi::Fixed(Personality::Aggressive), TeamAi::Fixed(Personality::Aggressive));
        for _ in 0..6000 {
            b.step();
            if b.is_over() {
                break;
            }
        }
        let fired: u32 = b.stats.bullets_fired.iter().sum();
        assert!(fired > 0, "no volleys fired");
    }
}
