//! Arcade Pack entry point
//!
//! On the web this runs the chosen game in a requestAnimationFrame loop;
//! natively it is a headless runner that lets the autopilot play.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use arcade_pack::audio::AudioManager;
    use arcade_pack::consts::SIM_DT;
    use arcade_pack::highscores::now_ms;
    use arcade_pack::renderer::pipeline::view_to_game;
    use arcade_pack::renderer::{Canvas, RenderState};
    use arcade_pack::{FixedStep, Game, GameKind, HighScores, InputState, Key, Settings, create_game};

    /// Frontend state around the running game
    struct App {
        kind: GameKind,
        game: Box<dyn Game>,
        settings: Settings,
        highscores: HighScores,
        audio: AudioManager,
        render_state: Option<RenderState>,
        canvas: Canvas,
        input: InputState,
        step: FixedStep,
        last_time: f64,
        /// Leaderboard already updated for the current game over
        score_recorded: bool,
        /// CSS size of the canvas element, for mouse mapping
        view_size: (f32, f32),
    }

    impl App {
        fn new(kind: GameKind) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            let seed = js_sys::Date::now() as u64;
            let game = create_game(kind, seed, &settings);
            let size = game.screen_size();
            Self {
                kind,
                game,
                settings,
                highscores: HighScores::load(),
                audio,
                render_state: None,
                canvas: Canvas::new(size.x, size.y),
                input: InputState::default(),
                step: FixedStep::default(),
                last_time: 0.0,
                score_recorded: false,
                view_size: (1.0, 1.0),
            }
        }

        /// Start a fresh game of the given kind
        fn switch_to(&mut self, kind: GameKind) {
            let seed = js_sys::Date::now() as u64;
            self.kind = kind;
            self.game = create_game(kind, seed, &self.settings);
            self.step.reset();
            self.input = InputState::default();
            self.score_recorded = false;
        }

        fn mouse_pos(&self, event: &MouseEvent) -> glam::Vec2 {
            let size = self.game.screen_size();
            view_to_game(
                event.offset_x() as f32,
                event.offset_y() as f32,
                size.x,
                size.y,
                self.view_size.0,
                self.view_size.1,
            )
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let ticks = self.step.advance(dt, self.settings.game_speed_clamped());
            for _ in 0..ticks {
                let frame = self.input.frame();
                self.game.tick(&frame);
                self.input.clear_one_shots();

                for cue in self.game.take_cues() {
                    self.audio.play(cue);
                }
            }

            if self.game.is_over() && !self.score_recorded {
                self.score_recorded = true;
                if let Some(score) = self.game.final_score() {
                    if self.highscores.add_score(self.kind, score, now_ms()).is_some() {
                        self.highscores.save();
                    }
                }
            } else if !self.game.is_over() {
                self.score_recorded = false;
            }

            if self.game.quit_requested() {
                log::info!("Quit requested, restarting {}", self.kind.title());
                self.switch_to(self.kind);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let size = self.game.screen_size();
            self.canvas.reset(size.x, size.y);
            self.game.draw(&mut self.canvas);

            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.canvas) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            if let Some(el) = document.query_selector("#hud-title").ok().flatten() {
                el.set_text_content(Some(self.kind.title()));
            }
            if let Some(el) = document.query_selector("#hud-lines").ok().flatten() {
                el.set_text_content(Some(&self.game.hud().join("\n")));
            }
            if let Some(el) = document.query_selector("#hud-best .hud-value").ok().flatten() {
                let best = self
                    .highscores
                    .top_score(self.kind)
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                el.set_text_content(Some(&best));
            }
        }

        /// Window lost focus or the tab was hidden
        fn suspend(&mut self, reason: &str) {
            self.game.pause();
            self.input.release_all();
            if self.settings.mute_on_blur {
                self.audio.set_muted(true);
            }
            log::info!("Auto-paused ({reason})");
        }
    }

    fn kind_from_hash() -> GameKind {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .and_then(|h| GameKind::from_slug(&h))
            .unwrap_or(GameKind::Army)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Arcade Pack starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let app = Rc::new(RefCell::new(App::new(kind_from_hash())));
        app.borrow_mut().view_size = (client_w as f32, client_h as f32);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface: {e}")))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter: {e}")))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&format!("device: {e}")))?;
        app.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, app.clone());
        setup_hash_switch(app.clone());
        setup_auto_pause(app.clone());

        request_animation_frame(app);

        log::info!("Arcade Pack running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(key) = Key::from_code(&event.code()) else { return };
                // Keep arrows/space from scrolling the page
                if matches!(key, Key::Up | Key::Down | Key::Left | Key::Right | Key::Space) {
                    event.prevent_default();
                }
                let mut a = app.borrow_mut();
                a.audio.resume();
                a.input.key_down(key);
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(key) = Key::from_code(&event.code()) {
                    app.borrow_mut().input.key_up(key);
                }
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.view_size = (canvas_clone.client_width() as f32, canvas_clone.client_height() as f32);
                let pos = a.mouse_pos(&event);
                a.input.mouse_move(pos);
            });
            let _ = canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.audio.resume();
                a.view_size = (canvas_clone.client_width() as f32, canvas_clone.client_height() as f32);
                let pos = a.mouse_pos(&event);
                a.input.mouse_down(pos);
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// `#flappy`, `#snake`, ... pick the game
    fn setup_hash_switch(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let kind = kind_from_hash();
            let mut a = app.borrow_mut();
            if kind != a.kind {
                log::info!("Switching to {}", kind.title());
                a.switch_to(kind);
            }
        });
        let _ = window.add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render();
            a.update_hud();
        }

        request_animation_frame(app);
    }

    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        // Visibility change (tab switch, minimize)
        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    app.borrow_mut().suspend("tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Window blur (click outside)
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().suspend("window blur");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus back: sound on again
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().audio.set_muted(false);
            });
            let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};
    use clap::Parser;

    use arcade_pack::consts::{SIM_DT, TICKS_PER_SECOND};
    use arcade_pack::{FixedStep, GameKind, Settings, create_game};

    /// Run a game headless with the autopilot at the controls
    #[derive(Parser, Debug)]
    #[command(name = "arcade-pack", version, about)]
    pub struct Args {
        /// Game to run: army, flappy, omd, spacewar, slicing, snake
        #[arg(short, long, default_value = "army")]
        pub game: String,

        /// RNG seed (defaults to the current time)
        #[arg(short, long)]
        pub seed: Option<u64>,

        /// Stop after this many ticks even if the game is still running
        #[arg(long, default_value_t = 60 * 60 * 5)]
        pub max_ticks: u64,

        /// Settings JSON file
        #[arg(long)]
        pub settings: Option<PathBuf>,

        /// Game speed multiplier (1-3), overrides the settings file
        #[arg(long)]
        pub speed: Option<f32>,
    }

    pub fn run(args: Args) -> Result<()> {
        let Some(kind) = GameKind::from_slug(&args.game) else {
            let known: Vec<&str> = GameKind::ALL.iter().map(|k| k.slug()).collect();
            bail!("unknown game '{}' (expected one of: {})", args.game, known.join(", "));
        };

        let mut settings = match &args.settings {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings from {}", path.display()))?;
                Settings::from_json(&json)
            }
            None => Settings::default(),
        };
        if let Some(speed) = args.speed {
            settings.game_speed = speed;
        }

        let seed = args.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

        let mut game = create_game(kind, seed, &settings);
        let mut step = FixedStep::default();
        let speed = settings.game_speed_clamped();
        let mut ticks: u64 = 0;
        let mut frames: u64 = 0;

        // Simulated 60 fps frames, each running as many ticks as the speed asks for
        'frames: while ticks < args.max_ticks {
            frames += 1;
            for _ in 0..step.advance(SIM_DT, speed) {
                let input = game.autopilot();
                game.tick(&input);
                game.take_cues();
                ticks += 1;

                if ticks % (TICKS_PER_SECOND as u64 * 10) == 0 {
                    log::debug!("tick {}: {}", ticks, game.hud().join(" | "));
                }
                if game.is_over() || game.quit_requested() || ticks >= args.max_ticks {
                    break 'frames;
                }
            }
        }

        for line in game.hud() {
            log::info!("{line}");
        }
        let outcome = if game.is_over() { "finished" } else { "stopped" };
        match game.final_score() {
            Some(score) => log::info!(
                "{} {} after {} ticks ({} frames at {}x), score {}",
                kind.title(),
                outcome,
                ticks,
                frames,
                speed,
                score
            ),
            None => log::info!("{} {} after {} ticks ({} frames at {}x)", kind.title(), outcome, ticks, frames, speed),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    headless::run(headless::Args::parse())
}
