//! Ping Pong Arena entry point
//!
//! Handles platform-specific initialization and runs the game loop. The web
//! build drives the simulation from `requestAnimationFrame` and exposes a JSON
//! snapshot for the page's renderer; the native build plays a headless match.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use ping_pong_arena::audio::{AudioManager, dispatch_events};
    use ping_pong_arena::consts::*;
    use ping_pong_arena::sim::{FrameDriver, GameState, TickInput};
    use ping_pong_arena::stats::{MatchResult, StatsSink};
    use ping_pong_arena::{PlayerStats, Settings};

    /// Keyboard paddle step per key press (px)
    const KEY_STEP: f32 = 40.0;

    /// Game instance holding all state
    pub(crate) struct Game {
        pub(crate) state: GameState,
        driver: FrameDriver,
        last_time: f64,
        input: TickInput,
        audio: AudioManager,
        stats: PlayerStats,
        settings: Settings,
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Run `f` against the running game, if there is one
    pub(crate) fn with_game<R>(f: impl FnOnce(&mut Game) -> R) -> Option<R> {
        GAME.with(|slot| {
            let game = slot.borrow().clone()?;
            let mut g = game.borrow_mut();
            Some(f(&mut g))
        })
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                state: GameState::with_settings(seed, &settings),
                driver: FrameDriver::new(),
                last_time: 0.0,
                input: TickInput::default(),
                audio: AudioManager::from_settings(&settings),
                stats: PlayerStats::load(),
                settings,
            }
        }

        /// Run simulation steps for one display frame
        fn update(&mut self, dt: f32) {
            self.driver.advance(&mut self.state, &mut self.input, dt);

            let events = self.state.drain_events();
            dispatch_events(&events, &self.audio);
            let now = js_sys::Date::now();
            for result in events.iter().filter_map(|e| MatchResult::from_event(e, now)) {
                self.stats.record(&result);
            }
        }

        /// Start (or restart after a finished match); first gesture also
        /// unlocks audio
        pub(crate) fn start(&mut self) {
            self.audio.resume();
            self.state.start();
        }

        pub(crate) fn restart(&mut self) {
            self.audio.resume();
            let seed = js_sys::Date::now() as u64;
            self.state = GameState::with_settings(seed, &self.settings);
            self.state.start();
            self.driver = FrameDriver::new();
            log::info!("Game restarted with seed: {}", seed);
        }

        pub(crate) fn request_pause(&mut self) {
            self.input.pause = true;
        }

        pub(crate) fn set_player_y(&mut self, y: f32) {
            self.input.player_y = Some(y);
        }

        fn nudge_player(&mut self, dy: f32) {
            let current = self.input.player_y.unwrap_or(self.state.player.y);
            self.input.player_y = Some(current + dy);
        }

        pub(crate) fn settings(&self) -> &Settings {
            &self.settings
        }

        /// Apply new settings; match rules take effect on the next restart
        pub(crate) fn apply_settings(&mut self, settings: Settings) {
            self.audio.set_master_volume(settings.master_volume);
            self.audio.set_sfx_volume(settings.sfx_volume);
            self.audio.set_muted(settings.muted);
            settings.save();
            self.settings = settings;
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ping Pong Arena starting...");

        let Some(window) = web_sys::window() else {
            log::error!("No window, nothing to run");
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document, nothing to run");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, Settings::load())));
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));
        log::info!("Game initialized with seed: {}", seed);

        let canvas = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok());
        match canvas {
            Some(canvas) => setup_pointer_input(&canvas, game.clone()),
            None => log::warn!("No #canvas element, pointer input disabled"),
        }
        setup_keyboard_input(game.clone());
        setup_auto_pause(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Ping Pong Arena running!");
    }

    /// Map a client-space y coordinate to field space
    fn client_to_field_y(canvas: &HtmlCanvasElement, client_y: f32) -> Option<f32> {
        let rect = canvas.get_bounding_client_rect();
        let height = rect.height() as f32;
        if height <= 0.0 {
            return None;
        }
        Some((client_y - rect.top() as f32) / height * FIELD_HEIGHT)
    }

    fn setup_pointer_input(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(y) = client_to_field_y(&canvas_clone, event.client_y() as f32) {
                    game.borrow_mut().set_player_y(y);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click starts a match
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if !g.state.match_state.is_started() || g.state.match_state.is_over() {
                    g.start();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    if let Some(y) = client_to_field_y(&canvas_clone, touch.client_y() as f32) {
                        game.borrow_mut().set_player_y(y);
                    }
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                let mut g = game.borrow_mut();
                if !g.state.match_state.is_started() || g.state.match_state.is_over() {
                    g.start();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard_input(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                " " | "Enter" => {
                    if g.state.match_state.is_started() && !g.state.match_state.is_over() {
                        g.request_pause();
                    } else {
                        g.start();
                    }
                }
                "Escape" | "p" | "P" => g.request_pause(),
                "r" | "R" => g.restart(),
                "ArrowUp" | "w" | "W" => g.nudge_player(-KEY_STEP),
                "ArrowDown" | "s" | "S" => g.nudge_player(KEY_STEP),
                _ => return,
            }
            event.prevent_default();
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.match_state.is_running() {
                        g.request_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.state.match_state.is_running() {
                    g.request_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

// === Page-facing API ===

/// Current game state as JSON for the page's renderer
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn snapshot_json() -> Option<String> {
    wasm_game::with_game(|g| match g.state.snapshot_json() {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("Snapshot failed: {}", e);
            None
        }
    })
    .flatten()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_match() {
    wasm_game::with_game(|g| g.start());
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn restart_match() {
    wasm_game::with_game(|g| g.restart());
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn toggle_pause() {
    wasm_game::with_game(|g| g.request_pause());
}

/// Player paddle center in field coordinates
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_player_y(y: f32) {
    wasm_game::with_game(|g| g.set_player_y(y));
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_difficulty_level(level: u8) {
    wasm_game::with_game(|g| g.state.set_difficulty_level(level));
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn settings_json() -> Option<String> {
    wasm_game::with_game(|g| g.settings().to_json().ok()).flatten()
}

/// Replace the stored settings; returns false if the JSON is rejected
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn apply_settings_json(json: &str) -> bool {
    match ping_pong_arena::Settings::from_json(json) {
        Ok(settings) => wasm_game::with_game(|g| g.apply_settings(settings)).is_some(),
        Err(e) => {
            log::warn!("Rejected settings: {}", e);
            false
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stats_json() -> Option<String> {
    serde_json::to_string(&ping_pong_arena::PlayerStats::load()).ok()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use ping_pong_arena::audio::{AudioManager, dispatch_events};
    use ping_pong_arena::consts::*;
    use ping_pong_arena::sim::{FrameDriver, GameEvent, GameState, TickInput};
    use ping_pong_arena::stats::{MatchResult, StatsSink};
    use ping_pong_arena::{PlayerStats, Settings};

    /// Ten simulated minutes
    const MAX_FRAMES: u32 = 36_000;

    /// How closely the stand-in player tracks the ball (px per frame)
    const PLAYER_REACH: f32 = 7.0;

    pub struct Options {
        pub seed: u64,
        pub settings: Settings,
    }

    /// Parse `[--seed N] [settings.json]`
    pub fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, String> {
        let mut seed = 1;
        let mut settings = Settings::load();
        let mut args = args;
        while let Some(arg) = args.next() {
            if arg == "--seed" {
                let value = args.next().ok_or("--seed needs a value")?;
                seed = value
                    .parse()
                    .map_err(|e| format!("bad seed {value:?}: {e}"))?;
            } else {
                let json = std::fs::read_to_string(&arg)
                    .map_err(|e| format!("cannot read {arg}: {e}"))?;
                settings =
                    Settings::from_json(&json).map_err(|e| format!("bad settings in {arg}: {e}"))?;
            }
        }
        Ok(Options { seed, settings })
    }

    /// Play one match with a simple ball-following player
    pub fn play(options: Options) -> Option<MatchResult> {
        let mut state = GameState::with_settings(options.seed, &options.settings);
        let audio = AudioManager::from_settings(&options.settings);
        let mut stats = PlayerStats::load();
        let mut driver = FrameDriver::new();

        state.start();
        for frame in 0..MAX_FRAMES {
            let target = state
                .main_ball()
                .map(|b| b.pos.y)
                .unwrap_or(state.height / 2.0);
            let step = (target - state.player.y).clamp(-PLAYER_REACH, PLAYER_REACH);
            let mut input = TickInput {
                player_y: Some(state.player.y + step),
                ..Default::default()
            };
            driver.advance(&mut state, &mut input, SIM_DT);

            let events = state.drain_events();
            dispatch_events(&events, &audio);
            for event in &events {
                match event {
                    GameEvent::PointScored { side } => log::info!(
                        "{:?} scores ({} - {})",
                        side,
                        state.match_state.player_score,
                        state.match_state.computer_score
                    ),
                    GameEvent::LevelUp { level } => log::info!("Level {}", level),
                    GameEvent::PowerUpCollected { kind, target } => {
                        log::info!("{} -> {:?}", kind.config().name, target)
                    }
                    _ => {}
                }
                if let Some(result) = MatchResult::from_event(event, state.now_ms) {
                    stats.record(&result);
                    log::info!("Match over after {} frames", frame + 1);
                    return Some(result);
                }
            }
        }

        log::warn!("No winner after {} frames", MAX_FRAMES);
        None
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ping Pong Arena (native) starting...");
    log::info!("Native mode plays a headless match - run with `trunk serve` for the web version");

    let options = match headless::parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("usage: ping-pong-arena [--seed N] [settings.json]");
            std::process::exit(2);
        }
    };
    let seed = options.seed;

    match headless::play(options) {
        Some(result) => println!(
            "seed {}: {:?} wins {} - {}",
            seed, result.winner, result.player_score, result.computer_score
        ),
        None => println!("seed {}: no result", seed),
    }
}
