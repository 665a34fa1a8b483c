//! Block Breaker entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, MouseEvent, TouchEvent};

    use block_breaker::Settings;
    use block_breaker::consts::*;
    use block_breaker::input::{KeyAction, key_action};
    use block_breaker::renderer::{Frame, Palette, RenderState, Viewport};
    use block_breaker::sim::{
        Difficulty, GameEvent, GamePhase, GameState, RoundOutcome, TickInput, autopilot_target,
        tick,
    };

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        palette: Palette,
        render_state: Option<RenderState>,
        accumulator: f32,
        last_time: f64,
        /// Latest pointer position not yet handed to the simulation
        pointer_x: Option<f32>,
        /// CSS size of the canvas, for pointer mapping
        client_size: (f32, f32),
        idle_mode: bool,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(settings: Settings, seed: u64) -> Self {
            let palette = palette_for(&settings);
            Self {
                state: GameState::new(seed),
                settings,
                palette,
                render_state: None,
                accumulator: 0.0,
                last_time: 0.0,
                pointer_x: None,
                client_size: (ARENA_WIDTH, ARENA_HEIGHT),
                idle_mode: false,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Canvas-relative CSS x to arena x
        fn client_to_arena_x(&self, x: f32) -> f32 {
            Viewport::new(self.client_size.0, self.client_size.1).client_to_arena_x(x)
        }

        fn start_round(&mut self, level: u8) {
            match self.state.begin_round_at_level(level) {
                Ok(()) => {
                    self.accumulator = 0.0;
                    self.pointer_x = None;
                }
                Err(e) => log::warn!("Start rejected: {}", e),
            }
        }

        fn back_to_menu(&mut self) {
            if let Err(e) = self.state.return_to_menu() {
                log::warn!("Menu rejected: {}", e);
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let pointer_x = if self.idle_mode {
                    autopilot_target(&self.state, 0.0)
                } else {
                    self.pointer_x.take()
                };
                let input = TickInput {
                    pointer_x,
                    now_ms: js_sys::Date::now(),
                };
                let events = tick(&mut self.state, &input);
                self.log_events(&events);

                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            // Calculate FPS from oldest to newest frame
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn log_events(&self, events: &[GameEvent]) {
            for event in events {
                match event {
                    GameEvent::ItemCollected { kind } => log::debug!("Collected {:?}", kind),
                    GameEvent::RoundCleared => log::info!("Cleared! score {}", self.state.score),
                    GameEvent::RoundLost => log::info!("Ball lost, score {}", self.state.score),
                    _ => {}
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) -> Frame {
            let frame = Frame::build(&self.state, &self.palette);
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&frame) {
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
            frame
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, document: &Document, frame: &Frame) {
            // Score text overlay
            if let Some(el) = document.get_element_by_id("hud-score") {
                let text = frame.texts().next().unwrap_or_default();
                el.set_text_content(Some(text));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    el.set_text_content(Some(&format!("{} fps", self.fps)));
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            set_visible(document, "start-menu", self.state.phase == GamePhase::Start);

            let over = self.state.phase == GamePhase::GameOver;
            set_visible(document, "game-over", over);
            if over {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&self.state.score.to_string()));
                }
                if let Some(el) = document.get_element_by_id("final-outcome") {
                    let text = match self.state.outcome {
                        Some(RoundOutcome::Cleared) => "All blocks cleared!",
                        Some(RoundOutcome::BallLost) => "Ball lost",
                        None => "",
                    };
                    el.set_text_content(Some(text));
                }
            }
        }

        fn toggle_fps(&mut self) {
            self.settings.show_fps = !self.settings.show_fps;
            self.settings.save();
        }

        fn toggle_contrast(&mut self) {
            self.settings.high_contrast = !self.settings.high_contrast;
            self.palette = palette_for(&self.settings);
            self.settings.save();
        }
    }

    fn palette_for(settings: &Settings) -> Palette {
        if settings.high_contrast {
            Palette::high_contrast()
        } else {
            Palette::classic()
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "overlay" } else { "overlay hidden" });
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Block Breaker starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize game
        let settings = Settings::load();
        let seed = settings.session_seed(js_sys::Date::now());
        let game = Rc::new(RefCell::new(Game::new(settings, seed)));
        game.borrow_mut().client_size = (client_w as f32, client_h as f32);

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        game.borrow_mut().render_state = Some(render_state);

        setup_input_handlers(&canvas, game.clone());
        setup_menu_buttons(&document, game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Block Breaker running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.client_size = (
                    canvas_clone.client_width() as f32,
                    canvas_clone.client_height() as f32,
                );
                let x = g.client_to_arena_x(event.offset_x() as f32);
                g.pointer_x = Some(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    g.client_size = (
                        canvas_clone.client_width() as f32,
                        canvas_clone.client_height() as f32,
                    );
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let x = g.client_to_arena_x(x);
                    g.pointer_x = Some(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = match web_sys::window() {
                Some(w) => w,
                None => return,
            };
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let Some(action) = key_action(&event.key(), g.state.phase) else {
                    return;
                };
                match action {
                    KeyAction::StartRound(level) => g.start_round(level),
                    KeyAction::ReturnToMenu => g.back_to_menu(),
                    KeyAction::ToggleFps => g.toggle_fps(),
                    KeyAction::ToggleContrast => g.toggle_contrast(),
                    KeyAction::ToggleIdle => {
                        g.idle_mode = !g.idle_mode;
                        log::info!("Idle mode: {}", g.idle_mode);
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_menu_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        // One start button per difficulty
        for difficulty in Difficulty::ALL {
            let level = difficulty.level();
            if let Some(btn) = document.get_element_by_id(&format!("start-{}", level)) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    game.borrow_mut().start_round(level);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("menu-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().back_to_menu();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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

            g.update(dt, time);
            let frame = g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document, &frame);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use block_breaker::Settings;
    use block_breaker::consts::SIM_DT;
    use block_breaker::renderer::{Frame, Palette};
    use block_breaker::sim::{
        Difficulty, GameEvent, GamePhase, GameState, TickInput, autopilot_target, tick,
    };

    env_logger::init();
    log::info!("Block Breaker (native) starting...");
    log::info!("Native mode runs a headless demo round - run with `trunk serve` for the web version");

    let settings = Settings::load();
    let clock_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or_default();
    let seed = settings.session_seed(clock_ms);

    let mut state = GameState::new(seed);
    if let Err(e) = state.begin_round(Difficulty::Normal) {
        log::error!("Could not start demo round: {}", e);
        return;
    }

    // Five simulated minutes at most
    let step_ms = SIM_DT as f64 * 1000.0;
    let mut now_ms = 0.0;
    let mut pickups = 0;
    for step in 0..60 * 60 * 5u32 {
        if state.phase != GamePhase::Playing {
            break;
        }
        // Sweep the strike point across the paddle over time
        let offset = ((step as f32) * 0.013).sin() * 20.0;
        let input = TickInput {
            pointer_x: autopilot_target(&state, offset),
            now_ms,
        };
        for event in tick(&mut state, &input) {
            if matches!(event, GameEvent::ItemCollected { .. }) {
                pickups += 1;
            }
        }
        now_ms += step_ms;
    }

    let frame = Frame::build(&state, &Palette::classic());
    println!(
        "seed {}: {:?} after {} steps, score {}, {} blocks left, {} balls, {} pickups, {} draw commands",
        seed,
        state.outcome,
        state.time_ticks,
        state.score,
        state.visible_blocks(),
        state.balls.len(),
        pickups,
        frame.commands.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
