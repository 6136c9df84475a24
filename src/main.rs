//! Nitro Pulse entry point
//!
//! The browser build drives the session from `requestAnimationFrame` plus a one second
//! interval and renders through WebGPU. The native build is a headless demo run on the
//! tokio driver.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlElement, KeyboardEvent};

    use nitro_pulse::consts::COUNTDOWN_INTERVAL_MS;
    use nitro_pulse::hud::{self, HudReadout};
    use nitro_pulse::mission::request_mission;
    use nitro_pulse::renderer::{RenderError, RenderState, frame_for, request_adapter};
    use nitro_pulse::sim::{InputSampler, WorldModel};
    use nitro_pulse::{Screen, Session, Settings};

    /// Toggles the HUD debug line
    const DEBUG_TOGGLE_KEY: &str = "F3";

    /// Game instance holding all state
    struct Game {
        session: Session,
        world: WorldModel,
        input: InputSampler,
        settings: Settings,
        render_state: Option<RenderState>,
        /// Pending animation frame, if the loop is live
        raf_id: Option<i32>,
        /// Countdown interval, if running
        interval_id: Option<i32>,
        countdown_cb: Option<Closure<dyn FnMut()>>,
        last_screen: Option<Screen>,
    }

    impl Game {
        fn new(settings: Settings) -> Self {
            Self {
                session: Session::new(settings.tuning),
                world: WorldModel::default(),
                input: InputSampler::new(),
                settings,
                render_state: None,
                raf_id: None,
                interval_id: None,
                countdown_cb: None,
                last_screen: None,
            }
        }

        /// Draw the live run. Nothing is drawn once the loops are stopped.
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                let Some(commands) = frame_for(&self.session, &self.world, render_state.viewport())
                else {
                    return;
                };
                match render_state.draw(&commands) {
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

        /// Cancel both loops. Safe to call when nothing is running.
        fn stop_loops(&mut self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Some(id) = self.raf_id.take() {
                let _ = window.cancel_animation_frame(id);
            }
            if let Some(id) = self.interval_id.take() {
                window.clear_interval_with_handle(id);
            }
        }

        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let screen = self.session.screen();
            if self.last_screen != Some(screen) {
                for (id, visible) in [
                    ("menu", screen == Screen::Menu),
                    ("mission-select", screen == Screen::MissionSelect),
                    ("hud", screen == Screen::Playing),
                    ("game-over", screen == Screen::GameOver),
                ] {
                    if let Some(el) = document.get_element_by_id(id) {
                        let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                    }
                }
                if let Some(headline) = hud::game_over_headline(&self.session) {
                    if let Some(el) = document.get_element_by_id("game-over-reason") {
                        el.set_text_content(Some(headline));
                    }
                }
                self.last_screen = Some(screen);
            }

            if screen != Screen::Playing {
                return;
            }

            let readout = HudReadout::from_session(&self.session, self.settings.show_debug);
            set_text(&document, "hud-speed", &readout.speed_kmh.to_string());
            set_width(&document, "hud-speed-bar", readout.speed_bar);
            set_text(&document, "hud-integrity", &readout.integrity);
            set_width(&document, "hud-integrity-bar", readout.integrity_bar);
            if let Some(el) = document.get_element_by_id("hud-integrity-bar") {
                let class = if readout.critical { "bar critical" } else { "bar" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(card) = document.get_element_by_id("mission-card") {
                match readout.mission {
                    Some(ref m) => {
                        let _ = card.set_attribute("class", "");
                        set_text(&document, "mission-title", &m.title);
                        set_text(&document, "mission-objective", &m.objective);
                        set_text(&document, "mission-difficulty", m.difficulty);
                        set_text(&document, "hud-timer", &m.timer);
                    }
                    None => {
                        let _ = card.set_attribute("class", "hidden");
                    }
                }
            }

            set_text(&document, "hud-debug", readout.debug.as_deref().unwrap_or(""));
        }
    }

    fn set_text(document: &web_sys::Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_width(document: &web_sys::Document, id: &str, fraction: f32) {
        if let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el
                .style()
                .set_property("width", &format!("{:.1}%", fraction * 100.0));
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Nitro Pulse starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = canvas_pixel_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let game = Rc::new(RefCell::new(Game::new(Settings::load())));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        match init_renderer(&instance, surface, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Renderer unavailable: {e}"),
        }

        setup_countdown(game.clone());
        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_resize(canvas, game.clone());

        game.borrow_mut().update_hud();

        log::info!("Nitro Pulse running!");
    }

    async fn init_renderer(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<RenderState, RenderError> {
        let adapter = request_adapter(instance, Some(&surface)).await?;
        RenderState::new(surface, &adapter, width, height).await
    }

    fn canvas_pixel_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width, height)
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if pressed && key == DEBUG_TOGGLE_KEY && !event.repeat() {
                    let mut g = game.borrow_mut();
                    let on = g.settings.toggle_debug();
                    g.settings.save();
                    log::info!("Debug overlay {}", if on { "on" } else { "off" });
                    g.update_hud();
                    return;
                }
                game.borrow().input.set_key_name(&key, pressed);
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keys released while unfocused never deliver keyup
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow().input.release_all();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let (width, height) = canvas_pixel_size(&window, &canvas);
            canvas.set_width(width);
            canvas.set_height(height);
            let mut g = game.borrow_mut();
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize(width, height);
            }
            if g.session.is_playing() {
                g.render();
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Build the countdown callback once; `start_loops` re-arms it per run
    fn setup_countdown(game: Rc<RefCell<Game>>) {
        let weak = Rc::downgrade(&game);
        let closure = Closure::<dyn FnMut()>::new(move || {
            let Some(game) = weak.upgrade() else {
                return;
            };
            let mut g = game.borrow_mut();
            if g.session.countdown_second() {
                g.stop_loops();
            }
            g.update_hud();
        });
        game.borrow_mut().countdown_cb = Some(closure);
    }

    fn start_loops(game: &Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        {
            let mut g = game.borrow_mut();
            g.stop_loops();
            g.input.release_all();
            if g.session.has_countdown() {
                let handle = g.countdown_cb.as_ref().and_then(|cb| {
                    window
                        .set_interval_with_callback_and_timeout_and_arguments_0(
                            cb.as_ref().unchecked_ref(),
                            COUNTDOWN_INTERVAL_MS as i32,
                        )
                        .ok()
                });
                g.interval_id = handle;
            }
            g.update_hud();
        }
        request_animation_frame(game.clone());
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let game_for_frame = game.clone();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game_for_frame);
        });
        let id = window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok();
        closure.forget();
        game.borrow_mut().raf_id = id;
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        let keep_running = {
            let mut g = game.borrow_mut();
            g.raf_id = None;

            let g = &mut *g;
            let input = g.input.snapshot();
            g.session.advance_frame(&input, &g.world);
            g.render();
            g.update_hud();

            if !g.session.is_playing() {
                g.stop_loops();
            }
            g.session.is_playing()
        };

        if keep_running {
            request_animation_frame(game);
        }
    }

    fn on_click(id: &str, game: Rc<RefCell<Game>>, handler: fn(&Rc<RefCell<Game>>)) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            handler(&game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        on_click("start-mission-btn", game.clone(), |game| {
            let stats = {
                let mut g = game.borrow_mut();
                if !g.session.begin_mission_request() {
                    return;
                }
                g.update_hud();
                *g.session.stats()
            };
            let source = game.borrow().settings.mission_source();
            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let mission = request_mission(&*source, &stats).await;
                {
                    let mut g = game.borrow_mut();
                    // Aborted while the request was in flight
                    if g.session.screen() != Screen::MissionSelect {
                        return;
                    }
                    g.session.start_mission(mission);
                }
                start_loops(&game);
            });
        });

        on_click("free-roam-btn", game.clone(), |game| {
            {
                let mut g = game.borrow_mut();
                if g.session.screen() != Screen::Menu {
                    return;
                }
                g.session.start_free_roam();
            }
            start_loops(game);
        });

        on_click("abort-btn", game.clone(), |game| {
            let mut g = game.borrow_mut();
            g.stop_loops();
            g.session.abort();
            g.update_hud();
        });

        on_click("menu-btn", game, |game| {
            let mut g = game.borrow_mut();
            g.stop_loops();
            if g.session.return_to_menu() {
                g.update_hud();
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    use std::sync::Arc;
    use std::time::Duration;

    use nitro_pulse::hud::HudReadout;
    use nitro_pulse::mission::request_mission;
    use nitro_pulse::runtime::{RunConfig, spawn_run};
    use nitro_pulse::sim::{InputSampler, KeyCode, WorldModel};
    use nitro_pulse::{Session, Settings};

    env_logger::init();
    log::info!("Nitro Pulse (native) starting...");
    log::info!("Native mode is a headless demo - run with `trunk serve` for the web version");

    let settings = Settings::load();
    let mut session = Session::new(settings.tuning);
    session.begin_mission_request();
    let source = settings.mission_source();
    let mission = request_mission(&*source, session.stats()).await;
    session.start_mission(mission);

    let world = Arc::new(WorldModel::default());
    let input = Arc::new(InputSampler::new());
    let handle = spawn_run(session, world, Arc::clone(&input), RunConfig::default());

    // Autopilot: full throttle, tapping right every couple of seconds
    input.set_key(KeyCode::W, true);
    let mut snapshots = handle.subscribe();
    let mut last_logged = 0;
    while snapshots.changed().await.is_ok() {
        let snapshot = *snapshots.borrow_and_update();
        input.set_key(KeyCode::D, snapshot.frame % 150 < 40);
        if let Some(crash) = snapshot.crash {
            log::info!("Crash! -{:.1} integrity", crash.damage);
        }
        if snapshot.frame >= last_logged + 60 {
            last_logged = snapshot.frame;
            log::info!(
                "t-{}s pos ({:.0}, {:.0}) speed {:.2} integrity {:.0}",
                snapshot.time_left,
                snapshot.vehicle.pos.x,
                snapshot.vehicle.pos.y,
                snapshot.vehicle.speed,
                snapshot.vehicle.health
            );
        }
    }

    match tokio::time::timeout(Duration::from_secs(1), handle.finished()).await {
        Ok(Ok(session)) => {
            let readout = HudReadout::from_session(&session, true);
            log::info!(
                "Run over: {} | {} km/h | integrity {} | {}",
                session.end_reason().map(|r| r.as_str()).unwrap_or("aborted"),
                readout.speed_kmh,
                readout.integrity,
                readout.debug.unwrap_or_default()
            );
        }
        Ok(Err(e)) => log::error!("Run driver failed: {e}"),
        Err(_) => log::error!("Run driver did not stop"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
