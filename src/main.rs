//! Pixel Arcade entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use pixel_arcade::audio::AudioManager;
    use pixel_arcade::consts::{SURFACE_HEIGHT, SURFACE_WIDTH};
    use pixel_arcade::games;
    use pixel_arcade::platform;
    use pixel_arcade::renderer::{CanvasSurface, Color, Surface, TextAlign};
    use pixel_arcade::sim::GameContext;
    use pixel_arcade::{HighScores, Host, Settings};

    /// Keys the page must not scroll on
    const CAPTURED_KEYS: &[&str] = &["Space", "ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown"];

    /// Everything the browser callbacks share
    struct App {
        host: Host,
        surface: CanvasSurface,
        audio: AudioManager,
        settings: Settings,
        last_time: Option<f64>,
    }

    impl App {
        /// First user gesture unlocks audio; later calls just resume it
        fn gesture(&mut self) {
            self.audio.unlock();
        }

        fn toggle_mute(&mut self) {
            self.settings.toggle_mute();
            self.audio.set_volume(self.settings.volume);
            log::info!("Volume: {}", self.settings.volume);
            if let Err(e) = self.settings.save() {
                log::warn!("Could not save settings: {}", e);
            }
        }

        fn frame(&mut self, time: f64) {
            let dt = self.last_time.map_or(0.0, |last| (time - last) as f32);
            self.last_time = Some(time);

            self.host.frame(dt, &mut self.surface);

            let now = platform::now_ms();
            for cue in self.host.take_cues() {
                self.audio.play(cue, now);
            }
        }
    }

    fn draw_not_found(surface: &mut CanvasSurface, id: &str) {
        let (w, h) = (surface.width(), surface.height());
        surface.fill_rect(0.0, 0.0, w, h, Color::BLACK);
        surface.fill_text("404", w / 2.0, h / 2.0 - 30.0, 32.0, TextAlign::Center, Color::RED);
        surface.fill_text("GAME NOT FOUND", w / 2.0, h / 2.0 + 10.0, 14.0, TextAlign::Center, Color::WHITE);
        surface.fill_text(id, w / 2.0, h / 2.0 + 40.0, 8.0, TextAlign::Center, Color::WHITE);
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Pixel Arcade starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        let mut surface = CanvasSurface::new(&canvas, SURFACE_WIDTH as u32, SURFACE_HEIGHT as u32)
            .ok_or_else(|| JsValue::from_str("no 2d context"))?;

        let query = window.location().search().unwrap_or_default();
        let game_id = games::requested_id(&query)
            .unwrap_or(games::DEFAULT_GAME)
            .to_string();

        let seed = platform::time_seed();
        let ctx = GameContext::new(SURFACE_WIDTH, SURFACE_HEIGHT, seed);
        let host = match Host::new(&game_id, ctx, HighScores::load()) {
            Ok(host) => host,
            Err(e) => {
                log::error!("{}", e);
                draw_not_found(&mut surface, &game_id);
                return Ok(());
            }
        };
        log::info!("Loaded {} with seed {}", host.meta().name, seed);

        let mut settings = Settings::load();
        if let Some(name) = games::query_param(&query, "player") {
            if settings.set_username(name) {
                if let Err(e) = settings.save() {
                    log::warn!("Could not save settings: {}", e);
                }
            }
        }
        if let Some(name) = &settings.username {
            log::info!("Player: {}", name);
        }
        let audio = AudioManager::new(settings.volume);

        let app = Rc::new(RefCell::new(App {
            host,
            surface,
            audio,
            settings,
            last_time: None,
        }));

        setup_input_handlers(&canvas, app.clone())?;
        setup_focus_handlers(app.clone())?;

        request_animation_frame(app);

        log::info!("Pixel Arcade running!");
        Ok(())
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if CAPTURED_KEYS.contains(&code.as_str()) {
                    event.prevent_default();
                }
                if event.repeat() {
                    return;
                }
                let mut a = app.borrow_mut();
                a.gesture();
                if code == "KeyM" {
                    a.toggle_mute();
                    return;
                }
                a.host.key_down_code(&code);
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().host.key_up_code(&event.code());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.gesture();
                a.host.click();
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                a.gesture();
                a.host.click();
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    /// Drop held keys when the page loses focus so nothing stays pressed
    fn setup_focus_handlers(app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        {
            let app = app.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut a = app.borrow_mut();
                    a.host.release_all();
                    // Resume from the next visible frame without a catch-up step
                    a.last_time = None;
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                app.borrow_mut().host.release_all();
                log::debug!("Window blur, keys released");
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_app::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pixel Arcade (native) starting...");
    log::info!("Native mode runs headless sessions - build for wasm32 to play");

    // Each argument is `game-id` or `game-id=path/to/tuning.json`
    let requested: Vec<String> = std::env::args().skip(1).collect();
    let runs: Vec<(&str, Option<&str>)> = if requested.is_empty() {
        pixel_arcade::games::list().map(|m| (m.id, None)).collect()
    } else {
        requested
            .iter()
            .map(|arg| match arg.split_once('=') {
                Some((id, path)) => (id, Some(path)),
                None => (arg.as_str(), None),
            })
            .collect()
    };

    let mut failed = false;
    for (id, tuning) in runs {
        match headless::run(id, tuning, 42) {
            Ok(report) => println!("{}", report),
            Err(e) => {
                eprintln!("{}: {}", id, e);
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted play against the in-memory surface
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use pixel_arcade::consts::{FRAME_MS, SURFACE_HEIGHT, SURFACE_WIDTH};
    use pixel_arcade::renderer::DrawList;
    use pixel_arcade::error::Result;
    use pixel_arcade::sim::{GameContext, Key};
    use pixel_arcade::{ArcadeError, HighScores, Host, HostPhase};

    /// One minute at 60 fps
    const MAX_FRAMES: u32 = 3600;

    pub fn run(id: &str, tuning: Option<&str>, seed: u64) -> Result<String> {
        let ctx = GameContext::new(SURFACE_WIDTH, SURFACE_HEIGHT, seed);
        let mut host = match tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .map_err(|e| ArcadeError::Storage(format!("{}: {}", path, e)))?;
                Host::with_tuning(id, ctx, HighScores::new(), &json)?
            }
            None => Host::new(id, ctx, HighScores::new())?,
        };
        let mut surface = DrawList::new(SURFACE_WIDTH, SURFACE_HEIGHT);
        let mut cues = 0usize;

        host.key_down(Key::Enter);
        host.key_up(Key::Enter);

        let mut frames = 0;
        while frames < MAX_FRAMES && host.phase() == HostPhase::Playing {
            script(&mut host, frames);
            surface.clear();
            host.frame(FRAME_MS, &mut surface);
            cues += host.take_cues().len();
            frames += 1;
        }
        host.shutdown();

        Ok(format!(
            "{:<16} frames={:<5} score={:<6} phase={:?} cues={} draw_cmds={}",
            id,
            frames,
            host.score(),
            host.phase(),
            cues,
            surface.cmds.len()
        ))
    }

    /// Flap on a fixed beat; sweep and fire continuously
    fn script(host: &mut Host, frame: u32) {
        if frame % 22 == 0 {
            host.click();
        }
        if frame == 0 {
            host.key_down(Key::Space);
        }
        let (go, stop) = if (frame / 90) % 2 == 0 {
            (Key::ArrowRight, Key::ArrowLeft)
        } else {
            (Key::ArrowLeft, Key::ArrowRight)
        };
        if frame % 90 == 0 {
            host.key_up(stop);
            host.key_down(go);
        }
    }
}
