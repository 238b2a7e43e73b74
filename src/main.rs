//! Meltdown entry point
//!
//! In the browser this wires the canvas, input listeners and collaborators to
//! a `FrameDriver` and runs it from `requestAnimationFrame`. Natively it is a
//! small CLI that plays headless runs with the autopilot against a JSON-file
//! leaderboard.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use meltdown::audio::WebAudio;
    use meltdown::consts::{ARENA_HEIGHT, ARENA_WIDTH};
    use meltdown::platform::web::{
        RemoteLeaderboard, facebook_share_url, fetch_server_config, page_base_url, page_query,
        twitter_share_url,
    };
    use meltdown::renderer::canvas2d::Canvas2d;
    use meltdown::sim::Game;
    use meltdown::sim::Input;
    use meltdown::sim::screen::{MESSAGE_FRAMES, challenge_url, parse_challenge};
    use meltdown::{FrameDriver, HostAction, Settings, Tuning};

    /// Everything the browser callbacks share
    struct Host {
        driver: FrameDriver,
        canvas: Canvas2d,
        element: HtmlCanvasElement,
        /// Backing store size last applied to the canvas element
        physical: (u32, u32),
    }

    impl Host {
        fn input(&mut self, input: Input) -> Option<HostAction> {
            // Browsers only let audio start from a user gesture
            self.driver.audio_mut().resume();
            self.driver.handle(input)
        }

        /// Map a client-space point to arena coordinates
        fn to_arena(&self, client_x: f32, client_y: f32) -> Vec2 {
            let rect = self.element.get_bounding_client_rect();
            let w = (rect.width() as f32).max(1.0);
            let h = (rect.height() as f32).max(1.0);
            Vec2::new(
                (client_x - rect.left() as f32) / w * ARENA_WIDTH,
                (client_y - rect.top() as f32) / h * ARENA_HEIGHT,
            )
        }

        /// Keep the backing store matched to the displayed size
        fn sync_size(&mut self) {
            let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            let width = (self.element.client_width() as f64 * dpr).max(1.0) as u32;
            let height = (self.element.client_height() as f64 * dpr).max(1.0) as u32;
            if (width, height) != self.physical {
                self.element.set_width(width);
                self.element.set_height(height);
                self.physical = (width, height);
                log::debug!("Canvas resized to {width}x{height}");
            }
            self.canvas.fit(
                Vec2::new(ARENA_WIDTH, ARENA_HEIGHT),
                Vec2::new(width as f32, height as f32),
            );
        }

        fn frame(&mut self) {
            self.sync_size();
            self.driver.frame(&mut self.canvas);
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Meltdown starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let element: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let canvas = Canvas2d::new(&element).ok_or("canvas has no 2d context")?;

        let mut settings = Settings::load();
        // Write back so the stored document picks up newly added fields
        settings.save();
        if let Some(config) = fetch_server_config().await {
            settings.leaderboard.merge(config);
        }
        log::info!(
            "Leaderboard: {} entries, refresh every {} ms, store {}",
            settings.leaderboard.max_entries,
            settings.leaderboard.refresh_interval_ms,
            if settings.leaderboard.has_store() { "configured" } else { "missing" }
        );

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(seed, Tuning::default()).with_board(settings.leaderboard.clone());
        game.challenge = parse_challenge(&page_query());
        if let Some(score) = game.challenge {
            log::info!("Challenge target: {score}");
        }
        if window.navigator().max_touch_points() > 0 {
            game.enable_touch(settings.touch_auto_fire);
            log::info!("Touch controls enabled (auto-fire {})", settings.touch_auto_fire);
        }
        log::info!("Game initialized with seed: {}", seed);

        let leaderboard = RemoteLeaderboard::new(&settings.leaderboard);
        let audio = WebAudio::new(
            settings.master_volume,
            settings.sfx_volume,
            settings.music_volume,
            settings.muted,
        );
        let mut driver = FrameDriver::new(game, Box::new(leaderboard), Box::new(audio));
        driver.options.screen_shake = settings.effective_screen_shake();

        let host = Rc::new(RefCell::new(Host {
            driver,
            canvas,
            element: element.clone(),
            physical: (0, 0),
        }));

        setup_input_handlers(&element, host.clone())?;
        request_animation_frame(host);

        log::info!("Meltdown running!");
        Ok(())
    }

    /// Feed an input and carry out whatever the game asks of the host
    fn dispatch(host: &Rc<RefCell<Host>>, input: Input) {
        let action = host.borrow_mut().input(input);
        if let Some(action) = action {
            perform(host, action);
        }
    }

    fn perform(host: &Rc<RefCell<Host>>, action: HostAction) {
        let Some(window) = web_sys::window() else { return };
        let page = page_base_url().unwrap_or_default();
        match action {
            HostAction::ShareTwitter { score } => {
                let _ = window.open_with_url_and_target(&twitter_share_url(&page, score), "_blank");
            }
            HostAction::ShareFacebook => {
                let _ = window.open_with_url_and_target(&facebook_share_url(&page), "_blank");
            }
            HostAction::CopyChallenge { score } => {
                let link = challenge_url(&page, score);
                let promise = window.navigator().clipboard().write_text(&link);
                let host = host.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match wasm_bindgen_futures::JsFuture::from(promise).await {
                        Ok(_) => host
                            .borrow_mut()
                            .driver
                            .game_mut()
                            .show_message("Challenge link copied to clipboard!", MESSAGE_FRAMES),
                        Err(e) => {
                            log::error!("Could not copy challenge link: {:?}", e);
                            if let Some(window) = web_sys::window() {
                                let _ = window.prompt_with_message_and_default(
                                    "Copy this link to challenge a friend:",
                                    &link,
                                );
                            }
                        }
                    }
                });
            }
            HostAction::Reload => {
                log::info!("Reloading after fault");
                let _ = window.location().reload();
            }
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, host: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if matches!(key.as_str(), "ArrowLeft" | "ArrowRight" | " " | "Tab" | "Backspace") {
                    event.prevent_default();
                }
                if let Some(input) = Input::from_key(&key) {
                    dispatch(&host, input);
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(input) = Input::from_key_up(&event.key()) {
                    dispatch(&host, input);
                }
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse press
        {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = host
                    .borrow()
                    .to_arena(event.client_x() as f32, event.client_y() as f32);
                dispatch(&host, Input::PointerDown(pos));
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch: one input per changed touch point
        for (name, kind) in [
            ("touchstart", TouchKind::Start),
            ("touchmove", TouchKind::Move),
            ("touchend", TouchKind::End),
            ("touchcancel", TouchKind::End),
        ] {
            let host = host.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let touches = event.changed_touches();
                for i in 0..touches.length() {
                    let Some(touch) = touches.get(i) else { continue };
                    let id = touch.identifier() as u32;
                    let pos = host
                        .borrow()
                        .to_arena(touch.client_x() as f32, touch.client_y() as f32);
                    let input = match kind {
                        TouchKind::Start => Input::TouchStart { id, pos },
                        TouchKind::Move => Input::TouchMove { id, pos },
                        TouchKind::End => Input::TouchEnd { id },
                    };
                    dispatch(&host, input);
                }
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    #[derive(Clone, Copy)]
    enum TouchKind {
        Start,
        Move,
        End,
    }

    fn request_animation_frame(host: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            game_loop(host);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(host: Rc<RefCell<Host>>) {
        host.borrow_mut().frame();
        request_animation_frame(host);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Failed to start: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::path::PathBuf;

    use anyhow::{Context, Result, anyhow};
    use clap::{Parser, Subcommand};

    use meltdown::audio::SilentAudio;
    use meltdown::autoplay::Autopilot;
    use meltdown::leaderboard::{QueuedLeaderboard, ScoreStore};
    use meltdown::platform::native::FileScoreStore;
    use meltdown::renderer::NullCanvas;
    use meltdown::secs_to_frames;
    use meltdown::sim::{FormField, Game, Input, Screen};
    use meltdown::{FrameDriver, Settings, Tuning};

    #[derive(Parser, Debug)]
    #[command(name = "meltdown")]
    #[command(about = "Headless Meltdown runner and leaderboard viewer")]
    pub struct Cli {
        /// JSON file backing the leaderboard
        #[arg(long, default_value = "meltdown-scores.json", global = true)]
        scores_file: PathBuf,
        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand, Debug)]
    enum Commands {
        /// Autoplay one run to game over and print a summary
        Play {
            #[arg(long, default_value_t = 1)]
            seed: u64,
            /// Give up after this many frames (60 per second)
            #[arg(long, default_value_t = 36_000)]
            max_frames: u64,
            /// Frames between autopilot shots
            #[arg(long, default_value_t = 12)]
            fire_interval: u64,
            /// Balance overrides as JSON
            #[arg(long)]
            tuning: Option<PathBuf>,
            /// Score to beat
            #[arg(long)]
            challenge: Option<u64>,
            /// Submit a qualifying score under this name
            #[arg(long)]
            name: Option<String>,
            #[arg(long, default_value = "autopilot@example.com")]
            email: String,
        },
        /// Print the stored top scores
        Leaderboard {
            /// Rows to show (defaults to LEADERBOARD_MAX_ENTRIES or 10)
            #[arg(long)]
            limit: Option<usize>,
        },
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        let settings = Settings::load();
        match cli.command {
            Commands::Play {
                seed,
                max_frames,
                fire_interval,
                tuning,
                challenge,
                name,
                email,
            } => {
                let tuning = match tuning {
                    Some(path) => {
                        let json = fs::read_to_string(&path)
                            .with_context(|| format!("reading {}", path.display()))?;
                        Tuning::from_json(&json)
                            .with_context(|| format!("parsing {}", path.display()))?
                    }
                    None => Tuning::default(),
                };
                let opts = PlayOptions {
                    seed,
                    max_frames,
                    fire_interval,
                    challenge,
                    name,
                    email,
                };
                play(&settings, tuning, cli.scores_file, opts)
            }
            Commands::Leaderboard { limit } => {
                let limit = limit.unwrap_or(settings.leaderboard.max_entries);
                show_leaderboard(&FileScoreStore::new(cli.scores_file), limit)
            }
        }
    }

    struct PlayOptions {
        seed: u64,
        max_frames: u64,
        fire_interval: u64,
        challenge: Option<u64>,
        name: Option<String>,
        email: String,
    }

    fn play(settings: &Settings, tuning: Tuning, scores_file: PathBuf, opts: PlayOptions) -> Result<()> {
        if opts.max_frames == 0 {
            return Err(anyhow!("max_frames must be > 0"));
        }
        let store = FileScoreStore::new(&scores_file);
        let delay = secs_to_frames(tuning.game_over_delay);
        let mut game = Game::new(opts.seed, tuning).with_board(settings.leaderboard.clone());
        game.challenge = opts.challenge;

        let mut driver = FrameDriver::new(
            game,
            Box::new(QueuedLeaderboard::new(store.clone())),
            Box::new(SilentAudio),
        );
        let mut pilot = Autopilot::new(opts.fire_interval);
        log::info!("Autoplaying seed {} (max {} frames)", opts.seed, opts.max_frames);

        while driver.game().frame < opts.max_frames {
            for input in pilot.inputs(driver.game()) {
                driver.handle(input);
            }
            // Paint into the void so draw faults surface headless too
            driver.frame(&mut NullCanvas);
            if let Some(fault) = driver.fault() {
                return Err(anyhow!("simulation fault: {fault}"));
            }
            if driver.game().screen == Screen::GameOver {
                break;
            }
        }

        let game = driver.game();
        let finished = game.screen == Screen::GameOver;
        println!("=== RUN SUMMARY ===");
        println!("  Seed:       {}", opts.seed);
        println!("  Score:      {}", game.score);
        println!("  Frames:     {}", game.frame);
        println!("  Survived:   {:.1}s", game.elapsed);
        println!("  Difficulty: {:.2}", game.difficulty);
        println!("  Multiplier: x{:.2}", game.multiplier);
        if let Some(target) = game.challenge {
            let verdict = if game.challenge_beaten { "beaten" } else { "not beaten" };
            println!("  Challenge:  {target} ({verdict})");
        }
        if !finished {
            println!("  Result:     still alive after {} frames", opts.max_frames);
            return Ok(());
        }

        // Let the qualification reply land and the form open
        for _ in 0..=delay + 1 {
            driver.frame(&mut NullCanvas);
            if driver.game().screen == Screen::SubmitScore {
                break;
            }
        }
        let qualified = driver.game().qualified;
        println!("  Qualified:  {qualified}");

        match (qualified, opts.name) {
            (true, Some(name)) if driver.game().screen == Screen::SubmitScore => {
                submit(&mut driver, &name, &opts.email)?;
                println!("  Submitted as {name}");
                show_leaderboard(&store, settings.leaderboard.max_entries)?;
            }
            (true, _) => println!("  Pass --name to submit this score"),
            _ => {}
        }
        Ok(())
    }

    /// Fill the submit form through the same inputs a player would use
    fn submit(driver: &mut FrameDriver, name: &str, email: &str) -> Result<()> {
        for c in name.chars() {
            driver.handle(Input::Char(c));
        }
        if driver.game().form.active == FormField::Name {
            driver.handle(Input::ToggleField);
        }
        for c in email.chars() {
            driver.handle(Input::Char(c));
        }
        driver.handle(Input::Confirm);
        if let Some(error) = &driver.game().form.error {
            return Err(anyhow!("submission rejected: {error}"));
        }
        // Reply arrives on the next frame
        driver.step();
        match (&driver.game().form.error, driver.game().screen) {
            (_, Screen::Leaderboard) => Ok(()),
            (Some(error), _) => Err(anyhow!("submission failed: {error}")),
            (None, screen) => Err(anyhow!("submission left the game on {screen:?}")),
        }
    }

    fn show_leaderboard(store: &FileScoreStore, limit: usize) -> Result<()> {
        let top = store
            .fetch_top(limit)
            .with_context(|| format!("reading {}", store.path().display()))?;
        println!();
        println!("=== LEADERBOARD ({}) ===", store.path().display());
        if top.is_empty() {
            println!("  No scores yet");
        }
        for (rank, entry) in top.iter().enumerate() {
            println!("  {:>2}. {:<20} {:>8}", rank + 1, entry.name, entry.score);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    cli::run()
}
