//! Coin Dash entry point
//!
//! The browser build drives a round from `requestAnimationFrame`, draws it on
//! a 2D canvas and mirrors score/time into the DOM HUD. The native build runs
//! a headless round with a simple bot and prints the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use coin_dash::audio::AudioManager;
    use coin_dash::consts::*;
    use coin_dash::sim::{EntityKind, MoveInput, Round, RoundEvent};
    use coin_dash::{TileColor, Tuning};

    /// Game instance holding all state
    struct Game {
        round: Round,
        ctx: CanvasRenderingContext2d,
        audio: AudioManager,
        input: MoveInput,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        /// Run fixed physics steps, then fire timers for the same span
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                if let Err(err) = self.round.step(&self.input, SIM_DT) {
                    log::warn!("Physics step failed: {err}");
                }
                self.round.advance(Duration::from_secs_f32(SIM_DT));
                self.accumulator -= SIM_DT;
                substeps += 1;
            }

            for event in self.round.drain_events() {
                match event {
                    RoundEvent::Sound(effect) => self.audio.play(effect),
                    RoundEvent::ScoreChanged(score) => set_hud("hud-score", &score.to_string()),
                    RoundEvent::TimeChanged(time) => set_hud("hud-time", &time.to_string()),
                    RoundEvent::RoundEnded => self.show_end_screen(),
                    _ => {}
                }
            }
        }

        fn render(&self) {
            let field = self.round.field();
            let ctx = &self.ctx;

            let background = if self.round.player().room == 1 { "#2b4d2b" } else { "#4d3b2b" };
            ctx.set_fill_style_str(background);
            ctx.fill_rect(0.0, 0.0, field.x as f64, field.y as f64);

            for entity in self.round.entities().iter() {
                let color = match entity.kind {
                    EntityKind::BlueCoin => TileColor::Blue.css(),
                    EntityKind::GreenCoin => TileColor::Green.css(),
                    EntityKind::RedCoin => TileColor::Red.css(),
                    EntityKind::SpeedPowerUp => "#f5d90a".to_string(),
                };
                fill_box(ctx, &color, entity.pos, entity.size);
            }

            let player = self.round.player();
            let color = if self.round.state().boosting() { "#ffffff" } else { "#d0d0d0" };
            fill_box(ctx, color, player.pos, player.size);

            if let Some(summary) = self.round.summary() {
                self.render_mosaic(&summary.mosaic);
            }
        }

        fn render_mosaic(&self, mosaic: &coin_dash::Mosaic) {
            if mosaic.is_empty() {
                return;
            }
            let field = self.round.field();
            let extent = field.x.min(field.y) * 0.6;
            let cell = extent / mosaic.side() as f32;
            let origin = (field - Vec2::splat(extent)) * 0.5;

            for (y, row) in mosaic.rows().enumerate() {
                for (x, tile) in row.iter().enumerate() {
                    self.ctx.set_fill_style_str(&tile.css());
                    self.ctx.fill_rect(
                        (origin.x + x as f32 * cell) as f64,
                        (origin.y + y as f32 * cell) as f64,
                        cell as f64,
                        cell as f64,
                    );
                }
            }
        }

        fn show_end_screen(&self) {
            let Some(summary) = self.round.summary() else {
                return;
            };
            set_hud("end-message", &summary.call_to_action);
            if let Some(el) = document().and_then(|d| d.get_element_by_id("end-screen")) {
                let _ = el.set_attribute("class", "");
            }
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn set_hud(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn fill_box(ctx: &CanvasRenderingContext2d, color: &str, center: Vec2, size: Vec2) {
        let min = center - size * 0.5;
        ctx.set_fill_style_str(color);
        ctx.fill_rect(min.x as f64, min.y as f64, size.x as f64, size.y as f64);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Coin Dash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let seed = js_sys::Date::now() as u64;
        let field = Vec2::new(width as f32, height as f32);
        let round = match Round::with_seed(Tuning::default(), field, seed) {
            Ok(round) => round,
            Err(err) => {
                log::error!("Could not start round: {err}");
                return;
            }
        };
        log::info!("Round initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            round,
            ctx,
            audio: AudioManager::new(),
            input: MoveInput::default(),
            accumulator: 0.0,
            last_time: 0.0,
        }));

        setup_keyboard(game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowUp" => g.input.up = pressed,
                    "ArrowDown" => g.input.down = pressed,
                    "ArrowLeft" => g.input.left = pressed,
                    "ArrowRight" => g.input.right = pressed,
                    "m" | "M" if pressed && !event.repeat() => {
                        g.audio.toggle_muted();
                    }
                    _ => return,
                }
                event.prevent_default();
                g.audio.resume();
            });
            let _ = window
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
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

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use std::time::Duration;

    use anyhow::Context;

    use coin_dash::consts::*;
    use coin_dash::sim::{MoveInput, Round};
    use coin_dash::TileColor;
    use glam::Vec2;

    env_logger::init();
    log::info!("Coin Dash (native) starting...");
    log::info!("Native mode runs a headless bot round - run with `trunk serve` to play");

    // Optional tuning override as the first argument
    let tuning = load_tuning(std::env::args().nth(1).as_deref())?;

    let field = Vec2::new(FIELD_WIDTH, FIELD_HEIGHT);
    let seed = rand::random::<u64>();
    let mut round = Round::with_seed(tuning, field, seed).context("failed to start round")?;
    log::info!("Round initialized with seed: {}", seed);

    // Collections add time, so a lucky bot could play forever
    let max_time = Duration::from_secs(600);
    let step = Duration::from_secs_f32(SIM_DT);
    while round.is_running() && round.now() < max_time {
        // Head for the nearest collectible
        let pos = round.player().pos;
        let target = round
            .entities()
            .iter()
            .map(|e| e.pos)
            .min_by(|a, b| a.distance_squared(pos).total_cmp(&b.distance_squared(pos)));
        let input = match target {
            Some(t) => MoveInput {
                up: t.y < pos.y - 4.0,
                down: t.y > pos.y + 4.0,
                left: t.x < pos.x - 4.0,
                right: t.x > pos.x + 4.0,
            },
            None => MoveInput::default(),
        };

        round.step(&input, SIM_DT)?;
        round.advance(step);
        round.drain_events();
    }

    let Some(summary) = round.summary() else {
        log::warn!("Bot still alive after {:?}, stopping", max_time);
        return Ok(());
    };
    println!("Score: {}", summary.score);
    println!(
        "Coins: {} blue, {} green, {} red",
        summary.counts.blue, summary.counts.green, summary.counts.red
    );
    println!("{}", summary.call_to_action);
    for row in summary.mosaic.rows() {
        let line: String = row
            .iter()
            .map(|tile| match tile {
                TileColor::Blue => 'B',
                TileColor::Green => 'G',
                TileColor::Red => 'R',
            })
            .collect();
        println!("{line}");
    }

    Ok(())
}

/// Default tuning, or the JSON file at `path`
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: Option<&str>) -> anyhow::Result<coin_dash::Tuning> {
    use anyhow::Context;

    let Some(path) = path else {
        return Ok(coin_dash::Tuning::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {path}"))?;
    coin_dash::Tuning::from_json(&json).with_context(|| format!("invalid tuning in {path}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_load_tuning_defaults_without_path() {
        assert_eq!(load_tuning(None).unwrap(), coin_dash::Tuning::default());
    }

    #[test]
    fn test_load_tuning_reports_path() {
        let missing = std::env::temp_dir().join("coin-dash-missing-tuning.json");
        let path = missing.to_string_lossy().into_owned();
        let err = load_tuning(Some(&path)).unwrap_err();
        assert!(err.to_string().contains(&path));
    }

    #[test]
    fn test_load_tuning_rejects_invalid_file() {
        let file = std::env::temp_dir().join(format!("coin-dash-tuning-{}.json", std::process::id()));
        std::fs::write(&file, r#"{ "round_seconds": 0 }"#).unwrap();
        let path = file.to_string_lossy().into_owned();

        let err = load_tuning(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("invalid tuning"));
        assert!(err.downcast_ref::<coin_dash::TuningError>().is_some());
        std::fs::remove_file(&file).unwrap();
    }
}
