/// Entry point and game loop.

mod config;
mod domain;
mod net;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use config::GameConfig;
use domain::color::Color;
use net::leaderboard::LeaderboardClient;
use sim::coordinator::Coordinator;
use sim::engine;
use sim::event::GameEvent;
use sim::session::{Phase, Session};
use sim::store;
use ui::input::InputState;
use ui::renderer::{HudView, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();
    init_logging();

    let profile = store::load_profile();
    let client = LeaderboardClient::new(&config.server.url, config.server.timeout_ms);
    if client.is_none() && !config.server.url.trim().is_empty() {
        log::warn!("invalid server url {:?}, running offline", config.server.url);
    }
    let mut coordinator = Coordinator::new(profile, client);
    coordinator.refresh();

    let mut session = Session::new(config.timing.clone(), config.points_per_level);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let reveal_ms = config.timing.reveal_ticks as u64 * config.timing.tick_rate_ms;
    let feedback_ms = config.timing.feedback_ticks as u64 * config.timing.tick_rate_ms;
    let sound = SoundEngine::new(reveal_ms, feedback_ms);

    let result = game_loop(&mut session, &mut coordinator, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Simon!");
    println!("Best Score: {}", coordinator.best());
}

/// Log to a file in the data dir. A terminal logger would write into
/// the raw-mode alternate screen and corrupt the frame.
fn init_logging() {
    let path = store::data_dir().join("simon.log");
    if let Ok(file) = std::fs::File::create(&path) {
        let _ = simplelog::WriteLogger::init(
            simplelog::LevelFilter::Info,
            simplelog::Config::default(),
            file,
        );
    }
}

fn game_loop(
    session: &mut Session,
    coordinator: &mut Coordinator,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut rng = SmallRng::from_os_rng();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }

        let mut events: Vec<GameEvent> = Vec::new();

        if coordinator.prompt_text().is_some() {
            handle_prompt(coordinator, &kb);
        } else if handle_meta(session, &kb, &mut rng, &mut events) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            events.extend(engine::tick(session, &mut rng));
            last_tick = Instant::now();
        }

        process_events(session, coordinator, sound, &events);
        coordinator.poll();

        let hud = HudView {
            best: coordinator.best(),
            nickname: coordinator.nickname(),
            board: coordinator.board(),
            prompt: coordinator.prompt_text(),
            online: coordinator.online(),
        };
        renderer.render(session, &hud)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_GREEN: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_RED: &[KeyCode] = &[KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_YELLOW: &[KeyCode] = &[KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_BLUE: &[KeyCode] = &[KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];

fn detect_pad(kb: &InputState) -> Option<Color> {
    if kb.any_pressed(KEYS_GREEN) {
        Some(Color::Green)
    } else if kb.any_pressed(KEYS_RED) {
        Some(Color::Red)
    } else if kb.any_pressed(KEYS_YELLOW) {
        Some(Color::Yellow)
    } else if kb.any_pressed(KEYS_BLUE) {
        Some(Color::Blue)
    } else {
        None
    }
}

/// Nickname entry intercepts the keyboard until committed or cancelled.
fn handle_prompt(coordinator: &mut Coordinator, kb: &InputState) {
    for ch in kb.typed_chars() {
        coordinator.prompt_push(ch);
    }
    if kb.was_pressed(KeyCode::Backspace) {
        coordinator.prompt_backspace();
    }
    if kb.any_pressed(&[KeyCode::Enter]) {
        coordinator.prompt_commit();
    } else if kb.was_pressed(KeyCode::Esc) {
        coordinator.prompt_cancel();
    }
}

/// Screen-level input. Returns true to quit.
fn handle_meta(
    session: &mut Session,
    kb: &InputState,
    rng: &mut SmallRng,
    events: &mut Vec<GameEvent>,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM);
    let esc = kb.was_pressed(KeyCode::Esc);

    match session.phase {
        // ── Title Screen ──
        Phase::Idle => {
            if confirm {
                events.extend(engine::start(session, rng));
            } else if esc {
                return true;
            }
        }

        // ── Game Over ──
        Phase::GameOver => {
            if confirm {
                events.extend(engine::start(session, rng));
            } else if esc {
                session.reset();
            }
        }

        // ── In a round: pad input (the engine drops it while replaying) ──
        _ => {
            if esc {
                session.reset();
            } else if let Some(color) = detect_pad(kb) {
                events.extend(engine::press(session, color));
            }
        }
    }

    false
}

fn process_events(
    session: &mut Session,
    coordinator: &mut Coordinator,
    sound: Option<&SoundEngine>,
    events: &[GameEvent],
) {
    for event in events {
        if let Some(sfx) = sound {
            match event {
                GameEvent::FlashStarted { color } => sfx.play_reveal(*color),
                GameEvent::Pressed { color } => sfx.play_feedback(*color),
                GameEvent::GameOver { .. } => sfx.play_buzz(),
                _ => {}
            }
        }

        if let GameEvent::GameOver { score } = event {
            if coordinator.on_game_over(*score) {
                session.set_message(&format!("New Record: {}!", score), 0);
            }
        }
    }
}
