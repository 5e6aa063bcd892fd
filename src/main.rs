mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, stdout, BufWriter, Write};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use boat_blitz::catalog::Catalog;
use boat_blitz::compute::{init_run, key_down, key_up, pause, tick};
use boat_blitz::config::{self, RunConfig};
use boat_blitz::entities::{GameState, GameStatus};
use boat_blitz::hud::HudView;
use boat_blitz::input::{InputState, Key, PAUSE_KEY};
use boat_blitz::taunt::{OfflineTaunts, TauntService};

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// Frames a key stays held after its last press or repeat event. Terminals
/// without release events only tell us about repeats, which arrive faster
/// than every 130 ms.
const HOLD_WINDOW: u64 = 8;

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to `$HOME/.boat_blitz.log`; the terminal itself is in raw mode.
/// If the file can't be opened the game runs without logging.
fn init_logging() {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let path = std::path::PathBuf::from(home).join(".boat_blitz.log");
    let Ok(file) = File::create(&path) else {
        return;
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("boat_blitz=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

// ── Key mapping ───────────────────────────────────────────────────────────────

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Key::W,
            'a' => Key::A,
            's' => Key::S,
            'd' => Key::D,
            ' ' => Key::Space,
            'q' => Key::Q,
            'e' => Key::E,
            '/' => Key::Slash,
            '.' => Key::Period,
            _ => return None,
        },
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Esc => Key::Escape,
        _ => return None,
    };
    Some(key)
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start { level: u32, multiplayer: bool },
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    catalog: &Catalog,
    mut level: u32,
    notice: Option<&str>,
) -> io::Result<MenuResult> {
    loop {
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        let (width, height) = terminal::size()?;
        let cx = width / 2;
        let cy = height / 2;

        let title = "≈≈  BOAT  BLITZ  ≈≈";
        out.queue(cursor::MoveTo(
            cx.saturating_sub(title.chars().count() as u16 / 2),
            cy.saturating_sub(6),
        ))?;
        out.queue(style::SetForegroundColor(Color::Cyan))?;
        out.queue(Print(title))?;

        if let Some(notice) = notice {
            out.queue(cursor::MoveTo(
                cx.saturating_sub(notice.chars().count() as u16 / 2),
                cy.saturating_sub(5),
            ))?;
            out.queue(style::SetForegroundColor(Color::Red))?;
            out.queue(Print(notice))?;
        }

        let boss = catalog
            .level(level)
            .map(|l| l.boss.kind.name())
            .unwrap_or("?");
        out.queue(cursor::MoveTo(cx.saturating_sub(14), cy.saturating_sub(3)))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(format!(
            "Start level: {:>2}/{}  ({})",
            level,
            catalog.final_level(),
            boss
        )))?;

        let options: &[(&str, &str, Color)] = &[
            ("1", "Single player", Color::Green),
            ("2", "Two players", Color::Yellow),
            ("+/-", "Change level", Color::DarkGrey),
            ("Q", "Quit", Color::Red),
        ];
        for (i, (key, label, color)) in options.iter().enumerate() {
            let row = cy.saturating_sub(1) + i as u16;
            out.queue(cursor::MoveTo(cx.saturating_sub(14), row))?;
            out.queue(style::SetForegroundColor(Color::DarkGrey))?;
            out.queue(Print(format!("[{}] ", key)))?;
            out.queue(style::SetForegroundColor(*color))?;
            out.queue(Print(*label))?;
        }

        out.queue(style::ResetColor)?;
        out.flush()?;

        let code = match rx.recv() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => code,
            Ok(_) => continue,
            Err(_) => return Ok(MenuResult::Quit),
        };
        match code {
            KeyCode::Char('1') => return Ok(MenuResult::Start { level, multiplayer: false }),
            KeyCode::Char('2') => return Ok(MenuResult::Start { level, multiplayer: true }),
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                level = (level + 1).min(catalog.final_level());
            }
            KeyCode::Char('-') | KeyCode::Left => level = level.saturating_sub(1).max(1),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(MenuResult::Quit);
            }
            _ => {}
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum LoopExit {
    Quit,
    Menu,
}

/// Input model: every press/repeat refreshes the frame a key was last seen
/// on, and keys older than `HOLD_WINDOW` are released. Terminals with
/// keyboard enhancement also send real release events. Only the first press
/// of a held key goes to `key_down`, so one-shot actions don't auto-repeat.
///
/// The game clock advances by real elapsed time only while unpaused.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    settings_show_controls: bool,
    taunts: &TauntService,
    rx: &mpsc::Receiver<Event>,
) -> io::Result<LoopExit> {
    let mut rng = thread_rng();
    let mut input = InputState::new();
    let mut last_seen: HashMap<Key, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut clock: u64 = 0;
    let mut paused = false;
    let mut last_instant = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        if !paused {
            clock += frame_start.duration_since(last_instant).as_millis() as u64;
        }
        last_instant = frame_start;

        // ── Input ─────────────────────────────────────────────────────────────
        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            if kind == KeyEventKind::Press
                && code == KeyCode::Char('c')
                && modifiers.contains(KeyModifiers::CONTROL)
            {
                return Ok(LoopExit::Quit);
            }

            if state.status != GameStatus::Playing {
                match code {
                    KeyCode::Char('r') | KeyCode::Char('R') => return Ok(LoopExit::Menu),
                    KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(LoopExit::Quit),
                    _ => continue,
                }
            }
            if paused {
                match (kind, code) {
                    (KeyEventKind::Press, KeyCode::Esc) => {
                        paused = false;
                        info!("Resumed");
                    }
                    (KeyEventKind::Press, KeyCode::Char('m') | KeyCode::Char('M')) => {
                        return Ok(LoopExit::Menu);
                    }
                    _ => {}
                }
                continue;
            }

            let Some(key) = map_key(code) else {
                continue;
            };
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    if key == PAUSE_KEY && kind == KeyEventKind::Press {
                        paused = true;
                        last_seen.clear();
                        pause(state, &mut input);
                        continue;
                    }
                    let fresh = last_seen
                        .get(&key)
                        .map_or(true, |&seen| frame.saturating_sub(seen) > HOLD_WINDOW);
                    last_seen.insert(key, frame);
                    if fresh && kind == KeyEventKind::Press {
                        key_down(state, &mut input, key, clock);
                    }
                }
                KeyEventKind::Release => {
                    last_seen.remove(&key);
                    key_up(&mut input, key);
                }
            }
        }

        // Release keys whose repeats have stopped arriving
        last_seen.retain(|&key, &mut seen| {
            let held = frame.saturating_sub(seen) <= HOLD_WINDOW;
            if !held {
                key_up(&mut input, key);
            }
            held
        });

        if !paused && state.status == GameStatus::Playing {
            if let Err(e) = tick(state, &mut input, clock, &mut rng) {
                error!(error = %e, "Simulation stopped");
                return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string()));
            }
            if state.level_advanced() {
                last_seen.clear();
            }
            taunts.update(state, clock);
        }

        let hud = HudView::from_state(state, clock);
        display::render(out, state, &hud, settings_show_controls, paused)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> io::Result<()> {
    init_logging();

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for release events; not every terminal supports it.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread; the loop only polls the channel.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });

    let result = run(&mut out, &rx);

    // Restore the terminal even when the game failed.
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(out: &mut W, rx: &mpsc::Receiver<Event>) -> io::Result<()> {
    let catalog = Catalog::embedded()
        .map(Arc::new)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    let path = config::default_path();
    let (base, mut notice) = match RunConfig::load_from(&path) {
        Ok(config) => (config, None),
        Err(e) => {
            warn!(error = %e, "Falling back to default run config");
            (RunConfig::default(), Some(e.to_string()))
        }
    };
    let taunts = TauntService::spawn(Box::new(OfflineTaunts::new()));
    let mut level = base.start_level.max(1);

    loop {
        match show_menu(out, rx, &catalog, level, notice.as_deref())? {
            MenuResult::Quit => break,
            MenuResult::Start { level: chosen, multiplayer } => {
                level = chosen;
                let config = RunConfig {
                    start_level: chosen,
                    multiplayer,
                    ..base.clone()
                };
                let mut state = match init_run(Arc::clone(&catalog), &config, 0, &mut thread_rng()) {
                    Ok(state) => state,
                    Err(e) => {
                        // Broken loadout: report it on the menu instead of playing.
                        error!(error = %e, "Run setup failed");
                        notice = Some(e.to_string());
                        continue;
                    }
                };
                notice = None;
                let exit = game_loop(out, &mut state, config.settings.show_controls, &taunts, rx)?;
                if let Some(outcome) = &state.outcome {
                    info!(?outcome, "Run summary");
                }
                if let LoopExit::Quit = exit {
                    break;
                }
            }
        }
    }
    Ok(())
}
