mod display;

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::Print,
    terminal,
    ExecutableCommand, QueueableCommand,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use survival_mode::audio::{self, AudioCue, AudioSink};
use survival_mode::clock::SystemClock;
use survival_mode::config::{self, Config, LogConfig};
use survival_mode::entities::SessionStatus;
use survival_mode::error::AppError;
use survival_mode::session::{GameSession, SessionEvent};

use display::TerminalSurface;

// ── Held-key tracking ─────────────────────────────────────────────────────────

/// Once a key is auto-repeating, it stays held while its last press/repeat
/// event is at most this many frames old.  Repeats arrive at 15 Hz or more,
/// so 8 frames (≈130 ms at 60 FPS) is refreshed in time.
const HOLD_WINDOW: u64 = 8;

/// Expiry for a key that has not repeated yet.  The OS waits 250–600 ms
/// before the first repeat, so a fresh press must outlive that delay.
const FIRST_HOLD_WINDOW: u64 = 45;

struct Held {
    last_frame: u64,
    repeating: bool,
}

/// The keys the session currently sees as held.
///
/// Terminals that report key releases end a hold only on release.  Without
/// release events a hold ends once the key stops repeating.
struct HeldKeys {
    keys: HashMap<String, Held>,
    release_events: bool,
}

impl HeldKeys {
    fn new(release_events: bool) -> Self {
        Self {
            keys: HashMap::new(),
            release_events,
        }
    }

    /// Record a press or repeat.  True when the key was not held before.
    fn press(&mut self, id: &str, frame: u64) -> bool {
        if let Some(held) = self.keys.get_mut(id) {
            held.last_frame = frame;
            held.repeating = true;
            return false;
        }
        self.keys.insert(
            id.to_string(),
            Held {
                last_frame: frame,
                repeating: false,
            },
        );
        true
    }

    /// True when the key was held.
    fn release(&mut self, id: &str) -> bool {
        self.keys.remove(id).is_some()
    }

    /// Drop and return the keys whose hold timed out by `frame`.
    fn expire(&mut self, frame: u64) -> Vec<String> {
        if self.release_events {
            return Vec::new();
        }
        let expired: Vec<String> = self
            .keys
            .iter()
            .filter(|(_, held)| {
                let window = if held.repeating { HOLD_WINDOW } else { FIRST_HOLD_WINDOW };
                frame.saturating_sub(held.last_frame) > window
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            self.keys.remove(id);
        }
        expired
    }

    fn clear(&mut self) {
        self.keys.clear();
    }
}

/// Key identifier in the form the session's bindings use.
fn key_id(code: &KeyCode) -> Option<String> {
    let id = match code {
        KeyCode::Char(c) => c.to_lowercase().to_string(),
        KeyCode::Left => "arrowleft".to_string(),
        KeyCode::Right => "arrowright".to_string(),
        KeyCode::Up => "arrowup".to_string(),
        KeyCode::Down => "arrowdown".to_string(),
        _ => return None,
    };
    Some(id)
}

// ── Audio ─────────────────────────────────────────────────────────────────────

/// Rings the terminal bell when the player gets hurt.  Everything else is
/// silent.
struct TerminalBell {
    enabled: bool,
    volume: f32,
    pending: bool,
}

impl TerminalBell {
    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

impl AudioSink for TerminalBell {
    fn play(&mut self, cue: AudioCue) {
        if self.enabled && self.volume > 0.0 && cue == AudioCue::Hit {
            self.pending = true;
        }
    }

    fn stop(&mut self, _cue: AudioCue) {}

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

// ── Start screen ──────────────────────────────────────────────────────────────

enum MenuResult {
    Start(String),
    Quit,
}

const MAX_NAME_LEN: usize = 16;

fn show_start_screen<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<MenuResult> {
    let mut name = String::new();
    display::draw_start_screen(out, &name)?;

    // Block until the user makes a choice
    loop {
        let Ok(ev) = rx.recv() else {
            return Ok(MenuResult::Quit);
        };
        match ev {
            Event::Key(KeyEvent { code, kind: KeyEventKind::Press, modifiers, .. }) => match code {
                KeyCode::Enter => return Ok(MenuResult::Start(name)),
                KeyCode::Esc => return Ok(MenuResult::Quit),
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(MenuResult::Quit);
                }
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Char(c) if !c.is_control() && name.chars().count() < MAX_NAME_LEN => {
                    name.push(c);
                }
                _ => {}
            },
            Event::Resize(..) => {}
            _ => continue,
        }
        display::draw_start_screen(out, &name)?;
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum RoundEnd {
    Menu,
    Quit,
}

/// Play rounds under `name` until the player quits or goes back to the menu.
///
/// Input model: key events only update the [`HeldKeys`] table.  The session
/// sees a key-down on the first press and a key-up on release, or, on
/// terminals without release events, once the key stops repeating.
fn game_loop<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &Config,
    name: &str,
    release_events: bool,
) -> std::io::Result<RoundEnd> {
    let frame_time = Duration::from_millis(config.timing.frame_ms);
    let (cols, rows) = terminal::size()?;
    let mut surface = TerminalSurface::new(
        config.playfield.width,
        config.playfield.height,
        cols,
        rows,
    );
    let mut bell = TerminalBell {
        enabled: config.audio.bell,
        volume: 0.0,
        pending: false,
    };
    bell.set_volume(config.audio.volume);

    let mut session = GameSession::new(
        SystemClock::new(),
        config.playfield.width,
        config.playfield.height,
    )
    .with_bindings(config.keys.clone());
    session.start(name);

    surface.set_player_name(session.player_name());

    let mut held = HeldKeys::new(release_events);
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            let (code, kind, modifiers) = match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => (code, kind, modifiers),
                Event::Resize(c, r) => {
                    surface.resize(c, r);
                    continue;
                }
                _ => continue,
            };

            if kind == KeyEventKind::Press {
                match code {
                    KeyCode::Esc => return Ok(RoundEnd::Quit),
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(RoundEnd::Quit);
                    }
                    KeyCode::Char('r') | KeyCode::Char('R')
                        if session.status() == SessionStatus::GameOver =>
                    {
                        held.clear();
                        session.restart();
                        continue;
                    }
                    KeyCode::Char('m') | KeyCode::Char('M')
                        if session.status() == SessionStatus::GameOver =>
                    {
                        return Ok(RoundEnd::Menu);
                    }
                    KeyCode::Char('q') | KeyCode::Char('Q')
                        if session.status() == SessionStatus::GameOver =>
                    {
                        return Ok(RoundEnd::Quit);
                    }
                    _ => {}
                }
            }

            let Some(id) = key_id(&code) else { continue };
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => {
                    // Classic terminals report auto-repeat as fresh presses.
                    if held.press(&id, frame) {
                        session.key_down(&id);
                    }
                }
                KeyEventKind::Release => {
                    if held.release(&id) {
                        session.key_up(&id);
                    }
                }
            }
        }

        for id in held.expire(frame) {
            session.key_up(&id);
        }

        // ── Simulate & draw ───────────────────────────────────────────────────
        match session.status() {
            SessionStatus::Running => session.frame(&mut surface),
            _ => session.render(&mut surface),
        }
        surface.present(out)?;

        match session.status() {
            SessionStatus::Paused => {
                display::draw_pause(out, surface.cols(), surface.rows())?;
            }
            SessionStatus::GameOver => {
                display::draw_game_over(
                    out,
                    surface.cols(),
                    surface.rows(),
                    session.player_name(),
                    session.score(),
                )?;
            }
            _ => {}
        }

        let events = session.take_events();
        audio::dispatch(&events, &mut bell);
        for event in &events {
            if let SessionEvent::GameOver { player, score } = event {
                info!(%player, score, "final score");
            }
        }
        if bell.take() {
            out.queue(Print('\x07'))?;
        }
        out.flush()?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            std::thread::sleep(frame_time - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_logging(log: &LogConfig) -> Result<(), AppError> {
    let Some(path) = &log.file else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| AppError::LogFile {
            path: path.clone(),
            source,
        })?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), AppError> {
    let config = config::load(std::env::args_os().nth(1).map(PathBuf::from))?;
    init_logging(&config.log)?;
    info!(
        width = config.playfield.width,
        height = config.playfield.height,
        frame_ms = config.timing.frame_ms,
        "survival mode starting"
    );

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release (and key-repeat) events where the terminal speaks
    // the kitty keyboard protocol.  The query reads from the terminal, so it
    // has to happen before the reader thread starts.
    let release_events = matches!(terminal::supports_keyboard_enhancement(), Ok(true))
        && out
            .execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))
            .is_ok();
    if !release_events {
        warn!("terminal lacks key-release events, using the hold window");
    }

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break; // receiver dropped → program exiting
                }
            }
            Err(_) => break,
        }
    });

    let result = run(&mut out, &rx, &config, release_events);

    // Always restore the terminal
    if release_events {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!("survival mode exiting");
    result.map_err(AppError::from)
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &Config,
    release_events: bool,
) -> std::io::Result<()> {
    loop {
        match show_start_screen(out, rx)? {
            MenuResult::Quit => break,
            MenuResult::Start(name) => match game_loop(out, rx, config, &name, release_events)? {
                RoundEnd::Quit => break,
                RoundEnd::Menu => {}
            },
        }
    }
    Ok(())
}
