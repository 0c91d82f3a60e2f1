/// The game session: one owned aggregate holding every piece of round state.
///
/// `GameSession` is a small state machine (`Idle → Running ⇄ Paused →
/// GameOver → Running`).  The host calls [`GameSession::frame`] once per
/// display refresh; spawn timers live in a [`Scheduler`] on the same
/// [`Clock`] and are polled at the start of each frame.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::audio::AudioCue;
use crate::clock::{Clock, Scheduler, SystemClock, Trigger};
use crate::compute::{
    init_state, spawn_enemy, spawn_power_up, tick, wave, ENEMY_SPAWN_INTERVAL_MS,
    POWER_UP_SPAWN_INTERVAL_MS,
};
use crate::entities::{ArenaState, SessionStatus};
use crate::input::{Action, InputState, KeyBindings};
use crate::render::{render, Surface};

pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Notifications for the host's overlays and audio.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Started { player: String },
    Paused,
    Resumed,
    GameOver { player: String, score: u32 },
    Play(AudioCue),
    Stop(AudioCue),
}

pub struct GameSession<C: Clock = SystemClock> {
    clock: C,
    rng: StdRng,
    bindings: KeyBindings,
    width: f32,
    height: f32,
    status: SessionStatus,
    player_name: String,
    arena: ArenaState,
    input: InputState,
    scheduler: Scheduler,
    /// Clock reading at session start, pushed forward by every pause.
    started_at: u64,
    paused_at: Option<u64>,
    /// Session time frozen at game over.
    ended_at: Option<u64>,
    frames: u64,
    events: Vec<SessionEvent>,
}

impl<C: Clock> GameSession<C> {
    /// An idle session for a playfield of `width` × `height`.
    pub fn new(clock: C, width: f32, height: f32) -> Self {
        Self {
            clock,
            rng: StdRng::from_entropy(),
            bindings: KeyBindings::default(),
            width,
            height,
            status: SessionStatus::Idle,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            arena: init_state(width, height),
            input: InputState::default(),
            scheduler: Scheduler::default(),
            started_at: 0,
            paused_at: None,
            ended_at: None,
            frames: 0,
            events: Vec::new(),
        }
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    /// Begin a fresh round.  A blank name becomes [`DEFAULT_PLAYER_NAME`].
    pub fn start(&mut self, player_name: &str) {
        let name = player_name.trim();
        self.player_name = if name.is_empty() {
            DEFAULT_PLAYER_NAME.to_string()
        } else {
            name.to_string()
        };

        let now = self.clock.now_ms();
        self.arena = init_state(self.width, self.height);
        self.input.clear();
        self.started_at = now;
        self.paused_at = None;
        self.ended_at = None;
        self.frames = 0;
        self.arm_timers(now);
        self.status = SessionStatus::Running;

        info!(player = %self.player_name, "survival session started");
        self.events.push(SessionEvent::Started {
            player: self.player_name.clone(),
        });
        self.events.push(SessionEvent::Play(AudioCue::Music));
    }

    /// Suspend the frame loop and the spawn timers.  Only a running session
    /// can be paused.
    pub fn pause(&mut self) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.paused_at = Some(self.clock.now_ms());
        self.scheduler.cancel_all();
        self.status = SessionStatus::Paused;

        info!(elapsed_ms = self.elapsed_ms(), "session paused");
        self.events.push(SessionEvent::Paused);
        self.events.push(SessionEvent::Stop(AudioCue::Music));
    }

    /// Continue a paused session.  Paused time is excluded from elapsed time.
    pub fn resume(&mut self) {
        if self.status != SessionStatus::Paused {
            return;
        }
        let now = self.clock.now_ms();
        if let Some(paused_at) = self.paused_at.take() {
            self.started_at += now.saturating_sub(paused_at);
        }
        self.arm_timers(now);
        self.status = SessionStatus::Running;

        info!(elapsed_ms = self.elapsed_ms(), "session resumed");
        self.events.push(SessionEvent::Resumed);
        self.events.push(SessionEvent::Play(AudioCue::Music));
    }

    pub fn toggle_pause(&mut self) {
        match self.status {
            SessionStatus::Running => self.pause(),
            SessionStatus::Paused => self.resume(),
            _ => {}
        }
    }

    /// Throw the current round away and start again under the same name.
    pub fn restart(&mut self) {
        let name = self.player_name.clone();
        self.start(&name);
    }

    fn game_over(&mut self) {
        self.ended_at = Some(self.elapsed_ms());
        self.scheduler.cancel_all();
        self.status = SessionStatus::GameOver;

        let score = self.arena.player.score;
        info!(player = %self.player_name, score, frames = self.frames, "game over");
        self.events.push(SessionEvent::GameOver {
            player: self.player_name.clone(),
            score,
        });
        self.events.push(SessionEvent::Stop(AudioCue::Music));
    }

    fn arm_timers(&mut self, now: u64) {
        self.scheduler.cancel_all();
        self.scheduler
            .arm(Trigger::EnemySpawn, ENEMY_SPAWN_INTERVAL_MS, now);
        self.scheduler
            .arm(Trigger::PowerUpSpawn, POWER_UP_SPAWN_INTERVAL_MS, now);
    }

    // ── Input ────────────────────────────────────────────────────────────────

    /// Record a key press.  The pause key acts immediately; everything else
    /// is only sampled by the next frame.
    pub fn key_down(&mut self, key: &str) {
        match self.bindings.resolve(key) {
            Some(Action::Pause) => self.toggle_pause(),
            Some(action) => self.input.press(action),
            None => trace!(key, "ignoring unbound key"),
        }
    }

    pub fn key_up(&mut self, key: &str) {
        match self.bindings.resolve(key) {
            Some(Action::Pause) | None => {}
            Some(action) => self.input.release(action),
        }
    }

    // ── Frame loop ───────────────────────────────────────────────────────────

    /// Run one frame: spawns, simulation step, drawing, game-over check.
    /// Does nothing unless the session is running.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S) {
        if self.status != SessionStatus::Running {
            return;
        }
        self.update();
        self.render(surface);
        if self.arena.player.health <= 0 {
            self.game_over();
        }
    }

    /// Fire due spawn timers and advance the simulation by one frame.
    fn update(&mut self) {
        let now = self.clock.now_ms();
        let t = self.elapsed_ms();

        for trigger in self.scheduler.due(now) {
            match trigger {
                Trigger::EnemySpawn => {
                    let enemy = spawn_enemy(&mut self.rng, self.width, wave(t), t);
                    debug!(x = enemy.x, health = enemy.health, "enemy spawned");
                    self.arena.enemies.push(enemy);
                }
                Trigger::PowerUpSpawn => {
                    let power_up = spawn_power_up(&mut self.rng, self.width, self.height, t);
                    debug!(kind = power_up.kind.label(), "power-up spawned");
                    self.arena.power_ups.push(power_up);
                }
            }
        }

        let controls = self.input.snapshot();
        let (arena, cues) = tick(&self.arena, &controls, t);
        self.arena = arena;
        self.events.extend(cues.into_iter().map(SessionEvent::Play));
        self.frames += 1;
    }

    /// Draw the current state without advancing it.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.status == SessionStatus::Idle {
            return;
        }
        render(surface, &self.arena, self.elapsed_ms());
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn arena(&self) -> &ArenaState {
        &self.arena
    }

    pub fn score(&self) -> u32 {
        self.arena.player.score
    }

    /// Milliseconds of play since start, excluding paused time.
    pub fn elapsed_ms(&self) -> u64 {
        match self.status {
            SessionStatus::Idle => 0,
            SessionStatus::Running => self.clock.now_ms().saturating_sub(self.started_at),
            SessionStatus::Paused => self
                .paused_at
                .unwrap_or(self.started_at)
                .saturating_sub(self.started_at),
            SessionStatus::GameOver => self.ended_at.unwrap_or(0),
        }
    }

    pub fn wave(&self) -> u32 {
        wave(self.elapsed_ms())
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn timers_armed(&self) -> bool {
        self.scheduler.is_armed()
    }

    /// Hand over every event emitted since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::compute::ENEMY_SIZE;
    use crate::entities::{Enemy, PowerUp, PowerUpKind, Projectile};

    struct NoSurface;

    impl Surface for NoSurface {
        fn width(&self) -> f32 {
            800.0
        }
        fn height(&self) -> f32 {
            600.0
        }
        fn clear(&mut self) {}
        fn fill_rect(&mut self, _: f32, _: f32, _: f32, _: f32, _: crate::render::Paint) {}
        fn stroke_arc(&mut self, _: f32, _: f32, _: f32, _: crate::render::Paint) {}
        fn fill_text(&mut self, _: &str, _: f32, _: f32, _: crate::render::Paint) {}
    }

    fn running() -> (GameSession<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let mut s = GameSession::new(clock.clone(), 800.0, 600.0)
            .with_rng(StdRng::seed_from_u64(7));
        s.start("Ada");
        (s, clock)
    }

    #[test]
    fn zero_health_ends_the_session() {
        let (mut s, clock) = running();
        s.arena.player.health = 5;
        let p = &s.arena.player;
        s.arena.enemy_bullets.push(Projectile {
            x: p.x + 10.0,
            y: p.y + 10.0,
            vx: 0.0,
            vy: 0.0,
            width: 10.0,
            height: 10.0,
        });
        clock.advance(16);
        s.frame(&mut NoSurface);

        assert_eq!(s.status(), SessionStatus::GameOver);
        assert_eq!(s.arena().player.health, 0);
        assert!(!s.timers_armed());
        assert!(s.take_events().contains(&SessionEvent::GameOver {
            player: "Ada".into(),
            score: 0
        }));
    }

    #[test]
    fn restart_after_game_over_resets_everything() {
        let (mut s, clock) = running();
        clock.advance(65_000);
        s.arena.player.health = 0;
        s.arena.player.score = 120;
        s.arena.enemies.push(Enemy {
            x: 0.0,
            y: 0.0,
            width: ENEMY_SIZE,
            height: ENEMY_SIZE,
            speed: 1.0,
            health: 30,
            last_shot: 0,
        });
        s.arena.power_ups.push(PowerUp {
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 30.0,
            kind: PowerUpKind::Speed,
            spawn_time: 0,
        });
        s.game_over();
        assert_eq!(s.status(), SessionStatus::GameOver);
        assert_eq!(s.wave(), 3);

        s.restart();
        assert_eq!(s.status(), SessionStatus::Running);
        assert_eq!(s.player_name(), "Ada");
        assert_eq!(s.arena().player.health, 100);
        assert_eq!(s.score(), 0);
        assert!(s.arena().enemies.is_empty());
        assert!(s.arena().enemy_bullets.is_empty());
        assert!(s.arena().player.bullets.is_empty());
        assert!(s.arena().power_ups.is_empty());
        assert_eq!(s.wave(), 1);
        assert!(s.timers_armed());
    }

    #[test]
    fn game_over_freezes_elapsed_time() {
        let (mut s, clock) = running();
        clock.advance(4_000);
        s.arena.player.health = 0;
        s.frame(&mut NoSurface);
        let at_end = s.elapsed_ms();
        clock.advance(60_000);
        assert_eq!(s.elapsed_ms(), at_end);
        assert_eq!(s.wave(), 1);
    }
}
