/// Turns an arena snapshot into drawing calls on a [`Surface`].
///
/// Functions here receive a [`Surface`] and an immutable view of the game
/// state.  No game logic is performed and nothing is mutated.

use crate::compute::{wave, POWER_UP_LIFETIME_MS};
use crate::entities::{ArenaState, Enemy, PowerUp, Projectile};

// ── Colour palette ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Paint {
    Blue,
    Cyan,
    Red,
    Green,
    Orange,
    Yellow,
    White,
}

const C_PLAYER: Paint = Paint::Blue;
const C_SHIELD: Paint = Paint::Cyan;
const C_BULLET_PLAYER: Paint = Paint::Red;
const C_ENEMY: Paint = Paint::Green;
const C_BULLET_ENEMY: Paint = Paint::Orange;
const C_POWER_UP: Paint = Paint::Yellow;
const C_TEXT: Paint = Paint::White;

/// A 2D drawing target measured in the same units as the playfield.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn clear(&mut self);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: Paint);
    fn stroke_arc(&mut self, cx: f32, cy: f32, radius: f32, paint: Paint);
    /// `y` is the text baseline.
    fn fill_text(&mut self, text: &str, x: f32, y: f32, paint: Paint);
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Draw one complete frame of `state` at session time `elapsed_ms`.
pub fn render<S: Surface + ?Sized>(surface: &mut S, state: &ArenaState, elapsed_ms: u64) {
    surface.clear();

    draw_player(surface, state);
    for bullet in &state.player.bullets {
        draw_projectile(surface, bullet, C_BULLET_PLAYER);
    }
    for enemy in &state.enemies {
        draw_enemy(surface, enemy);
    }
    for bullet in &state.enemy_bullets {
        draw_projectile(surface, bullet, C_BULLET_ENEMY);
    }
    for power_up in &state.power_ups {
        draw_power_up(surface, power_up, elapsed_ms);
    }

    draw_hud(surface, state, elapsed_ms);
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<S: Surface + ?Sized>(surface: &mut S, state: &ArenaState) {
    let p = &state.player;
    surface.fill_rect(p.x, p.y, p.width, p.height, C_PLAYER);
    if p.shield_active {
        surface.stroke_arc(p.x + p.width / 2.0, p.y + p.height / 2.0, p.width, C_SHIELD);
    }
}

fn draw_enemy<S: Surface + ?Sized>(surface: &mut S, enemy: &Enemy) {
    surface.fill_rect(enemy.x, enemy.y, enemy.width, enemy.height, C_ENEMY);
}

fn draw_projectile<S: Surface + ?Sized>(surface: &mut S, p: &Projectile, paint: Paint) {
    surface.fill_rect(p.x, p.y, p.width, p.height, paint);
}

/// Seconds left before `power_up` disappears, rounded up.
pub fn seconds_left(power_up: &PowerUp, elapsed_ms: u64) -> u64 {
    let age = elapsed_ms.saturating_sub(power_up.spawn_time);
    POWER_UP_LIFETIME_MS.saturating_sub(age).div_ceil(1000)
}

fn draw_power_up<S: Surface + ?Sized>(surface: &mut S, power_up: &PowerUp, elapsed_ms: u64) {
    let pu = power_up;
    surface.fill_rect(pu.x, pu.y, pu.width, pu.height, C_POWER_UP);
    surface.fill_text(pu.kind.label(), pu.x, pu.y - 5.0, C_TEXT);
    surface.fill_text(
        &format!("({})", seconds_left(pu, elapsed_ms)),
        pu.x + pu.width - 12.0,
        pu.y + pu.height + 12.0,
        C_TEXT,
    );
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_hud<S: Surface + ?Sized>(surface: &mut S, state: &ArenaState, elapsed_ms: u64) {
    let lines = [
        format!("Health: {}", state.player.health),
        format!("Score: {}", state.player.score),
        format!("Wave: {}", wave(elapsed_ms)),
        format!("Time: {}s", elapsed_ms / 1000),
    ];
    for (i, line) in lines.iter().enumerate() {
        surface.fill_text(line, 10.0, 30.0 * (i as f32 + 1.0), C_TEXT);
    }
}
