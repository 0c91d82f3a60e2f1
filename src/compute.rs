/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `ArenaState` (and, where needed, an RNG handle or the current session
/// time) and returns a brand-new `ArenaState`.  Side effects are limited to
/// the injected RNG and the audio cues returned by [`tick`].

use rand::Rng;
use tracing::debug;

use crate::audio::AudioCue;
use crate::entities::{
    ArenaState, Bounds, Enemy, Player, PowerUp, PowerUpKind, Projectile, Rect,
};
use crate::input::Controls;

// ── Tuning ───────────────────────────────────────────────────────────────────

pub const MAX_HEALTH: i32 = 100;

pub const PLAYER_SIZE: f32 = 50.0;
pub const PLAYER_BASE_SPEED: f32 = 5.0;
pub const SHOT_COOLDOWN_MS: u64 = 300;
pub const PLAYER_BULLET_SPEED: f32 = 6.0;
pub const BULLET_SIZE: f32 = 10.0;

pub const DASH_MULTIPLIER: f32 = 3.0;
pub const DASH_DURATION_MS: u64 = 300;
pub const DASH_COOLDOWN_MS: u32 = 2000;
/// Dash cooldown drains by this much every frame, whatever the real frame time.
pub const NOMINAL_FRAME_MS: u32 = 16;

pub const ENEMY_SIZE: f32 = 50.0;
pub const ENEMY_BASE_HEALTH: i32 = 30;
pub const ENEMY_HEALTH_PER_WAVE: i32 = 5;
pub const ENEMY_SPEED_PER_WAVE: f32 = 0.2;
pub const ENEMY_SHOT_COOLDOWN_MS: u64 = 2000;
pub const ENEMY_BULLET_SPEED: f32 = 4.0;

pub const CONTACT_DAMAGE: i32 = 10;
pub const ENEMY_BULLET_DAMAGE: i32 = 10;
pub const PLAYER_BULLET_DAMAGE: i32 = 20;
pub const KILL_SCORE: u32 = 10;

pub const POWER_UP_SIZE: f32 = 30.0;
pub const POWER_UP_LIFETIME_MS: u64 = 5000;
pub const HEALTH_RESTORE: i32 = 20;
pub const SPEED_BONUS: f32 = 2.0;
pub const BULLET_BOOST: f32 = 1.5;
pub const SHIELD_BOOST_MS: u64 = 5000;

pub const WAVE_DURATION_MS: u64 = 30_000;
pub const ENEMY_SPAWN_INTERVAL_MS: u64 = 2000;
pub const POWER_UP_SPAWN_INTERVAL_MS: u64 = 10_000;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial arena for a playfield of the given size.
pub fn init_state(width: f32, height: f32) -> ArenaState {
    ArenaState {
        player: Player {
            x: width / 2.0 - PLAYER_SIZE / 2.0,
            y: height - 100.0,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
            speed: PLAYER_BASE_SPEED,
            base_speed: PLAYER_BASE_SPEED,
            health: MAX_HEALTH,
            score: 0,
            bullets: Vec::new(),
            shield_active: false,
            shield_until: 0,
            dash_cooldown: 0,
            dash_until: 0,
            last_shot: None,
        },
        enemies: Vec::new(),
        enemy_bullets: Vec::new(),
        power_ups: Vec::new(),
        width,
        height,
    }
}

// ── Geometry ─────────────────────────────────────────────────────────────────

/// Strict axis-aligned overlap: rectangles that merely touch do not collide.
pub fn is_colliding(a: &impl Bounds, b: &impl Bounds) -> bool {
    let a = a.bounds();
    let b = b.bounds();
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// True while any part of `r` is still inside the playfield.
pub fn on_playfield(r: &Rect, width: f32, height: f32) -> bool {
    r.x + r.width >= 0.0 && r.x <= width && r.y + r.height >= 0.0 && r.y <= height
}

/// Difficulty tier for a given elapsed session time.
pub fn wave(elapsed_ms: u64) -> u32 {
    (elapsed_ms / WAVE_DURATION_MS) as u32 + 1
}

fn advance(p: &Projectile) -> Projectile {
    Projectile {
        x: p.x + p.vx,
        y: p.y + p.vy,
        ..p.clone()
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

/// A new enemy just above the top edge at a random column.
pub fn spawn_enemy(rng: &mut impl Rng, width: f32, wave: u32, now: u64) -> Enemy {
    let span = (width - ENEMY_SIZE).max(0.0);
    Enemy {
        x: rng.gen::<f32>() * span,
        y: -ENEMY_SIZE,
        width: ENEMY_SIZE,
        height: ENEMY_SIZE,
        speed: rng.gen::<f32>() * 2.0 + 1.0 + wave as f32 * ENEMY_SPEED_PER_WAVE,
        health: ENEMY_BASE_HEALTH + wave as i32 * ENEMY_HEALTH_PER_WAVE,
        last_shot: now,
    }
}

/// A random power-up somewhere on the playfield.
pub fn spawn_power_up(rng: &mut impl Rng, width: f32, height: f32, now: u64) -> PowerUp {
    let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
    PowerUp {
        x: rng.gen::<f32>() * (width - POWER_UP_SIZE).max(0.0),
        y: rng.gen::<f32>() * (height - POWER_UP_SIZE).max(0.0),
        width: POWER_UP_SIZE,
        height: POWER_UP_SIZE,
        kind,
        spawn_time: now,
    }
}

/// A projectile leaving the bottom of `enemy`, headed at the player's centre.
pub fn aimed_projectile(enemy: &Enemy, player: &Player) -> Projectile {
    let x = enemy.x + enemy.width / 2.0 - BULLET_SIZE / 2.0;
    let y = enemy.y + enemy.height;
    let dx = (player.x + player.width / 2.0) - (x + BULLET_SIZE / 2.0);
    let dy = (player.y + player.height / 2.0) - (y + BULLET_SIZE / 2.0);
    let len = (dx * dx + dy * dy).sqrt();
    let (vx, vy) = if len > f32::EPSILON {
        (dx / len * ENEMY_BULLET_SPEED, dy / len * ENEMY_BULLET_SPEED)
    } else {
        (0.0, ENEMY_BULLET_SPEED)
    };
    Projectile { x, y, vx, vy, width: BULLET_SIZE, height: BULLET_SIZE }
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Recompute shield and dash state from this frame's controls.
pub fn update_abilities(state: &ArenaState, controls: &Controls, now: u64) -> ArenaState {
    let mut player = state.player.clone();

    if controls.dash && player.dash_cooldown == 0 {
        player.dash_until = now + DASH_DURATION_MS;
        player.dash_cooldown = DASH_COOLDOWN_MS;
    }
    player.speed = if now < player.dash_until {
        player.base_speed * DASH_MULTIPLIER
    } else {
        player.base_speed
    };
    player.dash_cooldown = player.dash_cooldown.saturating_sub(NOMINAL_FRAME_MS);

    player.shield_active = controls.shield || now < player.shield_until;

    ArenaState { player, ..state.clone() }
}

/// Move by the current speed along every held direction.  An axis whose
/// bound is already reached is simply not moved along.
pub fn move_player(state: &ArenaState, controls: &Controls) -> ArenaState {
    let mut player = state.player.clone();
    let speed = player.speed;

    if controls.left && player.x > 0.0 {
        player.x -= speed;
    }
    if controls.right && player.x + player.width < state.width {
        player.x += speed;
    }
    if controls.up && player.y > 0.0 {
        player.y -= speed;
    }
    if controls.down && player.y + player.height < state.height {
        player.y += speed;
    }

    ArenaState { player, ..state.clone() }
}

/// Fire a projectile straight up, unless the last shot is too recent.
pub fn player_shoot(state: &ArenaState, now: u64) -> ArenaState {
    let player = &state.player;
    if let Some(last) = player.last_shot {
        if now.saturating_sub(last) <= SHOT_COOLDOWN_MS {
            return state.clone();
        }
    }
    let mut bullets = player.bullets.clone();
    bullets.push(Projectile {
        x: player.x + player.width / 2.0 - BULLET_SIZE / 2.0,
        y: player.y,
        vx: 0.0,
        vy: -PLAYER_BULLET_SPEED,
        width: BULLET_SIZE,
        height: BULLET_SIZE,
    });
    ArenaState {
        player: Player {
            bullets,
            last_shot: Some(now),
            ..player.clone()
        },
        ..state.clone()
    }
}

/// Apply a picked-up power-up to the player.
pub fn apply_power_up(player: &Player, kind: PowerUpKind, now: u64) -> Player {
    let mut player = player.clone();
    match kind {
        PowerUpKind::Health => {
            player.health = (player.health + HEALTH_RESTORE).min(MAX_HEALTH);
        }
        PowerUpKind::Shield => {
            player.shield_until = player.shield_until.max(now + SHIELD_BOOST_MS);
            player.shield_active = true;
        }
        PowerUpKind::Speed => {
            player.base_speed += SPEED_BONUS;
            player.speed += SPEED_BONUS;
        }
        PowerUpKind::Bullet => {
            for b in &mut player.bullets {
                b.vx *= BULLET_BOOST;
                b.vy *= BULLET_BOOST;
            }
        }
    }
    player
}

/// Damage the player unless the shield is up.
fn hit_player(player: &mut Player, damage: i32, cues: &mut Vec<AudioCue>) {
    if player.shield_active {
        cues.push(AudioCue::ShieldBreak);
    } else {
        player.health = (player.health - damage).clamp(0, MAX_HEALTH);
        cues.push(AudioCue::Hit);
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame at session time `now`.
///
/// Order: player abilities, movement and shooting; player projectiles;
/// enemies (movement, culling, firing, contact, projectile hits); enemy
/// projectiles; power-ups (expiry, pickup).  Anything consumed during the pass
/// is skipped for the rest of it, and survivors are collected into new
/// vectors.
pub fn tick(state: &ArenaState, controls: &Controls, now: u64) -> (ArenaState, Vec<AudioCue>) {
    let mut cues = Vec::new();
    let (width, height) = (state.width, state.height);

    // ── 1. Player ────────────────────────────────────────────────────────────
    let mut next = update_abilities(state, controls, now);
    next = move_player(&next, controls);
    if controls.fire {
        let fired = player_shoot(&next, now);
        if fired.player.last_shot != next.player.last_shot {
            cues.push(AudioCue::Shoot);
        }
        next = fired;
    }
    let mut player = next.player;

    // ── 2. Player projectiles ────────────────────────────────────────────────
    player.bullets = player
        .bullets
        .iter()
        .map(advance)
        .filter(|b| on_playfield(&b.bounds(), width, height))
        .collect();

    // ── 3. Enemies ───────────────────────────────────────────────────────────
    let mut spent = vec![false; player.bullets.len()];
    let mut enemy_bullets = state.enemy_bullets.clone();
    let mut enemies: Vec<Enemy> = Vec::with_capacity(state.enemies.len());

    for enemy in &state.enemies {
        let mut enemy = Enemy {
            y: enemy.y + enemy.speed,
            ..enemy.clone()
        };
        if enemy.y > height {
            continue;
        }

        if now.saturating_sub(enemy.last_shot) > ENEMY_SHOT_COOLDOWN_MS {
            enemy.last_shot = now;
            enemy_bullets.push(aimed_projectile(&enemy, &player));
        }

        if is_colliding(&player, &enemy) {
            hit_player(&mut player, CONTACT_DAMAGE, &mut cues);
            continue;
        }

        let mut destroyed = false;
        for (i, bullet) in player.bullets.iter().enumerate() {
            if spent[i] || !is_colliding(bullet, &enemy) {
                continue;
            }
            spent[i] = true;
            enemy.health -= PLAYER_BULLET_DAMAGE;
            if enemy.health <= 0 {
                destroyed = true;
                break;
            }
        }
        if destroyed {
            player.score += KILL_SCORE;
            debug!(score = player.score, "enemy destroyed");
            continue;
        }

        enemies.push(enemy);
    }

    player.bullets = player
        .bullets
        .into_iter()
        .zip(spent)
        .filter(|(_, used)| !used)
        .map(|(b, _)| b)
        .collect();

    // ── 4. Enemy projectiles ─────────────────────────────────────────────────
    let mut remaining: Vec<Projectile> = Vec::with_capacity(enemy_bullets.len());
    for bullet in enemy_bullets.iter().map(advance) {
        if !on_playfield(&bullet.bounds(), width, height) {
            continue;
        }
        if is_colliding(&bullet, &player) {
            hit_player(&mut player, ENEMY_BULLET_DAMAGE, &mut cues);
            continue;
        }
        remaining.push(bullet);
    }

    // ── 5. Power-ups ─────────────────────────────────────────────────────────
    let mut power_ups: Vec<PowerUp> = Vec::with_capacity(state.power_ups.len());
    for power_up in &state.power_ups {
        if now.saturating_sub(power_up.spawn_time) > POWER_UP_LIFETIME_MS {
            continue;
        }
        if is_colliding(&player, power_up) {
            debug!(kind = power_up.kind.label(), "power-up collected");
            player = apply_power_up(&player, power_up.kind, now);
            continue;
        }
        power_ups.push(power_up.clone());
    }

    let next = ArenaState {
        player,
        enemies,
        enemy_bullets: remaining,
        power_ups,
        ..state.clone()
    };
    (next, cues)
}
