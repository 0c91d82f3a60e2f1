/// Arena entity types. Plain data; the rules live in `compute`.
///
/// Coordinates are virtual pixels with the origin at the top-left corner of
/// the playfield. Velocities are pixels per frame.

// ── Bounds ────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Anything that occupies a rectangle on the playfield.
pub trait Bounds {
    fn bounds(&self) -> Rect;
}

impl Bounds for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

// ── Session status ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    GameOver,
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    /// Restores 20 health, capped at 100.
    Health,
    /// Shields the player for a few seconds.
    Shield,
    /// Permanently raises the player's speed.
    Speed,
    /// Speeds up every player projectile currently in flight.
    Bullet,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Health,
        PowerUpKind::Shield,
        PowerUpKind::Speed,
        PowerUpKind::Bullet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::Health => "health",
            PowerUpKind::Shield => "shield",
            PowerUpKind::Speed => "speed",
            PowerUpKind::Bullet => "bullet",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PowerUpKind,
    /// Session time (ms) at which the item appeared.
    pub spawn_time: u64,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// A projectile fired by the player or by an enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Speed used for this frame's movement (base speed, or boosted while dashing).
    pub speed: f32,
    pub base_speed: f32,
    /// Always within `0..=100`.
    pub health: i32,
    pub score: u32,
    pub bullets: Vec<Projectile>,
    /// Recomputed every frame from the shield key and the shield boost.
    pub shield_active: bool,
    /// Session time until which the shield power-up keeps the shield up.
    pub shield_until: u64,
    /// Milliseconds until the next dash is allowed.
    pub dash_cooldown: u32,
    /// Session time at which the current dash ends.
    pub dash_until: u64,
    pub last_shot: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: i32,
    pub last_shot: u64,
}

impl Bounds for Player {
    fn bounds(&self) -> Rect {
        Rect { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

impl Bounds for Enemy {
    fn bounds(&self) -> Rect {
        Rect { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

impl Bounds for Projectile {
    fn bounds(&self) -> Rect {
        Rect { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

impl Bounds for PowerUp {
    fn bounds(&self) -> Rect {
        Rect { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

// ── Arena state ───────────────────────────────────────────────────────────────

/// Everything the simulation step reads and writes.  Cloneable so the pure
/// update functions can return a new copy without mutating the original.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub enemy_bullets: Vec<Projectile>,
    pub power_ups: Vec<PowerUp>,
    pub width: f32,
    pub height: f32,
}
