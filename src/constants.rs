pub const TICK_RATE: u32 = 30;
pub const TICK_MS: u64 = 1000 / TICK_RATE as u64;

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;

pub const PLAYER_RADIUS: f32 = 25.0;
pub const PLAYER_SPEED: f32 = 200.0;
pub const PLAYER_START_X: f32 = 50.0;
pub const PLAYER_SPAWN_SPACING: f32 = 120.0;
/// Strip along the bottom edge reserved for the cooldown bar.
pub const PLAYER_BOTTOM_MARGIN: f32 = 30.0;

pub const BOSS_WIDTH: f32 = 20.0;
pub const BOSS_HEIGHT: f32 = 100.0;
pub const BOSS_EDGE_OFFSET: f32 = 50.0;
pub const BOSS_SPEED: f32 = 50.0;
pub const BOSS_FIRST_DIRECTION_INTERVAL_MS: u64 = 2_000;
pub const BOSS_DIRECTION_INTERVAL_MIN_MS: i32 = 1_000;
pub const BOSS_DIRECTION_INTERVAL_MAX_MS: i32 = 3_000;

pub const SHIELD_WIDTH: f32 = 50.0;
pub const SHIELD_HEIGHT: f32 = 150.0;
pub const SHIELD_CORNER_RADIUS: f32 = 20.0;
pub const SHIELD_OFFSET_X: f32 = -150.0;

pub const PROJECTILE_RADIUS: f32 = 10.0;
pub const PROJECTILE_SPEED: f32 = 600.0;
pub const PROJECTILE_DAMAGE: i32 = 1;
pub const POWERED_PROJECTILE_DAMAGE: i32 = 2;

pub const DEFAULT_HAZARD_SIZE: f32 = 50.0;
pub const DEFAULT_HAZARD_SPAWN_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_HAZARD_DESPAWN_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_HAZARD_WARNING_TIME_MS: u64 = 1_000;
pub const DEFAULT_PROJECTILE_COOLDOWN_MS: u64 = 1_000;
pub const DEFAULT_BOSS_MAX_HEALTH: i32 = 100;

pub const MIN_HAZARD_SIZE: f32 = 5.0;
/// Largest radius that still leaves room to place a zone inside the arena.
pub const MAX_HAZARD_SIZE: f32 = ARENA_HEIGHT / 2.0 - 1.0;
pub const MIN_INTERVAL_MS: u64 = 100;
pub const MIN_BOSS_MAX_HEALTH: i32 = 1;

pub const MAX_PARTICIPANTS: usize = 2;
