//! Match configuration
//!
//! The form that produces these values lives outside the core. The engine
//! only reads a sanitized copy once, when the match starts.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BOSS_MAX_HEALTH, DEFAULT_HAZARD_DESPAWN_INTERVAL_MS, DEFAULT_HAZARD_SIZE,
    DEFAULT_HAZARD_SPAWN_INTERVAL_MS, DEFAULT_HAZARD_WARNING_TIME_MS,
    DEFAULT_PROJECTILE_COOLDOWN_MS, MAX_HAZARD_SIZE, MIN_BOSS_MAX_HEALTH, MIN_HAZARD_SIZE,
    MIN_INTERVAL_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSettings")]
pub struct MatchSettings {
    /// Hazard zone radius in pixels
    pub hazard_size: f32,
    /// Delay between hazard spawns
    pub hazard_spawn_interval_ms: i64,
    /// How long a hazard stays active before it disappears
    pub hazard_despawn_interval_ms: i64,
    /// Harmless warning phase before a hazard becomes active
    pub hazard_warning_time_ms: i64,
    /// Minimum delay between two shots from the same player
    pub projectile_cooldown_ms: i64,
    pub boss_max_health: i32,
    pub shield_enabled: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            hazard_size: DEFAULT_HAZARD_SIZE,
            hazard_spawn_interval_ms: DEFAULT_HAZARD_SPAWN_INTERVAL_MS as i64,
            hazard_despawn_interval_ms: DEFAULT_HAZARD_DESPAWN_INTERVAL_MS as i64,
            hazard_warning_time_ms: DEFAULT_HAZARD_WARNING_TIME_MS as i64,
            projectile_cooldown_ms: DEFAULT_PROJECTILE_COOLDOWN_MS as i64,
            boss_max_health: DEFAULT_BOSS_MAX_HEALTH,
            shield_enabled: true,
        }
    }
}

/// Wire form of [`MatchSettings`]. Form fields arrive as plain JSON numbers,
/// possibly fractional or `null`; both fall back instead of failing the message.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSettings {
    hazard_size: Option<f64>,
    hazard_spawn_interval_ms: Option<f64>,
    hazard_despawn_interval_ms: Option<f64>,
    hazard_warning_time_ms: Option<f64>,
    projectile_cooldown_ms: Option<f64>,
    boss_max_health: Option<f64>,
    shield_enabled: Option<bool>,
}

impl From<RawSettings> for MatchSettings {
    fn from(raw: RawSettings) -> Self {
        let defaults = MatchSettings::default();
        // `as` saturates, so huge values land on the type's bounds.
        let whole = |value: Option<f64>, fallback: i64| value.map_or(fallback, |v| v.round() as i64);
        Self {
            hazard_size: raw.hazard_size.map_or(defaults.hazard_size, |v| v as f32),
            hazard_spawn_interval_ms: whole(
                raw.hazard_spawn_interval_ms,
                defaults.hazard_spawn_interval_ms,
            ),
            hazard_despawn_interval_ms: whole(
                raw.hazard_despawn_interval_ms,
                defaults.hazard_despawn_interval_ms,
            ),
            hazard_warning_time_ms: whole(
                raw.hazard_warning_time_ms,
                defaults.hazard_warning_time_ms,
            ),
            projectile_cooldown_ms: whole(
                raw.projectile_cooldown_ms,
                defaults.projectile_cooldown_ms,
            ),
            boss_max_health: raw
                .boss_max_health
                .map_or(defaults.boss_max_health, |v| v.round() as i32),
            shield_enabled: raw.shield_enabled.unwrap_or(defaults.shield_enabled),
        }
    }
}

/// Settings after clamping, with unsigned durations the engine can use directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedSettings {
    pub hazard_size: f32,
    pub hazard_spawn_interval_ms: u64,
    pub hazard_despawn_interval_ms: u64,
    pub hazard_warning_time_ms: u64,
    pub projectile_cooldown_ms: u64,
    pub boss_max_health: i32,
    pub shield_enabled: bool,
}

impl Default for SanitizedSettings {
    fn default() -> Self {
        MatchSettings::default().sanitized()
    }
}

impl MatchSettings {
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Clamps every field into its safe range. Non-positive values become the
    /// minimum; nothing here is treated as fatal.
    pub fn sanitized(&self) -> SanitizedSettings {
        let hazard_size = if self.hazard_size.is_finite() {
            self.hazard_size.clamp(MIN_HAZARD_SIZE, MAX_HAZARD_SIZE)
        } else {
            DEFAULT_HAZARD_SIZE
        };
        if hazard_size != self.hazard_size {
            log::warn!(
                "hazardSize {} out of range, using {}",
                self.hazard_size,
                hazard_size
            );
        }

        let boss_max_health = self.boss_max_health.max(MIN_BOSS_MAX_HEALTH);
        if boss_max_health != self.boss_max_health {
            log::warn!(
                "bossMaxHealth {} out of range, using {}",
                self.boss_max_health,
                boss_max_health
            );
        }

        SanitizedSettings {
            hazard_size,
            hazard_spawn_interval_ms: clamp_interval(
                "hazardSpawnIntervalMs",
                self.hazard_spawn_interval_ms,
            ),
            hazard_despawn_interval_ms: clamp_interval(
                "hazardDespawnIntervalMs",
                self.hazard_despawn_interval_ms,
            ),
            hazard_warning_time_ms: clamp_interval(
                "hazardWarningTimeMs",
                self.hazard_warning_time_ms,
            ),
            projectile_cooldown_ms: clamp_interval(
                "projectileCooldownMs",
                self.projectile_cooldown_ms,
            ),
            boss_max_health,
            shield_enabled: self.shield_enabled,
        }
    }
}

fn clamp_interval(field: &str, value: i64) -> u64 {
    let clamped = value.max(MIN_INTERVAL_MS as i64) as u64;
    if clamped as i64 != value {
        log::warn!("{field} {value} out of range, using {clamped}");
    }
    clamped
}
