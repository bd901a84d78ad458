use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;

use crate::constants::{
    ARENA_HEIGHT, ARENA_WIDTH, BOSS_HEIGHT, BOSS_WIDTH, PLAYER_BOTTOM_MARGIN, PLAYER_RADIUS,
    PLAYER_SPAWN_SPACING, PLAYER_START_X,
};

pub(super) fn now_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    now as u64
}

pub(super) fn clamp_player(position: Vec2) -> Vec2 {
    Vec2::new(
        position.x.clamp(PLAYER_RADIUS, ARENA_WIDTH - PLAYER_RADIUS),
        position
            .y
            .clamp(PLAYER_RADIUS, ARENA_HEIGHT - PLAYER_RADIUS - PLAYER_BOTTOM_MARGIN),
    )
}

pub(super) fn clamp_boss(position: Vec2) -> Vec2 {
    Vec2::new(
        position.x.clamp(BOSS_WIDTH / 2.0, ARENA_WIDTH - BOSS_WIDTH / 2.0),
        position
            .y
            .clamp(BOSS_HEIGHT / 2.0, ARENA_HEIGHT - BOSS_HEIGHT / 2.0),
    )
}

pub(super) fn player_spawn(index: usize) -> Vec2 {
    clamp_player(Vec2::new(
        PLAYER_START_X,
        ARENA_HEIGHT / 2.0 + index as f32 * PLAYER_SPAWN_SPACING,
    ))
}

pub(super) fn player_proxy_id(participant_id: &str) -> String {
    format!("player:{participant_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_clamp_reserves_bottom_margin() {
        let clamped = clamp_player(Vec2::new(-100.0, 10_000.0));
        assert_eq!(clamped.x, PLAYER_RADIUS);
        assert_eq!(
            clamped.y,
            ARENA_HEIGHT - PLAYER_RADIUS - PLAYER_BOTTOM_MARGIN
        );
    }

    #[test]
    fn spawns_are_spread_vertically() {
        let first = player_spawn(0);
        let second = player_spawn(1);
        assert_eq!(first, Vec2::new(PLAYER_START_X, ARENA_HEIGHT / 2.0));
        assert_eq!(second.y - first.y, PLAYER_SPAWN_SPACING);
    }
}
