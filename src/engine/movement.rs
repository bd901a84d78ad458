use super::*;

use crate::constants::{
    BOSS_DIRECTION_INTERVAL_MAX_MS, BOSS_DIRECTION_INTERVAL_MIN_MS, BOSS_SPEED, PLAYER_SPEED,
    PROJECTILE_SPEED, SHIELD_OFFSET_X,
};

use super::utils::clamp_boss;

/// Up and down (or left and right) held together cancel out.
pub(super) fn player_velocity(keys: HeldKeys) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if keys.up {
        direction.y -= 1.0;
    }
    if keys.down {
        direction.y += 1.0;
    }
    if keys.left {
        direction.x -= 1.0;
    }
    if keys.right {
        direction.x += 1.0;
    }
    direction * PLAYER_SPEED
}

pub(super) fn homing_velocity(from: Vec2, target: Vec2) -> Vec2 {
    (target - from).normalize_or_zero() * PROJECTILE_SPEED
}

/// Moves toward `target` at projectile speed without stepping past it.
fn advance_homing(position: Vec2, target: Vec2, dt_sec: f32) -> (Vec2, Vec2) {
    let velocity = homing_velocity(position, target);
    let reach = PROJECTILE_SPEED * dt_sec;
    let next = if position.distance(target) <= reach {
        target
    } else {
        position + velocity * dt_sec
    };
    (next, velocity)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct BossIntent {
    position: Vec2,
    direction: i32,
    timer_ms: u64,
    interval_ms: u64,
}

/// Vertical random walk: once the interval elapses, pick a new direction in
/// {-1, 0, 1} and a new interval.
fn plan_boss(boss: &Boss, dt_ms: u64, rng: &mut Rng) -> BossIntent {
    let mut timer_ms = boss.direction_timer_ms.saturating_add(dt_ms);
    let mut direction = boss.direction;
    let mut interval_ms = boss.direction_interval_ms;
    if timer_ms >= interval_ms {
        timer_ms = 0;
        direction = rng.int(-1, 1);
        interval_ms = rng.int(BOSS_DIRECTION_INTERVAL_MIN_MS, BOSS_DIRECTION_INTERVAL_MAX_MS) as u64;
    }
    let dy = direction as f32 * BOSS_SPEED * dt_ms as f32 / 1000.0;
    BossIntent {
        position: clamp_boss(boss.position + Vec2::new(0.0, dy)),
        direction,
        timer_ms,
        interval_ms,
    }
}

/// Every position change for one tick, computed from the state at the start
/// of the tick and applied in a single pass.
#[derive(Clone, Debug, Default)]
pub(super) struct MovementIntent {
    players: Vec<Vec2>,
    boss: Option<BossIntent>,
    shield: Option<Vec2>,
    projectiles: Vec<(u64, Vec2, Vec2)>,
}

impl MatchEngine {
    pub(super) fn plan_movement(&mut self, dt_ms: u64) -> MovementIntent {
        let dt_sec = dt_ms as f32 / 1000.0;
        let players = self
            .players
            .iter()
            .map(|player| clamp_player(player.position + player_velocity(player.keys) * dt_sec))
            .collect();
        if self.boss.is_defeated() {
            return MovementIntent {
                players,
                ..MovementIntent::default()
            };
        }

        let boss = plan_boss(&self.boss, dt_ms, &mut self.rng);
        let shield = self
            .shield
            .as_ref()
            .map(|_| boss.position + Vec2::new(SHIELD_OFFSET_X, 0.0));
        let target = self.boss.position;
        let projectiles = self
            .projectiles
            .iter()
            .filter(|(_, projectile)| projectile.active)
            .map(|(id, projectile)| {
                let (position, velocity) = advance_homing(projectile.position, target, dt_sec);
                (id, position, velocity)
            })
            .collect();
        MovementIntent {
            players,
            boss: Some(boss),
            shield,
            projectiles,
        }
    }

    pub(super) fn apply_movement(&mut self, intent: MovementIntent) {
        for (player, position) in self.players.iter_mut().zip(intent.players) {
            player.position = position;
        }
        if let Some(boss) = intent.boss {
            self.boss.position = boss.position;
            self.boss.direction = boss.direction;
            self.boss.direction_timer_ms = boss.timer_ms;
            self.boss.direction_interval_ms = boss.interval_ms;
        }
        if let (Some(shield), Some(position)) = (self.shield.as_mut(), intent.shield) {
            shield.position = position;
        }
        for (_, projectile) in self.projectiles.iter_mut() {
            projectile.previous = projectile.position;
        }
        for (id, position, velocity) in intent.projectiles {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            if !projectile.active {
                continue;
            }
            projectile.position = position;
            projectile.velocity = velocity;
        }
    }
}
