use super::*;

use crate::constants::{
    ARENA_HEIGHT, ARENA_WIDTH, BOSS_EDGE_OFFSET, BOSS_FIRST_DIRECTION_INTERVAL_MS, BOSS_HEIGHT,
    BOSS_WIDTH, POWERED_PROJECTILE_DAMAGE, PROJECTILE_DAMAGE,
    SHIELD_CORNER_RADIUS, SHIELD_HEIGHT, SHIELD_OFFSET_X, SHIELD_WIDTH,
};

use super::movement::homing_velocity;

/// Per-player shot gate. Counts down with match time and never goes negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct Cooldown {
    remaining_ms: u64,
    duration_ms: u64,
}

impl Cooldown {
    pub(super) fn new(duration_ms: u64) -> Self {
        Self {
            remaining_ms: 0,
            duration_ms,
        }
    }

    pub(super) fn tick(&mut self, dt_ms: u64) {
        self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms);
    }

    pub(super) fn is_ready(&self) -> bool {
        self.remaining_ms == 0
    }

    fn trigger(&mut self) {
        self.remaining_ms = self.duration_ms;
    }

    pub(super) fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub(super) fn fraction(&self) -> f32 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.remaining_ms as f32 / self.duration_ms as f32).clamp(0.0, 1.0)
    }
}

enum BossHit {
    Ignored,
    Damaged,
    Defeated,
}

/// Health is private to this module; only a registered projectile contact
/// can lower it.
#[derive(Clone, Debug)]
pub(super) struct Boss {
    pub(super) position: Vec2,
    pub(super) direction: i32,
    pub(super) direction_timer_ms: u64,
    pub(super) direction_interval_ms: u64,
    health: i32,
    max_health: i32,
    defeated: bool,
}

impl Boss {
    pub(super) fn new(max_health: i32) -> Self {
        Self {
            position: Vec2::new(ARENA_WIDTH - BOSS_EDGE_OFFSET, ARENA_HEIGHT / 2.0),
            direction: 0,
            direction_timer_ms: 0,
            direction_interval_ms: BOSS_FIRST_DIRECTION_INTERVAL_MS,
            health: max_health,
            max_health,
            defeated: false,
        }
    }

    pub(super) fn health(&self) -> i32 {
        self.health
    }

    pub(super) fn max_health(&self) -> i32 {
        self.max_health
    }

    pub(super) fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub(super) fn health_fraction(&self) -> f32 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health as f32 / self.max_health as f32).clamp(0.0, 1.0)
    }

    pub(super) fn shape(&self) -> Shape {
        Shape::rect(self.position, BOSS_WIDTH, BOSS_HEIGHT)
    }

    fn apply_damage(&mut self, damage: i32) -> BossHit {
        if self.defeated {
            return BossHit::Ignored;
        }
        self.health = (self.health - damage).max(0);
        if self.health == 0 {
            self.defeated = true;
            self.direction = 0;
            BossHit::Defeated
        } else {
            BossHit::Damaged
        }
    }
}

#[derive(Clone, Debug)]
pub(super) struct Shield {
    pub(super) position: Vec2,
}

impl Shield {
    pub(super) fn following(boss: &Boss) -> Self {
        Self {
            position: boss.position + Vec2::new(SHIELD_OFFSET_X, 0.0),
        }
    }

    pub(super) fn shape(&self) -> Shape {
        Shape::rounded_rect(
            self.position,
            SHIELD_WIDTH,
            SHIELD_HEIGHT,
            SHIELD_CORNER_RADIUS,
        )
    }
}

#[derive(Clone, Debug)]
pub(super) struct Projectile {
    pub(super) owner: String,
    pub(super) position: Vec2,
    /// Position at the start of the current tick; contacts are swept from here.
    pub(super) previous: Vec2,
    pub(super) velocity: Vec2,
    pub(super) powered: bool,
    /// Cleared on the first contact; the entry is swept at the end of the
    /// combat pass.
    pub(super) active: bool,
}


impl MatchEngine {
    pub(super) fn arm_charge(&mut self, idx: usize) {
        let Some(player) = self.players.get_mut(idx) else {
            return;
        };
        if player.charged {
            return;
        }
        player.charged = true;
        self.events.push(RuntimeEvent::ChargeArmed {
            player_id: player.id.clone(),
        });
    }

    /// Spawns a projectile at the player aimed at the boss. Returns `None`
    /// while the cooldown is running.
    pub(super) fn try_fire(&mut self, idx: usize) -> Option<u64> {
        let player = self.players.get_mut(idx)?;
        if !player.cooldown.is_ready() {
            return None;
        }
        player.cooldown.trigger();
        let powered = std::mem::take(&mut player.charged);
        let owner = player.id.clone();
        let origin = player.position;

        let id = self.projectiles.insert(Projectile {
            owner: owner.clone(),
            position: origin,
            previous: origin,
            velocity: homing_velocity(origin, self.boss.position),
            powered,
            active: true,
        });
        self.stats.shots_fired += 1;
        self.events.push(RuntimeEvent::ProjectileFired {
            projectile_id: self.projectiles.proxy_id(id),
            by: owner,
            powered,
        });
        Some(id)
    }

    pub(super) fn resolve_combat(&mut self, contacts: &[Contact]) {
        for contact in contacts {
            match *contact {
                Contact::ProjectileBoss { projectile } => self.on_projectile_hit_boss(projectile),
                Contact::ProjectileShield { projectile } => {
                    self.on_projectile_hit_shield(projectile)
                }
                Contact::PlayerHazard { .. } => {}
            }
        }
        self.sweep_spent_projectiles();
    }

    fn on_projectile_hit_boss(&mut self, projectile_id: u64) {
        let Some(projectile) = self.projectiles.get_mut(projectile_id) else {
            return;
        };
        if !projectile.active {
            return;
        }
        projectile.active = false;
        let damage = if projectile.powered {
            POWERED_PROJECTILE_DAMAGE
        } else {
            PROJECTILE_DAMAGE
        };
        let by = projectile.owner.clone();

        let defeated = match self.boss.apply_damage(damage) {
            BossHit::Ignored => return,
            BossHit::Damaged => false,
            BossHit::Defeated => true,
        };
        self.stats.shots_landed += 1;
        self.events.push(RuntimeEvent::BossHit {
            projectile_id: self.projectiles.proxy_id(projectile_id),
            damage,
            health: self.boss.health(),
            by,
        });
        if defeated {
            log::info!("boss defeated at {} ms", self.elapsed_ms);
            self.events.push(RuntimeEvent::BossDefeated);
            self.request_outcome(Outcome::Win);
        }
    }

    fn on_projectile_hit_shield(&mut self, projectile_id: u64) {
        let Some(projectile) = self.projectiles.get_mut(projectile_id) else {
            return;
        };
        if !projectile.active {
            return;
        }
        projectile.active = false;
        self.stats.shots_blocked += 1;
        self.events.push(RuntimeEvent::ProjectileBlocked {
            projectile_id: self.projectiles.proxy_id(projectile_id),
        });
    }

    fn sweep_spent_projectiles(&mut self) {
        let spent: Vec<u64> = self
            .projectiles
            .iter()
            .filter(|(_, projectile)| !projectile.active)
            .map(|(id, _)| id)
            .collect();
        for id in spent {
            if self.projectiles.remove(id).is_some() {
                self.commands.push(RenderCommand::Remove {
                    id: self.projectiles.proxy_id(id),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_clamps_at_zero() {
        let mut cooldown = Cooldown::new(1_000);
        assert!(cooldown.is_ready());
        cooldown.trigger();
        assert_eq!(cooldown.fraction(), 1.0);
        cooldown.tick(400);
        assert_eq!(cooldown.remaining_ms(), 600);
        cooldown.tick(10_000);
        assert_eq!(cooldown.remaining_ms(), 0);
        assert!(cooldown.is_ready());
        assert_eq!(cooldown.fraction(), 0.0);
    }

    #[test]
    fn boss_health_never_goes_negative() {
        let mut boss = Boss::new(3);
        assert!(matches!(boss.apply_damage(2), BossHit::Damaged));
        assert!(matches!(boss.apply_damage(2), BossHit::Defeated));
        assert_eq!(boss.health(), 0);
        assert_eq!(boss.health_fraction(), 0.0);
        assert!(matches!(boss.apply_damage(2), BossHit::Ignored));
        assert_eq!(boss.health(), 0);
    }

    #[test]
    fn shield_sits_left_of_the_boss() {
        let boss = Boss::new(10);
        let shield = Shield::following(&boss);
        assert_eq!(shield.position.x, boss.position.x + SHIELD_OFFSET_X);
        assert_eq!(shield.position.y, boss.position.y);
    }

    #[test]
    fn stale_projectile_contact_is_a_no_op() {
        let mut engine = MatchEngine::new(3);
        assert!(engine.start(
            &MatchSettings {
                shield_enabled: false,
                ..MatchSettings::default()
            },
            vec![StartParticipant {
                id: "p1".to_string(),
                name: "P1".to_string(),
            }],
        ));
        let id = engine.try_fire(0).expect("cooldown starts ready");
        engine.resolve_combat(&[
            Contact::ProjectileBoss { projectile: id },
            Contact::ProjectileBoss { projectile: id },
            Contact::ProjectileShield { projectile: id },
            Contact::ProjectileBoss { projectile: id + 100 },
        ]);
        assert_eq!(engine.boss_health(), engine.settings().boss_max_health - 1);
        assert_eq!(engine.stats.shots_landed, 1);
        assert_eq!(engine.stats.shots_blocked, 0);
        assert_eq!(engine.projectile_count(), 0);
    }
}
