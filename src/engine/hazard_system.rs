use super::*;

use crate::constants::{ARENA_HEIGHT, ARENA_WIDTH};

use super::timer::TimerEvent;

#[derive(Clone, Debug)]
pub(super) struct HazardZone {
    pub(super) position: Vec2,
    pub(super) radius: f32,
    pub(super) phase: HazardPhase,
    pub(super) spawned_at_ms: u64,
    pub(super) activates_at_ms: u64,
    pub(super) despawn_at_ms: u64,
}

impl HazardZone {
    pub(super) fn shape(&self) -> Shape {
        Shape::circle(self.position, self.radius)
    }

    fn visual(&self) -> VisualState {
        match self.phase {
            HazardPhase::Warning => VisualState::Warning,
            HazardPhase::Active => VisualState::Active,
        }
    }
}

impl MatchEngine {
    pub(super) fn schedule_hazard_spawner(&mut self) {
        self.timers.schedule_repeating(
            self.elapsed_ms,
            self.settings.hazard_spawn_interval_ms,
            TimerEvent::SpawnHazard,
        );
    }

    /// Runs every timer due by `now_ms`. Follow-up timers are scheduled from
    /// the due time, not from `now_ms`, so long ticks don't stretch phases.
    pub(super) fn run_due_timers(&mut self, now_ms: u64) {
        while let Some(fired) = self.timers.pop_due(now_ms) {
            match fired.event {
                TimerEvent::SpawnHazard => {
                    self.spawn_random_hazard(fired.due_ms);
                }
                TimerEvent::ActivateHazard(id) => self.activate_hazard(id, fired.due_ms),
                TimerEvent::DespawnHazard(id) => self.despawn_hazard(id),
            }
        }
    }

    fn spawn_random_hazard(&mut self, at_ms: u64) -> u64 {
        let radius = self.settings.hazard_size;
        let x = self.rng.range_f32(radius, ARENA_WIDTH - radius);
        let y = self.rng.range_f32(radius, ARENA_HEIGHT - radius);
        self.spawn_hazard_at(Vec2::new(x, y), at_ms)
    }

    pub(super) fn spawn_hazard_at(&mut self, position: Vec2, at_ms: u64) -> u64 {
        let warning_ms = self.settings.hazard_warning_time_ms;
        let activates_at_ms = at_ms.saturating_add(warning_ms);
        let zone = HazardZone {
            position,
            radius: self.settings.hazard_size,
            phase: HazardPhase::Warning,
            spawned_at_ms: at_ms,
            activates_at_ms,
            despawn_at_ms: activates_at_ms.saturating_add(self.settings.hazard_despawn_interval_ms),
        };
        let id = self.hazards.insert(zone);
        self.timers
            .schedule_once(at_ms, warning_ms, TimerEvent::ActivateHazard(id));
        self.stats.hazards_spawned += 1;

        let proxy_id = self.hazards.proxy_id(id);
        log::debug!(
            "{proxy_id} warning at ({:.0}, {:.0}), active from {activates_at_ms} ms",
            position.x,
            position.y
        );
        self.push_hazard_proxy(id);
        self.events.push(RuntimeEvent::HazardSpawned { hazard_id: proxy_id });
        id
    }

    fn activate_hazard(&mut self, id: u64, at_ms: u64) {
        let Some(zone) = self.hazards.get_mut(id) else {
            return;
        };
        if zone.phase == HazardPhase::Active {
            return;
        }
        zone.phase = HazardPhase::Active;
        self.timers.schedule_once(
            at_ms,
            self.settings.hazard_despawn_interval_ms,
            TimerEvent::DespawnHazard(id),
        );
        self.push_hazard_proxy(id);
        self.events.push(RuntimeEvent::HazardActivated {
            hazard_id: self.hazards.proxy_id(id),
        });
    }

    fn despawn_hazard(&mut self, id: u64) {
        if self.hazards.remove(id).is_none() {
            return;
        }
        let proxy_id = self.hazards.proxy_id(id);
        self.commands.push(RenderCommand::Remove {
            id: proxy_id.clone(),
        });
        self.events
            .push(RuntimeEvent::HazardDespawned { hazard_id: proxy_id });
    }

    fn push_hazard_proxy(&mut self, id: u64) {
        let Some(zone) = self.hazards.get(id) else {
            return;
        };
        self.commands.push(RenderCommand::Upsert {
            id: self.hazards.proxy_id(id),
            kind: EntityKind::Hazard,
            x: zone.position.x,
            y: zone.position.y,
            visual: zone.visual(),
        });
    }

    /// Any participant inside an active zone loses the match for everyone.
    pub(super) fn resolve_hazard_contacts(&mut self, contacts: &[Contact]) {
        for contact in contacts {
            let Contact::PlayerHazard { player, hazard } = *contact else {
                continue;
            };
            let active = self
                .hazards
                .get(hazard)
                .is_some_and(|zone| zone.phase == HazardPhase::Active);
            if !active {
                continue;
            }
            let Some(player_id) = self.players.get(player).map(|p| p.id.clone()) else {
                continue;
            };
            if self.request_outcome(Outcome::Lose) {
                log::info!(
                    "{player_id} caught by {} at {} ms",
                    self.hazards.proxy_id(hazard),
                    self.elapsed_ms
                );
                self.events.push(RuntimeEvent::PlayerCaught {
                    player_id,
                    hazard_id: self.hazards.proxy_id(hazard),
                });
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(settings: MatchSettings) -> MatchEngine {
        let mut engine = MatchEngine::new(9);
        assert!(engine.start(
            &settings,
            vec![StartParticipant {
                id: "p1".to_string(),
                name: "P1".to_string(),
            }],
        ));
        engine
    }

    #[test]
    fn zone_walks_through_warning_active_and_gone() {
        let mut engine = running(MatchSettings {
            hazard_spawn_interval_ms: 1_000,
            hazard_warning_time_ms: 300,
            hazard_despawn_interval_ms: 400,
            ..MatchSettings::default()
        });
        // Keep the participant out of the way of random zones.
        engine.players.clear();

        engine.run_due_timers(1_000);
        let (id, zone) = engine.hazards.iter().next().expect("spawned");
        assert_eq!(zone.phase, HazardPhase::Warning);
        assert_eq!(zone.spawned_at_ms, 1_000);
        assert_eq!(zone.activates_at_ms, 1_300);
        assert_eq!(zone.despawn_at_ms, 1_700);

        engine.run_due_timers(1_299);
        assert_eq!(engine.hazards.get(id).map(|z| z.phase), Some(HazardPhase::Warning));
        engine.run_due_timers(1_300);
        assert_eq!(engine.hazards.get(id).map(|z| z.phase), Some(HazardPhase::Active));
        engine.run_due_timers(1_699);
        assert!(engine.hazards.contains(id));
        engine.run_due_timers(1_700);
        assert!(!engine.hazards.contains(id));

        let snapshot = engine.build_snapshot(true);
        let kinds: Vec<&str> = snapshot
            .events
            .iter()
            .filter_map(|event| match event {
                RuntimeEvent::HazardSpawned { .. } => Some("spawned"),
                RuntimeEvent::HazardActivated { .. } => Some("activated"),
                RuntimeEvent::HazardDespawned { .. } => Some("despawned"),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec!["spawned", "activated", "despawned"]);
    }

    #[test]
    fn long_tick_catches_up_on_the_whole_lifecycle() {
        let mut engine = running(MatchSettings {
            hazard_spawn_interval_ms: 10_000,
            hazard_warning_time_ms: 100,
            hazard_despawn_interval_ms: 100,
            ..MatchSettings::default()
        });
        engine.spawn_hazard_at(Vec2::new(700.0, 100.0), 0);
        engine.run_due_timers(5_000);
        assert_eq!(engine.hazard_count(), 0);
    }

    #[test]
    fn warning_zone_contact_is_ignored() {
        let mut engine = running(MatchSettings::default());
        let id = engine.spawn_hazard_at(Vec2::new(50.0, 300.0), 0);
        engine.resolve_hazard_contacts(&[Contact::PlayerHazard {
            player: 0,
            hazard: id,
        }]);
        engine.check_terminal();
        assert_eq!(engine.outcome(), None);
    }
}
