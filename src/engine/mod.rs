use glam::Vec2;

use crate::constants::{MAX_PARTICIPANTS, PLAYER_RADIUS, PROJECTILE_RADIUS};
use crate::rng::Rng;
use crate::settings::{MatchSettings, SanitizedSettings};
use crate::types::{
    BossView, EntityKind, HazardPhase, HazardView, HeldKeys, InputFrame, MatchPhase, MatchResult,
    MatchSummary, Outcome, OutcomeEvent, PlayerView, ProjectileView, RenderCommand, RuntimeEvent,
    ShieldView, Snapshot, StartParticipant, VisualState,
};

pub mod collision;
mod combat;
mod hazard_system;
mod movement;
pub mod registry;
pub mod timer;
mod utils;

use self::collision::{detect_overlaps, first_hit_along, Contact, Shape};
use self::combat::{Boss, Cooldown, Projectile, Shield};
use self::hazard_system::HazardZone;
use self::registry::Registry;
use self::timer::TimerService;
use self::utils::{clamp_player, now_ms, player_proxy_id, player_spawn};

#[derive(Clone, Debug)]
struct PlayerInternal {
    id: String,
    name: String,
    position: Vec2,
    keys: HeldKeys,
    charged: bool,
    cooldown: Cooldown,
    connected: bool,
    fire_requested: bool,
    charge_requested: bool,
}

impl PlayerInternal {
    fn new(start: StartParticipant, position: Vec2, cooldown_ms: u64) -> Self {
        Self {
            id: start.id,
            name: start.name,
            position,
            keys: HeldKeys::NONE,
            charged: false,
            cooldown: Cooldown::new(cooldown_ms),
            connected: true,
            fire_requested: false,
            charge_requested: false,
        }
    }

    fn clear_intent(&mut self) {
        self.keys = HeldKeys::NONE;
        self.fire_requested = false;
        self.charge_requested = false;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Struck {
    Boss,
    Shield,
}

#[derive(Clone, Copy, Debug, Default)]
struct MatchStats {
    shots_fired: u32,
    shots_landed: u32,
    shots_blocked: u32,
    hazards_spawned: u32,
}

/// One boss match. Owns every entity and timer; all mutation happens inside
/// [`MatchEngine::step`] or the explicit phase transitions.
#[derive(Clone, Debug)]
pub struct MatchEngine {
    pub started_at_ms: u64,
    settings: SanitizedSettings,
    phase: MatchPhase,
    seed: u32,
    rng: Rng,
    timers: TimerService,
    players: Vec<PlayerInternal>,
    boss: Boss,
    shield: Option<Shield>,
    projectiles: Registry<Projectile>,
    hazards: Registry<HazardZone>,
    pending_inputs: Vec<(String, InputFrame)>,
    events: Vec<RuntimeEvent>,
    commands: Vec<RenderCommand>,
    pending_outcome: Option<Outcome>,
    result: Option<MatchResult>,
    outcome_event: Option<OutcomeEvent>,
    stats: MatchStats,
    elapsed_ms: u64,
    tick_counter: u64,
}

impl MatchEngine {
    pub fn new(seed: u32) -> Self {
        let settings = SanitizedSettings::default();
        Self {
            started_at_ms: 0,
            settings,
            phase: MatchPhase::Configuring,
            seed,
            rng: Rng::new(seed),
            timers: TimerService::new(),
            players: Vec::new(),
            boss: Boss::new(settings.boss_max_health),
            shield: None,
            projectiles: Registry::new("projectile"),
            hazards: Registry::new("hazard"),
            pending_inputs: Vec::new(),
            events: Vec::new(),
            commands: Vec::new(),
            pending_outcome: None,
            result: None,
            outcome_event: None,
            stats: MatchStats::default(),
            elapsed_ms: 0,
            tick_counter: 0,
        }
    }

    /// `Configuring -> Running`. Ignored in any other phase or without participants.
    pub fn start(&mut self, settings: &MatchSettings, participants: Vec<StartParticipant>) -> bool {
        if self.phase != MatchPhase::Configuring {
            log::warn!("start ignored: match is {:?}", self.phase);
            return false;
        }
        if participants.is_empty() {
            log::warn!("start ignored: no participants");
            return false;
        }

        self.settings = settings.sanitized();
        self.started_at_ms = now_ms();
        let cooldown_ms = self.settings.projectile_cooldown_ms;
        self.players = participants
            .into_iter()
            .take(MAX_PARTICIPANTS)
            .enumerate()
            .map(|(index, start)| PlayerInternal::new(start, player_spawn(index), cooldown_ms))
            .collect();
        self.boss = Boss::new(self.settings.boss_max_health);
        self.shield = if self.settings.shield_enabled {
            Some(Shield::following(&self.boss))
        } else {
            None
        };
        self.schedule_hazard_spawner();
        self.phase = MatchPhase::Running;
        self.emit_proxy_updates();

        log::info!(
            "match started: seed={} players={} boss_hp={} shield={}",
            self.seed,
            self.players.len(),
            self.settings.boss_max_health,
            self.settings.shield_enabled
        );
        true
    }

    /// `Ended -> Configuring`. Drops every entity and timer; the next
    /// [`MatchEngine::start`] builds a fresh match.
    pub fn restart(&mut self) -> bool {
        if self.phase != MatchPhase::Ended {
            log::warn!("restart ignored: match is {:?}", self.phase);
            return false;
        }

        self.remove_all_proxies();
        self.timers.cancel_all();
        self.players.clear();
        self.projectiles.clear();
        self.hazards.clear();
        self.shield = None;
        self.boss = Boss::new(self.settings.boss_max_health);
        self.pending_inputs.clear();
        self.events.clear();
        self.pending_outcome = None;
        self.result = None;
        self.outcome_event = None;
        self.stats = MatchStats::default();
        self.elapsed_ms = 0;
        self.tick_counter = 0;
        self.phase = MatchPhase::Configuring;
        log::info!("match reset to configuring");
        true
    }

    pub fn step(&mut self, dt_ms: u64) {
        if self.phase != MatchPhase::Running {
            return;
        }
        self.tick_counter += 1;
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
        let now_ms = self.elapsed_ms;

        self.apply_pending_inputs();
        self.run_due_timers(now_ms);
        for player in &mut self.players {
            player.cooldown.tick(dt_ms);
        }
        self.process_actions();

        let intent = self.plan_movement(dt_ms);
        self.apply_movement(intent);

        let contacts = self.detect_contacts();
        self.resolve_combat(&contacts);
        self.resolve_hazard_contacts(&contacts);
        self.check_terminal();

        self.emit_proxy_updates();
    }

    /// Queues input for a participant. Applied at the start of the next tick.
    pub fn receive_input(&mut self, participant_id: &str, frame: InputFrame) -> bool {
        if self.phase != MatchPhase::Running || !self.has_player(participant_id) {
            return false;
        }
        self.pending_inputs
            .push((participant_id.to_string(), frame));
        true
    }

    pub fn set_player_connection(&mut self, participant_id: &str, connected: bool) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == participant_id) {
            player.connected = connected;
            if !connected {
                player.clear_intent();
            }
        }
    }

    pub fn has_player(&self, participant_id: &str) -> bool {
        self.players.iter().any(|p| p.id == participant_id)
    }

    pub fn player_position(&self, participant_id: &str) -> Option<(f32, f32)> {
        self.players
            .iter()
            .find(|p| p.id == participant_id)
            .map(|p| (p.position.x, p.position.y))
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_ended(&self) -> bool {
        self.phase == MatchPhase::Ended
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.result.map(|result| result.outcome)
    }

    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    /// The terminal notification, handed out once.
    pub fn take_outcome_event(&mut self) -> Option<OutcomeEvent> {
        self.outcome_event.take()
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn settings(&self) -> &SanitizedSettings {
        &self.settings
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn boss_health(&self) -> i32 {
        self.boss.health()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    pub fn hazard_count(&self) -> usize {
        self.hazards.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let running_or_ended = self.phase != MatchPhase::Configuring;
        let snapshot = Snapshot {
            tick: self.tick_counter,
            now_ms: self.elapsed_ms,
            phase: self.phase,
            outcome: self.outcome(),
            players: self
                .players
                .iter()
                .map(|player| PlayerView {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    x: player.position.x,
                    y: player.position.y,
                    charged: player.charged,
                    cooldown_remaining_ms: player.cooldown.remaining_ms(),
                    cooldown_fraction: player.cooldown.fraction(),
                    connected: player.connected,
                })
                .collect(),
            boss: running_or_ended.then(|| BossView {
                x: self.boss.position.x,
                y: self.boss.position.y,
                health: self.boss.health(),
                max_health: self.boss.max_health(),
                health_fraction: self.boss.health_fraction(),
                direction: self.boss.direction,
                defeated: self.boss.is_defeated(),
            }),
            shield: self.shield.as_ref().map(|shield| ShieldView {
                x: shield.position.x,
                y: shield.position.y,
            }),
            projectiles: self
                .projectiles
                .iter()
                .filter(|(_, projectile)| projectile.active)
                .map(|(id, projectile)| ProjectileView {
                    id: self.projectiles.proxy_id(id),
                    owner: projectile.owner.clone(),
                    x: projectile.position.x,
                    y: projectile.position.y,
                    vx: projectile.velocity.x,
                    vy: projectile.velocity.y,
                    powered: projectile.powered,
                })
                .collect(),
            hazards: self
                .hazards
                .iter()
                .map(|(id, zone)| HazardView {
                    id: self.hazards.proxy_id(id),
                    x: zone.position.x,
                    y: zone.position.y,
                    radius: zone.radius,
                    phase: zone.phase,
                    spawned_at_ms: zone.spawned_at_ms,
                    activates_at_ms: zone.activates_at_ms,
                    despawn_at_ms: zone.despawn_at_ms,
                })
                .collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
            commands: if include_events {
                self.commands.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
            self.commands.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> MatchSummary {
        MatchSummary {
            outcome: self.outcome(),
            duration_ms: self.elapsed_ms,
            boss_health: self.boss.health(),
            boss_max_health: self.boss.max_health(),
            shots_fired: self.stats.shots_fired,
            shots_landed: self.stats.shots_landed,
            shots_blocked: self.stats.shots_blocked,
            hazards_spawned: self.stats.hazards_spawned,
        }
    }

    fn apply_pending_inputs(&mut self) {
        let inputs = std::mem::take(&mut self.pending_inputs);
        for (participant_id, frame) in inputs {
            let Some(player) = self.players.iter_mut().find(|p| p.id == participant_id) else {
                continue;
            };
            if let Some(keys) = frame.keys {
                player.keys = keys;
            }
            if let Some((x, y)) = frame.position {
                if x.is_finite() && y.is_finite() {
                    player.position = clamp_player(Vec2::new(x, y));
                }
            }
            player.charge_requested |= frame.charge;
            player.fire_requested |= frame.fire;
        }
    }

    /// Charge before fire, so pressing both in one tick yields a powered shot.
    fn process_actions(&mut self) {
        for idx in 0..self.players.len() {
            if std::mem::take(&mut self.players[idx].charge_requested) {
                self.arm_charge(idx);
            }
            if std::mem::take(&mut self.players[idx].fire_requested) {
                self.try_fire(idx);
            }
        }
    }

    /// Projectile contacts come before hazard contacts. The order decides
    /// which outcome wins when both fire in the same tick.
    fn detect_contacts(&self) -> Vec<Contact> {
        let mut targets = vec![(Struck::Boss, self.boss.shape())];
        if let Some(shield) = &self.shield {
            targets.push((Struck::Shield, shield.shape()));
        }

        // Swept over the tick's path: a long tick must not carry a shot past the shield.
        let mut contacts: Vec<Contact> = self
            .projectiles
            .iter()
            .filter(|(_, projectile)| projectile.active)
            .filter_map(|(projectile, state)| {
                let struck =
                    first_hit_along(state.previous, state.position, PROJECTILE_RADIUS, &targets)?;
                Some(match struck {
                    Struck::Boss => Contact::ProjectileBoss { projectile },
                    Struck::Shield => Contact::ProjectileShield { projectile },
                })
            })
            .collect();

        let players: Vec<(usize, Shape)> = self
            .players
            .iter()
            .enumerate()
            .map(|(idx, player)| (idx, Shape::circle(player.position, PLAYER_RADIUS)))
            .collect();
        let active_zones: Vec<(u64, Shape)> = self
            .hazards
            .iter()
            .filter(|(_, zone)| zone.phase == HazardPhase::Active)
            .map(|(id, zone)| (id, zone.shape()))
            .collect();
        contacts.extend(
            detect_overlaps(&players, &active_zones)
                .into_iter()
                .map(|(player, hazard)| Contact::PlayerHazard { player, hazard }),
        );
        contacts
    }

    /// Records the first outcome detected this tick. Later requests, in this
    /// tick or after the match ended, are ignored.
    fn request_outcome(&mut self, outcome: Outcome) -> bool {
        if self.phase != MatchPhase::Running || self.pending_outcome.is_some() {
            log::debug!("outcome {:?} ignored", outcome);
            return false;
        }
        self.pending_outcome = Some(outcome);
        true
    }

    fn check_terminal(&mut self) {
        if let Some(outcome) = self.pending_outcome.take() {
            self.finish(outcome);
        }
    }

    /// The single `Running -> Ended` transition for both outcomes.
    fn finish(&mut self, outcome: Outcome) -> bool {
        if self.phase != MatchPhase::Running {
            return false;
        }
        self.phase = MatchPhase::Ended;
        self.timers.cancel_all();
        self.pending_inputs.clear();
        for player in &mut self.players {
            player.clear_intent();
        }
        self.result = Some(MatchResult {
            outcome,
            at_ms: self.elapsed_ms,
        });
        self.outcome_event = Some(OutcomeEvent { outcome });
        self.events.push(RuntimeEvent::MatchEnded { outcome });
        log::info!(
            "match ended: {} at {} ms (tick {}, boss hp {}/{})",
            outcome.as_str(),
            self.elapsed_ms,
            self.tick_counter,
            self.boss.health(),
            self.boss.max_health()
        );
        true
    }

    fn emit_proxy_updates(&mut self) {
        for player in &self.players {
            self.commands.push(RenderCommand::Upsert {
                id: player_proxy_id(&player.id),
                kind: EntityKind::Player,
                x: player.position.x,
                y: player.position.y,
                visual: if player.charged {
                    VisualState::Charged
                } else {
                    VisualState::Idle
                },
            });
        }

        self.commands.push(RenderCommand::Upsert {
            id: "boss".to_string(),
            kind: EntityKind::Boss,
            x: self.boss.position.x,
            y: self.boss.position.y,
            visual: if self.boss.is_defeated() {
                VisualState::Defeated
            } else {
                VisualState::Boss {
                    health_fraction: self.boss.health_fraction(),
                }
            },
        });

        if let Some(shield) = &self.shield {
            self.commands.push(RenderCommand::Upsert {
                id: "shield".to_string(),
                kind: EntityKind::Shield,
                x: shield.position.x,
                y: shield.position.y,
                visual: VisualState::Idle,
            });
        }

        for (id, projectile) in self.projectiles.iter() {
            if !projectile.active {
                continue;
            }
            self.commands.push(RenderCommand::Upsert {
                id: self.projectiles.proxy_id(id),
                kind: EntityKind::Projectile,
                x: projectile.position.x,
                y: projectile.position.y,
                visual: if projectile.powered {
                    VisualState::Powered
                } else {
                    VisualState::Idle
                },
            });
        }
    }

    fn remove_all_proxies(&mut self) {
        let mut ids: Vec<String> = self
            .players
            .iter()
            .map(|player| player_proxy_id(&player.id))
            .collect();
        ids.push("boss".to_string());
        if self.shield.is_some() {
            ids.push("shield".to_string());
        }
        ids.extend(
            self.projectiles
                .ids()
                .into_iter()
                .map(|id| self.projectiles.proxy_id(id)),
        );
        ids.extend(
            self.hazards
                .ids()
                .into_iter()
                .map(|id| self.hazards.proxy_id(id)),
        );
        self.commands
            .extend(ids.into_iter().map(|id| RenderCommand::Remove { id }));
    }
}
