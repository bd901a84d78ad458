use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Lose => "lose",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Configuring,
    Running,
    Ended,
}

/// Directional keys currently held by one participant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeldKeys {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl HeldKeys {
    pub const NONE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };
}

/// One batch of control input addressed to a participant. `fire` and `charge`
/// are edge-triggered; `keys` replaces the held state when present.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    pub keys: Option<HeldKeys>,
    pub fire: bool,
    pub charge: bool,
    pub position: Option<(f32, f32)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardPhase {
    Warning,
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Boss,
    Shield,
    Projectile,
    Hazard,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VisualState {
    Idle,
    Charged,
    Powered,
    Warning,
    Active,
    Boss {
        #[serde(rename = "healthFraction")]
        health_fraction: f32,
    },
    Defeated,
}

/// Commands for the presentation layer, which owns the actual drawing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderCommand {
    Upsert {
        id: String,
        kind: EntityKind,
        x: f32,
        y: f32,
        visual: VisualState,
    },
    Remove {
        id: String,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub charged: bool,
    #[serde(rename = "cooldownRemainingMs")]
    pub cooldown_remaining_ms: u64,
    #[serde(rename = "cooldownFraction")]
    pub cooldown_fraction: f32,
    pub connected: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct BossView {
    pub x: f32,
    pub y: f32,
    pub health: i32,
    #[serde(rename = "maxHealth")]
    pub max_health: i32,
    #[serde(rename = "healthFraction")]
    pub health_fraction: f32,
    pub direction: i32,
    pub defeated: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ShieldView {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProjectileView {
    pub id: String,
    pub owner: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub powered: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct HazardView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub phase: HazardPhase,
    #[serde(rename = "spawnedAtMs")]
    pub spawned_at_ms: u64,
    #[serde(rename = "activatesAtMs")]
    pub activates_at_ms: u64,
    #[serde(rename = "despawnAtMs")]
    pub despawn_at_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    ChargeArmed {
        #[serde(rename = "playerId")]
        player_id: String,
    },
    ProjectileFired {
        #[serde(rename = "projectileId")]
        projectile_id: String,
        by: String,
        powered: bool,
    },
    BossHit {
        #[serde(rename = "projectileId")]
        projectile_id: String,
        damage: i32,
        health: i32,
        by: String,
    },
    ProjectileBlocked {
        #[serde(rename = "projectileId")]
        projectile_id: String,
    },
    HazardSpawned {
        #[serde(rename = "hazardId")]
        hazard_id: String,
    },
    HazardActivated {
        #[serde(rename = "hazardId")]
        hazard_id: String,
    },
    HazardDespawned {
        #[serde(rename = "hazardId")]
        hazard_id: String,
    },
    BossDefeated,
    PlayerCaught {
        #[serde(rename = "playerId")]
        player_id: String,
        #[serde(rename = "hazardId")]
        hazard_id: String,
    },
    MatchEnded {
        outcome: Outcome,
    },
}

/// Terminal notification for the presentation bridge, sent once per match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct OutcomeEvent {
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub outcome: Outcome,
    #[serde(rename = "atMs")]
    pub at_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    #[serde(rename = "nowMs")]
    pub now_ms: u64,
    pub phase: MatchPhase,
    pub outcome: Option<Outcome>,
    pub players: Vec<PlayerView>,
    pub boss: Option<BossView>,
    pub shield: Option<ShieldView>,
    pub projectiles: Vec<ProjectileView>,
    pub hazards: Vec<HazardView>,
    pub events: Vec<RuntimeEvent>,
    pub commands: Vec<RenderCommand>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchSummary {
    pub outcome: Option<Outcome>,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    #[serde(rename = "bossHealth")]
    pub boss_health: i32,
    #[serde(rename = "bossMaxHealth")]
    pub boss_max_health: i32,
    #[serde(rename = "shotsFired")]
    pub shots_fired: u32,
    #[serde(rename = "shotsLanded")]
    pub shots_landed: u32,
    #[serde(rename = "shotsBlocked")]
    pub shots_blocked: u32,
    #[serde(rename = "hazardsSpawned")]
    pub hazards_spawned: u32,
}

#[derive(Clone, Debug)]
pub struct StartParticipant {
    pub id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_event_serializes_as_lowercase() {
        let win = serde_json::to_string(&OutcomeEvent {
            outcome: Outcome::Win,
        })
        .expect("outcome serializes");
        assert_eq!(win, r#"{"outcome":"win"}"#);
        assert_eq!(Outcome::Lose.as_str(), "lose");
    }

    #[test]
    fn render_commands_are_tagged_by_op() {
        let upsert = serde_json::to_value(RenderCommand::Upsert {
            id: "boss".to_string(),
            kind: EntityKind::Boss,
            x: 1.0,
            y: 2.0,
            visual: VisualState::Boss {
                health_fraction: 0.5,
            },
        })
        .expect("upsert serializes");
        assert_eq!(upsert["op"], "upsert");
        assert_eq!(upsert["kind"], "boss");
        assert_eq!(upsert["visual"]["state"], "boss");
        assert_eq!(upsert["visual"]["healthFraction"], 0.5);

        let remove = serde_json::to_value(RenderCommand::Remove {
            id: "hazard_3".to_string(),
        })
        .expect("remove serializes");
        assert_eq!(remove["op"], "remove");
        assert_eq!(remove["id"], "hazard_3");
    }

    #[test]
    fn held_keys_fill_missing_fields() {
        let keys: HeldKeys = serde_json::from_str(r#"{"up":true}"#).expect("keys parse");
        assert_eq!(
            keys,
            HeldKeys {
                up: true,
                ..HeldKeys::NONE
            }
        );
    }
}
