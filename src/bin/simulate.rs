use boss_arena::constants::{PLAYER_RADIUS, TICK_MS};
use boss_arena::engine::MatchEngine;
use boss_arena::settings::MatchSettings;
use boss_arena::types::{
    HeldKeys, InputFrame, MatchPhase, Outcome, RuntimeEvent, Snapshot, StartParticipant,
};
use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Extra distance the bot keeps from a zone's edge.
const DODGE_MARGIN: f32 = 40.0;
const STEER_DEADZONE: f32 = 4.0;
/// Ticks stepped after the end to make sure nothing moves any more.
const POST_END_TICKS: usize = 30;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Run one scenario instead of the preset list
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// JSON file with match settings (camelCase keys)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Two bots share the arena
    #[arg(long)]
    coop: bool,
    #[arg(long, default_value_t = 300)]
    max_seconds: u64,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    bots: usize,
    settings: MatchSettings,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    bots: usize,
    outcome: Option<Outcome>,
    reason: String,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "bossHealth")]
    boss_health: i32,
    #[serde(rename = "bossMaxHealth")]
    boss_max_health: i32,
    #[serde(rename = "shotsFired")]
    shots_fired: u32,
    #[serde(rename = "shotsLanded")]
    shots_landed: u32,
    #[serde(rename = "shotsBlocked")]
    shots_blocked: u32,
    #[serde(rename = "hazardsSpawned")]
    hazards_spawned: u32,
    #[serde(rename = "poweredHits")]
    powered_hits: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

/// Scripted participant: dodges zones, otherwise lines up with the boss and
/// shoots whenever the cooldown allows, charging every other shot.
#[derive(Clone, Debug)]
struct Bot {
    id: String,
    lane: f32,
    shots: u32,
}

impl Bot {
    fn new(index: usize) -> Self {
        Self {
            id: format!("bot_{}", index + 1),
            lane: index as f32 * 60.0,
            shots: 0,
        }
    }

    fn decide(&mut self, snapshot: &Snapshot) -> InputFrame {
        let Some(me) = snapshot.players.iter().find(|player| player.id == self.id) else {
            return InputFrame::default();
        };
        let Some(boss) = snapshot.boss.as_ref() else {
            return InputFrame::default();
        };

        let mut flee = (0.0f32, 0.0f32);
        for hazard in &snapshot.hazards {
            let dx = me.x - hazard.x;
            let dy = me.y - hazard.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance < hazard.radius + PLAYER_RADIUS + DODGE_MARGIN {
                let distance = distance.max(1.0);
                flee.0 += dx / distance;
                flee.1 += dy / distance;
            }
        }

        let keys = if flee != (0.0, 0.0) {
            steer(flee.0 * 100.0, flee.1 * 100.0)
        } else {
            let home_x = if snapshot.shield.is_some() {
                boss.x - 70.0
            } else {
                200.0
            };
            steer(home_x - me.x, boss.y + self.lane - me.y)
        };

        let fire = me.cooldown_remaining_ms == 0;
        let charge = fire && !me.charged && self.shots % 2 == 0;
        if fire {
            self.shots += 1;
        }
        InputFrame {
            keys: Some(keys),
            fire,
            charge,
            position: None,
        }
    }
}

fn steer(dx: f32, dy: f32) -> HeldKeys {
    HeldKeys {
        up: dy < -STEER_DEADZONE,
        down: dy > STEER_DEADZONE,
        left: dx < -STEER_DEADZONE,
        right: dx > STEER_DEADZONE,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let scenarios = match resolve_scenarios(&cli) {
        Ok(scenarios) => scenarios,
        Err(error) => {
            eprintln!("failed to load settings: {error}");
            std::process::exit(2);
        }
    };
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_ms = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "bots": scenario.bots,
                "settings": scenario.settings,
            }),
        );
        let scenario_run = run_scenario(&scenario, cli.max_seconds);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_duration_ms += scenario_run.result.duration_ms;
        *reason_counts
            .entry(scenario_run.result.reason.clone())
            .or_insert(0) += 1;

        emit_log(
            if scenario_run.result.outcome.is_none() {
                "warn"
            } else {
                "info"
            },
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "durationMs": scenario_run.result.duration_ms,
                "bossHealth": scenario_run.result.boss_health,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => log::error!("scenario result did not serialize: {error}"),
        }
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        reason_counts,
        total_anomalies,
        total_duration_ms,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario, max_seconds: u64) -> ScenarioRunResult {
    let mut bots: Vec<Bot> = (0..scenario.bots.max(1)).map(Bot::new).collect();
    let participants = bots
        .iter()
        .map(|bot| StartParticipant {
            id: bot.id.clone(),
            name: bot.id.to_uppercase(),
        })
        .collect();

    let mut engine = MatchEngine::new(scenario.seed);
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    if !engine.start(&scenario.settings, participants) {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            0,
            "match refused to start".to_string(),
        );
    }
    let max_health = engine.settings().boss_max_health;

    let mut snapshot = engine.build_snapshot(true);
    let max_ticks = max_seconds.saturating_mul(1000) / TICK_MS;
    let mut ended_events = 0usize;
    let mut powered_hits = 0u32;
    let mut last_health = max_health;
    let mut timed_out = false;

    while engine.phase() == MatchPhase::Running {
        for bot in &mut bots {
            let frame = bot.decide(&snapshot);
            engine.receive_input(&bot.id, frame);
        }
        engine.step(TICK_MS);
        snapshot = engine.build_snapshot(true);

        let health = snapshot.boss.as_ref().map(|boss| boss.health).unwrap_or(0);
        for message in collect_snapshot_anomalies(&snapshot, max_health, last_health) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_health = health;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::MatchEnded { .. } => ended_events += 1,
                RuntimeEvent::BossHit { damage, .. } if *damage > 1 => powered_hits += 1,
                _ => {}
            }
        }

        if snapshot.tick > max_ticks {
            timed_out = true;
            break;
        }
    }

    if engine.is_ended() {
        if ended_events != 1 {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                format!("expected one match_ended event, saw {ended_events}"),
            );
        }
        for message in check_frozen_after_end(&mut engine, &snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
    }

    let summary = engine.build_summary();
    let reason = match summary.outcome {
        Some(outcome) => outcome.as_str().to_string(),
        None if timed_out => "timeout".to_string(),
        None => "not_started".to_string(),
    };

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            bots: bots.len(),
            outcome: summary.outcome,
            reason,
            duration_ms: summary.duration_ms,
            boss_health: summary.boss_health,
            boss_max_health: summary.boss_max_health,
            shots_fired: summary.shots_fired,
            shots_landed: summary.shots_landed,
            shots_blocked: summary.shots_blocked,
            hazards_spawned: summary.hazards_spawned,
            powered_hits,
            anomalies,
        },
        anomaly_records,
        finished_tick: snapshot.tick,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, max_health: i32, last_health: i32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if let Some(boss) = snapshot.boss.as_ref() {
        if boss.health < 0 || boss.health > max_health {
            anomalies.push(format!("boss health out of range: {}/{max_health}", boss.health));
        }
        if boss.health > last_health {
            anomalies.push(format!(
                "boss health went up: {last_health} -> {}",
                boss.health
            ));
        }
        if !boss.health_fraction.is_finite() || !(0.0..=1.0).contains(&boss.health_fraction) {
            anomalies.push(format!("invalid health fraction: {}", boss.health_fraction));
        }
        if boss.health == 0 && snapshot.outcome != Some(Outcome::Win) {
            anomalies.push("boss at zero health without a win".to_string());
        }
    } else {
        anomalies.push("boss missing from a running match".to_string());
    }

    for player in &snapshot.players {
        if !(0.0..=1.0).contains(&player.cooldown_fraction) {
            anomalies.push(format!(
                "cooldown fraction out of range: {} {}",
                player.id, player.cooldown_fraction
            ));
        }
    }

    for hazard in &snapshot.hazards {
        if hazard.activates_at_ms < hazard.spawned_at_ms
            || hazard.despawn_at_ms < hazard.activates_at_ms
        {
            anomalies.push(format!("hazard timeline out of order: {}", hazard.id));
        }
    }
    anomalies
}

fn check_frozen_after_end(engine: &mut MatchEngine, last: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    let projectiles = engine.projectile_count();
    let hazards = engine.hazard_count();
    for _ in 0..POST_END_TICKS {
        engine.step(TICK_MS);
    }
    if engine.projectile_count() != projectiles || engine.hazard_count() != hazards {
        anomalies.push("entities changed after end".to_string());
    }
    for player in &last.players {
        if engine.player_position(&player.id) != Some((player.x, player.y)) {
            anomalies.push(format!("{} moved after end", player.id));
        }
    }
    let after = engine.build_snapshot(true);
    if after.tick != last.tick {
        anomalies.push(format!("ticks advanced after end: {} -> {}", last.tick, after.tick));
    }
    if !after.events.is_empty() {
        anomalies.push(format!("{} events after end", after.events.len()));
    }
    let health = |snapshot: &Snapshot| snapshot.boss.as_ref().map(|boss| boss.health);
    if health(&after) != health(last) {
        anomalies.push("boss health changed after end".to_string());
    }
    if engine.pending_timers() != 0 {
        anomalies.push(format!("{} timers pending after end", engine.pending_timers()));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> io::Result<Vec<Scenario>> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(now_ms));
    let bots = if cli.coop { 2 } else { 1 };

    if cli.single || cli.settings.is_some() {
        let settings = match cli.settings.as_ref() {
            Some(path) => load_settings(path)?,
            None => MatchSettings::default(),
        };
        return Ok(vec![Scenario {
            name: format!("custom-bots{bots}"),
            seed,
            bots,
            settings,
        }]);
    }

    Ok(vec![
        Scenario {
            name: "solo-default".to_string(),
            seed,
            bots: 1,
            settings: MatchSettings::default(),
        },
        Scenario {
            name: "coop-no-shield".to_string(),
            seed: normalize_seed(seed as u64 + 1),
            bots: 2,
            settings: MatchSettings {
                boss_max_health: 40,
                shield_enabled: false,
                ..MatchSettings::default()
            },
        },
        Scenario {
            name: "dense-hazards".to_string(),
            seed: normalize_seed(seed as u64 + 2),
            bots: 1,
            settings: MatchSettings {
                hazard_size: 70.0,
                hazard_spawn_interval_ms: 1_500,
                hazard_warning_time_ms: 1_200,
                boss_max_health: 30,
                ..MatchSettings::default()
            },
        },
    ])
}

fn load_settings(path: &Path) -> io::Result<MatchSettings> {
    let raw = std::fs::read_to_string(path)?;
    MatchSettings::from_json(&raw).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} is not a settings object", path.to_string_lossy()),
        )
    })
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_duration_ms: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_duration_ms = if scenario_count == 0 {
        0
    } else {
        total_duration_ms / scenario_count as u64
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        scenario_count,
        anomaly_count,
        average_duration_ms,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => log::error!("structured log did not serialize: {error}"),
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boss_arena::types::{BossView, HazardPhase, HazardView, PlayerView};

    fn make_scenario_result(reason: &str, duration_ms: u64) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            bots: 1,
            outcome: None,
            reason: reason.to_string(),
            duration_ms,
            boss_health: 0,
            boss_max_health: 10,
            shots_fired: 0,
            shots_landed: 0,
            shots_blocked: 0,
            hazards_spawned: 0,
            powered_hits: 0,
            anomalies: Vec::new(),
        }
    }

    fn snapshot_with(player: (f32, f32), hazards: Vec<(f32, f32)>) -> Snapshot {
        Snapshot {
            tick: 1,
            now_ms: TICK_MS,
            phase: MatchPhase::Running,
            outcome: None,
            players: vec![PlayerView {
                id: "bot_1".to_string(),
                name: "BOT_1".to_string(),
                x: player.0,
                y: player.1,
                charged: false,
                cooldown_remaining_ms: 0,
                cooldown_fraction: 0.0,
                connected: true,
            }],
            boss: Some(BossView {
                x: 750.0,
                y: 300.0,
                health: 10,
                max_health: 10,
                health_fraction: 1.0,
                direction: 0,
                defeated: false,
            }),
            shield: None,
            projectiles: Vec::new(),
            hazards: hazards
                .into_iter()
                .enumerate()
                .map(|(idx, (x, y))| HazardView {
                    id: format!("hazard_{idx}"),
                    x,
                    y,
                    radius: 50.0,
                    phase: HazardPhase::Warning,
                    spawned_at_ms: 0,
                    activates_at_ms: 1_000,
                    despawn_at_ms: 6_000,
                })
                .collect(),
            events: Vec::new(),
            commands: Vec::new(),
        }
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_calculates_average_duration() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_scenario_result("lose", 60_000),
                make_scenario_result("win", 90_000),
            ],
            BTreeMap::from([("lose".to_string(), 1usize), ("win".to_string(), 1usize)]),
            1,
            150_000,
        );
        assert_eq!(summary.average_duration_ms, 75_000);
        assert_eq!(summary.scenario_count, 2);
        assert!(summary.finished_at.ends_with('Z'));
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("boss-arena-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_scenario_result("timeout", 60_000)],
            BTreeMap::from([("timeout".to_string(), 1usize)]),
            0,
            60_000,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut records, &mut seen, 10, "same".to_string());
        push_anomaly(&mut anomalies, &mut records, &mut seen, 11, "same".to_string());

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn bot_runs_away_from_nearby_zones() {
        let mut bot = Bot::new(0);
        let frame = bot.decide(&snapshot_with((300.0, 300.0), vec![(340.0, 330.0)]));
        let keys = frame.keys.expect("bot always steers");
        assert!(keys.left && keys.up);
        assert!(!keys.right && !keys.down);
    }

    #[test]
    fn bot_charges_every_other_shot() {
        let mut bot = Bot::new(0);
        let snapshot = snapshot_with((200.0, 300.0), Vec::new());
        let first = bot.decide(&snapshot);
        let second = bot.decide(&snapshot);
        assert!(first.fire && first.charge);
        assert!(second.fire && !second.charge);
        assert_eq!(first.keys, Some(HeldKeys::NONE));
    }

    #[test]
    fn health_regression_is_flagged() {
        let snapshot = snapshot_with((200.0, 300.0), Vec::new());
        assert!(collect_snapshot_anomalies(&snapshot, 10, 10).is_empty());
        assert_eq!(collect_snapshot_anomalies(&snapshot, 10, 9).len(), 1);
    }

    #[test]
    fn short_solo_scenario_wins_cleanly() {
        let scenario = Scenario {
            name: "test-solo".to_string(),
            seed: 99,
            bots: 1,
            settings: MatchSettings {
                boss_max_health: 3,
                shield_enabled: false,
                hazard_spawn_interval_ms: 600_000,
                ..MatchSettings::default()
            },
        };
        let run = run_scenario(&scenario, 60);
        assert_eq!(run.result.outcome, Some(Outcome::Win));
        assert!(run.result.anomalies.is_empty(), "{:?}", run.result.anomalies);
        assert_eq!(run.result.powered_hits, 1);
        assert_eq!(run.result.shots_landed, 2);
    }
}
