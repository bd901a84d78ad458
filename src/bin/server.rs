use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use boss_arena::constants::TICK_MS;
use boss_arena::engine::MatchEngine;
use boss_arena::server_protocol::{parse_client_message, ParsedClientMessage};
use boss_arena::server_utils::{is_supported_room, sanitize_name, sanitize_participant_id};
use boss_arena::settings::MatchSettings;
use boss_arena::sync::{Role, SyncAdapter, SyncReport};
use boss_arena::types::{MatchPhase, StartParticipant};
use chrono::{SecondsFormat, Utc};
use futures_util::{SinkExt, StreamExt};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tower_http::services::{ServeDir, ServeFile};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

type SharedState = Arc<Mutex<ServerState>>;

#[derive(Clone)]
struct ClientContext {
    tx: mpsc::Sender<OutboundMessage>,
    participant_id: Option<String>,
}

#[derive(Clone, Debug)]
enum OutboundMessage {
    Text(String),
    Close { code: u16, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePolicy {
    DropOnFull,
    DisconnectOnFull,
}

struct ServerState {
    clients: HashMap<String, ClientContext>,
    active_client_by_participant: HashMap<String, String>,
    names: HashMap<String, String>,
    sync: SyncAdapter,
    engine: MatchEngine,
}

impl ServerState {
    fn new() -> Self {
        Self {
            clients: HashMap::new(),
            active_client_by_participant: HashMap::new(),
            names: HashMap::new(),
            sync: SyncAdapter::new(),
            engine: MatchEngine::new(rand::random()),
        }
    }

    fn participant_of(&self, client_id: &str) -> Option<String> {
        self.clients
            .get(client_id)
            .and_then(|ctx| ctx.participant_id.clone())
    }

    fn name_of(&self, participant_id: &str) -> String {
        self.names
            .get(participant_id)
            .cloned()
            .unwrap_or_else(|| "Player".to_string())
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let state = Arc::new(Mutex::new(ServerState::new()));
    start_tick_loop(state.clone());

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(state);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        log::info!("static file root: {}", static_dir.to_string_lossy());
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        log::warn!("static file root not found; serving the websocket endpoint only");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    log::info!("listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("dist/client"), PathBuf::from("public")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: SharedState, socket: WebSocket) {
    let client_id = make_id("client");
    let (tx, mut rx) = mpsc::channel::<OutboundMessage>(256);

    {
        let mut guard = state.lock().await;
        guard.clients.insert(
            client_id.clone(),
            ClientContext {
                tx: tx.clone(),
                participant_id: None,
            },
        );
    }

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let should_close = matches!(outbound, OutboundMessage::Close { .. });
            let result = match outbound {
                OutboundMessage::Text(payload) => {
                    ws_sender.send(Message::Text(payload.into())).await
                }
                OutboundMessage::Close { code, reason } => {
                    let frame = CloseFrame {
                        code,
                        reason: reason.into(),
                    };
                    ws_sender.send(Message::Close(Some(frame))).await
                }
            };
            if result.is_err() || should_close {
                break;
            }
        }
    });

    while let Some(received) = ws_receiver.next().await {
        let Ok(message) = received else {
            break;
        };

        match message {
            Message::Text(raw) => {
                handle_client_message(state.clone(), &client_id, raw.to_string()).await;
            }
            Message::Binary(raw) => {
                if let Ok(text) = String::from_utf8(raw.to_vec()) {
                    handle_client_message(state.clone(), &client_id, text).await;
                } else {
                    send_error_to_client(&state, &client_id, "invalid utf8 message").await;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    handle_disconnect(state, &client_id).await;
    drop(tx);
    let _ = writer.await;
}

async fn handle_client_message(state: SharedState, client_id: &str, raw: String) {
    let Some(message) = parse_client_message(&raw) else {
        send_error_to_client(&state, client_id, "invalid message").await;
        return;
    };

    let mut guard = state.lock().await;
    match message {
        ParsedClientMessage::Join {
            participant_id,
            name,
            room_id,
        } => {
            handle_join(&mut guard, client_id, participant_id, name, room_id);
        }
        ParsedClientMessage::Ping { t } => {
            send_to_client(
                &mut guard,
                client_id,
                &json!({
                    "type": "pong",
                    "t": t,
                }),
                QueuePolicy::DisconnectOnFull,
            );
        }
        ParsedClientMessage::Configure { settings } => {
            let Some(participant_id) = guard.participant_of(client_id) else {
                send_error(&mut guard, client_id, "join first");
                return;
            };
            handle_configure(&mut guard, client_id, &participant_id, settings);
        }
        ParsedClientMessage::Control { payload } => {
            let Some(participant_id) = guard.participant_of(client_id) else {
                send_error(&mut guard, client_id, "join first");
                return;
            };
            handle_control(&mut guard, client_id, &participant_id, payload);
        }
        ParsedClientMessage::Restart => {
            let Some(participant_id) = guard.participant_of(client_id) else {
                send_error(&mut guard, client_id, "join first");
                return;
            };
            handle_restart(&mut guard, client_id, &participant_id);
        }
    }
}

fn handle_join(
    state: &mut ServerState,
    client_id: &str,
    requested_id: Option<String>,
    requested_name: Option<String>,
    requested_room_id: Option<String>,
) {
    if !is_supported_room(requested_room_id.as_deref()) {
        send_error(state, client_id, "only the 'main' room exists");
        return;
    }

    let participant_id = match requested_id {
        Some(raw) => {
            let Some(id) = sanitize_participant_id(&raw) else {
                send_error(state, client_id, "invalid participantId");
                return;
            };
            id
        }
        None => state
            .participant_of(client_id)
            .unwrap_or_else(make_participant_id),
    };

    if state.engine.phase() != MatchPhase::Configuring && !state.engine.has_player(&participant_id)
    {
        send_error(state, client_id, "match already running; rejoin only");
        return;
    }

    let assignment = match state.sync.join(&participant_id) {
        Ok(assignment) => assignment,
        Err(err) => {
            send_error(state, client_id, &err.to_string());
            return;
        }
    };

    state.names.insert(
        participant_id.clone(),
        sanitize_name(requested_name.as_deref().unwrap_or_default()),
    );
    bind_client_to_participant(state, client_id, &participant_id);

    send_to_client(
        state,
        client_id,
        &json!({
            "type": "assignment",
            "participantId": assignment.participant_id,
            "isHost": assignment.is_host,
            "peerId": assignment.peer_id,
        }),
        QueuePolicy::DisconnectOnFull,
    );

    if state.engine.phase() != MatchPhase::Configuring {
        let started = match_started_message(state);
        send_to_client(state, client_id, &started, QueuePolicy::DisconnectOnFull);
        let snapshot = state.engine.build_snapshot(false);
        send_to_client(
            state,
            client_id,
            &json!({
                "type": "state",
                "snapshot": snapshot,
            }),
            QueuePolicy::DisconnectOnFull,
        );
    }

    publish_sync_reports(state);
    broadcast_lobby(state);
}

fn handle_configure(
    state: &mut ServerState,
    client_id: &str,
    participant_id: &str,
    settings: MatchSettings,
) {
    if state.sync.role_of(participant_id) != Some(Role::Host) {
        send_error(state, client_id, "only host can configure");
        return;
    }
    if state.engine.phase() != MatchPhase::Configuring {
        send_error(state, client_id, "match is not in configuration");
        return;
    }

    let participants: Vec<StartParticipant> = state
        .sync
        .participants()
        .into_iter()
        .filter(|id| state.sync.is_connected(id))
        .map(|id| StartParticipant {
            name: state.name_of(&id),
            id,
        })
        .collect();

    let mut engine = MatchEngine::new(rand::random());
    if !engine.start(&settings, participants) {
        send_error(state, client_id, "failed to start match");
        return;
    }
    state.engine = engine;

    let started = match_started_message(state);
    broadcast(state, &started, QueuePolicy::DisconnectOnFull);
    broadcast_lobby(state);
}

fn handle_control(state: &mut ServerState, client_id: &str, participant_id: &str, payload: Value) {
    let relay = payload.clone();
    if let Err(err) = state.sync.receive_value(participant_id, payload) {
        send_error(state, client_id, &err.to_string());
        state.sync.drain_reports();
        return;
    }

    let peer_client = state
        .sync
        .peer_of(participant_id)
        .and_then(|peer_id| state.active_client_by_participant.get(peer_id))
        .cloned();
    if let Some(peer_client) = peer_client {
        send_to_client(
            state,
            &peer_client,
            &json!({
                "type": "peer_control",
                "from": participant_id,
                "delta": relay,
            }),
            QueuePolicy::DropOnFull,
        );
    }
}

fn handle_restart(state: &mut ServerState, client_id: &str, participant_id: &str) {
    if state.sync.role_of(participant_id) != Some(Role::Host) {
        send_error(state, client_id, "only host can restart");
        return;
    }
    if !state.engine.restart() {
        send_error(state, client_id, "match has not ended");
        return;
    }
    state.sync.reset_sequences();
    for gone in state.sync.vacate_disconnected() {
        state.names.remove(&gone);
    }

    let snapshot = state.engine.build_snapshot(true);
    broadcast(
        state,
        &json!({
            "type": "state",
            "snapshot": snapshot,
        }),
        QueuePolicy::DisconnectOnFull,
    );
    publish_sync_reports(state);
    broadcast_lobby(state);
}

async fn handle_disconnect(state: SharedState, client_id: &str) {
    let mut guard = state.lock().await;
    disconnect_client_internal(&mut guard, client_id, true);
}

fn disconnect_client_internal(state: &mut ServerState, client_id: &str, broadcast_after: bool) {
    let Some(context) = state.clients.remove(client_id) else {
        return;
    };
    let Some(bound_participant_id) = context.participant_id else {
        return;
    };

    if state
        .active_client_by_participant
        .get(&bound_participant_id)
        .map(|active| active != client_id)
        .unwrap_or(true)
    {
        return;
    }
    state
        .active_client_by_participant
        .remove(&bound_participant_id);

    state.sync.disconnect(&bound_participant_id);
    if state.engine.phase() == MatchPhase::Configuring {
        state.sync.vacate(&bound_participant_id);
        state.names.remove(&bound_participant_id);
    }

    if broadcast_after {
        publish_sync_reports(state);
        broadcast_lobby(state);
    }
}

fn bind_client_to_participant(state: &mut ServerState, client_id: &str, participant_id: &str) {
    if let Some(old_client_id) = state
        .active_client_by_participant
        .get(participant_id)
        .cloned()
    {
        if old_client_id != client_id {
            if let Some(old_client) = state.clients.get_mut(&old_client_id) {
                old_client.participant_id = None;
                let _ = old_client.tx.try_send(OutboundMessage::Close {
                    code: 4001,
                    reason: "superseded by new connection".to_string(),
                });
            }
        }
    }

    let previous = state.participant_of(client_id);
    if let Some(previous) = previous {
        if previous != participant_id {
            state.active_client_by_participant.remove(&previous);
        }
    }

    if let Some(ctx) = state.clients.get_mut(client_id) {
        ctx.participant_id = Some(participant_id.to_string());
    }
    state
        .active_client_by_participant
        .insert(participant_id.to_string(), client_id.to_string());
}

fn publish_sync_reports(state: &mut ServerState) {
    for report in state.sync.drain_reports() {
        match report {
            SyncReport::PeerJoined {
                participant_id,
                role: Role::Guest,
            } => {
                let host_client = state
                    .sync
                    .host_id()
                    .and_then(|host_id| state.active_client_by_participant.get(host_id))
                    .cloned();
                if let Some(host_client) = host_client {
                    send_to_client(
                        state,
                        &host_client,
                        &json!({
                            "type": "peer_joined",
                            "peerId": participant_id,
                        }),
                        QueuePolicy::DisconnectOnFull,
                    );
                }
            }
            SyncReport::PeerJoined { .. } => {}
            SyncReport::PeerRejoined { participant_id, .. } => {
                broadcast(
                    state,
                    &json!({
                        "type": "peer_rejoined",
                        "peerId": participant_id,
                    }),
                    QueuePolicy::DisconnectOnFull,
                );
            }
            SyncReport::PeerDisconnected { participant_id } => {
                broadcast(
                    state,
                    &json!({
                        "type": "peer_left",
                        "peerId": participant_id,
                    }),
                    QueuePolicy::DisconnectOnFull,
                );
            }
            SyncReport::HostPromoted { participant_id } => {
                broadcast(
                    state,
                    &json!({
                        "type": "host_changed",
                        "hostId": participant_id,
                    }),
                    QueuePolicy::DisconnectOnFull,
                );
            }
            SyncReport::Rejected {
                participant_id,
                error,
            } => {
                log::debug!("sync rejected {participant_id}: {error}");
            }
        }
    }
}

fn match_started_message(state: &ServerState) -> Value {
    let participants: Vec<Value> = state
        .sync
        .participants()
        .into_iter()
        .filter(|id| state.engine.has_player(id))
        .map(|id| {
            json!({
                "id": id,
                "name": state.name_of(&id),
            })
        })
        .collect();
    json!({
        "type": "match_started",
        "settings": state.engine.settings(),
        "seed": state.engine.seed(),
        "startedAtMs": state.engine.started_at_ms,
        "participants": participants,
    })
}

fn broadcast_lobby(state: &mut ServerState) {
    let host_id = state.sync.host_id().map(str::to_string);
    let participants: Vec<Value> = state
        .sync
        .participants()
        .into_iter()
        .map(|id| {
            json!({
                "id": id,
                "name": state.name_of(&id),
                "connected": state.sync.is_connected(&id),
                "isHost": host_id.as_deref() == Some(id.as_str()),
            })
        })
        .collect();
    let can_configure = state.engine.phase() == MatchPhase::Configuring
        && host_id
            .as_deref()
            .is_some_and(|id| state.sync.is_connected(id));

    broadcast(
        state,
        &json!({
            "type": "lobby",
            "hostId": host_id,
            "phase": state.engine.phase(),
            "participants": participants,
            "canConfigure": can_configure,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

fn start_tick_loop(state: SharedState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(TICK_MS));
        loop {
            interval.tick().await;
            let mut guard = state.lock().await;
            tick_match(&mut guard);
        }
    });
}

fn tick_match(state: &mut ServerState) {
    if state.engine.phase() != MatchPhase::Running {
        return;
    }
    state.sync.flush_into(&mut state.engine);
    state.engine.step(TICK_MS);
    let snapshot = state.engine.build_snapshot(true);

    broadcast(
        state,
        &json!({
            "type": "state",
            "snapshot": snapshot,
        }),
        QueuePolicy::DropOnFull,
    );

    let Some(outcome_event) = state.engine.take_outcome_event() else {
        return;
    };
    let summary = state.engine.build_summary();
    log::info!(
        "match over: {} ({} shots, {} landed)",
        outcome_event.outcome.as_str(),
        summary.shots_fired,
        summary.shots_landed
    );
    broadcast(
        state,
        &json!({
            "type": "game_over",
            "outcome": outcome_event.outcome,
            "result": state.engine.result(),
            "summary": summary,
            "finishedAt": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
        QueuePolicy::DisconnectOnFull,
    );
    broadcast_lobby(state);
}

fn send_to_client(state: &mut ServerState, client_id: &str, message: &Value, policy: QueuePolicy) {
    let send_failed = if let Some(client) = state.clients.get(client_id) {
        client
            .tx
            .try_send(OutboundMessage::Text(message.to_string()))
            .is_err()
    } else {
        false
    };
    if send_failed && policy == QueuePolicy::DisconnectOnFull {
        disconnect_client_internal(state, client_id, false);
    }
}

fn broadcast(state: &mut ServerState, message: &Value, policy: QueuePolicy) {
    let payload = message.to_string();
    let client_ids: Vec<String> = state.clients.keys().cloned().collect();
    let mut failed_clients = Vec::new();
    for client_id in client_ids {
        let Some(client) = state.clients.get(&client_id) else {
            continue;
        };
        if !can_receive_broadcast(state, &client_id, client) {
            continue;
        }
        if client
            .tx
            .try_send(OutboundMessage::Text(payload.clone()))
            .is_err()
            && policy == QueuePolicy::DisconnectOnFull
        {
            failed_clients.push(client_id);
        }
    }
    if policy == QueuePolicy::DisconnectOnFull {
        for client_id in failed_clients {
            disconnect_client_internal(state, &client_id, false);
        }
    }
}

fn can_receive_broadcast(state: &ServerState, client_id: &str, client: &ClientContext) -> bool {
    let Some(participant_id) = client.participant_id.as_ref() else {
        return false;
    };
    state
        .active_client_by_participant
        .get(participant_id)
        .map(|id| id.as_str())
        == Some(client_id)
}

fn send_error(state: &mut ServerState, client_id: &str, message: &str) {
    send_to_client(
        state,
        client_id,
        &json!({
            "type": "error",
            "message": message,
        }),
        QueuePolicy::DisconnectOnFull,
    );
}

async fn send_error_to_client(state: &SharedState, client_id: &str, message: &str) {
    let mut guard = state.lock().await;
    send_error(&mut guard, client_id, message);
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}

fn make_participant_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(10)
        .map(char::from)
        .collect();
    format!("p-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connect(state: &mut ServerState) -> (String, mpsc::Receiver<OutboundMessage>) {
        let client_id = make_id("client");
        let (tx, rx) = mpsc::channel(64);
        state.clients.insert(
            client_id.clone(),
            ClientContext {
                tx,
                participant_id: None,
            },
        );
        (client_id, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let OutboundMessage::Text(raw) = message {
                messages.push(serde_json::from_str(&raw).expect("server sends json"));
            }
        }
        messages
    }

    fn of_type<'a>(messages: &'a [Value], kind: &str) -> Vec<&'a Value> {
        messages
            .iter()
            .filter(|message| message["type"] == kind)
            .collect()
    }

    #[test]
    fn generated_participant_ids_pass_sanitizing() {
        let id = make_participant_id();
        assert_eq!(sanitize_participant_id(&id), Some(id.clone()));
    }

    #[test]
    fn join_assigns_host_then_guest_and_tells_the_host() {
        let mut state = ServerState::new();
        let (host, mut host_rx) = connect(&mut state);
        let (guest, mut guest_rx) = connect(&mut state);
        let (third, mut third_rx) = connect(&mut state);

        handle_join(&mut state, &host, Some("alice".into()), Some("Alice".into()), None);
        handle_join(&mut state, &guest, Some("bob".into()), None, None);
        handle_join(&mut state, &third, Some("carol".into()), None, None);

        let host_messages = drain(&mut host_rx);
        let assignment = of_type(&host_messages, "assignment");
        assert_eq!(assignment[0]["isHost"], true);
        assert_eq!(of_type(&host_messages, "peer_joined")[0]["peerId"], "bob");

        let guest_messages = drain(&mut guest_rx);
        let assignment = of_type(&guest_messages, "assignment");
        assert_eq!(assignment[0]["isHost"], false);
        assert_eq!(assignment[0]["peerId"], "alice");

        let third_messages = drain(&mut third_rx);
        assert_eq!(of_type(&third_messages, "error")[0]["message"], "room is full");
    }

    #[test]
    fn only_host_configures_and_match_runs_to_state_broadcasts() {
        let mut state = ServerState::new();
        let (host, mut host_rx) = connect(&mut state);
        let (guest, mut guest_rx) = connect(&mut state);
        handle_join(&mut state, &host, Some("alice".into()), None, None);
        handle_join(&mut state, &guest, Some("bob".into()), None, None);
        drain(&mut host_rx);
        drain(&mut guest_rx);

        handle_configure(&mut state, &guest, "bob", MatchSettings::default());
        assert_eq!(state.engine.phase(), MatchPhase::Configuring);
        assert_eq!(
            of_type(&drain(&mut guest_rx), "error")[0]["message"],
            "only host can configure"
        );

        handle_configure(&mut state, &host, "alice", MatchSettings::default());
        assert_eq!(state.engine.phase(), MatchPhase::Running);
        let started = drain(&mut guest_rx);
        assert_eq!(of_type(&started, "match_started")[0]["participants"].as_array().map(Vec::len), Some(2));

        handle_control(
            &mut state,
            &guest,
            "bob",
            json!({"type": "control", "seq": 1, "fire": true}),
        );
        assert_eq!(of_type(&drain(&mut host_rx), "peer_control")[0]["from"], "bob");
        tick_match(&mut state);
        assert_eq!(state.engine.projectile_count(), 1);
        assert!(!of_type(&drain(&mut guest_rx), "state").is_empty());
    }

    #[test]
    fn guest_disconnect_is_reported_and_match_continues() {
        let mut state = ServerState::new();
        let (host, mut host_rx) = connect(&mut state);
        let (guest, _guest_rx) = connect(&mut state);
        handle_join(&mut state, &host, Some("alice".into()), None, None);
        handle_join(&mut state, &guest, Some("bob".into()), None, None);
        handle_configure(&mut state, &host, "alice", MatchSettings::default());
        drain(&mut host_rx);

        disconnect_client_internal(&mut state, &guest, true);
        let messages = drain(&mut host_rx);
        assert_eq!(of_type(&messages, "peer_left")[0]["peerId"], "bob");
        tick_match(&mut state);
        assert_eq!(state.engine.phase(), MatchPhase::Running);

        let (late, mut late_rx) = connect(&mut state);
        handle_join(&mut state, &late, Some("carol".into()), None, None);
        assert_eq!(
            of_type(&drain(&mut late_rx), "error")[0]["message"],
            "match already running; rejoin only"
        );
    }

    #[test]
    fn game_over_carries_result_and_summary_once() {
        let mut state = ServerState::new();
        let (host, mut host_rx) = connect(&mut state);
        handle_join(&mut state, &host, Some("alice".into()), None, None);
        handle_configure(
            &mut state,
            &host,
            "alice",
            MatchSettings {
                boss_max_health: 1,
                shield_enabled: false,
                ..MatchSettings::default()
            },
        );
        handle_control(
            &mut state,
            &host,
            "alice",
            json!({"type": "control", "seq": 1, "fire": true}),
        );
        let mut messages = Vec::new();
        for _ in 0..300 {
            tick_match(&mut state);
            messages.extend(drain(&mut host_rx));
            if state.engine.is_ended() {
                break;
            }
        }
        tick_match(&mut state);
        messages.extend(drain(&mut host_rx));

        let over = of_type(&messages, "game_over");
        assert_eq!(over.len(), 1);
        assert_eq!(over[0]["outcome"], "win");
        assert_eq!(over[0]["result"]["outcome"], "win");
        assert_eq!(over[0]["result"]["atMs"], over[0]["summary"]["durationMs"]);
    }
}
