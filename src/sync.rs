//! Two-seat session plumbing
//!
//! Pairs at most two participants (host and guest), accepts their control
//! deltas in any order, and hands the merged result to the engine at the
//! start of the next tick. Nothing here touches simulation state directly.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::MatchEngine;
use crate::types::{HeldKeys, InputFrame};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Host,
    Guest,
}

/// Reply to a join request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Assignment {
    #[serde(rename = "participantId")]
    pub participant_id: String,
    #[serde(rename = "isHost")]
    pub is_host: bool,
    #[serde(rename = "peerId")]
    pub peer_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncError {
    RoomFull,
    UnknownParticipant(String),
    Malformed(String),
    StaleDelta {
        participant_id: String,
        seq: u64,
        last_seq: u64,
    },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomFull => write!(f, "room is full"),
            Self::UnknownParticipant(id) => write!(f, "unknown participant {id}"),
            Self::Malformed(reason) => write!(f, "malformed control delta: {reason}"),
            Self::StaleDelta {
                participant_id,
                seq,
                last_seq,
            } => write!(
                f,
                "stale delta from {participant_id}: seq {seq} <= {last_seq}"
            ),
        }
    }
}

impl std::error::Error for SyncError {}

/// Control state sent by one participant. Only the fields present change
/// anything; `fire` and `charge` are one-shot presses.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct ControlDelta {
    pub seq: u64,
    #[serde(default)]
    pub keys: Option<HeldKeys>,
    #[serde(default)]
    pub fire: bool,
    #[serde(default)]
    pub charge: bool,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
}

impl ControlDelta {
    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        let delta: Self =
            serde_json::from_value(value).map_err(|err| SyncError::Malformed(err.to_string()))?;
        match (delta.x, delta.y) {
            (Some(x), Some(y)) if !x.is_finite() || !y.is_finite() => {
                Err(SyncError::Malformed("position is not finite".to_string()))
            }
            (Some(_), None) | (None, Some(_)) => Err(SyncError::Malformed(
                "position needs both x and y".to_string(),
            )),
            _ => Ok(delta),
        }
    }

    fn position(&self) -> Option<(f32, f32)> {
        self.x.zip(self.y)
    }
}

/// What happened to the session since the last drain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncReport {
    PeerJoined { participant_id: String, role: Role },
    PeerRejoined { participant_id: String, role: Role },
    PeerDisconnected { participant_id: String },
    HostPromoted { participant_id: String },
    Rejected {
        participant_id: String,
        error: SyncError,
    },
}

#[derive(Clone, Debug)]
struct Seat {
    participant_id: String,
    connected: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PendingControl {
    keys: Option<HeldKeys>,
    fire: bool,
    charge: bool,
    position: Option<(f32, f32)>,
}

impl PendingControl {
    fn merge(&mut self, delta: &ControlDelta) {
        if delta.keys.is_some() {
            self.keys = delta.keys;
        }
        if let Some(position) = delta.position() {
            self.position = Some(position);
        }
        self.fire |= delta.fire;
        self.charge |= delta.charge;
    }

    fn into_frame(self) -> InputFrame {
        InputFrame {
            keys: self.keys,
            fire: self.fire,
            charge: self.charge,
            position: self.position,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SyncAdapter {
    host: Option<Seat>,
    guest: Option<Seat>,
    inbox: BTreeMap<String, PendingControl>,
    last_seq: HashMap<String, u64>,
    connection_changes: Vec<(String, bool)>,
    reports: Vec<SyncReport>,
}

impl SyncAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// First joiner hosts, second is the guest, anyone else is turned away.
    /// A known id gets its old seat back.
    pub fn join(&mut self, participant_id: &str) -> Result<Assignment, SyncError> {
        if let Some(role) = self.role_of(participant_id) {
            if let Some(seat) = self.seat_mut(role) {
                seat.connected = true;
            }
            self.last_seq.remove(participant_id);
            self.connection_changes
                .push((participant_id.to_string(), true));
            self.reports.push(SyncReport::PeerRejoined {
                participant_id: participant_id.to_string(),
                role,
            });
            log::info!("{participant_id} rejoined as {role:?}");
            return self
                .assignment(participant_id)
                .ok_or_else(|| SyncError::UnknownParticipant(participant_id.to_string()));
        }

        let seat = Seat {
            participant_id: participant_id.to_string(),
            connected: true,
        };
        let role = if self.host.is_none() {
            self.host = Some(seat);
            Role::Host
        } else if self.guest.is_none() {
            self.guest = Some(seat);
            Role::Guest
        } else {
            log::warn!("{participant_id} rejected: room full");
            self.reports.push(SyncReport::Rejected {
                participant_id: participant_id.to_string(),
                error: SyncError::RoomFull,
            });
            return Err(SyncError::RoomFull);
        };
        self.reports.push(SyncReport::PeerJoined {
            participant_id: participant_id.to_string(),
            role,
        });
        log::info!("{participant_id} joined as {role:?}");
        self.assignment(participant_id)
            .ok_or_else(|| SyncError::UnknownParticipant(participant_id.to_string()))
    }

    pub fn assignment(&self, participant_id: &str) -> Option<Assignment> {
        let role = self.role_of(participant_id)?;
        Some(Assignment {
            participant_id: participant_id.to_string(),
            is_host: role == Role::Host,
            peer_id: self.peer_of(participant_id).map(str::to_string),
        })
    }

    pub fn role_of(&self, participant_id: &str) -> Option<Role> {
        let holds = |seat: &Option<Seat>| {
            seat.as_ref()
                .is_some_and(|seat| seat.participant_id == participant_id)
        };
        if holds(&self.host) {
            Some(Role::Host)
        } else if holds(&self.guest) {
            Some(Role::Guest)
        } else {
            None
        }
    }

    pub fn peer_of(&self, participant_id: &str) -> Option<&str> {
        let other = match self.role_of(participant_id)? {
            Role::Host => self.guest.as_ref(),
            Role::Guest => self.host.as_ref(),
        };
        other.map(|seat| seat.participant_id.as_str())
    }

    pub fn host_id(&self) -> Option<&str> {
        self.host.as_ref().map(|seat| seat.participant_id.as_str())
    }

    pub fn is_connected(&self, participant_id: &str) -> bool {
        self.role_of(participant_id)
            .and_then(|role| self.seat(role))
            .is_some_and(|seat| seat.connected)
    }

    /// Seated participants, host first.
    pub fn participants(&self) -> Vec<String> {
        [self.host.as_ref(), self.guest.as_ref()]
            .into_iter()
            .flatten()
            .map(|seat| seat.participant_id.clone())
            .collect()
    }

    /// Queues a delta for the next tick. Stale sequence numbers are dropped.
    pub fn receive(&mut self, from: &str, delta: ControlDelta) -> Result<(), SyncError> {
        if self.role_of(from).is_none() {
            return Err(self.reject(from, SyncError::UnknownParticipant(from.to_string())));
        }
        if let Some(&last_seq) = self.last_seq.get(from) {
            if delta.seq <= last_seq {
                return Err(self.reject(
                    from,
                    SyncError::StaleDelta {
                        participant_id: from.to_string(),
                        seq: delta.seq,
                        last_seq,
                    },
                ));
            }
        }
        self.last_seq.insert(from.to_string(), delta.seq);
        self.inbox
            .entry(from.to_string())
            .or_default()
            .merge(&delta);
        Ok(())
    }

    /// Parses and queues a raw delta. Returns the accepted delta so the
    /// caller can relay it to the peer.
    pub fn receive_value(&mut self, from: &str, value: Value) -> Result<ControlDelta, SyncError> {
        let delta = match ControlDelta::from_value(value) {
            Ok(delta) => delta,
            Err(err) => return Err(self.reject(from, err)),
        };
        self.receive(from, delta.clone())?;
        Ok(delta)
    }

    /// Marks the participant gone and queues neutral keys for them. The seat
    /// is kept so the same id can rejoin.
    pub fn disconnect(&mut self, participant_id: &str) -> Option<SyncReport> {
        let role = self.role_of(participant_id)?;
        let seat = self.seat_mut(role)?;
        if !seat.connected {
            return None;
        }
        seat.connected = false;
        self.inbox.insert(
            participant_id.to_string(),
            PendingControl {
                keys: Some(HeldKeys::NONE),
                ..PendingControl::default()
            },
        );
        self.connection_changes
            .push((participant_id.to_string(), false));
        let report = SyncReport::PeerDisconnected {
            participant_id: participant_id.to_string(),
        };
        self.reports.push(report.clone());
        log::warn!("{participant_id} disconnected");
        Some(report)
    }

    /// Frees the seat entirely. When the host leaves, the guest takes over
    /// and its id is returned.
    pub fn vacate(&mut self, participant_id: &str) -> Option<String> {
        let role = self.role_of(participant_id)?;
        self.inbox.remove(participant_id);
        self.last_seq.remove(participant_id);
        match role {
            Role::Guest => {
                self.guest = None;
                None
            }
            Role::Host => {
                self.host = self.guest.take();
                let promoted = self.host.as_ref()?.participant_id.clone();
                self.reports.push(SyncReport::HostPromoted {
                    participant_id: promoted.clone(),
                });
                log::info!("{promoted} promoted to host");
                Some(promoted)
            }
        }
    }

    /// Drops seats whose participant is no longer connected.
    pub fn vacate_disconnected(&mut self) -> Vec<String> {
        let gone: Vec<String> = [self.host.as_ref(), self.guest.as_ref()]
            .into_iter()
            .flatten()
            .filter(|seat| !seat.connected)
            .map(|seat| seat.participant_id.clone())
            .collect();
        for participant_id in &gone {
            self.vacate(participant_id);
        }
        gone
    }

    /// Hands everything queued since the last tick to the engine. Call once,
    /// right before [`MatchEngine::step`].
    pub fn flush_into(&mut self, engine: &mut MatchEngine) -> usize {
        for (participant_id, connected) in self.connection_changes.drain(..) {
            engine.set_player_connection(&participant_id, connected);
        }
        let mut applied = 0;
        for (participant_id, pending) in std::mem::take(&mut self.inbox) {
            if engine.receive_input(&participant_id, pending.into_frame()) {
                applied += 1;
            }
        }
        applied
    }

    pub fn drain_reports(&mut self) -> Vec<SyncReport> {
        std::mem::take(&mut self.reports)
    }

    /// Forget sequence numbers and queued input, e.g. after a restart.
    pub fn reset_sequences(&mut self) {
        self.last_seq.clear();
        self.inbox.clear();
    }

    fn reject(&mut self, from: &str, error: SyncError) -> SyncError {
        log::warn!("control from {from} rejected: {error}");
        self.reports.push(SyncReport::Rejected {
            participant_id: from.to_string(),
            error: error.clone(),
        });
        error
    }

    fn seat(&self, role: Role) -> Option<&Seat> {
        match role {
            Role::Host => self.host.as_ref(),
            Role::Guest => self.guest.as_ref(),
        }
    }

    fn seat_mut(&mut self, role: Role) -> Option<&mut Seat> {
        match role {
            Role::Host => self.host.as_mut(),
            Role::Guest => self.guest.as_mut(),
        }
    }
}
