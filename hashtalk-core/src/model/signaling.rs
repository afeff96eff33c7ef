use crate::model::participant::ParticipantId;
use crate::model::room::{Role, RoomId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Offer => f.write_str("offer"),
            SignalKind::Answer => f.write_str("answer"),
            SignalKind::Candidate => f.write_str("candidate"),
        }
    }
}

/// A negotiation message on its way from one room member to the other.
///
/// The relay never looks inside `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalEnvelope {
    pub room_id: RoomId,
    pub from_participant: ParticipantId,
    pub to_participant: ParticipantId,
    pub kind: SignalKind,
    pub payload: Value,
}

/// Frames sent by a participant to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    Join {},
    Signal {
        room_id: RoomId,
        kind: SignalKind,
        payload: Value,
    },
    Leave {},
}

/// Frames sent by the relay to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "op",
    content = "d",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    Welcome {
        participant_id: ParticipantId,
        ice_servers: Vec<IceServerConfig>,
        auto_requeue: bool,
    },
    Matched {
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
    },
    Signal {
        room_id: RoomId,
        from: ParticipantId,
        kind: SignalKind,
        payload: Value,
    },
    PeerLeft {
        room_id: RoomId,
    },
}

impl From<SignalEnvelope> for ServerMessage {
    fn from(envelope: SignalEnvelope) -> Self {
        ServerMessage::Signal {
            room_id: envelope.room_id,
            from: envelope.from_participant,
            kind: envelope.kind,
            payload: envelope.payload,
        }
    }
}
