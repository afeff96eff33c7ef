use crate::relay::RelayStats;
use hashtalk_core::{ParticipantId, RoomId, SignalKind};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

/// Commands fed into the lobby by the signaling endpoint.
#[derive(Debug)]
pub enum LobbyCommand {
    /// A transport session opened.
    Connect { participant_id: ParticipantId },

    /// The participant wants a partner.
    Join { participant_id: ParticipantId },

    /// A negotiation message for the other member of `room_id`.
    Signal {
        participant_id: ParticipantId,
        room_id: RoomId,
        kind: SignalKind,
        payload: Value,
    },

    /// "Next": leave the current room or the waiting pool.
    Leave { participant_id: ParticipantId },

    /// The transport session closed.
    Disconnect { participant_id: ParticipantId },

    /// A frame from this participant could not be decoded.
    Malformed { participant_id: ParticipantId },

    Stats { reply: oneshot::Sender<LobbyStats> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LobbyStats {
    pub participants: usize,
    pub waiting: usize,
    pub rooms: usize,
    pub relay: RelayStats,
}
