use hashtalk_core::{ParticipantId, Role, RoomId, SignalEnvelope};

/// An outbound notification produced by the matchmaker or the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Matched {
        to: ParticipantId,
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
    },
    Signal(SignalEnvelope),
    PeerLeft {
        to: ParticipantId,
        room_id: RoomId,
    },
}

