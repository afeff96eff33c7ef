use async_trait::async_trait;
use hashtalk_core::{ParticipantId, Role, RoomId, SignalEnvelope};

/// Sink the lobby uses to reach participants.
///
/// Implementations must not block the caller on network I/O and must keep
/// per-recipient send order.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send_matched(
        &self,
        participant_id: ParticipantId,
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
    );

    async fn send_signal(&self, envelope: SignalEnvelope);

    async fn send_peer_left(&self, participant_id: ParticipantId, room_id: RoomId);
}
