use async_trait::async_trait;
use hashtalk_core::{ParticipantId, Role, RoomId, ServerMessage, SignalEnvelope};
use hashtalk_server::SignalingOutput;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

/// A message the lobby addressed to one participant.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub to: ParticipantId,
    pub message: ServerMessage,
}

/// Mock SignalingOutput that captures everything the lobby sends.
///
/// # Example
///
/// ```ignore
/// let (signaling, mut rx) = MockSignalingOutput::new();
///
/// // ... lobby pairs two participants ...
///
/// if let Some(Outbound { to, message: ServerMessage::Matched { .. } }) = rx.recv().await {
///     // inspect the assignment
/// }
/// ```
#[derive(Clone)]
pub struct MockSignalingOutput {
    /// Channel to stream captured messages.
    tx: mpsc::UnboundedSender<Outbound>,
    /// All captured messages (for verification).
    sent: Arc<Mutex<Vec<Outbound>>>,
}

impl MockSignalingOutput {
    /// Create a new MockSignalingOutput and its receiver channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    /// All messages captured so far, in send order.
    pub async fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().await.clone()
    }

    /// Messages addressed to one participant, in send order.
    pub async fn sent_to(&self, participant_id: &ParticipantId) -> Vec<ServerMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|o| &o.to == participant_id)
            .map(|o| o.message.clone())
            .collect()
    }

    /// Number of `peer-left` frames delivered to a participant.
    pub async fn peer_left_count(&self, participant_id: &ParticipantId) -> usize {
        self.sent_to(participant_id)
            .await
            .iter()
            .filter(|m| matches!(m, ServerMessage::PeerLeft { .. }))
            .count()
    }

    async fn capture(&self, to: ParticipantId, message: ServerMessage) {
        tracing::debug!("[MockSignaling] {:?} -> {}", message, to);

        let outbound = Outbound { to, message };
        self.sent.lock().await.push(outbound.clone());
        let _ = self.tx.send(outbound);
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send_matched(
        &self,
        participant_id: ParticipantId,
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
    ) {
        let message = ServerMessage::Matched {
            room_id,
            role,
            peer_id,
        };
        self.capture(participant_id, message).await;
    }

    async fn send_signal(&self, envelope: SignalEnvelope) {
        let to = envelope.to_participant.clone();
        self.capture(to, envelope.into()).await;
    }

    async fn send_peer_left(&self, participant_id: ParticipantId, room_id: RoomId) {
        self.capture(participant_id, ServerMessage::PeerLeft { room_id })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_signaling_captures_peer_left() {
        let (signaling, mut rx) = MockSignalingOutput::new();
        let participant_id = ParticipantId::new();
        let room_id = RoomId::new();

        signaling
            .send_peer_left(participant_id.clone(), room_id)
            .await;

        let captured = rx.recv().await.unwrap();
        assert_eq!(captured.to, participant_id);
        assert_eq!(signaling.peer_left_count(&participant_id).await, 1);
    }
}
