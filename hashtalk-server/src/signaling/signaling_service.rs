use crate::config::RequeuePolicy;
use crate::lobby::LobbyHandle;
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use hashtalk_core::{IceServerConfig, ParticipantId, Role, RoomId, ServerMessage, SignalEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    peers: DashMap<ParticipantId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
    requeue: RequeuePolicy,
}

/// Registry of open sockets, and the lobby's [`SignalingOutput`].
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) lobby: LobbyHandle,
}

impl SignalingService {
    pub fn new(
        lobby: LobbyHandle,
        ice_servers: Vec<IceServerConfig>,
        requeue: RequeuePolicy,
    ) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
                requeue,
            }),
            lobby,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub(crate) fn welcome(&self, participant_id: ParticipantId) -> ServerMessage {
        ServerMessage::Welcome {
            participant_id,
            ice_servers: self.get_ice_servers(),
            auto_requeue: self.inner.requeue == RequeuePolicy::Automatic,
        }
    }

    pub fn add_peer(&self, participant_id: ParticipantId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(participant_id, tx);
    }

    pub fn remove_peer(&self, participant_id: &ParticipantId) {
        self.inner.peers.remove(participant_id);
    }

    pub fn send_message(&self, participant_id: &ParticipantId, msg: &ServerMessage) {
        let Some(peer) = self.inner.peers.get(participant_id) else {
            debug!(
                "Attempted to send to disconnected participant {}",
                participant_id
            );
            return;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", participant_id, e);
                }
            }
            Err(e) => error!("Failed to serialize server message: {}", e),
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_matched(
        &self,
        participant_id: ParticipantId,
        room_id: RoomId,
        role: Role,
        peer_id: ParticipantId,
    ) {
        let msg = ServerMessage::Matched {
            room_id,
            role,
            peer_id,
        };
        self.send_message(&participant_id, &msg);
    }

    async fn send_signal(&self, envelope: SignalEnvelope) {
        let to = envelope.to_participant.clone();
        self.send_message(&to, &envelope.into());
    }

    async fn send_peer_left(&self, participant_id: ParticipantId, room_id: RoomId) {
        self.send_message(&participant_id, &ServerMessage::PeerLeft { room_id });
    }
}
