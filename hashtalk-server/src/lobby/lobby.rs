use crate::config::RequeuePolicy;
use crate::lobby::delivery::Delivery;
use crate::lobby::lobby_command::{LobbyCommand, LobbyStats};
use crate::lobby::matchmaker::Matchmaker;
use crate::relay::SignalRelay;
use crate::signaling::SignalingOutput;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Single-threaded owner of the waiting pool, the room table and the relay.
///
/// Every mutation happens inside [`Lobby::run`], one command at a time.
pub struct Lobby {
    matchmaker: Matchmaker,
    relay: SignalRelay,
    command_rx: mpsc::Receiver<LobbyCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl Lobby {
    pub fn new(
        policy: RequeuePolicy,
        command_rx: mpsc::Receiver<LobbyCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            matchmaker: Matchmaker::new(policy),
            relay: SignalRelay::new(),
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!(
            "Lobby event loop started (requeue: {})",
            self.matchmaker.policy()
        );

        while let Some(cmd) = self.command_rx.recv().await {
            let deliveries = self.handle_command(cmd);
            self.dispatch(deliveries).await;
        }

        info!("Command channel closed. Lobby event loop finished");
    }

    fn handle_command(&mut self, cmd: LobbyCommand) -> Vec<Delivery> {
        match cmd {
            LobbyCommand::Connect { participant_id } => {
                debug!("Registering participant {}", participant_id);
                self.matchmaker.register(participant_id);
                Vec::new()
            }

            LobbyCommand::Join { participant_id } => {
                info!("Participant {} joined", participant_id);
                self.matchmaker.join(participant_id)
            }

            LobbyCommand::Signal {
                participant_id,
                room_id,
                kind,
                payload,
            } => self
                .relay
                .send(&mut self.matchmaker, &participant_id, room_id, kind, payload)
                .into_iter()
                .collect(),

            LobbyCommand::Leave { participant_id } => {
                info!("Participant {} left", participant_id);
                self.matchmaker.leave(&participant_id)
            }

            LobbyCommand::Disconnect { participant_id } => {
                info!("Participant {} disconnected", participant_id);
                self.matchmaker.remove(&participant_id)
            }

            LobbyCommand::Malformed { participant_id } => {
                warn!("Discarding malformed frame from {}", participant_id);
                self.relay.record_malformed();
                Vec::new()
            }

            LobbyCommand::Stats { reply } => {
                let _ = reply.send(self.stats());
                Vec::new()
            }
        }
    }

    async fn dispatch(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match delivery {
                Delivery::Matched {
                    to,
                    room_id,
                    role,
                    peer_id,
                } => {
                    self.signaling
                        .send_matched(to, room_id, role, peer_id)
                        .await
                }
                Delivery::Signal(envelope) => self.signaling.send_signal(envelope).await,
                Delivery::PeerLeft { to, room_id } => {
                    self.signaling.send_peer_left(to, room_id).await
                }
            }
        }
    }

    fn stats(&self) -> LobbyStats {
        LobbyStats {
            participants: self.matchmaker.participant_count(),
            waiting: self.matchmaker.waiting().count(),
            rooms: self.matchmaker.rooms().count(),
            relay: self.relay.stats(),
        }
    }
}
