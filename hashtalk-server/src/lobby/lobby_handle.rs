use crate::lobby::lobby_command::{LobbyCommand, LobbyStats};
use tokio::sync::{mpsc, oneshot};
use tracing::error;

/// Cloneable sender side of a running [`Lobby`](crate::Lobby).
#[derive(Clone)]
pub struct LobbyHandle {
    tx: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    /// A handle plus the receiver the lobby loop will consume.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<LobbyCommand>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Returns `false` once the lobby has shut down.
    pub async fn send(&self, cmd: LobbyCommand) -> bool {
        match self.tx.send(cmd).await {
            Ok(()) => true,
            Err(e) => {
                error!("Lobby died: {}", e);
                false
            }
        }
    }

    pub async fn stats(&self) -> Option<LobbyStats> {
        let (reply, rx) = oneshot::channel();
        if !self.send(LobbyCommand::Stats { reply }).await {
            return None;
        }
        rx.await.ok()
    }
}
