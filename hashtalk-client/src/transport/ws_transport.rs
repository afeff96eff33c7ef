use crate::error::TransportError;
use crate::transport::SignalingTransport;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use hashtalk_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// [`SignalingTransport`] over a WebSocket, one reader and one writer task.
pub struct WsTransport {
    outgoing: mpsc::UnboundedSender<Message>,
    incoming: mpsc::UnboundedReceiver<ServerMessage>,
    recv_task: JoinHandle<()>,
}

impl WsTransport {
    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        let (socket, _) = connect_async(url).await?;
        info!("Connected to relay at {}", url);

        let (mut sender, mut receiver) = socket.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let (incoming_tx, incoming) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if sender.send(msg).await.is_err() || closing {
                    break;
                }
            }
        });

        let recv_task = tokio::spawn(async move {
            while let Some(frame) = receiver.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => {
                                if incoming_tx.send(msg).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Ignoring undecodable relay frame: {}", e),
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay connection error: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay reader finished");
        });

        Ok(Self {
            outgoing,
            incoming,
            recv_task,
        })
    }
}

#[async_trait]
impl SignalingTransport for WsTransport {
    async fn send(&mut self, message: ClientMessage) -> Result<(), TransportError> {
        let json = serde_json::to_string(&message)?;
        self.outgoing
            .send(Message::Text(json.into()))
            .map_err(|_| TransportError::Closed)
    }

    async fn recv(&mut self) -> Option<ServerMessage> {
        self.incoming.recv().await
    }

    async fn disconnect(&mut self) {
        let _ = self.outgoing.send(Message::Close(None));
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
