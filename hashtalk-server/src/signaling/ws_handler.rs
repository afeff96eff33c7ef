use crate::lobby::LobbyCommand;
use crate::signaling::SignalingService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use hashtalk_core::{ClientMessage, ParticipantId};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    let lobby = service.lobby.clone();
    let participant_id = ParticipantId::new();
    info!("New WebSocket connection: {}", participant_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(participant_id.clone(), tx);
    service.send_message(&participant_id, &service.welcome(participant_id.clone()));

    if !lobby
        .send(LobbyCommand::Connect {
            participant_id: participant_id.clone(),
        })
        .await
    {
        service.remove_peer(&participant_id);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let lobby = lobby.clone();
        let participant_id = participant_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                let text = match msg {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };

                let cmd = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join {}) => LobbyCommand::Join {
                        participant_id: participant_id.clone(),
                    },
                    Ok(ClientMessage::Signal {
                        room_id,
                        kind,
                        payload,
                    }) => LobbyCommand::Signal {
                        participant_id: participant_id.clone(),
                        room_id,
                        kind,
                        payload,
                    },
                    Ok(ClientMessage::Leave {}) => LobbyCommand::Leave {
                        participant_id: participant_id.clone(),
                    },
                    Err(e) => {
                        warn!("Invalid ClientMessage from {}: {}", participant_id, e);
                        LobbyCommand::Malformed {
                            participant_id: participant_id.clone(),
                        }
                    }
                };

                if !lobby.send(cmd).await {
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.remove_peer(&participant_id);
    lobby
        .send(LobbyCommand::Disconnect {
            participant_id: participant_id.clone(),
        })
        .await;
    info!("WebSocket disconnected: {}", participant_id);
}
