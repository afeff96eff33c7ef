use crate::config::ServerConfig;
use crate::lobby::{Lobby, LobbyHandle};
use crate::signaling::{SignalingService, ws_handler};
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// A running lobby plus the router that feeds it.
pub struct RelayServer {
    pub router: Router,
    pub lobby: LobbyHandle,
    pub signaling: SignalingService,
}

impl RelayServer {
    /// Spawn the lobby loop and build the `/ws` router around it.
    pub fn build(config: &ServerConfig) -> Self {
        let (lobby, command_rx) = LobbyHandle::channel(config.lobby_capacity);
        let signaling =
            SignalingService::new(lobby.clone(), config.ice_servers.clone(), config.requeue);

        let lobby_loop = Lobby::new(config.requeue, command_rx, Arc::new(signaling.clone()));
        tokio::spawn(lobby_loop.run());

        let router = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(signaling.clone());

        Self {
            router,
            lobby,
            signaling,
        }
    }
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    serve_on(listener, config).await
}

/// Serve on an already bound listener.
pub async fn serve_on(listener: TcpListener, config: ServerConfig) -> Result<()> {
    let relay = RelayServer::build(&config);

    info!(
        "Signaling relay listening on ws://{}/ws",
        listener.local_addr()?
    );

    axum::serve(listener, relay.router)
        .await
        .context("Signaling server failed")
}
