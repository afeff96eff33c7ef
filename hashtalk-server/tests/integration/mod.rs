//! Integration tests for hashtalk-server.
//!
//! Tests are organized by functionality:
//! - `matchmaking_tests` - pairing, re-queueing and role assignment
//! - `relay_tests` - signal forwarding and discarding
//! - `connection_tests` - transport open/close over a real WebSocket


use std::sync::Arc;
use tracing::Level;

use hashtalk_server::{Lobby, LobbyHandle, RequeuePolicy};

use crate::utils::{Inbox, MockSignalingOutput};

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Create a lobby wired to a capturing signaling sink.
///
/// Returns (lobby, inbox, signaling) for test control.
pub fn create_test_lobby(policy: RequeuePolicy) -> (LobbyHandle, Inbox, MockSignalingOutput) {
    let (lobby, command_rx) = LobbyHandle::channel(100);
    let (signaling, outbound_rx) = MockSignalingOutput::new();

    let event_loop = Lobby::new(policy, command_rx, Arc::new(signaling.clone()));

    tokio::spawn(async move {
        event_loop.run().await;
    });

    (lobby, Inbox::new(outbound_rx), signaling)
}
