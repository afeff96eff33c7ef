use crate::negotiation::NegotiationState;
use crate::primitive::PeerConnectionState;
use hashtalk_core::{SdpType, SignalKind};
use thiserror::Error;

/// Why a negotiation session ended in `disconnected`.
///
/// Every variant is recoverable: the participant can re-join.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("connection primitive failed: {0}")]
    Primitive(String),

    #[error("malformed {kind} payload: {source}")]
    MalformedPayload {
        kind: SignalKind,
        source: serde_json::Error,
    },

    #[error("expected {expected:?} description, got {actual:?}")]
    UnexpectedDescription { expected: SdpType, actual: SdpType },

    #[error("negotiation timed out while {0}")]
    Timeout(NegotiationState),

    #[error("peer connection {0}")]
    ConnectionLost(PeerConnectionState),

    #[error("session already released")]
    Released,
}

impl From<anyhow::Error> for NegotiationError {
    fn from(err: anyhow::Error) -> Self {
        Self::Primitive(format!("{:#}", err))
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("signaling transport closed")]
    Closed,
}

impl From<webrtc::Error> for NegotiationError {
    fn from(err: webrtc::Error) -> Self {
        Self::Primitive(err.to_string())
    }
}
