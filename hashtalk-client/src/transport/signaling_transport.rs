use crate::error::TransportError;
use async_trait::async_trait;
use hashtalk_core::{ClientMessage, ServerMessage};

/// Ordered, at-most-once message channel to the relay.
#[async_trait]
pub trait SignalingTransport: Send {
    async fn send(&mut self, message: ClientMessage) -> Result<(), TransportError>;

    /// Next message from the relay, `None` once the connection is gone.
    ///
    /// Must be cancel safe: the driver races it against in-flight
    /// negotiation steps.
    async fn recv(&mut self) -> Option<ServerMessage>;

    async fn disconnect(&mut self);
}
