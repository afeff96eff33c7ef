pub mod config;
pub mod error;
pub mod negotiation;
pub mod primitive;
pub mod transport;

pub use config::*;
pub use error::*;
pub use negotiation::*;
pub use primitive::*;
pub use transport::*;

/// Connect to the relay at `config.url` and start matchmaking with the
/// webrtc-rs primitive.
pub async fn connect(config: ClientConfig) -> Result<ClientHandle, TransportError> {
    let transport = WsTransport::connect(&config.url).await?;
    let factory = WebRtcFactory::new(config.receive_media);
    Ok(NegotiationDriver::spawn(transport, factory, config))
}
