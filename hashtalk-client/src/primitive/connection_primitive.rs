use crate::error::NegotiationError;
use crate::primitive::PrimitiveEvent;
use async_trait::async_trait;
use hashtalk_core::{IceCandidate, IceServerConfig, SessionDescription};
use tokio::sync::mpsc;

/// The peer connection a negotiation session drives.
///
/// Every call may suspend until the underlying stack resolves it. Callbacks
/// are not part of the trait: implementations push [`PrimitiveEvent`]s into
/// the channel they were created with.
#[async_trait]
pub trait ConnectionPrimitive: Send {
    /// A local media source.
    type Track: Send;

    async fn create_offer(&mut self) -> Result<SessionDescription, NegotiationError>;

    /// Answer `remote`, which has already been applied as the remote description.
    async fn create_answer(
        &mut self,
        remote: &SessionDescription,
    ) -> Result<SessionDescription, NegotiationError>;

    async fn set_local_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError>;

    async fn set_remote_description(
        &mut self,
        desc: SessionDescription,
    ) -> Result<(), NegotiationError>;

    async fn add_ice_candidate(&mut self, candidate: IceCandidate) -> Result<(), NegotiationError>;

    async fn add_track(&mut self, track: Self::Track) -> Result<(), NegotiationError>;

    async fn close(&mut self) -> Result<(), NegotiationError>;
}

/// Builds one primitive per room membership.
#[async_trait]
pub trait PrimitiveFactory: Send + Sync {
    type Primitive: ConnectionPrimitive + 'static;

    /// Create a primitive with local tracks already attached.
    async fn create(
        &self,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<PrimitiveEvent>,
    ) -> Result<Self::Primitive, NegotiationError>;
}
