use hashtalk_core::IceCandidate;
use std::fmt;

/// Connection state as reported by the primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl PeerConnectionState {
    /// States after which the connection will not carry media again.
    pub fn is_lost(self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed | Self::Closed)
    }
}

impl fmt::Display for PeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::New => "new",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Failed => "failed",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Callbacks of the primitive, delivered as messages to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveEvent {
    /// A local candidate that must be trickled to the peer.
    LocalCandidate(IceCandidate),

    /// The remote side started sending a track.
    Track { id: String, kind: String },

    ConnectionState(PeerConnectionState),
}
