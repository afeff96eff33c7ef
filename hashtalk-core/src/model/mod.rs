mod error;
mod negotiation;
mod participant;
mod room;
mod signaling;

pub use error::IdError;
pub use negotiation::{IceCandidate, SdpType, SessionDescription};
pub use participant::{ParticipantId, ParticipantState};
pub use room::{Role, RoomId};
pub use signaling::{ClientMessage, IceServerConfig, ServerMessage, SignalEnvelope, SignalKind};
