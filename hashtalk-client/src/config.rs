use hashtalk_core::IceServerConfig;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// What the client does after its pairing ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RejoinPolicy {
    /// Send `join` again unless the server already re-queued us.
    #[default]
    Automatic,
    /// Stay disconnected until the user asks for another match.
    Manual,
}

#[derive(Debug, Error)]
#[error("unknown rejoin policy '{0}', expected 'automatic' or 'manual'")]
pub struct UnknownRejoinPolicy(String);

impl FromStr for RejoinPolicy {
    type Err = UnknownRejoinPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Ok(Self::Automatic),
            "manual" => Ok(Self::Manual),
            _ => Err(UnknownRejoinPolicy(s.to_owned())),
        }
    }
}

impl fmt::Display for RejoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Automatic => write!(f, "automatic"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the relay.
    pub url: String,
    /// Upper bound on offer/answer exchange before the session gives up.
    pub negotiation_timeout: Duration,
    pub rejoin: RejoinPolicy,
    /// Used when the server's `welcome` carries no ICE servers.
    pub ice_servers: Vec<IceServerConfig>,
    /// Add receive-only audio and video transceivers to every connection.
    pub receive_media: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:3000/ws".to_owned(),
            negotiation_timeout: Duration::from_secs(30),
            rejoin: RejoinPolicy::default(),
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            receive_media: true,
        }
    }
}
