use hashtalk_core::IceServerConfig;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

/// What happens to the surviving member when its partner leaves a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequeuePolicy {
    /// The survivor goes straight back into the waiting pool.
    #[default]
    Automatic,
    /// The survivor stays out of the pool until it sends `join` again.
    Manual,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown requeue policy '{0}', expected 'automatic' or 'manual'")]
pub struct UnknownPolicy(pub String);

impl FromStr for RequeuePolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "automatic" | "auto" => Ok(RequeuePolicy::Automatic),
            "manual" => Ok(RequeuePolicy::Manual),
            other => Err(UnknownPolicy(other.to_owned())),
        }
    }
}

impl fmt::Display for RequeuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequeuePolicy::Automatic => f.write_str("automatic"),
            RequeuePolicy::Manual => f.write_str("manual"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub requeue: RequeuePolicy,
    /// Advertised to every participant in its `welcome` frame.
    pub ice_servers: Vec<IceServerConfig>,
    pub lobby_capacity: usize,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind = env::var("HASHTALK_BIND")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(defaults.bind);
        let requeue = env::var("HASHTALK_REQUEUE")
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or(defaults.requeue);
        let ice_servers = env::var("HASHTALK_ICE_SERVERS")
            .ok()
            .map(|val| parse_ice_servers(&val))
            .filter(|servers| !servers.is_empty())
            .unwrap_or(defaults.ice_servers);
        let lobby_capacity = env::var("HASHTALK_LOBBY_CAPACITY")
            .ok()
            .and_then(|val| val.parse().ok())
            .filter(|cap| *cap > 0)
            .unwrap_or(defaults.lobby_capacity);

        Self {
            bind,
            requeue,
            ice_servers,
            lobby_capacity,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            requeue: RequeuePolicy::Automatic,
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            lobby_capacity: 1024,
        }
    }
}

/// Comma separated list of ICE urls, one server per url.
pub fn parse_ice_servers(list: &str) -> Vec<IceServerConfig> {
    list.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(IceServerConfig::stun)
        .collect()
}
