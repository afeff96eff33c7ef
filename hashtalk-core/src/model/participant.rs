use crate::model::error::IdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const MAX_ID_LEN: usize = 128;

/// Opaque participant identifier, unique per transport session.
///
/// Ordering is plain lexicographic ordering of the underlying text; the
/// matchmaker relies on it to pick the initiator of a room.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ParticipantId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.len() > MAX_ID_LEN {
            return Err(IdError::TooLong {
                len: s.len(),
                max: MAX_ID_LEN,
            });
        }
        Ok(Self(s.to_owned()))
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = IdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a participant as seen by the matchmaker and the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantState {
    Waiting,
    Pairing,
    Negotiating,
    Connected,
    Disconnected,
}

impl fmt::Display for ParticipantState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParticipantState::Waiting => "waiting",
            ParticipantState::Pairing => "pairing",
            ParticipantState::Negotiating => "negotiating",
            ParticipantState::Connected => "connected",
            ParticipantState::Disconnected => "disconnected",
        };
        f.write_str(name)
    }
}
