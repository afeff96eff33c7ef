use thiserror::Error;

/// Rejected identifier text.
#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("participant id must not be empty")]
    Empty,

    #[error("participant id is {len} bytes, at most {max} allowed")]
    TooLong { len: usize, max: usize },

    #[error("invalid room id: {0}")]
    InvalidRoomId(#[from] uuid::Error),
}
