pub use hashtalk_core::{ParticipantId, Role, RoomId};

pub mod model {
    pub use hashtalk_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use hashtalk_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use hashtalk_client::*;
}
