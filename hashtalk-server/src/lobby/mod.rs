mod delivery;
mod lobby;
mod lobby_command;
mod lobby_handle;
mod matchmaker;
mod pairing;

pub use delivery::*;
pub use lobby::*;
pub use lobby_command::*;
pub use lobby_handle::*;
pub use matchmaker::*;
pub use pairing::*;
