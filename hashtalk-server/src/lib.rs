mod app;
mod config;
mod lobby;
mod relay;
mod signaling;

pub use app::*;
pub use config::*;
pub use lobby::*;
pub use relay::*;
pub use signaling::*;
