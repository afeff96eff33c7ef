mod client_handle;
mod driver;
mod session;
mod state;

pub use client_handle::*;
pub use driver::*;
pub use session::*;
pub use state::*;
