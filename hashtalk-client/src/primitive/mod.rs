mod connection_primitive;
mod primitive_event;
mod webrtc_primitive;

pub use connection_primitive::*;
pub use primitive_event::*;
pub use webrtc_primitive::*;
