mod signal_relay;

pub use signal_relay::*;
