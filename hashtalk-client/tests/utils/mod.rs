
pub use channel_transport::*;
pub use mock_primitive::*;
