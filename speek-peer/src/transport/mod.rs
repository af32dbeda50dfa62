mod peer_transport;
mod rtc_data_channel;
mod rtc_transport;
mod transport_config;
mod transport_event;

pub use peer_transport::*;
pub use rtc_data_channel::*;
pub use rtc_transport::*;
pub use transport_config::*;
pub use transport_event::*;
