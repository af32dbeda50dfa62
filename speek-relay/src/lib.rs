mod config;
mod relay;
mod signaling;

pub use config::*;
pub use relay::*;
pub use signaling::*;
