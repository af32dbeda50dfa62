pub mod model;
pub mod signal_channel;
pub mod transfer;

pub use model::*;
pub use signal_channel::{SignalChannel, SignalError, SignalStream};
