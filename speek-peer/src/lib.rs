mod capability;
mod config;
mod error;
mod events;
mod session;
mod transport;

pub use capability::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use session::*;
pub use transport::*;
