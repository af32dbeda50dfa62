mod negotiation_state;
mod negotiator;
mod peer_session;
mod session_input;

pub use negotiation_state::*;
pub use negotiator::*;
pub use peer_session::*;
pub use session_input::*;
