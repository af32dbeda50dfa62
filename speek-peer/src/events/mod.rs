mod event_kind;
mod event_map;
mod session_event;

pub use event_kind::*;
pub use event_map::*;
pub use session_event::*;
