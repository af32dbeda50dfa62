mod local_channel;
mod meeting_room;
mod room_relay;

pub use local_channel::*;
pub use meeting_room::*;
pub use room_relay::*;
