pub use speek_core::model::{MeetingId, ParticipantId};

pub mod model {
    pub use speek_core::model::*;
}

pub mod transfer {
    pub use speek_core::transfer::*;
}

#[cfg(feature = "peer")]
pub mod peer {
    pub use speek_peer::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use speek_relay::*;
}
