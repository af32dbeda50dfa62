mod meeting;
mod participant;
mod relay_frame;
mod session;
mod signaling;

pub use meeting::MeetingId;
pub use participant::ParticipantId;
pub use relay_frame::RelayFrame;
pub use session::SessionId;
pub use signaling::{
    ConnectivityCandidate, DescriptionKind, IceServerConfig, SessionDescription, SignalMessage,
    SignalPayload,
};
