use crate::capability::{CapabilityError, LocalCapability};
use crate::error::SessionError;
use crate::events::EventKind;
use crate::transport::{ConnectivityState, RemoteTrack};
use speek_core::ConnectivityCandidate;
use speek_core::transfer::{Frame, ReceivedFile, TransferId, TransferProgress};

/// Payload delivered to the handler registered for the matching [`EventKind`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    StreamReady(LocalCapability),
    TrackAdded(RemoteTrack),
    DataChannelReady { label: String },
    DataReceived(Frame),
    CandidateDiscovered(ConnectivityCandidate),
    ConnectivityChanged(ConnectivityState),
    CapabilityError(CapabilityError),
    TransferProgress(TransferProgress),
    FileReceived(ReceivedFile),
    TransferFailed {
        id: Option<TransferId>,
        error: SessionError,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::StreamReady(_) => EventKind::StreamReady,
            SessionEvent::TrackAdded(_) => EventKind::TrackAdded,
            SessionEvent::DataChannelReady { .. } => EventKind::DataChannelReady,
            SessionEvent::DataReceived(_) => EventKind::DataReceived,
            SessionEvent::CandidateDiscovered(_) => EventKind::CandidateDiscovered,
            SessionEvent::ConnectivityChanged(_) => EventKind::ConnectivityChanged,
            SessionEvent::CapabilityError(_) => EventKind::CapabilityError,
            SessionEvent::TransferProgress(_) => EventKind::TransferProgress,
            SessionEvent::FileReceived(_) => EventKind::FileReceived,
            SessionEvent::TransferFailed { .. } => EventKind::TransferFailed,
        }
    }
}
