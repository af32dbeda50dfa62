use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Keys of the session event map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    StreamReady,
    TrackAdded,
    DataChannelReady,
    DataReceived,
    CandidateDiscovered,
    ConnectivityChanged,
    CapabilityError,
    TransferProgress,
    FileReceived,
    TransferFailed,
}

impl EventKind {
    pub const ALL: [EventKind; 10] = [
        EventKind::StreamReady,
        EventKind::TrackAdded,
        EventKind::DataChannelReady,
        EventKind::DataReceived,
        EventKind::CandidateDiscovered,
        EventKind::ConnectivityChanged,
        EventKind::CapabilityError,
        EventKind::TransferProgress,
        EventKind::FileReceived,
        EventKind::TransferFailed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::StreamReady => "stream-ready",
            EventKind::TrackAdded => "track-added",
            EventKind::DataChannelReady => "data-channel-ready",
            EventKind::DataReceived => "data-received",
            EventKind::CandidateDiscovered => "candidate-discovered",
            EventKind::ConnectivityChanged => "connectivity-changed",
            EventKind::CapabilityError => "capability-error",
            EventKind::TransferProgress => "transfer-progress",
            EventKind::FileReceived => "file-received",
            EventKind::TransferFailed => "transfer-failed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown event name {0:?}")]
pub struct UnknownEvent(pub String);

impl FromStr for EventKind {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEvent(s.to_owned()))
    }
}
