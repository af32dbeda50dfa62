use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Audio => f.write_str("audio"),
            MediaKind::Video => f.write_str("video"),
        }
    }
}

/// Which capture device to use for one media kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeviceSelection {
    Disabled,
    #[default]
    Default,
    /// A device id remembered from an earlier device picker.
    Device(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureConstraints {
    pub audio: DeviceSelection,
    pub video: DeviceSelection,
}

impl CaptureConstraints {
    /// No capture devices; the session only carries data channels.
    pub fn data_only() -> Self {
        Self {
            audio: DeviceSelection::Disabled,
            video: DeviceSelection::Disabled,
        }
    }

    pub fn selection(&self, kind: MediaKind) -> &DeviceSelection {
        match kind {
            MediaKind::Audio => &self.audio,
            MediaKind::Video => &self.video,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalTrack {
    pub id: String,
    pub kind: MediaKind,
    pub device_id: String,
}

/// Local media acquired for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalCapability {
    pub stream_id: String,
    pub tracks: Vec<LocalTrack>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("no {0} device available")]
    Unavailable(MediaKind),

    #[error("device {0:?} not found")]
    DeviceNotFound(String),

    #[error("access to {0} denied")]
    Denied(MediaKind),
}

/// Source of local capture capability (camera, microphone, display).
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<LocalCapability, CapabilityError>;

    async fn release(&self, capability: &LocalCapability);
}
