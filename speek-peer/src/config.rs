use crate::capability::CaptureConstraints;
use speek_core::transfer::CHUNK_SIZE;
use std::time::Duration;

pub const DEFAULT_DATA_CHANNEL_LABEL: &str = "sendDataChannel";
pub const DEFAULT_NEGOTIATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub chunk_size: usize,
    pub data_channel_label: String,
    /// `None` waits for connectivity forever.
    pub negotiation_timeout: Option<Duration>,
    pub constraints: CaptureConstraints,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            data_channel_label: DEFAULT_DATA_CHANNEL_LABEL.to_owned(),
            negotiation_timeout: Some(DEFAULT_NEGOTIATION_TIMEOUT),
            constraints: CaptureConstraints::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_constraints(mut self, constraints: CaptureConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_negotiation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.negotiation_timeout = timeout;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_data_channel_label(mut self, label: impl Into<String>) -> Self {
        self.data_channel_label = label.into();
        self
    }
}
