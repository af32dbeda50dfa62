use crate::capability::CapabilityError;
use speek_core::SignalError;
use speek_core::transfer::TransferError;
use thiserror::Error;

/// Failure reported by a peer transport or one of its data channels.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport setup failed: {0}")]
    Setup(String),

    #[error("webrtc: {0}")]
    Rtc(String),

    #[error("transport is closed")]
    Closed,
}

impl From<webrtc::Error> for TransportError {
    fn from(e: webrtc::Error) -> Self {
        TransportError::Rtc(e.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("capability acquisition failed: {0}")]
    CapabilityAcquisition(#[from] CapabilityError),

    #[error("negotiation failed: {0}")]
    Negotiation(TransportError),

    #[error("connectivity candidate rejected: {0}")]
    Connectivity(TransportError),

    #[error("transfer integrity: {0}")]
    TransferIntegrity(#[from] TransferError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error("session is closed")]
    Closed,
}
