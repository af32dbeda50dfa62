use crate::capability::{CapabilityError, LocalCapability};
use crate::transport::TransportEvent;
use bytes::Bytes;
use speek_core::transfer::TransferId;
use speek_core::{MeetingId, SignalMessage};

/// Everything a session reacts to, processed one at a time in arrival order.
///
/// Inputs produced by asynchronous work carry the generation that started
/// it; the session ignores them once its generation has moved on.
#[derive(Debug)]
pub enum SessionInput {
    Connect(MeetingId),
    CapabilityResolved {
        generation: u64,
        result: Result<LocalCapability, CapabilityError>,
    },
    Signal(SignalMessage),
    Transport {
        generation: u64,
        event: TransportEvent,
    },
    Upload {
        id: TransferId,
        filename: String,
        data: Bytes,
    },
    NegotiationTimeout {
        generation: u64,
    },
    Close,
}
