use crate::model::{MeetingId, ParticipantId, SignalMessage};
use serde::{Deserialize, Serialize};

/// Envelope exchanged between a client and the room relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "lowercase")]
pub enum RelayFrame {
    Join {
        #[serde(rename = "meetingId")]
        meeting_id: MeetingId,
        #[serde(rename = "senderId")]
        sender_id: ParticipantId,
    },
    Leave,
    Signal(SignalMessage),
}
