use crate::model::{MeetingId, ParticipantId, SignalMessage};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Inbound half of a joined signal channel.
pub type SignalStream = mpsc::UnboundedReceiver<SignalMessage>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignalError {
    #[error("signal channel is not joined to a meeting")]
    NotJoined,
}

/// Bidirectional message transport between one participant and the room relay.
///
/// `join` sends the `{meetingId, senderId}` join request and hands back the
/// stream of messages relayed from the other members. The transport binding
/// (socket, reconnection) belongs to the implementor.
#[async_trait]
pub trait SignalChannel: Send + Sync {
    async fn join(
        &self,
        meeting_id: &MeetingId,
        sender_id: &ParticipantId,
    ) -> Result<SignalStream, SignalError>;

    async fn emit(&self, message: SignalMessage) -> Result<(), SignalError>;

    async fn leave(&self);
}
