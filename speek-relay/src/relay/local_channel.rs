use crate::relay::RoomRelay;
use async_trait::async_trait;
use speek_core::{
    MeetingId, ParticipantId, SessionId, SignalChannel, SignalError, SignalMessage, SignalStream,
};
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// In-process [`SignalChannel`] attached directly to a [`RoomRelay`].
///
/// Used when the relay and the peers share a process, and by tests.
pub struct LocalSignalChannel {
    relay: RoomRelay,
    session_id: SessionId,
    meeting: Mutex<Option<MeetingId>>,
}

impl LocalSignalChannel {
    pub fn new(relay: RoomRelay) -> Self {
        Self {
            relay,
            session_id: SessionId::new(),
            meeting: Mutex::new(None),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }
}

#[async_trait]
impl SignalChannel for LocalSignalChannel {
    async fn join(
        &self,
        meeting_id: &MeetingId,
        sender_id: &ParticipantId,
    ) -> Result<SignalStream, SignalError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.relay.join(self.session_id, meeting_id.clone(), tx);
        *self.meeting.lock().await = Some(meeting_id.clone());

        debug!(
            "Participant {} ({}) joined meeting {}",
            sender_id, self.session_id, meeting_id
        );
        Ok(rx)
    }

    async fn emit(&self, message: SignalMessage) -> Result<(), SignalError> {
        let meeting = self
            .meeting
            .lock()
            .await
            .clone()
            .ok_or(SignalError::NotJoined)?;

        self.relay.route(&self.session_id, &meeting, message);
        Ok(())
    }

    async fn leave(&self) {
        self.meeting.lock().await.take();
        self.relay.leave(&self.session_id);
    }
}

impl Drop for LocalSignalChannel {
    fn drop(&mut self) {
        self.relay.leave(&self.session_id);
    }
}
