use anyhow::{Context, Result};
use speek_core::{
    ConnectivityCandidate, MeetingId, ParticipantId, SessionDescription, SignalChannel,
    SignalMessage, SignalPayload, SignalStream,
};
use speek_relay::{LocalSignalChannel, RoomRelay};
use std::time::Duration;
use tokio::time::timeout;

/// One participant attached to a relay through a [`LocalSignalChannel`].
pub struct TestMember {
    pub participant_id: ParticipantId,
    pub meeting_id: MeetingId,
    pub channel: LocalSignalChannel,
    stream: SignalStream,
}

impl TestMember {
    pub async fn join(relay: &RoomRelay, meeting: &str, participant: &str) -> Result<Self> {
        let channel = LocalSignalChannel::new(relay.clone());
        let meeting_id = MeetingId::from(meeting);
        let participant_id = ParticipantId::from(participant);

        let stream = channel
            .join(&meeting_id, &participant_id)
            .await
            .context("join failed")?;

        Ok(Self {
            participant_id,
            meeting_id,
            channel,
            stream,
        })
    }

    pub async fn send_offer(&self, sdp: &str) -> Result<()> {
        self.send(SignalPayload::Offer(SessionDescription::offer(sdp)))
            .await
    }

    pub async fn send_candidate(&self, candidate: &str) -> Result<()> {
        self.send(SignalPayload::Candidate(ConnectivityCandidate {
            candidate: candidate.to_owned(),
            sdp_mid: Some("0".into()),
            sdp_m_line_index: Some(0),
            username_fragment: None,
        }))
        .await
    }

    pub async fn send(&self, payload: SignalPayload) -> Result<()> {
        let message = SignalMessage::new(
            self.meeting_id.clone(),
            self.participant_id.clone(),
            payload,
        );
        self.channel.emit(message).await.context("emit failed")?;
        Ok(())
    }

    /// Waits up to `timeout_ms` for the next relayed message.
    pub async fn next_message(&mut self, timeout_ms: u64) -> Result<SignalMessage> {
        timeout(Duration::from_millis(timeout_ms), self.stream.recv())
            .await
            .context("timed out waiting for a relayed message")?
            .context("relay closed the stream")
    }

    /// True if nothing is queued for this member right now.
    pub fn is_idle(&mut self) -> bool {
        self.stream.try_recv().is_err()
    }
}
