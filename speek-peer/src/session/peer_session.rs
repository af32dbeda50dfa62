use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::events::{EventKind, EventMap, SessionEvent, Subscription};
use crate::session::{NegotiationState, Negotiator, SessionDeps, SessionInput};
use bytes::Bytes;
use speek_core::transfer::TransferId;
use speek_core::{MeetingId, ParticipantId};
use tokio::sync::{mpsc, watch};

/// Handle to a running peer session.
///
/// The negotiator runs on its own task; this handle only queues inputs and
/// observes state. Dropping the handle closes the session.
pub struct PeerSession {
    identity: ParticipantId,
    inputs: mpsc::UnboundedSender<SessionInput>,
    events: EventMap,
    state_rx: watch::Receiver<NegotiationState>,
}

impl PeerSession {
    pub fn spawn(config: SessionConfig, deps: SessionDeps) -> Self {
        Self::spawn_with_identity(ParticipantId::generate(), config, deps)
    }

    pub fn spawn_with_identity(
        identity: ParticipantId,
        config: SessionConfig,
        deps: SessionDeps,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let events = EventMap::new();

        let negotiator = Negotiator::new(identity.clone(), config, deps, events.clone(), tx.clone());
        let state_rx = negotiator.subscribe_state();
        tokio::spawn(negotiator.run(rx));

        Self {
            identity,
            inputs: tx,
            events,
            state_rx,
        }
    }

    pub fn identity(&self) -> &ParticipantId {
        &self.identity
    }

    pub fn state(&self) -> NegotiationState {
        *self.state_rx.borrow()
    }

    /// Registers the handler for `kind`, replacing any previous one.
    pub fn on<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.events.register(kind, handler)
    }

    pub fn connect(&self, meeting_id: impl Into<MeetingId>) -> Result<(), SessionError> {
        self.send(SessionInput::Connect(meeting_id.into()))
    }

    /// Queues `data` for sending as `filename`; frames go out once the data channel is open.
    pub fn upload(
        &self,
        filename: impl Into<String>,
        data: Bytes,
    ) -> Result<TransferId, SessionError> {
        let id = TransferId::new();
        self.send(SessionInput::Upload {
            id,
            filename: filename.into(),
            data,
        })?;
        Ok(id)
    }

    /// Closes the session and waits until it reports `Closed`. Idempotent.
    pub async fn close(&self) {
        let _ = self.inputs.send(SessionInput::Close);
        let mut state_rx = self.state_rx.clone();
        let _ = state_rx.wait_for(|state| state.is_closed()).await;
    }

    /// Waits until the session reaches `target`, failing if it closes first.
    pub async fn wait_for_state(&self, target: NegotiationState) -> Result<(), SessionError> {
        let mut state_rx = self.state_rx.clone();
        let reached = state_rx
            .wait_for(|state| *state == target || state.is_closed())
            .await
            .map(|state| *state)
            .unwrap_or(NegotiationState::Closed);

        if reached == target {
            Ok(())
        } else {
            Err(SessionError::Closed)
        }
    }

    fn send(&self, input: SessionInput) -> Result<(), SessionError> {
        if self.state().is_closed() {
            return Err(SessionError::Closed);
        }
        self.inputs.send(input).map_err(|_| SessionError::Closed)
    }
}

impl Drop for PeerSession {
    fn drop(&mut self) {
        let _ = self.inputs.send(SessionInput::Close);
    }
}
