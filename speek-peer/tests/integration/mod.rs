
use speek_core::{MeetingId, ParticipantId, SignalMessage, SignalPayload};
use speek_peer::{
    CapabilityProvider, CaptureConstraints, NegotiationState, PeerSession, SessionConfig,
    SessionDeps, VirtualCapabilityProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use crate::utils::{EventRecorder, FakeTransport, FakeTransportFactory, RecordingSignalChannel};

pub const MEETING: &str = "standup";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A session wired to recording/fake collaborators, with every event recorded.
pub struct TestSession {
    pub session: PeerSession,
    pub signal: RecordingSignalChannel,
    pub transports: FakeTransportFactory,
    pub events: EventRecorder,
}

impl TestSession {
    pub fn spawn(identity: &str) -> Self {
        Self::spawn_with(
            identity,
            data_config(),
            Arc::new(VirtualCapabilityProvider::data_only()),
        )
    }

    pub fn spawn_with(
        identity: &str,
        config: SessionConfig,
        capabilities: Arc<dyn CapabilityProvider>,
    ) -> Self {
        let signal = RecordingSignalChannel::new();
        let transports = FakeTransportFactory::new();
        let deps = SessionDeps {
            signal: Arc::new(signal.clone()),
            transports: Arc::new(transports.clone()),
            capabilities,
        };

        let session = PeerSession::spawn_with_identity(ParticipantId::from(identity), config, deps);
        let events = EventRecorder::attach(&session);

        Self {
            session,
            signal,
            transports,
            events,
        }
    }

    /// Connects to [`MEETING`] and waits until the local offer went out.
    pub async fn connect_and_offer(&self) -> Arc<FakeTransport> {
        self.session.connect(MEETING).expect("connect failed");
        wait_state(&self.session, NegotiationState::Negotiating).await;
        assert!(self.signal.wait_for_emitted("offer", 1, 2000).await);
        self.transports.last().expect("no transport created")
    }

    /// Plays `payload` from `sender` through the recording relay.
    pub async fn inject(&self, sender: &str, payload: SignalPayload) {
        let message = SignalMessage::new(MeetingId::from(MEETING), ParticipantId::from(sender), payload);
        assert!(self.signal.inject(message).await, "session has not joined");
    }
}

pub fn data_config() -> SessionConfig {
    SessionConfig::default().with_constraints(CaptureConstraints::data_only())
}

pub async fn wait_state(session: &PeerSession, state: NegotiationState) {
    tokio::time::timeout(Duration::from_secs(2), session.wait_for_state(state))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {state}"))
        .unwrap_or_else(|_| panic!("session closed before reaching {state}"));
}

/// Polls `condition` every 10ms until it holds or `timeout_ms` passes.
pub async fn wait_until<F>(timeout_ms: u64, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);

    loop {
        if condition() {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
