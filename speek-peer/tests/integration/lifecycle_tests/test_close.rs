use bytes::Bytes;
use speek_core::{MeetingId, ParticipantId};
use speek_peer::{
    ConnectivityState, EventMap, NegotiationState, Negotiator, SessionDeps, SessionError,
    SessionInput, TransportEvent, VirtualCapabilityProvider,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::integration::{MEETING, TestSession, data_config, init_tracing, wait_state};
use crate::utils::{FakeTransportFactory, GatedCapabilityProvider, RecordingSignalChannel};

#[tokio::test]
async fn test_close_is_idempotent() {
    init_tracing();

    let test = TestSession::spawn("alice");
    let transport = test.connect_and_offer().await;

    test.session.close().await;
    test.session.close().await;

    assert_eq!(test.session.state(), NegotiationState::Closed);
    assert_eq!(test.signal.leave_count(), 1);
    assert!(transport.is_closed());

    assert!(matches!(test.session.connect(MEETING), Err(SessionError::Closed)));
    assert!(matches!(
        test.session.upload("late.txt", Bytes::from_static(b"late")),
        Err(SessionError::Closed)
    ));

    // Reports from the old transport no longer move the session.
    transport.emit(TransportEvent::ConnectivityChanged(ConnectivityState::Connected));
    assert_eq!(test.session.state(), NegotiationState::Closed);
}

#[tokio::test]
async fn test_close_before_connect() {
    init_tracing();

    let test = TestSession::spawn("alice");
    test.session.close().await;

    assert_eq!(test.session.state(), NegotiationState::Closed);
    assert_eq!(test.signal.leave_count(), 0);
    assert!(test.transports.created().is_empty());
}

#[tokio::test]
async fn test_capability_resolved_after_close_is_released() {
    init_tracing();

    let capabilities = GatedCapabilityProvider::new();
    let test = TestSession::spawn_with("alice", data_config(), Arc::new(capabilities.clone()));

    test.session.connect(MEETING).unwrap();
    wait_state(&test.session, NegotiationState::AwaitingLocalCapability).await;
    test.session.close().await;

    // The acquisition still completes; its result must be handed back.
    capabilities.open();
    assert!(crate::integration::wait_until(2000, || capabilities.release_count() == 1).await);
    assert!(test.signal.offers().await.is_empty());
}

#[tokio::test]
async fn test_close_cancels_negotiation_timeout() {
    init_tracing();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let deps = SessionDeps {
        signal: Arc::new(RecordingSignalChannel::new()),
        transports: Arc::new(FakeTransportFactory::new()),
        capabilities: Arc::new(VirtualCapabilityProvider::data_only()),
    };
    let config = data_config().with_negotiation_timeout(Some(Duration::from_millis(50)));
    let mut negotiator = Negotiator::new(ParticipantId::from("alice"), config, deps, EventMap::new(), tx);

    negotiator.handle(SessionInput::Connect(MeetingId::from(MEETING))).await;
    negotiator.close().await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    while let Ok(input) = rx.try_recv() {
        assert!(
            !matches!(input, SessionInput::NegotiationTimeout { .. }),
            "timeout fired after close"
        );
    }
}
