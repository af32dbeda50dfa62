use speek_peer::{
    ConnectivityState, EventKind, NegotiationState, SessionEvent, VirtualCapabilityProvider,
};
use std::sync::Arc;
use std::time::Duration;

use crate::integration::{MEETING, TestSession, data_config, init_tracing, wait_state};

#[tokio::test]
async fn test_negotiation_timeout_closes_session() {
    init_tracing();

    let config = data_config().with_negotiation_timeout(Some(Duration::from_millis(100)));
    let test = TestSession::spawn_with(
        "alice",
        config,
        Arc::new(VirtualCapabilityProvider::data_only()),
    );

    test.session.connect(MEETING).unwrap();
    wait_state(&test.session, NegotiationState::Closed).await;

    let failed = test
        .events
        .of_kind(EventKind::ConnectivityChanged)
        .into_iter()
        .any(|event| {
            matches!(
                event,
                SessionEvent::ConnectivityChanged(ConnectivityState::Failed)
            )
        });
    assert!(failed);
    assert!(test.transports.last().unwrap().is_closed());
    assert_eq!(test.signal.leave_count(), 1);
}

#[tokio::test]
async fn test_connected_session_ignores_timeout() {
    init_tracing();

    let config = data_config().with_negotiation_timeout(Some(Duration::from_millis(100)));
    let test = TestSession::spawn_with(
        "alice",
        config,
        Arc::new(VirtualCapabilityProvider::data_only()),
    );

    let transport = test.connect_and_offer().await;
    transport.emit(speek_peer::TransportEvent::ConnectivityChanged(
        ConnectivityState::Connected,
    ));
    wait_state(&test.session, NegotiationState::Connected).await;

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(test.session.state(), NegotiationState::Connected);
}
