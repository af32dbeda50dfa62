use speek_core::{SessionDescription, SignalPayload};
use speek_peer::{ConnectivityState, NegotiationState, TransportEvent};
use std::time::Duration;

use crate::integration::{TestSession, init_tracing, wait_state, wait_until};

#[tokio::test]
async fn test_rejected_answer_keeps_session_open() {
    init_tracing();

    let test = TestSession::spawn("alice");
    let transport = test.connect_and_offer().await;

    test.inject("bob", SignalPayload::Answer(SessionDescription::answer("garbage")))
        .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(test.session.state(), NegotiationState::Negotiating);
    assert!(transport.remote_descriptions().is_empty());
    assert!(!transport.is_closed());
    assert_eq!(test.signal.leave_count(), 0);

    // The local offer is still outstanding, so a good answer completes it.
    test.inject("bob", SignalPayload::Answer(SessionDescription::answer("fake:900:answer:1")))
        .await;
    assert!(wait_until(2000, || transport.remote_descriptions().len() == 1).await);

    transport.emit(TransportEvent::ConnectivityChanged(ConnectivityState::Connected));
    wait_state(&test.session, NegotiationState::Connected).await;
}
