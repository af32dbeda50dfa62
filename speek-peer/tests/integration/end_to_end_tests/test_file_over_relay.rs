use bytes::Bytes;
use speek_core::{MeetingId, ParticipantId};
use speek_peer::{
    EventKind, NegotiationState, PeerSession, SessionDeps, SessionEvent,
    VirtualCapabilityProvider,
};
use speek_relay::{LocalSignalChannel, RoomRelay};
use std::sync::Arc;

use crate::integration::{MEETING, data_config, init_tracing, wait_state};
use crate::utils::{EventRecorder, FakeNetwork, FakeTransportFactory};

fn spawn_member(relay: &RoomRelay, network: &Arc<FakeNetwork>, identity: &str) -> PeerSession {
    let deps = SessionDeps {
        signal: Arc::new(LocalSignalChannel::new(relay.clone())),
        transports: Arc::new(FakeTransportFactory::on(Arc::clone(network))),
        capabilities: Arc::new(VirtualCapabilityProvider::data_only()),
    };
    PeerSession::spawn_with_identity(ParticipantId::from(identity), data_config(), deps)
}

#[tokio::test]
async fn test_file_over_relay() {
    init_tracing();

    let relay = RoomRelay::new();
    let network = FakeNetwork::new();

    let alice = spawn_member(&relay, &network, "alice");
    let bob = spawn_member(&relay, &network, "bob");
    let alice_events = EventRecorder::attach(&alice);
    let bob_events = EventRecorder::attach(&bob);

    // Alice's first offer goes to an empty room; bob's offer then collides with it.
    alice.connect(MEETING).unwrap();
    wait_state(&alice, NegotiationState::Negotiating).await;
    bob.connect(MEETING).unwrap();

    wait_state(&alice, NegotiationState::Connected).await;
    wait_state(&bob, NegotiationState::Connected).await;
    assert!(alice_events.wait_for(EventKind::DataChannelReady, 1, 2000).await);
    assert_eq!(relay.members(&MeetingId::from(MEETING)).len(), 2);

    let data = Bytes::from((0..50_000u32).map(|i| (i % 241) as u8).collect::<Vec<u8>>());
    alice.upload("demo.webm", data.clone()).unwrap();

    assert!(bob_events.wait_for(EventKind::FileReceived, 1, 2000).await);
    match &bob_events.of_kind(EventKind::FileReceived)[0] {
        SessionEvent::FileReceived(file) => {
            assert_eq!(file.filename, "demo.webm");
            assert_eq!(file.data, data);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(bob_events.count(EventKind::TransferFailed), 0);

    bob.close().await;
    assert_eq!(relay.members(&MeetingId::from(MEETING)).len(), 1);
    alice.close().await;
    assert_eq!(relay.room_count(), 0);
}
