use speek_core::SignalPayload;
use speek_relay::RoomRelay;

use crate::integration::init_tracing;
use crate::utils::TestMember;

#[tokio::test]
async fn test_rapid_candidates() {
    init_tracing();

    let relay = RoomRelay::new();
    let alice = TestMember::join(&relay, "standup", "alice").await.unwrap();
    let mut bob = TestMember::join(&relay, "standup", "bob").await.unwrap();

    let sender = tokio::spawn(async move {
        for n in 0..200 {
            alice.send_candidate(&format!("candidate:{n}")).await.unwrap();
        }
        alice
    });

    for n in 0..200 {
        let message = bob.next_message(2000).await.unwrap();
        match message.payload {
            SignalPayload::Candidate(candidate) => {
                assert_eq!(candidate.candidate, format!("candidate:{n}"))
            }
            other => panic!("expected candidate, got {other:?}"),
        }
    }

    let _alice = sender.await.unwrap();
}
