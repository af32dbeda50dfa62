use speek_core::{MeetingId, ParticipantId, SessionDescription, SignalMessage, SignalPayload};

use crate::integration::{TestSession, init_tracing};

#[tokio::test]
async fn test_signal_for_other_meeting_is_dropped() {
    init_tracing();

    let test = TestSession::spawn("alice");
    let transport = test.connect_and_offer().await;

    let stray = SignalMessage::new(
        MeetingId::from("retro"),
        ParticipantId::from("zed"),
        SignalPayload::Offer(SessionDescription::offer("fake:901:offer:1")),
    );
    assert!(test.signal.inject(stray).await);
    test.inject("zed", SignalPayload::Offer(SessionDescription::offer("fake:902:offer:1")))
        .await;
    assert!(test.signal.wait_for_emitted("answer", 1, 2000).await);

    let applied: Vec<String> = transport
        .remote_descriptions()
        .into_iter()
        .map(|description| description.sdp)
        .collect();
    assert_eq!(applied, vec!["fake:902:offer:1".to_string()]);
    assert_eq!(test.signal.emitted_of("answer").await.len(), 1);
}
