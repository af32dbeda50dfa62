use crate::relay::{Outbox, RoomRelay};
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use speek_core::{MeetingId, RelayFrame, SessionId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(relay): State<RoomRelay>,
) -> impl IntoResponse {
    let session_id = SessionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, session_id, relay))
}

async fn handle_socket(socket: WebSocket, session_id: SessionId, relay: RoomRelay) {
    info!("New WebSocket connection: {}", session_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<SignalMessage>();

    let mut send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let json = match serde_json::to_string(&RelayFrame::Signal(message)) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to encode relayed message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let relay = relay.clone();

        async move {
            let mut joined = None;

            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<RelayFrame>(&text) {
                        Ok(frame) => handle_frame(&relay, session_id, &tx, &mut joined, frame),
                        Err(e) => warn!("Invalid RelayFrame from {}: {:?}", session_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    relay.leave(&session_id);
    info!("WebSocket disconnected: {}", session_id);
}

/// Applies one inbound frame from the socket owned by `session_id`.
pub fn handle_frame(
    relay: &RoomRelay,
    session_id: SessionId,
    outbox: &Outbox,
    joined: &mut Option<MeetingId>,
    frame: RelayFrame,
) {
    match frame {
        RelayFrame::Join {
            meeting_id,
            sender_id,
        } => {
            info!(
                "Participant {} ({}) joins meeting '{}'",
                sender_id, session_id, meeting_id
            );
            relay.join(session_id, meeting_id.clone(), outbox.clone());
            *joined = Some(meeting_id);
        }
        RelayFrame::Leave => {
            relay.leave(&session_id);
            *joined = None;
        }
        RelayFrame::Signal(message) => {
            let Some(meeting_id) = joined.as_ref() else {
                warn!("{} from {} before join, dropping", message.kind_name(), session_id);
                return;
            };
            if message.meeting_id != *meeting_id {
                warn!(
                    "{} from {} addressed to '{}' but joined '{}', dropping",
                    message.kind_name(),
                    session_id,
                    message.meeting_id,
                    meeting_id
                );
                return;
            }
            relay.route(&session_id, meeting_id, message);
        }
    }
}
