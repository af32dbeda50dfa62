use speek_core::{SessionId, SignalMessage};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Where the relay pushes messages for one member.
pub type Outbox = mpsc::UnboundedSender<SignalMessage>;

/// Members of one meeting and their outboxes.
#[derive(Default)]
pub struct MeetingRoom {
    members: HashMap<SessionId, Outbox>,
}

impl MeetingRoom {
    pub fn insert(&mut self, session_id: SessionId, outbox: Outbox) {
        self.members.insert(session_id, outbox);
    }

    pub fn remove(&mut self, session_id: &SessionId) -> bool {
        self.members.remove(session_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_ids(&self) -> Vec<SessionId> {
        self.members.keys().copied().collect()
    }

    /// Queues `message` for every member except `sender`.
    ///
    /// Returns the number of recipients and the members whose outbox turned
    /// out to be closed; those are dropped from the room.
    pub fn broadcast(&mut self, sender: &SessionId, message: &SignalMessage) -> (usize, Vec<SessionId>) {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (member, outbox) in &self.members {
            if member == sender {
                continue;
            }
            if outbox.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*member);
            }
        }

        for member in &closed {
            self.members.remove(member);
        }

        (delivered, closed)
    }
}
