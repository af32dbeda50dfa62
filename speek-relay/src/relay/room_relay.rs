use crate::relay::{MeetingRoom, Outbox};
use dashmap::DashMap;
use speek_core::{MeetingId, SessionId, SignalMessage};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Default)]
struct RelayInner {
    rooms: DashMap<MeetingId, MeetingRoom>,
    memberships: DashMap<SessionId, MeetingId>,
}

/// Groups signal channels by meeting and fans messages out to the other members.
///
/// Each room's membership and fan-out are mutated under that room's map
/// entry, so `join`, `leave` and `route` are serialized per room and messages
/// from one sender reach every recipient in send order.
#[derive(Clone, Default)]
pub struct RoomRelay {
    inner: Arc<RelayInner>,
}

impl RoomRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `session_id` to `meeting_id`, leaving any room it was in before.
    pub fn join(&self, session_id: SessionId, meeting_id: MeetingId, outbox: Outbox) {
        if let Some(previous) = self
            .inner
            .memberships
            .insert(session_id, meeting_id.clone())
        {
            if previous != meeting_id {
                self.remove_member(&previous, &session_id);
            }
        }

        self.inner
            .rooms
            .entry(meeting_id.clone())
            .or_insert_with(|| {
                info!("Creating new room: {}", meeting_id);
                MeetingRoom::default()
            })
            .insert(session_id, outbox);

        debug!("Session {} joined room {}", session_id, meeting_id);
    }

    /// Removes `session_id` from its room. Returns the room it was in.
    pub fn leave(&self, session_id: &SessionId) -> Option<MeetingId> {
        let (_, meeting_id) = self.inner.memberships.remove(session_id)?;
        self.remove_member(&meeting_id, session_id);
        debug!("Session {} left room {}", session_id, meeting_id);
        Some(meeting_id)
    }

    /// Delivers `message` to every member of `meeting_id` except `sender`.
    ///
    /// An unknown room has no recipients; that is not an error.
    pub fn route(&self, sender: &SessionId, meeting_id: &MeetingId, message: SignalMessage) -> usize {
        let (delivered, closed) = {
            let Some(mut room) = self.inner.rooms.get_mut(meeting_id) else {
                debug!(
                    "Dropping {} for unknown room {}",
                    message.kind_name(),
                    meeting_id
                );
                return 0;
            };
            room.broadcast(sender, &message)
        };

        if !closed.is_empty() {
            for session_id in &closed {
                info!("Pruning closed session {} from room {}", session_id, meeting_id);
                self.inner
                    .memberships
                    .remove_if(session_id, |_, room| room == meeting_id);
            }
            self.drop_if_empty(meeting_id);
        }

        delivered
    }

    pub fn members(&self, meeting_id: &MeetingId) -> Vec<SessionId> {
        self.inner
            .rooms
            .get(meeting_id)
            .map(|room| room.member_ids())
            .unwrap_or_default()
    }

    pub fn room_of(&self, session_id: &SessionId) -> Option<MeetingId> {
        self.inner
            .memberships
            .get(session_id)
            .map(|meeting| meeting.clone())
    }

    pub fn room_count(&self) -> usize {
        self.inner.rooms.len()
    }

    fn remove_member(&self, meeting_id: &MeetingId, session_id: &SessionId) {
        if let Some(mut room) = self.inner.rooms.get_mut(meeting_id) {
            room.remove(session_id);
        }
        self.drop_if_empty(meeting_id);
    }

    fn drop_if_empty(&self, meeting_id: &MeetingId) {
        if self
            .inner
            .rooms
            .remove_if(meeting_id, |_, room| room.is_empty())
            .is_some()
        {
            info!("Room {} is empty, removing", meeting_id);
        }
    }
}
