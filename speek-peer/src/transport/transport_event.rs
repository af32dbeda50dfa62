use crate::capability::MediaKind;
use crate::session::SessionInput;
use speek_core::ConnectivityCandidate;
use speek_core::transfer::Frame;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: Option<MediaKind>,
}

/// Notifications a peer transport pushes back into its session.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A local candidate was gathered and must be trickled to the remote peer.
    CandidateDiscovered(ConnectivityCandidate),
    ConnectivityChanged(ConnectivityState),
    TrackAdded(RemoteTrack),
    /// The outbound data channel with this label is open for writing.
    DataChannelOpen(String),
    /// The remote peer opened a data channel towards us.
    InboundDataChannel(String),
    /// A message arrived on the inbound data channel.
    Frame(Frame),
}

/// Where a transport delivers its [`TransportEvent`]s.
///
/// Events are tagged with the generation of the session that created the
/// transport, so nothing it reports after the session closed is acted upon.
#[derive(Clone)]
pub struct TransportEventSink {
    generation: u64,
    tx: mpsc::UnboundedSender<SessionInput>,
}

impl TransportEventSink {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<SessionInput>) -> Self {
        Self { generation, tx }
    }

    /// Returns false once the session is gone.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.tx
            .send(SessionInput::Transport {
                generation: self.generation,
                event,
            })
            .is_ok()
    }
}
