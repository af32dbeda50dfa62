use crate::capability::LocalCapability;
use crate::error::TransportError;
use crate::transport::TransportEventSink;
use async_trait::async_trait;
use bytes::Bytes;
use speek_core::{ConnectivityCandidate, DescriptionKind, SessionDescription};
use std::sync::Arc;

/// Writable end of a data channel.
#[async_trait]
pub trait DataChannel: Send + Sync {
    fn label(&self) -> &str;

    async fn send_text(&self, text: &str) -> Result<(), TransportError>;

    async fn send_binary(&self, data: &Bytes) -> Result<(), TransportError>;
}

/// The peer connection a session negotiates. Opaque to the negotiator beyond
/// these operations; notifications flow through the [`TransportEventSink`]
/// given to the [`TransportFactory`].
#[async_trait]
pub trait PeerTransport: Send + Sync {
    async fn create_local_description(
        &self,
        kind: DescriptionKind,
    ) -> Result<SessionDescription, TransportError>;

    async fn apply_local_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), TransportError>;

    /// Discards a local offer that has not been answered yet.
    async fn rollback_local_description(&self) -> Result<(), TransportError>;

    async fn apply_remote_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), TransportError>;

    async fn add_connectivity_candidate(
        &self,
        candidate: &ConnectivityCandidate,
    ) -> Result<(), TransportError>;

    async fn create_data_channel(&self, label: &str)
    -> Result<Arc<dyn DataChannel>, TransportError>;

    /// Adds the capability's local tracks to the connection.
    async fn attach_capability(&self, capability: &LocalCapability)
    -> Result<(), TransportError>;

    async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        events: TransportEventSink,
    ) -> Result<Arc<dyn PeerTransport>, TransportError>;
}
