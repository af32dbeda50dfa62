use async_trait::async_trait;
use speek_peer::{
    CapabilityError, CapabilityProvider, CaptureConstraints, LocalCapability, MediaKind,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Provider whose acquisition always fails with the configured error.
#[derive(Clone)]
pub struct FailingCapabilityProvider {
    error: CapabilityError,
}

impl FailingCapabilityProvider {
    pub fn new(error: CapabilityError) -> Self {
        Self { error }
    }

    pub fn denied() -> Self {
        Self::new(CapabilityError::Denied(MediaKind::Video))
    }
}

#[async_trait]
impl CapabilityProvider for FailingCapabilityProvider {
    async fn acquire(
        &self,
        _constraints: &CaptureConstraints,
    ) -> Result<LocalCapability, CapabilityError> {
        Err(self.error.clone())
    }

    async fn release(&self, _capability: &LocalCapability) {}
}

/// Data-only provider that holds every acquisition until [`open`](Self::open)
/// is called, and counts releases.
#[derive(Clone)]
pub struct GatedCapabilityProvider {
    gate: Arc<Semaphore>,
    releases: Arc<AtomicUsize>,
}

impl GatedCapabilityProvider {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Lets one pending acquisition complete.
    pub fn open(&self) {
        self.gate.add_permits(1);
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CapabilityProvider for GatedCapabilityProvider {
    async fn acquire(
        &self,
        _constraints: &CaptureConstraints,
    ) -> Result<LocalCapability, CapabilityError> {
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| CapabilityError::Unavailable(MediaKind::Audio))?;
        permit.forget();

        Ok(LocalCapability {
            stream_id: "gated-stream".into(),
            tracks: Vec::new(),
        })
    }

    async fn release(&self, _capability: &LocalCapability) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
