use crate::capability::{
    CapabilityError, CapabilityProvider, CaptureConstraints, DeviceSelection, LocalCapability,
    LocalTrack, MediaKind,
};
use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub id: String,
    pub kind: MediaKind,
    pub label: String,
}

/// Capability provider backed by a fixed device list.
///
/// Tracks it hands out are descriptors only; feeding samples into them is up
/// to whoever owns the real capture devices.
#[derive(Debug, Clone, Default)]
pub struct VirtualCapabilityProvider {
    devices: Vec<DeviceInfo>,
}

impl VirtualCapabilityProvider {
    pub fn new(devices: Vec<DeviceInfo>) -> Self {
        Self { devices }
    }

    /// Provider without any devices, for data-only sessions.
    pub fn data_only() -> Self {
        Self::default()
    }

    pub fn devices(&self) -> &[DeviceInfo] {
        &self.devices
    }

    fn resolve(
        &self,
        kind: MediaKind,
        selection: &DeviceSelection,
    ) -> Result<Option<&DeviceInfo>, CapabilityError> {
        match selection {
            DeviceSelection::Disabled => Ok(None),
            DeviceSelection::Default => self
                .devices
                .iter()
                .find(|d| d.kind == kind)
                .map(Some)
                .ok_or(CapabilityError::Unavailable(kind)),
            DeviceSelection::Device(id) => self
                .devices
                .iter()
                .find(|d| d.kind == kind && &d.id == id)
                .map(Some)
                .ok_or_else(|| CapabilityError::DeviceNotFound(id.clone())),
        }
    }
}

#[async_trait]
impl CapabilityProvider for VirtualCapabilityProvider {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<LocalCapability, CapabilityError> {
        let mut tracks = Vec::new();

        for kind in [MediaKind::Audio, MediaKind::Video] {
            if let Some(device) = self.resolve(kind, constraints.selection(kind))? {
                tracks.push(LocalTrack {
                    id: format!("{}-{}", kind, Uuid::new_v4()),
                    kind,
                    device_id: device.id.clone(),
                });
            }
        }

        Ok(LocalCapability {
            stream_id: Uuid::new_v4().to_string(),
            tracks,
        })
    }

    async fn release(&self, capability: &LocalCapability) {
        debug!(
            "Released capability {} ({} tracks)",
            capability.stream_id,
            capability.tracks.len()
        );
    }
}
