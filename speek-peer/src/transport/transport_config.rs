use speek_core::IceServerConfig;

/// Settings for the webrtc-backed transport.
#[derive(Debug, Clone)]
pub struct RtcTransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for RtcTransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
        }
    }
}
