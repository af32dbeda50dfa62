use crate::capability::{LocalCapability, MediaKind};
use crate::error::TransportError;
use crate::transport::{
    ConnectivityState, DataChannel, PeerTransport, RemoteTrack, RtcDataChannel,
    RtcTransportConfig, TransportEvent, TransportEventSink, TransportFactory,
};
use anyhow::Result;
use async_trait::async_trait;
use speek_core::transfer::Frame;
use speek_core::{ConnectivityCandidate, DescriptionKind, SessionDescription};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Creates one [`RtcTransport`] per session.
#[derive(Clone, Default)]
pub struct RtcTransportFactory {
    config: RtcTransportConfig,
}

impl RtcTransportFactory {
    pub fn new(config: RtcTransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        events: TransportEventSink,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let transport = RtcTransport::new(self.config.clone(), events)
            .await
            .map_err(|e| TransportError::Setup(format!("{e:#}")))?;
        Ok(Arc::new(transport))
    }
}

/// Peer transport on top of a webrtc-rs `RTCPeerConnection`.
pub struct RtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    events: TransportEventSink,
    local_tracks: Mutex<Vec<Arc<TrackLocalStaticSample>>>,
}

impl RtcTransport {
    pub async fn new(config: RtcTransportConfig, events: TransportEventSink) -> Result<Self> {
        // Codecs are registered even for data-only sessions so remote tracks can be accepted.
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .into_iter()
                .map(|server| RTCIceServer {
                    urls: server.urls,
                    username: server.username.unwrap_or_default(),
                    credential: server.credential.unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();
                Box::pin(async move {
                    info!("Peer Connection State changed: {:?}", s);
                    events.emit(TransportEvent::ConnectivityChanged(connectivity_state(s)));
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.emit(TransportEvent::CandidateDiscovered(ConnectivityCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                }));
            })
        }));

        let track_events = events.clone();
        peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _, _| {
            let events = track_events.clone();
            Box::pin(async move {
                let kind = match track.kind() {
                    RTPCodecType::Audio => Some(MediaKind::Audio),
                    RTPCodecType::Video => Some(MediaKind::Video),
                    _ => None,
                };
                events.emit(TransportEvent::TrackAdded(RemoteTrack {
                    id: track.id(),
                    stream_id: track.stream_id(),
                    kind,
                }));
            })
        }));

        // The remote side's outbound channel arrives here; it is our inbound one.
        let dc_events = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let events = dc_events.clone();
            Box::pin(async move {
                debug!("Inbound DataChannel '{}' created", dc.label());
                events.emit(TransportEvent::InboundDataChannel(dc.label().to_owned()));

                let msg_events = events.clone();
                dc.on_message(Box::new(move |msg: DataChannelMessage| {
                    let events = msg_events.clone();
                    Box::pin(async move {
                        let frame = if msg.is_string {
                            Frame::Text(String::from_utf8_lossy(&msg.data).into_owned())
                        } else {
                            Frame::Binary(msg.data)
                        };
                        events.emit(TransportEvent::Frame(frame));
                    })
                }));
            })
        }));

        Ok(Self {
            peer_connection,
            events,
            local_tracks: Mutex::new(Vec::new()),
        })
    }

    /// Sample track created for a capability track, for feeding captured media.
    pub async fn local_track(&self, track_id: &str) -> Option<Arc<TrackLocalStaticSample>> {
        self.local_tracks
            .lock()
            .await
            .iter()
            .find(|track| track.id() == track_id)
            .cloned()
    }
}

#[async_trait]
impl PeerTransport for RtcTransport {
    async fn create_local_description(
        &self,
        kind: DescriptionKind,
    ) -> Result<SessionDescription, TransportError> {
        let description = match kind {
            DescriptionKind::Offer => self.peer_connection.create_offer(None).await?,
            DescriptionKind::Answer => self.peer_connection.create_answer(None).await?,
        };
        Ok(SessionDescription {
            kind,
            sdp: description.sdp,
        })
    }

    async fn apply_local_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), TransportError> {
        let description = to_rtc_description(description)?;
        self.peer_connection
            .set_local_description(description)
            .await?;
        Ok(())
    }

    async fn rollback_local_description(&self) -> Result<(), TransportError> {
        let rollback: RTCSessionDescription =
            serde_json::from_value(serde_json::json!({ "type": "rollback", "sdp": "" }))
                .map_err(|e| TransportError::Rtc(e.to_string()))?;
        self.peer_connection.set_local_description(rollback).await?;
        Ok(())
    }

    async fn apply_remote_description(
        &self,
        description: &SessionDescription,
    ) -> Result<(), TransportError> {
        let description = to_rtc_description(description)?;
        self.peer_connection
            .set_remote_description(description)
            .await?;
        Ok(())
    }

    async fn add_connectivity_candidate(
        &self,
        candidate: &ConnectivityCandidate,
    ) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate.clone(),
            sdp_mid: candidate.sdp_mid.clone(),
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment.clone(),
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn create_data_channel(
        &self,
        label: &str,
    ) -> Result<Arc<dyn DataChannel>, TransportError> {
        let channel = self.peer_connection.create_data_channel(label, None).await?;

        let events = self.events.clone();
        let open_label = label.to_owned();
        channel.on_open(Box::new(move || {
            Box::pin(async move {
                info!("DataChannel '{}' open and ready", open_label);
                events.emit(TransportEvent::DataChannelOpen(open_label));
            })
        }));

        Ok(Arc::new(RtcDataChannel::new(channel)))
    }

    async fn attach_capability(
        &self,
        capability: &LocalCapability,
    ) -> Result<(), TransportError> {
        let mut local_tracks = self.local_tracks.lock().await;

        for track in &capability.tracks {
            let mime_type = match track.kind {
                MediaKind::Audio => MIME_TYPE_OPUS,
                MediaKind::Video => MIME_TYPE_VP8,
            };
            let sample_track = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: mime_type.to_owned(),
                    ..Default::default()
                },
                track.id.clone(),
                capability.stream_id.clone(),
            ));

            self.peer_connection
                .add_track(Arc::clone(&sample_track) as Arc<dyn TrackLocal + Send + Sync>)
                .await?;
            local_tracks.push(sample_track);
        }

        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if let Err(e) = self.peer_connection.close().await {
            warn!("Failed to close peer connection cleanly: {}", e);
            return Err(e.into());
        }
        Ok(())
    }
}

fn to_rtc_description(
    description: &SessionDescription,
) -> Result<RTCSessionDescription, TransportError> {
    let sdp = description.sdp.clone();
    let description = match description.kind {
        DescriptionKind::Offer => RTCSessionDescription::offer(sdp)?,
        DescriptionKind::Answer => RTCSessionDescription::answer(sdp)?,
    };
    Ok(description)
}

fn connectivity_state(state: RTCPeerConnectionState) -> ConnectivityState {
    match state {
        RTCPeerConnectionState::Connecting => ConnectivityState::Connecting,
        RTCPeerConnectionState::Connected => ConnectivityState::Connected,
        RTCPeerConnectionState::Disconnected => ConnectivityState::Disconnected,
        RTCPeerConnectionState::Failed => ConnectivityState::Failed,
        RTCPeerConnectionState::Closed => ConnectivityState::Closed,
        _ => ConnectivityState::New,
    }
}
