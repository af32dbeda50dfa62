use crate::error::TransportError;
use crate::transport::DataChannel;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use webrtc::data_channel::RTCDataChannel;

pub struct RtcDataChannel {
    channel: Arc<RTCDataChannel>,
}

impl RtcDataChannel {
    pub fn new(channel: Arc<RTCDataChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl DataChannel for RtcDataChannel {
    fn label(&self) -> &str {
        self.channel.label()
    }

    async fn send_text(&self, text: &str) -> Result<(), TransportError> {
        self.channel.send_text(text.to_owned()).await?;
        Ok(())
    }

    async fn send_binary(&self, data: &Bytes) -> Result<(), TransportError> {
        self.channel.send(data).await?;
        Ok(())
    }
}
