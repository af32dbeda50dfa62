use crate::transfer::{
    FileMetadata, Frame, TransferDirection, TransferId, TransferProgress,
};
use bytes::Bytes;
use std::collections::VecDeque;

/// Send side of one file transfer.
///
/// The caller takes [`peek_frame`](Self::peek_frame), writes it to the data
/// channel and then calls [`advance`](Self::advance). Once
/// [`is_complete`](Self::is_complete) reports true, [`finish`](Self::finish)
/// produces the zero-progress completion snapshot.
#[derive(Debug)]
pub struct OutboundTransfer {
    id: TransferId,
    filename: String,
    total_size: u64,
    transferred: u64,
    metadata_sent: bool,
    buffer: VecDeque<Bytes>,
}

impl OutboundTransfer {
    pub fn new(id: TransferId, filename: impl Into<String>, data: Bytes, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let total_size = data.len() as u64;

        let mut buffer = VecDeque::with_capacity(data.len().div_ceil(chunk_size));
        let mut offset = 0;
        while offset < data.len() {
            let end = (offset + chunk_size).min(data.len());
            buffer.push_back(data.slice(offset..end));
            offset = end;
        }

        Self {
            id,
            filename: filename.into(),
            total_size,
            transferred: 0,
            metadata_sent: false,
            buffer,
        }
    }

    pub fn id(&self) -> TransferId {
        self.id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// The next frame to write, without consuming it.
    pub fn peek_frame(&self) -> Option<Frame> {
        if !self.metadata_sent {
            let metadata = FileMetadata::new(self.filename.clone(), self.total_size);
            return Some(Frame::Text(metadata.to_string()));
        }
        self.buffer.front().cloned().map(Frame::Binary)
    }

    /// Marks the peeked frame as written. Returns a progress snapshot when the
    /// frame was a chunk.
    pub fn advance(&mut self) -> Option<TransferProgress> {
        if !self.metadata_sent {
            self.metadata_sent = true;
            return None;
        }

        let chunk = self.buffer.pop_front()?;
        self.transferred += chunk.len() as u64;
        Some(self.progress())
    }

    pub fn is_complete(&self) -> bool {
        self.metadata_sent && self.buffer.is_empty()
    }

    /// Resets the counter and returns the completion snapshot.
    pub fn finish(&mut self) -> TransferProgress {
        self.buffer.clear();
        self.transferred = 0;
        self.progress()
    }

    pub fn progress(&self) -> TransferProgress {
        TransferProgress {
            id: self.id,
            direction: TransferDirection::Send,
            filename: self.filename.clone(),
            transferred: self.transferred,
            total: Some(self.total_size),
        }
    }
}
