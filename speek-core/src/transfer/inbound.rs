use crate::transfer::{
    FileMetadata, Frame, ReceivedFile, TransferDirection, TransferError, TransferId,
    TransferProgress,
};
use bytes::{Bytes, BytesMut};

/// What a single inbound frame did to the receive side.
#[derive(Debug, Clone, PartialEq)]
pub enum Reception {
    /// A metadata frame opened a new transfer.
    Started(TransferProgress),
    /// A chunk was appended.
    Progress(TransferProgress),
    /// All bytes arrived; `reset` is the zero-progress completion snapshot.
    Completed {
        file: ReceivedFile,
        reset: TransferProgress,
    },
    /// An unfinished transfer was replaced by a new metadata frame.
    Abandoned(TransferProgress),
}

#[derive(Debug)]
struct InboundTransfer {
    id: TransferId,
    metadata: FileMetadata,
    transferred: u64,
    buffer: Vec<Bytes>,
}

impl InboundTransfer {
    fn progress(&self) -> TransferProgress {
        TransferProgress {
            id: self.id,
            direction: TransferDirection::Receive,
            filename: self.metadata.filename.clone(),
            transferred: self.transferred,
            total: self.metadata.total_size,
        }
    }

    fn into_completed(mut self) -> Reception {
        let mut data = BytesMut::with_capacity(self.transferred as usize);
        for chunk in self.buffer.drain(..) {
            data.extend_from_slice(&chunk);
        }
        self.transferred = 0;

        Reception::Completed {
            reset: self.progress(),
            file: ReceivedFile {
                id: self.id,
                filename: self.metadata.filename,
                data: data.freeze(),
            },
        }
    }
}

/// Receive side of the chunk protocol. Holds at most one open transfer.
#[derive(Debug)]
pub struct Reassembler {
    chunk_size: usize,
    current: Option<InboundTransfer>,
}

impl Reassembler {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            current: None,
        }
    }

    pub fn in_progress(&self) -> Option<TransferProgress> {
        self.current.as_ref().map(InboundTransfer::progress)
    }

    /// Drops any partially received transfer.
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn accept(&mut self, frame: Frame) -> Result<Vec<Reception>, TransferError> {
        match frame {
            Frame::Text(text) => self.accept_metadata(&text),
            Frame::Binary(chunk) => self.accept_chunk(chunk),
        }
    }

    fn accept_metadata(&mut self, text: &str) -> Result<Vec<Reception>, TransferError> {
        let metadata = FileMetadata::parse(text)?;
        let mut receptions = Vec::new();

        if let Some(previous) = self.current.take() {
            if previous.metadata.total_size.is_none() {
                // Legacy senders give no size; the next file implies the end of this one.
                receptions.push(previous.into_completed());
            } else {
                receptions.push(Reception::Abandoned(previous.progress()));
            }
        }

        let transfer = InboundTransfer {
            id: TransferId::new(),
            metadata,
            transferred: 0,
            buffer: Vec::new(),
        };
        receptions.push(Reception::Started(transfer.progress()));

        if transfer.metadata.total_size == Some(0) {
            receptions.push(transfer.into_completed());
        } else {
            self.current = Some(transfer);
        }

        Ok(receptions)
    }

    fn accept_chunk(&mut self, chunk: Bytes) -> Result<Vec<Reception>, TransferError> {
        let Some(mut transfer) = self.current.take() else {
            return Err(TransferError::UnexpectedChunk(chunk.len()));
        };

        let is_short = chunk.len() < self.chunk_size;
        transfer.transferred += chunk.len() as u64;
        transfer.buffer.push(chunk);

        // Sized transfers end on the byte count alone; chunk length only matters for legacy senders.
        match transfer.metadata.total_size {
            Some(expected) if transfer.transferred > expected => {
                Err(TransferError::SizeMismatch {
                    filename: transfer.metadata.filename,
                    expected,
                    received: transfer.transferred,
                })
            }
            Some(expected) if transfer.transferred == expected => {
                let progress = transfer.progress();
                Ok(vec![Reception::Progress(progress), transfer.into_completed()])
            }
            None if is_short => {
                let progress = transfer.progress();
                Ok(vec![Reception::Progress(progress), transfer.into_completed()])
            }
            _ => {
                let progress = transfer.progress();
                self.current = Some(transfer);
                Ok(vec![Reception::Progress(progress)])
            }
        }
    }
}
