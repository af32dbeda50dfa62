use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("invalid metadata frame {0:?}")]
    InvalidMetadata(String),

    #[error("binary chunk of {0} bytes received without a metadata frame")]
    UnexpectedChunk(usize),

    #[error("size mismatch for {filename:?}: expected {expected} bytes, received {received}")]
    SizeMismatch {
        filename: String,
        expected: u64,
        received: u64,
    },
}
