use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq)]
pub struct TransferId(pub Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Send,
    Receive,
}

/// Progress snapshot published after every chunk.
///
/// A snapshot with `transferred == 0` after the last chunk marks completion.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    pub id: TransferId,
    pub direction: TransferDirection,
    pub filename: String,
    pub transferred: u64,
    pub total: Option<u64>,
}

impl TransferProgress {
    /// `transferred / total * 100`; unknown or empty totals report 0 until reset.
    pub fn percent(&self) -> f64 {
        match self.total {
            Some(total) if total > 0 => self.transferred as f64 / total as f64 * 100.0,
            _ => 0.0,
        }
    }
}

/// A completely reassembled inbound file, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFile {
    pub id: TransferId,
    pub filename: String,
    pub data: Bytes,
}
