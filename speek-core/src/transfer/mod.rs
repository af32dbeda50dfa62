//! Chunked file transfer over a message-oriented data channel.
//!
//! A transfer is one textual metadata frame (`"<filename>;<size>"`) followed by
//! binary chunks of at most [`CHUNK_SIZE`] bytes. There is no end marker:
//! the receiver completes once it has seen the announced number of bytes.

mod error;
mod frame;
mod inbound;
mod metadata;
mod outbound;
mod progress;

pub use error::TransferError;
pub use frame::Frame;
pub use inbound::{Reassembler, Reception};
pub use metadata::FileMetadata;
pub use outbound::OutboundTransfer;
pub use progress::{ReceivedFile, TransferDirection, TransferId, TransferProgress};

pub const CHUNK_SIZE: usize = 16384;
