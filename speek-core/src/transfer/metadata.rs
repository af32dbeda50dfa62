use crate::transfer::TransferError;
use std::fmt;

/// Contents of the metadata frame that opens a transfer.
///
/// `total_size` is `None` for legacy senders that only announce a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub filename: String,
    pub total_size: Option<u64>,
}

impl FileMetadata {
    pub fn new(filename: impl Into<String>, total_size: u64) -> Self {
        Self {
            filename: filename.into(),
            total_size: Some(total_size),
        }
    }

    /// Parses `"<filename>;<size>"`, splitting on the last `;` so that
    /// filenames may contain one.
    pub fn parse(text: &str) -> Result<Self, TransferError> {
        let (filename, total_size) = match text.rsplit_once(';') {
            Some((name, size)) => {
                let size = size
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| TransferError::InvalidMetadata(text.to_owned()))?;
                (name, Some(size))
            }
            None => (text, None),
        };

        if filename.is_empty() {
            return Err(TransferError::InvalidMetadata(text.to_owned()));
        }

        Ok(Self {
            filename: filename.to_owned(),
            total_size,
        })
    }
}

impl fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_size {
            Some(size) => write!(f, "{};{}", self.filename, size),
            None => f.write_str(&self.filename),
        }
    }
}
