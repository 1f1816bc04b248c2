//! Choosing which bytes the client sends.

use crate::common::{ConfigError, NcError, Payload, SendRequest, TransferError};
use crate::transfer;
use std::io::{Cursor, SeekFrom};
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncSeekExt;

enum Reader {
    Message(Cursor<Vec<u8>>),
    File { file: File, path: PathBuf },
}

/// The selected payload, ready to be drained chunk by chunk
pub struct ByteSource {
    reader: Reader,
    limit: Option<u64>,
}

impl ByteSource {
    /// In-memory payload, already sliced
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            reader: Reader::Message(Cursor::new(bytes.into())),
            limit: None,
        }
    }

    /// Upper bound on bytes to send, `None` means until end of source
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub(crate) async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize, TransferError> {
        match &mut self.reader {
            Reader::Message(cursor) => transfer::read_chunk(cursor, buf).await,
            Reader::File { file, .. } => transfer::read_chunk(file, buf).await,
        }
    }

    /// Rewind and drop the underlying file, if any
    pub(crate) async fn release(self) {
        if let Reader::File { mut file, path } = self.reader {
            if let Err(e) = file.seek(SeekFrom::Start(0)).await {
                tracing::debug!(path = %path.display(), error = %e, "rewind before close failed");
            }
        }
    }
}

/// Pick the payload bytes for `request` without touching the network
pub async fn select_payload(request: &SendRequest) -> Result<ByteSource, NcError> {
    let limit = request.byte_limit.map(NonZeroU64::get);

    match &request.payload {
        Payload::Message(message) => Ok(select_message(message, request.offset, limit)?),
        Payload::File(path) => Ok(open_file_slice(path, request.offset, limit).await?),
    }
}

fn select_message(
    message: &str,
    offset: u64,
    limit: Option<u64>,
) -> Result<ByteSource, ConfigError> {
    let bytes = message.as_bytes();
    let available = bytes.len() as u64;

    match limit {
        Some(requested) if requested > available => Err(ConfigError::InvalidByteCount {
            requested,
            available,
        }),
        Some(requested) if offset == 0 => Ok(ByteSource::from_bytes(&bytes[..requested as usize])),
        _ => {
            if offset != 0 {
                tracing::warn!(offset, "offset has no effect in message mode, sending whole message");
            }
            Ok(ByteSource::from_bytes(bytes))
        }
    }
}

async fn open_file_slice(
    path: &Path,
    offset: u64,
    limit: Option<u64>,
) -> Result<ByteSource, TransferError> {
    let mut file = File::open(path)
        .await
        .map_err(|source| TransferError::FileOpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

    if offset > 0 {
        file.seek(SeekFrom::Start(offset))
            .await
            .map_err(TransferError::ReadFailed)?;
    }

    tracing::debug!(path = %path.display(), offset, ?limit, "source file opened");

    Ok(ByteSource {
        reader: Reader::File {
            file,
            path: path.to_path_buf(),
        },
        limit,
    })
}
