use super::payload::{select_payload, ByteSource};
use crate::common::{ConnectionError, NcError, SendRequest, Settings, TransferError};
use crate::transfer::{self, ProgressTracker, TransferBuffer};
use std::net::SocketAddr;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream};

/// Outcome of a completed send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub bytes_written: u64,
    pub peer: SocketAddr,
}

/// Open a TCP stream to `peer`
pub async fn connect(peer: SocketAddr) -> Result<TcpStream, ConnectionError> {
    let socket = if peer.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(ConnectionError::SocketCreationFailed)?;

    socket
        .connect(peer)
        .await
        .map_err(|source| ConnectionError::ConnectFailed { addr: peer, source })
}

/// Copy `source` into `sink` one chunk at a time.
///
/// A bounded source stops as soon as its limit is reached, each read is
/// capped at the bytes still owed so the total never overshoots.
/// Returns the number of bytes written, which is never zero.
pub async fn stream<W>(
    sink: &mut W,
    source: &mut ByteSource,
    buffer: &mut TransferBuffer,
    progress: &mut ProgressTracker,
) -> Result<u64, TransferError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let limit = source.limit();
    let mut bytes_written = 0u64;

    loop {
        let want = match limit {
            Some(limit) if bytes_written >= limit => break,
            Some(limit) => (limit - bytes_written).min(buffer.capacity() as u64) as usize,
            None => buffer.capacity(),
        };

        let chunk = buffer.zeroed_chunk(want);
        let n = source.read_chunk(chunk).await?;
        if n == 0 {
            break;
        }

        transfer::write_chunk(sink, &chunk[..n]).await?;
        bytes_written += n as u64;
        progress.advance(n);
        tracing::trace!(chunk = n, total = bytes_written, "chunk sent");
    }

    if bytes_written == 0 {
        return Err(TransferError::EmptyTransfer);
    }
    Ok(bytes_written)
}

/// Release the payload and signal end of stream to the peer
pub async fn close(mut connection: TcpStream, source: ByteSource) {
    source.release().await;
    if let Err(e) = connection.shutdown().await {
        tracing::debug!(error = %e, "shutdown of client stream failed");
    }
}

/// Select the payload, connect, stream it, close.
///
/// The payload is chosen before connecting so an invalid byte count never
/// reaches the wire.
pub async fn run_client(
    peer: SocketAddr,
    request: &SendRequest,
    settings: &Settings,
    progress: &mut ProgressTracker,
) -> Result<SendReport, NcError> {
    let mut source = select_payload(request).await?;

    let mut connection = connect(peer).await?;
    tracing::info!(%peer, "connected to server");

    let mut buffer = TransferBuffer::new(settings.chunk_size);
    let result = stream(&mut connection, &mut source, &mut buffer, progress).await;
    close(connection, source).await;

    match result {
        Ok(bytes_written) => {
            progress.finish();
            tracing::info!(
                bytes = bytes_written,
                size = %transfer::format_bytes(bytes_written),
                "payload sent"
            );
            Ok(SendReport {
                bytes_written,
                peer,
            })
        }
        Err(e) => {
            progress.abandon();
            Err(e.into())
        }
    }
}
