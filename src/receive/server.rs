use crate::common::{ConnectionError, ListenRequest, NcError, Settings, TransferError};
use crate::transfer::{self, ProgressTracker, TransferBuffer};
use std::fmt;
use std::io::SeekFrom;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};

/// What the server captured from its one client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveReport {
    pub total_bytes: u64,
    pub dest: PathBuf,
}

impl fmt::Display for ReceiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} bytes written to file '{}'",
            self.total_bytes,
            self.dest.display()
        )
    }
}

/// Bind to `addr` and start listening with a queue of `backlog` pending clients
pub fn bind_and_listen(addr: SocketAddr, backlog: u32) -> Result<TcpListener, ConnectionError> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(ConnectionError::SocketCreationFailed)?;

    socket
        .bind(addr)
        .map_err(|source| ConnectionError::BindFailed { addr, source })?;

    socket
        .listen(backlog)
        .map_err(ConnectionError::ListenFailed)
}

/// Wait for exactly one client
pub async fn accept_one(listener: &TcpListener) -> Result<(TcpStream, SocketAddr), ConnectionError> {
    listener
        .accept()
        .await
        .map_err(ConnectionError::AcceptFailed)
}

/// Drain `connection` into `dest` until the peer closes.
///
/// The output file is truncated first. It is returned flushed so the
/// caller can hand it to [`close`].
pub async fn receive<R>(
    connection: &mut R,
    dest: &Path,
    buffer: &mut TransferBuffer,
    progress: &mut ProgressTracker,
) -> Result<(ReceiveReport, File), TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut file = File::create(dest)
        .await
        .map_err(|source| TransferError::FileOpenFailed {
            path: dest.to_path_buf(),
            source,
        })?;

    let mut total_bytes = 0u64;
    loop {
        let chunk = buffer.full_chunk();
        let n = transfer::read_chunk(connection, chunk).await?;
        if n == 0 {
            break;
        }

        transfer::write_chunk(&mut file, &chunk[..n]).await?;
        total_bytes += n as u64;
        progress.advance(n);
        tracing::trace!(chunk = n, total = total_bytes, "chunk received");
    }

    file.flush().await.map_err(TransferError::WriteFailed)?;

    let report = ReceiveReport {
        total_bytes,
        dest: dest.to_path_buf(),
    };
    Ok((report, file))
}

/// Release the output file, the accepted stream and the listener
pub async fn close(connection: TcpStream, listener: TcpListener, mut file: File) {
    if let Err(e) = file.seek(SeekFrom::Start(0)).await {
        tracing::debug!(error = %e, "rewind of output file failed");
    }
    drop(file);
    drop(connection);
    drop(listener);
}

/// Accept one client on an already listening socket and capture its bytes
pub async fn serve_one(
    listener: TcpListener,
    request: &ListenRequest,
    settings: &Settings,
    progress: &mut ProgressTracker,
) -> Result<ReceiveReport, NcError> {
    let (mut connection, client) = accept_one(&listener).await?;
    tracing::info!(%client, "client connected");

    let mut buffer = TransferBuffer::new(settings.chunk_size);
    match receive(&mut connection, &request.dest, &mut buffer, progress).await {
        Ok((report, file)) => {
            close(connection, listener, file).await;
            progress.finish();
            tracing::info!(
                bytes = report.total_bytes,
                dest = %report.dest.display(),
                "transfer received"
            );
            Ok(report)
        }
        Err(e) => {
            progress.abandon();
            tracing::error!(
                error = %e,
                dest = %request.dest.display(),
                bytes = progress.total(),
                "receive failed"
            );
            Err(e.into())
        }
    }
}

/// Bind, listen, serve a single client, then return.
/// There is no accept loop: one connection per run.
pub async fn run_server(
    addr: SocketAddr,
    request: &ListenRequest,
    settings: &Settings,
    progress: &mut ProgressTracker,
) -> Result<ReceiveReport, NcError> {
    let listener = bind_and_listen(addr, settings.listen_backlog)?;
    match listener.local_addr() {
        Ok(local) => tracing::info!(addr = %local, "listening"),
        Err(e) => tracing::debug!(error = %e, "listening on unknown local address"),
    }

    serve_one(listener, request, settings, progress).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn report_wording() {
        let report = ReceiveReport {
            total_bytes: 5,
            dest: PathBuf::from("out.txt"),
        };
        assert_eq!(report.to_string(), "5 bytes written to file 'out.txt'");
    }

    #[tokio::test]
    async fn receive_truncates_and_counts() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.bin");
        std::fs::write(&dest, b"old contents that are much longer").unwrap();

        let mut incoming: &[u8] = b"fresh";
        let mut buffer = TransferBuffer::new(2);
        let mut progress = ProgressTracker::new("test", false);

        let (report, file) = receive(&mut incoming, &dest, &mut buffer, &mut progress)
            .await
            .unwrap();
        drop(file);

        assert_eq!(report.total_bytes, 5);
        assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn receive_of_nothing_is_empty_file() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("out.bin");

        let mut incoming: &[u8] = b"";
        let mut buffer = TransferBuffer::new(16);
        let mut progress = ProgressTracker::new("test", false);

        let (report, _file) = receive(&mut incoming, &dest, &mut buffer, &mut progress)
            .await
            .unwrap();

        assert_eq!(report.total_bytes, 0);
        assert_eq!(std::fs::read(&dest).unwrap(), b"");
    }

    #[tokio::test]
    async fn unwritable_destination_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing-dir").join("out.bin");

        let mut incoming: &[u8] = b"data";
        let mut buffer = TransferBuffer::new(16);
        let mut progress = ProgressTracker::new("test", false);

        let err = receive(&mut incoming, &dest, &mut buffer, &mut progress)
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::FileOpenFailed { .. }));
    }

    #[tokio::test]
    async fn serve_one_reports_unwritable_destination() {
        let dir = TempDir::new().unwrap();
        let request = ListenRequest {
            dest: dir.path().join("missing-dir").join("out.bin"),
        };
        let listener = bind_and_listen("127.0.0.1:0".parse().unwrap(), 5).unwrap();
        let addr = listener.local_addr().unwrap();

        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(addr).await.unwrap();
            let _ = stream.write_all(b"data").await;
        });

        let mut progress = ProgressTracker::new("test", false);
        let err = serve_one(listener, &request, &Settings::default(), &mut progress)
            .await
            .unwrap_err();
        client.await.unwrap();

        assert!(matches!(
            err,
            NcError::Transfer(TransferError::FileOpenFailed { .. })
        ));
        assert_eq!(progress.total(), 0);
    }

    #[tokio::test]
    async fn bind_twice_on_same_port_fails() {
        let first = bind_and_listen("127.0.0.1:0".parse().unwrap(), 5).unwrap();
        let addr = first.local_addr().unwrap();

        let err = bind_and_listen(addr, 5).unwrap_err();
        assert!(matches!(err, ConnectionError::BindFailed { .. }));
    }
}
