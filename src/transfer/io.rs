use crate::common::TransferError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read once into `buf`; zero means end of stream
pub async fn read_chunk<R>(reader: &mut R, buf: &mut [u8]) -> Result<usize, TransferError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    reader.read(buf).await.map_err(TransferError::ReadFailed)
}

/// Write the whole chunk or fail
pub async fn write_chunk<W>(writer: &mut W, chunk: &[u8]) -> Result<(), TransferError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    writer
        .write_all(chunk)
        .await
        .map_err(TransferError::WriteFailed)
}
