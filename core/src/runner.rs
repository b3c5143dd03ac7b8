//! Drives one end-to-end invocation: resolve the switched stream and copy
//! it into the output sink.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::RunError;
use crate::stream::{Input, InputStream};
use crate::switch::Switch;

/// Copy the switched stream fully into `out`. Returns the number of bytes
/// copied; the `None` sentinel from the switch (no data and nothing to
/// substitute) copies nothing and succeeds. Resource release (the standby
/// file descriptor, the subprocess pipe) rides on stream drop, which runs on
/// every exit path.
pub async fn run<W>(switch: &Switch, input: Input, out: &mut W) -> Result<u64, RunError>
where
    W: AsyncWrite + Unpin,
{
    match switch.switch(input).await {
        Some(stream) => copy_stream(stream, out).await,
        None => Ok(0),
    }
}

/// Shared copy loop. A flush failure is surfaced but can never mask a copy
/// failure, which is always the more specific error.
pub async fn copy_stream<W>(mut stream: InputStream, out: &mut W) -> Result<u64, RunError>
where
    W: AsyncWrite + Unpin,
{
    let copied = tokio::io::copy(&mut stream, out)
        .await
        .map_err(RunError::Copy)?;
    out.flush().await.map_err(RunError::Flush)?;
    tracing::debug!(bytes = copied, "switched input copied");
    Ok(copied)
}
