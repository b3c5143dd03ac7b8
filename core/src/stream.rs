//! Byte-stream plumbing shared by the switch engine, the standby sources
//! and the runner.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use crate::error::SourceError;

/// Boxed reader handed between the switch engine, the standby sources and
/// the runner.
pub type InputStream = Box<dyn AsyncRead + Unpin + Send>;

/// Primary input stream plus the terminal capability bit driving the
/// switch-by-terminal short circuit.
pub struct Input {
    pub(crate) stream: InputStream,
    pub(crate) terminal: bool,
}

impl Input {
    /// Wrap process stdin, detecting whether it is attached to an
    /// interactive terminal. Reading from an unattached terminal would block
    /// waiting for a human.
    pub fn stdin() -> Self {
        Self {
            stream: Box::new(tokio::io::stdin()),
            terminal: atty::is(atty::Stream::Stdin),
        }
    }

    /// Wrap an arbitrary reader. Assumes it is not a terminal; where
    /// detection is unavailable the engine must never block on it.
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        Self {
            stream: Box::new(reader),
            terminal: false,
        }
    }

    /// Override terminal detection for callers with out-of-band knowledge.
    pub fn assume_terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// Reader that fails every read attempt with the same error instead of
/// reporting end-of-stream. Standby sources use it to report failures
/// through the one reader interface the runner copies from, so downstream
/// consumers never need a separate error channel.
pub struct ErrReader {
    kind: io::ErrorKind,
    message: String,
}

impl ErrReader {
    pub fn new(err: io::Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn from_source(err: SourceError) -> Self {
        Self {
            kind: io::ErrorKind::Other,
            message: err.to_string(),
        }
    }

    /// Wrap `err` with a short stage description so the cause stays
    /// inspectable in the final diagnostic.
    pub fn with_stage(stage: &str, err: io::Error) -> Self {
        Self {
            kind: err.kind(),
            message: format!("{stage}: {err}"),
        }
    }
}

impl AsyncRead for ErrReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(self.kind, self.message.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn err_reader_fails_every_read_with_the_same_error() {
        let mut reader = ErrReader::new(io::Error::new(io::ErrorKind::BrokenPipe, "pipe gone"));
        let mut buf = [0u8; 8];

        let first = reader.read(&mut buf).await.unwrap_err();
        let second = reader.read(&mut buf).await.unwrap_err();

        assert_eq!(first.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(first.to_string(), "pipe gone");
        assert_eq!(second.to_string(), "pipe gone");
    }

    #[tokio::test]
    async fn err_reader_keeps_the_stage_description() {
        let mut reader = ErrReader::with_stage(
            "sniffing the input",
            io::Error::new(io::ErrorKind::Other, "boom"),
        );
        let err = reader.read(&mut [0u8; 1]).await.unwrap_err();
        assert_eq!(err.to_string(), "sniffing the input: boom");
    }

    #[test]
    fn input_defaults_to_not_a_terminal() {
        let input = Input::new(io::Cursor::new(Vec::new()));
        assert!(!input.is_terminal());
        assert!(input.assume_terminal(true).is_terminal());
    }
}
