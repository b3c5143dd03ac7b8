//! Subprocess standby source.
//!
//! The command's stdout streams to the caller while a supervising task waits
//! for the process and drains stderr into an in-memory accumulator. The task
//! reports exactly one verdict over a oneshot channel, and the stream polls
//! that verdict only after stdout end-of-stream, so a reader never observes
//! a premature end-of-stream ahead of an in-flight failure signal.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Mutex;
use std::task::{ready, Context, Poll};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::{mpsc, oneshot};

use super::StandbySource;
use crate::error::SourceError;
use crate::stream::{ErrReader, InputStream};

type Verdict = Result<(), SourceError>;

/// Standby source that runs an external command and streams its stdout.
/// A spawn or wait failure, a non-zero exit, or any stderr output fails the
/// stream; stderr is a failure signal here, never diagnostic noise to
/// forward.
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    cancel: Mutex<Option<mpsc::Receiver<String>>>,
}

impl CommandSource {
    /// `args` may be empty: a bare command path is "no additional
    /// arguments", never an error.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cancel: Mutex::new(None),
        }
    }

    /// Attach a cancellation channel. A message terminates the child and
    /// unblocks the reader with a cancellation error. The receiver is taken
    /// by the first activation.
    pub fn cancel_on(self, rx: mpsc::Receiver<String>) -> Self {
        *self.cancel.lock().unwrap() = Some(rx);
        self
    }
}

#[async_trait]
impl StandbySource for CommandSource {
    fn name(&self) -> &str {
        "command"
    }

    async fn activate(&self) -> Option<InputStream> {
        let mut child = match Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(source) => {
                return Some(Box::new(ErrReader::from_source(SourceError::Spawn {
                    command: self.program.clone(),
                    source,
                })));
            }
        };

        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                return Some(Box::new(ErrReader::from_source(SourceError::Spawn {
                    command: self.program.clone(),
                    source: io::Error::new(io::ErrorKind::BrokenPipe, "child stdio not captured"),
                })));
            }
        };

        let cancel = self.cancel.lock().unwrap().take();
        let (verdict_tx, verdict_rx) = oneshot::channel();
        let program = self.program.clone();
        tokio::spawn(async move {
            let verdict = supervise(program, child, stderr, cancel).await;
            let _ = verdict_tx.send(verdict);
        });

        Some(Box::new(CommandStream {
            stdout: Some(stdout),
            verdict: Some(verdict_rx),
            failure: None,
        }))
    }
}

enum Exit {
    Status(io::Result<std::process::ExitStatus>),
    Cancelled(String),
}

/// Owns the child for the rest of its life: waits for it while draining
/// stderr to completion, honoring the cancellation channel, and reports one
/// verdict. The verdict is only produced after the process has fully exited
/// and its stderr is drained.
async fn supervise(
    program: String,
    mut child: Child,
    mut stderr: ChildStderr,
    mut cancel: Option<mpsc::Receiver<String>>,
) -> Verdict {
    let mut collected = Vec::new();

    let exit = {
        let wait = async {
            let (status, _) = tokio::join!(child.wait(), stderr.read_to_end(&mut collected));
            status
        };
        tokio::pin!(wait);
        tokio::select! {
            status = &mut wait => Exit::Status(status),
            reason = recv_or_pending(&mut cancel) => Exit::Cancelled(reason),
        }
    };

    match exit {
        Exit::Status(Err(source)) => Err(SourceError::Wait {
            command: program,
            source,
        }),
        Exit::Status(Ok(status)) if !status.success() => Err(SourceError::Exit {
            command: program,
            status,
        }),
        Exit::Status(Ok(_)) if !collected.is_empty() => Err(SourceError::Stderr {
            command: program,
            text: String::from_utf8_lossy(&collected).trim_end().to_string(),
        }),
        Exit::Status(Ok(_)) => Ok(()),
        Exit::Cancelled(reason) => {
            let _ = child.start_kill();
            let _ = child.wait().await;
            tracing::debug!(command = %program, reason = %reason, "standby command cancelled");
            Err(SourceError::Cancelled {
                command: program,
                reason,
            })
        }
    }
}

/// Resolve with the cancellation reason, or never. A closed channel is not a
/// cancellation.
async fn recv_or_pending(cancel: &mut Option<mpsc::Receiver<String>>) -> String {
    if let Some(rx) = cancel {
        if let Some(reason) = rx.recv().await {
            return reason;
        }
    }
    std::future::pending().await
}

/// Streams the child's stdout, then converts the supervisor's verdict into
/// either end-of-stream or a read error. A failure verdict is replayed on
/// every subsequent read.
struct CommandStream {
    stdout: Option<ChildStdout>,
    verdict: Option<oneshot::Receiver<Verdict>>,
    failure: Option<String>,
}

impl AsyncRead for CommandStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if let Some(message) = &this.failure {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, message.clone())));
        }
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        if let Some(stdout) = this.stdout.as_mut() {
            let before = buf.filled().len();
            ready!(Pin::new(stdout).poll_read(cx, buf))?;
            if buf.filled().len() > before {
                return Poll::Ready(Ok(()));
            }
            // stdout end-of-stream: hold the reader until the supervisor has
            // seen the exit status and the full stderr.
            this.stdout = None;
        }

        if let Some(rx) = this.verdict.as_mut() {
            let verdict = ready!(Pin::new(rx).poll(cx));
            this.verdict = None;
            if let Ok(Err(err)) = verdict {
                let message = err.to_string();
                this.failure = Some(message.clone());
                return Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, message)));
            }
        }

        Poll::Ready(Ok(()))
    }
}
