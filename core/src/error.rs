use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failures raised while a standby source produces its stream.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("open file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("start command `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("wait for command `{command}`: {source}")]
    Wait {
        command: String,
        source: std::io::Error,
    },
    #[error("command `{command}` exited with {status}")]
    Exit { command: String, status: ExitStatus },
    #[error("command `{command}` wrote to stderr: {text}")]
    Stderr { command: String, text: String },
    #[error("command `{command}` cancelled: {reason}")]
    Cancelled { command: String, reason: String },
}

/// Failures raised while the runner drains the switched stream.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("reading the switched input: {0}")]
    Copy(#[source] std::io::Error),
    #[error("flushing the output: {0}")]
    Flush(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("run failed: {0}")]
    Run(#[from] RunError),
    #[error("config error: {0}")]
    Config(String),
    #[error("usage error: {0}")]
    Usage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
