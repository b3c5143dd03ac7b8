//! The sniff-and-splice switching engine.

use std::io;
use std::sync::Arc;

use tokio::io::AsyncReadExt;

use crate::standby::{NullSource, StandbySource};
use crate::stream::{ErrReader, Input, InputStream};

/// Sniff window: the longest newline terminator (`\r\n`) plus one byte to
/// tell "newline followed by more data" from "newline only". Nothing beyond
/// this window is inspected before reattachment.
const SNIFF_LEN: usize = 3;

enum Sniff {
    NoData,
    NewlineOnly(Vec<u8>),
    Data(Vec<u8>),
    Failed(io::Error),
}

/// Builds [`Switch`]. Cloning the builder branches the configuration as a
/// real value copy; built engines never share builder state.
#[derive(Clone)]
pub struct SwitchBuilder {
    standby: Arc<dyn StandbySource>,
    ignore_leading_newline: bool,
    switch_by_terminal: bool,
}

impl SwitchBuilder {
    pub fn new() -> Self {
        Self {
            standby: Arc::new(NullSource),
            ignore_leading_newline: true,
            switch_by_terminal: true,
        }
    }

    /// Set the standby source activated when the input carries no data.
    pub fn standby(mut self, standby: Arc<dyn StandbySource>) -> Self {
        self.standby = standby;
        self
    }

    /// Treat an input holding nothing but a single leading newline sequence
    /// as empty.
    pub fn ignore_leading_newline(mut self, on: bool) -> Self {
        self.ignore_leading_newline = on;
        self
    }

    /// Switch immediately, without sniffing, when the input is an
    /// interactive terminal.
    pub fn switch_by_terminal(mut self, on: bool) -> Self {
        self.switch_by_terminal = on;
        self
    }

    pub fn build(self) -> Switch {
        Switch {
            standby: self.standby,
            ignore_leading_newline: self.ignore_leading_newline,
            switch_by_terminal: self.switch_by_terminal,
        }
    }
}

impl Default for SwitchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The switching engine. Configuration is frozen at build time and `switch`
/// calls on one engine are independent.
pub struct Switch {
    standby: Arc<dyn StandbySource>,
    ignore_leading_newline: bool,
    switch_by_terminal: bool,
}

impl Switch {
    /// Decide whether `input` carries data. Returns the input spliced back
    /// together byte-exactly when it does, the standby stream when it does
    /// not, and `None` when the standby source has nothing to substitute.
    pub async fn switch(&self, input: Input) -> Option<InputStream> {
        if self.switch_by_terminal && input.terminal {
            tracing::debug!(
                standby = self.standby.name(),
                "input is a terminal, engaging standby"
            );
            return self.standby.activate().await;
        }

        let mut stream = input.stream;
        match sniff(&mut stream).await {
            Sniff::NoData => {
                tracing::debug!(standby = self.standby.name(), "no data, engaging standby");
                self.standby.activate().await
            }
            Sniff::NewlineOnly(prefix) => {
                if self.ignore_leading_newline {
                    tracing::debug!(
                        standby = self.standby.name(),
                        "leading newline only, engaging standby"
                    );
                    self.standby.activate().await
                } else {
                    Some(splice(prefix, stream))
                }
            }
            Sniff::Data(prefix) => Some(splice(prefix, stream)),
            Sniff::Failed(err) => Some(Box::new(ErrReader::with_stage("sniffing the input", err))),
        }
    }
}

/// Read up to [`SNIFF_LEN`] bytes without ever discarding a short read.
async fn sniff(stream: &mut InputStream) -> Sniff {
    let mut window = [0u8; SNIFF_LEN];
    let mut filled = 0;
    while filled < SNIFF_LEN {
        match stream.read(&mut window[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if filled == 0 => return Sniff::Failed(err),
            // Bytes already obtained must not be dropped; the error will
            // resurface from the remainder.
            Err(_) => return Sniff::Data(window[..filled].to_vec()),
        }
    }

    match &window[..filled] {
        [] => Sniff::NoData,
        b"\n" | b"\r" | b"\r\n" => Sniff::NewlineOnly(window[..filled].to_vec()),
        _ => Sniff::Data(window[..filled].to_vec()),
    }
}

/// Reattach the sniffed prefix in front of the unread remainder.
fn splice(prefix: Vec<u8>, rest: InputStream) -> InputStream {
    Box::new(io::Cursor::new(prefix).chain(rest))
}
