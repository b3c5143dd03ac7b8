//! Standby sources: lazy producers of the substitute stream.

mod command;
mod file;
mod text;

pub use command::CommandSource;
pub use file::FileSource;
pub use text::TextSource;

use async_trait::async_trait;

use crate::stream::InputStream;

/// A standby source produces the substitute stream once the switch engine
/// decides the primary input carries no data. Activation is lazy and happens
/// at most once per switch call; ownership of the returned stream transfers
/// to whoever drains it.
#[async_trait]
pub trait StandbySource: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Produce the stream now. `None` means there is truly nothing to
    /// substitute, as opposed to an empty stream.
    async fn activate(&self) -> Option<InputStream>;
}

/// Standby source with nothing to substitute. Activating it yields the
/// `None` sentinel, which lets callers distinguish "no data and no
/// substitute" from "an empty substitute stream".
pub struct NullSource;

#[async_trait]
impl StandbySource for NullSource {
    fn name(&self) -> &str {
        "null"
    }

    async fn activate(&self) -> Option<InputStream> {
        None
    }
}
