//! Presence-gated stream substitution.
//!
//! `standin-core` decides whether a primary input stream actually carries
//! data and, when it does not, substitutes a lazily produced standby stream
//! without losing or duplicating a single byte.

pub mod config;
pub mod error;
pub mod runner;
pub mod standby;
pub mod stream;
pub mod switch;

pub use error::{CliError, RunError, SourceError};
pub use standby::{CommandSource, FileSource, NullSource, StandbySource, TextSource};
pub use stream::{ErrReader, Input, InputStream};
pub use switch::{Switch, SwitchBuilder};
