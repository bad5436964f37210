//! Observer-centered chunk streaming: visibility window, LOD assignment, and
//! chunk lifecycle over a pluggable provider.
#![forbid(unsafe_code)]

mod config;
mod error;
mod provider;
mod record;
mod streamer;

pub use config::StreamConfig;
pub use error::{ConfigError, ContentFault, StreamError};
pub use provider::{ChunkProvider, ObserverSource};
pub use record::ChunkRecord;
pub use streamer::{ChunkStreamer, TickReport};
