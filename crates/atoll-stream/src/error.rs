use std::fmt;

use atoll_geom::GridCoord;

use crate::streamer::TickReport;

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    ChunkSize(f32),
    ViewDistance(f32),
    ZeroLodLevels,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ChunkSize(v) => write!(f, "chunk size must be positive and finite, got {v}"),
            ConfigError::ViewDistance(v) => {
                write!(f, "max view distance must be positive and finite, got {v}")
            }
            ConfigError::ZeroLodLevels => write!(f, "lod levels must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A chunk whose content could not be produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentFault<E> {
    pub coord: GridCoord,
    pub error: E,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StreamError<E> {
    Config(ConfigError),
    /// The tick still ran to completion; `report` holds its counters.
    Content {
        faults: Vec<ContentFault<E>>,
        report: TickReport,
    },
}

impl<E: fmt::Display> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Config(e) => write!(f, "stream config: {e}"),
            StreamError::Content { faults, .. } => {
                write!(f, "{} chunk(s) failed to generate", faults.len())?;
                for fault in faults {
                    write!(f, "; {}: {}", fault.coord, fault.error)?;
                }
                Ok(())
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for StreamError<E> {}

impl<E> From<ConfigError> for StreamError<E> {
    fn from(e: ConfigError) -> Self {
        StreamError::Config(e)
    }
}
