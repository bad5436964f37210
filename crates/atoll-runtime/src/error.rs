use std::fmt;

use atoll_stream::{ConfigError, StreamError};
use atoll_world::GenError;
use rayon::ThreadPoolBuildError;

#[derive(Debug)]
pub enum RuntimeError {
    Stream(StreamError<GenError>),
    Terrain(GenError),
    Pool(ThreadPoolBuildError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::Stream(e) => write!(f, "{e}"),
            RuntimeError::Terrain(e) => write!(f, "terrain: {e}"),
            RuntimeError::Pool(e) => write!(f, "worker pool: {e}"),
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuntimeError::Stream(e) => Some(e),
            RuntimeError::Terrain(e) => Some(e),
            RuntimeError::Pool(e) => Some(e),
        }
    }
}

impl From<StreamError<GenError>> for RuntimeError {
    fn from(e: StreamError<GenError>) -> Self {
        RuntimeError::Stream(e)
    }
}

impl From<ConfigError> for RuntimeError {
    fn from(e: ConfigError) -> Self {
        RuntimeError::Stream(StreamError::Config(e))
    }
}

impl From<GenError> for RuntimeError {
    fn from(e: GenError) -> Self {
        RuntimeError::Terrain(e)
    }
}

impl From<ThreadPoolBuildError> for RuntimeError {
    fn from(e: ThreadPoolBuildError) -> Self {
        RuntimeError::Pool(e)
    }
}
