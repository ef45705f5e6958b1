use std::fmt;
use thiserror::Error;

use crate::session::ArSurface;

/// Failure binding the controller to an AR surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("already bound to a surface, unbind first")]
    AlreadyBound,

    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A refused bind. The surface is handed back untouched.
#[derive(Error)]
#[error("{error}")]
pub struct BindRejected {
    #[source]
    pub error: BindError,
    pub surface: Box<dyn ArSurface>,
}

impl BindRejected {
    pub fn into_surface(self) -> Box<dyn ArSurface> {
        self.surface
    }
}

impl fmt::Debug for BindRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindRejected").field("error", &self.error).finish_non_exhaustive()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("unsupported hardware '{identifier}': plane detection needs a newer chip class")]
    UnsupportedHardware { identifier: String },
}

/// Opaque failure reported by the tracking collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("tracking session error: {0}")]
pub struct SessionError(pub String);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error("io error fetching {link}: {source}")]
    Io {
        link: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fetch failed: {0}")]
    Other(String),
}

/// Errors from saving or loading an environment snapshot.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("nothing to save, the session has no environment snapshot")]
    NothingToSave,

    #[error("no live session is bound")]
    SessionUnavailable,

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("artwork descriptor error: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
