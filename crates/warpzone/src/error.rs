//! Unified error type for warpzone.

use warpzone_area::AreaError;
use warpzone_protocol::ProtocolError;
use warpzone_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `warpzone` crate you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WarpzoneError {
    /// A request could not be decoded or is malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A participant bookkeeping error (unknown, duplicate).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The lobby refused the request (unknown area, countdown running, ...).
    #[error(transparent)]
    Area(#[from] AreaError),

    /// The lobby actor is gone (shut down or panicked).
    #[error("lobby is not running")]
    Unavailable,
}

impl WarpzoneError {
    /// Flattens a session error that came back wrapped in an area error.
    pub(crate) fn from_area(err: AreaError) -> Self {
        match err {
            AreaError::Session(e) => Self::Session(e),
            other => Self::Area(other),
        }
    }
}
