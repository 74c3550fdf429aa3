//! Error types for the area layer.

use warpzone_protocol::AreaId;
use warpzone_session::SessionError;

/// Errors that can occur during area operations.
///
/// None of these are fatal. Every failure degrades to "the area stays
/// available, the participant stays where they are".
#[derive(Debug, thiserror::Error)]
pub enum AreaError {
    /// No area with this name was registered.
    #[error("area {0} not found")]
    UnknownArea(AreaId),

    /// A start request arrived while the area's countdown is running.
    /// The running countdown is left untouched.
    #[error("countdown already running in area {0}")]
    CountdownAlreadyRunning(AreaId),

    /// The requested party size falls outside what the area accepts
    /// (only with [`PartySizePolicy::Reject`](crate::PartySizePolicy::Reject)).
    #[error("party size {requested} not allowed in area {area} (expected {min}..={max})")]
    InvalidPartySize {
        area: AreaId,
        requested: usize,
        min: usize,
        max: usize,
    },

    /// The area has no relocation target in the destination directory.
    #[error("no destination registered for area {0}")]
    DestinationUnresolved(AreaId),

    /// A relocation for this area is already in flight.
    #[error("relocation already in progress for area {0}")]
    RelocationBusy(AreaId),

    /// A participant bookkeeping error (unknown or duplicate participant).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The lobby configuration could not be parsed.
    #[error("invalid lobby config: {0}")]
    Config(#[from] serde_json::Error),
}
