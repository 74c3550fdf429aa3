//! Error types for the session layer.

use warpzone_protocol::PlayerId;

/// Errors that can occur while tracking participants.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No participant record exists for this player.
    /// Usually a disconnect racing another disconnect.
    #[error("participant {0} not found")]
    NotFound(PlayerId),

    /// The player is already connected. A participant can only have one
    /// record at a time.
    #[error("participant {0} is already connected")]
    AlreadyConnected(PlayerId),
}
