//! Participant tracking for warpzone.
//!
//! This crate knows *who* is in the system and the little bit of
//! per-participant state the lobby core needs:
//!
//! 1. **Presence in the system**: [`Roster::connect`] /
//!    [`Roster::disconnect`].
//! 2. **Area membership**: at most one area per participant.
//! 3. **Leave option visibility**: whether the participant's client is
//!    currently showing the "leave" button.
//!
//! # How it fits in the stack
//!
//! ```text
//! Area layer (above)    ← asks the roster for candidates, records membership
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below) ← provides PlayerId, AreaId
//! ```
//!
//! Authorization is not handled here. Whoever calls `connect` has already
//! decided the participant is allowed in.

mod error;
mod participant;
mod roster;

pub use error::SessionError;
pub use participant::Participant;
pub use roster::Roster;
