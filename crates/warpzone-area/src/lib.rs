//! Area-based lobby logic for warpzone.
//!
//! Participants gather in named areas. Once someone starts a countdown the
//! area's capacity is locked to the chosen party size, and when the timer
//! runs out everyone still inside is moved to the area's destination.
//!
//! # Key types
//!
//! - [`Lobby`] - the coordinator that owns all state and runs logic ticks
//! - [`AreaRegistry`] / [`DestinationDirectory`] - what areas exist and
//!   where their groups go
//! - [`AreaState`] - per-area membership, countdown and relocation lock
//! - [`World`] / [`NotificationSink`] - the host world this crate drives
//! - [`LobbyConfig`] - capacities, timings and cue thresholds
//!
//! Nothing in here is async or thread-safe; the `warpzone` crate wraps a
//! [`Lobby`] in an actor task.

mod config;
mod error;
mod lobby;
mod registry;
mod state;
mod world;

pub mod countdown;
pub mod occupancy;
pub mod teleport;

pub use config::{LobbyConfig, PartySizePolicy};
pub use countdown::{Countdown, CountdownCues, CountdownStep};
pub use error::AreaError;
pub use lobby::{Lobby, TickReport};
pub use occupancy::MembershipDelta;
pub use registry::{Area, AreaRegistry, DestinationDirectory};
pub use state::{AreaInfo, AreaState, CountdownPhase};
pub use teleport::RelocationReport;
pub use world::{Containment, NotificationSink, Outbound, Presence, World};
