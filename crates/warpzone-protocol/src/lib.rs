//! Shared vocabulary for warpzone.
//!
//! This crate defines the values that cross the boundary between the
//! lobby core and its external collaborators:
//!
//! - **Identity** ([`PlayerId`], [`AreaId`]) and geometry ([`Vec3`]).
//! - **Outbound** ([`Notification`], [`Recipient`]): intents the core
//!   emits for UI, audio, and visual collaborators.
//! - **Inbound** ([`ClientRequest`]): what a participant's client may ask
//!   for (leave, start a countdown).
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how requests and
//!   notifications are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Client bytes → Codec → ClientRequest → Lobby → Notification → Codec → bytes
//! ```
//!
//! The crate owns no delivery mechanism. Network transport of these
//! values is somebody else's job.

mod codec;
mod error;
mod types;

// `pub use` makes items from submodules available at the crate root, so
// callers write `warpzone_protocol::PlayerId` rather than reaching into
// the private `types` module.

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{AreaId, ClientRequest, Notification, PlayerId, Recipient, Vec3};
