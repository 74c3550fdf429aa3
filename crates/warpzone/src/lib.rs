//! # Warpzone
//!
//! Countdown-and-teleport lobbies for shared virtual worlds.
//!
//! Participants gather inside named areas. One of them starts a countdown
//! for a chosen party size, and when it runs out everyone still inside is
//! moved to the area's destination together. The host world plugs in
//! through the [`World`] and [`NotificationSink`] traits; warpzone owns
//! the timing, the bookkeeping and the rules.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use warpzone::prelude::*;
//!
//! // Implement Containment + Presence for your world, then:
//! // let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! // let lobby = LobbyServer::builder()
//! //     .area("Alpha")
//! //     .destination("Alpha", Vec3::new(100.0, 0.0, 50.0))
//! //     .spawn(my_world, tx);
//! // lobby.connect(PlayerId(1)).await?;
//! ```

mod error;
mod server;

pub use error::WarpzoneError;
pub use server::{LobbyHandle, LobbyServer, LobbyServerBuilder, RequestOutcome};

/// Installs a `tracing` subscriber that honours `RUST_LOG`, falling back
/// to `default_filter` when the variable is unset or invalid.
///
/// Call once from a binary's `main`. Does nothing if a global subscriber
/// is already installed.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub mod prelude {
    pub use crate::{
        LobbyHandle, LobbyServer, LobbyServerBuilder, RequestOutcome, WarpzoneError,
    };
    pub use warpzone_area::{
        Area, AreaError, AreaInfo, Containment, CountdownPhase, Lobby, LobbyConfig,
        NotificationSink, Outbound, PartySizePolicy, Presence, World,
    };
    pub use warpzone_protocol::{
        AreaId, ClientRequest, Codec, JsonCodec, Notification, PlayerId, Recipient, Vec3,
    };
    pub use warpzone_session::SessionError;
    pub use warpzone_tick::FrameConfig;
}
