//! `LobbyServer` builder and the lobby actor.
//!
//! The whole lobby lives inside one Tokio task. Callers talk to it through
//! a cloneable [`LobbyHandle`]; each command is handled to completion
//! before the next command or frame, so start and leave requests never
//! interleave with a logic tick.
//!
//! ```text
//!  LobbyHandle ──cmd──→ ┌──────────── actor task ────────────┐
//!  LobbyHandle ──cmd──→ │ select! {                          │
//!        ▲              │   cmd   → Lobby::{connect, ...}    │
//!        └───reply───── │   frame → Lobby::advance(elapsed)  │──→ NotificationSink
//!                       │ }                                  │
//!                       └────────────────────────────────────┘
//! ```

use std::ops::ControlFlow;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use warpzone_area::{AreaError, AreaInfo, Lobby, LobbyConfig, NotificationSink, World};
use warpzone_protocol::{AreaId, ClientRequest, Codec, JsonCodec, PlayerId, Vec3};
use warpzone_tick::{FrameClock, FrameConfig};

use crate::WarpzoneError;

/// Default command channel capacity.
const DEFAULT_CHANNEL_SIZE: usize = 256;

/// What a decoded client request did. Serializable so a transport can
/// echo it back to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum RequestOutcome {
    /// A leave request. `false` if the participant had no live presence.
    Left(bool),
    /// A countdown started with this captured party size.
    Started(usize),
}

/// Commands sent to the lobby actor. Variants with a `reply` are
/// request/response; the caller awaits the oneshot.
enum LobbyCommand {
    Connect {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), AreaError>>,
    },
    Disconnect {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), AreaError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<bool>,
    },
    Start {
        area: AreaId,
        party_size: usize,
        reply: oneshot::Sender<Result<usize, AreaError>>,
    },
    /// Raw bytes from a participant, decoded inside the actor.
    Submit {
        player_id: PlayerId,
        data: Vec<u8>,
        reply: oneshot::Sender<Result<RequestOutcome, WarpzoneError>>,
    },
    AreaInfo {
        area: AreaId,
        reply: oneshot::Sender<Option<AreaInfo>>,
    },
    Shutdown,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a lobby.
///
/// # Example
///
/// ```rust,ignore
/// use warpzone::prelude::*;
///
/// let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
/// let handle = LobbyServer::builder()
///     .config(LobbyConfig::default())
///     .area("Alpha")
///     .destination("Alpha", Vec3::new(100.0, 0.0, 50.0))
///     .spawn(my_world, tx);
/// handle.connect(PlayerId(1)).await?;
/// ```
pub struct LobbyServerBuilder<C = JsonCodec> {
    config: LobbyConfig,
    frame_config: FrameConfig,
    areas: Vec<(AreaId, Option<usize>)>,
    destinations: Vec<(AreaId, Vec3)>,
    channel_size: usize,
    codec: C,
}

impl LobbyServerBuilder {
    /// Creates a builder with default settings and the JSON codec.
    pub fn new() -> Self {
        Self {
            config: LobbyConfig::default(),
            frame_config: FrameConfig::default(),
            areas: Vec::new(),
            destinations: Vec::new(),
            channel_size: DEFAULT_CHANNEL_SIZE,
            codec: JsonCodec,
        }
    }
}

impl Default for LobbyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> LobbyServerBuilder<C> {
    /// Sets the lobby configuration.
    pub fn config(mut self, config: LobbyConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the frame clock configuration.
    pub fn frame_config(mut self, frame_config: FrameConfig) -> Self {
        self.frame_config = frame_config;
        self
    }

    /// Registers an area with the default capacity.
    pub fn area(mut self, id: impl Into<AreaId>) -> Self {
        self.areas.push((id.into(), None));
        self
    }

    /// Registers an area with its own capacity.
    pub fn area_with_capacity(mut self, id: impl Into<AreaId>, capacity: usize) -> Self {
        self.areas.push((id.into(), Some(capacity)));
        self
    }

    /// Sets an area's relocation destination.
    pub fn destination(mut self, id: impl Into<AreaId>, at: Vec3) -> Self {
        self.destinations.push((id.into(), at));
        self
    }

    /// Bounds the command channel. Callers wait when it is full.
    pub fn channel_size(mut self, size: usize) -> Self {
        self.channel_size = size.max(1);
        self
    }

    /// Replaces the codec used to decode [`LobbyHandle::submit`] payloads.
    pub fn codec<C2: Codec>(self, codec: C2) -> LobbyServerBuilder<C2> {
        LobbyServerBuilder {
            config: self.config,
            frame_config: self.frame_config,
            areas: self.areas,
            destinations: self.destinations,
            channel_size: self.channel_size,
            codec,
        }
    }

    /// Spawns the lobby actor and returns a handle to it.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn<W, S>(self, world: W, sink: S) -> LobbyHandle
    where
        W: World + Send + 'static,
        S: NotificationSink + Send + 'static,
    {
        let mut lobby = Lobby::new(self.config, world, sink);
        for (id, capacity) in self.areas {
            lobby.register_area(id, capacity);
        }
        for (id, at) in self.destinations {
            lobby.set_destination(id, at);
        }

        let (tx, rx) = mpsc::channel(self.channel_size);
        let actor = LobbyActor {
            lobby,
            clock: FrameClock::new(self.frame_config),
            codec: self.codec,
            receiver: rx,
        };
        tokio::spawn(actor.run());

        LobbyHandle { sender: tx }
    }
}

/// Entry point for building a lobby.
pub struct LobbyServer;

impl LobbyServer {
    /// Creates a new builder.
    pub fn builder() -> LobbyServerBuilder {
        LobbyServerBuilder::new()
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Handle to a running lobby. Cheap to clone.
///
/// Every method fails with [`WarpzoneError::Unavailable`] once the actor
/// has stopped.
#[derive(Clone)]
pub struct LobbyHandle {
    sender: mpsc::Sender<LobbyCommand>,
}

impl LobbyHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> LobbyCommand,
    ) -> Result<T, WarpzoneError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| WarpzoneError::Unavailable)?;
        reply_rx.await.map_err(|_| WarpzoneError::Unavailable)
    }

    /// Adds a participant to the lobby.
    pub async fn connect(&self, player_id: PlayerId) -> Result<(), WarpzoneError> {
        self.request(|reply| LobbyCommand::Connect { player_id, reply })
            .await?
            .map_err(WarpzoneError::from_area)
    }

    /// Removes a participant from the lobby.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), WarpzoneError> {
        self.request(|reply| LobbyCommand::Disconnect { player_id, reply })
            .await?
            .map_err(WarpzoneError::from_area)
    }

    /// Sends a participant to the fallback location.
    pub async fn request_leave(&self, player_id: PlayerId) -> Result<bool, WarpzoneError> {
        self.request(|reply| LobbyCommand::Leave { player_id, reply })
            .await
    }

    /// Starts a countdown. Returns the captured party size.
    pub async fn request_start(
        &self,
        area: impl Into<AreaId>,
        party_size: usize,
    ) -> Result<usize, WarpzoneError> {
        let area = area.into();
        self.request(|reply| LobbyCommand::Start {
            area,
            party_size,
            reply,
        })
        .await?
        .map_err(WarpzoneError::from_area)
    }

    /// Decodes an encoded [`ClientRequest`] from a participant and runs it.
    pub async fn submit(
        &self,
        player_id: PlayerId,
        data: Vec<u8>,
    ) -> Result<RequestOutcome, WarpzoneError> {
        self.request(|reply| LobbyCommand::Submit {
            player_id,
            data,
            reply,
        })
        .await?
    }

    /// A snapshot of one area, or `None` for an unknown name.
    pub async fn area_info(&self, area: impl Into<AreaId>) -> Result<Option<AreaInfo>, WarpzoneError> {
        let area = area.into();
        self.request(|reply| LobbyCommand::AreaInfo { area, reply })
            .await
    }

    /// Asks the actor to stop. Pending commands queued before this one
    /// are still handled.
    pub async fn shutdown(&self) -> Result<(), WarpzoneError> {
        self.sender
            .send(LobbyCommand::Shutdown)
            .await
            .map_err(|_| WarpzoneError::Unavailable)
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct LobbyActor<W, S, C> {
    lobby: Lobby<W, S>,
    clock: FrameClock,
    codec: C,
    receiver: mpsc::Receiver<LobbyCommand>,
}

impl<W, S, C> LobbyActor<W, S, C>
where
    W: World,
    S: NotificationSink,
    C: Codec,
{
    /// Runs until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(
            areas = self.lobby.registry().len(),
            frame_rate_hz = self.clock.frame_rate_hz(),
            "lobby started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else {
                        tracing::debug!("all lobby handles dropped");
                        break;
                    };
                    if self.handle(cmd).is_break() {
                        break;
                    }
                }
                frame = self.clock.wait_for_frame() => {
                    if let Some(report) = self.lobby.advance(frame.elapsed) {
                        tracing::trace!(
                            tick = report.tick,
                            frame = frame.frame,
                            changed = report.membership.len(),
                            expired = report.expired.len(),
                            "logic tick"
                        );
                    }
                    self.clock.record_frame_end();
                }
            }
        }

        tracing::info!(ticks = self.lobby.ticks(), "lobby stopped");
    }

    fn handle(&mut self, cmd: LobbyCommand) -> ControlFlow<()> {
        match cmd {
            LobbyCommand::Connect { player_id, reply } => {
                let _ = reply.send(self.lobby.connect(player_id));
            }
            LobbyCommand::Disconnect { player_id, reply } => {
                let _ = reply.send(self.lobby.disconnect(player_id));
            }
            LobbyCommand::Leave { player_id, reply } => {
                let _ = reply.send(self.lobby.request_leave(player_id));
            }
            LobbyCommand::Start {
                area,
                party_size,
                reply,
            } => {
                let _ = reply.send(self.lobby.request_start(&area, party_size));
            }
            LobbyCommand::Submit {
                player_id,
                data,
                reply,
            } => {
                let _ = reply.send(self.handle_submit(player_id, &data));
            }
            LobbyCommand::AreaInfo { area, reply } => {
                let _ = reply.send(self.lobby.area_info(&area));
            }
            LobbyCommand::Shutdown => {
                tracing::info!("lobby shutting down");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_submit(
        &mut self,
        player_id: PlayerId,
        data: &[u8],
    ) -> Result<RequestOutcome, WarpzoneError> {
        let request: ClientRequest = self.codec.decode(data).inspect_err(|e| {
            tracing::debug!(%player_id, error = %e, "undecodable request");
        })?;
        request.validate()?;

        match request {
            ClientRequest::Leave => Ok(RequestOutcome::Left(self.lobby.request_leave(player_id))),
            ClientRequest::StartCountdown { area, party_size } => {
                tracing::debug!(%player_id, area = %area, party_size, "start requested");
                self.lobby
                    .request_start(&area, party_size)
                    .map(RequestOutcome::Started)
                    .map_err(WarpzoneError::from_area)
            }
        }
    }
}
