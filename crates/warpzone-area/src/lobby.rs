//! The lobby coordinator: ties registry, occupancy, countdowns and
//! relocation together on a fixed logic tick.
//!
//! Per tick, in registry order:
//!
//! ```text
//! 1. refresh every area's membership     → ShowJoinUi / ShowLeaveOption / HideLeaveOption
//! 2. advance every area's countdown      → DisplayUpdate / PreTeleportEffect / TickPulse
//!    on expiry: relocate the snapshot    → HideLeaveOption / ArrivalEffect
//! ```
//!
//! Start and leave requests are plain method calls. The owner serializes
//! them with ticks (see the `warpzone` crate's actor), so they are checked
//! against the same invariants as the tick itself.

use std::collections::HashMap;
use std::time::Duration;

use warpzone_protocol::{AreaId, Notification, PlayerId, Recipient, Vec3};
use warpzone_session::Roster;
use warpzone_tick::LogicAccumulator;

use crate::{
    Area, AreaError, AreaInfo, AreaRegistry, AreaState, CountdownStep, DestinationDirectory,
    LobbyConfig, MembershipDelta, NotificationSink, RelocationReport, World,
};

/// What happened during one logic tick.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Areas whose membership changed, with the change.
    pub membership: Vec<(AreaId, MembershipDelta)>,
    /// Areas whose countdown expired this tick, with the relocation
    /// outcome. The countdown is cleared either way.
    pub expired: Vec<(AreaId, Result<RelocationReport, AreaError>)>,
}

/// Forwards notifications to the sink and keeps the roster's record of
/// each participant's leave option in step with what was sent.
struct Outbox<'a, S: ?Sized> {
    roster: &'a mut Roster,
    sink: &'a mut S,
}

impl<S: NotificationSink + ?Sized> NotificationSink for Outbox<'_, S> {
    fn notify(&mut self, to: Recipient, notification: Notification) {
        if let Recipient::Player(player_id) = &to {
            match &notification {
                Notification::ShowLeaveOption => {
                    self.roster.set_leave_option(*player_id, true);
                }
                Notification::HideLeaveOption => {
                    self.roster.set_leave_option(*player_id, false);
                }
                _ => {}
            }
        }
        self.sink.notify(to, notification);
    }
}

/// The coordinator. Owns all lobby state and the world/sink collaborators.
pub struct Lobby<W, S> {
    config: LobbyConfig,
    registry: AreaRegistry,
    destinations: DestinationDirectory,
    areas: HashMap<AreaId, AreaState>,
    roster: Roster,
    accumulator: LogicAccumulator,
    ticks: u64,
    world: W,
    sink: S,
}

impl<W: World, S: NotificationSink> Lobby<W, S> {
    /// Creates an empty lobby. The config is validated first.
    pub fn new(config: LobbyConfig, world: W, sink: S) -> Self {
        let config = config.validated();
        Self {
            registry: AreaRegistry::new(config.default_capacity),
            destinations: DestinationDirectory::new(),
            areas: HashMap::new(),
            roster: Roster::new(),
            accumulator: LogicAccumulator::new(config.logic_interval),
            ticks: 0,
            world,
            sink,
            config,
        }
    }

    // -- Setup -----------------------------------------------------------

    /// Registers an area. Idempotent per name.
    pub fn register_area(&mut self, id: impl Into<AreaId>, capacity: Option<usize>) -> &Area {
        let area = self.registry.register(id, capacity);
        self.areas.entry(area.id.clone()).or_default();
        area
    }

    /// Sets where an area's group goes when its countdown expires.
    pub fn set_destination(&mut self, id: impl Into<AreaId>, at: Vec3) {
        self.destinations.insert(id, at);
    }

    // -- Participants ----------------------------------------------------

    /// Adds a participant to the system. They become a candidate for
    /// every area from the next tick on.
    pub fn connect(&mut self, player_id: PlayerId) -> Result<(), AreaError> {
        self.roster.connect(player_id)?;
        Ok(())
    }

    /// Removes a participant and drops them from whatever area they were
    /// a member of, so a reconnect starts with no membership at all.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<(), AreaError> {
        let participant = self.roster.disconnect(player_id)?;
        for state in self.areas.values_mut() {
            if state.remove_member(player_id) {
                tracing::debug!(
                    %player_id,
                    area = ?participant.area,
                    "disconnected participant removed from area"
                );
            }
        }
        Ok(())
    }

    // -- Inbound requests ------------------------------------------------

    /// Moves the participant to the fallback location.
    ///
    /// Does not touch membership or countdowns: the next refresh notices
    /// they are gone. Returns `false` (a no-op) if the participant has no
    /// live presence.
    pub fn request_leave(&mut self, player_id: PlayerId) -> bool {
        let moved = self.world.move_to(player_id, self.config.fallback_location);
        if moved {
            tracing::info!(%player_id, "participant left to fallback location");
        } else {
            tracing::debug!(%player_id, "leave ignored, no live presence");
        }
        moved
    }

    /// Starts a countdown in `area` capturing `party_size` slots.
    ///
    /// The party size is untrusted and goes through the configured
    /// [`PartySizePolicy`](crate::PartySizePolicy). The area's membership
    /// is refreshed first, then every current member is shown the leave
    /// option right away. Returns the captured size.
    ///
    /// # Errors
    /// [`AreaError::UnknownArea`], [`AreaError::CountdownAlreadyRunning`],
    /// or [`AreaError::InvalidPartySize`]. None of them start or alter a
    /// countdown.
    pub fn request_start(&mut self, area: &AreaId, party_size: usize) -> Result<usize, AreaError> {
        let result = self.start_countdown(area, party_size);
        if let Err(e) = &result {
            tracing::info!(area = %area, party_size, error = %e, "start request rejected");
        }
        result
    }

    fn start_countdown(&mut self, id: &AreaId, party_size: usize) -> Result<usize, AreaError> {
        let area = self
            .registry
            .get(id)
            .ok_or_else(|| AreaError::UnknownArea(id.clone()))?;
        let state = self
            .areas
            .get_mut(id)
            .ok_or_else(|| AreaError::UnknownArea(id.clone()))?;

        if state.is_counting_down() {
            return Err(AreaError::CountdownAlreadyRunning(id.clone()));
        }
        // Capture who is inside now, not who was inside at the last tick:
        // a group relocated on the previous tick is still listed until the
        // next refresh.
        refresh_area(area, state, &mut self.roster, &self.world, &mut self.sink);

        let size = self.config.party_size_policy.resolve(
            id,
            party_size,
            state.members().len(),
            area.capacity,
        )?;
        state.start_countdown(id, self.config.countdown, size)?;

        tracing::info!(
            area = %id,
            captured_size = size,
            members = state.members().len(),
            "countdown started"
        );

        let mut outbox = Outbox {
            roster: &mut self.roster,
            sink: &mut self.sink,
        };
        for &member in state.members() {
            outbox.notify(Recipient::Player(member), Notification::ShowLeaveOption);
        }
        Ok(size)
    }

    // -- Ticking ---------------------------------------------------------

    /// Feeds real elapsed time in. Runs one logic tick once the
    /// accumulated time reaches the logic interval, then starts
    /// accumulating from zero again.
    pub fn advance(&mut self, elapsed: Duration) -> Option<TickReport> {
        if self.accumulator.accumulate(elapsed) {
            Some(self.tick())
        } else {
            None
        }
    }

    /// Runs exactly one logic tick of `logic_interval`.
    ///
    /// Never fails: problems are logged and reported in the
    /// [`TickReport`].
    pub fn tick(&mut self) -> TickReport {
        self.ticks += 1;
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };

        self.refresh_all(&mut report);
        self.advance_countdowns(&mut report);

        report
    }

    fn refresh_all(&mut self, report: &mut TickReport) {
        for area in self.registry.all() {
            let state = self.areas.entry(area.id.clone()).or_default();
            let delta = refresh_area(area, state, &mut self.roster, &self.world, &mut self.sink);
            if !delta.is_unchanged() {
                report.membership.push((area.id.clone(), delta));
            }
        }
    }

    fn advance_countdowns(&mut self, report: &mut TickReport) {
        let dt = self.config.logic_interval;
        let cues = self.config.cues();

        for area in self.registry.all() {
            let Some(state) = self.areas.get_mut(&area.id) else {
                continue;
            };
            let mut outbox = Outbox {
                roster: &mut self.roster,
                sink: &mut self.sink,
            };
            let to_area = || Recipient::Area(area.id.clone());

            match state.advance_countdown(dt, cues) {
                None => {
                    outbox.notify(
                        to_area(),
                        Notification::DisplayUpdate {
                            area: area.id.clone(),
                            remaining_secs: None,
                            count: state.members().len(),
                            capacity: area.capacity,
                        },
                    );
                }
                Some(CountdownStep::Running {
                    remaining_secs,
                    captured_size,
                    pre_teleport,
                    pulse,
                }) => {
                    tracing::trace!(area = %area.id, remaining_secs, "countdown running");
                    outbox.notify(
                        to_area(),
                        Notification::DisplayUpdate {
                            area: area.id.clone(),
                            remaining_secs: Some(remaining_secs),
                            count: state.members().len(),
                            capacity: captured_size,
                        },
                    );
                    if pre_teleport {
                        outbox.notify(
                            to_area(),
                            Notification::PreTeleportEffect {
                                area: area.id.clone(),
                            },
                        );
                    }
                    if let Some(secs) = pulse {
                        outbox.notify(
                            to_area(),
                            Notification::TickPulse {
                                area: area.id.clone(),
                                remaining_secs: secs,
                            },
                        );
                    }
                }
                Some(CountdownStep::Expired {
                    snapshot,
                    captured_size,
                    pulse,
                }) => {
                    if let Some(secs) = pulse {
                        outbox.notify(
                            to_area(),
                            Notification::TickPulse {
                                area: area.id.clone(),
                                remaining_secs: secs,
                            },
                        );
                    }
                    tracing::info!(
                        area = %area.id,
                        captured_size,
                        members = snapshot.len(),
                        "countdown expired"
                    );
                    let result = state.relocate(
                        &area.id,
                        &snapshot,
                        self.destinations.resolve(&area.id),
                        self.config.arrival_lift,
                        &mut self.world,
                        &mut outbox,
                    );
                    if let Err(e) = &result {
                        tracing::warn!(area = %area.id, error = %e, "relocation failed");
                    }
                    report.expired.push((area.id.clone(), result));
                }
            }
        }
    }

    // -- Introspection ---------------------------------------------------

    /// A snapshot of one area, or `None` for an unknown name.
    pub fn area_info(&self, id: &AreaId) -> Option<AreaInfo> {
        let area = self.registry.get(id)?;
        let state = self.areas.get(id)?;
        Some(state.info(area))
    }

    /// The area's effective capacity right now.
    pub fn capacity_of(&self, id: &AreaId) -> Option<usize> {
        let area = self.registry.get(id)?;
        let state = self.areas.get(id)?;
        Some(state.effective_capacity(area.capacity))
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    pub fn registry(&self) -> &AreaRegistry {
        &self.registry
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

/// Reconciles one area's membership with the world and sends the
/// resulting UI notifications.
fn refresh_area<W: World, S: NotificationSink>(
    area: &Area,
    state: &mut AreaState,
    roster: &mut Roster,
    world: &W,
    sink: &mut S,
) -> MembershipDelta {
    let delta = {
        let roster = &*roster;
        state.refresh(area.capacity, roster.candidates().iter().copied(), |p| {
            roster.is_free_for(&p, &area.id) && world.is_inside(p, area)
        })
    };

    if !delta.excluded.is_empty() {
        tracing::debug!(
            area = %area.id,
            excluded = ?delta.excluded,
            "area at capacity, participants not admitted"
        );
    }
    if delta.is_unchanged() {
        return delta;
    }

    let mut outbox = Outbox { roster, sink };
    for &p in &delta.left {
        outbox.roster.leave_area(p, &area.id);
        if outbox.roster.get(&p).is_some_and(|r| r.leave_option_visible) {
            outbox.notify(Recipient::Player(p), Notification::HideLeaveOption);
        }
    }
    for &p in &delta.entered {
        outbox.roster.enter_area(p, &area.id);
        if state.is_counting_down() {
            outbox.notify(Recipient::Player(p), Notification::ShowLeaveOption);
        }
    }
    if delta.became_occupied {
        if let Some(&first) = state.members().first() {
            outbox.notify(
                Recipient::Player(first),
                Notification::ShowJoinUi {
                    area: area.id.clone(),
                },
            );
        }
    }

    tracing::debug!(
        area = %area.id,
        left = delta.left.len(),
        entered = delta.entered.len(),
        members = state.members().len(),
        "membership changed"
    );
    delta
}
