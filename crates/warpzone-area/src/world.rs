//! Collaborator seams: what the core asks of the outside world.
//!
//! The lobby never touches geometry, avatars, or sockets. It asks three
//! narrow questions and emits intents:
//!
//! - [`Containment`]: is this participant inside this area right now?
//! - [`Presence`]: move this participant's avatar, if it still exists.
//! - [`NotificationSink`]: deliver this notification somewhere.

use tokio::sync::mpsc;
use warpzone_protocol::{Notification, PlayerId, Recipient, Vec3};

use crate::Area;

/// A notification paired with its recipient.
pub type Outbound = (Recipient, Notification);

/// Answers whether a participant is within an area's bounds.
///
/// Called once per candidate per area per tick, so it should be cheap.
pub trait Containment {
    fn is_inside(&self, player: PlayerId, area: &Area) -> bool;
}

/// Owns participants' live position carriers (avatars).
pub trait Presence {
    /// Moves the participant to `to`.
    ///
    /// Returns `false` if the participant has no live carrier (not spawned
    /// yet, mid-respawn, disconnected). That is a normal outcome, not an
    /// error.
    fn move_to(&mut self, player: PlayerId, to: Vec3) -> bool;
}

/// Everything the lobby needs from the simulated world.
pub trait World: Containment + Presence {}

impl<T: Containment + Presence> World for T {}

/// Receives the lobby's outbound notifications.
///
/// Delivery is fire-and-forget: a sink must never block or fail back
/// into the tick.
pub trait NotificationSink {
    fn notify(&mut self, to: Recipient, notification: Notification);
}

/// Collects notifications in memory. Handy for tests and replays.
impl NotificationSink for Vec<Outbound> {
    fn notify(&mut self, to: Recipient, notification: Notification) {
        self.push((to, notification));
    }
}

/// Forwards notifications to a channel consumer (a network layer, a UI
/// thread). Silently drops them once the receiver is gone.
impl NotificationSink for mpsc::UnboundedSender<Outbound> {
    fn notify(&mut self, to: Recipient, notification: Notification) {
        let _ = self.send((to, notification));
    }
}
