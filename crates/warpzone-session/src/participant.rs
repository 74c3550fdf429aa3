//! The per-participant record.

use std::time::Instant;

use warpzone_protocol::{AreaId, PlayerId};

/// Everything the lobby core remembers about one participant.
///
/// Created on [`Roster::connect`](crate::Roster::connect), destroyed on
/// disconnect. Never persisted.
#[derive(Debug, Clone)]
pub struct Participant {
    /// The participant's handle.
    pub player_id: PlayerId,

    /// The area whose membership currently includes this participant.
    ///
    /// Invariant: at most one. Updated by the occupancy refresh, never by
    /// a leave request.
    pub area: Option<AreaId>,

    /// Whether the client has been told to show the leave option and not
    /// yet told to hide it.
    pub leave_option_visible: bool,

    /// When the participant entered the system. `Instant` is monotonic,
    /// so wall-clock adjustments don't reorder anyone.
    pub connected_at: Instant,
}

impl Participant {
    pub(crate) fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            area: None,
            leave_option_visible: false,
            connected_at: Instant::now(),
        }
    }

    /// Returns `true` if the participant is a member of `area`.
    pub fn is_in(&self, area: &AreaId) -> bool {
        self.area.as_ref() == Some(area)
    }
}
