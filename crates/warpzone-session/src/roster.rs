//! The roster: every participant currently in the system.
//!
//! # Concurrency note
//!
//! `Roster` is not thread-safe by itself. It is owned by the lobby
//! coordinator, which in turn is owned by a single actor task. All access
//! is serialized through that task's command channel.

use std::collections::HashMap;

use warpzone_protocol::{AreaId, PlayerId};

use crate::{Participant, SessionError};

/// All connected participants, in connection order.
///
/// Connection order matters: it is the candidate order the occupancy
/// refresh uses, so when more participants stand in an area than it has
/// room for, the earliest arrivals in the system win.
///
/// ```text
/// connect() ──→ enter_area() ──→ leave_area() ──→ disconnect()
///                   │                  ▲
///                   └──────────────────┘   (any number of times)
/// ```
#[derive(Debug, Default)]
pub struct Roster {
    participants: HashMap<PlayerId, Participant>,
    /// Connection order. Kept in sync with `participants`.
    order: Vec<PlayerId>,
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a participant to the system.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the player already has
    /// a record.
    pub fn connect(&mut self, player_id: PlayerId) -> Result<&Participant, SessionError> {
        if self.participants.contains_key(&player_id) {
            return Err(SessionError::AlreadyConnected(player_id));
        }

        self.order.push(player_id);
        let participant = self
            .participants
            .entry(player_id)
            .or_insert_with(|| Participant::new(player_id));

        tracing::info!(%player_id, "participant connected");
        Ok(participant)
    }

    /// Removes a participant and returns its final record.
    ///
    /// The participant's area membership is *not* reconciled here; the
    /// next occupancy refresh drops them because they are no longer a
    /// candidate.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the player has no record.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Result<Participant, SessionError> {
        let participant = self
            .participants
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        self.order.retain(|p| *p != player_id);

        tracing::info!(
            %player_id,
            area = ?participant.area,
            "participant disconnected"
        );
        Ok(participant)
    }

    /// Looks up a participant.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Participant> {
        self.participants.get(player_id)
    }

    /// Returns `true` if the player is connected.
    pub fn contains(&self, player_id: &PlayerId) -> bool {
        self.participants.contains_key(player_id)
    }

    /// Connected players in connection order.
    pub fn candidates(&self) -> &[PlayerId] {
        &self.order
    }

    /// The area a participant is currently a member of.
    pub fn area_of(&self, player_id: &PlayerId) -> Option<&AreaId> {
        self.participants.get(player_id)?.area.as_ref()
    }

    /// Returns `true` if the participant may be admitted to `area`: it is
    /// connected and not already a member somewhere else.
    pub fn is_free_for(&self, player_id: &PlayerId, area: &AreaId) -> bool {
        match self.participants.get(player_id) {
            Some(p) => p.area.as_ref().is_none_or(|current| current == area),
            None => false,
        }
    }

    /// Records that a participant became a member of `area`.
    ///
    /// Returns `false` (and changes nothing) if the participant is unknown
    /// or is already a member of a different area.
    pub fn enter_area(&mut self, player_id: PlayerId, area: &AreaId) -> bool {
        let Some(p) = self.participants.get_mut(&player_id) else {
            return false;
        };
        match &p.area {
            Some(current) if current != area => {
                tracing::warn!(
                    %player_id,
                    current = %current,
                    requested = %area,
                    "participant already belongs to another area"
                );
                false
            }
            _ => {
                p.area = Some(area.clone());
                true
            }
        }
    }

    /// Records that a participant is no longer a member of `area`.
    ///
    /// A no-op if the participant is unknown or belongs elsewhere.
    pub fn leave_area(&mut self, player_id: PlayerId, area: &AreaId) {
        if let Some(p) = self.participants.get_mut(&player_id) {
            if p.is_in(area) {
                p.area = None;
            }
        }
    }

    /// Sets whether the participant's leave option is visible.
    ///
    /// Returns the previous value, or `None` for an unknown participant.
    pub fn set_leave_option(&mut self, player_id: PlayerId, visible: bool) -> Option<bool> {
        let p = self.participants.get_mut(&player_id)?;
        Some(std::mem::replace(&mut p.leave_option_visible, visible))
    }

    /// Number of connected participants.
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Naming convention: `test_{function}_{scenario}_{expected}`.

    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn alpha() -> AreaId {
        AreaId::new("Alpha")
    }

    #[test]
    fn test_connect_new_player_has_no_area() {
        let mut roster = Roster::new();
        let p = roster.connect(pid(1)).unwrap();
        assert_eq!(p.player_id, pid(1));
        assert!(p.area.is_none());
        assert!(!p.leave_option_visible);
    }

    #[test]
    fn test_connect_twice_returns_already_connected() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        let err = roster.connect(pid(1)).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyConnected(p) if p == pid(1)));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_candidates_follow_connection_order() {
        let mut roster = Roster::new();
        for id in [3, 1, 2] {
            roster.connect(pid(id)).unwrap();
        }
        assert_eq!(roster.candidates(), &[pid(3), pid(1), pid(2)]);
    }

    #[test]
    fn test_disconnect_removes_from_candidates() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        roster.connect(pid(2)).unwrap();
        roster.enter_area(pid(1), &alpha());

        let gone = roster.disconnect(pid(1)).unwrap();
        assert_eq!(gone.area, Some(alpha()));
        assert_eq!(roster.candidates(), &[pid(2)]);
        assert!(!roster.contains(&pid(1)));
    }

    #[test]
    fn test_disconnect_unknown_returns_not_found() {
        let mut roster = Roster::new();
        assert!(matches!(
            roster.disconnect(pid(9)),
            Err(SessionError::NotFound(_))
        ));
    }

    #[test]
    fn test_reconnect_after_disconnect_goes_to_back_of_line() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        roster.connect(pid(2)).unwrap();
        roster.disconnect(pid(1)).unwrap();
        roster.connect(pid(1)).unwrap();
        assert_eq!(roster.candidates(), &[pid(2), pid(1)]);
    }

    #[test]
    fn test_enter_area_refuses_second_area() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        assert!(roster.enter_area(pid(1), &alpha()));
        assert!(!roster.enter_area(pid(1), &AreaId::new("Beta")));
        assert_eq!(roster.area_of(&pid(1)), Some(&alpha()));
    }

    #[test]
    fn test_enter_same_area_again_is_ok() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        assert!(roster.enter_area(pid(1), &alpha()));
        assert!(roster.enter_area(pid(1), &alpha()));
    }

    #[test]
    fn test_is_free_for_checks_connection_and_membership() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        let beta = AreaId::new("Beta");

        assert!(roster.is_free_for(&pid(1), &alpha()));
        roster.enter_area(pid(1), &alpha());
        assert!(roster.is_free_for(&pid(1), &alpha()));
        assert!(!roster.is_free_for(&pid(1), &beta));
        assert!(!roster.is_free_for(&pid(2), &alpha()));
    }

    #[test]
    fn test_leave_area_ignores_other_area() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        roster.enter_area(pid(1), &alpha());

        roster.leave_area(pid(1), &AreaId::new("Beta"));
        assert_eq!(roster.area_of(&pid(1)), Some(&alpha()));

        roster.leave_area(pid(1), &alpha());
        assert_eq!(roster.area_of(&pid(1)), None);
    }

    #[test]
    fn test_set_leave_option_returns_previous() {
        let mut roster = Roster::new();
        roster.connect(pid(1)).unwrap();
        assert_eq!(roster.set_leave_option(pid(1), true), Some(false));
        assert_eq!(roster.set_leave_option(pid(1), false), Some(true));
        assert_eq!(roster.set_leave_option(pid(2), true), None);
    }
}
