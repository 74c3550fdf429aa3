//! Occupancy tracking: who is inside each area this tick.
//!
//! Membership is rebuilt from the containment predicate on every tick.
//! Removals run before admissions, so someone who drops out and comes
//! back within one refresh competes for a slot like any newcomer.

use std::collections::HashSet;

use warpzone_protocol::PlayerId;

use crate::AreaState;

/// What changed in one area during one refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDelta {
    /// Former members no longer inside, in their old membership order.
    pub left: Vec<PlayerId>,
    /// Newly admitted members, in candidate order.
    pub entered: Vec<PlayerId>,
    /// Inside the bounds but not admitted because the area is at its
    /// effective capacity. Re-evaluated every refresh.
    pub excluded: Vec<PlayerId>,
    /// The area was empty before this refresh and is occupied after it.
    pub became_occupied: bool,
}

impl MembershipDelta {
    /// Returns `true` if membership did not change.
    pub fn is_unchanged(&self) -> bool {
        self.left.is_empty() && self.entered.is_empty()
    }
}

impl AreaState {
    /// Reconciles membership with the participants currently inside.
    ///
    /// `candidates` are evaluated in order; `is_inside` is called once per
    /// distinct candidate. Admission is capped at the effective capacity
    /// (the captured party size while a countdown runs, `default_capacity`
    /// otherwise). Capacity gating is not an error: excess participants
    /// are simply reported in [`MembershipDelta::excluded`].
    pub fn refresh<I, F>(
        &mut self,
        default_capacity: usize,
        candidates: I,
        mut is_inside: F,
    ) -> MembershipDelta
    where
        I: IntoIterator<Item = PlayerId>,
        F: FnMut(PlayerId) -> bool,
    {
        let was_empty = self.members.is_empty();

        let mut seen = HashSet::new();
        let found: Vec<PlayerId> = candidates
            .into_iter()
            .filter(|p| seen.insert(*p))
            .filter(|p| is_inside(*p))
            .collect();
        let found_set: HashSet<PlayerId> = found.iter().copied().collect();

        let mut delta = MembershipDelta::default();

        // Removals first; survivors keep their relative order.
        self.members.retain(|p| {
            let stays = found_set.contains(p);
            if !stays {
                delta.left.push(*p);
            }
            stays
        });

        let capacity = self.effective_capacity(default_capacity);
        for p in found {
            if self.members.contains(&p) {
                continue;
            }
            if self.members.len() < capacity {
                self.members.push(p);
                delta.entered.push(p);
            } else {
                delta.excluded.push(p);
            }
        }

        delta.became_occupied = was_empty && !self.members.is_empty();
        delta
    }

    /// Drops a participant from the membership outside a refresh, e.g. on
    /// disconnect. Returns `true` if they were a member.
    pub fn remove_member(&mut self, player: PlayerId) -> bool {
        let before = self.members.len();
        self.members.retain(|p| *p != player);
        self.members.len() != before
    }
}
