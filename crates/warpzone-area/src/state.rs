//! Per-area mutable state.
//!
//! One [`AreaState`] per registered area, owned by the coordinator in a
//! single map and handed by `&mut` to each component in turn: the
//! occupancy refresh ([`occupancy`](crate::occupancy)), the countdown
//! ([`countdown`](crate::countdown)), and the relocation
//! ([`teleport`](crate::teleport)).

use std::time::Duration;

use serde::Serialize;
use warpzone_protocol::{AreaId, PlayerId};

use crate::{Area, Countdown};

/// The mutable half of an area.
#[derive(Debug, Default)]
pub struct AreaState {
    /// Participants inside the area, in admission order.
    pub(crate) members: Vec<PlayerId>,
    /// `Some` while a countdown is running.
    pub(crate) countdown: Option<Countdown>,
    /// Relocation lock. `true` only while a relocation is in flight.
    pub(crate) relocating: bool,
}

impl AreaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members in admission order. The first one is "first to enter".
    pub fn members(&self) -> &[PlayerId] {
        &self.members
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn is_relocating(&self) -> bool {
        self.relocating
    }

    /// The captured party size while a countdown runs, `default` otherwise.
    pub fn effective_capacity(&self, default: usize) -> usize {
        self.countdown
            .as_ref()
            .map_or(default, Countdown::captured_size)
    }

    /// A read-only snapshot for introspection.
    pub fn info(&self, area: &Area) -> AreaInfo {
        AreaInfo {
            area: area.id.clone(),
            members: self.members.clone(),
            phase: match &self.countdown {
                None => CountdownPhase::Idle,
                Some(c) => CountdownPhase::Running {
                    remaining: c.remaining(),
                    captured_size: c.captured_size(),
                },
            },
            capacity: self.effective_capacity(area.capacity),
            relocating: self.relocating,
        }
    }
}

/// Where an area is in its countdown cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CountdownPhase {
    Idle,
    Running {
        remaining: Duration,
        captured_size: usize,
    },
}

/// A snapshot of one area, returned by
/// [`Lobby::area_info`](crate::Lobby::area_info).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaInfo {
    pub area: AreaId,
    pub members: Vec<PlayerId>,
    pub phase: CountdownPhase,
    /// Effective capacity right now.
    pub capacity: usize,
    pub relocating: bool,
}
