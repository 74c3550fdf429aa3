//! Lobby configuration and party-size admission policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;
use warpzone_protocol::{AreaId, Vec3};

use crate::AreaError;

// ---------------------------------------------------------------------------
// LobbyConfig
// ---------------------------------------------------------------------------

/// Configuration for a lobby.
///
/// Every field has a default, so a JSON config only needs to name what it
/// overrides:
///
/// ```json
/// { "default_capacity": 6, "party_size_policy": "Reject" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Capacity of an area registered without an explicit one, and of any
    /// area while no countdown is running.
    pub default_capacity: usize,

    /// How long a countdown runs before the group is relocated.
    pub countdown: Duration,

    /// Fixed interval between logic ticks, independent of frame rate.
    pub logic_interval: Duration,

    /// Whole second at which the pre-teleport effect fires.
    pub pre_teleport_at: u32,

    /// Tick pulses fire for every whole second at or below this value.
    pub pulse_from: u32,

    /// Upward offset added to a relocation destination so arrivals don't
    /// land inside the floor.
    pub arrival_lift: f32,

    /// Where a participant goes when they ask to leave.
    pub fallback_location: Vec3,

    /// What to do with an untrusted party size in a start request.
    pub party_size_policy: PartySizePolicy,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            default_capacity: 4,
            countdown: Duration::from_secs(15),
            logic_interval: Duration::from_millis(250),
            pre_teleport_at: 4,
            pulse_from: 5,
            arrival_lift: 3.0,
            fallback_location: Vec3::ZERO,
            party_size_policy: PartySizePolicy::default(),
        }
    }
}

impl LobbyConfig {
    /// Parses a config from JSON and validates it.
    pub fn from_json(json: &str) -> Result<Self, AreaError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Fixes any out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`Lobby::new`](crate::Lobby::new).
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.default_capacity == 0 {
            warn!("default_capacity is 0, using 1");
            self.default_capacity = 1;
        }
        if self.countdown.is_zero() {
            warn!(
                fallback_ms = defaults.countdown.as_millis() as u64,
                "countdown is zero, using default"
            );
            self.countdown = defaults.countdown;
        }
        if self.logic_interval.is_zero() {
            warn!(
                fallback_ms = defaults.logic_interval.as_millis() as u64,
                "logic_interval is zero, using default"
            );
            self.logic_interval = defaults.logic_interval;
        }
        if !self.arrival_lift.is_finite() || self.arrival_lift < 0.0 {
            warn!(lift = self.arrival_lift, "arrival_lift out of range, using 0");
            self.arrival_lift = 0.0;
        }
        self
    }

    /// The countdown cue thresholds.
    pub fn cues(&self) -> crate::CountdownCues {
        crate::CountdownCues {
            pre_teleport_at: self.pre_teleport_at,
            pulse_from: self.pulse_from,
        }
    }
}

// ---------------------------------------------------------------------------
// PartySizePolicy
// ---------------------------------------------------------------------------

/// How a start request's party size is checked against the area.
///
/// The party size becomes the area's capacity for the whole countdown, so
/// the acceptable range is `max(1, current members) ..= area capacity`.
/// The lower bound keeps the capacity invariant: a countdown never
/// captures fewer slots than there are members already inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartySizePolicy {
    /// Pull out-of-range sizes into range and log it.
    #[default]
    Clamp,
    /// Refuse out-of-range sizes with [`AreaError::InvalidPartySize`].
    Reject,
    /// Use whatever the client sent.
    Permissive,
}

impl PartySizePolicy {
    /// Turns a requested party size into the size the countdown captures.
    pub fn resolve(
        self,
        area: &AreaId,
        requested: usize,
        members: usize,
        capacity: usize,
    ) -> Result<usize, AreaError> {
        let min = members.max(1);
        let max = capacity.max(min);
        match self {
            Self::Permissive => Ok(requested),
            Self::Clamp => {
                let size = requested.clamp(min, max);
                if size != requested {
                    warn!(area = %area, requested, size, "party size clamped");
                }
                Ok(size)
            }
            Self::Reject if (min..=max).contains(&requested) => Ok(requested),
            Self::Reject => Err(AreaError::InvalidPartySize {
                area: area.clone(),
                requested,
                min,
                max,
            }),
        }
    }
}
