//! Per-area countdown state machine.
//!
//! ```text
//!          start()                 tick() with remaining > 0
//!   Idle ──────────→ Running ◀───────────────────────────┐
//!    ▲                  │ └───────────────────────────────┘
//!    │                  │ tick() with remaining ≤ 0
//!    └──── Expired ◀────┘  (instantaneous: yields snapshot, back to Idle)
//! ```
//!
//! Cues are keyed to the *displayed* whole second (the ceiling of the
//! remaining time), not to wall time, so they fire once per second no
//! matter how fine or coarse the tick is. The memo of the last displayed
//! second lives inside the [`Countdown`] and disappears with it.

use std::time::Duration;

use warpzone_protocol::{AreaId, PlayerId};

use crate::{AreaError, AreaState};

/// Cue thresholds, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownCues {
    /// The pre-teleport effect fires when the display first shows this.
    pub pre_teleport_at: u32,
    /// Pulses fire for each newly displayed second at or below this.
    pub pulse_from: u32,
}

impl Default for CountdownCues {
    fn default() -> Self {
        Self {
            pre_teleport_at: 4,
            pulse_from: 5,
        }
    }
}

/// A running countdown.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining: Duration,
    captured_size: usize,
    last_displayed: Option<u32>,
}

impl Countdown {
    pub fn new(duration: Duration, captured_size: usize) -> Self {
        Self {
            remaining: duration,
            captured_size,
            last_displayed: None,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// The party size captured at start; the area's capacity until expiry.
    pub fn captured_size(&self) -> usize {
        self.captured_size
    }

    /// Remaining time rounded up to whole seconds.
    pub fn remaining_secs(&self) -> u32 {
        ceil_secs(self.remaining)
    }

    /// Decrements the timer. Returns the displayed second and whether it
    /// differs from the previously displayed one.
    fn step(&mut self, dt: Duration) -> (u32, bool) {
        self.remaining = self.remaining.saturating_sub(dt);
        let shown = ceil_secs(self.remaining);
        let changed = self.last_displayed != Some(shown);
        self.last_displayed = Some(shown);
        (shown, changed)
    }
}

fn ceil_secs(d: Duration) -> u32 {
    let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}

/// The outcome of advancing a running countdown by one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still running.
    Running {
        /// Remaining time rounded up to whole seconds.
        remaining_secs: u32,
        captured_size: usize,
        /// The display just reached the pre-teleport second.
        pre_teleport: bool,
        /// A newly displayed second within the pulse range.
        pulse: Option<u32>,
    },
    /// Timer hit zero. The area is already back to idle.
    Expired {
        /// Membership at the moment of expiry, to be relocated.
        snapshot: Vec<PlayerId>,
        captured_size: usize,
        /// `Some(0)` unless zero was already displayed.
        pulse: Option<u32>,
    },
}

impl AreaState {
    /// Starts a countdown that captures `party_size` as the area's
    /// capacity.
    ///
    /// # Errors
    /// [`AreaError::CountdownAlreadyRunning`] if one is already running;
    /// the running countdown is not touched.
    pub fn start_countdown(
        &mut self,
        area: &AreaId,
        duration: Duration,
        party_size: usize,
    ) -> Result<(), AreaError> {
        if self.countdown.is_some() {
            return Err(AreaError::CountdownAlreadyRunning(area.clone()));
        }
        self.countdown = Some(Countdown::new(duration, party_size));
        Ok(())
    }

    /// Advances the countdown by `dt`. Returns `None` while idle.
    ///
    /// On expiry the countdown is cleared before returning, so a new start
    /// succeeds immediately whatever happens to the relocation.
    pub fn advance_countdown(&mut self, dt: Duration, cues: CountdownCues) -> Option<CountdownStep> {
        let countdown = self.countdown.as_mut()?;
        let (shown, changed) = countdown.step(dt);
        let pulse = (changed && shown <= cues.pulse_from).then_some(shown);

        if countdown.remaining.is_zero() {
            let captured_size = countdown.captured_size;
            self.countdown = None;
            return Some(CountdownStep::Expired {
                snapshot: self.members.clone(),
                captured_size,
                pulse,
            });
        }

        Some(CountdownStep::Running {
            remaining_secs: shown,
            captured_size: countdown.captured_size,
            pre_teleport: changed && shown == cues.pre_teleport_at,
            pulse,
        })
    }
}
