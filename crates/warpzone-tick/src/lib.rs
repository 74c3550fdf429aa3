//! Frame clock and fixed-rate logic accumulator for warpzone.
//!
//! Two pieces, used together by the lobby runtime:
//!
//! - [`FrameClock`] wakes the actor at a configurable frame rate and
//!   reports how much *real* time elapsed since the previous frame.
//! - [`LogicAccumulator`] sums those elapsed times and fires a logic step
//!   once the sum crosses the configured interval, then resets to zero.
//!
//! # Fixed rate, not fixed phase
//!
//! The accumulator resets to zero instead of subtracting the interval.
//! Overshoot is discarded, so a slow frame never causes a burst of
//! back-to-back logic steps:
//!
//! ```text
//! interval = 250ms, frames of 100ms
//! acc: 100 → 200 → 300 (fire, reset) → 100 → 200 → 300 (fire, reset)
//! ```
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         frame = clock.wait_for_frame() => {
//!             lobby.advance(frame.elapsed);
//!             clock.record_frame_end();
//!         }
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the frame clock.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Frame rate in Hz. 0 = paused forever (frames never fire).
    pub frame_rate_hz: u32,
    /// Budget warning threshold (0.0–1.0). A tracing warning is emitted
    /// when frame work exceeds this fraction of the frame budget.
    pub budget_warn_threshold: f64,
    /// Random jitter (0–max µs) added to the *first* frame so lobbies
    /// started at the same instant don't wake in lockstep.
    pub initial_jitter_us: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: 30,
            budget_warn_threshold: 0.80,
            initial_jitter_us: 2_000,
        }
    }
}

impl FrameConfig {
    /// Maximum supported frame rate.
    pub const MAX_FRAME_RATE_HZ: u32 = 240;

    /// A config for a specific frame rate with default settings.
    pub fn with_rate(frame_rate_hz: u32) -> Self {
        Self {
            frame_rate_hz,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`FrameClock::new`].
    pub fn validated(mut self) -> Self {
        if self.frame_rate_hz > Self::MAX_FRAME_RATE_HZ {
            warn!(
                rate = self.frame_rate_hz,
                max = Self::MAX_FRAME_RATE_HZ,
                "frame_rate_hz exceeds maximum, clamping"
            );
            self.frame_rate_hz = Self::MAX_FRAME_RATE_HZ;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }

    /// Duration of a single frame. `None` when the rate is 0.
    pub fn frame_duration(&self) -> Option<Duration> {
        if self.frame_rate_hz == 0 {
            None
        } else {
            Some(Duration::from_secs_f64(1.0 / self.frame_rate_hz as f64))
        }
    }
}

// ---------------------------------------------------------------------------
// Frame info
// ---------------------------------------------------------------------------

/// Returned by [`FrameClock::wait_for_frame`].
#[derive(Debug, Clone)]
pub struct FrameInfo {
    /// Monotonically increasing frame number (starts at 1).
    pub frame: u64,
    /// Real time since the previous frame (or since the clock was
    /// created/resumed, for the first frame after either).
    pub elapsed: Duration,
    /// `true` if this frame woke up significantly late.
    pub late: bool,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Runtime metrics for the frame clock.
#[derive(Debug, Clone, Default)]
pub struct FrameMetrics {
    /// Total frames fired.
    pub total_frames: u64,
    /// Frames that woke up late.
    pub late_frames: u64,
    /// Longest frame work observed via [`FrameClock::record_frame_end`].
    pub max_frame_work: Duration,
    /// Last measured budget utilization (0.0–∞). >1.0 means overrun.
    pub budget_utilization: f64,
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Wakes the lobby actor once per frame and measures real elapsed time.
///
/// Frames are scheduled from *now* after each wake-up, so a late frame
/// never triggers a catch-up burst.
pub struct FrameClock {
    config: FrameConfig,
    frame_duration: Option<Duration>,
    frame_count: u64,
    next_frame: Option<TokioInstant>,
    last_frame: TokioInstant,
    /// Set by `wait_for_frame`, consumed by `record_frame_end`.
    work_start: Option<Instant>,
    paused: bool,
    metrics: FrameMetrics,
}

impl FrameClock {
    /// Creates a clock. The first frame is scheduled with optional jitter.
    pub fn new(config: FrameConfig) -> Self {
        let config = config.validated();
        let frame_duration = config.frame_duration();
        let now = TokioInstant::now();

        let next_frame = frame_duration.map(|d| {
            let jitter = if config.initial_jitter_us > 0 {
                let us = rand::rng().random_range(0..config.initial_jitter_us);
                Duration::from_micros(us)
            } else {
                Duration::ZERO
            };
            now + d + jitter
        });

        debug!(
            rate_hz = config.frame_rate_hz,
            frame_ms = ?frame_duration.map(|d| d.as_secs_f64() * 1000.0),
            "frame clock created"
        );

        Self {
            config,
            frame_duration,
            frame_count: 0,
            next_frame,
            last_frame: now,
            work_start: None,
            paused: false,
            metrics: FrameMetrics::default(),
        }
    }

    /// A clock for a specific frame rate with default settings.
    pub fn with_rate(frame_rate_hz: u32) -> Self {
        Self::new(FrameConfig::with_rate(frame_rate_hz))
    }

    /// Waits until the next frame is due.
    ///
    /// With a rate of 0, or while paused, this future pends forever; the
    /// other branches of a `tokio::select!` keep running.
    pub async fn wait_for_frame(&mut self) -> FrameInfo {
        let (next, frame_dur) = match (self.next_frame, self.frame_duration) {
            (Some(next), Some(dur)) if !self.paused => (next, dur),
            _ => return std::future::pending().await,
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        let elapsed = now.saturating_duration_since(self.last_frame);
        let late = now.saturating_duration_since(next) > frame_dur / 10;

        self.frame_count += 1;
        self.last_frame = now;
        self.next_frame = Some(now + frame_dur);
        self.work_start = Some(Instant::now());

        self.metrics.total_frames += 1;
        if late {
            self.metrics.late_frames += 1;
            debug!(
                frame = self.frame_count,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "frame woke late"
            );
        }
        trace!(frame = self.frame_count, "frame fired");

        FrameInfo {
            frame: self.frame_count,
            elapsed,
            late,
        }
    }

    /// Records that the work for the current frame has finished.
    ///
    /// Enables budget warnings. Calling it without a pending frame is a
    /// no-op.
    pub fn record_frame_end(&mut self) {
        let Some(start) = self.work_start.take() else {
            return;
        };
        let work = start.elapsed();

        if work > self.metrics.max_frame_work {
            self.metrics.max_frame_work = work;
        }
        if let Some(budget) = self.frame_duration {
            let utilization = work.as_secs_f64() / budget.as_secs_f64();
            self.metrics.budget_utilization = utilization;
            if utilization >= self.config.budget_warn_threshold {
                warn!(
                    frame = self.frame_count,
                    work_ms = work.as_secs_f64() * 1000.0,
                    budget_ms = budget.as_secs_f64() * 1000.0,
                    "frame approaching budget limit"
                );
            }
        }
    }

    /// Pauses the clock. Idempotent.
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            debug!(frame = self.frame_count, "frame clock paused");
        }
    }

    /// Resumes after a pause.
    ///
    /// Time spent paused is not reported as elapsed: the first frame after
    /// resuming measures from the resume instant.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            let now = TokioInstant::now();
            self.last_frame = now;
            if let Some(dur) = self.frame_duration {
                self.next_frame = Some(now + dur);
            }
            debug!(frame = self.frame_count, "frame clock resumed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn metrics(&self) -> &FrameMetrics {
        &self.metrics
    }

    pub fn frame_rate_hz(&self) -> u32 {
        self.config.frame_rate_hz
    }

    pub fn frame_duration(&self) -> Option<Duration> {
        self.frame_duration
    }
}

// ---------------------------------------------------------------------------
// Logic accumulator
// ---------------------------------------------------------------------------

/// Gates logic steps to a fixed rate, independent of the frame rate.
#[derive(Debug, Clone)]
pub struct LogicAccumulator {
    interval: Duration,
    accumulated: Duration,
}

impl LogicAccumulator {
    /// Creates an accumulator that fires every `interval`.
    ///
    /// A zero interval fires on every call to [`accumulate`](Self::accumulate).
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Adds `elapsed` and returns `true` if a logic step is due.
    ///
    /// When it fires, the accumulator resets to zero (overshoot is
    /// dropped).
    pub fn accumulate(&mut self, elapsed: Duration) -> bool {
        self.accumulated += elapsed;
        if self.accumulated >= self.interval {
            self.accumulated = Duration::ZERO;
            true
        } else {
            false
        }
    }

    /// Time accumulated towards the next step.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
