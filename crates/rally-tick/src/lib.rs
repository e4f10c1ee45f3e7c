//! Fixed-timestep tick scheduler for Rally match rooms.
//!
//! One scheduler per room actor. The scheduler hands out a fixed `dt`
//! every `1 / tick_rate` seconds; when a tick fires late, the missed
//! ticks are skipped and the cadence restarts from now (no catch-up
//! bursts, no death spirals).
//!
//! # Integration
//!
//! The scheduler sits inside a room actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         tick = scheduler.wait_for_tick() => {
//!             sim.step(tick.dt);
//!         }
//!     }
//! }
//! ```
//!
//! While paused (room in its `Paused` state, or still waiting for
//! players), [`TickScheduler::wait_for_tick`] pends forever so the
//! `select!` only reacts to commands.

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

/// Configuration for the tick scheduler.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Tick rate in Hz. Clamped to `1..=MAX_TICK_RATE_HZ`.
    pub tick_rate_hz: u32,
    /// Random jitter (0–max µs) added to the *first* tick so rooms
    /// created in the same instant don't all fire together.
    pub initial_jitter_us: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60,
            initial_jitter_us: 2_000,
        }
    }
}

impl TickConfig {
    /// Maximum supported tick rate.
    pub const MAX_TICK_RATE_HZ: u32 = 128;

    /// Create a config for a specific tick rate.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self {
            tick_rate_hz,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`TickScheduler::new`]. A rate of 0
    /// makes no sense for a simulation room and is raised to 1.
    pub fn validated(mut self) -> Self {
        if self.tick_rate_hz == 0 {
            warn!("tick_rate_hz of 0 is not supported — raising to 1");
            self.tick_rate_hz = 1;
        }
        if self.tick_rate_hz > Self::MAX_TICK_RATE_HZ {
            warn!(
                rate = self.tick_rate_hz,
                max = Self::MAX_TICK_RATE_HZ,
                "tick_rate_hz exceeds maximum — clamping"
            );
            self.tick_rate_hz = Self::MAX_TICK_RATE_HZ;
        }
        self
    }

    /// Duration of a single tick.
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.validated_rate() as f64)
    }

    fn validated_rate(&self) -> u32 {
        self.tick_rate_hz.clamp(1, Self::MAX_TICK_RATE_HZ)
    }
}

/// Information about a fired tick, returned by [`TickScheduler::wait_for_tick`].
#[derive(Debug, Clone)]
pub struct TickInfo {
    /// Monotonically increasing tick number (starts at 1).
    pub tick: u64,
    /// Fixed delta time for this tick (always `1 / tick_rate`).
    /// Simulation code must use this, not wall-clock elapsed time.
    pub dt: Duration,
    /// `true` if this tick fired late.
    pub overrun: bool,
    /// Ticks skipped because of the overrun (0 in normal operation).
    pub ticks_skipped: u64,
}

/// Fixed-timestep tick scheduler. One per room actor.
pub struct TickScheduler {
    tick_duration: Duration,
    tick_rate_hz: u32,
    tick_count: u64,
    /// When the next tick should fire. `None` while paused.
    next_tick: Option<TokioInstant>,
}

impl TickScheduler {
    /// Create a new scheduler. The first tick is scheduled with
    /// optional jitter to desynchronize rooms.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        let tick_duration = config.tick_duration();

        let jitter = if config.initial_jitter_us > 0 {
            let us = rand::rng().random_range(0..config.initial_jitter_us);
            Duration::from_micros(us)
        } else {
            Duration::ZERO
        };

        debug!(
            rate_hz = config.tick_rate_hz,
            budget_ms = tick_duration.as_secs_f64() * 1000.0,
            "tick scheduler created"
        );

        Self {
            tick_duration,
            tick_rate_hz: config.tick_rate_hz,
            tick_count: 0,
            next_tick: Some(TokioInstant::now() + tick_duration + jitter),
        }
    }

    /// Create a scheduler for a specific tick rate with default settings.
    pub fn with_rate(tick_rate_hz: u32) -> Self {
        Self::new(TickConfig::with_rate(tick_rate_hz))
    }

    /// Wait until the next tick is due.
    ///
    /// While paused this future pends forever — it never resolves on
    /// its own, but a surrounding `tokio::select!` still processes its
    /// other branches.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let Some(next) = self.next_tick else {
            std::future::pending::<()>().await;
            unreachable!()
        };

        time::sleep_until(next).await;

        let now = TokioInstant::now();
        self.tick_count += 1;

        // Late by more than 10% of a tick counts as an overrun; the
        // missed ticks are skipped and the cadence restarts from now.
        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > self.tick_duration / 10;
        let mut ticks_skipped = 0u64;
        if overrun {
            ticks_skipped =
                late_by.as_nanos() as u64 / self.tick_duration.as_nanos() as u64;
            if ticks_skipped > 0 {
                warn!(
                    tick = self.tick_count,
                    skipped = ticks_skipped,
                    late_ms = late_by.as_secs_f64() * 1000.0,
                    "tick overrun — skipping ahead"
                );
            }
        }
        self.next_tick = Some(now + self.tick_duration);

        trace!(tick = self.tick_count, overrun, "tick fired");

        TickInfo {
            tick: self.tick_count,
            dt: self.tick_duration,
            overrun,
            ticks_skipped,
        }
    }

    /// Pause the tick loop. `wait_for_tick` pends until
    /// [`resume`](Self::resume). Idempotent.
    pub fn pause(&mut self) {
        if self.next_tick.take().is_some() {
            debug!(tick = self.tick_count, "tick scheduler paused");
        }
    }

    /// Resume after a pause. The next tick fires a full tick from now,
    /// so time spent paused never produces a catch-up burst. Idempotent.
    pub fn resume(&mut self) {
        if self.next_tick.is_none() {
            self.next_tick = Some(TokioInstant::now() + self.tick_duration);
            debug!(tick = self.tick_count, "tick scheduler resumed");
        }
    }

    /// Whether the scheduler is currently paused.
    pub fn is_paused(&self) -> bool {
        self.next_tick.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// The configured tick rate in Hz.
    pub fn tick_rate_hz(&self) -> u32 {
        self.tick_rate_hz
    }

    /// The fixed tick duration.
    pub fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}
