//! Async session driver: runs the pipeline on a fixed frame clock.
//!
//! [`Session`] owns a [`PrivacyPipeline`] and ticks it from a
//! [`tokio::time::interval`] until the stop flag is raised or an optional
//! frame budget runs out.  The stop flag is an [`Arc<AtomicBool>`] so a
//! Ctrl-C handler (or any other thread) can request shutdown without
//! touching the async runtime.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;
use veil_pipeline::{GroundQuery, PrivacyPipeline, TrackingSource};

/// Frame clock settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Ticks per second.  Typical HMD rates are 72–120.
    pub frame_hz: f32,
    /// Stop after this many frames; `None` runs until the stop flag.
    pub frame_budget: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_hz: 72.0,
            frame_budget: None,
        }
    }
}

/// Totals reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub frames: u64,
    pub events: u64,
}

/// Fixed-rate pipeline driver.
pub struct Session {
    pipeline: PrivacyPipeline,
    config: SessionConfig,
    stop: Arc<AtomicBool>,
}

impl Session {
    pub fn new(pipeline: PrivacyPipeline, config: SessionConfig) -> Self {
        Self {
            pipeline,
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared stop flag; set it to `true` to end [`run`][Self::run] after the
    /// current frame.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn pipeline_mut(&mut self) -> &mut PrivacyPipeline {
        &mut self.pipeline
    }

    /// Drive the pipeline until stopped.  Missed ticks are delayed, not
    /// burst-replayed; a stalled host never causes a flood of catch-up
    /// frames.
    pub async fn run(
        &mut self,
        tracking: &mut dyn TrackingSource,
        ground: Option<&dyn GroundQuery>,
    ) -> SessionStats {
        let period = Duration::from_secs_f32(1.0 / self.config.frame_hz.max(1.0));
        let mut clock = tokio::time::interval(period);
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(frame_hz = self.config.frame_hz, "session started");
        let mut stats = SessionStats::default();

        while !self.stop.load(Ordering::Relaxed) {
            if let Some(budget) = self.config.frame_budget
                && stats.frames >= budget
            {
                break;
            }
            clock.tick().await;
            let events = self.pipeline.tick(tracking, ground);
            stats.frames += 1;
            stats.events += events.len() as u64;
        }

        info!(frames = stats.frames, events = stats.events, "session ended");
        stats
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
