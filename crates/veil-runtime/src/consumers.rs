//! Built-in pose consumers: structured analytics logging and NDJSON capture.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;
use veil_pipeline::PoseConsumer;
use veil_types::{PrivatizedPoseEvent, VeilError};

// ─────────────────────────────────────────────────────────────────────────────
// Analytics log
// ─────────────────────────────────────────────────────────────────────────────

/// Logs every event through `tracing` at debug level with the applied
/// displacement, the signal an operator watches to confirm privatization is
/// actually doing something.
#[derive(Debug, Default)]
pub struct AnalyticsLog;

impl AnalyticsLog {
    pub fn new() -> Self {
        Self
    }
}

impl PoseConsumer for AnalyticsLog {
    fn name(&self) -> &str {
        "analytics"
    }

    fn on_pose(&mut self, event: &PrivatizedPoseEvent) -> Result<(), VeilError> {
        let displacement = event.privatized.position.sub(event.raw.position).norm();
        debug!(
            frame = event.frame,
            joint = ?event.joint,
            displacement,
            "pose privatized"
        );
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NDJSON recorder
// ─────────────────────────────────────────────────────────────────────────────

/// Writes each event as one JSON line, suitable for offline replay and
/// privacy-budget analysis.  I/O failures surface as consumer errors; the
/// pipeline logs them and keeps the frame loop running.
pub struct JsonlRecorder {
    writer: BufWriter<File>,
    written: u64,
}

impl JsonlRecorder {
    pub fn create(path: &Path) -> Result<Self, VeilError> {
        let file = File::create(path).map_err(|e| VeilError::Consumer {
            consumer: "jsonl-recorder".to_string(),
            details: format!("cannot create {}: {e}", path.display()),
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Events written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush buffered lines to disk.  Also happens on drop, but an explicit
    /// flush reports the error instead of swallowing it.
    pub fn flush(&mut self) -> Result<(), VeilError> {
        self.writer.flush().map_err(|e| VeilError::Consumer {
            consumer: "jsonl-recorder".to_string(),
            details: format!("flush failed: {e}"),
        })
    }
}

impl PoseConsumer for JsonlRecorder {
    fn name(&self) -> &str {
        "jsonl-recorder"
    }

    fn on_pose(&mut self, event: &PrivatizedPoseEvent) -> Result<(), VeilError> {
        let line = serde_json::to_string(event).map_err(|e| VeilError::Consumer {
            consumer: "jsonl-recorder".to_string(),
            details: format!("serialization failed: {e}"),
        })?;
        writeln!(self.writer, "{line}").map_err(|e| VeilError::Consumer {
            consumer: "jsonl-recorder".to_string(),
            details: format!("write failed: {e}"),
        })?;
        self.written += 1;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
