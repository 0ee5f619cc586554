//! `veil-runtime` – process-level plumbing around the privatization core.
//!
//! - [`telemetry`] – tracing subscriber and optional OTLP export.
//! - [`broadcast`] – async fan-out of pose events to subscribers.
//! - [`consumers`] – built-in consumers (analytics log, NDJSON recorder).
//! - [`session`] – fixed-rate frame clock driving the pipeline.

pub mod broadcast;
pub mod consumers;
pub mod session;
pub mod telemetry;

pub use broadcast::{BroadcastConsumer, PoseBus, PoseReceiver};
pub use consumers::{AnalyticsLog, JsonlRecorder};
pub use session::{Session, SessionConfig, SessionStats};
pub use telemetry::{TracerProviderGuard, init_tracing};
