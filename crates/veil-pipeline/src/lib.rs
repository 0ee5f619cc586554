//! `veil-pipeline` – the MotionVeil privatization core.
//!
//! Everything between raw tracking input and privatized output lives here:
//!
//! - [`reference`] – the per-joint original-pose cache (the anti-drift
//!   reference that noise can never write back into).
//! - [`frame`] – rig-local reference frame conversions; noise is applied in
//!   local space so it is invariant under rig placement.
//! - [`clamp`] – displacement bounding and ground correction.
//! - [`profile`] – privacy profile configuration and mechanism construction.
//! - [`pipeline`] – [`PrivacyPipeline`], the per-frame orchestrator tying
//!   the stages together and fanning events out to consumers.
//!
//! The crate is deliberately free of I/O and async: it is a pure
//! frame-synchronous state machine driven by [`PrivacyPipeline::tick`], which
//! makes every behavior unit-testable with plain in-memory collaborators.

pub mod clamp;
pub mod frame;
pub mod pipeline;
pub mod profile;
pub mod reference;

pub use clamp::{GROUND_BUFFER, GroundQuery, clamp_position};
pub use frame::ReferenceFrame;
pub use pipeline::{PipelineConfig, PoseConsumer, PrivacyPipeline, TrackingSource};
pub use profile::{MechanismKind, MechanismSettings, PrivacyProfile, ProfileSelection, ProfileSet};
pub use reference::{OriginalPoseRecord, PoseReferenceCache};
