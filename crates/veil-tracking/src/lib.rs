//! `veil-tracking` – tracking sources and ground providers.
//!
//! Implementations of the [`TrackingSource`][veil_pipeline::TrackingSource]
//! and [`GroundQuery`][veil_pipeline::GroundQuery] pipeline contracts for
//! headless operation: a fixed-pose builder for tests and a sinusoidal sweep
//! rig for demos.  Real device backends plug in behind the same traits.

pub mod ground;
pub mod sim;

pub use ground::{FlatGround, NoGround};
pub use sim::{StaticTracker, StaticTrackerSource, SweepTracker};
