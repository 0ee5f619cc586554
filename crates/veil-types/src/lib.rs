//! `veil-types` – shared vocabulary of the MotionVeil workspace.
//!
//! Defines the math primitives ([`Vec3`], [`Quaternion`], [`Pose`]), the
//! tracked-joint taxonomy, the privatized-pose event emitted once per joint
//! per frame, and the workspace-wide [`VeilError`] type.

pub mod math;

pub use math::{DEGENERATE_EPSILON, Pose, Quaternion, Vec3};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identity of a tracked body part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedJoint {
    Head,
    LeftHand,
    RightHand,
    /// Direction-only joint: derived from the head pose, never carries an
    /// independent position of its own.
    EyeGaze,
}

impl TrackedJoint {
    /// The joints that carry an independent world position.
    pub const POSITIONAL: [TrackedJoint; 3] = [
        TrackedJoint::Head,
        TrackedJoint::LeftHand,
        TrackedJoint::RightHand,
    ];

    /// Noise category this joint draws from.  Head tracking shares the
    /// subtle eye-scale noise; controllers use the hand scale.
    pub fn category(self) -> JointCategory {
        match self {
            TrackedJoint::Head | TrackedJoint::EyeGaze => JointCategory::Eye,
            TrackedJoint::LeftHand | TrackedJoint::RightHand => JointCategory::Hand,
        }
    }
}

/// Noise-scale category.  `Body` has no built-in joint mapped to it but is
/// part of the mechanism capability set for full-body trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointCategory {
    Eye,
    Hand,
    Body,
}

/// Application context selected by the user; scales the effective privacy
/// strength (a competitive shooter tolerates less perturbation than a casual
/// social space, so it gets the larger multiplier to compensate observers'
/// stronger incentive to reconstruct poses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationContext {
    Competitive,
    #[default]
    Casual,
}

impl ApplicationContext {
    /// Fixed per-context strength multiplier.
    pub fn strength_multiplier(self) -> f32 {
        match self {
            ApplicationContext::Competitive => 1.5,
            ApplicationContext::Casual => 0.5,
        }
    }
}

impl std::fmt::Display for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationContext::Competitive => write!(f, "competitive"),
            ApplicationContext::Casual => write!(f, "casual"),
        }
    }
}

/// One (raw, privatized) pose pair, emitted once per joint per frame.
/// Immutable once emitted; delivery is fire-and-forget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivatizedPoseEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Frame counter of the privatization pass that produced this event.
    pub frame: u64,
    pub joint: TrackedJoint,
    /// The cached original pose (never the previous frame's noisy output).
    pub raw: Pose,
    /// The clamped, ground-corrected noisy pose.
    pub privatized: Pose,
}

impl PrivatizedPoseEvent {
    /// Build an event with a fresh id and the current wall-clock timestamp.
    pub fn new(frame: u64, joint: TrackedJoint, raw: Pose, privatized: Pose) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            frame,
            joint,
            raw,
            privatized,
        }
    }
}

/// Workspace-wide error type.  Every variant is recoverable: the pipeline
/// degrades to the best available pose instead of halting frame delivery.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VeilError {
    #[error("Tracking glitch on {joint:?}: {details}")]
    TrackingGlitch {
        joint: TrackedJoint,
        details: String,
    },

    #[error("No privacy mechanism configured for '{context}'; falling back to passthrough")]
    MissingMechanism { context: String },

    #[error("Consumer '{consumer}' failed: {details}")]
    Consumer { consumer: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),
}
