//! Simulated tracking sources for headless testing without an HMD.
//!
//! [`StaticTracker`] is a builder that pins each joint to a fixed pose and
//! lets tests inject dropouts and glitches.  [`SweepTracker`] animates a
//! plausible seated rig with sinusoidal hand motion for demos.
//!
//! # Example
//!
//! ```rust
//! use veil_tracking::StaticTracker;
//! use veil_pipeline::TrackingSource;
//! use veil_types::{Pose, Quaternion, TrackedJoint, Vec3};
//!
//! let mut tracker = StaticTracker::new()
//!     .with_head(Pose::new(Vec3::new(0.0, 1.6, 0.0), Quaternion::identity()))
//!     .build();
//!
//! assert!(tracker.sample(TrackedJoint::Head).is_some());
//! assert!(tracker.sample(TrackedJoint::LeftHand).is_none());
//! ```

use std::collections::HashMap;

use tracing::debug;
use veil_pipeline::TrackingSource;
use veil_types::{Pose, Quaternion, TrackedJoint, Vec3};

// ────────────────────────────────────────────────────────────────────────────
// Static tracker
// ────────────────────────────────────────────────────────────────────────────

/// A tracking source that returns a fixed pose per joint.
///
/// Built with [`StaticTracker::new`]; joints never added report as untracked
/// (`None`).  Tests mutate poses or drop joints mid-run through
/// [`set_pose`][StaticTrackerSource::set_pose] and
/// [`drop_joint`][StaticTrackerSource::drop_joint].
#[derive(Default)]
pub struct StaticTracker {
    poses: HashMap<TrackedJoint, Pose>,
}

impl StaticTracker {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the head to `pose`.
    pub fn with_head(self, pose: Pose) -> Self {
        self.with_pose(TrackedJoint::Head, pose)
    }

    /// Pin the left hand to `pose`.
    pub fn with_left_hand(self, pose: Pose) -> Self {
        self.with_pose(TrackedJoint::LeftHand, pose)
    }

    /// Pin the right hand to `pose`.
    pub fn with_right_hand(self, pose: Pose) -> Self {
        self.with_pose(TrackedJoint::RightHand, pose)
    }

    /// Pin the eye gaze rotation (position is ignored by the pipeline).
    pub fn with_eye_gaze(self, pose: Pose) -> Self {
        self.with_pose(TrackedJoint::EyeGaze, pose)
    }

    /// Pin an arbitrary joint to `pose`.
    pub fn with_pose(mut self, joint: TrackedJoint, pose: Pose) -> Self {
        self.poses.insert(joint, pose);
        self
    }

    /// A standing rig at typical adult proportions: head at 1.6 m, hands at
    /// the sides.
    pub fn standing() -> Self {
        let identity = Quaternion::identity();
        Self::new()
            .with_head(Pose::new(Vec3::new(0.0, 1.6, 0.0), identity))
            .with_left_hand(Pose::new(Vec3::new(-0.25, 1.0, 0.15), identity))
            .with_right_hand(Pose::new(Vec3::new(0.25, 1.0, 0.15), identity))
    }

    /// Consume the builder and return the runnable source.
    pub fn build(self) -> StaticTrackerSource {
        debug!(joints = self.poses.len(), "static tracker built");
        StaticTrackerSource { poses: self.poses }
    }
}

/// Runnable form of [`StaticTracker`].
pub struct StaticTrackerSource {
    poses: HashMap<TrackedJoint, Pose>,
}

impl StaticTrackerSource {
    /// Overwrite (or add) a joint pose mid-run.
    pub fn set_pose(&mut self, joint: TrackedJoint, pose: Pose) {
        self.poses.insert(joint, pose);
    }

    /// Simulate a tracking dropout: the joint reports untracked until
    /// [`set_pose`][Self::set_pose] restores it.
    pub fn drop_joint(&mut self, joint: TrackedJoint) {
        self.poses.remove(&joint);
    }
}

impl TrackingSource for StaticTrackerSource {
    fn sample(&mut self, joint: TrackedJoint) -> Option<Pose> {
        self.poses.get(&joint).copied()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sweep tracker
// ────────────────────────────────────────────────────────────────────────────

/// A demo rig with sinusoidal hand sweeps and gentle head sway.
///
/// Each [`sample`][TrackingSource::sample] of the head advances the internal
/// clock by one frame step; motion stays within a realistic standing
/// envelope so demo output looks like a person, not a metronome.
pub struct SweepTracker {
    /// Seconds advanced per head sample.
    step: f32,
    t: f32,
}

impl SweepTracker {
    /// `frame_hz` is the simulated tracking rate (samples per second).
    pub fn new(frame_hz: f32) -> Self {
        Self {
            step: 1.0 / frame_hz.max(1.0),
            t: 0.0,
        }
    }

    fn head_pose(&self) -> Pose {
        // Subtle sway: a couple of centimeters around the rest position.
        let sway = (self.t * 0.7).sin() * 0.02;
        Pose::new(Vec3::new(sway, 1.6 + sway * 0.5, 0.0), Quaternion::identity())
    }

    fn hand_pose(&self, side: f32) -> Pose {
        let swing = (self.t * 1.3 + side).sin() * 0.15;
        Pose::new(
            Vec3::new(side * 0.25, 1.0 + swing * 0.3, 0.15 + swing),
            Quaternion::identity(),
        )
    }
}

impl TrackingSource for SweepTracker {
    fn sample(&mut self, joint: TrackedJoint) -> Option<Pose> {
        match joint {
            TrackedJoint::Head => {
                self.t += self.step;
                Some(self.head_pose())
            }
            TrackedJoint::LeftHand => Some(self.hand_pose(-1.0)),
            TrackedJoint::RightHand => Some(self.hand_pose(1.0)),
            // No simulated eye tracker; gaze falls back to head orientation.
            TrackedJoint::EyeGaze => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
