//! [`PrivacyPipeline`] – the per-frame privatization orchestrator.
//!
//! Each tick runs the complete transform chain for every tracked joint:
//!
//! 1. **Capture** – read the raw pose from the [`TrackingSource`] and refresh
//!    the [`PoseReferenceCache`] (invalid samples are dropped fail-soft).
//! 2. **Localize** – convert the cached original pose into the rig-local
//!    [`ReferenceFrame`].
//! 3. **Perturb** – apply the joint category's configured privacy mechanism
//!    in local space.
//! 4. **Reproject** – convert the noisy local pose back to world space.
//! 5. **Bound** – clamp the displacement against the cached original and
//!    snap above the ground sample if one is available.
//! 6. **Emit** – deliver a [`PrivatizedPoseEvent`] (raw + privatized pair)
//!    to every registered consumer.
//!
//! Eye gaze is derived, not captured: a point is projected forward from the
//! cached head pose, privatized like a position, and the direction from head
//! to the privatized point becomes the privatized gaze rotation.
//!
//! The pipeline is single-threaded and frame-synchronous: all mutable state
//! is owned exclusively by the instance and touched only inside
//! [`PrivacyPipeline::tick`].  Profile swaps are double-buffered and applied
//! at the start of the next tick, never observed mid-frame.
//!
//! # Example
//!
//! ```rust
//! use veil_pipeline::pipeline::{PipelineConfig, PrivacyPipeline, TrackingSource};
//! use veil_pipeline::profile::ProfileSet;
//! use veil_types::{Pose, Quaternion, TrackedJoint, Vec3};
//!
//! struct Fixed;
//! impl TrackingSource for Fixed {
//!     fn sample(&mut self, joint: TrackedJoint) -> Option<Pose> {
//!         (joint == TrackedJoint::Head)
//!             .then(|| Pose::new(Vec3::new(0.0, 1.6, 0.0), Quaternion::identity()))
//!     }
//! }
//!
//! let mut pipeline = PrivacyPipeline::new(PipelineConfig::default(), ProfileSet::passthrough());
//! let events = pipeline.tick(&mut Fixed, None);
//! assert_eq!(events.len(), 2); // head + derived eye gaze
//! ```

use tracing::{debug, info, warn};
use veil_types::{JointCategory, Pose, PrivatizedPoseEvent, Quaternion, TrackedJoint, Vec3, VeilError};

use crate::clamp::{GroundQuery, clamp_position};
use crate::frame::ReferenceFrame;
use crate::profile::{PrivacyProfile, ProfileSet};
use crate::reference::{OriginalPoseRecord, PoseReferenceCache};

/// Minimum forward projection distance for the gaze point (meters); guards a
/// degenerate zero-length projection.
const MIN_GAZE_DISTANCE: f32 = 0.01;

// ────────────────────────────────────────────────────────────────────────────
// Collaborator contracts
// ────────────────────────────────────────────────────────────────────────────

/// Per-frame raw pose provider.  `None` means the device is invalid or
/// untracked this frame; the pipeline keeps the prior cached pose and never
/// substitutes zero/identity.
pub trait TrackingSource {
    fn sample(&mut self, joint: TrackedJoint) -> Option<Pose>;
}

/// Downstream consumer of privatized pose events (analytics, on-screen
/// display, recording).  Delivery is synchronous; a failing consumer is
/// logged and skipped, never allowed to block other consumers or the frame.
pub trait PoseConsumer {
    fn name(&self) -> &str;
    fn on_pose(&mut self, event: &PrivatizedPoseEvent) -> Result<(), VeilError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Static pipeline tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Maximum allowed displacement of a privatized position from the cached
    /// original (meters).  Zero or below means no movement is allowed.
    pub max_displacement: f32,
    /// Meters forward from the head to project the gaze point before adding
    /// noise.
    pub gaze_project_distance: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_displacement: 0.1,
            gaze_project_distance: 1.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PrivacyPipeline
// ────────────────────────────────────────────────────────────────────────────

/// Per-frame privatization driver.  Owns the reference cache, the active
/// reference frame, the profile set and the consumer registry.
pub struct PrivacyPipeline {
    config: PipelineConfig,
    frame: u64,
    reference_frame: ReferenceFrame,
    cache: PoseReferenceCache,
    profiles: ProfileSet,
    /// Staged profile set, swapped in at the start of the next tick so a
    /// mid-session change is never observed mid-frame.
    pending_profiles: Option<ProfileSet>,
    consumers: Vec<Box<dyn PoseConsumer>>,
    enabled: bool,
}

impl PrivacyPipeline {
    /// Construct a pipeline with the world frame as reference origin.
    pub fn new(config: PipelineConfig, profiles: ProfileSet) -> Self {
        Self {
            config,
            frame: 0,
            reference_frame: ReferenceFrame::world(),
            cache: PoseReferenceCache::new(),
            profiles,
            pending_profiles: None,
            consumers: Vec::new(),
            enabled: true,
        }
    }

    /// Register a consumer.  Consumers receive every event of every
    /// subsequent frame in registration order.
    pub fn add_consumer(&mut self, consumer: Box<dyn PoseConsumer>) {
        debug!(consumer = consumer.name(), "consumer registered");
        self.consumers.push(consumer);
    }

    /// Replace the rig reference frame.  Must only be called between frames.
    pub fn set_reference_frame(&mut self, frame: ReferenceFrame) {
        self.reference_frame = frame;
    }

    pub fn reference_frame(&self) -> &ReferenceFrame {
        &self.reference_frame
    }

    /// Stage a new profile set; it becomes active at the start of the next
    /// tick.
    pub fn set_profiles(&mut self, profiles: ProfileSet) {
        self.pending_profiles = Some(profiles);
    }

    /// Recalibration trigger: reset `joint` to the no-record state so the
    /// next valid sample becomes its new reference.
    pub fn recalibrate(&mut self, joint: TrackedJoint) {
        info!(?joint, "recalibration requested");
        self.cache.clear(joint);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Frames processed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Cached reference record for a joint (testing / diagnostics).
    pub fn reference(&self, joint: TrackedJoint) -> Option<&OriginalPoseRecord> {
        self.cache.record(joint)
    }

    /// Enable or disable privatization.
    ///
    /// Disabling immediately emits restore events (`privatized == raw ==
    /// cached original`) for every tracked joint so no consumer is stranded
    /// on a stale noisy pose.  While disabled, ticks keep refreshing the
    /// cache and emit passthrough events.
    pub fn set_enabled(&mut self, enabled: bool) -> Vec<PrivatizedPoseEvent> {
        if self.enabled == enabled {
            return Vec::new();
        }
        self.enabled = enabled;
        if enabled {
            info!("privatization enabled");
            return Vec::new();
        }

        let mut events = Vec::new();
        for joint in TrackedJoint::POSITIONAL {
            if let Some(original) = self.cache.pose(joint) {
                events.push(PrivatizedPoseEvent::new(self.frame, joint, original, original));
            }
        }
        info!(restored = events.len(), "privatization disabled; original poses restored");
        self.deliver(&events);
        events
    }

    /// Run one privatization pass.  Returns the emitted events (also
    /// delivered to all registered consumers).
    pub fn tick(
        &mut self,
        tracking: &mut dyn TrackingSource,
        ground: Option<&dyn GroundQuery>,
    ) -> Vec<PrivatizedPoseEvent> {
        self.frame += 1;
        if let Some(next) = self.pending_profiles.take() {
            debug!(frame = self.frame, "profile swap applied at frame start");
            self.profiles = next;
        }

        let mut events = Vec::with_capacity(4);

        for joint in TrackedJoint::POSITIONAL {
            if let Some(raw) = tracking.sample(joint) {
                self.cache.update(joint, raw, self.frame);
            }
            // No reference yet: normal startup/transient condition, skip the
            // joint without emitting.
            let Some(original) = self.cache.pose(joint) else {
                continue;
            };
            let privatized = if self.enabled {
                self.privatize_joint(joint, &original, ground)
            } else {
                original
            };
            events.push(PrivatizedPoseEvent::new(self.frame, joint, original, privatized));
        }

        if let Some(event) = self.privatize_gaze(tracking) {
            events.push(event);
        }

        self.deliver(&events);
        events
    }

    // ────────────────────────────────────────────────────────────────────────
    // Internals
    // ────────────────────────────────────────────────────────────────────────

    /// Transform chain for one positional joint: localize, perturb,
    /// reproject, bound.  Orientation passes through unchanged; MotionVeil
    /// privatizes positions (and gaze directions) only.
    fn privatize_joint(
        &mut self,
        joint: TrackedJoint,
        original: &Pose,
        ground: Option<&dyn GroundQuery>,
    ) -> Pose {
        let profile = match joint.category() {
            JointCategory::Eye => &mut self.profiles.eye,
            // Hand joints and any future body joints share the hand profile.
            JointCategory::Hand | JointCategory::Body => &mut self.profiles.hand,
        };

        let local = self.reference_frame.to_local(original);
        let displacement =
            profile
                .mechanism
                .displacement_for(joint.category(), profile.strength, local.position);
        let noisy_local = Pose::new(local.position.add(displacement), local.orientation);
        let noisy_world = self.reference_frame.to_world(&noisy_local);

        let clamped = clamp_position(
            noisy_world.position,
            original.position,
            self.config.max_displacement,
            ground,
        );
        Pose::new(clamped, original.orientation)
    }

    /// Derived gaze privatization.
    ///
    /// Requires a cached head pose (the gaze has no independent position).
    /// The raw direction comes from this frame's eye sample when present,
    /// falling back to the cached head orientation.  A point is projected
    /// forward along that direction, privatized with the eye profile, and
    /// the head-to-point direction is recomputed; if noise exactly cancels
    /// the projection the pre-noise direction is kept.
    fn privatize_gaze(&mut self, tracking: &mut dyn TrackingSource) -> Option<PrivatizedPoseEvent> {
        let head = self.cache.pose(TrackedJoint::Head)?;

        let raw_rotation = tracking
            .sample(TrackedJoint::EyeGaze)
            .filter(|p| p.is_valid())
            .map(|p| p.normalized().orientation)
            .unwrap_or(head.orientation);

        let direction = raw_rotation
            .rotate(Vec3::FORWARD)
            .normalized()
            .unwrap_or_else(|| head.orientation.rotate(Vec3::FORWARD));

        let raw_pose = Pose::new(head.position, raw_rotation);
        if !self.enabled {
            return Some(PrivatizedPoseEvent::new(
                self.frame,
                TrackedJoint::EyeGaze,
                raw_pose,
                raw_pose,
            ));
        }

        let distance = self.config.gaze_project_distance.max(MIN_GAZE_DISTANCE);
        let gaze_point = head.position.add(direction.scale(distance));

        let profile: &mut PrivacyProfile = &mut self.profiles.eye;
        let local_point = self.reference_frame.to_local_point(gaze_point);
        let displacement = profile
            .mechanism
            .generate_eye_noise(profile.strength, local_point);
        let privatized_point = self
            .reference_frame
            .to_world_point(local_point.add(displacement));

        // Near-zero head-to-point vector means the noise cancelled the
        // projection; keep the pre-noise direction.
        let mut privatized_dir = privatized_point
            .sub(head.position)
            .normalized()
            .unwrap_or(direction);
        privatized_dir = profile
            .mechanism
            .jitter_gaze(profile.strength, privatized_dir)
            .normalized()
            .unwrap_or(direction);

        let privatized_rotation =
            Quaternion::look_rotation(privatized_dir, Vec3::UP).unwrap_or(raw_rotation);

        Some(PrivatizedPoseEvent::new(
            self.frame,
            TrackedJoint::EyeGaze,
            raw_pose,
            Pose::new(head.position, privatized_rotation),
        ))
    }

    /// Synchronous fan-out.  A consumer error is logged and never prevents
    /// delivery to the remaining consumers.
    fn deliver(&mut self, events: &[PrivatizedPoseEvent]) {
        for event in events {
            for consumer in &mut self.consumers {
                if let Err(e) = consumer.on_pose(event) {
                    warn!(consumer = consumer.name(), error = %e, "consumer failed; continuing");
                }
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
