//! Original-pose reference cache.
//!
//! Owns the true (raw, validated) pose per tracked joint, refreshed once per
//! frame from tracking input.  The privatization stage receives only copies
//! and holds no handle capable of writing back, so noisy output can never
//! feed into the reference (the anti-drift invariant).
//!
//! Invalid candidates (NaN/Inf components, identically-zero quaternion) are
//! dropped fail-soft: the previous stored pose is retained and a tracking
//! glitch is logged, never propagated.

use std::collections::HashMap;

use tracing::{debug, warn};
use veil_types::{Pose, TrackedJoint};

/// Stored reference pose for one joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginalPoseRecord {
    /// The latest validated raw pose, orientation normalized.
    pub pose: Pose,
    /// Frame number at which this joint first produced a valid pose
    /// (or was last recalibrated).
    pub valid_since: u64,
}

/// Per-joint cache of validated original poses.
#[derive(Debug, Default)]
pub struct PoseReferenceCache {
    records: HashMap<TrackedJoint, OriginalPoseRecord>,
}

impl PoseReferenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the stored pose for `joint` if `candidate` passes the
    /// validity check.  An invalid candidate is silently dropped (logged as a
    /// recoverable glitch) and the previous pose retained.
    pub fn update(&mut self, joint: TrackedJoint, candidate: Pose, frame: u64) {
        if !candidate.is_valid() {
            warn!(?joint, frame, "rejected invalid tracking sample");
            return;
        }
        let candidate = candidate.normalized();
        self.records
            .entry(joint)
            .and_modify(|r| r.pose = candidate)
            .or_insert_with(|| {
                debug!(?joint, frame, "joint entered tracking");
                OriginalPoseRecord {
                    pose: candidate,
                    valid_since: frame,
                }
            });
    }

    /// The cached pose, or `None` until at least one valid sample has been
    /// recorded for the joint.
    pub fn pose(&self, joint: TrackedJoint) -> Option<Pose> {
        self.records.get(&joint).map(|r| r.pose)
    }

    /// Full record including the validity frame marker.
    pub fn record(&self, joint: TrackedJoint) -> Option<&OriginalPoseRecord> {
        self.records.get(&joint)
    }

    /// Joints currently holding a reference pose.
    pub fn tracked(&self) -> impl Iterator<Item = TrackedJoint> + '_ {
        self.records.keys().copied()
    }

    /// Recalibration: drop the joint back to the no-record state so the next
    /// valid sample becomes the new reference.
    pub fn clear(&mut self, joint: TrackedJoint) {
        if self.records.remove(&joint).is_some() {
            debug!(?joint, "reference cleared for recalibration");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use veil_types::{Quaternion, Vec3};

    fn pose(x: f32, y: f32, z: f32) -> Pose {
        Pose::new(Vec3::new(x, y, z), Quaternion::identity())
    }

    #[test]
    fn empty_cache_returns_none() {
        let cache = PoseReferenceCache::new();
        assert!(cache.pose(TrackedJoint::Head).is_none());
    }

    #[test]
    fn valid_update_is_stored() {
        let mut cache = PoseReferenceCache::new();
        cache.update(TrackedJoint::Head, pose(0.0, 1.6, 0.0), 1);
        let stored = cache.pose(TrackedJoint::Head).unwrap();
        assert!((stored.position.y - 1.6).abs() < 1e-5);
    }

    #[test]
    fn invalid_update_retains_previous() {
        let mut cache = PoseReferenceCache::new();
        cache.update(TrackedJoint::LeftHand, pose(0.3, 1.0, 0.2), 1);
        cache.update(
            TrackedJoint::LeftHand,
            Pose::new(Vec3::new(f32::NAN, 0.0, 0.0), Quaternion::identity()),
            2,
        );
        let stored = cache.pose(TrackedJoint::LeftHand).unwrap();
        assert!((stored.position.x - 0.3).abs() < 1e-5, "glitch must not overwrite");
    }

    #[test]
    fn invalid_first_sample_leaves_no_record() {
        let mut cache = PoseReferenceCache::new();
        cache.update(
            TrackedJoint::RightHand,
            Pose::new(Vec3::zero(), Quaternion::new(0.0, 0.0, 0.0, 0.0)),
            1,
        );
        assert!(cache.pose(TrackedJoint::RightHand).is_none());
    }

    #[test]
    fn valid_since_marks_first_valid_frame() {
        let mut cache = PoseReferenceCache::new();
        cache.update(TrackedJoint::Head, pose(0.0, 1.6, 0.0), 5);
        cache.update(TrackedJoint::Head, pose(0.1, 1.6, 0.0), 6);
        assert_eq!(cache.record(TrackedJoint::Head).unwrap().valid_since, 5);
    }

    #[test]
    fn newer_sample_replaces_pose() {
        let mut cache = PoseReferenceCache::new();
        cache.update(TrackedJoint::Head, pose(0.0, 1.6, 0.0), 1);
        cache.update(TrackedJoint::Head, pose(0.2, 1.7, 0.1), 2);
        let stored = cache.pose(TrackedJoint::Head).unwrap();
        assert!((stored.position.x - 0.2).abs() < 1e-5);
    }

    #[test]
    fn clear_resets_to_no_record() {
        let mut cache = PoseReferenceCache::new();
        cache.update(TrackedJoint::Head, pose(0.0, 1.6, 0.0), 1);
        cache.clear(TrackedJoint::Head);
        assert!(cache.pose(TrackedJoint::Head).is_none());

        // Next valid sample re-establishes the reference with a new marker.
        cache.update(TrackedJoint::Head, pose(0.0, 1.5, 0.0), 9);
        assert_eq!(cache.record(TrackedJoint::Head).unwrap().valid_since, 9);
    }

    #[test]
    fn stored_orientation_is_normalized() {
        let mut cache = PoseReferenceCache::new();
        cache.update(
            TrackedJoint::Head,
            Pose::new(Vec3::zero(), Quaternion::new(2.0, 0.0, 0.0, 0.0)),
            1,
        );
        let stored = cache.pose(TrackedJoint::Head).unwrap();
        assert!((stored.orientation.norm_sq() - 1.0).abs() < 1e-5);
    }
}
