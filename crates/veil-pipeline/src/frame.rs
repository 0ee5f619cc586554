//! Reference-frame conversion.
//!
//! All privacy mechanisms operate in a stable rig-local frame so that the
//! injected noise is invariant to wherever the rig's world origin happens to
//! sit.  [`ReferenceFrame`] converts world-space poses into that local frame
//! and back:
//!
//! ```text
//! to_local:  p_local = q*ᵒ · (p_world − pᵒ)      r_local = q*ᵒ · r_world
//! to_world:  p_world = qᵒ · p_local + pᵒ         r_world = qᵒ · r_local
//! ```
//! where `(pᵒ, qᵒ)` is the origin pose and `q*` the quaternion conjugate.
//!
//! # Example
//!
//! ```rust
//! use veil_pipeline::frame::ReferenceFrame;
//! use veil_types::{Pose, Quaternion, Vec3};
//!
//! let frame = ReferenceFrame::new(Pose::new(Vec3::new(1.0, 0.0, 0.0), Quaternion::identity()));
//! let p = Pose::new(Vec3::new(1.5, 1.6, 0.0), Quaternion::identity());
//! let local = frame.to_local(&p);
//! assert!((local.position.x - 0.5).abs() < 1e-5);
//! ```

use veil_types::{Pose, Quaternion, Vec3};

/// The coordinate origin relative to which local-space computations are
/// performed.
///
/// The origin must only be replaced between frames, never while a frame's
/// transform chain is in flight; the pipeline enforces this by owning its
/// frame exclusively and exposing no mid-tick mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    origin: Pose,
}

impl ReferenceFrame {
    /// Create a frame anchored at `origin`.  The origin orientation is
    /// renormalized so round trips stay exact.
    pub fn new(origin: Pose) -> Self {
        Self {
            origin: origin.normalized(),
        }
    }

    /// Frame anchored at the world origin (local == world).
    pub fn world() -> Self {
        Self {
            origin: Pose::identity(),
        }
    }

    pub fn origin(&self) -> &Pose {
        &self.origin
    }

    /// World pose → rig-local pose.
    pub fn to_local(&self, world: &Pose) -> Pose {
        let inv = self.origin.orientation.conjugate();
        Pose::new(
            inv.rotate(world.position.sub(self.origin.position)),
            inv.mul(world.orientation),
        )
    }

    /// Rig-local pose → world pose.  Exact algebraic inverse of
    /// [`ReferenceFrame::to_local`].
    pub fn to_world(&self, local: &Pose) -> Pose {
        Pose::new(
            self.origin
                .orientation
                .rotate(local.position)
                .add(self.origin.position),
            self.origin.orientation.mul(local.orientation),
        )
    }

    /// Position-only variant of [`ReferenceFrame::to_local`], used for the
    /// projected gaze point.
    pub fn to_local_point(&self, world: Vec3) -> Vec3 {
        self.origin
            .orientation
            .conjugate()
            .rotate(world.sub(self.origin.position))
    }

    /// Position-only variant of [`ReferenceFrame::to_world`].
    pub fn to_world_point(&self, local: Vec3) -> Vec3 {
        self.origin
            .orientation
            .rotate(local)
            .add(self.origin.position)
    }
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self::world()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    fn assert_pose_close(a: &Pose, b: &Pose) {
        assert!(
            a.position.sub(b.position).norm() < 1e-4,
            "positions differ: {:?} vs {:?}",
            a.position,
            b.position
        );
        assert!(
            a.orientation.angle_to(b.orientation) < 1e-4,
            "orientations differ: {:?} vs {:?}",
            a.orientation,
            b.orientation
        );
    }

    #[test]
    fn world_frame_is_identity_conversion() {
        let frame = ReferenceFrame::world();
        let p = Pose::new(
            Vec3::new(0.3, 1.2, -0.7),
            Quaternion::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2, 0.0),
        );
        assert_pose_close(&frame.to_local(&p), &p);
        assert_pose_close(&frame.to_world(&p), &p);
    }

    #[test]
    fn translated_origin_offsets_position() {
        let frame = ReferenceFrame::new(Pose::new(
            Vec3::new(2.0, 0.0, 1.0),
            Quaternion::identity(),
        ));
        let world = Pose::new(Vec3::new(2.5, 1.6, 1.0), Quaternion::identity());
        let local = frame.to_local(&world);
        assert!((local.position.x - 0.5).abs() < 1e-5);
        assert!((local.position.y - 1.6).abs() < 1e-5);
        assert!(local.position.z.abs() < 1e-5);
    }

    #[test]
    fn rotated_origin_rotates_into_local() {
        // Origin yawed 90° around Y: world +X becomes local -Z... verify via
        // round trip rather than hand-derived axes.
        let q90y = Quaternion::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2, 0.0);
        let frame = ReferenceFrame::new(Pose::new(Vec3::new(1.0, 2.0, 3.0), q90y));
        let world = Pose::new(Vec3::new(-0.4, 1.5, 2.2), q90y);
        let local = frame.to_local(&world);
        // Orientation relative to an identically rotated origin is identity.
        assert!(local.orientation.angle_to(Quaternion::identity()) < 1e-4);
    }

    #[test]
    fn round_trip_recovers_pose() {
        let q = Quaternion::new(0.9, 0.1, -0.3, 0.28).normalized().unwrap();
        let frame = ReferenceFrame::new(Pose::new(Vec3::new(-3.0, 0.5, 8.0), q));
        let p = Pose::new(
            Vec3::new(0.31, 1.62, -0.05),
            Quaternion::new(0.7, -0.5, 0.2, 0.4).normalized().unwrap(),
        );
        let back = frame.to_world(&frame.to_local(&p));
        assert_pose_close(&back, &p);
    }

    #[test]
    fn round_trip_point_helpers() {
        let q = Quaternion::new(0.8, 0.2, 0.4, -0.4).normalized().unwrap();
        let frame = ReferenceFrame::new(Pose::new(Vec3::new(10.0, -2.0, 0.5), q));
        let p = Vec3::new(1.0, 2.0, 3.0);
        let back = frame.to_world_point(frame.to_local_point(p));
        assert!(back.sub(p).norm() < 1e-4);
    }

    #[test]
    fn unnormalized_origin_is_renormalized() {
        let frame = ReferenceFrame::new(Pose::new(
            Vec3::zero(),
            Quaternion::new(2.0, 0.0, 0.0, 0.0),
        ));
        assert!((frame.origin().orientation.norm_sq() - 1.0).abs() < 1e-5);
    }
}
