//! 3-D math primitives shared across the MotionVeil workspace.
//!
//! Deliberately minimal: only the vector/quaternion operations the
//! privatization pipeline actually needs.  All values are `f32` to match the
//! precision of consumer XR tracking hardware.
//!
//! # Example
//!
//! ```rust
//! use veil_types::{Quaternion, Vec3};
//!
//! // 90° yaw rotates local +Z (forward) onto world +X.
//! let q = Quaternion::look_rotation(Vec3::new(1.0, 0.0, 0.0), Vec3::UP).unwrap();
//! let f = q.rotate(Vec3::FORWARD);
//! assert!((f.x - 1.0).abs() < 1e-5);
//! ```

use serde::{Deserialize, Serialize};

/// Squared-length threshold below which a vector or quaternion is treated as
/// degenerate (identically zero for practical purposes).
pub const DEGENERATE_EPSILON: f32 = 1e-8;

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector (position, displacement, or direction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    /// World-space up axis.
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };
    /// Local forward axis (the direction an identity-oriented gaze points).
    pub const FORWARD: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 1.0 };

    /// Create a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }

    pub fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }

    pub fn scale(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Squared Euclidean length.
    pub fn norm_sq(self) -> f32 {
        self.dot(self)
    }

    /// Euclidean length.
    pub fn norm(self) -> f32 {
        self.norm_sq().sqrt()
    }

    /// Unit vector in the same direction, or `None` when the vector is
    /// degenerate (near-zero length).
    pub fn normalized(self) -> Option<Self> {
        let n2 = self.norm_sq();
        if n2 < DEGENERATE_EPSILON {
            return None;
        }
        Some(self.scale(1.0 / n2.sqrt()))
    }

    /// `true` when every component is a finite number (no NaN/Inf).
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1); use [`Quaternion::normalized`] when unsure.
    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Hamilton product: compose two rotations (`self` applied after `rhs`).
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        // Express v as a pure quaternion.
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }

    /// Squared norm.
    pub fn norm_sq(self) -> f32 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Renormalized copy, or `None` when the quaternion is identically zero.
    pub fn normalized(self) -> Option<Self> {
        let n2 = self.norm_sq();
        if n2 < DEGENERATE_EPSILON {
            return None;
        }
        let inv = 1.0 / n2.sqrt();
        Some(Self::new(
            self.w * inv,
            self.x * inv,
            self.y * inv,
            self.z * inv,
        ))
    }

    /// `true` when every component is a finite number (no NaN/Inf).
    pub fn is_finite(self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Angular distance to `rhs` in radians.
    pub fn angle_to(self, rhs: Self) -> f32 {
        // |dot| guards against the double-cover ambiguity (q and -q are the
        // same rotation).
        let dot = (self.w * rhs.w + self.x * rhs.x + self.y * rhs.y + self.z * rhs.z)
            .abs()
            .clamp(0.0, 1.0);
        2.0 * dot.acos()
    }

    /// Rotation whose local +Z axis points along `forward` with `up` as the
    /// vertical hint.
    ///
    /// Returns `None` when `forward` is degenerate.  When `forward` is
    /// (anti)parallel to `up` an arbitrary perpendicular axis is substituted
    /// so the result is still well-formed.
    pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Self> {
        let z = forward.normalized()?;
        let x = match up.cross(z).normalized() {
            Some(x) => x,
            // forward is parallel to up: pick whichever world axis is least
            // aligned with forward.
            None => {
                let alt = if z.z.abs() < 0.9 { Vec3::FORWARD } else { Vec3::new(1.0, 0.0, 0.0) };
                alt.cross(z).normalized()?
            }
        };
        let y = z.cross(x);
        Some(Self::from_basis(x, y, z))
    }

    /// Build a quaternion from an orthonormal right-handed basis
    /// (columns of the rotation matrix).
    fn from_basis(x: Vec3, y: Vec3, z: Vec3) -> Self {
        let (m00, m01, m02) = (x.x, y.x, z.x);
        let (m10, m11, m12) = (x.y, y.y, z.y);
        let (m20, m21, m22) = (x.z, y.z, z.z);

        let trace = m00 + m11 + m22;
        if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(0.25 * s, (m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s)
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self::new((m21 - m12) / s, 0.25 * s, (m01 + m10) / s, (m02 + m20) / s)
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self::new((m02 - m20) / s, (m01 + m10) / s, 0.25 * s, (m12 + m21) / s)
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self::new((m10 - m01) / s, (m02 + m20) / s, (m12 + m21) / s, 0.25 * s)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body pose: position + orientation in 3-D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quaternion,
}

impl Pose {
    /// Create a pose from a position and orientation.
    pub const fn new(position: Vec3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at the origin with no rotation.
    pub const fn identity() -> Self {
        Self::new(Vec3::zero(), Quaternion::identity())
    }

    /// A tracking sample is usable only when all components are finite and
    /// the orientation is not identically zero.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.orientation.is_finite()
            && self.orientation.norm_sq() >= DEGENERATE_EPSILON
    }

    /// Copy with the orientation renormalized.  Falls back to the identity
    /// rotation for a degenerate orientation (callers should gate on
    /// [`Pose::is_valid`] first).
    pub fn normalized(self) -> Self {
        Self {
            position: self.position,
            orientation: self.orientation.normalized().unwrap_or(Quaternion::identity()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_1_SQRT_2;

    // ── Vec3 ────────────────────────────────────────────────────────────────

    #[test]
    fn vec3_normalized_unit_length() {
        let v = Vec3::new(3.0, 4.0, 0.0).normalized().unwrap();
        assert!((v.norm() - 1.0).abs() < 1e-5);
        assert!((v.x - 0.6).abs() < 1e-5);
        assert!((v.y - 0.8).abs() < 1e-5);
    }

    #[test]
    fn vec3_normalized_zero_is_none() {
        assert!(Vec3::zero().normalized().is_none());
        assert!(Vec3::new(1e-6, 0.0, 0.0).normalized().is_none());
    }

    #[test]
    fn vec3_nan_is_not_finite() {
        assert!(!Vec3::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Vec3::new(0.0, f32::INFINITY, 0.0).is_finite());
        assert!(Vec3::new(1.0, 2.0, 3.0).is_finite());
    }

    #[test]
    fn vec3_cross_right_handed() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let y = Vec3::new(0.0, 1.0, 0.0);
        let z = x.cross(y);
        assert!((z.z - 1.0).abs() < 1e-5);
    }

    // ── Quaternion ──────────────────────────────────────────────────────────

    #[test]
    fn quaternion_identity_rotate_is_noop() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        let r = Quaternion::identity().rotate(v);
        assert!((r.x - 1.0).abs() < 1e-5);
        assert!((r.y - 2.0).abs() < 1e-5);
        assert!((r.z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_y() {
        // 90° rotation around Z axis: (cos45°, 0, 0, sin45°)
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let r = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-5, "x should be ~0, got {}", r.x);
        assert!((r.y - 1.0).abs() < 1e-5, "y should be ~1, got {}", r.y);
        assert!(r.z.abs() < 1e-5);
    }

    #[test]
    fn quaternion_conjugate_is_inverse() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let prod = q.mul(q.conjugate());
        assert!((prod.w - 1.0).abs() < 1e-5);
        assert!(prod.x.abs() < 1e-5);
        assert!(prod.y.abs() < 1e-5);
        assert!(prod.z.abs() < 1e-5);
    }

    #[test]
    fn quaternion_normalized_zero_is_none() {
        assert!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalized().is_none());
    }

    #[test]
    fn quaternion_angle_to_self_is_zero() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2, 0.0);
        assert!(q.angle_to(q) < 1e-3);
    }

    #[test]
    fn quaternion_angle_to_double_cover() {
        // q and -q represent the same rotation.
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2, 0.0);
        let neg = Quaternion::new(-q.w, -q.x, -q.y, -q.z);
        assert!(q.angle_to(neg) < 1e-3);
    }

    #[test]
    fn look_rotation_forward_is_identity() {
        let q = Quaternion::look_rotation(Vec3::FORWARD, Vec3::UP).unwrap();
        assert!(q.angle_to(Quaternion::identity()) < 1e-3);
    }

    #[test]
    fn look_rotation_points_along_target() {
        let target = Vec3::new(1.0, 0.5, -0.3).normalized().unwrap();
        let q = Quaternion::look_rotation(target, Vec3::UP).unwrap();
        let f = q.rotate(Vec3::FORWARD);
        assert!((f.x - target.x).abs() < 1e-4);
        assert!((f.y - target.y).abs() < 1e-4);
        assert!((f.z - target.z).abs() < 1e-4);
    }

    #[test]
    fn look_rotation_degenerate_forward_is_none() {
        assert!(Quaternion::look_rotation(Vec3::zero(), Vec3::UP).is_none());
    }

    #[test]
    fn look_rotation_forward_parallel_to_up_is_well_formed() {
        let q = Quaternion::look_rotation(Vec3::UP, Vec3::UP).unwrap();
        let f = q.rotate(Vec3::FORWARD);
        assert!((f.y - 1.0).abs() < 1e-4, "forward must map onto up, got {f:?}");
        assert!((q.norm_sq() - 1.0).abs() < 1e-4);
    }

    // ── Pose ────────────────────────────────────────────────────────────────

    #[test]
    fn pose_with_nan_position_is_invalid() {
        let p = Pose::new(Vec3::new(f32::NAN, 0.0, 0.0), Quaternion::identity());
        assert!(!p.is_valid());
    }

    #[test]
    fn pose_with_zero_quaternion_is_invalid() {
        let p = Pose::new(Vec3::zero(), Quaternion::new(0.0, 0.0, 0.0, 0.0));
        assert!(!p.is_valid());
    }

    #[test]
    fn pose_normalized_renormalizes_orientation() {
        let p = Pose::new(Vec3::zero(), Quaternion::new(2.0, 0.0, 0.0, 0.0)).normalized();
        assert!((p.orientation.w - 1.0).abs() < 1e-5);
    }
}
