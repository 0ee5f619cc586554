//! Displacement clamping and ground correction.
//!
//! Bounds the noisy position to a maximum displacement from the original and
//! optionally snaps it above the ground surface.  Order matters: displacement
//! clamp first, then ground snap.  The snap can itself move the point and
//! that movement must not be re-clamped.

use veil_types::Vec3;

/// Vertical clearance kept above the sampled ground height (meters).
pub const GROUND_BUFFER: f32 = 0.1;

/// Ground-height sampler at a horizontal position.  `None` disables ground
/// correction for that sample.
pub trait GroundQuery {
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;
}

/// Clamp `noisy` to at most `max_displacement` from `original`, then raise it
/// above the ground sample if one is available.
///
/// `max_displacement <= 0.0` means no movement is allowed: the output
/// collapses to `original` (before ground correction).
///
/// The guarantee is deliberately narrow: the result does not sit below the
/// immediate ground sample and is not farther than `max_displacement` from
/// the truth, nothing more.
pub fn clamp_position(
    noisy: Vec3,
    original: Vec3,
    max_displacement: f32,
    ground: Option<&dyn GroundQuery>,
) -> Vec3 {
    let displacement = noisy.sub(original);

    let bounded = if max_displacement <= 0.0 {
        Vec3::zero()
    } else if displacement.norm() > max_displacement {
        // normalize-then-scale: rescale to exactly max_displacement in the
        // same direction.
        match displacement.normalized() {
            Some(dir) => dir.scale(max_displacement),
            None => Vec3::zero(),
        }
    } else {
        displacement
    };

    let mut clamped = original.add(bounded);

    if let Some(ground) = ground
        && let Some(height) = ground.height_at(clamped.x, clamped.z)
        && clamped.y < height + GROUND_BUFFER
    {
        clamped.y = height + GROUND_BUFFER;
    }

    clamped
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
