//! Quantization mechanism: snaps each local axis to a fixed grid.
//!
//! Coarsening the reported position to multiples of `step` bounds how much an
//! observer can learn about the true position within a grid cell.  A step of
//! zero or below is an explicit no-op, not an error.

use veil_types::Vec3;

use crate::NoiseGenerator;

/// Rounds each position axis to the nearest multiple of `step` (meters).
///
/// The profile strength is ignored: granularity is governed solely by the
/// configured step size.  Applying the mechanism twice yields the same result
/// as applying it once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeNoise {
    step: f32,
}

impl QuantizeNoise {
    pub const fn new(step: f32) -> Self {
        Self { step }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    /// Displacement that moves `local` onto the grid.
    fn snap_delta(&self, local: Vec3) -> Vec3 {
        if self.step <= 0.0 {
            return Vec3::zero();
        }
        let snap = |v: f32| (v / self.step).round() * self.step - v;
        Vec3::new(snap(local.x), snap(local.y), snap(local.z))
    }
}

impl NoiseGenerator for QuantizeNoise {
    fn name(&self) -> &'static str {
        "quantize"
    }

    fn generate_eye_noise(&mut self, _strength: f32, local: Vec3) -> Vec3 {
        self.snap_delta(local)
    }

    fn generate_hand_noise(&mut self, _strength: f32, local: Vec3) -> Vec3 {
        self.snap_delta(local)
    }

    fn generate_body_noise(&mut self, _strength: f32, local: Vec3) -> Vec3 {
        self.snap_delta(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_to_nearest_multiple() {
        let mut mech = QuantizeNoise::new(0.25);
        let local = Vec3::new(0.33, 0.51, -0.12);
        let out = local.add(mech.generate_hand_noise(1.0, local));
        assert!((out.x - 0.25).abs() < 1e-5);
        assert!((out.y - 0.5).abs() < 1e-5);
        assert!((out.z - 0.0).abs() < 1e-5);
    }

    #[test]
    fn quantization_is_idempotent() {
        let mut mech = QuantizeNoise::new(0.1);
        let local = Vec3::new(1.234, -0.567, 3.999);
        let once = local.add(mech.generate_body_noise(1.0, local));
        let twice = once.add(mech.generate_body_noise(1.0, once));
        assert_eq!(once, twice);
    }

    #[test]
    fn zero_step_is_noop() {
        let mut mech = QuantizeNoise::new(0.0);
        let local = Vec3::new(0.123, 4.56, -7.89);
        assert_eq!(mech.generate_eye_noise(1.0, local), Vec3::zero());
    }

    #[test]
    fn negative_step_is_noop() {
        let mut mech = QuantizeNoise::new(-0.5);
        let local = Vec3::new(0.123, 4.56, -7.89);
        assert_eq!(mech.generate_hand_noise(1.0, local), Vec3::zero());
    }

    #[test]
    fn grid_point_has_zero_delta() {
        let mut mech = QuantizeNoise::new(0.5);
        let local = Vec3::new(1.0, -2.5, 0.0);
        let d = mech.generate_body_noise(1.0, local);
        assert!(d.norm() < 1e-5);
    }
}
