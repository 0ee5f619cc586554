//! Gaze-jitter mechanism: bounded random rotation of a gaze direction.
//!
//! The direction is displaced by a random sample from the unit ball scaled by
//! the jitter magnitude and then renormalized, so the angular deviation is
//! bounded by `asin(magnitude)` for magnitudes below one.  A magnitude of
//! zero or below is a no-op.  Position capabilities return zero displacement;
//! this mechanism perturbs directions only.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use veil_types::Vec3;

use crate::NoiseGenerator;

/// Random rotational jitter for eye-gaze directions.
pub struct GazeJitter {
    rng: StdRng,
    /// Radians of jitter per unit of privacy strength.
    scale_rad: f32,
}

impl GazeJitter {
    /// Create a mechanism seeded from the operating system entropy source.
    pub fn new(scale_rad: f32) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            scale_rad,
        }
    }

    /// Create a deterministically seeded mechanism for reproducible tests.
    pub fn seeded(seed: u64, scale_rad: f32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            scale_rad,
        }
    }

    /// Rejection-sample a point inside the unit ball.
    fn unit_ball_sample(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            if v.norm_sq() <= 1.0 {
                return v;
            }
        }
    }
}

impl NoiseGenerator for GazeJitter {
    fn name(&self) -> &'static str {
        "gaze-jitter"
    }

    fn generate_eye_noise(&mut self, _strength: f32, _local: Vec3) -> Vec3 {
        Vec3::zero()
    }

    fn generate_hand_noise(&mut self, _strength: f32, _local: Vec3) -> Vec3 {
        Vec3::zero()
    }

    fn generate_body_noise(&mut self, _strength: f32, _local: Vec3) -> Vec3 {
        Vec3::zero()
    }

    fn jitter_gaze(&mut self, strength: f32, direction: Vec3) -> Vec3 {
        let magnitude = strength.max(0.0) * self.scale_rad;
        if magnitude <= 0.0 {
            return direction;
        }
        let offset = self.unit_ball_sample().scale(magnitude);
        match direction.add(offset).normalized() {
            Some(jittered) => jittered,
            // Offset exactly cancelled the direction: keep the input.
            None => direction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_magnitude_is_noop() {
        let mut mech = GazeJitter::seeded(11, 0.0);
        assert_eq!(mech.jitter_gaze(100.0, Vec3::FORWARD), Vec3::FORWARD);
    }

    #[test]
    fn negative_strength_is_noop() {
        let mut mech = GazeJitter::seeded(11, 0.1);
        assert_eq!(mech.jitter_gaze(-1.0, Vec3::FORWARD), Vec3::FORWARD);
    }

    #[test]
    fn output_stays_unit_length() {
        let mut mech = GazeJitter::seeded(17, 0.05);
        for _ in 0..1_000 {
            let d = mech.jitter_gaze(1.0, Vec3::FORWARD);
            assert!((d.norm() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn angular_deviation_is_bounded() {
        // magnitude = 0.1 → max deviation asin(0.1) ≈ 0.1002 rad.
        let mut mech = GazeJitter::seeded(23, 0.1);
        for _ in 0..1_000 {
            let d = mech.jitter_gaze(1.0, Vec3::FORWARD);
            let angle = d.dot(Vec3::FORWARD).clamp(-1.0, 1.0).acos();
            assert!(angle <= 0.11, "deviation {angle} exceeds bound");
        }
    }

    #[test]
    fn position_capabilities_are_zero() {
        let mut mech = GazeJitter::seeded(29, 0.1);
        let local = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(mech.generate_eye_noise(1.0, local), Vec3::zero());
        assert_eq!(mech.generate_hand_noise(1.0, local), Vec3::zero());
        assert_eq!(mech.generate_body_noise(1.0, local), Vec3::zero());
    }

    #[test]
    fn seeded_jitter_is_reproducible() {
        let mut a = GazeJitter::seeded(31, 0.2);
        let mut b = GazeJitter::seeded(31, 0.2);
        for _ in 0..16 {
            assert_eq!(
                a.jitter_gaze(1.0, Vec3::FORWARD),
                b.jitter_gaze(1.0, Vec3::FORWARD)
            );
        }
    }
}
