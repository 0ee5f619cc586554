//! Explicit disabled-privacy mechanism.
//!
//! Returns zero displacement for every category.  Selecting "no privacy" is
//! an auditable configuration choice, distinct from a missing mechanism.

use veil_types::Vec3;

use crate::NoiseGenerator;

/// The identity mechanism: privatized output equals the input exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoOpMechanism;

impl NoOpMechanism {
    pub const fn new() -> Self {
        Self
    }
}

impl NoiseGenerator for NoOpMechanism {
    fn name(&self) -> &'static str {
        "noop"
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_categories_return_zero() {
        let mut mech = NoOpMechanism::new();
        let local = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(mech.generate_eye_noise(100.0, local), Vec3::zero());
        assert_eq!(mech.generate_hand_noise(100.0, local), Vec3::zero());
        assert_eq!(mech.generate_body_noise(100.0, local), Vec3::zero());
    }

    #[test]
    fn gaze_jitter_defaults_to_passthrough() {
        let mut mech = NoOpMechanism::new();
        let dir = Vec3::FORWARD;
        assert_eq!(mech.jitter_gaze(100.0, dir), dir);
    }
}
