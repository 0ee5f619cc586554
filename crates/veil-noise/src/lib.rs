//! `veil-noise` – pluggable privacy mechanisms.
//!
//! Every mechanism implements the single [`NoiseGenerator`] capability trait
//! and owns an independent random generator instance, so no mechanism shares
//! state with another and each one is reproducible under a seeded constructor.
//!
//! # Variants
//!
//! - [`gaussian`] – [`GaussianNoise`][gaussian::GaussianNoise]: Box–Muller
//!   Gaussian displacement with per-category scales.
//! - [`quantize`] – [`QuantizeNoise`][quantize::QuantizeNoise]: snaps each
//!   axis to a fixed grid.
//! - [`noop`] – [`NoOpMechanism`][noop::NoOpMechanism]: explicit
//!   disabled-privacy state (distinct from "mechanism absent").
//! - [`jitter`] – [`GazeJitter`][jitter::GazeJitter]: bounded random
//!   rotation of a gaze direction.

pub mod gaussian;
pub mod jitter;
pub mod noop;
pub mod quantize;

pub use gaussian::{GaussianNoise, NoiseScales};
pub use jitter::GazeJitter;
pub use noop::NoOpMechanism;
pub use quantize::QuantizeNoise;

use veil_types::{JointCategory, Vec3};

/// Capability set of a privacy mechanism.
///
/// The position methods return a **local-space displacement** to add to the
/// input position.  `local` is the position being perturbed; mechanisms whose
/// output is input-independent (Gaussian, no-op) ignore it, while
/// input-dependent ones (quantization) need it to compute the snap delta.
///
/// Mechanisms must clamp a negative `strength` to zero before use.
pub trait NoiseGenerator: Send {
    /// Stable mechanism identifier for logs and configuration surfaces.
    fn name(&self) -> &'static str;

    /// Displacement for eye/head-category joints (smallest scale).
    fn generate_eye_noise(&mut self, strength: f32, local: Vec3) -> Vec3;

    /// Displacement for hand-category joints (medium scale).
    fn generate_hand_noise(&mut self, strength: f32, local: Vec3) -> Vec3;

    /// Displacement for body-category joints (largest scale).
    fn generate_body_noise(&mut self, strength: f32, local: Vec3) -> Vec3;

    /// Rotational jitter applied to a unit gaze direction.  The default is a
    /// passthrough; only direction-perturbing mechanisms override it.
    fn jitter_gaze(&mut self, strength: f32, direction: Vec3) -> Vec3 {
        let _ = strength;
        direction
    }

    /// Dispatch to the per-category displacement method.
    fn displacement_for(&mut self, category: JointCategory, strength: f32, local: Vec3) -> Vec3 {
        match category {
            JointCategory::Eye => self.generate_eye_noise(strength, local),
            JointCategory::Hand => self.generate_hand_noise(strength, local),
            JointCategory::Body => self.generate_body_noise(strength, local),
        }
    }
}
