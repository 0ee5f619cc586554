//! Privacy profiles: configuration mapping user selection to mechanisms.
//!
//! Profiles are configuration data owned by the orchestrator, swapped
//! atomically between frames and never mutated mid-frame.  The user-facing
//! surface selects `{application context, strength percent}`; the effective
//! strength is the percent scaled by a fixed per-context multiplier.

use serde::{Deserialize, Serialize};
use tracing::warn;
use veil_noise::{GaussianNoise, GazeJitter, NoOpMechanism, NoiseGenerator, NoiseScales, QuantizeNoise};
use veil_types::ApplicationContext;

/// Selectable mechanism variants, as configuration data (never runtime type
/// inspection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MechanismKind {
    Gaussian,
    Quantize,
    Noop,
    GazeJitter,
}

/// Tunable parameters shared by the mechanism constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MechanismSettings {
    /// Grid step for the quantization mechanism (meters).
    pub quantize_step: f32,
    /// Radians of gaze jitter per unit of effective strength.
    pub jitter_scale_rad: f32,
    /// Per-category Gaussian sigma scales.  Kept last so the nested TOML
    /// table serializes after the scalar fields.
    pub gaussian_scales: NoiseScales,
}

impl Default for MechanismSettings {
    fn default() -> Self {
        Self {
            quantize_step: 0.05,
            jitter_scale_rad: 0.001,
            gaussian_scales: NoiseScales::default(),
        }
    }
}

/// The user's selection on the profile surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSelection {
    pub context: ApplicationContext,
    /// Slider value, 0–100.
    pub strength_percent: f32,
}

impl ProfileSelection {
    /// Strength handed to mechanisms: the (non-negative) percent scaled by
    /// the context multiplier.
    pub fn effective_strength(&self) -> f32 {
        self.strength_percent.max(0.0) * self.context.strength_multiplier()
    }
}

/// An active privacy profile for one joint category.
pub struct PrivacyProfile {
    pub strength: f32,
    pub mechanism: Box<dyn NoiseGenerator>,
}

impl PrivacyProfile {
    pub fn new(strength: f32, mechanism: Box<dyn NoiseGenerator>) -> Self {
        Self {
            strength,
            mechanism,
        }
    }

    /// The explicit disabled-privacy profile.
    pub fn passthrough() -> Self {
        Self::new(0.0, Box::new(NoOpMechanism::new()))
    }
}

impl std::fmt::Debug for PrivacyProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivacyProfile")
            .field("strength", &self.strength)
            .field("mechanism", &self.mechanism.name())
            .finish()
    }
}

/// One profile per joint category (head/eye and hands).
#[derive(Debug)]
pub struct ProfileSet {
    pub eye: PrivacyProfile,
    pub hand: PrivacyProfile,
}

impl ProfileSet {
    /// Passthrough profiles for both categories.
    pub fn passthrough() -> Self {
        Self {
            eye: PrivacyProfile::passthrough(),
            hand: PrivacyProfile::passthrough(),
        }
    }

    /// Build the active profile set from a selection and per-category
    /// mechanism choices.  A missing mechanism degrades to passthrough with a
    /// configuration warning, never a failure.
    pub fn build(
        selection: ProfileSelection,
        eye_kind: Option<MechanismKind>,
        hand_kind: Option<MechanismKind>,
        settings: &MechanismSettings,
    ) -> Self {
        let strength = selection.effective_strength();
        Self {
            eye: PrivacyProfile::new(
                strength,
                build_mechanism(eye_kind, settings, selection.context, "eye"),
            ),
            hand: PrivacyProfile::new(
                strength,
                build_mechanism(hand_kind, settings, selection.context, "hand"),
            ),
        }
    }
}

/// Instantiate a mechanism from configuration data.
fn build_mechanism(
    kind: Option<MechanismKind>,
    settings: &MechanismSettings,
    context: ApplicationContext,
    category: &str,
) -> Box<dyn NoiseGenerator> {
    match kind {
        Some(MechanismKind::Gaussian) => Box::new(GaussianNoise::new(settings.gaussian_scales)),
        Some(MechanismKind::Quantize) => Box::new(QuantizeNoise::new(settings.quantize_step)),
        Some(MechanismKind::Noop) => Box::new(NoOpMechanism::new()),
        Some(MechanismKind::GazeJitter) => Box::new(GazeJitter::new(settings.jitter_scale_rad)),
        None => {
            warn!(
                %context,
                category, "no privacy mechanism configured; falling back to passthrough"
            );
            Box::new(NoOpMechanism::new())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
