//! Ground-height providers.

use veil_pipeline::GroundQuery;

/// An infinite flat floor at a fixed height.  Good enough for headless demos
/// and tests; a real deployment samples the runtime's spatial mesh instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround {
    height: f32,
}

impl FlatGround {
    pub fn new(height: f32) -> Self {
        Self { height }
    }

    /// Floor at `y = 0`.
    pub fn at_origin() -> Self {
        Self::new(0.0)
    }
}

impl GroundQuery for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }
}

/// A provider with no ground information at all; every sample misses and the
/// pipeline skips ground correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGround;

impl GroundQuery for NoGround {
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
