//! Randomized rotation, scale and surface jitter for painted objects.
use glam::{Vec2, Vec3};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::options::ToolOptions;
use crate::sampling::{rand01, round3};

/// Closed interval `[min, max]` sampled uniformly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Zero-width range pinned at `value`.
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Draw one value, rounded to three decimals.
    pub fn sample(&self, rng: &mut dyn Rng) -> f32 {
        if self.is_degenerate() {
            return round3(self.min);
        }
        round3(self.min + rand01(rng) * (self.max - self.min))
    }
}

/// Surface-parametric jitter axis.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterAxis {
    U,
    V,
}

/// Randomized variation applied on top of the surface anchor of one object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformDeltas {
    /// Euler XYZ rotation in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Offset along the surface tangent (x = U, y = V) in world units.
    pub jitter: Vec2,
}

impl TransformDeltas {
    pub const IDENTITY: Self = Self {
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
        jitter: Vec2::ZERO,
    };
}

impl Default for TransformDeltas {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Ranges for every randomized transform component.
///
/// Rotation and jitter default to zero-width ranges at 0, scale to `[1, 1]`,
/// so a default sampler produces [`TransformDeltas::IDENTITY`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSampler {
    /// Rotation ranges per axis, in degrees.
    pub rotate: [ValueRange; 3],
    pub scale: [ValueRange; 3],
    pub u_jitter: ValueRange,
    pub v_jitter: ValueRange,
}

impl Default for TransformSampler {
    fn default() -> Self {
        Self {
            rotate: [ValueRange::fixed(0.0); 3],
            scale: [ValueRange::fixed(1.0); 3],
            u_jitter: ValueRange::fixed(0.0),
            v_jitter: ValueRange::fixed(0.0),
        }
    }
}

impl TransformSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotate(mut self, x: ValueRange, y: ValueRange, z: ValueRange) -> Self {
        self.rotate = [x, y, z];
        self
    }

    pub fn with_scale(mut self, x: ValueRange, y: ValueRange, z: ValueRange) -> Self {
        self.scale = [x, y, z];
        self
    }

    pub fn with_jitter(mut self, u: ValueRange, v: ValueRange) -> Self {
        self.u_jitter = u;
        self.v_jitter = v;
        self
    }

    /// Restore the identity ranges.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn sample_rotation(&self, rng: &mut dyn Rng) -> Vec3 {
        let [x, y, z] = &self.rotate;
        Vec3::new(x.sample(rng), y.sample(rng), z.sample(rng))
    }

    /// With `uniform` a single draw from the X range is used on all three axes.
    pub fn sample_scale(&self, uniform: bool, rng: &mut dyn Rng) -> Vec3 {
        let [x, y, z] = &self.scale;
        if uniform {
            Vec3::splat(x.sample(rng))
        } else {
            Vec3::new(x.sample(rng), y.sample(rng), z.sample(rng))
        }
    }

    pub fn sample_jitter(&self, axis: JitterAxis, rng: &mut dyn Rng) -> f32 {
        match axis {
            JitterAxis::U => self.u_jitter.sample(rng),
            JitterAxis::V => self.v_jitter.sample(rng),
        }
    }

    /// Draw a full set of deltas, leaving components disabled in `options` at identity.
    pub fn sample_deltas(&self, options: &ToolOptions, rng: &mut dyn Rng) -> TransformDeltas {
        let mut deltas = TransformDeltas::IDENTITY;
        if options.transform_rotate {
            deltas.rotation = self.sample_rotation(rng);
        }
        if options.transform_scale {
            deltas.scale = self.sample_scale(options.transform_scale_uniform, rng);
        }
        if options.jitter {
            deltas.jitter = Vec2::new(
                self.sample_jitter(JitterAxis::U, rng),
                self.sample_jitter(JitterAxis::V, rng),
            );
        }
        deltas
    }
}
