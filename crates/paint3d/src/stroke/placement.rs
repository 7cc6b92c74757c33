//! Placement math: anchoring on the surface, orientation and ramp falloff.
//!
//! A committed object keeps its surface anchor, its alignment frame and its
//! unramped deltas so the engine can re-resolve its transform later, when the
//! stroke is re-ramped or the object is spun in place mode.
use glam::{EulerRot, Quat, Vec2, Vec3};

use crate::options::RampFx;
use crate::sampling::{round3, TransformDeltas};
use crate::scene::{NodeRef, SurfaceHit, WorldTransform};

/// One object committed by a stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Node created in the scene.
    pub node: NodeRef,
    /// Registry key of the source it was created from.
    pub source: String,
    pub hit: SurfaceHit,
    /// World position after normal offset and jitter.
    pub anchor: Vec3,
    /// Alignment to the surface, before spin and deltas.
    pub frame: Quat,
    /// Spin about the surface normal in degrees.
    pub spin: f32,
    /// Deltas as sampled, before any ramp.
    pub deltas: TransformDeltas,
    /// Transform last pushed to the scene.
    pub transform: WorldTransform,
    /// Group the node was parented under, if any.
    pub group: Option<NodeRef>,
}

impl Placement {
    /// Transform for this placement with `deltas` in place of the sampled ones.
    pub fn resolve(&self, deltas: &TransformDeltas) -> WorldTransform {
        world_transform(self.anchor, self.spun_frame(), deltas)
    }

    fn spun_frame(&self) -> Quat {
        Quat::from_axis_angle(self.hit.normal, self.spin.to_radians()) * self.frame
    }
}

/// Rotation taking `axis` onto the surface normal, or identity when not aligning.
pub fn surface_frame(normal: Vec3, axis: Vec3, align: bool) -> Quat {
    if align {
        Quat::from_rotation_arc(axis.normalize_or(Vec3::Y), normal.normalize_or(Vec3::Y))
    } else {
        Quat::IDENTITY
    }
}

/// Hit position pushed along the normal and jittered in the tangent plane.
pub fn anchor_point(hit: &SurfaceHit, up_offset: f32, jitter: Vec2) -> Vec3 {
    let (u, v) = hit.normal.any_orthonormal_pair();
    hit.position + hit.normal * up_offset + u * jitter.x + v * jitter.y
}

/// Compose anchor, frame and local deltas into a world transform.
pub fn world_transform(anchor: Vec3, frame: Quat, deltas: &TransformDeltas) -> WorldTransform {
    let r = deltas.rotation;
    let local = Quat::from_euler(
        EulerRot::XYZ,
        r.x.to_radians(),
        r.y.to_radians(),
        r.z.to_radians(),
    );
    let (x, y, z) = (frame * local).normalize().to_euler(EulerRot::XYZ);
    WorldTransform {
        translation: anchor,
        rotation: Vec3::new(
            round3(x.to_degrees()),
            round3(y.to_degrees()),
            round3(z.to_degrees()),
        ),
        scale: deltas.scale,
    }
}

/// Ramp value of commit `index` among `count` commits of a stroke.
pub fn ramp_factor(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return 1.0;
    }
    index as f32 / (count - 1) as f32
}

/// Attenuate rotation and/or scale deltas by ramp value `t`.
pub fn ramp_deltas(deltas: &TransformDeltas, ramp: RampFx, t: f32) -> TransformDeltas {
    let mut ramped = *deltas;
    if ramp.affects_rotation() {
        ramped.rotation = deltas.rotation * t;
    }
    if ramp.affects_scale() {
        ramped.scale = Vec3::ONE + (deltas.scale - Vec3::ONE) * t;
    }
    ramped
}

/// Spin angle for a horizontal drag of `dx` pixels, snapped to `step` degrees.
pub fn snap_spin(dx: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return dx;
    }
    (dx / step).round() * step
}
