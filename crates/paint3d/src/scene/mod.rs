//! The host scene as seen by the stroke engine.
//!
//! The engine never talks to a real 3D application directly. Everything it
//! needs (ray casting under the cursor, creating copies or instances, writing
//! transforms, grouping) goes through the [`Scene`] trait. [`memory::MemoryScene`]
//! is a small in-memory implementation used by tests, benches and demos.
use glam::{Vec2, Vec3};
use mint::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod memory;

pub use memory::MemoryScene;

/// Host node reference (a node name or full path).
pub type NodeRef = String;

/// Node categories the registries care about.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeCategory {
    Mesh,
    Locator,
    Transform,
    Other,
}

/// Which normal the host reports for a surface hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalMode {
    /// Normal interpolated across neighbouring faces.
    Smooth,
    /// Raw normal of the intersected face.
    Face,
}

impl NormalMode {
    pub fn from_smooth(smooth: bool) -> Self {
        if smooth {
            NormalMode::Smooth
        } else {
            NormalMode::Face
        }
    }
}

/// How a source object is brought into the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateMode {
    Instance,
    Copy { preserve_input_connections: bool },
}

impl DuplicateMode {
    pub fn new(instance: bool, preserve_input_connections: bool) -> Self {
        if instance {
            DuplicateMode::Instance
        } else {
            DuplicateMode::Copy {
                preserve_input_connections,
            }
        }
    }
}

/// Result of intersecting the target surfaces under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub position: Vec3,
    /// Unit surface normal.
    pub normal: Vec3,
}

impl SurfaceHit {
    pub fn new(position: impl Into<Vec3>, normal: impl Into<Vec3>) -> Self {
        Self {
            position: position.into(),
            normal: normal.into().normalize_or(Vec3::Y),
        }
    }
}

/// World-space transform pushed to a node. Rotation is Euler XYZ in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTransform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for WorldTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl WorldTransform {
    /// Components as `mint` vectors for hosts that do not use `glam`.
    pub fn to_mint(&self) -> [Vector3<f32>; 3] {
        [
            self.translation.into(),
            self.rotation.into(),
            self.scale.into(),
        ]
    }
}

/// Host object model consumed by the engine and the registries.
pub trait Scene {
    /// Intersect `targets` under the screen position, returning the closest hit.
    fn intersect(&self, targets: &[NodeRef], screen: Vec2, normals: NormalMode)
        -> Option<SurfaceHit>;

    /// Create an instance or a copy of `source` and return the new node.
    fn create_instance_or_copy(&mut self, source: &str, mode: DuplicateMode) -> Result<NodeRef>;

    fn set_world_transform(&mut self, node: &str, transform: &WorldTransform) -> Result<()>;

    fn object_exists(&self, node: &str) -> bool;

    fn node_category(&self, node: &str) -> Option<NodeCategory>;

    /// Shape nodes directly under `node`.
    fn list_immediate_child_shapes(&self, node: &str) -> Vec<NodeRef>;

    /// Unambiguous full path of `node`, if it exists.
    fn full_path(&self, node: &str) -> Option<String>;

    /// Create an empty group. The host may adjust `name` to keep it unique.
    fn create_empty_group(&mut self, name: &str) -> NodeRef;

    fn reparent(&mut self, node: &str, group: &str) -> Result<()>;

    /// Delete `node` and everything below it.
    fn delete_node(&mut self, node: &str) -> Result<()>;
}
