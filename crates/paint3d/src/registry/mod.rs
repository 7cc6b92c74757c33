//! Source and target object registries.
//!
//! An [`ObjectRegistry`] holds the objects a user has pushed into one of the two
//! tool lists: source objects to scatter, or target surfaces to paint on. Entries
//! are keyed by display name (the shape node name) and kept in key order, which
//! is also the order used for round-robin distribution.
use std::collections::BTreeMap;

use glam::Vec3;
use rand::Rng;
use thiserror::Error;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scene::{NodeCategory, Scene};

pub mod selection;

pub use selection::{pick_round_robin, pick_uniform_random, pick_weighted_random};

/// Default selection weight of a newly added entry.
pub const DEFAULT_PROBABILITY: f32 = 0.5;

/// What a registry is used for. Decides which node categories it accepts.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryRole {
    Source,
    Target,
}

impl RegistryRole {
    pub fn authorized(&self) -> &'static [NodeCategory] {
        match self {
            RegistryRole::Source => &[NodeCategory::Mesh, NodeCategory::Locator],
            RegistryRole::Target => &[NodeCategory::Mesh],
        }
    }

    pub fn accepts(&self, category: NodeCategory) -> bool {
        self.authorized().contains(&category)
    }
}

/// Object axis aligned to the surface normal when alignment is on.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AlignOverride {
    /// The object's up axis (+Y).
    #[default]
    Up,
    /// A custom object-space axis.
    Axis(Vec3),
}

impl AlignOverride {
    pub fn axis(&self) -> Vec3 {
        match self {
            AlignOverride::Up => Vec3::Y,
            AlignOverride::Axis(axis) => axis.normalize_or(Vec3::Y),
        }
    }
}

/// One object in a registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryEntry {
    /// Display name, unique within the registry.
    pub key: String,
    /// Full host path used for every scene call.
    pub path: String,
    /// Whether the entry takes part in distribution.
    pub enabled: bool,
    /// Selection weight in [0, 1] for weighted random distribution.
    pub probability: f32,
    pub align: AlignOverride,
}

/// Reasons [`ObjectRegistry::add`] refuses a node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddRejection {
    #[error("Object already exists in the list and can't be added again")]
    AlreadyExists,

    #[error("Object doesn't have any direct child of the proper type")]
    NoMatchingChild,

    #[error("Object hierarchy too complex (more than one child shape)")]
    HierarchyTooComplex,

    #[error("Object doesn't fit any valid category to be added to the list")]
    UnsupportedCategory,
}

/// Ordered, keyed collection of scene objects.
#[derive(Debug, Clone)]
pub struct ObjectRegistry {
    role: RegistryRole,
    entries: BTreeMap<String, RegistryEntry>,
    cursor: usize,
}

impl ObjectRegistry {
    pub fn new(role: RegistryRole) -> Self {
        Self {
            role,
            entries: BTreeMap::new(),
            cursor: 0,
        }
    }

    pub fn source() -> Self {
        Self::new(RegistryRole::Source)
    }

    pub fn target() -> Self {
        Self::new(RegistryRole::Target)
    }

    pub fn role(&self) -> RegistryRole {
        self.role
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Round-robin position, advanced by [`Self::pick_next`].
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&RegistryEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Host paths of every entry, in key order.
    pub fn paths(&self) -> Vec<String> {
        self.entries.values().map(|e| e.path.clone()).collect()
    }

    /// Add `candidate`, resolving a transform to its single qualifying child shape.
    ///
    /// Returns the key the object was stored under.
    pub fn add(
        &mut self,
        scene: &dyn Scene,
        candidate: &str,
    ) -> std::result::Result<String, AddRejection> {
        if self.contains(candidate) {
            return Err(AddRejection::AlreadyExists);
        }

        let key = match scene.node_category(candidate) {
            Some(category) if self.role.accepts(category) => candidate.to_string(),
            Some(NodeCategory::Transform) => self.resolve_child(scene, candidate)?,
            _ => return Err(AddRejection::UnsupportedCategory),
        };

        if self.contains(&key) {
            return Err(AddRejection::AlreadyExists);
        }

        let path = scene.full_path(&key).unwrap_or_else(|| key.clone());
        debug!("Registry {:?}: added '{}' ({}).", self.role, key, path);
        self.entries.insert(
            key.clone(),
            RegistryEntry {
                key: key.clone(),
                path,
                enabled: true,
                probability: DEFAULT_PROBABILITY,
                align: AlignOverride::Up,
            },
        );
        Ok(key)
    }

    fn resolve_child(
        &self,
        scene: &dyn Scene,
        transform: &str,
    ) -> std::result::Result<String, AddRejection> {
        let children = scene.list_immediate_child_shapes(transform);
        let qualifying: Vec<_> = children
            .iter()
            .filter(|c| scene.node_category(c).is_some_and(|k| self.role.accepts(k)))
            .collect();

        match (children.len(), qualifying.as_slice()) {
            (_, []) => Err(AddRejection::NoMatchingChild),
            (1, [only]) => Ok(only.to_string()),
            _ => Err(AddRejection::HierarchyTooComplex),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<RegistryEntry> {
        self.entries.remove(key)
    }

    /// Remove every entry and rewind the round-robin cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn set_enabled(&mut self, key: &str, enabled: bool) -> Result<()> {
        self.entry_mut(key)?.enabled = enabled;
        Ok(())
    }

    /// Set the selection weight, clamped to [0, 1].
    pub fn set_probability(&mut self, key: &str, probability: f32) -> Result<()> {
        self.entry_mut(key)?.probability = probability.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn set_align(&mut self, key: &str, align: AlignOverride) -> Result<()> {
        self.entry_mut(key)?.align = align;
        Ok(())
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut RegistryEntry> {
        self.entries.get_mut(key).ok_or_else(|| Error::UnknownEntry {
            key: key.to_string(),
        })
    }

    /// False if the registry is empty or any entry no longer exists in the scene.
    pub fn validate_all(&self, scene: &dyn Scene) -> bool {
        if self.entries.is_empty() {
            return false;
        }
        for entry in self.entries.values() {
            if !scene.object_exists(&entry.path) {
                debug!("Registry {:?}: '{}' is gone.", self.role, entry.path);
                return false;
            }
        }
        true
    }

    /// True if any key of `other` is also a key of `self`.
    pub fn has_overlap(&self, other: &ObjectRegistry) -> bool {
        other.entries.keys().any(|k| self.entries.contains_key(k))
    }

    /// Random enabled entry, uniform or weighted by [`RegistryEntry::probability`].
    pub fn pick_random(&self, weighted: bool, rng: &mut dyn Rng) -> Option<&RegistryEntry> {
        let entries: Vec<_> = self.entries.values().collect();
        if weighted {
            pick_weighted_random(&entries, rng)
        } else {
            pick_uniform_random(&entries, rng)
        }
    }

    /// Next enabled entry in ascending key order, wrapping around.
    pub fn pick_next(&mut self) -> Option<&RegistryEntry> {
        let cursor = self.cursor;
        let entries: Vec<_> = self.entries.values().collect();
        let picked = pick_round_robin(&entries, cursor)?;
        self.cursor = cursor.wrapping_add(1);
        Some(picked)
    }
}
