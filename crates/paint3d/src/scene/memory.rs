//! In-memory scene with an orthographic top-down camera.
//!
//! Screen position `(x, y)` maps to the world column `(x, *, y)`. Target
//! surfaces are horizontal planes; the highest plane under the cursor wins.
use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use tracing::debug;

use crate::error::{Error, Result};
use crate::scene::{
    DuplicateMode, NodeCategory, NodeRef, NormalMode, Scene, SurfaceHit, WorldTransform,
};

/// Horizontal plane attached to a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSurface {
    /// World height of the plane.
    pub height: f32,
    /// Optional world-space XZ bounds `(min, max)`; unbounded when `None`.
    pub bounds: Option<(Vec2, Vec2)>,
}

impl PlaneSurface {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, min: Vec2, max: Vec2) -> Self {
        self.bounds = Some((min, max));
        self
    }

    fn contains(&self, xz: Vec2) -> bool {
        match self.bounds {
            Some((min, max)) => xz.cmpge(min).all() && xz.cmple(max).all(),
            None => true,
        }
    }
}

/// A node of the in-memory scene.
#[derive(Debug, Clone)]
pub struct MemoryNode {
    pub category: NodeCategory,
    pub parent: Option<NodeRef>,
    pub children: Vec<NodeRef>,
    pub transform: WorldTransform,
    pub surface: Option<PlaneSurface>,
    /// Node this one was instanced or copied from.
    pub origin: Option<NodeRef>,
    pub duplicate_mode: Option<DuplicateMode>,
}

impl MemoryNode {
    fn new(category: NodeCategory) -> Self {
        Self {
            category,
            parent: None,
            children: Vec::new(),
            transform: WorldTransform::default(),
            surface: None,
            origin: None,
            duplicate_mode: None,
        }
    }
}

/// Simple scene graph keyed by unique node names.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: BTreeMap<NodeRef, MemoryNode>,
    duplicates_created: usize,
    groups_created: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform node.
    pub fn with_transform(mut self, name: &str, parent: Option<&str>) -> Self {
        self.insert(name, MemoryNode::new(NodeCategory::Transform), parent);
        self
    }

    /// Add a shape node of `category`.
    pub fn with_shape(mut self, name: &str, category: NodeCategory, parent: Option<&str>) -> Self {
        self.insert(name, MemoryNode::new(category), parent);
        self
    }

    /// Add a transform with a single mesh child carrying a horizontal plane.
    pub fn with_plane(mut self, transform: &str, shape: &str, surface: PlaneSurface) -> Self {
        self.insert(transform, MemoryNode::new(NodeCategory::Transform), None);
        let mut node = MemoryNode::new(NodeCategory::Mesh);
        node.surface = Some(surface);
        self.insert(shape, node, Some(transform));
        self
    }

    /// Add a transform with a single mesh child, used as a paint source.
    pub fn with_source_mesh(self, transform: &str, shape: &str) -> Self {
        self.with_transform(transform, None)
            .with_shape(shape, NodeCategory::Mesh, Some(transform))
    }

    /// Delete `node` and its descendants, as a user might between events.
    pub fn delete(&mut self, node: &str) -> bool {
        let name = leaf_name(node).to_string();
        let Some(removed) = self.nodes.remove(&name) else {
            return false;
        };
        if let Some(parent) = removed.parent.as_ref().and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| c != &name);
        }
        for child in removed.children {
            self.delete(&child);
        }
        true
    }

    pub fn node(&self, node: &str) -> Option<&MemoryNode> {
        self.nodes.get(leaf_name(node))
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeRef, &MemoryNode)> {
        self.nodes.iter()
    }

    /// Nodes created by [`Scene::create_instance_or_copy`], in name order.
    pub fn duplicates(&self) -> impl Iterator<Item = (&NodeRef, &MemoryNode)> {
        self.nodes.iter().filter(|(_, n)| n.origin.is_some())
    }

    pub fn duplicates_created(&self) -> usize {
        self.duplicates_created
    }

    pub fn groups_created(&self) -> usize {
        self.groups_created
    }

    fn insert(&mut self, name: &str, mut node: MemoryNode, parent: Option<&str>) {
        node.parent = parent.map(|p| leaf_name(p).to_string());
        if let Some(p) = node.parent.as_ref().and_then(|p| self.nodes.get_mut(p)) {
            p.children.push(name.to_string());
        }
        self.nodes.insert(name.to_string(), node);
    }

    fn unique_name(&self, base: &str) -> String {
        let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
        let stem = if stem.is_empty() { base } else { stem };
        if !self.nodes.contains_key(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{stem}{i}"))
            .find(|candidate| !self.nodes.contains_key(candidate))
            .unwrap_or_else(|| format!("{stem}_"))
    }

    fn detach(&mut self, name: &str) {
        let parent = self.nodes.get(name).and_then(|n| n.parent.clone());
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| c != name);
        }
    }
}

fn leaf_name(node: &str) -> &str {
    node.rsplit('|').next().unwrap_or(node)
}

impl Scene for MemoryScene {
    fn intersect(
        &self,
        targets: &[NodeRef],
        screen: Vec2,
        _normals: NormalMode,
    ) -> Option<SurfaceHit> {
        targets
            .iter()
            .filter_map(|t| self.nodes.get(leaf_name(t)))
            .filter_map(|n| n.surface)
            .filter(|s| s.contains(screen))
            .map(|s| s.height)
            .max_by(|a, b| a.total_cmp(b))
            .map(|height| SurfaceHit::new(Vec3::new(screen.x, height, screen.y), Vec3::Y))
    }

    fn create_instance_or_copy(&mut self, source: &str, mode: DuplicateMode) -> Result<NodeRef> {
        let source = leaf_name(source);
        let Some(original) = self.nodes.get(source) else {
            return Err(Error::Scene(format!("no object matches '{source}'")));
        };
        let mut node = MemoryNode::new(original.category);
        node.origin = Some(source.to_string());
        node.duplicate_mode = Some(mode);

        let name = self.unique_name(source);
        self.nodes.insert(name.clone(), node);
        self.duplicates_created += 1;
        debug!("Created '{}' from '{}' ({:?}).", name, source, mode);
        Ok(name)
    }

    fn set_world_transform(&mut self, node: &str, transform: &WorldTransform) -> Result<()> {
        match self.nodes.get_mut(leaf_name(node)) {
            Some(n) => {
                n.transform = *transform;
                Ok(())
            }
            None => Err(Error::Scene(format!("no object matches '{node}'"))),
        }
    }

    fn object_exists(&self, node: &str) -> bool {
        self.nodes.contains_key(leaf_name(node))
    }

    fn node_category(&self, node: &str) -> Option<NodeCategory> {
        self.nodes.get(leaf_name(node)).map(|n| n.category)
    }

    fn list_immediate_child_shapes(&self, node: &str) -> Vec<NodeRef> {
        let Some(n) = self.nodes.get(leaf_name(node)) else {
            return Vec::new();
        };
        n.children
            .iter()
            .filter(|c| {
                self.nodes
                    .get(c.as_str())
                    .is_some_and(|child| child.category != NodeCategory::Transform)
            })
            .cloned()
            .collect()
    }

    fn full_path(&self, node: &str) -> Option<String> {
        let mut name = leaf_name(node);
        let mut segments = Vec::new();
        loop {
            let n = self.nodes.get(name)?;
            segments.push(name);
            match n.parent.as_deref() {
                Some(parent) => name = parent,
                None => break,
            }
        }
        segments.reverse();
        Some(format!("|{}", segments.join("|")))
    }

    fn create_empty_group(&mut self, name: &str) -> NodeRef {
        let name = self.unique_name(name);
        self.nodes
            .insert(name.clone(), MemoryNode::new(NodeCategory::Transform));
        self.groups_created += 1;
        name
    }

    fn reparent(&mut self, node: &str, group: &str) -> Result<()> {
        let node = leaf_name(node).to_string();
        let group = leaf_name(group).to_string();
        if !self.nodes.contains_key(&group) {
            return Err(Error::Scene(format!("no group matches '{group}'")));
        }
        if !self.nodes.contains_key(&node) {
            return Err(Error::Scene(format!("no object matches '{node}'")));
        }
        self.detach(&node);
        if let Some(n) = self.nodes.get_mut(&node) {
            n.parent = Some(group.clone());
        }
        if let Some(g) = self.nodes.get_mut(&group) {
            g.children.push(node);
        }
        Ok(())
    }

    fn delete_node(&mut self, node: &str) -> Result<()> {
        if self.delete(node) {
            Ok(())
        } else {
            Err(Error::Scene(format!("no object matches '{node}'")))
        }
    }
}
