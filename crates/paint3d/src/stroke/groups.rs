//! Output groups, created lazily and reused per grouping scope.
use std::collections::HashMap;

use tracing::debug;

use crate::options::GroupingPolicy;
use crate::scene::{NodeRef, Scene};

/// Base name of the session-wide output group.
pub const OUTPUT_GROUP_NAME: &str = "paint3dOutput";

/// What a group collects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupScope {
    Session,
    Stroke(u64),
    /// Registry key of a source object.
    Source(String),
}

impl GroupScope {
    /// Scope a commit falls under, or `None` when grouping is off.
    pub fn for_policy(policy: GroupingPolicy, stroke: u64, source: &str) -> Option<Self> {
        match policy {
            GroupingPolicy::None => None,
            GroupingPolicy::Session => Some(GroupScope::Session),
            GroupingPolicy::Stroke => Some(GroupScope::Stroke(stroke)),
            GroupingPolicy::Source => Some(GroupScope::Source(source.to_string())),
        }
    }

    /// Name requested from the scene when creating the group.
    pub fn group_name(&self) -> String {
        match self {
            GroupScope::Session => OUTPUT_GROUP_NAME.to_string(),
            GroupScope::Stroke(id) => format!("paint3dStroke{id}"),
            GroupScope::Source(key) => format!("{key}_{OUTPUT_GROUP_NAME}"),
        }
    }
}

/// Memoized group handles keyed by [`GroupScope`].
///
/// A scope gets at most one group. A cached handle whose node was deleted
/// from the scene is replaced by a fresh group on next use.
#[derive(Debug, Clone, Default)]
pub struct GroupCache {
    groups: HashMap<GroupScope, NodeRef>,
}

impl GroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope: &GroupScope) -> Option<&NodeRef> {
        self.groups.get(scope)
    }

    /// Cached group for `scope`, creating it if needed. The flag is true when a group was created.
    pub fn get_or_create(&mut self, scene: &mut dyn Scene, scope: &GroupScope) -> (NodeRef, bool) {
        if let Some(group) = self.groups.get(scope) {
            if scene.object_exists(group) {
                return (group.clone(), false);
            }
            debug!("Group '{}' for {:?} was deleted, recreating.", group, scope);
        }

        let group = scene.create_empty_group(&scope.group_name());
        self.groups.insert(scope.clone(), group.clone());
        (group, true)
    }

    /// Forget the group of a finished stroke.
    pub fn end_stroke(&mut self, stroke: u64) {
        self.groups.remove(&GroupScope::Stroke(stroke));
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
