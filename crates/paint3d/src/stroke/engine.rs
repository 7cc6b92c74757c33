//! Stroke state machine driving paint and place tools.
//!
//! A [`StrokeEngine`] is `Idle` until a press starts a stroke and `Active`
//! until release or cancel. Every handler receives a fresh [`StrokeContext`],
//! so option, range and registry edits made between events apply to the next
//! event of the running stroke.
//!
//! Handlers never fail. Misses and closed flux gates are reported as
//! [`StrokeEvent::Skipped`]; scene inconsistencies found while committing
//! (a deleted source, a failed transform write) abort that one commit and are
//! reported as [`StrokeEvent::Status`] while the stroke stays active.
use std::time::Duration;

use glam::{Vec2, Vec3};
use rand::Rng;
use tracing::{debug, info, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::options::{RampFx, ToolOptions};
use crate::registry::ObjectRegistry;
use crate::sampling::TransformSampler;
use crate::scene::{DuplicateMode, NodeRef, NormalMode, Scene, SurfaceHit, WorldTransform};
use crate::stroke::events::{EventSink, SkipReason, StrokeEvent};
use crate::stroke::flux::FluxGate;
use crate::stroke::groups::{GroupCache, GroupScope};
use crate::stroke::placement::{
    anchor_point, ramp_deltas, ramp_factor, snap_spin, surface_frame, world_transform, Placement,
};

/// Which tool the engine runs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    /// Continuous flux-gated commits along a drag.
    #[default]
    Paint,
    /// One object per press, moved or spun while the pointer is held.
    Place,
}

/// Pointer state delivered by the host for press, drag and release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Cursor position in screen space.
    pub screen: Vec2,
    /// Host timestamp, monotonic within a stroke.
    pub time: Duration,
    /// Spin modifier held (place mode).
    pub spin: bool,
}

impl PointerEvent {
    pub fn new(screen: impl Into<Vec2>, time: Duration) -> Self {
        Self {
            screen: screen.into(),
            time,
            spin: false,
        }
    }

    pub fn with_spin(mut self, spin: bool) -> Self {
        self.spin = spin;
        self
    }
}

/// Live tool state lent to the engine for one event.
pub struct StrokeContext<'a> {
    pub options: &'a ToolOptions,
    pub sampler: &'a TransformSampler,
    pub sources: &'a mut ObjectRegistry,
    pub targets: &'a ObjectRegistry,
    pub groups: &'a mut GroupCache,
    pub rng: &'a mut dyn Rng,
}

#[derive(Debug)]
struct ActiveStroke {
    id: u64,
    flux: FluxGate,
    commits: Vec<Placement>,
    /// Screen x and spin value when the spin modifier was first seen.
    spin_origin: Option<(f32, f32)>,
}

#[derive(Debug)]
enum StrokeState {
    Idle,
    Active(ActiveStroke),
}

/// Interactive paint/place state machine.
#[derive(Debug)]
pub struct StrokeEngine {
    mode: ToolMode,
    state: StrokeState,
    strokes: u64,
}

impl StrokeEngine {
    pub fn new(mode: ToolMode) -> Self {
        Self {
            mode,
            state: StrokeState::Idle,
            strokes: 0,
        }
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, StrokeState::Active(_))
    }

    /// Id of the running stroke.
    pub fn active_stroke(&self) -> Option<u64> {
        match &self.state {
            StrokeState::Active(stroke) => Some(stroke.id),
            StrokeState::Idle => None,
        }
    }

    /// Objects committed by the running stroke, in commit order.
    pub fn commits(&self) -> &[Placement] {
        match &self.state {
            StrokeState::Active(stroke) => &stroke.commits,
            StrokeState::Idle => &[],
        }
    }

    pub fn strokes_started(&self) -> u64 {
        self.strokes
    }

    /// Start a stroke. Paint mode commits on the press itself; place mode places its object.
    pub fn press(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        event: PointerEvent,
        sink: &mut dyn EventSink,
    ) {
        if self.is_active() {
            warn!("Press during an active stroke, finishing the previous stroke first.");
            self.release(scene, ctx, sink);
        }

        self.strokes += 1;
        let mut stroke = ActiveStroke::new(self.strokes);
        info!("Stroke {} started ({:?}).", stroke.id, self.mode);
        sink.send(StrokeEvent::StrokeStarted {
            stroke: stroke.id,
            mode: self.mode,
        });

        match self.mode {
            ToolMode::Paint => stroke.paint(scene, ctx, &event, sink),
            ToolMode::Place => stroke.place(scene, ctx, &event, sink),
        }
        self.state = StrokeState::Active(stroke);
    }

    /// Continue the running stroke. Ignored while idle.
    pub fn drag(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        event: PointerEvent,
        sink: &mut dyn EventSink,
    ) {
        let StrokeState::Active(stroke) = &mut self.state else {
            debug!("Drag without an active stroke ignored.");
            return;
        };

        match self.mode {
            ToolMode::Paint => stroke.paint(scene, ctx, &event, sink),
            ToolMode::Place if stroke.commits.is_empty() => stroke.place(scene, ctx, &event, sink),
            ToolMode::Place if event.spin => stroke.spin(scene, ctx, &event, sink),
            ToolMode::Place => stroke.move_placed(scene, ctx, &event, sink),
        }
    }

    /// End the running stroke, applying the final ramp pass, and return its commits.
    pub fn release(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        sink: &mut dyn EventSink,
    ) -> Vec<Placement> {
        let StrokeState::Active(mut stroke) = std::mem::replace(&mut self.state, StrokeState::Idle)
        else {
            return Vec::new();
        };

        let options = ctx.options;
        if self.mode == ToolMode::Paint
            && options.ramp_fx != RampFx::None
            && !options.real_time_ramp_fx
        {
            stroke.apply_ramp(scene, options, sink);
        }
        stroke.finish(ctx.groups, false, sink)
    }

    /// Abandon the running stroke. Committed objects stay; no ramp pass runs.
    pub fn cancel(&mut self, groups: &mut GroupCache, sink: &mut dyn EventSink) -> Vec<Placement> {
        match std::mem::replace(&mut self.state, StrokeState::Idle) {
            StrokeState::Active(stroke) => stroke.finish(groups, true, sink),
            StrokeState::Idle => Vec::new(),
        }
    }
}

impl ActiveStroke {
    fn new(id: u64) -> Self {
        Self {
            id,
            flux: FluxGate::new(),
            commits: Vec::new(),
            spin_origin: None,
        }
    }

    fn finish(
        self,
        groups: &mut GroupCache,
        cancelled: bool,
        sink: &mut dyn EventSink,
    ) -> Vec<Placement> {
        groups.end_stroke(self.id);
        info!(
            "Stroke {} {} with {} object(s).",
            self.id,
            if cancelled { "cancelled" } else { "finished" },
            self.commits.len()
        );
        sink.send(StrokeEvent::StrokeFinished {
            stroke: self.id,
            committed: self.commits.len(),
            cancelled,
        });
        self.commits
    }

    fn hit(
        &self,
        scene: &dyn Scene,
        ctx: &StrokeContext<'_>,
        screen: Vec2,
        sink: &mut dyn EventSink,
    ) -> Option<SurfaceHit> {
        let normals = NormalMode::from_smooth(ctx.options.smooth_normal);
        let hit = scene.intersect(&ctx.targets.paths(), screen, normals);
        if hit.is_none() {
            sink.send(StrokeEvent::Skipped {
                stroke: self.id,
                reason: SkipReason::NoHit,
            });
        }
        hit
    }

    fn paint(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        event: &PointerEvent,
        sink: &mut dyn EventSink,
    ) {
        let Some(hit) = self.hit(scene, ctx, event.screen, sink) else {
            return;
        };
        if !self.flux.passes(ctx.options, hit.position, event.time) {
            debug!("Stroke {}: flux gate closed at {}.", self.id, hit.position);
            sink.send(StrokeEvent::Skipped {
                stroke: self.id,
                reason: SkipReason::Flux,
            });
            return;
        }

        if self.commit(scene, ctx, hit, sink) {
            self.flux.record(hit.position, event.time);
            let options = ctx.options;
            if options.ramp_fx != RampFx::None && options.real_time_ramp_fx {
                self.apply_ramp(scene, options, sink);
            }
        }
    }

    fn place(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        event: &PointerEvent,
        sink: &mut dyn EventSink,
    ) {
        if let Some(hit) = self.hit(scene, ctx, event.screen, sink) {
            self.commit(scene, ctx, hit, sink);
        }
    }

    fn move_placed(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        event: &PointerEvent,
        sink: &mut dyn EventSink,
    ) {
        self.spin_origin = None;
        let Some(hit) = self.hit(scene, ctx, event.screen, sink) else {
            return;
        };
        let options = ctx.options;
        let stroke = self.id;
        let Some(placement) = self.commits.last_mut() else {
            return;
        };

        if options.continuous_transform {
            placement.deltas = ctx.sampler.sample_deltas(options, &mut *ctx.rng);
        }
        let axis = ctx
            .sources
            .get(&placement.source)
            .map(|e| e.align.axis())
            .unwrap_or(Vec3::Y);
        placement.hit = hit;
        placement.frame = surface_frame(hit.normal, axis, options.align);
        placement.anchor = anchor_point(&hit, options.up_offset, placement.deltas.jitter);
        let transform = placement.resolve(&placement.deltas);
        push_transform(scene, stroke, placement, transform, sink);
    }

    fn spin(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        event: &PointerEvent,
        sink: &mut dyn EventSink,
    ) {
        let stroke = self.id;
        let Some(placement) = self.commits.last_mut() else {
            return;
        };
        let (origin_x, origin_spin) = *self
            .spin_origin
            .get_or_insert((event.screen.x, placement.spin));
        let spin = origin_spin + snap_spin(event.screen.x - origin_x, ctx.options.place_rotate);
        if spin == placement.spin {
            return;
        }
        placement.spin = spin;
        let transform = placement.resolve(&placement.deltas);
        push_transform(scene, stroke, placement, transform, sink);
    }

    /// Commit one object at `hit`. Failures are reported to `sink`.
    fn commit(
        &mut self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        hit: SurfaceHit,
        sink: &mut dyn EventSink,
    ) -> bool {
        match self.try_commit(scene, ctx, hit, sink) {
            Ok(placement) => {
                debug!(
                    "Stroke {}: committed '{}' from '{}' at {}.",
                    self.id, placement.node, placement.source, placement.transform.translation
                );
                sink.send(StrokeEvent::Placed {
                    stroke: self.id,
                    placement: placement.clone(),
                });
                self.commits.push(placement);
                true
            }
            Err(err) => {
                warn!("Stroke {}: commit skipped: {}.", self.id, err);
                sink.send(StrokeEvent::Status {
                    message: err.to_string(),
                });
                false
            }
        }
    }

    fn try_commit(
        &self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        hit: SurfaceHit,
        sink: &mut dyn EventSink,
    ) -> Result<Placement> {
        let options = ctx.options;
        let picked = if options.random {
            ctx.sources.pick_random(options.weighted, &mut *ctx.rng)
        } else {
            ctx.sources.pick_next()
        };
        let entry = picked
            .cloned()
            .ok_or_else(|| Error::Other("No enabled source object to paint with".into()))?;
        if !scene.object_exists(&entry.path) {
            return Err(Error::Scene(format!(
                "source object '{}' no longer exists",
                entry.key
            )));
        }

        let deltas = ctx.sampler.sample_deltas(options, &mut *ctx.rng);
        let mode = DuplicateMode::new(options.instance, options.preserve_connections);
        let node = scene.create_instance_or_copy(&entry.path, mode)?;

        let frame = surface_frame(hit.normal, entry.align.axis(), options.align);
        let anchor = anchor_point(&hit, options.up_offset, deltas.jitter);
        let transform = world_transform(anchor, frame, &deltas);
        let group = match self.settle(scene, ctx, &node, &entry.key, &transform, sink) {
            Ok(group) => group,
            Err(err) => {
                if let Err(cleanup) = scene.delete_node(&node) {
                    warn!("Stroke {}: could not remove '{}': {}.", self.id, node, cleanup);
                }
                return Err(err);
            }
        };

        Ok(Placement {
            node,
            source: entry.key,
            hit,
            anchor,
            frame,
            spin: 0.0,
            deltas,
            transform,
            group,
        })
    }

    /// Write the transform of a fresh node and move it under its output group.
    fn settle(
        &self,
        scene: &mut dyn Scene,
        ctx: &mut StrokeContext<'_>,
        node: &str,
        source: &str,
        transform: &WorldTransform,
        sink: &mut dyn EventSink,
    ) -> Result<Option<NodeRef>> {
        scene.set_world_transform(node, transform)?;

        let Some(scope) = GroupScope::for_policy(ctx.options.grouping(), self.id, source) else {
            return Ok(None);
        };
        let (group, created) = ctx.groups.get_or_create(scene, &scope);
        if created {
            info!("Created output group '{}' for {:?}.", group, scope);
            sink.send(StrokeEvent::GroupCreated {
                scope,
                group: group.clone(),
            });
        }
        scene.reparent(node, &group)?;
        Ok(Some(group))
    }

    /// Re-resolve every commit with its ramp value over the current stroke length.
    fn apply_ramp(&mut self, scene: &mut dyn Scene, options: &ToolOptions, sink: &mut dyn EventSink) {
        let count = self.commits.len();
        for (index, placement) in self.commits.iter_mut().enumerate() {
            let deltas = ramp_deltas(&placement.deltas, options.ramp_fx, ramp_factor(index, count));
            let transform = placement.resolve(&deltas);
            if transform != placement.transform {
                push_transform(scene, self.id, placement, transform, sink);
            }
        }
    }
}

fn push_transform(
    scene: &mut dyn Scene,
    stroke: u64,
    placement: &mut Placement,
    transform: WorldTransform,
    sink: &mut dyn EventSink,
) {
    match scene.set_world_transform(&placement.node, &transform) {
        Ok(()) => {
            placement.transform = transform;
            sink.send(StrokeEvent::Moved {
                stroke,
                node: placement.node.clone(),
                transform,
            });
        }
        Err(err) => {
            warn!("Stroke {}: could not update '{}': {}.", stroke, placement.node, err);
            sink.send(StrokeEvent::Status {
                message: err.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::options::{FluxMode, GroupBy};
    use crate::sampling::ValueRange;
    use crate::scene::memory::{MemoryScene, PlaneSurface};
    use crate::stroke::events::VecSink;

    struct Fixture {
        scene: MemoryScene,
        options: ToolOptions,
        sampler: TransformSampler,
        sources: ObjectRegistry,
        targets: ObjectRegistry,
        groups: GroupCache,
        rng: StdRng,
    }

    impl Fixture {
        fn new(sources: &[&str]) -> Self {
            let scene = MemoryScene::new()
                .with_plane("ground", "groundShape", PlaneSurface::new(0.0))
                .with_source_mesh("rock", "rockShape")
                .with_source_mesh("tree", "treeShape");
            let mut fx = Self {
                scene,
                options: ToolOptions {
                    paint_distance: 5.0,
                    ..ToolOptions::default()
                },
                sampler: TransformSampler::new(),
                sources: ObjectRegistry::source(),
                targets: ObjectRegistry::target(),
                groups: GroupCache::new(),
                rng: StdRng::seed_from_u64(7),
            };
            for source in sources {
                fx.sources.add(&fx.scene, source).unwrap();
            }
            fx.targets.add(&fx.scene, "ground").unwrap();
            fx
        }

        fn split(&mut self) -> (&mut MemoryScene, StrokeContext<'_>) {
            (
                &mut self.scene,
                StrokeContext {
                    options: &self.options,
                    sampler: &self.sampler,
                    sources: &mut self.sources,
                    targets: &self.targets,
                    groups: &mut self.groups,
                    rng: &mut self.rng,
                },
            )
        }

        fn press(&mut self, engine: &mut StrokeEngine, event: PointerEvent, sink: &mut VecSink) {
            let (scene, mut ctx) = self.split();
            engine.press(scene, &mut ctx, event, sink);
        }

        fn drag(&mut self, engine: &mut StrokeEngine, event: PointerEvent, sink: &mut VecSink) {
            let (scene, mut ctx) = self.split();
            engine.drag(scene, &mut ctx, event, sink);
        }

        fn release(&mut self, engine: &mut StrokeEngine, sink: &mut VecSink) -> Vec<Placement> {
            let (scene, mut ctx) = self.split();
            engine.release(scene, &mut ctx, sink)
        }
    }

    fn at(x: f32, ms: u64) -> PointerEvent {
        PointerEvent::new(Vec2::new(x, 0.0), Duration::from_millis(ms))
    }

    fn skipped(sink: &VecSink, reason: SkipReason) -> usize {
        sink.as_slice()
            .iter()
            .filter(|e| matches!(e, StrokeEvent::Skipped { reason: r, .. } if *r == reason))
            .count()
    }

    #[test]
    fn distance_flux_commits_at_expected_points() {
        let mut fx = Fixture::new(&["rock"]);
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        fx.drag(&mut engine, at(2.0, 10), &mut sink);
        fx.drag(&mut engine, at(6.0, 20), &mut sink);
        fx.drag(&mut engine, at(11.0, 30), &mut sink);
        let commits = fx.release(&mut engine, &mut sink);

        let xs: Vec<f32> = commits.iter().map(|p| p.transform.translation.x).collect();
        assert_eq!(xs, vec![0.0, 6.0, 11.0]);
        assert!(commits
            .iter()
            .all(|p| p.transform.translation.y == 0.0 && p.transform.translation.z == 0.0));
        assert_eq!(skipped(&sink, SkipReason::Flux), 1);
        assert_eq!(fx.scene.duplicates_created(), 3);
        assert!(!engine.is_active());
    }

    #[test]
    fn time_flux_uses_event_timestamps() {
        let mut fx = Fixture::new(&["rock"]);
        fx.options.flux = FluxMode::Time;
        fx.options.paint_timer = 0.05;
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        fx.drag(&mut engine, at(0.0, 20), &mut sink);
        fx.drag(&mut engine, at(0.0, 60), &mut sink);
        fx.drag(&mut engine, at(0.0, 90), &mut sink);
        let commits = fx.release(&mut engine, &mut sink);

        assert_eq!(commits.len(), 2);
        assert_eq!(skipped(&sink, SkipReason::Flux), 2);
    }

    #[test]
    fn misses_are_skipped_without_commit() {
        let mut fx = Fixture::new(&["rock"]);
        fx.scene = fx.scene.clone().with_plane(
            "island",
            "islandShape",
            PlaneSurface::new(0.0).with_bounds(Vec2::splat(-1.0), Vec2::splat(1.0)),
        );
        fx.targets = ObjectRegistry::target();
        fx.targets.add(&fx.scene, "island").unwrap();

        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();
        fx.press(&mut engine, at(50.0, 0), &mut sink);
        assert!(engine.is_active());
        assert!(engine.commits().is_empty());
        assert_eq!(skipped(&sink, SkipReason::NoHit), 1);

        fx.drag(&mut engine, at(0.5, 10), &mut sink);
        assert_eq!(engine.commits().len(), 1);
    }

    #[test]
    fn deleted_source_skips_commit_and_keeps_stroke() {
        let mut fx = Fixture::new(&["rock"]);
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        assert!(fx.scene.delete("rock"));
        fx.drag(&mut engine, at(20.0, 10), &mut sink);

        assert!(engine.is_active());
        assert_eq!(engine.commits().len(), 1);
        let statuses: Vec<_> = sink.statuses().collect();
        assert_eq!(statuses.len(), 1);
        assert!(statuses[0].contains("rockShape"));
        assert!(!statuses[0].contains('\n'));

        // A failed commit does not move the flux gate.
        fx.sources.remove("rockShape");
        fx.sources.add(&fx.scene, "tree").unwrap();
        fx.drag(&mut engine, at(2.0, 20), &mut sink);
        assert_eq!(engine.commits().len(), 1);
        fx.drag(&mut engine, at(5.0, 30), &mut sink);
        assert_eq!(engine.commits().len(), 2);
        assert_eq!(engine.commits()[1].source, "treeShape");
    }

    /// Memory scene whose writes can be made to fail.
    struct LockedScene {
        inner: MemoryScene,
        lock_transforms: bool,
        lock_groups: bool,
    }

    impl Scene for LockedScene {
        fn intersect(
            &self,
            targets: &[NodeRef],
            screen: Vec2,
            normals: NormalMode,
        ) -> Option<SurfaceHit> {
            self.inner.intersect(targets, screen, normals)
        }

        fn create_instance_or_copy(&mut self, source: &str, mode: DuplicateMode) -> Result<NodeRef> {
            self.inner.create_instance_or_copy(source, mode)
        }

        fn set_world_transform(&mut self, node: &str, transform: &WorldTransform) -> Result<()> {
            if self.lock_transforms {
                return Err(Error::Scene("transforms are locked".into()));
            }
            self.inner.set_world_transform(node, transform)
        }

        fn object_exists(&self, node: &str) -> bool {
            self.inner.object_exists(node)
        }

        fn node_category(&self, node: &str) -> Option<crate::scene::NodeCategory> {
            self.inner.node_category(node)
        }

        fn list_immediate_child_shapes(&self, node: &str) -> Vec<NodeRef> {
            self.inner.list_immediate_child_shapes(node)
        }

        fn full_path(&self, node: &str) -> Option<String> {
            self.inner.full_path(node)
        }

        fn create_empty_group(&mut self, name: &str) -> NodeRef {
            self.inner.create_empty_group(name)
        }

        fn reparent(&mut self, node: &str, group: &str) -> Result<()> {
            if self.lock_groups {
                return Err(Error::Scene("groups are locked".into()));
            }
            self.inner.reparent(node, group)
        }

        fn delete_node(&mut self, node: &str) -> Result<()> {
            self.inner.delete_node(node)
        }
    }

    #[test]
    fn failed_commit_leaves_no_node_behind() {
        let mut fx = Fixture::new(&["rock"]);
        fx.options.hierarchy = true;
        let mut scene = LockedScene {
            inner: std::mem::take(&mut fx.scene),
            lock_transforms: true,
            lock_groups: false,
        };
        let mut ctx = StrokeContext {
            options: &fx.options,
            sampler: &fx.sampler,
            sources: &mut fx.sources,
            targets: &fx.targets,
            groups: &mut fx.groups,
            rng: &mut fx.rng,
        };
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        engine.press(&mut scene, &mut ctx, at(0.0, 0), &mut sink);
        assert!(engine.is_active());
        assert!(engine.commits().is_empty());
        assert_eq!(
            sink.statuses().collect::<Vec<_>>(),
            vec!["scene error: transforms are locked"]
        );
        assert_eq!(scene.inner.duplicates_created(), 1);
        assert_eq!(scene.inner.duplicates().count(), 0);

        scene.lock_transforms = false;
        scene.lock_groups = true;
        engine.drag(&mut scene, &mut ctx, at(1.0, 10), &mut sink);
        assert!(engine.commits().is_empty());
        assert_eq!(scene.inner.duplicates().count(), 0);

        scene.lock_groups = false;
        engine.drag(&mut scene, &mut ctx, at(2.0, 20), &mut sink);
        assert_eq!(engine.commits().len(), 1);
        assert_eq!(scene.inner.duplicates().count(), 1);
        assert!(engine.commits()[0].group.is_some());
    }

    #[test]
    fn option_changes_apply_to_next_event() {
        let mut fx = Fixture::new(&["rock", "tree"]);
        fx.options.random = false;
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        fx.drag(&mut engine, at(2.0, 10), &mut sink);
        assert_eq!(engine.commits().len(), 1);

        fx.options.paint_distance = 1.0;
        fx.drag(&mut engine, at(3.0, 20), &mut sink);
        fx.options.up_offset = 0.5;
        fx.drag(&mut engine, at(4.0, 30), &mut sink);

        let commits = engine.commits();
        assert_eq!(commits.len(), 3);
        let sources: Vec<_> = commits.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(sources, vec!["rockShape", "treeShape", "rockShape"]);
        assert_eq!(commits[1].transform.translation.y, 0.0);
        assert_eq!(commits[2].transform.translation.y, 0.5);
    }

    #[test]
    fn stroke_grouping_creates_one_group_per_stroke() {
        let mut fx = Fixture::new(&["rock"]);
        fx.options.hierarchy = true;
        fx.options.group = GroupBy::Stroke;
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        for stroke in 0..2 {
            let base = stroke as f32 * 100.0;
            fx.press(&mut engine, at(base, 0), &mut sink);
            fx.drag(&mut engine, at(base + 10.0, 10), &mut sink);
            let commits = fx.release(&mut engine, &mut sink);
            let group = commits[0].group.clone().unwrap();
            assert!(commits.iter().all(|p| p.group.as_ref() == Some(&group)));
            assert_eq!(
                fx.scene.node(&commits[0].node).unwrap().parent.as_deref(),
                Some(group.as_str())
            );
        }

        assert_eq!(fx.scene.groups_created(), 2);
        assert!(fx.groups.is_empty());
    }

    #[test]
    fn session_grouping_reuses_group_across_strokes() {
        let mut fx = Fixture::new(&["rock", "tree"]);
        fx.options.hierarchy = true;
        fx.options.group = GroupBy::Session;
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        for stroke in 0..3 {
            fx.press(&mut engine, at(stroke as f32 * 50.0, 0), &mut sink);
            fx.release(&mut engine, &mut sink);
        }
        assert_eq!(fx.scene.groups_created(), 1);

        fx.options.group = GroupBy::Source;
        fx.options.random = false;
        fx.press(&mut engine, at(0.0, 0), &mut sink);
        fx.drag(&mut engine, at(10.0, 10), &mut sink);
        fx.drag(&mut engine, at(20.0, 20), &mut sink);
        fx.release(&mut engine, &mut sink);
        assert_eq!(fx.scene.groups_created(), 3);

        let created: Vec<_> = sink
            .as_slice()
            .iter()
            .filter_map(|e| match e {
                StrokeEvent::GroupCreated { group, .. } => Some(group.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            created,
            vec![
                "paint3dOutput",
                "rockShape_paint3dOutput",
                "treeShape_paint3dOutput"
            ]
        );
    }

    fn ramp_fixture(real_time: bool) -> Fixture {
        let mut fx = Fixture::new(&["rock"]);
        fx.sampler = TransformSampler::new().with_rotate(
            ValueRange::fixed(0.0),
            ValueRange::fixed(0.0),
            ValueRange::fixed(90.0),
        );
        fx.options.ramp_fx = RampFx::Rotate;
        fx.options.real_time_ramp_fx = real_time;
        fx
    }

    fn z_rotations(commits: &[Placement]) -> Vec<f32> {
        commits
            .iter()
            .map(|p| (p.transform.rotation.z * 10.0).round() / 10.0)
            .collect()
    }

    #[test]
    fn ramp_applies_once_on_release() {
        let mut fx = ramp_fixture(false);
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        fx.drag(&mut engine, at(10.0, 10), &mut sink);
        fx.drag(&mut engine, at(20.0, 20), &mut sink);
        assert_eq!(z_rotations(engine.commits()), vec![90.0, 90.0, 90.0]);

        let commits = fx.release(&mut engine, &mut sink);
        assert_eq!(z_rotations(&commits), vec![0.0, 45.0, 90.0]);
        for placement in &commits {
            let node = fx.scene.node(&placement.node).unwrap();
            assert_eq!(node.transform, placement.transform);
        }
    }

    #[test]
    fn real_time_ramp_follows_each_commit() {
        let mut fx = ramp_fixture(true);
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        assert_eq!(z_rotations(engine.commits()), vec![90.0]);
        fx.drag(&mut engine, at(10.0, 10), &mut sink);
        assert_eq!(z_rotations(engine.commits()), vec![0.0, 90.0]);
        fx.drag(&mut engine, at(20.0, 20), &mut sink);
        assert_eq!(z_rotations(engine.commits()), vec![0.0, 45.0, 90.0]);
    }

    #[test]
    fn cancel_skips_ramp_and_keeps_objects() {
        let mut fx = ramp_fixture(false);
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        fx.drag(&mut engine, at(10.0, 10), &mut sink);
        let commits = engine.cancel(&mut fx.groups, &mut sink);

        assert!(!engine.is_active());
        assert_eq!(z_rotations(&commits), vec![90.0, 90.0]);
        assert_eq!(fx.scene.duplicates_created(), 2);
        assert!(matches!(
            sink.as_slice().last(),
            Some(StrokeEvent::StrokeFinished {
                cancelled: true,
                committed: 2,
                ..
            })
        ));
    }

    #[test]
    fn place_mode_commits_once_and_moves() {
        let mut fx = Fixture::new(&["rock"]);
        let mut engine = StrokeEngine::new(ToolMode::Place);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        fx.drag(&mut engine, at(1.0, 10), &mut sink);
        fx.drag(&mut engine, at(30.0, 20), &mut sink);

        assert_eq!(fx.scene.duplicates_created(), 1);
        let node = engine.commits()[0].node.clone();
        assert_eq!(
            fx.scene.node(&node).unwrap().transform.translation,
            Vec3::new(30.0, 0.0, 0.0)
        );

        fx.release(&mut engine, &mut sink);
        fx.press(&mut engine, at(5.0, 30), &mut sink);
        fx.release(&mut engine, &mut sink);
        assert_eq!(fx.scene.duplicates_created(), 2);
    }

    #[test]
    fn place_mode_continuous_transform_rerolls_deltas() {
        let mut fx = Fixture::new(&["rock"]);
        fx.sampler = TransformSampler::new().with_rotate(
            ValueRange::fixed(0.0),
            ValueRange::new(-180.0, 180.0),
            ValueRange::fixed(0.0),
        );
        let mut engine = StrokeEngine::new(ToolMode::Place);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(0.0, 0), &mut sink);
        let frozen = engine.commits()[0].deltas;
        fx.drag(&mut engine, at(1.0, 10), &mut sink);
        assert_eq!(engine.commits()[0].deltas, frozen);

        fx.options.continuous_transform = true;
        let rolled: Vec<_> = (0..5)
            .map(|i| {
                fx.drag(&mut engine, at(2.0 + i as f32, 20), &mut sink);
                engine.commits()[0].deltas.rotation.y
            })
            .collect();
        assert!(rolled.iter().any(|y| *y != frozen.rotation.y));
        assert_eq!(fx.scene.duplicates_created(), 1);
    }

    #[test]
    fn spin_rotates_about_normal_in_snapped_steps() {
        let mut fx = Fixture::new(&["rock"]);
        fx.options.place_rotate = 45.0;
        let mut engine = StrokeEngine::new(ToolMode::Place);
        let mut sink = VecSink::new();

        fx.press(&mut engine, at(10.0, 0), &mut sink);
        fx.drag(&mut engine, at(30.0, 10).with_spin(true), &mut sink);
        fx.drag(&mut engine, at(40.0, 20).with_spin(true), &mut sink);
        fx.drag(&mut engine, at(80.0, 30).with_spin(true), &mut sink);

        let placement = &engine.commits()[0];
        assert_eq!(placement.spin, 45.0);
        assert_eq!(placement.transform.translation, Vec3::new(10.0, 0.0, 0.0));
        assert!(placement
            .transform
            .rotation
            .abs_diff_eq(Vec3::new(0.0, 45.0, 0.0), 1e-2));
    }

    #[test]
    fn drag_while_idle_is_ignored() {
        let mut fx = Fixture::new(&["rock"]);
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();
        fx.drag(&mut engine, at(0.0, 0), &mut sink);
        assert!(fx.release(&mut engine, &mut sink).is_empty());
        assert!(sink.is_empty());
        assert_eq!(engine.strokes_started(), 0);
    }

    #[test]
    fn nothing_enabled_reports_status() {
        let mut fx = Fixture::new(&["rock"]);
        fx.sources.set_enabled("rockShape", false).unwrap();
        let mut engine = StrokeEngine::new(ToolMode::Paint);
        let mut sink = VecSink::new();
        fx.press(&mut engine, at(0.0, 0), &mut sink);
        assert!(engine.commits().is_empty());
        assert_eq!(sink.statuses().count(), 1);
    }
}
