//! Tool session owned by the UI shell.
//!
//! A [`ToolSession`] holds everything that outlives a single stroke: options,
//! transform ranges, both registries, the output group cache and the random
//! generator. Activating a tool validates the registries and creates a
//! [`StrokeEngine`]; pointer events are forwarded to it together with a fresh
//! view of the session state.
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::options::{LoadOutcome, OptionIntent, OptionStore, ToolOptions};
use crate::registry::{ObjectRegistry, RegistryEntry};
use crate::sampling::TransformSampler;
use crate::scene::Scene;
use crate::stroke::{
    EventSink, GroupCache, Placement, PointerEvent, StrokeContext, StrokeEngine, StrokeEvent,
    ToolMode,
};

pub struct ToolSession {
    options: ToolOptions,
    sampler: TransformSampler,
    sources: ObjectRegistry,
    targets: ObjectRegistry,
    groups: GroupCache,
    engine: Option<StrokeEngine>,
    rng: StdRng,
}

impl ToolSession {
    /// Session with the given options and a generator seeded from `seed`.
    pub fn new(options: ToolOptions, seed: u64) -> Self {
        Self {
            options,
            sampler: TransformSampler::new(),
            sources: ObjectRegistry::source(),
            targets: ObjectRegistry::target(),
            groups: GroupCache::new(),
            engine: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Load persisted options, resetting them when unusable. A reset is reported to `sink` once.
    pub fn open(store: &mut dyn OptionStore, seed: u64, sink: &mut dyn EventSink) -> Result<Self> {
        let options = match ToolOptions::load_or_reset(store)? {
            LoadOutcome::Loaded(options) => options,
            LoadOutcome::Reset { options, reason } => {
                sink.send(StrokeEvent::Status {
                    message: format!("Tool options reset to defaults: {reason}"),
                });
                options
            }
        };
        Ok(Self::new(options, seed))
    }

    pub fn options(&self) -> &ToolOptions {
        &self.options
    }

    /// Apply a UI edit, persist all options, and let the next pointer event see it.
    pub fn update_option(&mut self, intent: OptionIntent, store: &mut dyn OptionStore) {
        debug!("Option update: {:?}.", intent);
        self.options.update(intent, store);
    }

    /// Restore default options and transform ranges, overwriting the persisted values.
    pub fn reset_options(&mut self, store: &mut dyn OptionStore) -> Result<()> {
        self.options = ToolOptions::reset_to_defaults(store)?;
        self.sampler.reset();
        info!("Tool options and transform ranges reset to defaults.");
        Ok(())
    }

    pub fn sampler(&self) -> &TransformSampler {
        &self.sampler
    }

    pub fn set_sampler(&mut self, sampler: TransformSampler) {
        self.sampler = sampler;
    }

    pub fn sampler_mut(&mut self) -> &mut TransformSampler {
        &mut self.sampler
    }

    pub fn sources(&self) -> &ObjectRegistry {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.sources
    }

    pub fn targets(&self) -> &ObjectRegistry {
        &self.targets
    }

    pub fn targets_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.targets
    }

    /// Add a node to the source list, returning its key.
    pub fn add_source(&mut self, scene: &dyn Scene, node: &str) -> Result<String> {
        Ok(self.sources.add(scene, node)?)
    }

    /// Add a node to the target list, returning its key.
    pub fn add_target(&mut self, scene: &dyn Scene, node: &str) -> Result<String> {
        Ok(self.targets.add(scene, node)?)
    }

    pub fn remove_source(&mut self, key: &str) -> Option<RegistryEntry> {
        self.sources.remove(key)
    }

    pub fn remove_target(&mut self, key: &str) -> Option<RegistryEntry> {
        self.targets.remove(key)
    }

    /// Check both registries before a tool may run.
    pub fn validate(&self, scene: &dyn Scene) -> Result<()> {
        if !self.sources.validate_all(scene) {
            return Err(ValidationError::SourceInvalid.into());
        }
        if !self.targets.validate_all(scene) {
            return Err(ValidationError::TargetInvalid.into());
        }
        if self.sources.has_overlap(&self.targets) {
            return Err(ValidationError::Overlap.into());
        }
        Ok(())
    }

    /// Validate the registries and start a paint or place tool.
    pub fn activate(
        &mut self,
        mode: ToolMode,
        scene: &dyn Scene,
        sink: &mut dyn EventSink,
    ) -> Result<()> {
        self.validate(scene)?;
        self.deactivate(sink);
        self.groups.clear();
        self.engine = Some(StrokeEngine::new(mode));
        info!(
            "{:?} tool activated with {} source(s) and {} target(s).",
            mode,
            self.sources.len(),
            self.targets.len()
        );
        Ok(())
    }

    /// Stop the tool. A running stroke is cancelled without rollback.
    pub fn deactivate(&mut self, sink: &mut dyn EventSink) {
        if let Some(mut engine) = self.engine.take() {
            engine.cancel(&mut self.groups, sink);
            info!("{:?} tool deactivated.", engine.mode());
        }
    }

    pub fn engine(&self) -> Option<&StrokeEngine> {
        self.engine.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    pub fn press(&mut self, scene: &mut dyn Scene, event: PointerEvent, sink: &mut dyn EventSink) {
        self.dispatch(scene, |engine, scene, ctx| engine.press(scene, ctx, event, sink));
    }

    pub fn drag(&mut self, scene: &mut dyn Scene, event: PointerEvent, sink: &mut dyn EventSink) {
        self.dispatch(scene, |engine, scene, ctx| engine.drag(scene, ctx, event, sink));
    }

    pub fn release(&mut self, scene: &mut dyn Scene, sink: &mut dyn EventSink) -> Vec<Placement> {
        self.dispatch(scene, |engine, scene, ctx| engine.release(scene, ctx, sink))
            .unwrap_or_default()
    }

    /// Abandon the running stroke, keeping the tool active.
    pub fn cancel(&mut self, sink: &mut dyn EventSink) -> Vec<Placement> {
        match self.engine.as_mut() {
            Some(engine) => engine.cancel(&mut self.groups, sink),
            None => Vec::new(),
        }
    }

    fn dispatch<R>(
        &mut self,
        scene: &mut dyn Scene,
        f: impl FnOnce(&mut StrokeEngine, &mut dyn Scene, &mut StrokeContext<'_>) -> R,
    ) -> Option<R> {
        let Some(engine) = self.engine.as_mut() else {
            debug!("Pointer event without an active tool ignored.");
            return None;
        };
        let mut ctx = StrokeContext {
            options: &self.options,
            sampler: &self.sampler,
            sources: &mut self.sources,
            targets: &self.targets,
            groups: &mut self.groups,
            rng: &mut self.rng,
        };
        Some(f(engine, scene, &mut ctx))
    }
}
