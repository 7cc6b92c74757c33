#![forbid(unsafe_code)]
//! paint3d: interactive painting and placement of 3D objects onto target surfaces.
//!
//! Modules:
//! - options: typed tool options, their persisted schema and UI intents
//! - registry: source and target object lists, random/weighted/round-robin selection
//! - sampling: randomized rotation, scale and jitter deltas
//! - scene: the host scene trait and an in-memory implementation
//! - stroke: stroke state machine, flux gate, placement math, output groups, events
//! - session: the tool session tying everything together for a UI shell
//!
//! For a walkthrough, see the README and the demo binaries of `paint3d_examples`.
pub mod error;
pub mod options;
pub mod registry;
pub mod sampling;
pub mod scene;
pub mod session;
pub mod stroke;

/// Convenient re-exports for common types. Import with `use paint3d::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result, ValidationError};
    pub use crate::options::{
        BoolOption, FloatOption, FluxMode, GroupBy, GroupingPolicy, LoadOutcome,
        MemoryOptionStore, OptionIntent, OptionStore, OptionValue, OptionsInvalid, RampFx,
        ToolOptions, OPTION_TABLE, TOOL_VERSION,
    };
    pub use crate::registry::{
        AddRejection, AlignOverride, ObjectRegistry, RegistryEntry, RegistryRole,
    };
    pub use crate::sampling::{JitterAxis, TransformDeltas, TransformSampler, ValueRange};
    pub use crate::scene::memory::{MemoryScene, PlaneSurface};
    pub use crate::scene::{
        DuplicateMode, NodeCategory, NodeRef, NormalMode, Scene, SurfaceHit, WorldTransform,
    };
    pub use crate::session::ToolSession;
    pub use crate::stroke::{
        EventSink, FnSink, GroupCache, GroupScope, MultiSink, Placement, PointerEvent,
        SkipReason, StrokeContext, StrokeEngine, StrokeEvent, ToolMode, VecSink,
    };
}
